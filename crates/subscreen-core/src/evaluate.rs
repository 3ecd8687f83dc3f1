//! ペア評価（screen-then-verify）
//!
//! 全フラグメント × 全元構造について、指紋の包含判定（filter）と厳密判定（oracle）を
//! 両方とも計算し、4 分類のどれか 1 つを数える。実運用なら filter で oracle 呼び出しを
//! 省くが、ここでは両者の一致度を測るのが目的なので省略はしない。
//!
//! oracle は常に `contains(元構造, フラグメント)` の向きで呼ぶ。引数を逆にすると
//! 偽陽性と偽陰性の意味が入れ替わってしまう。

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use rayon::prelude::*;
use serde::Serialize;

use crate::cancel::CancelToken;
use crate::capability::{CanonicalKey, ContainmentOracle};
use crate::collection::StoredStructure;
use crate::corpus::Corpus;
use crate::error::{ScreenError, ScreenResult};
use crate::progress::{NoProgress, ProgressSink, Stage};

/// 保持する偽陰性サンプル数の既定値
pub const DEFAULT_MAX_FALSE_NEGATIVE_EXAMPLES: usize = 10;

/// 1 ペアの判定結果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    /// filter も oracle も「含まれる」
    TruePositive,
    /// filter は通したが oracle が否定（無駄な oracle 呼び出し）
    FalsePositive,
    /// filter も oracle も「含まれない」
    TrueNegative,
    /// filter が本物の一致を落とした（見逃し）
    FalseNegative,
}

impl Classification {
    pub fn classify(filter_says: bool, oracle_says: bool) -> Self {
        match (filter_says, oracle_says) {
            (true, true) => Classification::TruePositive,
            (true, false) => Classification::FalsePositive,
            (false, true) => Classification::FalseNegative,
            (false, false) => Classification::TrueNegative,
        }
    }
}

/// 混同行列
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionCounters {
    pub true_positive: u64,
    pub false_positive: u64,
    pub true_negative: u64,
    pub false_negative: u64,
    pub total: u64,
}

impl ConfusionCounters {
    pub fn record(&mut self, classification: Classification) {
        match classification {
            Classification::TruePositive => self.true_positive += 1,
            Classification::FalsePositive => self.false_positive += 1,
            Classification::TrueNegative => self.true_negative += 1,
            Classification::FalseNegative => self.false_negative += 1,
        }
        self.total += 1;
    }

    /// 部分集計を合算する
    pub fn merge(self, other: ConfusionCounters) -> ConfusionCounters {
        ConfusionCounters {
            true_positive: self.true_positive + other.true_positive,
            false_positive: self.false_positive + other.false_positive,
            true_negative: self.true_negative + other.true_negative,
            false_negative: self.false_negative + other.false_negative,
            total: self.total + other.total,
        }
    }

    /// 4 分類の和が total に一致するか
    pub fn is_consistent(&self) -> bool {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
            == self.total
    }
}

/// 偽陰性になったペア
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct FalseNegativeExample {
    pub fragment: CanonicalKey,
    pub original: CanonicalKey,
}

/// 評価結果
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EvaluationOutcome {
    pub counters: ConfusionCounters,
    /// (フラグメントキー, 元構造キー) 順で小さいものから最大 N 件
    pub false_negative_examples: Vec<FalseNegativeExample>,
}

impl EvaluationOutcome {
    fn merge(mut self, other: EvaluationOutcome, max_examples: usize) -> EvaluationOutcome {
        self.counters = self.counters.merge(other.counters);
        self.false_negative_examples.extend(other.false_negative_examples);
        self.false_negative_examples.sort();
        self.false_negative_examples.truncate(max_examples);
        self
    }
}

/// ペア評価器
pub struct Evaluator<'a, H> {
    oracle: &'a dyn ContainmentOracle<H>,
    progress: &'a dyn ProgressSink,
    cancel: CancelToken,
    max_examples: usize,
    width_mismatch_logged: AtomicBool,
}

impl<'a, H> Evaluator<'a, H> {
    pub fn new(oracle: &'a dyn ContainmentOracle<H>) -> Self {
        Self {
            oracle,
            progress: &NoProgress,
            cancel: CancelToken::new(),
            max_examples: DEFAULT_MAX_FALSE_NEGATIVE_EXAMPLES,
            width_mismatch_logged: AtomicBool::new(false),
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_max_false_negative_examples(mut self, n: usize) -> Self {
        self.max_examples = n;
        self
    }

    /// 1 ペアを判定する
    pub fn classify_pair(
        &self,
        original: &StoredStructure<H>,
        fragment: &StoredStructure<H>,
    ) -> Classification {
        if original.fingerprint.width() != fragment.fingerprint.width()
            && !self.width_mismatch_logged.swap(true, Ordering::Relaxed)
        {
            log::debug!(
                "fingerprint width mismatch ({} vs {}); treated as not a subset",
                original.fingerprint.width(),
                fragment.fingerprint.width()
            );
        }
        let filter_says = fragment.fingerprint.is_subset_of(&original.fingerprint);
        let oracle_says = self.oracle.contains(&original.structure, &fragment.structure);
        Classification::classify(filter_says, oracle_says)
    }

    /// 1 フラグメントを全元構造と照合する（外側ループ 1 回分）
    fn evaluate_fragment(
        &self,
        fragment_key: &CanonicalKey,
        fragment: &StoredStructure<H>,
        originals: &[(&CanonicalKey, &StoredStructure<H>)],
    ) -> EvaluationOutcome {
        let mut outcome = EvaluationOutcome::default();
        for (original_key, original) in originals {
            let classification = self.classify_pair(original, fragment);
            outcome.counters.record(classification);
            if classification == Classification::FalseNegative
                && outcome.false_negative_examples.len() < self.max_examples
            {
                outcome.false_negative_examples.push(FalseNegativeExample {
                    fragment: fragment_key.clone(),
                    original: (*original_key).clone(),
                });
            }
        }
        outcome
    }

    /// 逐次評価
    pub fn evaluate(&self, corpus: &Corpus<H>) -> ScreenResult<EvaluationOutcome> {
        let originals: Vec<_> = corpus.originals.iter().collect();
        let total = corpus.fragments.len() as u64;
        self.progress.begin(Stage::Analysis, total);

        let mut outcome = EvaluationOutcome::default();
        for (completed, (key, fragment)) in corpus.fragments.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(ScreenError::Cancelled);
            }
            let partial = self.evaluate_fragment(key, fragment, &originals);
            outcome = outcome.merge(partial, self.max_examples);
            self.progress.advance(Stage::Analysis, completed as u64 + 1, total);
        }
        self.progress.finish(Stage::Analysis);
        Ok(outcome)
    }
}

impl<H: Sync> Evaluator<'_, H> {
    /// フラグメント方向に rayon で並列評価する。
    ///
    /// ワーカーごとに局所集計し、最後に合算する。結果は [`Self::evaluate`] と同一。
    pub fn evaluate_parallel(&self, corpus: &Corpus<H>) -> ScreenResult<EvaluationOutcome> {
        let originals: Vec<_> = corpus.originals.iter().collect();
        let fragments: Vec<_> = corpus.fragments.iter().collect();
        let total = fragments.len() as u64;
        let completed = AtomicU64::new(0);
        self.progress.begin(Stage::Analysis, total);

        let outcome = fragments
            .par_iter()
            .try_fold(EvaluationOutcome::default, |acc, (key, fragment)| {
                if self.cancel.is_cancelled() {
                    return Err(ScreenError::Cancelled);
                }
                let partial = self.evaluate_fragment(key, fragment, &originals);
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                self.progress.advance(Stage::Analysis, done, total);
                Ok(acc.merge(partial, self.max_examples))
            })
            .try_reduce(EvaluationOutcome::default, |a, b| Ok(a.merge(b, self.max_examples)))?;

        self.progress.finish(Stage::Analysis);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_table() {
        assert_eq!(Classification::classify(true, true), Classification::TruePositive);
        assert_eq!(Classification::classify(true, false), Classification::FalsePositive);
        assert_eq!(Classification::classify(false, true), Classification::FalseNegative);
        assert_eq!(Classification::classify(false, false), Classification::TrueNegative);
    }

    #[test]
    fn test_counters_record_and_merge() {
        let mut a = ConfusionCounters::default();
        a.record(Classification::TruePositive);
        a.record(Classification::FalseNegative);
        let mut b = ConfusionCounters::default();
        b.record(Classification::TrueNegative);
        let merged = a.merge(b);
        assert_eq!(merged.true_positive, 1);
        assert_eq!(merged.false_negative, 1);
        assert_eq!(merged.true_negative, 1);
        assert_eq!(merged.total, 3);
        assert!(merged.is_consistent());
    }

    #[test]
    fn test_outcome_merge_keeps_smallest_examples() {
        let ex = |f: &str, o: &str| FalseNegativeExample {
            fragment: CanonicalKey::from(f),
            original: CanonicalKey::from(o),
        };
        let a = EvaluationOutcome {
            counters: ConfusionCounters::default(),
            false_negative_examples: vec![ex("B", "x"), ex("D", "x")],
        };
        let b = EvaluationOutcome {
            counters: ConfusionCounters::default(),
            false_negative_examples: vec![ex("A", "y"), ex("C", "y")],
        };
        let merged = b.merge(a, 3);
        assert_eq!(merged.false_negative_examples, vec![ex("A", "y"), ex("B", "x"), ex("C", "y")]);
    }
}
