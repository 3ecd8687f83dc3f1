//! コーパス構築
//!
//! 入力レコードごとに指紋と正規キーを計算して元構造コレクションに入れ、
//! さらにフラグメントへ分解して重複排除しながらフラグメントコレクションに入れる。
//!
//! 正規キーが得られないレコードは元構造にも分解元にもしない（同一性が
//! 決まらないものは安全に重複排除できないため）。

use std::path::Path;

use serde::Serialize;

use crate::cancel::CancelToken;
use crate::capability::{CanonicalKeyer, Fingerprinter, Fragmenter, StructureReader};
use crate::collection::{InsertOutcome, InsertPolicy, KeyedCollection, StoredStructure};
use crate::error::{ScreenError, ScreenResult};
use crate::progress::{ProgressSink, Stage};

/// 構築済みコーパス。構築後は読み取り専用。
#[derive(Debug)]
pub struct Corpus<H> {
    pub originals: KeyedCollection<H>,
    pub fragments: KeyedCollection<H>,
    pub stats: CorpusStats,
}

impl<H> Corpus<H> {
    /// 評価されるペア数（|fragments| × |originals|）
    pub fn pair_count(&self) -> u64 {
        self.fragments.len() as u64 * self.originals.len() as u64
    }
}

/// 構築中の集計
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CorpusStats {
    /// 読んだ入力レコード数
    pub records: u64,
    /// 正規キー生成に失敗して捨てた入力レコード数
    pub originals_skipped: u64,
    /// 元構造のキー衝突で上書きした数
    pub originals_replaced: u64,
    /// 分解で得たフラグメント候補の総数（重複込み）
    pub fragments_generated: u64,
    /// 正規キー生成に失敗して捨てたフラグメント数
    pub fragments_skipped: u64,
    /// 既出キーのため指紋計算を省いたフラグメント数
    pub fragments_duplicate: u64,
}

/// 全入力ソースのレコード数を数える（進捗見積もり用の事前パス）
pub fn count_records<H, R, P>(reader: &R, sources: &[P]) -> ScreenResult<u64>
where
    R: StructureReader<H> + ?Sized,
    P: AsRef<Path>,
{
    let mut total = 0u64;
    for source in sources {
        total += reader.count(source.as_ref())?;
    }
    Ok(total)
}

/// 元構造（後勝ち）とフラグメント（先勝ち）のコレクションを組み立てる
pub struct CorpusBuilder<'a, H> {
    fingerprinter: &'a dyn Fingerprinter<H>,
    keyer: &'a dyn CanonicalKeyer<H>,
    fragmenter: &'a dyn Fragmenter<H>,
    originals: KeyedCollection<H>,
    fragments: KeyedCollection<H>,
    stats: CorpusStats,
}

impl<'a, H> CorpusBuilder<'a, H> {
    pub fn new(
        fingerprinter: &'a dyn Fingerprinter<H>,
        keyer: &'a dyn CanonicalKeyer<H>,
        fragmenter: &'a dyn Fragmenter<H>,
    ) -> Self {
        Self {
            fingerprinter,
            keyer,
            fragmenter,
            originals: KeyedCollection::new(InsertPolicy::LastWriteWins),
            fragments: KeyedCollection::new(InsertPolicy::FirstWriteWins),
            stats: CorpusStats::default(),
        }
    }

    /// 1 レコードを取り込む。正規キーが得られず捨てた場合は false。
    pub fn add_record(&mut self, record: H) -> bool {
        self.stats.records += 1;

        let fingerprint = self.fingerprinter.fingerprint(&record);
        let key = match self.keyer.canonical_key(&record) {
            Ok(key) => key,
            Err(failure) => {
                log::warn!("canonical key failed: {failure}");
                self.stats.originals_skipped += 1;
                return false;
            }
        };

        let pieces = self.fragmenter.fragments(&record);
        log::debug!("Generated: {} fragments from {key}", pieces.len());

        let outcome = self.originals.insert(
            key,
            StoredStructure {
                fingerprint,
                structure: record,
            },
        );
        if outcome == InsertOutcome::Replaced {
            self.stats.originals_replaced += 1;
        }

        for piece in pieces {
            self.add_fragment(piece);
        }
        true
    }

    fn add_fragment(&mut self, piece: H) {
        self.stats.fragments_generated += 1;
        let key = match self.keyer.canonical_key(&piece) {
            Ok(key) => key,
            Err(failure) => {
                log::warn!("canonical key failed for fragment: {failure}");
                self.stats.fragments_skipped += 1;
                return;
            }
        };
        let fingerprinter = self.fingerprinter;
        let outcome = self.fragments.insert_with(key, || StoredStructure {
            fingerprint: fingerprinter.fingerprint(&piece),
            structure: piece,
        });
        if outcome == InsertOutcome::Kept {
            self.stats.fragments_duplicate += 1;
        }
    }

    /// 入力ソースを与えられた順に読み、全レコードを取り込む。
    ///
    /// `total_records` は [`count_records`] の結果で、進捗はソースを 1 つ
    /// 読み終えるごとに通知する。
    pub fn build_from_sources<R, P>(
        mut self,
        reader: &R,
        sources: &[P],
        total_records: u64,
        progress: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> ScreenResult<Corpus<H>>
    where
        R: StructureReader<H> + ?Sized,
        P: AsRef<Path>,
    {
        progress.begin(Stage::Generation, total_records);
        for source in sources {
            let source = source.as_ref();
            log::info!("Reading {}", source.display());
            for record in reader.read(source)? {
                if cancel.is_cancelled() {
                    return Err(ScreenError::Cancelled);
                }
                self.add_record(record?);
            }
            progress.advance(Stage::Generation, self.stats.records, total_records);
        }
        progress.finish(Stage::Generation);
        Ok(self.finish())
    }

    pub fn finish(self) -> Corpus<H> {
        Corpus {
            originals: self.originals,
            fragments: self.fragments,
            stats: self.stats,
        }
    }
}
