//! 正解率レポート

use std::fmt;

use serde::{Serialize, Serializer};

use crate::evaluate::ConfusionCounters;

/// 既定の小数桁数
pub const DEFAULT_ACCURACY_DIGITS: u32 = 3;

/// 扱える小数桁数の上限。これより大きい指定は切り詰める。
pub const MAX_ACCURACY_DIGITS: u32 = 9;

/// 小数 `digits` 桁に四捨五入（round-half-up）した比率。
///
/// 値は `scaled / 10^digits`。整数演算だけで丸めるので境界値で誤差が出ない。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ratio {
    scaled: u128,
    digits: u32,
}

impl Ratio {
    /// `numer / denom` を丸める。分母 0 は未定義として `None`。
    /// `digits` は [`MAX_ACCURACY_DIGITS`] までに切り詰める。
    pub fn half_up(numer: u64, denom: u64, digits: u32) -> Option<Ratio> {
        if denom == 0 {
            return None;
        }
        let digits = digits.min(MAX_ACCURACY_DIGITS);
        let scale = 10u128.pow(digits);
        let numer = numer as u128 * scale * 2 + denom as u128;
        let scaled = numer / (2 * denom as u128);
        Some(Ratio { scaled, digits })
    }

    pub fn as_f64(self) -> f64 {
        self.scaled as f64 / 10f64.powi(self.digits as i32)
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.digits == 0 {
            return write!(f, "{}", self.scaled);
        }
        let scale = 10u128.pow(self.digits);
        write!(
            f,
            "{}.{:0width$}",
            self.scaled / scale,
            self.scaled % scale,
            width = self.digits as usize
        )
    }
}

impl Serialize for Ratio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

/// 混同行列から導出する統計
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AccuracyReport {
    pub counters: ConfusionCounters,
    /// (TP + TN) / total
    pub accuracy: Option<Ratio>,
    /// TP / (TP + FP)
    pub precision: Option<Ratio>,
    /// TP / (TP + FN)。filter が本物の一致を通す割合。
    pub recall: Option<Ratio>,
    /// filter が否定したペア数（実運用で省ける oracle 呼び出し数、TN + FN）
    pub oracle_calls_saved: u64,
}

impl AccuracyReport {
    pub fn from_counters(counters: ConfusionCounters, digits: u32) -> Self {
        let c = counters;
        Self {
            counters: c,
            accuracy: Ratio::half_up(c.true_positive + c.true_negative, c.total, digits),
            precision: Ratio::half_up(
                c.true_positive,
                c.true_positive + c.false_positive,
                digits,
            ),
            recall: Ratio::half_up(c.true_positive, c.true_positive + c.false_negative, digits),
            oracle_calls_saved: c.true_negative + c.false_negative,
        }
    }
}

fn or_undefined(r: Option<Ratio>) -> String {
    r.map(|r| r.to_string()).unwrap_or_else(|| "undefined".to_string())
}

impl fmt::Display for AccuracyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.counters;
        writeln!(f, "TRUE POSITIVES: {}", c.true_positive)?;
        writeln!(f, "FALSE POSITIVES: {}", c.false_positive)?;
        writeln!(f, "TRUE NEGATIVES: {}", c.true_negative)?;
        writeln!(f, "FALSE NEGATIVES: {}", c.false_negative)?;
        writeln!(f, "TOTAL: {}", c.total)?;
        writeln!(f, "ACCURACY: {}", or_undefined(self.accuracy))?;
        writeln!(f, "PRECISION: {}", or_undefined(self.precision))?;
        writeln!(f, "RECALL: {}", or_undefined(self.recall))?;
        write!(f, "ORACLE CALLS SAVED: {}", self.oracle_calls_saved)
    }
}
