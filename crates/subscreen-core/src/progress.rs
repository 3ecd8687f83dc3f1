//! 進捗通知と残り時間の見積もり
//!
//! 見積もりは「1 単位あたりの平均所要時間 × 残り単位数」。完了数 0 のときは
//! 0 除算になるので見積もり不能（`None`）として扱う。

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// 進捗を報告する処理段階
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// コーパス構築（単位: 入力レコード）
    Generation,
    /// ペア評価（単位: フラグメント）
    Analysis,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Generation => "data generation",
            Stage::Analysis => "analysis",
        }
    }
}

/// 進捗の受け手。結果には一切影響しない。
///
/// 並列評価中は複数スレッドから `advance` が呼ばれ、`completed` が
/// 前後して届くことがある。
pub trait ProgressSink: Send + Sync {
    fn begin(&self, _stage: Stage, _total: u64) {}

    fn advance(&self, stage: Stage, completed: u64, total: u64);

    fn finish(&self, _stage: Stage) {}
}

/// 何もしない進捗受け手
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn advance(&self, _stage: Stage, _completed: u64, _total: u64) {}
}

/// 残り時間の見積もり（経過時間を引数で受け取る純粋関数）
pub fn estimate_remaining(elapsed: Duration, total: u64, completed: u64) -> Option<Duration> {
    if completed == 0 {
        return None;
    }
    let remaining_units = total.saturating_sub(completed);
    let per_unit = elapsed.as_secs_f64() / completed as f64;
    Some(Duration::from_secs_f64(per_unit * remaining_units as f64))
}

/// 時間数（小数 2 桁）
pub fn format_hours(d: Duration) -> String {
    format!("{:.2}", d.as_secs_f64() / 3600.0)
}

/// 開始時刻と総作業量を保持する見積もり器
#[derive(Clone, Debug)]
pub struct ProgressEstimator {
    start: Instant,
    total: u64,
}

impl ProgressEstimator {
    pub fn new(total: u64) -> Self {
        Self::starting_at(Instant::now(), total)
    }

    pub fn starting_at(start: Instant, total: u64) -> Self {
        Self { start, total }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn remaining(&self, completed: u64) -> Option<Duration> {
        estimate_remaining(self.elapsed(), self.total, completed)
    }

    /// 人間向けの見積もり文字列
    pub fn message(&self, completed: u64) -> String {
        eta_message(self.remaining(completed))
    }
}

pub fn eta_message(remaining: Option<Duration>) -> String {
    match remaining {
        Some(d) => format!("Expecting about {} hours remaining", format_hours(d)),
        None => "Remaining time unknown".to_string(),
    }
}

/// 見積もりを `log::info!` に流す進捗受け手
#[derive(Debug, Default)]
pub struct EtaLogger {
    estimators: Mutex<Vec<(Stage, ProgressEstimator)>>,
}

impl EtaLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 段階の見積もり文字列。`begin` 前なら `None`。
    pub fn message(&self, stage: Stage, completed: u64) -> Option<String> {
        let estimators = self.estimators.lock().unwrap_or_else(|e| e.into_inner());
        estimators.iter().find(|(s, _)| *s == stage).map(|(_, est)| est.message(completed))
    }
}

impl ProgressSink for EtaLogger {
    fn begin(&self, stage: Stage, total: u64) {
        let mut estimators = self.estimators.lock().unwrap_or_else(|e| e.into_inner());
        estimators.retain(|(s, _)| *s != stage);
        estimators.push((stage, ProgressEstimator::new(total)));
    }

    fn advance(&self, stage: Stage, completed: u64, total: u64) {
        if let Some(msg) = self.message(stage, completed) {
            log::info!("[{completed}/{total}] {msg} for {}.", stage.label());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_is_linear_extrapolation() {
        // 10 件に 1 時間 → 残り 30 件で 3 時間
        let d = estimate_remaining(Duration::from_secs(3600), 40, 10).unwrap();
        assert_eq!(format_hours(d), "3.00");
    }

    #[test]
    fn test_zero_completed_is_unknown() {
        assert!(estimate_remaining(Duration::from_secs(10), 5, 0).is_none());
        assert_eq!(eta_message(None), "Remaining time unknown");
    }

    #[test]
    fn test_completed_beyond_total_saturates() {
        let d = estimate_remaining(Duration::from_secs(100), 3, 5).unwrap();
        assert_eq!(d, Duration::ZERO);
    }

    #[test]
    fn test_message_format() {
        let msg = eta_message(Some(Duration::from_secs(900)));
        assert_eq!(msg, "Expecting about 0.25 hours remaining");
    }

    #[test]
    fn test_eta_logger_requires_begin() {
        let logger = EtaLogger::new();
        assert!(logger.message(Stage::Analysis, 1).is_none());
        logger.begin(Stage::Analysis, 10);
        let msg = logger.message(Stage::Analysis, 1).unwrap();
        assert!(msg.starts_with("Expecting about"));
        logger.advance(Stage::Analysis, 1, 10);
    }
}
