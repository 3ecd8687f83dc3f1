//! 実行結果の JSON サマリ

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use subscreen_core::{AccuracyReport, CorpusStats, FalseNegativeExample};

use crate::common::io::open_writer;
use crate::config::RunConfig;
use crate::system::RunEnvironment;

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub environment: RunEnvironment,
    pub fingerprinter: String,
    pub inputs: Vec<PathBuf>,
    pub config: RunConfig,
    pub corpus: CorpusStats,
    pub originals: usize,
    pub fragments: usize,
    pub report: AccuracyReport,
    pub false_negative_examples: Vec<FalseNegativeExample>,
    pub duration_secs: f64,
}

impl RunSummary {
    pub fn set_duration(&mut self, elapsed: Duration) {
        self.duration_secs = elapsed.as_secs_f64();
    }

    /// `serde_json::to_writer_pretty` で書き出す（`.gz` なら圧縮）
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let mut writer = open_writer(path)
            .with_context(|| format!("Failed to create JSON file: {}", path.display()))?;
        serde_json::to_writer_pretty(&mut writer, self).with_context(|| "Failed to write JSON")?;
        writer
            .close()
            .with_context(|| format!("Failed to finish JSON file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::RunEnvironment;
    use subscreen_core::{CanonicalKey, ConfusionCounters};
    use tempfile::TempDir;

    fn summary() -> RunSummary {
        let counters = ConfusionCounters {
            true_positive: 3,
            false_positive: 1,
            true_negative: 5,
            false_negative: 1,
            total: 10,
        };
        RunSummary {
            environment: RunEnvironment::capture(),
            fingerprinter: "circular".to_string(),
            inputs: vec![PathBuf::from("a.sdf")],
            config: RunConfig::default(),
            corpus: CorpusStats::default(),
            originals: 2,
            fragments: 5,
            report: AccuracyReport::from_counters(counters, 3),
            false_negative_examples: vec![FalseNegativeExample {
                fragment: CanonicalKey::new("F"),
                original: CanonicalKey::new("O"),
            }],
            duration_secs: 0.0,
        }
    }

    #[test]
    fn test_save_json() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("summary.json");
        summary().save_json(&path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["fingerprinter"], "circular");
        assert_eq!(value["report"]["counters"]["total"], 10);
        assert_eq!(value["report"]["accuracy"], 0.8);
        assert_eq!(value["false_negative_examples"][0]["fragment"], "F");
        assert_eq!(value["config"]["fingerprint_width"], 1024);
    }
}
