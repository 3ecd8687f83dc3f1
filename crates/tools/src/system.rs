//! 評価を実行したマシンとツールの記録
//!
//! 正解率そのものは実行環境に依存しないが、所要時間を比べるときに
//! どのマシン・何スレッドで回したかが要るので JSON サマリに添える。

use serde::{Deserialize, Serialize};
use sysinfo::System;

const UNKNOWN: &str = "unknown";

/// サマリ JSON の `environment` 欄
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEnvironment {
    /// 評価開始時刻（RFC 3339, UTC）
    pub started_at: String,
    /// `substructure_accuracy` のバージョン
    pub tool_version: String,
    /// 例: `Linux 24.04 Ubuntu`
    pub os: String,
    pub arch: String,
    pub cpu_model: String,
    pub logical_cores: usize,
    /// ペア評価に使える rayon ワーカー数
    pub worker_threads: usize,
    pub total_memory_mib: u64,
}

impl RunEnvironment {
    /// 現在のプロセスから収集する。rayon のグローバルプールを構成した後に呼ぶこと。
    pub fn capture() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_all();
        sys.refresh_memory();

        let cpu_model = sys
            .cpus()
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .filter(|brand| !brand.is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string());
        let os = System::long_os_version()
            .or_else(System::name)
            .unwrap_or_else(|| UNKNOWN.to_string());

        Self {
            started_at: chrono::Utc::now().to_rfc3339(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            os,
            arch: std::env::consts::ARCH.to_string(),
            cpu_model,
            logical_cores: sys.cpus().len(),
            worker_threads: rayon::current_num_threads(),
            total_memory_mib: sys.total_memory() / (1024 * 1024),
        }
    }
}
