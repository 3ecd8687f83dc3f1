//! 指紋スクリーニング精度評価エンジン
//!
//! 安価なビット列指紋による部分構造フィルタ（screen）と、高価な厳密部分構造判定（verify）を
//! 全 (フラグメント, 元構造) ペアに対して実行し、混同行列と正解率を集計する。
//!
//! - [`corpus`]: 正規キーで重複排除した元構造・フラグメントのコーパス構築
//! - [`evaluate`]: ペアごとの screen/verify 判定と混同行列の集計（逐次 / rayon 並列）
//! - [`report`]: 正解率などの派生統計
//! - [`progress`]: 残り時間の見積もり
//!
//! 化学固有の処理（読み込み・指紋・正規キー・フラグメント分解・部分構造判定）は
//! [`capability`] のトレイトとして外から注入する。

pub mod cancel;
pub mod capability;
pub mod collection;
pub mod corpus;
pub mod error;
pub mod evaluate;
pub mod fingerprint;
pub mod progress;
pub mod report;

pub use cancel::CancelToken;
pub use capability::{
    CanonicalKey, CanonicalKeyer, ContainmentOracle, Fingerprinter, Fragmenter, KeyFailure,
    StructureReader,
};
pub use collection::{InsertOutcome, InsertPolicy, KeyedCollection, StoredStructure};
pub use corpus::{Corpus, CorpusBuilder, CorpusStats, count_records};
pub use error::{ScreenError, ScreenResult};
pub use evaluate::{
    Classification, ConfusionCounters, DEFAULT_MAX_FALSE_NEGATIVE_EXAMPLES, EvaluationOutcome,
    Evaluator, FalseNegativeExample,
};
pub use fingerprint::Fingerprint;
pub use progress::{EtaLogger, NoProgress, ProgressEstimator, ProgressSink, Stage};
pub use report::{AccuracyReport, DEFAULT_ACCURACY_DIGITS, MAX_ACCURACY_DIGITS, Ratio};
