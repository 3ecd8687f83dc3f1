//! エラー型

use std::path::PathBuf;

/// 評価実行中のエラー
///
/// 正規キー生成の失敗はここに含まれない（[`crate::KeyFailure`] として値で返し、
/// 該当レコードを読み飛ばすだけで実行は継続する）。
#[derive(thiserror::Error, Debug)]
pub enum ScreenError {
    /// 入力ソースの読み込み失敗（実行全体を中断する）
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 入力の解析失敗（レコード単位で回復できないもの）
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// 指紋生成器の名前が解決できない
    #[error("unknown fingerprinter '{name}' (known: {known})")]
    UnknownFingerprinter { name: String, known: String },

    /// 設定値が不正
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// キャンセルトークンにより中断された
    #[error("interrupted")]
    Cancelled,
}

impl ScreenError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScreenError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for screening operations
pub type ScreenResult<T> = Result<T, ScreenError>;
