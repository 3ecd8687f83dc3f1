//! 外部から注入する能力（capability）のトレイト
//!
//! コアは構造ハンドル `H` の中身を知らない。読み込み・指紋・正規キー・分解・
//! 厳密判定はすべてここで定義するトレイト越しに呼び出す。評価ループを rayon で
//! 並列化するため、読み込み以外の能力は `Send + Sync` を要求する。

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::error::ScreenResult;
use crate::fingerprint::Fingerprint;

/// 構造内容から決定的に導出される重複排除用キー
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CanonicalKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// 正規キーを生成できなかったことを表す値（panic ではなく値で返す）
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyFailure {
    pub message: String,
}

impl KeyFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for KeyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// 名前付き入力ソースから構造ハンドルを遅延的に読み出す
pub trait StructureReader<H> {
    /// ソースを開き、先頭から順にハンドルを返すイテレータを作る。
    ///
    /// 開けない場合や読み込み途中の I/O エラーは致命的エラーとして返す。
    fn read<'a>(
        &'a self,
        source: &Path,
    ) -> ScreenResult<Box<dyn Iterator<Item = ScreenResult<H>> + 'a>>;

    /// ソース中のレコード数。既定実装は全件を読み捨てて数える。
    fn count(&self, source: &Path) -> ScreenResult<u64> {
        let mut n = 0u64;
        for record in self.read(source)? {
            record?;
            n += 1;
        }
        Ok(n)
    }
}

/// ハンドル → 固定幅ビット列（決定的・純粋・再入可能）
pub trait Fingerprinter<H>: Send + Sync {
    /// 実行ログ・サマリに出す識別名
    fn name(&self) -> &str;

    /// 生成する指紋のビット幅
    fn width(&self) -> usize;

    fn fingerprint(&self, structure: &H) -> Fingerprint;
}

/// ハンドル → 正規キー、または失敗
pub trait CanonicalKeyer<H>: Send + Sync {
    fn canonical_key(&self, structure: &H) -> Result<CanonicalKey, KeyFailure>;
}

/// ハンドル → 部分構造の列（網羅的。0 個でもよく、順序は保証しない）
pub trait Fragmenter<H>: Send + Sync {
    fn fragments(&self, structure: &H) -> Vec<H>;
}

/// 厳密な部分構造判定（正解データ）
pub trait ContainmentOracle<H>: Send + Sync {
    /// `candidate` が `container` に厳密に含まれるなら true。
    ///
    /// 評価器は常に (元構造, フラグメント) の順で呼び出す。
    fn contains(&self, container: &H, candidate: &H) -> bool;
}
