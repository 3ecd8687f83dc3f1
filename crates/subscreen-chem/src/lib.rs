//! 分子グラフと、スクリーニング評価に注入する化学側の能力の実装
//!
//! 外部の化学ツールキットに頼らない最小構成:
//!
//! - [`molecule`]: 水素抑制した分子グラフ（petgraph）
//! - [`sdf`]: MDL SD ファイル（V2000）の読み込み
//! - [`canonical`]: 色精密化による正規キー
//! - [`fragment`]: 非環単結合を切る網羅的フラグメント分解
//! - [`fingerprint`]: path / circular / element 指紋
//! - [`substruct`]: 部分グラフ単射による厳密な部分構造判定

pub mod canonical;
pub mod element;
pub mod fingerprint;
pub mod fragment;
pub mod molecule;
pub mod rings;
pub mod sdf;
pub mod substruct;

pub use canonical::ColorRefinementKeyer;
pub use fingerprint::{
    CircularFingerprinter, ElementFingerprinter, FingerprintOptions, PathFingerprinter,
    known_fingerprinters, resolve_fingerprinter,
};
pub use fragment::{DEFAULT_MIN_FRAGMENT_ATOMS, ExhaustiveFragmenter};
pub use molecule::{Atom, BondOrder, Molecule};
pub use sdf::SdfRecords;
pub use substruct::{SubgraphOracle, find_embedding, is_substructure};
