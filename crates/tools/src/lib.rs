//! 部分構造スクリーニング精度評価のドライバ
//!
//! バイナリ `substructure_accuracy` が使う周辺機能（設定、入力、進捗表示、
//! 実行環境の記録、結果の JSON 出力）をまとめる。

pub mod common;
pub mod config;
pub mod progress;
pub mod source;
pub mod summary;
pub mod system;
