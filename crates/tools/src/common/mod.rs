//! 入出力の共通処理

pub mod io;
