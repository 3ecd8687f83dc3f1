//! 分子指紋
//!
//! - `path`: 長さ `path_depth` 結合までの線形パスをハッシュして畳み込む（部分構造に対して単調）
//! - `circular`: 半径 2 の Morgan 環境（次数を含むので単調ではない）
//! - `element`: 含まれる元素ごとに 1 ビット

mod circular;
mod element;
mod path;

pub use circular::{CircularFingerprinter, DEFAULT_RADIUS};
pub use element::ElementFingerprinter;
pub use path::PathFingerprinter;

use subscreen_core::{Fingerprinter, ScreenError, ScreenResult};

use crate::molecule::Molecule;

pub const DEFAULT_FINGERPRINT_WIDTH: usize = 1024;
pub const DEFAULT_PATH_DEPTH: usize = 7;

/// 指紋生成器の共通パラメータ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerprintOptions {
    pub width: usize,
    pub path_depth: usize,
}

impl Default for FingerprintOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_FINGERPRINT_WIDTH,
            path_depth: DEFAULT_PATH_DEPTH,
        }
    }
}

const KNOWN: [&str; 3] = ["path", "circular", "element"];

/// 選択可能な指紋名（別名は含まない）
pub fn known_fingerprinters() -> &'static [&'static str] {
    &KNOWN
}

/// 名前（大文字小文字は区別しない）から指紋生成器を作る
pub fn resolve_fingerprinter(
    name: &str,
    options: &FingerprintOptions,
) -> ScreenResult<Box<dyn Fingerprinter<Molecule>>> {
    if options.width == 0 {
        return Err(ScreenError::InvalidConfig("fingerprint width must be positive".to_string()));
    }
    let fingerprinter: Box<dyn Fingerprinter<Molecule>> = match name.to_ascii_lowercase().as_str() {
        "path" | "standard" | "default" => {
            Box::new(PathFingerprinter::new(options.width, options.path_depth))
        }
        "circular" | "ecfp" => Box::new(CircularFingerprinter::new(options.width, DEFAULT_RADIUS)),
        "element" => Box::new(ElementFingerprinter::new(options.width)),
        _ => {
            return Err(ScreenError::UnknownFingerprinter {
                name: name.to_string(),
                known: KNOWN.join(", "),
            });
        }
    };
    Ok(fingerprinter)
}
