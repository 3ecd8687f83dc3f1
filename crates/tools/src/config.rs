//! 実行設定
//!
//! 優先順位は CLI フラグ > 設定ファイル > 既定値。設定ファイルは拡張子で
//! TOML / YAML / JSON を判別し、未知のキーはエラーにする。

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use subscreen_chem::fingerprint::{DEFAULT_FINGERPRINT_WIDTH, DEFAULT_PATH_DEPTH};
use subscreen_chem::{DEFAULT_MIN_FRAGMENT_ATOMS, FingerprintOptions};
use subscreen_core::{
    DEFAULT_ACCURACY_DIGITS, DEFAULT_MAX_FALSE_NEGATIVE_EXAMPLES, MAX_ACCURACY_DIGITS, ScreenError,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// rayon のスレッド数（0 = 既定、1 = 逐次評価）
    pub threads: usize,
    /// フラグメントとして残す最小の重原子数
    pub min_fragment_atoms: usize,
    /// 指紋のビット幅
    pub fingerprint_width: usize,
    /// path 指紋のパス長（結合数）
    pub path_depth: usize,
    pub accuracy_digits: u32,
    /// 保持する偽陰性ペアの件数
    pub max_false_negative_examples: usize,
    /// 進捗バーを表示するか
    pub progress: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            min_fragment_atoms: DEFAULT_MIN_FRAGMENT_ATOMS,
            fingerprint_width: DEFAULT_FINGERPRINT_WIDTH,
            path_depth: DEFAULT_PATH_DEPTH,
            accuracy_digits: DEFAULT_ACCURACY_DIGITS,
            max_false_negative_examples: DEFAULT_MAX_FALSE_NEGATIVE_EXAMPLES,
            progress: true,
        }
    }
}

/// CLI から与えられた上書き値（未指定は `None`）
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub threads: Option<usize>,
    pub min_fragment_atoms: Option<usize>,
    pub fingerprint_width: Option<usize>,
    pub path_depth: Option<usize>,
    pub accuracy_digits: Option<u32>,
    pub max_false_negative_examples: Option<usize>,
    pub no_progress: bool,
}

impl RunConfig {
    /// 設定ファイル（任意）を読み、CLI の上書きを適用して検証する
    pub fn resolve(file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = match file {
            Some(path) => load_config_file(path)?,
            None => RunConfig::default(),
        };
        config.apply(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn apply(&mut self, o: &ConfigOverrides) {
        macro_rules! take {
            ($field:ident) => {
                if let Some(v) = o.$field {
                    self.$field = v;
                }
            };
        }
        take!(threads);
        take!(min_fragment_atoms);
        take!(fingerprint_width);
        take!(path_depth);
        take!(accuracy_digits);
        take!(max_false_negative_examples);
        if o.no_progress {
            self.progress = false;
        }
    }

    pub fn validate(&self) -> Result<(), ScreenError> {
        let invalid = |msg: String| Err(ScreenError::InvalidConfig(msg));
        if self.fingerprint_width == 0 {
            return invalid("fingerprint_width must be positive".to_string());
        }
        if self.path_depth == 0 {
            return invalid("path_depth must be at least 1".to_string());
        }
        if self.accuracy_digits > MAX_ACCURACY_DIGITS {
            return invalid(format!(
                "accuracy_digits must be at most {MAX_ACCURACY_DIGITS} (got {})",
                self.accuracy_digits
            ));
        }
        if self.min_fragment_atoms == 0 {
            return invalid("min_fragment_atoms must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn fingerprint_options(&self) -> FingerprintOptions {
        FingerprintOptions {
            width: self.fingerprint_width,
            path_depth: self.path_depth,
        }
    }
}

/// 拡張子で形式を判別して設定ファイルを読む
pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<RunConfig> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let ext = path.extension().and_then(|s| s.to_str()).map(|s| s.to_ascii_lowercase());
    let config = match ext.as_deref() {
        Some("toml") => toml::from_str(&data).map_err(anyhow::Error::from),
        Some("yaml") | Some("yml") => serde_yaml::from_str(&data).map_err(anyhow::Error::from),
        Some("json") => serde_json::from_str(&data).map_err(anyhow::Error::from),
        _ => bail!(
            "Unsupported config file extension (expected .toml, .yaml, .yml or .json): {}",
            path.display()
        ),
    };
    config.with_context(|| format!("Failed to parse config file: {}", path.display()))
}
