//! 化学ライブラリなしでコアを動かすための最小の能力実装
#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use subscreen_core::{
    CanonicalKey, CanonicalKeyer, ContainmentOracle, Fingerprint, Fingerprinter, Fragmenter,
    KeyFailure, ProgressSink, ScreenError, ScreenResult, Stage, StructureReader,
};

pub const WIDTH: usize = 16;

/// 文字列で表した玩具の構造。含有判定は部分文字列かどうか。
#[derive(Clone, Debug)]
pub struct Toy {
    pub text: String,
    pub key: Option<String>,
    pub bits: Vec<usize>,
    pub parts: Vec<Toy>,
}

impl Toy {
    /// キー = 文字列そのもの
    pub fn new(text: &str, bits: &[usize]) -> Self {
        Self {
            text: text.to_string(),
            key: Some(text.to_string()),
            bits: bits.to_vec(),
            parts: Vec::new(),
        }
    }

    pub fn unkeyed(text: &str, bits: &[usize]) -> Self {
        Self {
            key: None,
            ..Self::new(text, bits)
        }
    }

    pub fn with_parts(mut self, parts: Vec<Toy>) -> Self {
        self.parts = parts;
        self
    }
}

#[derive(Default)]
pub struct ToyFingerprinter {
    pub calls: AtomicUsize,
}

impl ToyFingerprinter {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Fingerprinter<Toy> for ToyFingerprinter {
    fn name(&self) -> &str {
        "toy"
    }

    fn width(&self) -> usize {
        WIDTH
    }

    fn fingerprint(&self, structure: &Toy) -> Fingerprint {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Fingerprint::from_indices(WIDTH, structure.bits.iter().copied())
    }
}

pub struct ToyKeyer;

impl CanonicalKeyer<Toy> for ToyKeyer {
    fn canonical_key(&self, structure: &Toy) -> Result<CanonicalKey, KeyFailure> {
        structure
            .key
            .as_deref()
            .map(CanonicalKey::from)
            .ok_or_else(|| KeyFailure::new(format!("no key for {}", structure.text)))
    }
}

pub struct ToyFragmenter;

impl Fragmenter<Toy> for ToyFragmenter {
    fn fragments(&self, structure: &Toy) -> Vec<Toy> {
        structure.parts.clone()
    }
}

/// container が candidate を部分文字列として含むか
pub struct SubstringOracle;

impl ContainmentOracle<Toy> for SubstringOracle {
    fn contains(&self, container: &Toy, candidate: &Toy) -> bool {
        container.text.contains(&candidate.text)
    }
}

pub struct NeverOracle;

impl ContainmentOracle<Toy> for NeverOracle {
    fn contains(&self, _container: &Toy, _candidate: &Toy) -> bool {
        false
    }
}

/// パス → レコード列の対応表。登録のないパスは読めない。
#[derive(Default)]
pub struct MemoryReader {
    pub sources: HashMap<PathBuf, Vec<Toy>>,
}

impl MemoryReader {
    pub fn with_source(mut self, path: &str, records: Vec<Toy>) -> Self {
        self.sources.insert(PathBuf::from(path), records);
        self
    }
}

impl StructureReader<Toy> for MemoryReader {
    fn read<'a>(
        &'a self,
        source: &Path,
    ) -> ScreenResult<Box<dyn Iterator<Item = ScreenResult<Toy>> + 'a>> {
        let records = self.sources.get(source).ok_or_else(|| {
            ScreenError::io(source, io::Error::new(io::ErrorKind::NotFound, "no such source"))
        })?;
        Ok(Box::new(records.iter().cloned().map(Ok)))
    }
}

/// 通知をすべて記録する進捗受け手
#[derive(Default)]
pub struct RecordingProgress {
    pub events: Mutex<Vec<(Stage, u64, u64)>>,
}

impl RecordingProgress {
    pub fn events_for(&self, stage: Stage) -> Vec<(u64, u64)> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _, _)| *s == stage)
            .map(|(_, c, t)| (*c, *t))
            .collect()
    }
}

impl ProgressSink for RecordingProgress {
    fn advance(&self, stage: Stage, completed: u64, total: u64) {
        self.events.lock().unwrap().push((stage, completed, total));
    }
}
