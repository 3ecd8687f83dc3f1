//! SD ファイルを [`StructureReader`] として読む

use std::io::{BufRead, Cursor, Read};
use std::path::Path;
use std::sync::OnceLock;

use subscreen_chem::{Molecule, SdfRecords};
use subscreen_core::{ScreenError, ScreenResult, StructureReader};

use crate::common::io::{is_stdio, open_reader};

/// ファイル（`.gz` 可）または標準入力から分子を読む
///
/// 件数を数える事前パスと本読み込みで同じ入力を 2 回読むため、
/// 標準入力は初回にすべてメモリへ読み込んで使い回す。
#[derive(Debug, Default)]
pub struct SdfFileReader {
    stdin: OnceLock<Vec<u8>>,
}

impl SdfFileReader {
    pub fn new() -> Self {
        Self::default()
    }

    fn stdin_bytes(&self) -> ScreenResult<&[u8]> {
        if let Some(bytes) = self.stdin.get() {
            return Ok(bytes);
        }
        let mut buf = Vec::new();
        open_reader("-")
            .and_then(|mut r| r.read_to_end(&mut buf))
            .map_err(|e| ScreenError::io("-", e))?;
        Ok(self.stdin.get_or_init(|| buf))
    }
}

impl StructureReader<Molecule> for SdfFileReader {
    fn read<'a>(
        &'a self,
        source: &Path,
    ) -> ScreenResult<Box<dyn Iterator<Item = ScreenResult<Molecule>> + 'a>> {
        let reader: Box<dyn BufRead + 'a> = if is_stdio(source) {
            Box::new(Cursor::new(self.stdin_bytes()?))
        } else {
            open_reader(source).map_err(|e| ScreenError::io(source, e))?
        };
        Ok(Box::new(SdfRecords::new(reader, source)))
    }
}
