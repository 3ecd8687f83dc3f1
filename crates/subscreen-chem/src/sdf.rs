//! MDL SD ファイル（V2000）の読み込み
//!
//! `$$$$` で区切られた molfile を順に分子へ変換する。明示水素は読み込み時に落とす。
//! 壊れたレコードは警告を出して読み飛ばし、I/O エラーと UTF-8 でない入力は
//! 致命的エラーとして返す。

use std::io::BufRead;
use std::path::{Path, PathBuf};

use subscreen_core::{ScreenError, ScreenResult};

use crate::element::is_hydrogen;
use crate::molecule::{BondOrder, Molecule};

const RECORD_DELIMITER: &str = "$$$$";

/// SD ファイルのレコードを遅延的に読むイテレータ
pub struct SdfRecords<R> {
    reader: R,
    path: PathBuf,
    record_no: usize,
    done: bool,
}

impl<R: BufRead> SdfRecords<R> {
    pub fn new(reader: R, path: impl AsRef<Path>) -> Self {
        Self {
            reader,
            path: path.as_ref().to_path_buf(),
            record_no: 0,
            done: false,
        }
    }

    /// 次のレコードの行を集める。EOF なら `None`。
    fn next_block(&mut self) -> ScreenResult<Option<Vec<String>>> {
        let mut lines = Vec::new();
        let mut buf = String::new();
        loop {
            buf.clear();
            let n = self.reader.read_line(&mut buf).map_err(|e| {
                if e.kind() == std::io::ErrorKind::InvalidData {
                    ScreenError::Parse {
                        path: self.path.clone(),
                        message: format!("record #{} is not valid UTF-8", self.record_no + 1),
                    }
                } else {
                    ScreenError::io(&self.path, e)
                }
            })?;
            if n == 0 {
                if lines.iter().all(|l: &String| l.trim().is_empty()) {
                    return Ok(None);
                }
                return Ok(Some(lines));
            }
            let line = buf.trim_end_matches(['\n', '\r']);
            if line.trim_end() == RECORD_DELIMITER {
                return Ok(Some(lines));
            }
            lines.push(line.to_string());
        }
    }
}

impl<R: BufRead> Iterator for SdfRecords<R> {
    type Item = ScreenResult<Molecule>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let block = match self.next_block() {
                Ok(Some(block)) => block,
                Ok(None) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            if block.iter().all(|l| l.trim().is_empty()) {
                continue;
            }
            self.record_no += 1;
            match parse_molfile(&block) {
                Ok(mol) => return Some(Ok(mol)),
                Err(msg) => {
                    log::warn!(
                        "{}: skipping malformed record #{}: {msg}",
                        self.path.display(),
                        self.record_no
                    );
                }
            }
        }
        None
    }
}

/// 固定幅フィールドを取り出す（行が短ければ空文字列）
fn field(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    line.get(start..end).map(str::trim).unwrap_or("")
}

fn parse_count(line: &str, start: usize, what: &str) -> Result<usize, String> {
    let s = field(line, start, start + 3);
    s.parse::<usize>().map_err(|_| format!("invalid {what} count '{s}'"))
}

/// MDL の電荷コード（0, 1=+3, 2=+2, 3=+1, 4=ラジカル, 5=-1, 6=-2, 7=-3）
fn charge_from_code(code: &str) -> i8 {
    match code.parse::<u8>().unwrap_or(0) {
        1 => 3,
        2 => 2,
        3 => 1,
        5 => -1,
        6 => -2,
        7 => -3,
        _ => 0,
    }
}

/// 1 レコード分の行から分子を作る
pub fn parse_molfile(lines: &[String]) -> Result<Molecule, String> {
    if lines.len() < 4 {
        return Err("record is shorter than the molfile header".to_string());
    }
    let title = lines[0].trim().to_string();
    let counts = &lines[3];
    if counts.contains("V3000") {
        return Err("V3000 molfiles are not supported".to_string());
    }
    let atom_count = parse_count(counts, 0, "atom")?;
    let bond_count = parse_count(counts, 3, "bond")?;
    let atom_end = 4 + atom_count;
    let bond_end = atom_end + bond_count;
    if lines.len() < bond_end {
        return Err(format!(
            "truncated record: expected {atom_count} atoms and {bond_count} bonds"
        ));
    }

    let mut symbols = Vec::with_capacity(atom_count);
    let mut charges = Vec::with_capacity(atom_count);
    for (i, line) in lines[4..atom_end].iter().enumerate() {
        let symbol = field(line, 31, 34);
        if symbol.is_empty() {
            return Err(format!("atom {} has no symbol", i + 1));
        }
        symbols.push(symbol.to_string());
        charges.push(charge_from_code(field(line, 36, 39)));
    }

    let mut bonds = Vec::with_capacity(bond_count);
    for (i, line) in lines[atom_end..bond_end].iter().enumerate() {
        let a = field(line, 0, 3).parse::<usize>();
        let b = field(line, 3, 6).parse::<usize>();
        let order = field(line, 6, 9).parse::<u8>().ok().and_then(BondOrder::from_mdl);
        match (a, b, order) {
            (Ok(a), Ok(b), Some(order)) if (1..=atom_count).contains(&a)
                && (1..=atom_count).contains(&b) =>
            {
                bonds.push((a - 1, b - 1, order));
            }
            _ => return Err(format!("bond {} is invalid: '{line}'", i + 1)),
        }
    }

    // プロパティブロック: M  CHG があれば原子ブロックの電荷は無視する
    let mut chg_seen = false;
    for line in &lines[bond_end..] {
        if line.starts_with("M  END") {
            break;
        }
        if let Some(rest) = line.strip_prefix("M  CHG") {
            if !chg_seen {
                charges.iter_mut().for_each(|c| *c = 0);
                chg_seen = true;
            }
            let tokens: Vec<&str> = rest.split_whitespace().collect();
            for pair in tokens.get(1..).unwrap_or(&[]).chunks(2) {
                if let [atom, value] = pair {
                    let atom = atom.parse::<usize>().map_err(|_| format!("bad M  CHG '{line}'"))?;
                    let value = value.parse::<i8>().map_err(|_| format!("bad M  CHG '{line}'"))?;
                    if atom == 0 || atom > atom_count {
                        return Err(format!("M  CHG refers to atom {atom}"));
                    }
                    charges[atom - 1] = value;
                }
            }
        }
    }

    let mut mol = Molecule::new(title);
    let mut remap = vec![None; atom_count];
    for (i, symbol) in symbols.iter().enumerate() {
        if !is_hydrogen(symbol) {
            remap[i] = Some(mol.add_atom(symbol, charges[i]));
        }
    }
    for (a, b, order) in bonds {
        if let (Some(na), Some(nb)) = (remap[a], remap[b]) {
            mol.add_bond(na, nb, order);
        }
    }
    Ok(mol)
}
