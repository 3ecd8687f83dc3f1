use subscreen_core::{Fingerprint, Fingerprinter};
use xxhash_rust::xxh3::xxh3_64;

use petgraph::graph::NodeIndex;

use crate::molecule::Molecule;

/// 線形パス指紋
///
/// 各原子から長さ `0..=depth` 結合の単純パスを列挙し、向きに依存しない文字列
/// （正逆のうち辞書順で小さい方）をハッシュしてビットを立てる。
/// 部分グラフのパスは親のパスでもあるので、部分構造の指紋は親の指紋の部分集合になる。
#[derive(Debug, Clone, Copy)]
pub struct PathFingerprinter {
    width: usize,
    depth: usize,
}

impl PathFingerprinter {
    pub fn new(width: usize, depth: usize) -> Self {
        Self { width, depth }
    }

    /// 分子中の全パス文字列（重複あり）
    pub fn paths(&self, mol: &Molecule) -> Vec<String> {
        let mut out = Vec::new();
        let mut on_path = vec![false; mol.atom_count()];
        for start in mol.atoms() {
            let mut tokens = vec![mol.atom(start).to_string()];
            on_path[start.index()] = true;
            self.walk(mol, start, &mut on_path, &mut tokens, &mut out);
            on_path[start.index()] = false;
        }
        out
    }

    fn walk(
        &self,
        mol: &Molecule,
        at: NodeIndex,
        on_path: &mut [bool],
        tokens: &mut Vec<String>,
        out: &mut Vec<String>,
    ) {
        out.push(canonical_path(tokens));
        // tokens は 原子, 結合, 原子, ... の並び
        if tokens.len() / 2 >= self.depth {
            return;
        }
        for (next, order) in mol.bonded(at) {
            if on_path[next.index()] {
                continue;
            }
            on_path[next.index()] = true;
            tokens.push(order.symbol().to_string());
            tokens.push(mol.atom(next).to_string());
            self.walk(mol, next, on_path, tokens, out);
            tokens.truncate(tokens.len() - 2);
            on_path[next.index()] = false;
        }
    }
}

fn canonical_path(tokens: &[String]) -> String {
    let forward = tokens.join("");
    let backward: String = tokens.iter().rev().map(String::as_str).collect();
    forward.min(backward)
}

impl Fingerprinter<Molecule> for PathFingerprinter {
    fn name(&self) -> &str {
        "path"
    }

    fn width(&self) -> usize {
        self.width
    }

    fn fingerprint(&self, mol: &Molecule) -> Fingerprint {
        let width = self.width;
        Fingerprint::from_indices(
            width,
            self.paths(mol).iter().map(|p| (xxh3_64(p.as_bytes()) % width as u64) as usize),
        )
    }
}
