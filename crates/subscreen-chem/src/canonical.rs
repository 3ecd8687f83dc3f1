//! 色精密化 + 個別化による正規キー
//!
//! 連結成分ごとに正規形を作る。原子の初期色は (原子番号, 電荷, 次数)。各反復で
//! 「自分の色 + 隣接 (結合次数, 色) の多重集合」から新しい色を作り、色クラス数が
//! 増えなくなったら止める。単一でない色クラスが残れば、そのクラスの原子を 1 つずつ
//! 個別化して精密化をやり直し、全原子の色が異なる葉ごとに隣接リストを符号化する。
//! 全ての葉のうち辞書順最小の符号を成分の正規形とする。
//!
//! 成分の正規形をソートして SHA-256 にかけ、InChIKey 風の文字列にする。

use sha2::{Digest, Sha256};
use subscreen_core::{CanonicalKey, CanonicalKeyer, KeyFailure};
use xxhash_rust::xxh3::xxh3_64;

use crate::element::atomic_number;
use crate::molecule::Molecule;

/// キーを作れる重原子数の上限
pub const MAX_KEYED_ATOMS: usize = 1023;

/// 1 成分あたりに調べる探索木の葉の上限
pub const MAX_SEARCH_LEAVES: usize = 100_000;

const PSEUDO_ATOMS: [&str; 7] = ["R", "R#", "*", "A", "Q", "L", "LP"];

/// 色精密化ベースの [`CanonicalKeyer`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorRefinementKeyer;

impl ColorRefinementKeyer {
    pub fn new() -> Self {
        Self
    }
}

impl CanonicalKeyer<Molecule> for ColorRefinementKeyer {
    fn canonical_key(&self, mol: &Molecule) -> Result<CanonicalKey, KeyFailure> {
        let digest = canonical_digest(mol)?;
        Ok(CanonicalKey::new(render_key(&digest)))
    }
}

fn check_keyable(mol: &Molecule) -> Result<Vec<u8>, KeyFailure> {
    if mol.atom_count() == 0 {
        return Err(KeyFailure::new("molecule has no heavy atoms"));
    }
    if mol.atom_count() > MAX_KEYED_ATOMS {
        return Err(KeyFailure::new(format!(
            "molecule has {} heavy atoms (limit {MAX_KEYED_ATOMS})",
            mol.atom_count()
        )));
    }
    mol.atoms()
        .map(|a| {
            let symbol = &mol.atom(a).symbol;
            if PSEUDO_ATOMS.contains(&symbol.as_str()) {
                return Err(KeyFailure::new(format!("pseudo atom '{symbol}'")));
            }
            atomic_number(symbol).ok_or_else(|| KeyFailure::new(format!("unknown element '{symbol}'")))
        })
        .collect()
}

/// 連結成分をローカル番号で持ったもの
struct Component {
    /// (原子番号, 電荷)
    labels: Vec<(u8, i8)>,
    /// (隣接原子, 結合次数コード)
    adj: Vec<Vec<(usize, u8)>>,
}

impl Component {
    fn len(&self) -> usize {
        self.labels.len()
    }

    fn initial_colors(&self) -> Vec<u64> {
        self.labels
            .iter()
            .zip(&self.adj)
            .map(|(&(z, charge), nbrs)| {
                let degree = (nbrs.len() as u16).to_le_bytes();
                xxh3_64(&[z, charge as u8, degree[0], degree[1]])
            })
            .collect()
    }
}

fn split_components(mol: &Molecule, numbers: &[u8]) -> Vec<Component> {
    let n = mol.atom_count();
    let mut local = vec![usize::MAX; n];
    let mut components = Vec::new();

    for start in mol.atoms() {
        if local[start.index()] != usize::MAX {
            continue;
        }
        let mut members = vec![start];
        local[start.index()] = 0;
        let mut head = 0;
        while head < members.len() {
            let a = members[head];
            head += 1;
            for n in mol.neighbors(a) {
                if local[n.index()] == usize::MAX {
                    local[n.index()] = members.len();
                    members.push(n);
                }
            }
        }
        let labels = members
            .iter()
            .map(|&a| (numbers[a.index()], mol.atom(a).charge))
            .collect();
        let adj = members
            .iter()
            .map(|&a| {
                mol.bonded(a)
                    .map(|(n, order)| (local[n.index()], order.mdl_code()))
                    .collect()
            })
            .collect();
        components.push(Component { labels, adj });
    }
    components
}

/// 安定した色分割を求める
fn refine(comp: &Component, mut colors: Vec<u64>) -> Vec<u64> {
    let mut classes = class_count(&colors);

    for _ in 0..comp.len() {
        let next: Vec<u64> = comp
            .adj
            .iter()
            .enumerate()
            .map(|(a, nbrs)| {
                let mut env: Vec<(u8, u64)> =
                    nbrs.iter().map(|&(n, order)| (order, colors[n])).collect();
                env.sort_unstable();
                let mut bytes = Vec::with_capacity(8 + env.len() * 9);
                bytes.extend_from_slice(&colors[a].to_le_bytes());
                for (order, color) in env {
                    bytes.push(order);
                    bytes.extend_from_slice(&color.to_le_bytes());
                }
                xxh3_64(&bytes)
            })
            .collect();
        let next_classes = class_count(&next);
        colors = next;
        if next_classes == classes {
            break;
        }
        classes = next_classes;
    }
    colors
}

fn class_count(colors: &[u64]) -> usize {
    let mut sorted = colors.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len()
}

/// 個別化の対象にする色クラス。最小サイズ、同サイズなら色の小さい方。
/// 全クラスが単一なら `None`。
fn target_cell(colors: &[u64]) -> Option<Vec<usize>> {
    let mut order: Vec<(u64, usize)> = colors.iter().copied().zip(0..).collect();
    order.sort_unstable();

    let mut best: Option<&[(u64, usize)]> = None;
    for run in order.chunk_by(|x, y| x.0 == y.0) {
        if run.len() < 2 {
            continue;
        }
        if best.is_none_or(|b| run.len() < b.len()) {
            best = Some(run);
        }
    }
    best.map(|run| run.iter().map(|&(_, v)| v).collect())
}

/// 同じ隣接リストを持つ原子（双子）は入れ替えても同じ葉集合になるので 1 つだけ残す
fn twin_representatives(comp: &Component, cell: &[usize]) -> Vec<usize> {
    let mut seen: Vec<Vec<(usize, u8)>> = Vec::new();
    let mut reps = Vec::new();
    for &v in cell {
        let mut nbrs = comp.adj[v].clone();
        nbrs.sort_unstable();
        if !seen.contains(&nbrs) {
            seen.push(nbrs);
            reps.push(v);
        }
    }
    reps
}

fn individualize(color: u64, depth: u32) -> u64 {
    let mut bytes = [0u8; 13];
    bytes[..8].copy_from_slice(&color.to_le_bytes());
    bytes[8..12].copy_from_slice(&depth.to_le_bytes());
    bytes[12] = b'*';
    xxh3_64(&bytes)
}

/// 離散分割での符号。色順を順位とし、原子ラベル列と (順位, 順位, 次数) のソート済み列を並べる。
fn encode(comp: &Component, colors: &[u64]) -> Vec<u32> {
    let mut order: Vec<usize> = (0..comp.len()).collect();
    order.sort_unstable_by_key(|&v| colors[v]);
    let mut rank = vec![0u32; comp.len()];
    for (r, &v) in order.iter().enumerate() {
        rank[v] = r as u32;
    }

    let mut form = Vec::with_capacity(2 + comp.len() * 4);
    form.push(comp.len() as u32);
    for &v in &order {
        let (z, charge) = comp.labels[v];
        form.push((z as u32) << 8 | charge as u8 as u32);
    }
    let mut edges: Vec<(u32, u32, u32)> = Vec::new();
    for (v, nbrs) in comp.adj.iter().enumerate() {
        for &(w, bond) in nbrs {
            if rank[v] < rank[w] {
                edges.push((rank[v], rank[w], bond as u32));
            }
        }
    }
    edges.sort_unstable();
    form.push(edges.len() as u32);
    for (a, b, bond) in edges {
        form.extend([a, b, bond]);
    }
    form
}

struct LabelSearch<'a> {
    comp: &'a Component,
    leaves: usize,
    best: Option<Vec<u32>>,
}

impl LabelSearch<'_> {
    fn descend(&mut self, colors: Vec<u64>, depth: u32) -> Result<(), KeyFailure> {
        let colors = refine(self.comp, colors);
        let Some(cell) = target_cell(&colors) else {
            self.leaves += 1;
            if self.leaves > MAX_SEARCH_LEAVES {
                return Err(KeyFailure::new(format!(
                    "labelling search exceeded {MAX_SEARCH_LEAVES} leaves"
                )));
            }
            let form = encode(self.comp, &colors);
            if self.best.as_ref().is_none_or(|b| form < *b) {
                self.best = Some(form);
            }
            return Ok(());
        };
        for v in twin_representatives(self.comp, &cell) {
            let mut next = colors.clone();
            next[v] = individualize(colors[v], depth);
            self.descend(next, depth + 1)?;
        }
        Ok(())
    }
}

fn canonical_form(comp: &Component) -> Result<Vec<u32>, KeyFailure> {
    let mut search = LabelSearch {
        comp,
        leaves: 0,
        best: None,
    };
    search.descend(comp.initial_colors(), 0)?;
    search
        .best
        .ok_or_else(|| KeyFailure::new("labelling search produced no leaf"))
}

fn canonical_digest(mol: &Molecule) -> Result<[u8; 32], KeyFailure> {
    let numbers = check_keyable(mol)?;
    let mut forms = split_components(mol, &numbers)
        .iter()
        .map(canonical_form)
        .collect::<Result<Vec<_>, _>>()?;
    forms.sort_unstable();

    let mut hasher = Sha256::new();
    hasher.update((forms.len() as u64).to_le_bytes());
    for form in &forms {
        hasher.update((form.len() as u64).to_le_bytes());
        for word in form {
            hasher.update(word.to_le_bytes());
        }
    }
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&hasher.finalize());
    Ok(digest)
}

/// `XXXXXXXXXXXXXX-XXXXXXXXXX-N` 形式（大文字英字 14 + 10）
fn render_key(digest: &[u8; 32]) -> String {
    let letter = |b: &u8| char::from(b'A' + b % 26);
    let first: String = digest[..14].iter().map(letter).collect();
    let second: String = digest[14..24].iter().map(letter).collect();
    format!("{first}-{second}-N")
}
