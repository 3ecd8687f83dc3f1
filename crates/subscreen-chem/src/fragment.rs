//! 非環単結合を切る網羅的フラグメント分解

use std::collections::{BTreeSet, HashSet};

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use subscreen_core::Fragmenter;

use crate::molecule::{BondOrder, Molecule};
use crate::rings::ring_bond_flags;

/// フラグメントとして残す最小の重原子数
pub const DEFAULT_MIN_FRAGMENT_ATOMS: usize = 6;

/// 切断可能な結合を繰り返し切って得られる連結片をすべて列挙する
#[derive(Debug, Clone, Copy)]
pub struct ExhaustiveFragmenter {
    min_atoms: usize,
}

impl Default for ExhaustiveFragmenter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_FRAGMENT_ATOMS)
    }
}

impl ExhaustiveFragmenter {
    pub fn new(min_atoms: usize) -> Self {
        Self { min_atoms: min_atoms.max(1) }
    }

    pub fn min_atoms(&self) -> usize {
        self.min_atoms
    }

    /// 単結合・非環・両端が末端原子でない結合
    pub fn splittable_bonds(mol: &Molecule) -> Vec<(EdgeIndex, NodeIndex, NodeIndex)> {
        let in_ring = ring_bond_flags(mol);
        mol.bonds()
            .filter(|&(e, a, b, order)| {
                order == BondOrder::Single
                    && !in_ring[e.index()]
                    && mol.degree(a) > 1
                    && mol.degree(b) > 1
            })
            .map(|(e, a, b, _)| (e, a, b))
            .collect()
    }

    /// 原子集合（ソート済み）ごとの連結片
    fn pieces(&self, mol: &Molecule) -> Vec<Vec<NodeIndex>> {
        let splittable = Self::splittable_bonds(mol);
        if splittable.is_empty() {
            return Vec::new();
        }
        let whole: Vec<NodeIndex> = mol.atoms().collect();
        let mut seen: HashSet<Vec<NodeIndex>> = HashSet::new();
        let mut found: BTreeSet<Vec<NodeIndex>> = BTreeSet::new();
        let mut queue = vec![whole.clone()];
        seen.insert(whole.clone());

        while let Some(piece) = queue.pop() {
            let mut member = vec![false; mol.atom_count()];
            for a in &piece {
                member[a.index()] = true;
            }
            for &(cut, a, b) in &splittable {
                if !(member[a.index()] && member[b.index()]) {
                    continue;
                }
                for start in [a, b] {
                    let side = component_without(mol, &member, start, cut);
                    // min 未満の片からそれ以上の片は出てこない
                    if side.len() < self.min_atoms || !seen.insert(side.clone()) {
                        continue;
                    }
                    found.insert(side.clone());
                    queue.push(side);
                }
            }
        }
        found.remove(&whole);
        found.into_iter().collect()
    }
}

/// `member` 内で `cut` を通らずに `start` から到達できる原子（ソート済み）
fn component_without(
    mol: &Molecule,
    member: &[bool],
    start: NodeIndex,
    cut: EdgeIndex,
) -> Vec<NodeIndex> {
    let graph = mol.graph();
    let mut visited = vec![false; mol.atom_count()];
    let mut stack = vec![start];
    let mut out = Vec::new();
    visited[start.index()] = true;
    while let Some(v) = stack.pop() {
        out.push(v);
        for edge in graph.edges(v) {
            if edge.id() == cut {
                continue;
            }
            let w = if edge.source() == v { edge.target() } else { edge.source() };
            if member[w.index()] && !visited[w.index()] {
                visited[w.index()] = true;
                stack.push(w);
            }
        }
    }
    out.sort_unstable();
    out
}

impl Fragmenter<Molecule> for ExhaustiveFragmenter {
    fn fragments(&self, mol: &Molecule) -> Vec<Molecule> {
        self.pieces(mol)
            .into_iter()
            .enumerate()
            .map(|(i, atoms)| mol.induced(&atoms, format!("{} fragment {}", mol.title(), i + 1)))
            .collect()
    }
}
