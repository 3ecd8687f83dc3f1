//! 水素抑制した分子グラフ

use std::fmt;

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

/// 重原子
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Atom {
    pub symbol: String,
    pub charge: i8,
}

impl Atom {
    /// 原子同士の照合条件（記号と形式電荷が一致）
    pub fn matches(&self, other: &Atom) -> bool {
        self.symbol == other.symbol && self.charge == other.charge
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.charge {
            0 => write!(f, "{}", self.symbol),
            c if c > 0 => write!(f, "{}+{}", self.symbol, c),
            c => write!(f, "{}{}", self.symbol, c),
        }
    }
}

/// 結合次数
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// MDL の結合タイプ番号（1/2/3/4）から変換
    pub fn from_mdl(code: u8) -> Option<BondOrder> {
        match code {
            1 => Some(BondOrder::Single),
            2 => Some(BondOrder::Double),
            3 => Some(BondOrder::Triple),
            4 => Some(BondOrder::Aromatic),
            _ => None,
        }
    }

    pub fn mdl_code(self) -> u8 {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Aromatic => 4,
        }
    }

    /// パス文字列用の 1 文字表記
    pub fn symbol(self) -> char {
        match self {
            BondOrder::Single => '-',
            BondOrder::Double => '=',
            BondOrder::Triple => '#',
            BondOrder::Aromatic => ':',
        }
    }
}

/// 分子（タイトル + 無向グラフ）
#[derive(Clone, Debug)]
pub struct Molecule {
    title: String,
    graph: UnGraph<Atom, BondOrder>,
}

impl Molecule {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            graph: UnGraph::new_undirected(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn graph(&self) -> &UnGraph<Atom, BondOrder> {
        &self.graph
    }

    pub fn add_atom(&mut self, symbol: &str, charge: i8) -> NodeIndex {
        self.graph.add_node(Atom {
            symbol: symbol.to_string(),
            charge,
        })
    }

    /// 結合を追加する。同じ原子対の 2 本目は無視する。
    pub fn add_bond(&mut self, a: NodeIndex, b: NodeIndex, order: BondOrder) -> Option<EdgeIndex> {
        if a == b || self.graph.find_edge(a, b).is_some() {
            return None;
        }
        Some(self.graph.add_edge(a, b, order))
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn atom(&self, idx: NodeIndex) -> &Atom {
        &self.graph[idx]
    }

    pub fn atoms(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.graph.neighbors(idx).count()
    }

    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    /// 隣接原子と結合次数の組
    pub fn bonded(&self, idx: NodeIndex) -> impl Iterator<Item = (NodeIndex, BondOrder)> + '_ {
        self.graph.edges(idx).map(move |e| {
            let other = if e.source() == idx { e.target() } else { e.source() };
            (other, *e.weight())
        })
    }

    pub fn bond_between(&self, a: NodeIndex, b: NodeIndex) -> Option<BondOrder> {
        self.graph.find_edge(a, b).map(|e| self.graph[e])
    }

    /// 結合の両端と次数
    pub fn bonds(&self) -> impl Iterator<Item = (EdgeIndex, NodeIndex, NodeIndex, BondOrder)> + '_ {
        self.graph.edge_references().map(|e| (e.id(), e.source(), e.target(), *e.weight()))
    }

    /// 指定した原子集合の誘導部分グラフを新しい分子として取り出す
    pub fn induced(&self, atoms: &[NodeIndex], title: impl Into<String>) -> Molecule {
        let mut sub = Molecule::new(title);
        let mut remap = vec![None; self.atom_count()];
        for &a in atoms {
            let atom = self.atom(a);
            remap[a.index()] = Some(sub.add_atom(&atom.symbol, atom.charge));
        }
        for (_, a, b, order) in self.bonds() {
            if let (Some(na), Some(nb)) = (remap[a.index()], remap[b.index()]) {
                sub.add_bond(na, nb, order);
            }
        }
        sub
    }
}

impl fmt::Display for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} atoms, {} bonds)", self.title, self.atom_count(), self.bond_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{benzene, mol};

    #[test]
    fn test_duplicate_bond_is_ignored() {
        let mut m = Molecule::new("m");
        let a = m.add_atom("C", 0);
        let b = m.add_atom("O", 0);
        assert!(m.add_bond(a, b, BondOrder::Double).is_some());
        assert!(m.add_bond(b, a, BondOrder::Single).is_none());
        assert!(m.add_bond(a, a, BondOrder::Single).is_none());
        assert_eq!(m.bond_count(), 1);
        assert_eq!(m.bond_between(b, a), Some(BondOrder::Double));
    }

    #[test]
    fn test_induced_subgraph() {
        // C-C(=O)-N
        let m = mol(&["C", "C", "O", "N"], &[(0, 1, 1), (1, 2, 2), (1, 3, 1)]);
        let atoms: Vec<_> = m.atoms().filter(|&i| m.atom(i).symbol != "N").collect();
        let sub = m.induced(&atoms, "sub");
        assert_eq!(sub.atom_count(), 3);
        assert_eq!(sub.bond_count(), 2);
        assert_eq!(sub.title(), "sub");
    }

    #[test]
    fn test_degree_and_bonded() {
        let m = benzene();
        for a in m.atoms() {
            assert_eq!(m.degree(a), 2);
            assert!(m.bonded(a).all(|(_, order)| order == BondOrder::Aromatic));
        }
    }

    #[test]
    fn test_atom_display() {
        let plus = Atom {
            symbol: "N".into(),
            charge: 1,
        };
        let minus = Atom {
            symbol: "O".into(),
            charge: -1,
        };
        assert_eq!(plus.to_string(), "N+1");
        assert_eq!(minus.to_string(), "O-1");
    }
}
