//! 環結合の判定
//!
//! 結合が環に属さない ⇔ その結合が橋（取り除くと連結成分が増える辺）。
//! Tarjan の lowlink で橋を列挙する。

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::molecule::Molecule;

/// 辺インデックスごとの「環に属する」フラグ
pub fn ring_bond_flags(mol: &Molecule) -> Vec<bool> {
    let graph = mol.graph();
    let n = graph.node_count();
    let mut in_ring = vec![true; graph.edge_count()];
    let mut order = vec![usize::MAX; n];
    let mut low = vec![0usize; n];
    let mut counter = 0usize;

    for root in graph.node_indices() {
        if order[root.index()] != usize::MAX {
            continue;
        }
        // (頂点, 親への辺, 隣接辺の走査位置)
        let mut stack: Vec<(NodeIndex, Option<EdgeIndex>, Vec<(EdgeIndex, NodeIndex)>, usize)> =
            Vec::new();
        order[root.index()] = counter;
        low[root.index()] = counter;
        counter += 1;
        stack.push((root, None, incident(mol, root), 0));

        while let Some(frame) = stack.last_mut() {
            let (v, parent_edge) = (frame.0, frame.1);
            if frame.3 < frame.2.len() {
                let (e, w) = frame.2[frame.3];
                frame.3 += 1;
                if Some(e) == parent_edge {
                    continue;
                }
                if order[w.index()] == usize::MAX {
                    order[w.index()] = counter;
                    low[w.index()] = counter;
                    counter += 1;
                    let edges = incident(mol, w);
                    stack.push((w, Some(e), edges, 0));
                } else {
                    low[v.index()] = low[v.index()].min(order[w.index()]);
                }
            } else {
                stack.pop();
                if let (Some(e), Some(parent)) = (parent_edge, stack.last()) {
                    let p = parent.0;
                    low[p.index()] = low[p.index()].min(low[v.index()]);
                    if low[v.index()] > order[p.index()] {
                        in_ring[e.index()] = false;
                    }
                }
            }
        }
    }
    in_ring
}

fn incident(mol: &Molecule, v: NodeIndex) -> Vec<(EdgeIndex, NodeIndex)> {
    mol.graph()
        .edges(v)
        .map(|e| {
            let other = if e.source() == v { e.target() } else { e.source() };
            (e.id(), other)
        })
        .collect()
}
