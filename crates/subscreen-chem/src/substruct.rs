//! 部分グラフ単射による厳密な部分構造判定
//!
//! クエリの各原子を、元素・電荷が一致し次数が足りるターゲット原子へ単射で対応付け、
//! クエリの全結合がターゲットに同じ次数で存在するかをバックトラックで探す。
//! 非誘導（ターゲット側の余分な結合は許す）。

use petgraph::graph::NodeIndex;
use subscreen_core::ContainmentOracle;

use crate::molecule::Molecule;

/// `query` を `target` に埋め込む対応を 1 つ返す。
///
/// 戻り値の `i` 番目はクエリ原子 `i` に対応するターゲット原子。
pub fn find_embedding(query: &Molecule, target: &Molecule) -> Option<Vec<NodeIndex>> {
    if query.atom_count() > target.atom_count() || query.bond_count() > target.bond_count() {
        return None;
    }
    if query.atom_count() == 0 {
        return Some(Vec::new());
    }

    let order = search_order(query);
    let mut state = Search {
        query,
        target,
        order: &order,
        mapping: vec![None; query.atom_count()],
        used: vec![false; target.atom_count()],
    };
    if state.extend(0) {
        state.mapping.into_iter().collect()
    } else {
        None
    }
}

/// `query` が `target` の部分構造か
pub fn is_substructure(query: &Molecule, target: &Molecule) -> bool {
    find_embedding(query, target).is_some()
}

/// 連結成分ごとに BFS した順序。各原子はなるべく対応済みの隣接原子を持つ。
fn search_order(query: &Molecule) -> Vec<NodeIndex> {
    let n = query.atom_count();
    let mut seen = vec![false; n];
    let mut order = Vec::with_capacity(n);
    // 次数の大きい原子から始めると候補が早く絞れる
    let mut starts: Vec<NodeIndex> = query.atoms().collect();
    starts.sort_by_key(|&a| std::cmp::Reverse(query.degree(a)));
    for start in starts {
        if seen[start.index()] {
            continue;
        }
        seen[start.index()] = true;
        let mut head = order.len();
        order.push(start);
        while head < order.len() {
            let v = order[head];
            head += 1;
            for w in query.neighbors(v) {
                if !seen[w.index()] {
                    seen[w.index()] = true;
                    order.push(w);
                }
            }
        }
    }
    order
}

struct Search<'a> {
    query: &'a Molecule,
    target: &'a Molecule,
    order: &'a [NodeIndex],
    mapping: Vec<Option<NodeIndex>>,
    used: Vec<bool>,
}

impl Search<'_> {
    fn extend(&mut self, depth: usize) -> bool {
        let Some(&q) = self.order.get(depth) else {
            return true;
        };
        // 対応済みの隣接原子があれば、その像の隣接原子だけを候補にする
        let anchor = self
            .query
            .neighbors(q)
            .find_map(|n| self.mapping[n.index()]);
        let candidates: Vec<NodeIndex> = match anchor {
            Some(t) => self.target.neighbors(t).collect(),
            None => self.target.atoms().collect(),
        };
        for t in candidates {
            if self.feasible(q, t) {
                self.mapping[q.index()] = Some(t);
                self.used[t.index()] = true;
                if self.extend(depth + 1) {
                    return true;
                }
                self.mapping[q.index()] = None;
                self.used[t.index()] = false;
            }
        }
        false
    }

    fn feasible(&self, q: NodeIndex, t: NodeIndex) -> bool {
        if self.used[t.index()]
            || !self.query.atom(q).matches(self.target.atom(t))
            || self.query.degree(q) > self.target.degree(t)
        {
            return false;
        }
        self.query.bonded(q).all(|(qn, order)| match self.mapping[qn.index()] {
            Some(tn) => self.target.bond_between(t, tn) == Some(order),
            None => true,
        })
    }
}

/// 部分グラフ単射による包含判定
#[derive(Debug, Clone, Copy, Default)]
pub struct SubgraphOracle;

impl ContainmentOracle<Molecule> for SubgraphOracle {
    fn contains(&self, container: &Molecule, candidate: &Molecule) -> bool {
        is_substructure(candidate, container)
    }
}
