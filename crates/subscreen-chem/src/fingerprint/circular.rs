use subscreen_core::{Fingerprint, Fingerprinter};
use xxhash_rust::xxh3::xxh3_64;

use crate::molecule::Molecule;

pub const DEFAULT_RADIUS: usize = 2;

/// Morgan 型の円形指紋
///
/// 初期識別子に重原子次数を含めるため、切断で次数が変わるフラグメントでは
/// 親にないビットが立つことがある（偽陰性が観測できる）。
#[derive(Debug, Clone, Copy)]
pub struct CircularFingerprinter {
    width: usize,
    radius: usize,
}

impl CircularFingerprinter {
    pub fn new(width: usize, radius: usize) -> Self {
        Self { width, radius }
    }

    /// 半径 0..=radius の全原子環境の識別子
    pub fn identifiers(&self, mol: &Molecule) -> Vec<u64> {
        let mut current: Vec<u64> = mol
            .atoms()
            .map(|a| {
                let atom = mol.atom(a);
                let seed = format!("{}|{}|{}", atom.symbol, atom.charge, mol.degree(a));
                xxh3_64(seed.as_bytes())
            })
            .collect();
        let mut all = current.clone();
        for round in 0..self.radius {
            current = mol
                .atoms()
                .map(|a| {
                    let mut env: Vec<(u8, u64)> = mol
                        .bonded(a)
                        .map(|(n, order)| (order.mdl_code(), current[n.index()]))
                        .collect();
                    env.sort_unstable();
                    let mut bytes = Vec::with_capacity(9 + env.len() * 9);
                    bytes.push(round as u8);
                    bytes.extend_from_slice(&current[a.index()].to_le_bytes());
                    for (order, id) in env {
                        bytes.push(order);
                        bytes.extend_from_slice(&id.to_le_bytes());
                    }
                    xxh3_64(&bytes)
                })
                .collect();
            all.extend_from_slice(&current);
        }
        all
    }
}

impl Fingerprinter<Molecule> for CircularFingerprinter {
    fn name(&self) -> &str {
        "circular"
    }

    fn width(&self) -> usize {
        self.width
    }

    fn fingerprint(&self, mol: &Molecule) -> Fingerprint {
        let width = self.width as u64;
        Fingerprint::from_indices(
            self.width,
            self.identifiers(mol).into_iter().map(|id| (id % width) as usize),
        )
    }
}
