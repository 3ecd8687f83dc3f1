use subscreen_core::{Fingerprint, Fingerprinter};
use xxhash_rust::xxh3::xxh3_64;

use crate::element::atomic_number;
use crate::molecule::Molecule;

/// 含まれる元素ごとに 1 ビット立てるだけの粗い指紋
#[derive(Debug, Clone, Copy)]
pub struct ElementFingerprinter {
    width: usize,
}

impl ElementFingerprinter {
    pub fn new(width: usize) -> Self {
        Self { width }
    }

    fn bit(&self, symbol: &str) -> usize {
        match atomic_number(symbol) {
            Some(z) => z as usize % self.width,
            None => (xxh3_64(symbol.as_bytes()) % self.width as u64) as usize,
        }
    }
}

impl Fingerprinter<Molecule> for ElementFingerprinter {
    fn name(&self) -> &str {
        "element"
    }

    fn width(&self) -> usize {
        self.width
    }

    fn fingerprint(&self, mol: &Molecule) -> Fingerprint {
        Fingerprint::from_indices(self.width, mol.atoms().map(|a| self.bit(&mol.atom(a).symbol)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{chain, mol};

    #[test]
    fn test_one_bit_per_element() {
        let fp = ElementFingerprinter::new(1024);
        assert_eq!(fp.fingerprint(&chain(10)).cardinality(), 1);
        let m = mol(&["C", "N", "O", "C"], &[(0, 1, 1), (1, 2, 1), (2, 3, 1)]);
        let bits = fp.fingerprint(&m);
        assert_eq!(bits.cardinality(), 3);
        assert!(bits.get(6) && bits.get(7) && bits.get(8));
    }
}
