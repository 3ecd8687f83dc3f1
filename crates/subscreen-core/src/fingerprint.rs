//! 固定幅ビット列指紋
//!
//! 「A の指紋が B の指紋を包含する」ことは「B が A に厳密に含まれる」ための
//! 必要条件であって十分条件ではない。この非対称性が評価の対象になる。

use bitvec::prelude::*;
use std::fmt;

/// 固定幅の指紋ビット列
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    bits: BitVec<u64, Lsb0>,
}

impl Fingerprint {
    /// 全ビット 0 の指紋を作る
    pub fn zeros(width: usize) -> Self {
        Self {
            bits: BitVec::repeat(false, width),
        }
    }

    /// 立てるビット位置の列から作る。`width` 以上の位置は `width` で畳み込む。
    pub fn from_indices<I: IntoIterator<Item = usize>>(width: usize, indices: I) -> Self {
        let mut fp = Self::zeros(width);
        for idx in indices {
            fp.set(idx);
        }
        fp
    }

    /// ビットを立てる（`width` で畳み込む）
    pub fn set(&mut self, index: usize) {
        let width = self.bits.len();
        if width == 0 {
            return;
        }
        self.bits.set(index % width, true);
    }

    pub fn get(&self, index: usize) -> bool {
        self.bits.get(index).map(|b| *b).unwrap_or(false)
    }

    pub fn width(&self) -> usize {
        self.bits.len()
    }

    /// 立っているビット数
    pub fn cardinality(&self) -> usize {
        self.bits.count_ones()
    }

    /// `self` の全ビットが `other` にも立っているか。
    ///
    /// 幅が異なる指紋同士は比較不能として `false` を返す。
    pub fn is_subset_of(&self, other: &Fingerprint) -> bool {
        if self.bits.len() != other.bits.len() {
            return false;
        }
        let width = self.bits.len();
        let mine = self.bits.as_raw_slice();
        let theirs = other.bits.as_raw_slice();
        let full_words = width / 64;
        for i in 0..full_words {
            if mine[i] & !theirs[i] != 0 {
                return false;
            }
        }
        let tail = width % 64;
        if tail != 0 {
            let mask = (1u64 << tail) - 1;
            if mine[full_words] & !theirs[full_words] & mask != 0 {
                return false;
            }
        }
        true
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({}/{} bits)", self.cardinality(), self.width())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subset_basic() {
        let small = Fingerprint::from_indices(16, [1, 3]);
        let large = Fingerprint::from_indices(16, [1, 3, 7]);
        assert!(small.is_subset_of(&large));
        assert!(!large.is_subset_of(&small));
        assert!(small.is_subset_of(&small));
    }

    #[test]
    fn test_empty_is_subset_of_everything() {
        let empty = Fingerprint::zeros(1024);
        let any = Fingerprint::from_indices(1024, [5, 900]);
        assert!(empty.is_subset_of(&any));
        assert!(empty.is_subset_of(&empty));
    }

    #[test]
    fn test_subset_across_word_boundary() {
        // 130 ビット: 2 word + 2 ビットの端数
        let a = Fingerprint::from_indices(130, [0, 63, 64, 129]);
        let b = Fingerprint::from_indices(130, [0, 63, 64, 128, 129]);
        assert!(a.is_subset_of(&b));
        let c = Fingerprint::from_indices(130, [129]);
        let d = Fingerprint::from_indices(130, [128]);
        assert!(!c.is_subset_of(&d));
    }

    #[test]
    fn test_width_mismatch_is_incomparable() {
        let a = Fingerprint::zeros(64);
        let b = Fingerprint::zeros(128);
        assert!(!a.is_subset_of(&b));
        assert!(!b.is_subset_of(&a));
    }

    #[test]
    fn test_indices_fold_into_width() {
        let fp = Fingerprint::from_indices(8, [3, 11, 19]);
        assert_eq!(fp.cardinality(), 1);
        assert!(fp.get(3));
        assert!(!fp.get(2));
    }
}
