use bit_vec::BitVec;
use std::fmt;

/// Fixed-width bit vector sized once per compilation.
///
/// Binary operations require both operands to have the same width; mixing widths is a
/// contract violation and panics.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitSet(BitVec);

impl BitSet {
    pub fn new(width: usize) -> Self {
        Self(BitVec::from_elem(width, false))
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn test(&self, i: usize) -> bool {
        self.0.get(i).unwrap_or(false)
    }

    #[inline]
    pub fn set(&mut self, i: usize) {
        self.0.set(i, true);
    }

    #[inline]
    pub fn clear(&mut self, i: usize) {
        self.0.set(i, false);
    }

    pub fn clear_all(&mut self) {
        self.0 = BitVec::from_elem(self.0.len(), false);
    }

    pub fn is_empty(&self) -> bool {
        self.0.none()
    }

    pub fn count(&self) -> usize {
        self.0.iter().filter(|b| *b).count()
    }

    /// `self |= other`; returns whether `self` changed.
    pub fn union_with(&mut self, other: &BitSet) -> bool {
        assert_eq!(self.width(), other.width(), "bitset width mismatch");
        self.0.or(&other.0)
    }

    /// `self &= other`; returns whether `self` changed.
    pub fn intersect_with(&mut self, other: &BitSet) -> bool {
        assert_eq!(self.width(), other.width(), "bitset width mismatch");
        self.0.and(&other.0)
    }

    /// `self -= other`; returns whether `self` changed.
    pub fn subtract(&mut self, other: &BitSet) -> bool {
        assert_eq!(self.width(), other.width(), "bitset width mismatch");
        self.0.difference(&other.0)
    }

    pub fn is_subset(&self, other: &BitSet) -> bool {
        self.iter().all(|i| other.test(i))
    }

    /// Indices of the set bits, ascending.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, b)| if b { Some(i) } else { None })
    }
}

impl fmt::Debug for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let v: Vec<_> = self.iter().collect();
        crate::format_vec(f, &v, "{", ", ", "}")
    }
}

#[cfg(test)]
mod tests {
    use super::BitSet;

    #[test]
    fn set_operations() {
        let mut a = BitSet::new(70);
        let mut b = BitSet::new(70);
        a.set(1);
        a.set(65);
        b.set(65);
        b.set(3);

        let mut u = a.clone();
        assert!(u.union_with(&b));
        assert!(!u.union_with(&b));
        assert_eq!(u.iter().collect::<Vec<_>>(), vec![1, 3, 65]);

        let mut i = a.clone();
        assert!(i.intersect_with(&b));
        assert_eq!(i.iter().collect::<Vec<_>>(), vec![65]);

        let mut d = a.clone();
        assert!(d.subtract(&b));
        assert_eq!(d.iter().collect::<Vec<_>>(), vec![1]);
        assert!(d.is_subset(&a));
        assert!(!a.is_subset(&d));

        assert_eq!(u.count(), 3);
        assert_eq!(u.to_string(), "{1, 3, 65}");
        u.clear_all();
        assert!(u.is_empty());
        assert_eq!(u.width(), 70);
    }

    #[test]
    #[should_panic]
    fn width_mismatch_panics() {
        let mut a = BitSet::new(4);
        a.union_with(&BitSet::new(5));
    }
}
