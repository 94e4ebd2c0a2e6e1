use fixedbitset::FixedBitSet;

/// A compact, growable bitset over a feed's calendar window.
///
/// One bit per day between `feed.start_date` and `feed.end_date`; bit `k`
/// set means the trip/edge it is attached to is active on day `k`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validity {
    bits: FixedBitSet,
}

impl Validity {
    pub fn with_len(len: usize) -> Self {
        Self {
            bits: FixedBitSet::with_capacity(len),
        }
    }

    pub fn from_bools(bools: &[bool]) -> Self {
        let mut bits = FixedBitSet::with_capacity(bools.len());
        for (i, &b) in bools.iter().enumerate() {
            if b {
                bits.insert(i);
            }
        }
        Self { bits }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.count_ones(..) == 0
    }

    pub fn set(&mut self, day: usize, value: bool) {
        self.bits.set(day, value);
    }

    pub fn get(&self, day: usize) -> bool {
        day < self.bits.len() && self.bits.contains(day)
    }

    pub fn cardinality(&self) -> usize {
        self.bits.count_ones(..)
    }

    pub fn intersects(&self, other: &Self) -> bool {
        !self.bits.is_disjoint(&other.bits)
    }

    pub fn and(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.and_in_place(other);
        out
    }

    pub fn and_in_place(&mut self, other: &Self) {
        self.bits.intersect_with(&other.bits);
    }

    pub fn or_in_place(&mut self, other: &Self) {
        if other.bits.len() > self.bits.len() {
            self.bits.grow(other.bits.len());
        }
        self.bits.union_with(&other.bits);
    }

    /// `self &= !other` — clears every bit also set in `other`.
    pub fn and_not_in_place(&mut self, other: &Self) {
        self.bits.difference_with(&other.bits);
    }

    /// Shifts every set bit one position towards higher-indexed days,
    /// growing the backing storage by one bit to make room. Used for the
    /// day-shift convention (§3, invariant 5): a trip whose first
    /// departure falls on the next calendar day has its validity shifted
    /// left by one day before interning.
    pub fn shift_left_by(&self, days: usize) -> Self {
        let mut out = FixedBitSet::with_capacity(self.bits.len() + days);
        for day in self.bits.ones() {
            out.insert(day + days);
        }
        Self { bits: out }
    }
}
