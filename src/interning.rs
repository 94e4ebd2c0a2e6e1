use std::sync::Arc;

use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::bitset::Validity;

/// Dense integer id returned by an interning dictionary. Insertion order
/// determines the id: the first distinct value interned gets id `0`, the
/// second distinct value gets id `1`, and so on. Re-interning an
/// already-seen value returns its existing id without growing the
/// dictionary (§8, property 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InternId(pub u32);

/// Hashable surrogate for a [`Validity`] bitset plus its zone/feed-start
/// discriminators, used as the dedup key for [`OperatingDayPatterns`].
/// Two validities intern to the same id iff their set-bit positions, zone,
/// and feed start date are all equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct OperatingDayPatternKey {
    set_bits: Vec<u32>,
    zone_id: Arc<str>,
    feed_start_date: NaiveDate,
}

/// Process-lifetime interning dictionary for `(bitset, zone_id,
/// feed_start_date)` validities, owned explicitly by the compiler's storage
/// rather than as a global (§9).
#[derive(Debug, Default)]
pub struct OperatingDayPatterns {
    ids: IndexMap<OperatingDayPatternKey, InternId>,
    patterns: Vec<Validity>,
}

impl OperatingDayPatterns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn intern(
        &mut self,
        validity: &Validity,
        zone_id: Arc<str>,
        feed_start_date: NaiveDate,
    ) -> InternId {
        let key = OperatingDayPatternKey {
            set_bits: validity_set_bits(validity),
            zone_id,
            feed_start_date,
        };
        if let Some(&id) = self.ids.get(&key) {
            return id;
        }
        let id = InternId(self.patterns.len() as u32);
        self.patterns.push(validity.clone());
        self.ids.insert(key, id);
        id
    }

    pub fn get(&self, id: InternId) -> &Validity {
        &self.patterns[id.0 as usize]
    }
}

fn validity_set_bits(v: &Validity) -> Vec<u32> {
    (0..v.len())
        .filter(|&day| v.get(day))
        .map(|day| day as u32)
        .collect()
}

/// `(feed_id, zone_id)` pair, interned via [`WritableTimeZones`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedIdWithTimezone {
    pub feed_id: Arc<str>,
    pub zone_id: Arc<str>,
}

/// Process-lifetime interning dictionary for `(feed_id, zone_id)` pairs.
#[derive(Debug, Default)]
pub struct WritableTimeZones {
    ids: IndexMap<FeedIdWithTimezone, InternId>,
}

impl WritableTimeZones {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn intern(&mut self, value: FeedIdWithTimezone) -> InternId {
        if let Some(&id) = self.ids.get(&value) {
            return id;
        }
        let id = InternId(self.ids.len() as u32);
        self.ids.insert(value, id);
        id
    }

    pub fn get_index(&self, id: InternId) -> &FeedIdWithTimezone {
        self.ids.get_index(id.0 as usize).map(|(k, _)| k).unwrap()
    }
}
