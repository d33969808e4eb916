//! Calendar deduplication.
//!
//! The feed lists the operating dates of every train explicitly. Trains that
//! run on exactly the same dates share one calendar; a single differing date
//! means a different calendar. Identifiers are handed out sequentially in
//! first-seen order, starting at a configurable base.

use crate::error::{IngestError, Result};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use tracing::trace;

/// Exact set of dates a trip operates on.
///
/// Backed by a sorted set, so equality and hashing ignore the order the dates
/// were listed in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ServiceDateSet(BTreeSet<NaiveDate>);

impl ServiceDateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Dates in ascending order
    pub fn iter(&self) -> impl Iterator<Item = &NaiveDate> + '_ {
        self.0.iter()
    }
}

impl FromIterator<NaiveDate> for ServiceDateSet {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Largest id the store can hold (SQLite INTEGER is a signed 64-bit value)
pub const MAX_CALENDAR_ID: u64 = i64::MAX as u64;

/// Sequential calendar identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarId(pub u64);

impl fmt::Display for CalendarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A calendar minted during the current run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    pub id: CalendarId,
    pub dates: ServiceDateSet,
}

/// Outcome of [`CalendarDeduplicator::assign`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    /// The date set was seen before, nothing to write
    Existing(CalendarId),
    /// First sighting: the caller writes the calendar and one added-service
    /// exception per date
    Minted(Calendar),
}

impl Assignment {
    pub fn id(&self) -> CalendarId {
        match self {
            Assignment::Existing(id) => *id,
            Assignment::Minted(calendar) => calendar.id,
        }
    }
}

/// Run-scoped cache from date sets to calendar identifiers
#[derive(Debug, Clone, Default)]
pub struct CalendarDeduplicator {
    base: u64,
    next: u64,
    assigned: HashMap<ServiceDateSet, CalendarId>,
}

impl CalendarDeduplicator {
    /// Identifiers start at `base` and go up by one per new date set
    pub fn new(base: u64) -> Self {
        Self {
            base,
            next: base,
            assigned: HashMap::new(),
        }
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    /// Number of calendars minted since creation or the last [`clear`](Self::clear)
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    pub fn get(&self, dates: &ServiceDateSet) -> Option<CalendarId> {
        self.assigned.get(dates).copied()
    }

    /// Fails with `CalendarIdOutOfRange` once the next id would pass
    /// [`MAX_CALENDAR_ID`]
    pub fn assign(&mut self, dates: ServiceDateSet) -> Result<Assignment> {
        if let Some(id) = self.assigned.get(&dates) {
            return Ok(Assignment::Existing(*id));
        }
        if self.next > MAX_CALENDAR_ID {
            return Err(IngestError::CalendarIdOutOfRange { id: self.next });
        }

        let id = CalendarId(self.next);
        // next <= i64::MAX here, so this cannot wrap
        self.next += 1;
        trace!(calendar_id = %id, dates = dates.len(), "Minted calendar");

        self.assigned.insert(dates.clone(), id);
        Ok(Assignment::Minted(Calendar { id, dates }))
    }

    /// Forget every assignment and restart numbering at the base
    pub fn clear(&mut self) {
        self.next = self.base;
        self.assigned.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap() + chrono::Days::new(d as u64)
    }

    fn dates(days: &[u32]) -> ServiceDateSet {
        days.iter().map(|d| day(*d)).collect()
    }

    #[test]
    fn test_same_dates_share_a_calendar() {
        let mut calendars = CalendarDeduplicator::default();

        let first = calendars.assign(dates(&[1, 2, 3])).unwrap();
        let again = calendars.assign(dates(&[3, 1, 2, 2])).unwrap();

        assert!(matches!(first, Assignment::Minted(_)));
        assert_eq!(again, Assignment::Existing(first.id()));
        assert_eq!(calendars.len(), 1);
    }

    #[test]
    fn test_one_date_difference_is_a_new_calendar() {
        let mut calendars = CalendarDeduplicator::default();

        let a = calendars.assign(dates(&[1, 2, 3])).unwrap().id();
        let b = calendars.assign(dates(&[1, 2])).unwrap().id();
        let c = calendars.assign(dates(&[1, 2, 3, 4])).unwrap().id();

        assert_eq!((a, b, c), (CalendarId(0), CalendarId(1), CalendarId(2)));
    }

    #[test]
    fn test_minted_calendar_carries_its_dates() {
        let mut calendars = CalendarDeduplicator::new(100);
        match calendars.assign(dates(&[5, 4])).unwrap() {
            Assignment::Minted(calendar) => {
                assert_eq!(calendar.id, CalendarId(100));
                assert_eq!(calendar.dates.iter().copied().collect::<Vec<_>>(), vec![day(4), day(5)]);
            },
            other => panic!("expected a new calendar, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_date_set_is_a_calendar_too() {
        let mut calendars = CalendarDeduplicator::default();
        assert_eq!(calendars.assign(ServiceDateSet::new()).unwrap().id(), CalendarId(0));
        assert_eq!(calendars.assign(dates(&[1])).unwrap().id(), CalendarId(1));
        assert_eq!(calendars.get(&ServiceDateSet::new()), Some(CalendarId(0)));
    }

    #[test]
    fn test_clear_restarts_at_base() {
        let mut calendars = CalendarDeduplicator::new(7);
        calendars.assign(dates(&[1])).unwrap();
        calendars.assign(dates(&[2])).unwrap();

        calendars.clear();

        assert!(calendars.is_empty());
        assert_eq!(calendars.get(&dates(&[1])), None);
        assert!(matches!(
            calendars.assign(dates(&[2])).unwrap(),
            Assignment::Minted(Calendar { id: CalendarId(7), .. })
        ));
    }

    #[test]
    fn test_ids_stop_at_the_storable_maximum() {
        let mut calendars = CalendarDeduplicator::new(MAX_CALENDAR_ID);
        assert_eq!(calendars.assign(dates(&[1])).unwrap().id(), CalendarId(MAX_CALENDAR_ID));
        assert_eq!(calendars.assign(dates(&[1])).unwrap().id(), CalendarId(MAX_CALENDAR_ID));

        let err = calendars.assign(dates(&[2])).unwrap_err();
        assert!(matches!(err, IngestError::CalendarIdOutOfRange { id } if id == MAX_CALENDAR_ID + 1));
    }

    #[test]
    fn test_base_past_the_maximum_never_mints() {
        let mut calendars = CalendarDeduplicator::new(u64::MAX);
        let err = calendars.assign(dates(&[1])).unwrap_err();
        assert!(matches!(err, IngestError::CalendarIdOutOfRange { id } if id == u64::MAX));
        assert!(calendars.is_empty());
    }

    proptest! {
        /// Assigning a set twice yields the same id and mints only once
        #[test]
        fn assign_is_idempotent(days in prop::collection::vec(0u32..60, 0..20)) {
            let mut calendars = CalendarDeduplicator::default();
            let first = calendars.assign(dates(&days)).unwrap();
            let second = calendars.assign(dates(&days)).unwrap();
            prop_assert!(matches!(first, Assignment::Minted(_)));
            prop_assert_eq!(second, Assignment::Existing(first.id()));
        }

        /// Distinct sets get distinct ids, numbered in first-seen order from the base
        #[test]
        fn ids_follow_first_appearance(
            base in 0u64..1_000,
            sets in prop::collection::vec(prop::collection::btree_set(0u32..15, 0..6), 1..30),
        ) {
            let mut calendars = CalendarDeduplicator::new(base);
            let mut seen: Vec<BTreeSet<u32>> = Vec::new();

            for set in &sets {
                let days: Vec<u32> = set.iter().copied().collect();
                let id = calendars.assign(dates(&days)).unwrap().id();
                let expected = match seen.iter().position(|s| s == set) {
                    Some(pos) => pos as u64,
                    None => {
                        seen.push(set.clone());
                        (seen.len() - 1) as u64
                    },
                };
                prop_assert_eq!(id, CalendarId(base + expected));
            }

            let distinct: HashSet<_> = sets.iter().collect();
            prop_assert_eq!(calendars.len(), distinct.len());
        }
    }
}
