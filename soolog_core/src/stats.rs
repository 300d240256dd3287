//! Derived statistics over the record list.
//!
//! Everything here is a pure function recomputed from the current records on
//! every call; there is no cached state to go stale.

use crate::{AlcoholKind, DrinkRecord, Feeling, Person};
use chrono::{DateTime, Datelike, Utc};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

/// Pure alcohol in one reference soju bottle (360 mL at 16%), in mL
pub const REFERENCE_BOTTLE_ALCOHOL_ML: f64 = 360.0 * 0.16;

/// Days since the last drink, measured between calendar days
///
/// Always taken from the single latest record, never a maximum over gaps.
/// Returns 0 when there are no records.
pub fn sobriety_streak_days(records: &[DrinkRecord], now: DateTime<Utc>) -> i64 {
    let latest = match records.iter().max_by_key(|r| r.timestamp) {
        Some(record) => record,
        None => return 0,
    };
    let days = (now.date_naive() - latest.timestamp.date_naive()).num_days();
    days.max(0)
}

/// Descriptive band for an estimated tolerance
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToleranceBand {
    /// Under one bottle-equivalent
    Light,
    /// One to two bottle-equivalents
    Average,
    /// Two bottle-equivalents or more
    Seasoned,
}

impl ToleranceBand {
    pub fn from_bottles(bottles: f64) -> ToleranceBand {
        if bottles < 1.0 {
            ToleranceBand::Light
        } else if bottles < 2.0 {
            ToleranceBand::Average
        } else {
            ToleranceBand::Seasoned
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ToleranceBand::Light => "You drink for the mood more than the alcohol",
            ToleranceBand::Average => "You hold an average amount",
            ToleranceBand::Seasoned => "Quite the seasoned drinker - mind your liver",
        }
    }
}

/// Estimated drinking capacity in reference-bottle equivalents
///
/// Averages the total pure alcohol of records logged at feeling "moderate";
/// falls back to "light" records when there are none, and returns `None`
/// ("insufficient data") when neither exists.
pub fn estimated_bottle_capacity(records: &[DrinkRecord]) -> Option<f64> {
    let moderate: Vec<&DrinkRecord> = records
        .iter()
        .filter(|r| r.feeling == Some(Feeling::Moderate))
        .collect();
    let qualifying = if moderate.is_empty() {
        records
            .iter()
            .filter(|r| r.feeling == Some(Feeling::Light))
            .collect()
    } else {
        moderate
    };

    if qualifying.is_empty() {
        return None;
    }

    let total: f64 = qualifying.iter().map(|r| r.total_pure_alcohol()).sum();
    let average = total / qualifying.len() as f64;
    Some(average / REFERENCE_BOTTLE_ALCOHOL_ML)
}

/// The companion appearing in the most records, with their appearance count
///
/// Ties are broken lexicographically by name so the result does not depend
/// on map iteration order. Companion ids without a roster entry are skipped.
pub fn best_companion(records: &[DrinkRecord], people: &[Person]) -> Option<(Person, usize)> {
    let mut counts: HashMap<Uuid, usize> = HashMap::new();
    for record in records {
        for id in &record.companions {
            *counts.entry(*id).or_insert(0) += 1;
        }
    }

    let mut best: Option<(&Person, usize)> = None;
    for person in people {
        let count = match counts.get(&person.id) {
            Some(count) => *count,
            None => continue,
        };
        best = match best {
            None => Some((person, count)),
            Some((current, current_count)) => {
                if count > current_count
                    || (count == current_count && person.name < current.name)
                {
                    Some((person, count))
                } else {
                    Some((current, current_count))
                }
            }
        };
    }

    best.map(|(person, count)| (person.clone(), count))
}

/// Day-of-month values with at least one record in the given month
pub fn drinking_days(records: &[DrinkRecord], year: i32, month: u32) -> BTreeSet<u32> {
    records
        .iter()
        .filter(|r| {
            let date = r.timestamp.date_naive();
            date.year() == year && date.month() == month
        })
        .map(|r| r.timestamp.date_naive().day())
        .collect()
}

/// Most frequent drink category in a record set (per-person summary)
///
/// Ties resolve to the category listed first in `AlcoholKind::ALL`.
pub fn favourite_kind(records: &[DrinkRecord]) -> Option<AlcoholKind> {
    if records.is_empty() {
        return None;
    }
    let mut counts: HashMap<AlcoholKind, usize> = HashMap::new();
    for record in records {
        *counts.entry(record.kind).or_insert(0) += 1;
    }

    let mut best: Option<(AlcoholKind, usize)> = None;
    for kind in AlcoholKind::ALL {
        let count = counts.get(&kind).copied().unwrap_or(0);
        if count > 0 && best.map_or(true, |(_, c)| count > c) {
            best = Some((kind, count));
        }
    }
    best.map(|(kind, _)| kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn record_at(days_ago: i64, feeling: Option<Feeling>) -> DrinkRecord {
        record_with(days_ago, feeling, 16.0, 1.0, 360.0, vec![])
    }

    fn record_with(
        days_ago: i64,
        feeling: Option<Feeling>,
        percent: f64,
        units: f64,
        unit_ml: f64,
        companions: Vec<Uuid>,
    ) -> DrinkRecord {
        DrinkRecord {
            id: Uuid::new_v4(),
            kind: AlcoholKind::Soju,
            timestamp: Utc::now() - Duration::days(days_ago),
            alcohol_percent: percent,
            units,
            unit_ml,
            unit_name: "bottle".into(),
            alcohol_per_unit: unit_ml * percent / 100.0,
            brand: None,
            memo: None,
            health_synced: false,
            feeling,
            companions,
        }
    }

    #[test]
    fn test_streak_empty_is_zero() {
        assert_eq!(sobriety_streak_days(&[], Utc::now()), 0);
    }

    #[test]
    fn test_streak_uses_latest_record_only() {
        let records = vec![record_at(10, None), record_at(3, None), record_at(7, None)];
        assert_eq!(sobriety_streak_days(&records, Utc::now()), 3);
    }

    #[test]
    fn test_streak_same_day_is_zero() {
        let records = vec![record_at(0, None)];
        assert_eq!(sobriety_streak_days(&records, Utc::now()), 0);
    }

    #[test]
    fn test_tolerance_insufficient_without_moderate_or_light() {
        let records = vec![
            record_at(1, Some(Feeling::Fine)),
            record_at(2, Some(Feeling::Wasted)),
            record_at(3, None),
        ];
        assert_eq!(estimated_bottle_capacity(&records), None);
    }

    #[test]
    fn test_tolerance_prefers_moderate_over_light() {
        // moderate: exactly one bottle; light: three bottles
        let records = vec![
            record_with(1, Some(Feeling::Moderate), 16.0, 1.0, 360.0, vec![]),
            record_with(2, Some(Feeling::Light), 16.0, 3.0, 360.0, vec![]),
        ];
        let bottles = estimated_bottle_capacity(&records).unwrap();
        assert!((bottles - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_tolerance_falls_back_to_light() {
        let records = vec![record_with(1, Some(Feeling::Light), 16.0, 2.0, 360.0, vec![])];
        let bottles = estimated_bottle_capacity(&records).unwrap();
        assert!((bottles - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_tolerance_band_boundaries() {
        assert_eq!(ToleranceBand::from_bottles(0.99), ToleranceBand::Light);
        assert_eq!(ToleranceBand::from_bottles(1.0), ToleranceBand::Average);
        assert_eq!(ToleranceBand::from_bottles(1.99), ToleranceBand::Average);
        assert_eq!(ToleranceBand::from_bottles(2.0), ToleranceBand::Seasoned);
    }

    #[test]
    fn test_best_companion_counts_appearances() {
        let a = Person::new("Areum");
        let b = Person::new("Bora");
        let records = vec![
            record_with(1, None, 16.0, 1.0, 360.0, vec![a.id, b.id]),
            record_with(2, None, 16.0, 1.0, 360.0, vec![a.id]),
            record_with(3, None, 16.0, 1.0, 360.0, vec![a.id]),
        ];

        let (winner, count) = best_companion(&records, &[a.clone(), b]).unwrap();
        assert_eq!(winner.id, a.id);
        assert_eq!(count, 3);
    }

    #[test]
    fn test_best_companion_tie_breaks_by_name() {
        let zuho = Person::new("Zuho");
        let areum = Person::new("Areum");
        let records = vec![
            record_with(1, None, 16.0, 1.0, 360.0, vec![zuho.id, areum.id]),
            record_with(2, None, 16.0, 1.0, 360.0, vec![zuho.id, areum.id]),
        ];

        // Roster order must not matter
        let (winner, count) = best_companion(&records, &[zuho.clone(), areum.clone()]).unwrap();
        assert_eq!(winner.name, "Areum");
        assert_eq!(count, 2);
        let (winner, _) = best_companion(&records, &[areum, zuho]).unwrap();
        assert_eq!(winner.name, "Areum");
    }

    #[test]
    fn test_best_companion_none_without_companions() {
        let records = vec![record_at(1, None)];
        assert!(best_companion(&records, &[Person::new("Areum")]).is_none());
    }

    #[test]
    fn test_drinking_days_for_month() {
        let mut r1 = record_at(0, None);
        r1.timestamp = Utc.with_ymd_and_hms(2026, 8, 3, 21, 0, 0).unwrap();
        let mut r2 = record_at(0, None);
        r2.timestamp = Utc.with_ymd_and_hms(2026, 8, 15, 19, 30, 0).unwrap();
        let mut r3 = record_at(0, None);
        r3.timestamp = Utc.with_ymd_and_hms(2026, 7, 15, 19, 30, 0).unwrap();

        let days = drinking_days(&[r1, r2, r3], 2026, 8);
        assert_eq!(days, BTreeSet::from([3, 15]));
        assert!(drinking_days(&[], 2026, 8).is_empty());
    }

    #[test]
    fn test_deletion_reflected_on_recompute() {
        let mut records = vec![record_at(2, Some(Feeling::Moderate))];
        assert!(estimated_bottle_capacity(&records).is_some());
        assert_eq!(sobriety_streak_days(&records, Utc::now()), 2);

        records.clear();
        assert!(estimated_bottle_capacity(&records).is_none());
        assert_eq!(sobriety_streak_days(&records, Utc::now()), 0);
    }

    #[test]
    fn test_favourite_kind() {
        let mut r1 = record_at(1, None);
        r1.kind = AlcoholKind::Beer;
        let mut r2 = record_at(2, None);
        r2.kind = AlcoholKind::Beer;
        let r3 = record_at(3, None);

        assert_eq!(favourite_kind(&[r1, r2, r3]), Some(AlcoholKind::Beer));
        assert_eq!(favourite_kind(&[]), None);
    }
}
