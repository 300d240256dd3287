//! Core domain types for the Soolog drinking log.
//!
//! This module defines the fundamental types used throughout the system:
//! - Alcohol categories and self-reported intoxication levels
//! - People (drinking companions)
//! - Drink records and their derived alcohol quantities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Category and Feeling Types
// ============================================================================

/// The eight fixed alcohol categories a record can belong to
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlcoholKind {
    Soju,
    Beer,
    Somaek,
    Wine,
    FruitSoju,
    Liquor,
    Highball,
    Etc,
}

impl AlcoholKind {
    /// All categories in menu order
    pub const ALL: [AlcoholKind; 8] = [
        AlcoholKind::Soju,
        AlcoholKind::Beer,
        AlcoholKind::Somaek,
        AlcoholKind::Wine,
        AlcoholKind::FruitSoju,
        AlcoholKind::Liquor,
        AlcoholKind::Highball,
        AlcoholKind::Etc,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AlcoholKind::Soju => "Soju",
            AlcoholKind::Beer => "Beer",
            AlcoholKind::Somaek => "Somaek",
            AlcoholKind::Wine => "Wine",
            AlcoholKind::FruitSoju => "Fruit soju",
            AlcoholKind::Liquor => "Liquor",
            AlcoholKind::Highball => "Highball",
            AlcoholKind::Etc => "Etc",
        }
    }

    /// Parse a user-supplied category string
    pub fn parse(s: &str) -> Option<AlcoholKind> {
        match s.to_lowercase().as_str() {
            "soju" => Some(AlcoholKind::Soju),
            "beer" => Some(AlcoholKind::Beer),
            "somaek" | "somac" => Some(AlcoholKind::Somaek),
            "wine" => Some(AlcoholKind::Wine),
            "fruit_soju" | "fruitsoju" | "fruit-soju" => Some(AlcoholKind::FruitSoju),
            "liquor" | "spirits" => Some(AlcoholKind::Liquor),
            "highball" => Some(AlcoholKind::Highball),
            "etc" | "other" => Some(AlcoholKind::Etc),
            _ => None,
        }
    }
}

/// Self-reported intoxication level, a 5-point ordinal scale
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Feeling {
    Fine,
    Light,
    Moderate,
    Heavy,
    Wasted,
}

impl Feeling {
    /// Ordinal score from 1 (fine) to 5 (wasted)
    pub fn score(&self) -> u8 {
        match self {
            Feeling::Fine => 1,
            Feeling::Light => 2,
            Feeling::Moderate => 3,
            Feeling::Heavy => 4,
            Feeling::Wasted => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Feeling::Fine => "completely fine",
            Feeling::Light => "slightly tipsy",
            Feeling::Moderate => "moderately drunk",
            Feeling::Heavy => "quite drunk",
            Feeling::Wasted => "wasted",
        }
    }

    pub fn parse(s: &str) -> Option<Feeling> {
        match s.to_lowercase().as_str() {
            "fine" | "1" => Some(Feeling::Fine),
            "light" | "tipsy" | "2" => Some(Feeling::Light),
            "moderate" | "3" => Some(Feeling::Moderate),
            "heavy" | "4" => Some(Feeling::Heavy),
            "wasted" | "5" => Some(Feeling::Wasted),
            _ => None,
        }
    }
}

// ============================================================================
// Person and Record Types
// ============================================================================

/// A drinking companion in the roster
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Person {
    pub id: Uuid,
    pub name: String,
}

impl Person {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// A single logged drinking event
///
/// The numeric fields are fixed at save time; only `timestamp` (date
/// correction) and `health_synced` may change afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DrinkRecord {
    pub id: Uuid,
    pub kind: AlcoholKind,
    pub timestamp: DateTime<Utc>,

    /// Alcohol by volume, 0..=100
    pub alcohol_percent: f64,
    /// Number of units consumed (may be fractional, e.g. 1.5 bottles)
    pub units: f64,
    /// Millilitres in one unit
    pub unit_ml: f64,
    /// Serving-size label ("bottle", "glass", ...)
    pub unit_name: String,
    /// Pure alcohol per unit in mL, `unit_ml * percent / 100`
    pub alcohol_per_unit: f64,

    pub brand: Option<String>,
    pub memo: Option<String>,
    #[serde(default)]
    pub health_synced: bool,
    pub feeling: Option<Feeling>,

    /// Companions present, by person id
    #[serde(default)]
    pub companions: Vec<Uuid>,
}

impl DrinkRecord {
    /// Total pure alcohol consumed in mL: `units * unit_ml * percent / 100`
    pub fn total_pure_alcohol(&self) -> f64 {
        self.units * self.unit_ml * (self.alcohol_percent / 100.0)
    }
}

/// Sort direction for timestamp-ordered queries
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    OldestFirst,
    NewestFirst,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse_roundtrip() {
        for kind in AlcoholKind::ALL {
            let parsed = AlcoholKind::parse(&kind.label().to_lowercase().replace(' ', "_"));
            assert_eq!(parsed, Some(kind), "failed for {:?}", kind);
        }
    }

    #[test]
    fn test_feeling_scores_are_ordinal() {
        let scores: Vec<u8> = [
            Feeling::Fine,
            Feeling::Light,
            Feeling::Moderate,
            Feeling::Heavy,
            Feeling::Wasted,
        ]
        .iter()
        .map(|f| f.score())
        .collect();
        assert_eq!(scores, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_total_pure_alcohol() {
        let record = DrinkRecord {
            id: Uuid::new_v4(),
            kind: AlcoholKind::Soju,
            timestamp: Utc::now(),
            alcohol_percent: 16.0,
            units: 2.0,
            unit_ml: 360.0,
            unit_name: "bottle".into(),
            alcohol_per_unit: 57.6,
            brand: None,
            memo: None,
            health_synced: false,
            feeling: None,
            companions: vec![],
        };

        assert!((record.total_pure_alcohol() - 115.2).abs() < 1e-9);
    }

    #[test]
    fn test_record_serde_roundtrip() {
        let record = DrinkRecord {
            id: Uuid::new_v4(),
            kind: AlcoholKind::Highball,
            timestamp: Utc::now(),
            alcohol_percent: 8.0,
            units: 1.0,
            unit_ml: 240.0,
            unit_name: "glass".into(),
            alcohol_per_unit: 19.2,
            brand: Some("homemade".into()),
            memo: None,
            health_synced: true,
            feeling: Some(Feeling::Light),
            companions: vec![Uuid::new_v4()],
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: DrinkRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, record.id);
        assert_eq!(back.feeling, Some(Feeling::Light));
        assert!(back.health_synced);
        assert_eq!(back.companions, record.companions);
    }
}
