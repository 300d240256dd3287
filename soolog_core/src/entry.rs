//! Entry flow for logging a new drink record.
//!
//! The form walks four steps: pick a category, pick a brand and strength,
//! pick a serving unit and amount, then companions and feeling. Later steps
//! unlock only when the earlier ones are ready, and the per-unit / total
//! alcohol figures are re-derived from the current fields on every read.

use crate::presets::DrinkCatalog;
use crate::{AlcoholKind, DrinkRecord, Error, Feeling, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Where the form currently stands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryStep {
    SelectingBrandAndStrength,
    SelectingUnitAndVolume,
    SelectingCompanionsAndFeeling,
    Saved,
}

/// The in-progress record entry form
///
/// Constructed once a category has been chosen (the category-selection step
/// is just the choice of constructor argument).
#[derive(Clone, Debug)]
pub struct EntryForm<'a> {
    catalog: &'a DrinkCatalog,
    kind: AlcoholKind,

    selected_preset: Option<String>,
    /// 0.0 means "not entered"; `effective_percent` applies the category default
    alcohol_percent: f64,
    brand: Option<String>,

    units: f64,
    unit_name: String,
    unit_ml: f64,

    companions: BTreeSet<Uuid>,
    feeling: Option<Feeling>,
    memo: Option<String>,

    saved: bool,
}

impl<'a> EntryForm<'a> {
    /// Start a form for the given category
    ///
    /// The serving unit defaults to the category's first preset so the
    /// volume step opens with something sensible selected.
    pub fn new(catalog: &'a DrinkCatalog, kind: AlcoholKind) -> Self {
        let first_unit = catalog.unit_presets(kind).first();
        Self {
            catalog,
            kind,
            selected_preset: None,
            alcohol_percent: 0.0,
            brand: None,
            units: 0.0,
            unit_name: first_unit.map(|u| u.title.clone()).unwrap_or_default(),
            unit_ml: first_unit.map(|u| u.ml).unwrap_or(0.0),
            companions: BTreeSet::new(),
            feeling: None,
            memo: None,
            saved: false,
        }
    }

    pub fn kind(&self) -> AlcoholKind {
        self.kind
    }

    // ========================================================================
    // Step 1: brand and strength
    // ========================================================================

    /// Pick a brand preset by title
    pub fn select_brand_preset(&mut self, title: &str) -> Result<()> {
        let presets = self.catalog.brand_presets(self.kind).ok_or_else(|| {
            Error::Entry(format!("{} has no brand presets", self.kind.label()))
        })?;
        let preset = presets
            .iter()
            .find(|p| p.title.eq_ignore_ascii_case(title))
            .ok_or_else(|| {
                Error::Entry(format!(
                    "unknown preset '{}' for {}",
                    title,
                    self.kind.label()
                ))
            })?;

        self.selected_preset = Some(preset.title.clone());
        self.brand = preset.brand.clone();
        // The catch-all preset keeps an already-entered percent
        if preset.brand.is_some() || self.alcohol_percent == 0.0 {
            self.alcohol_percent = preset.percent;
        }
        Ok(())
    }

    pub fn set_percent(&mut self, percent: f64) -> Result<()> {
        if !(0.0..=100.0).contains(&percent) {
            return Err(Error::Entry(format!(
                "alcohol percent must be within 0..=100, got {}",
                percent
            )));
        }
        self.alcohol_percent = percent;
        Ok(())
    }

    pub fn set_brand(&mut self, brand: Option<String>) {
        self.brand = brand.map(|b| b.trim().to_string()).filter(|b| !b.is_empty());
    }

    /// The percent that will be saved: entered value, or the category default
    pub fn effective_percent(&self) -> f64 {
        let default = self.catalog.default_percent(self.kind);
        if self.alcohol_percent == 0.0 && default != 0.0 {
            default
        } else {
            self.alcohol_percent
        }
    }

    // ========================================================================
    // Step 2: unit and volume
    // ========================================================================

    pub fn set_units(&mut self, units: f64) -> Result<()> {
        if units < 0.0 || !units.is_finite() {
            return Err(Error::Entry(format!("unit count must be >= 0, got {}", units)));
        }
        self.units = units;
        Ok(())
    }

    /// The "+0.5" shortcut
    pub fn add_half_unit(&mut self) {
        self.units += 0.5;
    }

    /// Pick a serving-size preset by title
    pub fn select_unit_preset(&mut self, title: &str) -> Result<()> {
        let preset = self
            .catalog
            .unit_presets(self.kind)
            .iter()
            .find(|u| u.title.eq_ignore_ascii_case(title))
            .ok_or_else(|| {
                Error::Entry(format!(
                    "unknown unit '{}' for {}",
                    title,
                    self.kind.label()
                ))
            })?;
        self.unit_name = preset.title.clone();
        self.unit_ml = preset.ml;
        Ok(())
    }

    /// Custom serving size (name plus volume)
    pub fn set_custom_unit(&mut self, name: &str, ml: f64) -> Result<()> {
        if ml <= 0.0 || !ml.is_finite() {
            return Err(Error::Entry(format!("unit volume must be > 0, got {}", ml)));
        }
        let trimmed = name.trim();
        self.unit_name = if trimmed.is_empty() {
            "other".into()
        } else {
            trimmed.into()
        };
        self.unit_ml = ml;
        Ok(())
    }

    // ========================================================================
    // Step 3: companions and feeling
    // ========================================================================

    pub fn toggle_companion(&mut self, id: Uuid) {
        if !self.companions.remove(&id) {
            self.companions.insert(id);
        }
    }

    pub fn set_feeling(&mut self, feeling: Option<Feeling>) {
        self.feeling = feeling;
    }

    pub fn set_memo(&mut self, memo: Option<String>) {
        self.memo = memo.filter(|m| !m.trim().is_empty());
    }

    // ========================================================================
    // Readiness and derived figures
    // ========================================================================

    /// Step 2 unlocks once a strength is known (and, for preset categories,
    /// a preset is picked)
    pub fn strength_ready(&self) -> bool {
        let has_percent = self.effective_percent() > 0.0;
        if self.catalog.brand_presets(self.kind).is_some() {
            self.selected_preset.is_some() && has_percent
        } else {
            has_percent
        }
    }

    /// Step 3 unlocks once a positive amount has been entered
    pub fn volume_ready(&self) -> bool {
        self.strength_ready() && self.units > 0.0
    }

    pub fn step(&self) -> EntryStep {
        if self.saved {
            EntryStep::Saved
        } else if self.volume_ready() {
            EntryStep::SelectingCompanionsAndFeeling
        } else if self.strength_ready() {
            EntryStep::SelectingUnitAndVolume
        } else {
            EntryStep::SelectingBrandAndStrength
        }
    }

    /// Pure alcohol per unit in mL, re-derived from the current fields
    pub fn alcohol_per_unit(&self) -> f64 {
        self.unit_ml * (self.effective_percent() / 100.0)
    }

    /// Total pure alcohol in mL for the entered amount
    pub fn total_pure_alcohol(&self) -> f64 {
        self.units * self.alcohol_per_unit()
    }

    // ========================================================================
    // Save
    // ========================================================================

    /// Finalise the form into a record
    ///
    /// Fails unless the flow reached the companions/feeling step. The record
    /// starts unsynced; the health bridge flips the flag afterwards.
    pub fn save(&mut self, now: DateTime<Utc>) -> Result<DrinkRecord> {
        if self.saved {
            return Err(Error::Entry("form was already saved".into()));
        }
        if !self.volume_ready() {
            return Err(Error::Entry(
                "cannot save: strength and a positive amount are required".into(),
            ));
        }

        // Somaek is a mix, a brand name would be meaningless
        let brand = if self.kind == AlcoholKind::Somaek {
            None
        } else {
            self.brand.clone()
        };

        let record = DrinkRecord {
            id: Uuid::new_v4(),
            kind: self.kind,
            timestamp: now,
            alcohol_percent: self.effective_percent(),
            units: self.units,
            unit_ml: self.unit_ml,
            unit_name: self.unit_name.clone(),
            alcohol_per_unit: self.alcohol_per_unit(),
            brand,
            memo: self.memo.clone(),
            health_synced: false,
            feeling: self.feeling,
            companions: self.companions.iter().copied().collect(),
        };

        self.saved = true;
        tracing::debug!(
            "Entry flow produced record {} ({:?}, {} {})",
            record.id,
            record.kind,
            record.units,
            record.unit_name
        );
        Ok(record)
    }
}
