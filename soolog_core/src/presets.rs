//! Built-in drink catalog: brand presets, serving units, default strengths.
//!
//! The entry flow offers a preset grid per category (brands with a known
//! alcohol percent, serving sizes with a known volume). Categories without
//! brand presets fall back to a typical strength for the category.

use crate::types::AlcoholKind;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// A brand choice with its alcohol percent
///
/// `brand` is `None` for the catch-all "other" tile, which fixes the percent
/// but leaves the brand to manual input.
#[derive(Clone, Debug)]
pub struct BrandPreset {
    pub title: String,
    pub percent: f64,
    pub brand: Option<String>,
}

/// A serving-size choice with its volume in mL
#[derive(Clone, Debug)]
pub struct UnitPreset {
    pub title: String,
    pub ml: f64,
}

/// The complete catalog of brand and unit presets
#[derive(Clone, Debug)]
pub struct DrinkCatalog {
    brands: HashMap<AlcoholKind, Vec<BrandPreset>>,
    units: HashMap<AlcoholKind, Vec<UnitPreset>>,
}

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<DrinkCatalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn default_catalog() -> &'static DrinkCatalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog
///
/// **Note**: For production use, prefer `default_catalog()` which returns a
/// cached reference. This function is retained for testing.
pub fn build_default_catalog() -> DrinkCatalog {
    build_default_catalog_internal()
}

fn brand(title: &str, percent: f64) -> BrandPreset {
    BrandPreset {
        title: title.into(),
        percent,
        brand: Some(title.into()),
    }
}

fn other_brand(percent: f64) -> BrandPreset {
    BrandPreset {
        title: "other".into(),
        percent,
        brand: None,
    }
}

fn unit(title: &str, ml: f64) -> UnitPreset {
    UnitPreset {
        title: title.into(),
        ml,
    }
}

fn build_default_catalog_internal() -> DrinkCatalog {
    let mut brands = HashMap::new();
    let mut units = HashMap::new();

    // ========================================================================
    // Brand presets (categories without an entry take a default percent)
    // ========================================================================

    brands.insert(
        AlcoholKind::Soju,
        vec![
            brand("Chum Churum", 16.0),
            brand("Chamisul", 16.0),
            brand("Chamisul Original", 20.1),
            brand("Jinro", 16.0),
            brand("Saero", 16.0),
            other_brand(16.0),
        ],
    );

    brands.insert(
        AlcoholKind::Beer,
        vec![
            brand("Cass Fresh", 4.5),
            brand("Cass Light", 4.0),
            brand("Terra", 4.6),
            brand("Terra Light", 4.0),
            brand("Kelly", 4.5),
            brand("Krush", 4.5),
            other_brand(4.5),
        ],
    );

    brands.insert(
        AlcoholKind::FruitSoju,
        vec![
            brand("Saero Darae", 12.0),
            brand("Saero Apricot", 12.0),
            brand("Grapefruit Iseul", 13.0),
            brand("Green Grape Iseul", 13.0),
            other_brand(12.0),
        ],
    );

    // ========================================================================
    // Unit presets (every category has at least one serving size)
    // ========================================================================

    let soju_units = vec![
        unit("bottle", 360.0),
        unit("glass", 50.0),
        unit("pet", 400.0),
        unit("paper cup", 140.0),
    ];
    units.insert(AlcoholKind::Soju, soju_units.clone());
    units.insert(AlcoholKind::FruitSoju, soju_units);

    units.insert(
        AlcoholKind::Beer,
        vec![
            unit("glass", 225.0),
            unit("large glass", 355.0),
            unit("500cc", 500.0),
            unit("1000cc", 1000.0),
        ],
    );

    units.insert(AlcoholKind::Somaek, vec![unit("glass", 225.0)]);
    units.insert(AlcoholKind::Wine, vec![unit("glass", 100.0)]);
    units.insert(
        AlcoholKind::Liquor,
        vec![unit("shot", 30.0), unit("rocks glass", 370.0)],
    );
    units.insert(AlcoholKind::Highball, vec![unit("glass", 240.0)]);
    units.insert(
        AlcoholKind::Etc,
        vec![unit("soju glass", 50.0), unit("beer glass", 225.0)],
    );

    DrinkCatalog { brands, units }
}

impl DrinkCatalog {
    /// Brand presets for a category, or `None` if the category is free-form
    pub fn brand_presets(&self, kind: AlcoholKind) -> Option<&[BrandPreset]> {
        self.brands.get(&kind).map(|v| v.as_slice())
    }

    /// Serving-size presets for a category (never empty in the default catalog)
    pub fn unit_presets(&self, kind: AlcoholKind) -> &[UnitPreset] {
        self.units.get(&kind).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Typical strength used when no brand preset supplies a percent
    pub fn default_percent(&self, kind: AlcoholKind) -> f64 {
        match kind {
            AlcoholKind::Somaek => 7.6,
            AlcoholKind::Wine => 12.0,
            AlcoholKind::Liquor => 40.0,
            _ => 0.0,
        }
    }

    /// Whether the category expects a manually typed brand/name
    pub fn needs_manual_brand(&self, kind: AlcoholKind) -> bool {
        matches!(
            kind,
            AlcoholKind::Wine | AlcoholKind::Liquor | AlcoholKind::Highball | AlcoholKind::Etc
        )
    }

    /// Validate the catalog for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (kind, presets) in &self.brands {
            if presets.is_empty() {
                errors.push(format!("{:?} has an empty brand preset list", kind));
            }
            for preset in presets {
                if preset.title.is_empty() {
                    errors.push(format!("{:?} has a brand preset with empty title", kind));
                }
                if !(0.0..=100.0).contains(&preset.percent) || preset.percent == 0.0 {
                    errors.push(format!(
                        "{:?} preset '{}' has invalid percent {}",
                        kind, preset.title, preset.percent
                    ));
                }
            }
        }

        for kind in AlcoholKind::ALL {
            let units = self.unit_presets(kind);
            if units.is_empty() {
                errors.push(format!("{:?} has no unit presets", kind));
            }
            for unit in units {
                if unit.title.is_empty() {
                    errors.push(format!("{:?} has a unit preset with empty title", kind));
                }
                if unit.ml <= 0.0 {
                    errors.push(format!(
                        "{:?} unit '{}' has non-positive volume {}",
                        kind, unit.title, unit.ml
                    ));
                }
            }

            // Free-form categories must supply a usable default strength
            if self.brand_presets(kind).is_none()
                && self.default_percent(kind) == 0.0
                && !self.needs_manual_brand(kind)
            {
                errors.push(format!(
                    "{:?} has neither brand presets nor a default percent",
                    kind
                ));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_validates() {
        let catalog = build_default_catalog();
        let errors = catalog.validate();
        assert!(
            errors.is_empty(),
            "Default catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_every_kind_has_units() {
        let catalog = build_default_catalog();
        for kind in AlcoholKind::ALL {
            assert!(
                !catalog.unit_presets(kind).is_empty(),
                "{:?} has no unit presets",
                kind
            );
        }
    }

    #[test]
    fn test_soju_has_bottle_unit() {
        let catalog = build_default_catalog();
        let bottle = catalog
            .unit_presets(AlcoholKind::Soju)
            .iter()
            .find(|u| u.title == "bottle")
            .expect("soju should have a bottle unit");
        assert_eq!(bottle.ml, 360.0);
    }

    #[test]
    fn test_free_form_categories_have_defaults() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.default_percent(AlcoholKind::Somaek), 7.6);
        assert_eq!(catalog.default_percent(AlcoholKind::Wine), 12.0);
        assert_eq!(catalog.default_percent(AlcoholKind::Liquor), 40.0);
        assert!(catalog.brand_presets(AlcoholKind::Somaek).is_none());
    }

    #[test]
    fn test_other_preset_has_no_brand() {
        let catalog = build_default_catalog();
        let presets = catalog.brand_presets(AlcoholKind::Soju).unwrap();
        let other = presets.iter().find(|p| p.brand.is_none()).unwrap();
        assert_eq!(other.percent, 16.0);
    }
}
