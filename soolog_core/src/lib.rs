#![forbid(unsafe_code)]

//! Core domain model and business logic for the Soolog drinking log.
//!
//! This crate provides:
//! - Domain types (alcohol categories, people, drink records)
//! - The built-in drink catalog (brand and serving presets)
//! - The record entry flow
//! - Derived statistics (streak, tolerance, companions, calendar)
//! - Persistence (record store, CSV export)
//! - The health journal bridge

pub mod types;
pub mod error;
pub mod presets;
pub mod config;
pub mod logging;
pub mod store;
pub mod stats;
pub mod entry;
pub mod health;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use presets::{default_catalog, DrinkCatalog};
pub use store::RecordStore;
pub use entry::{EntryForm, EntryStep};
pub use health::{sync_units, DisabledHealthBridge, HealthBridge, JournalHealthBridge};
pub use stats::{
    best_companion, drinking_days, estimated_bottle_capacity, sobriety_streak_days, ToleranceBand,
};
pub use export::export_csv;
