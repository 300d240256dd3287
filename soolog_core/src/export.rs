//! CSV export of the drinking history.
//!
//! Writes the full record list to a CSV file for use outside the app. The
//! export is a snapshot: it always rewrites the whole file and fsyncs it
//! before returning.

use crate::{DrinkRecord, Person, Result};
use std::path::Path;
use uuid::Uuid;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    kind: String,
    timestamp: String,
    brand: Option<String>,
    units: f64,
    unit_name: String,
    unit_ml: f64,
    alcohol_percent: f64,
    total_alcohol_ml: f64,
    feeling: Option<String>,
    companions: String,
    health_synced: bool,
    memo: Option<String>,
}

fn companion_names(ids: &[Uuid], people: &[Person]) -> String {
    ids.iter()
        .filter_map(|id| people.iter().find(|p| p.id == *id))
        .map(|p| p.name.clone())
        .collect::<Vec<_>>()
        .join("; ")
}

fn to_row(record: &DrinkRecord, people: &[Person]) -> CsvRow {
    CsvRow {
        id: record.id.to_string(),
        kind: record.kind.label().to_string(),
        timestamp: record.timestamp.to_rfc3339(),
        brand: record.brand.clone(),
        units: record.units,
        unit_name: record.unit_name.clone(),
        unit_ml: record.unit_ml,
        alcohol_percent: record.alcohol_percent,
        total_alcohol_ml: record.total_pure_alcohol(),
        feeling: record.feeling.map(|f| f.label().to_string()),
        companions: companion_names(&record.companions, people),
        health_synced: record.health_synced,
        memo: record.memo.clone(),
    }
}

/// Export all records to `path`, returning the number of rows written
pub fn export_csv(records: &[DrinkRecord], people: &[Person], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    for record in records {
        writer.serialize(to_row(record, people))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Exported {} records to {:?}", records.len(), path);
    Ok(records.len())
}
