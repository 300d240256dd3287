//! Health store bridge: mirror consumed units into an external health log.
//!
//! The bridge is an injected seam. The real platform store is out of scope,
//! so the shipped implementation appends to a JSONL journal file; tests and
//! disabled configurations use the no-op bridge. Whatever the bridge does,
//! a failed sync only costs the record its sync flag - the save itself has
//! already happened and is never rolled back.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// External health-data store seam
///
/// `save_units` must only be called after `request_authorization` returned
/// `Ok(true)`.
pub trait HealthBridge {
    fn request_authorization(&mut self) -> Result<bool>;
    fn save_units(&mut self, units: f64, at: DateTime<Utc>) -> Result<()>;
}

/// One mirrored consumption entry in the journal
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthEntry {
    pub units: f64,
    pub at: DateTime<Utc>,
    pub written_at: DateTime<Utc>,
}

/// JSONL-backed health journal with file locking
pub struct JournalHealthBridge {
    path: PathBuf,
}

impl JournalHealthBridge {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HealthBridge for JournalHealthBridge {
    fn request_authorization(&mut self) -> Result<bool> {
        // A local file needs no permission prompt; only an unwritable parent
        // counts as a denied authorization.
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::HealthSync(format!("journal dir unavailable: {}", e)))?;
        }
        Ok(true)
    }

    fn save_units(&mut self, units: f64, at: DateTime<Utc>) -> Result<()> {
        let entry = HealthEntry {
            units,
            at,
            written_at: Utc::now(),
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::HealthSync(format!("cannot open journal: {}", e)))?;

        file.lock_exclusive()
            .map_err(|e| Error::HealthSync(format!("cannot lock journal: {}", e)))?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(&entry)?;
        let result = writer
            .write_all(line.as_bytes())
            .and_then(|_| writer.write_all(b"\n"))
            .and_then(|_| writer.flush());
        drop(writer);
        file.unlock()?;
        result.map_err(|e| Error::HealthSync(format!("journal write failed: {}", e)))?;

        tracing::debug!("Mirrored {} units to health journal", units);
        Ok(())
    }
}

/// Bridge used when health sync is turned off in config
pub struct DisabledHealthBridge;

impl HealthBridge for DisabledHealthBridge {
    fn request_authorization(&mut self) -> Result<bool> {
        Ok(false)
    }

    fn save_units(&mut self, _units: f64, _at: DateTime<Utc>) -> Result<()> {
        Ok(())
    }
}

/// Read back all journal entries (missing file is an empty journal)
pub fn read_journal(path: &Path) -> Result<Vec<HealthEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut entries = Vec::new();
    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<HealthEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!("Skipping bad journal line {}: {}", line_num + 1, e);
            }
        }
    }
    file.unlock()?;
    Ok(entries)
}

/// Authorize-then-write, swallowing failures
///
/// Returns whether the units were actually mirrored. Any failure is logged
/// and reported as `false`; it never propagates, because the record save
/// has already completed by the time this runs.
pub fn sync_units(bridge: &mut dyn HealthBridge, units: f64, at: DateTime<Utc>) -> bool {
    if units <= 0.0 {
        return false;
    }

    match bridge.request_authorization() {
        Ok(true) => {}
        Ok(false) => {
            tracing::info!("Health store authorization declined, skipping sync");
            return false;
        }
        Err(e) => {
            tracing::warn!("Health store authorization failed: {}", e);
            return false;
        }
    }

    match bridge.save_units(units, at) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Health store write failed: {}", e);
            false
        }
    }
}
