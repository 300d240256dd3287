//! Record store: local JSON persistence for people and drink records.
//!
//! The whole data set lives in a single JSON document. Saves are atomic
//! (temp file, fsync, rename) with exclusive file locking so a second
//! process cannot interleave a write.

use crate::{DrinkRecord, Error, Person, Result, SortOrder};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// On-disk document format
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
struct StoreDocument {
    #[serde(default)]
    people: Vec<Person>,
    #[serde(default)]
    records: Vec<DrinkRecord>,
}

/// The record store, loaded fully into memory
pub struct RecordStore {
    path: PathBuf,
    doc: StoreDocument,
}

impl RecordStore {
    /// Open the store at `path`
    ///
    /// A missing file yields an empty store. A file that exists but cannot
    /// be read or parsed is an error: statistics over a silently truncated
    /// data set would be wrong, so startup fails instead.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            tracing::info!("No store file at {:?}, starting empty", path);
            return Ok(Self {
                path,
                doc: StoreDocument::default(),
            });
        }

        let file = File::open(&path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        reader.read_to_string(&mut contents)?;
        file.unlock()?;

        let doc: StoreDocument = serde_json::from_str(&contents)
            .map_err(|e| Error::Store(format!("corrupt store file {:?}: {}", path, e)))?;

        tracing::debug!(
            "Loaded store from {:?} ({} people, {} records)",
            path,
            doc.people.len(),
            doc.records.len()
        );
        Ok(Self { path, doc })
    }

    /// Persist the current state atomically
    ///
    /// Writes to a temp file in the same directory, syncs it, then renames
    /// over the original.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(self.path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "store path missing parent")
        })?)?;

        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(&self.doc)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved store to {:?}", self.path);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // ========================================================================
    // People
    // ========================================================================

    /// Add a person to the roster. Names must be unique.
    pub fn insert_person(&mut self, person: Person) -> Result<()> {
        if person.name.trim().is_empty() {
            return Err(Error::Store("person name cannot be empty".into()));
        }
        if self.person_by_name(&person.name).is_some() {
            return Err(Error::Store(format!(
                "person '{}' already exists",
                person.name
            )));
        }
        tracing::debug!("Added person {} ({})", person.name, person.id);
        self.doc.people.push(person);
        Ok(())
    }

    /// Remove a person and strip them from every record's companion list
    pub fn remove_person(&mut self, id: Uuid) -> bool {
        let before = self.doc.people.len();
        self.doc.people.retain(|p| p.id != id);
        if self.doc.people.len() == before {
            return false;
        }
        for record in &mut self.doc.records {
            record.companions.retain(|c| *c != id);
        }
        true
    }

    pub fn person(&self, id: Uuid) -> Option<&Person> {
        self.doc.people.iter().find(|p| p.id == id)
    }

    pub fn person_by_name(&self, name: &str) -> Option<&Person> {
        self.doc.people.iter().find(|p| p.name == name)
    }

    /// All people sorted by name
    pub fn people_sorted(&self) -> Vec<Person> {
        let mut people = self.doc.people.clone();
        people.sort_by(|a, b| a.name.cmp(&b.name));
        people
    }

    // ========================================================================
    // Records
    // ========================================================================

    pub fn insert_record(&mut self, record: DrinkRecord) {
        tracing::debug!("Inserted record {} ({:?})", record.id, record.kind);
        self.doc.records.push(record);
    }

    pub fn remove_record(&mut self, id: Uuid) -> bool {
        let before = self.doc.records.len();
        self.doc.records.retain(|r| r.id != id);
        self.doc.records.len() != before
    }

    pub fn record(&self, id: Uuid) -> Option<&DrinkRecord> {
        self.doc.records.iter().find(|r| r.id == id)
    }

    /// Find a record by a hex prefix of its id (CLI convenience)
    ///
    /// Returns an error when the prefix is ambiguous.
    pub fn record_by_id_prefix(&self, prefix: &str) -> Result<&DrinkRecord> {
        let prefix = prefix.to_lowercase();
        let mut matches = self
            .doc
            .records
            .iter()
            .filter(|r| r.id.to_string().starts_with(&prefix));

        match (matches.next(), matches.next()) {
            (Some(record), None) => Ok(record),
            (Some(_), Some(_)) => Err(Error::Store(format!(
                "record id prefix '{}' is ambiguous",
                prefix
            ))),
            (None, _) => Err(Error::Store(format!("no record matching '{}'", prefix))),
        }
    }

    /// All records ordered by timestamp
    pub fn records_sorted(&self, order: SortOrder) -> Vec<DrinkRecord> {
        let mut records = self.doc.records.clone();
        match order {
            SortOrder::OldestFirst => records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
            SortOrder::NewestFirst => records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
        }
        records
    }

    /// Records a given person appears in, newest first
    pub fn records_with(&self, person_id: Uuid) -> Vec<DrinkRecord> {
        let mut records: Vec<DrinkRecord> = self
            .doc
            .records
            .iter()
            .filter(|r| r.companions.contains(&person_id))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records
    }

    // ========================================================================
    // Post-save mutations (sync flag and timestamp correction only)
    // ========================================================================

    pub fn mark_health_synced(&mut self, id: Uuid) -> Result<()> {
        let record = self
            .doc
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::Store(format!("no record with id {}", id)))?;
        record.health_synced = true;
        Ok(())
    }

    /// Timestamp correction for an already-saved record
    pub fn set_timestamp(&mut self, id: Uuid, timestamp: DateTime<Utc>) -> Result<()> {
        let record = self
            .doc
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::Store(format!("no record with id {}", id)))?;
        record.timestamp = timestamp;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AlcoholKind, Feeling};

    fn test_record(kind: AlcoholKind, companions: Vec<Uuid>) -> DrinkRecord {
        DrinkRecord {
            id: Uuid::new_v4(),
            kind,
            timestamp: Utc::now(),
            alcohol_percent: 16.0,
            units: 1.0,
            unit_ml: 360.0,
            unit_name: "bottle".into(),
            alcohol_per_unit: 57.6,
            brand: None,
            memo: None,
            health_synced: false,
            feeling: Some(Feeling::Light),
            companions,
        }
    }

    #[test]
    fn test_open_missing_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = RecordStore::open(temp_dir.path().join("store.json")).unwrap();
        assert!(store.records_sorted(SortOrder::NewestFirst).is_empty());
        assert!(store.people_sorted().is_empty());
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("store.json");

        let mut store = RecordStore::open(&path).unwrap();
        let person = Person::new("Yeji");
        let person_id = person.id;
        store.insert_person(person).unwrap();
        store.insert_record(test_record(AlcoholKind::Soju, vec![person_id]));
        store.save().unwrap();

        let reloaded = RecordStore::open(&path).unwrap();
        assert_eq!(reloaded.people_sorted().len(), 1);
        let records = reloaded.records_sorted(SortOrder::NewestFirst);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].companions, vec![person_id]);
    }

    #[test]
    fn test_corrupt_store_is_fatal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("store.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = RecordStore::open(&path);
        assert!(matches!(result, Err(Error::Store(_))));
    }

    #[test]
    fn test_duplicate_person_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = RecordStore::open(temp_dir.path().join("store.json")).unwrap();

        store.insert_person(Person::new("Minsu")).unwrap();
        let result = store.insert_person(Person::new("Minsu"));
        assert!(result.is_err());
    }

    #[test]
    fn test_remove_person_strips_companions() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = RecordStore::open(temp_dir.path().join("store.json")).unwrap();

        let person = Person::new("Minsu");
        let person_id = person.id;
        store.insert_person(person).unwrap();
        store.insert_record(test_record(AlcoholKind::Beer, vec![person_id]));

        assert!(store.remove_person(person_id));
        let records = store.records_sorted(SortOrder::NewestFirst);
        assert!(records[0].companions.is_empty());
    }

    #[test]
    fn test_records_sorted_orders() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = RecordStore::open(temp_dir.path().join("store.json")).unwrap();

        let mut old = test_record(AlcoholKind::Soju, vec![]);
        old.timestamp = Utc::now() - chrono::Duration::days(3);
        let new = test_record(AlcoholKind::Beer, vec![]);
        let old_id = old.id;
        let new_id = new.id;
        store.insert_record(old);
        store.insert_record(new);

        let newest = store.records_sorted(SortOrder::NewestFirst);
        assert_eq!(newest[0].id, new_id);
        let oldest = store.records_sorted(SortOrder::OldestFirst);
        assert_eq!(oldest[0].id, old_id);
    }

    #[test]
    fn test_id_prefix_lookup() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = RecordStore::open(temp_dir.path().join("store.json")).unwrap();

        let record = test_record(AlcoholKind::Wine, vec![]);
        let id = record.id;
        store.insert_record(record);

        let prefix = &id.to_string()[..8];
        assert_eq!(store.record_by_id_prefix(prefix).unwrap().id, id);
        assert!(store.record_by_id_prefix("zzzz").is_err());
    }

    #[test]
    fn test_mark_synced_and_redate() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = RecordStore::open(temp_dir.path().join("store.json")).unwrap();

        let record = test_record(AlcoholKind::Soju, vec![]);
        let id = record.id;
        store.insert_record(record);

        store.mark_health_synced(id).unwrap();
        let corrected = Utc::now() - chrono::Duration::days(1);
        store.set_timestamp(id, corrected).unwrap();

        let record = store.record(id).unwrap();
        assert!(record.health_synced);
        assert_eq!(record.timestamp, corrected);

        assert!(store.mark_health_synced(Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("store.json");

        let store = RecordStore::open(&path).unwrap();
        store.save().unwrap();

        assert!(path.exists());
        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "store.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only store.json, found extras: {:?}",
            extras
        );
    }
}
