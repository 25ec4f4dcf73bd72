//! The docset search index.

use std::path::Path;

use dashing_html::Reference;
use log::debug;
use rusqlite::{Connection, params};

use crate::error::OutputError;

/// One row of the search index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRecord {
  pub name:       String,
  pub entry_type: String,
  /// Location as understood by docset viewers, including the menu metadata.
  pub path:       String,
}

impl IndexRecord {
  /// Builds the row for an extracted reference.
  ///
  /// The stored path carries the entry name and the page title as viewer
  /// metadata in front of the actual href:
  /// `<dash_entry_name=N><dash_entry_originalName=N><dash_entry_menuDescription=M>HREF`.
  #[must_use]
  pub fn from_reference(reference: &Reference) -> Self {
    Self {
      name:       reference.name.clone(),
      entry_type: reference.entry_type.clone(),
      path:       format!(
        "<dash_entry_name={name}><dash_entry_originalName={name}>\
         <dash_entry_menuDescription={menu}>{href}",
        name = reference.name,
        menu = reference.menu_description,
        href = reference.href,
      ),
    }
  }
}

/// Destination for index records.
pub trait IndexSink {
  /// Stores `record`, returning `false` when an identical record was already
  /// present.
  ///
  /// # Errors
  ///
  /// Returns an error if the record cannot be stored.
  fn insert(&mut self, record: &IndexRecord) -> Result<bool, OutputError>;

  /// Makes every inserted record durable.
  ///
  /// # Errors
  ///
  /// Returns an error if pending records cannot be persisted.
  fn finish(&mut self) -> Result<(), OutputError> {
    Ok(())
  }
}

/// The `searchIndex` table of a docset, stored with SQLite.
///
/// All inserts of one run share a single transaction, opened with the index
/// and committed by [`IndexSink::finish`]. Dropping the index without
/// finishing discards the run's records.
pub struct SqliteIndex {
  conn:     Connection,
  inserted: usize,
}

impl SqliteIndex {
  /// Opens, or creates, the index database at `path`.
  ///
  /// # Errors
  ///
  /// Returns an error if the database cannot be opened or the schema cannot
  /// be created.
  pub fn open(path: &Path) -> Result<Self, OutputError> {
    let conn = Connection::open(path)?;

    conn.execute(
      "CREATE TABLE IF NOT EXISTS searchIndex(id INTEGER PRIMARY KEY, name \
       TEXT, type TEXT, path TEXT)",
      [],
    )?;
    conn.execute(
      "CREATE UNIQUE INDEX IF NOT EXISTS anchor ON searchIndex (name, type, \
       path)",
      [],
    )?;
    conn.execute_batch("BEGIN")?;

    debug!("Opened search index at {}", path.display());
    Ok(Self { conn, inserted: 0 })
  }

  /// Number of rows added by this run so far.
  #[must_use]
  pub const fn inserted(&self) -> usize {
    self.inserted
  }
}

impl IndexSink for SqliteIndex {
  fn insert(&mut self, record: &IndexRecord) -> Result<bool, OutputError> {
    let mut stmt = self.conn.prepare_cached(
      "INSERT OR IGNORE INTO searchIndex(name, type, path) VALUES (?1, ?2, ?3)",
    )?;
    let changed =
      stmt.execute(params![record.name, record.entry_type, record.path])?;
    self.inserted += changed;
    Ok(changed > 0)
  }

  fn finish(&mut self) -> Result<(), OutputError> {
    if self.conn.is_autocommit() {
      return Ok(());
    }
    self.conn.execute_batch("COMMIT")?;
    debug!("Committed {} index records", self.inserted);
    Ok(())
  }
}

/// An in-memory index, keeping the first occurrence of every record.
#[derive(Debug, Default)]
pub struct MemoryIndex {
  pub records: Vec<IndexRecord>,
}

impl IndexSink for MemoryIndex {
  fn insert(&mut self, record: &IndexRecord) -> Result<bool, OutputError> {
    if self.records.contains(record) {
      return Ok(false);
    }
    self.records.push(record.clone());
    Ok(true)
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use tempfile::TempDir;

  use super::*;

  fn reference(name: &str, href: &str) -> Reference {
    Reference {
      selector:         "h2".to_string(),
      name:             name.to_string(),
      entry_type:       "Section".to_string(),
      href:             href.to_string(),
      menu_description: "Guide".to_string(),
    }
  }

  fn count_rows(path: &Path) -> i64 {
    Connection::open(path)
      .unwrap()
      .query_row("SELECT COUNT(*) FROM searchIndex", [], |row| row.get(0))
      .unwrap()
  }

  #[test]
  fn test_record_path_format() {
    let record = IndexRecord::from_reference(&reference("Intro", "p.html#x"));
    assert_eq!(
      record.path,
      "<dash_entry_name=Intro><dash_entry_originalName=Intro>\
       <dash_entry_menuDescription=Guide>p.html#x"
    );
    assert_eq!(record.entry_type, "Section");
  }

  #[test]
  fn test_sqlite_index_ignores_duplicates() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("docSet.dsidx");

    let mut index = SqliteIndex::open(&db).unwrap();
    let record = IndexRecord::from_reference(&reference("Intro", "p.html#x"));
    assert!(index.insert(&record).unwrap());
    assert!(!index.insert(&record).unwrap());
    assert!(
      index
        .insert(&IndexRecord::from_reference(&reference("Intro", "q.html#x")))
        .unwrap()
    );
    index.finish().unwrap();

    assert_eq!(index.inserted(), 2);
    assert_eq!(count_rows(&db), 2);
  }

  #[test]
  fn test_sqlite_index_reopens_existing_database() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("docSet.dsidx");
    let record = IndexRecord::from_reference(&reference("Intro", "p.html#x"));

    let mut first = SqliteIndex::open(&db).unwrap();
    first.insert(&record).unwrap();
    first.finish().unwrap();
    drop(first);

    let mut second = SqliteIndex::open(&db).unwrap();
    assert!(!second.insert(&record).unwrap());
    second.finish().unwrap();
    drop(second);

    assert_eq!(count_rows(&db), 1);
  }

  #[test]
  fn test_unfinished_index_is_discarded() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("docSet.dsidx");

    let mut index = SqliteIndex::open(&db).unwrap();
    index
      .insert(&IndexRecord::from_reference(&reference("Intro", "p.html#x")))
      .unwrap();
    drop(index);

    assert_eq!(count_rows(&db), 0);
  }

  #[test]
  fn test_memory_index_keeps_first_occurrence() {
    let mut index = MemoryIndex::default();
    let record = IndexRecord::from_reference(&reference("A", "a.html#a"));
    assert!(index.insert(&record).unwrap());
    assert!(!index.insert(&record).unwrap());
    assert_eq!(index.records.len(), 1);
  }
}
