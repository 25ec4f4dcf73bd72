use std::{
  fs,
  path::{Component, Path, PathBuf},
};

use log::{debug, info};

use crate::error::OutputError;

/// Bundle-relative location of the documents tree.
pub const DOCUMENTS_DIR: &str = "Contents/Resources/Documents";

/// Bundle-relative location of the search index.
pub const INDEX_FILE: &str = "Contents/Resources/docSet.dsidx";

/// Bundle-relative location of the bundle metadata.
pub const PLIST_FILE: &str = "Contents/Info.plist";

/// Bundle-relative location of the docset icon.
pub const ICON_FILE: &str = "icon.png";

/// Writes files into a docset bundle rooted at one directory.
#[derive(Debug, Clone)]
pub struct DocsetWriter {
  root: PathBuf,
}

impl DocsetWriter {
  /// Creates the bundle skeleton under `root`.
  ///
  /// # Errors
  ///
  /// Returns an error if the directories cannot be created.
  pub fn create(root: impl Into<PathBuf>) -> Result<Self, OutputError> {
    let root = root.into();
    let documents = root.join(DOCUMENTS_DIR);
    fs::create_dir_all(&documents)
      .map_err(|e| OutputError::io(&documents, e))?;
    info!("Writing docset to {}", root.display());
    Ok(Self { root })
  }

  #[must_use]
  pub fn root(&self) -> &Path {
    &self.root
  }

  #[must_use]
  pub fn index_path(&self) -> PathBuf {
    self.root.join(INDEX_FILE)
  }

  /// Where a walked file lands inside the documents tree.
  ///
  /// Only the normal components of `source` are kept, so absolute paths and
  /// `..` segments can never escape the bundle.
  #[must_use]
  pub fn documents_path(&self, source: &Path) -> PathBuf {
    let mut dest = self.root.join(DOCUMENTS_DIR);
    dest.extend(source.components().filter_map(|component| {
      match component {
        Component::Normal(part) => Some(part),
        _ => None,
      }
    }));
    dest
  }

  /// Writes `contents` to a bundle-relative path, replacing any existing
  /// file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be written.
  pub fn write_file(
    &self,
    relative: &str,
    contents: impl AsRef<[u8]>,
  ) -> Result<(), OutputError> {
    write_creating_parents(&self.root.join(relative), contents.as_ref())
  }

  /// Writes a processed page to its place in the documents tree, replacing
  /// any existing file.
  ///
  /// # Errors
  ///
  /// Returns an error if the page cannot be written.
  pub fn write_html(&self, source: &Path, html: &str) -> Result<(), OutputError> {
    let dest = self.documents_path(source);
    debug!("Writing {}", dest.display());
    write_creating_parents(&dest, html.as_bytes())
  }

  /// Copies a walked file into the documents tree.
  ///
  /// Returns `false` without copying when the destination already exists.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be copied.
  pub fn add_content_file(&self, source: &Path) -> Result<bool, OutputError> {
    copy_if_missing(source, &self.documents_path(source))
  }

  /// Copies `source` to a bundle-relative path unless it already exists.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be copied.
  pub fn copy_file(&self, source: &Path, relative: &str) -> Result<bool, OutputError> {
    copy_if_missing(source, &self.root.join(relative))
  }
}

fn write_creating_parents(dest: &Path, contents: &[u8]) -> Result<(), OutputError> {
  if let Some(parent) = dest.parent() {
    fs::create_dir_all(parent).map_err(|e| OutputError::io(parent, e))?;
  }
  fs::write(dest, contents).map_err(|e| OutputError::io(dest, e))
}

fn copy_if_missing(source: &Path, dest: &Path) -> Result<bool, OutputError> {
  if dest.exists() {
    return Ok(false);
  }

  info!("Copying {} to {}", source.display(), dest.display());
  if let Some(parent) = dest.parent() {
    fs::create_dir_all(parent).map_err(|e| OutputError::io(parent, e))?;
  }
  fs::copy(source, dest).map_err(|e| OutputError::io(source, e))?;
  Ok(true)
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use tempfile::TempDir;

  use super::*;

  #[test]
  fn test_create_builds_skeleton() {
    let temp_dir = TempDir::new().unwrap();
    let writer = DocsetWriter::create(temp_dir.path().join("x.docset")).unwrap();

    assert!(writer.root().join(DOCUMENTS_DIR).is_dir());
    assert_eq!(
      writer.index_path(),
      temp_dir.path().join("x.docset/Contents/Resources/docSet.dsidx")
    );
  }

  #[test]
  fn test_documents_path_stays_inside_bundle() {
    let writer = DocsetWriter {
      root: PathBuf::from("out.docset"),
    };
    let docs = PathBuf::from("out.docset").join(DOCUMENTS_DIR);

    assert_eq!(writer.documents_path(Path::new("a/b.html")), docs.join("a/b.html"));
    assert_eq!(writer.documents_path(Path::new("./a.html")), docs.join("a.html"));
    assert_eq!(writer.documents_path(Path::new("/srv/a.html")), docs.join("srv/a.html"));
    assert_eq!(writer.documents_path(Path::new("../a.html")), docs.join("a.html"));
  }

  #[test]
  fn test_html_is_overwritten_but_copies_are_not() {
    let temp_dir = TempDir::new().unwrap();
    let writer = DocsetWriter::create(temp_dir.path().join("x.docset")).unwrap();
    let source = temp_dir.path().join("style.css");
    fs::write(&source, "a{}").unwrap();

    writer.write_html(Path::new("p.html"), "one").unwrap();
    writer.write_html(Path::new("p.html"), "two").unwrap();
    let page = writer.documents_path(Path::new("p.html"));
    assert_eq!(fs::read_to_string(page).unwrap(), "two");

    assert!(writer.copy_file(&source, "css/style.css").unwrap());
    fs::write(&source, "b{}").unwrap();
    assert!(!writer.copy_file(&source, "css/style.css").unwrap());
    let copied = writer.root().join("css/style.css");
    assert_eq!(fs::read_to_string(copied).unwrap(), "a{}");
  }

  #[test]
  fn test_copy_of_missing_source_fails() {
    let temp_dir = TempDir::new().unwrap();
    let writer = DocsetWriter::create(temp_dir.path().join("x.docset")).unwrap();

    let err = writer
      .copy_file(&temp_dir.path().join("nope.png"), ICON_FILE)
      .unwrap_err();
    assert!(err.to_string().contains("nope.png"));
  }
}
