use std::{io, path::PathBuf};

use thiserror::Error;

/// Error type for writing a docset bundle
#[derive(Debug, Error)]
pub enum OutputError {
  #[error("I/O error at {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Index error: {0}")]
  Index(#[from] rusqlite::Error),

  #[error("Template error: {0}")]
  Template(#[from] tera::Error),
}

impl OutputError {
  pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
    Self::Io {
      path: path.into(),
      source,
    }
  }
}
