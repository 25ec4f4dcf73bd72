use std::{io, path::PathBuf, string::FromUtf8Error};

use thiserror::Error;

/// Errors raised while compiling configuration-level selectors and patterns.
#[derive(Debug, Error)]
pub enum SelectorError {
  #[error("Invalid CSS selector '{0}'")]
  InvalidSelector(String),

  #[error("Invalid regexp pattern '{pattern}': {source}")]
  InvalidPattern {
    pattern: String,
    #[source]
    source:  regex::Error,
  },
}

/// Errors that stop a single page from being processed.
///
/// None of these are fatal for a run; the caller logs them and moves on to
/// the next file.
#[derive(Debug, Error)]
pub enum PageError {
  #[error("Failed to read {}: {source}", path.display())]
  Read {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Failed to serialize document: {0}")]
  Serialize(#[from] io::Error),

  #[error("Serialized document is not valid UTF-8: {0}")]
  Utf8(#[from] FromUtf8Error),
}
