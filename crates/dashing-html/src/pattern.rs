//! Serde adapters for regular expressions compiled at configuration load time.
//!
//! An invalid pattern surfaces as a deserialization error naming the pattern,
//! so a bad configuration is rejected before any file is processed.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serializer, de, ser::SerializeSeq};

use crate::error::SelectorError;

/// Compiles `pattern`, mapping failures to [`SelectorError::InvalidPattern`].
///
/// # Errors
///
/// Returns an error if the pattern is not a valid regular expression.
pub fn compile(pattern: &str) -> Result<Regex, SelectorError> {
  Regex::new(pattern).map_err(|source| {
    SelectorError::InvalidPattern {
      pattern: pattern.to_string(),
      source,
    }
  })
}

/// `#[serde(with = "pattern::optional")]` for `Option<Regex>` fields.
pub mod optional {
  use super::{Deserialize, Deserializer, Regex, Serializer, compile, de};

  /// # Errors
  ///
  /// Fails when the underlying serializer does.
  pub fn serialize<S>(
    value: &Option<Regex>,
    serializer: S,
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    match value {
      Some(re) => serializer.serialize_some(re.as_str()),
      None => serializer.serialize_none(),
    }
  }

  /// # Errors
  ///
  /// Fails when the value is not a string or does not compile.
  pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Regex>, D::Error>
  where
    D: Deserializer<'de>,
  {
    Option::<String>::deserialize(deserializer)?
      .map(|pattern| compile(&pattern).map_err(de::Error::custom))
      .transpose()
  }
}

/// `#[serde(with = "pattern::list")]` for `Vec<Regex>` fields.
pub mod list {
  use super::{
    Deserialize,
    Deserializer,
    Regex,
    SerializeSeq,
    Serializer,
    compile,
    de,
  };

  /// # Errors
  ///
  /// Fails when the underlying serializer does.
  pub fn serialize<S>(value: &[Regex], serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    let mut seq = serializer.serialize_seq(Some(value.len()))?;
    for re in value {
      seq.serialize_element(re.as_str())?;
    }
    seq.end()
  }

  /// # Errors
  ///
  /// Fails when the value is not a list of strings or any entry does not
  /// compile.
  pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Regex>, D::Error>
  where
    D: Deserializer<'de>,
  {
    Vec::<String>::deserialize(deserializer)?
      .iter()
      .map(|pattern| compile(pattern).map_err(de::Error::custom))
      .collect()
  }
}
