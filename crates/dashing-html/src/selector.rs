//! Selector capability used by every matching step.
//!
//! Extraction, removal and body replacement only ever talk to [`Selector`];
//! [`CssSelector`] is the engine backed by `kuchikikiki`'s CSS selector
//! implementation.

use std::{fmt, str::FromStr, sync::Arc};

use kuchikikiki::{NodeRef, Selectors};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::error::SelectorError;

/// Something that can decide whether a node of the document tree matches.
pub trait Selector: fmt::Display {
  /// Tests a single node. Only element nodes can match.
  fn matches(&self, node: &NodeRef) -> bool;

  /// First match under `root` (inclusive) in document order.
  fn first_match(&self, root: &NodeRef) -> Option<NodeRef> {
    root.inclusive_descendants().find(|node| self.matches(node))
  }

  /// Every match under `root` (inclusive) in document order.
  fn all_matches(&self, root: &NodeRef) -> Vec<NodeRef> {
    root
      .inclusive_descendants()
      .filter(|node| self.matches(node))
      .collect()
  }
}

/// A compiled CSS selector list that remembers its source text.
#[derive(Clone)]
pub struct CssSelector {
  source:   String,
  compiled: Arc<Selectors>,
}

impl CssSelector {
  /// Compiles a selector list such as `"h2.section, dt[id]"`.
  ///
  /// # Errors
  ///
  /// Returns [`SelectorError::InvalidSelector`] if the selector does not
  /// parse.
  pub fn parse(source: &str) -> Result<Self, SelectorError> {
    let compiled = Selectors::compile(source)
      .map_err(|_| SelectorError::InvalidSelector(source.to_string()))?;
    Ok(Self {
      source:   source.to_string(),
      compiled: Arc::new(compiled),
    })
  }

  /// The selector as written in the configuration.
  #[must_use]
  pub fn as_str(&self) -> &str {
    &self.source
  }
}

impl Selector for CssSelector {
  fn matches(&self, node: &NodeRef) -> bool {
    node
      .clone()
      .into_element_ref()
      .is_some_and(|element| self.compiled.matches(&element))
  }
}

impl fmt::Display for CssSelector {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.source)
  }
}

impl fmt::Debug for CssSelector {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("CssSelector").field(&self.source).finish()
  }
}

impl PartialEq for CssSelector {
  fn eq(&self, other: &Self) -> bool {
    self.source == other.source
  }
}

impl Eq for CssSelector {}

impl FromStr for CssSelector {
  type Err = SelectorError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}

impl Serialize for CssSelector {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.serialize_str(&self.source)
  }
}

impl<'de> Deserialize<'de> for CssSelector {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let source = String::deserialize(deserializer)?;
    Self::parse(&source).map_err(de::Error::custom)
  }
}
