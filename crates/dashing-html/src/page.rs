use std::path::{Path, PathBuf};

use kuchikikiki::NodeRef;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use tendril::TendrilSink;

use crate::{
  anchor::AnchorCounter,
  entities,
  error::PageError,
  mutate,
  resources,
  rules::{PageContext, Reference, RuleSet},
  selector::{CssSelector, Selector},
  text,
};

/// File extensions treated as markup. Everything else is an opaque resource.
pub const HTML_EXTENSIONS: &[&str] = &["html", "htm", "xhtml", "html5"];

/// Whether `path` names a markup file, judged by its extension.
#[must_use]
pub fn is_htmlish(path: &Path) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .is_some_and(|ext| {
      HTML_EXTENSIONS
        .iter()
        .any(|known| ext.eq_ignore_ascii_case(known))
    })
}

/// Everything the page processor needs from the configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageRules {
  /// Primary and backup extraction rules.
  #[serde(flatten)]
  pub rule_set: RuleSet,

  /// Every match of every selector is deleted before extraction.
  #[serde(default)]
  pub remove_elements: Vec<CssSelector>,

  /// The first match becomes the entire page body.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub css_selector_for_body: Option<CssSelector>,

  /// The text of the first match becomes the menu description of every
  /// entry on the page.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub css_selector_for_title: Option<CssSelector>,
}

/// The outcome of processing one page.
#[derive(Debug)]
pub struct ProcessedPage {
  /// Path of the page as used in hrefs.
  pub path:       String,
  /// Extracted entries, in document order.
  pub references: Vec<Reference>,
  /// Local files the page links to, relative to the walk root.
  pub used_files: Vec<PathBuf>,
  /// The rewritten document.
  pub document:   NodeRef,
}

impl ProcessedPage {
  /// Serializes the rewritten document and re-encodes it with named
  /// entities.
  ///
  /// # Errors
  ///
  /// Returns an error if serialization fails.
  pub fn render(&self) -> Result<String, PageError> {
    let mut out = Vec::new();
    self.document.serialize(&mut out)?;
    let html = String::from_utf8(out)?;
    Ok(entities::encode_entities(&html))
  }
}

/// Runs removal, body replacement, title lookup and entry extraction over
/// pages, one at a time.
///
/// The processor owns the run's [`AnchorCounter`], so every page handled by
/// the same processor gets distinct anchor ids.
#[derive(Debug)]
pub struct PageProcessor<'a> {
  rules:   &'a PageRules,
  anchors: AnchorCounter,
}

impl<'a> PageProcessor<'a> {
  #[must_use]
  pub const fn new(rules: &'a PageRules) -> Self {
    Self {
      rules,
      anchors: AnchorCounter::new(),
    }
  }

  /// A processor continuing from an existing counter.
  #[must_use]
  pub const fn with_anchors(rules: &'a PageRules, anchors: AnchorCounter) -> Self {
    Self { rules, anchors }
  }

  /// The counter as it stands after the pages processed so far.
  #[must_use]
  pub const fn anchors(&self) -> &AnchorCounter {
    &self.anchors
  }

  /// Reads and processes the markup file at `path`.
  ///
  /// `path` is used verbatim in entry hrefs, so it should be relative to the
  /// documentation root. Invalid UTF-8 is replaced rather than rejected.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read.
  pub fn process_file(&mut self, path: &Path) -> Result<ProcessedPage, PageError> {
    let document = kuchikikiki::parse_html()
      .from_utf8()
      .from_file(path)
      .map_err(|source| {
        PageError::Read {
          path: path.to_path_buf(),
          source,
        }
      })?;
    Ok(self.process_document(&path.to_string_lossy(), document))
  }

  /// Processes markup already in memory, as if it had been read from `path`.
  pub fn process_str(&mut self, path: &str, html: &str) -> ProcessedPage {
    let document = kuchikikiki::parse_html().one(html);
    self.process_document(path, document)
  }

  /// Processes an already parsed document.
  pub fn process_document(&mut self, path: &str, document: NodeRef) -> ProcessedPage {
    info!("{path} looks like HTML");

    let used_files = resources::used_files(&document, path);

    mutate::remove_elements(&document, &self.rules.remove_elements, path);
    if let Some(ref body) = self.rules.css_selector_for_body {
      mutate::replace_body(&document, body, path);
    }

    let title = self.title(&document, path);
    let page = PageContext {
      path,
      title: &title,
    };
    let references =
      self.rules.rule_set.extract(&document, &page, &mut self.anchors);

    ProcessedPage {
      path: path.to_string(),
      references,
      used_files,
      document,
    }
  }

  fn title(&self, document: &NodeRef, path: &str) -> String {
    let Some(ref selector) = self.rules.css_selector_for_title else {
      return String::new();
    };
    match selector.first_match(document) {
      Some(node) => text::text(&node),
      None => {
        debug!("No title matching '{selector}' in {path}");
        String::new()
      },
    }
  }
}
