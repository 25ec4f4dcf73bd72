//! Selector rules and entry extraction.
//!
//! A [`RuleSet`] walks a parsed page once per rule list, turning every node
//! that satisfies a [`MatchRule`] into a [`Reference`] and injecting the
//! matching TOC anchor as it goes.

use kuchikikiki::NodeRef;
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
  anchor::{self, AnchorCounter},
  mutate,
  pattern,
  selector::{CssSelector, Selector},
  text,
};

/// Pages whose path ends with this suffix continue a previous page. They get
/// TOC anchors but contribute nothing to the index.
pub const CONTINUATION_SUFFIX: &str = "-2.html";

/// One configured extraction rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRule {
  /// Selector that marks candidate elements.
  #[serde(rename = "css")]
  pub selector: CssSelector,

  /// Entry type recorded in the index and in TOC targets.
  #[serde(rename = "type")]
  pub entry_type: String,

  /// Attribute to read the entry name from instead of the element text.
  #[serde(default, rename = "attr", skip_serializing_if = "Option::is_none")]
  pub attribute: Option<String>,

  /// Candidates whose text does not match are skipped.
  #[serde(
    default,
    rename = "requiretext",
    with = "pattern::optional",
    skip_serializing_if = "Option::is_none"
  )]
  pub require_text: Option<Regex>,

  /// Candidates whose text matches are skipped.
  #[serde(
    default,
    rename = "skiptext",
    with = "pattern::optional",
    skip_serializing_if = "Option::is_none"
  )]
  pub skip_text: Option<Regex>,

  /// The rule only applies to files whose path matches.
  #[serde(
    default,
    rename = "matchpath",
    with = "pattern::optional",
    skip_serializing_if = "Option::is_none"
  )]
  pub match_path: Option<Regex>,

  /// Section-level TOC entry rather than a child entry.
  #[serde(default)]
  pub toc_root: bool,

  /// Selector whose text, when it differs from the entry's own text, is
  /// prepended to the entry name as `"<prefix>."`.
  #[serde(
    default,
    rename = "css_selector_for_search_prefix",
    skip_serializing_if = "Option::is_none"
  )]
  pub prefix_selector: Option<CssSelector>,
}

impl MatchRule {
  /// A rule with only a selector and an entry type.
  #[must_use]
  pub fn new(selector: CssSelector, entry_type: impl Into<String>) -> Self {
    Self {
      selector,
      entry_type: entry_type.into(),
      attribute: None,
      require_text: None,
      skip_text: None,
      match_path: None,
      toc_root: false,
      prefix_selector: None,
    }
  }

  /// Whether the rule applies to the page at `path`.
  #[must_use]
  pub fn applies_to(&self, path: &str) -> bool {
    self.match_path.as_ref().is_none_or(|re| re.is_match(path))
  }

  /// Applies the require/skip text filters, logging rejected candidates.
  fn accepts_text(&self, text: &str) -> bool {
    if let Some(ref re) = self.require_text
      && !re.is_match(text)
    {
      info!(
        "Skipping entry for '{text}' (Text not matching given regexp '{re}')"
      );
      return false;
    }

    if let Some(ref re) = self.skip_text
      && re.is_match(text)
    {
      info!("Skipping entry for '{text}' (Text matches skip regexp '{re}')");
      return false;
    }

    true
  }

  /// The raw entry name: the configured attribute's value, or the text.
  fn entry_name(&self, node: &NodeRef, text: &str) -> String {
    match self.attribute.as_deref().filter(|attr| !attr.is_empty()) {
      Some(attr) => text::attribute(node, attr).unwrap_or_default(),
      None => text.to_string(),
    }
  }

  /// The `"<prefix>."` to put in front of the entry name, if any.
  fn name_prefix(&self, document: &NodeRef, text: &str) -> String {
    let Some(ref selector) = self.prefix_selector else {
      return String::new();
    };

    match selector.first_match(document) {
      Some(node) => {
        let prefix = text::text(&node);
        // A prefix equal to the entry itself would give "Name.Name"
        if prefix == text {
          String::new()
        } else {
          format!("{prefix}.")
        }
      },
      None => {
        debug!("Prefix selector '{selector}' matched nothing");
        String::new()
      },
    }
  }
}

/// An extracted, indexable entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
  /// Selector of the rule that produced the entry, for diagnostics.
  pub selector:         String,
  /// Prefixed entry name.
  pub name:             String,
  pub entry_type:       String,
  /// Page path followed by the in-page fragment.
  pub href:             String,
  /// Title of the page the entry was found on.
  pub menu_description: String,
}

/// Per-page inputs to extraction.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
  /// Path of the page as it appears in hrefs.
  pub path:  &'a str,
  /// Extracted page title, empty when none.
  pub title: &'a str,
}

impl PageContext<'_> {
  /// Whether the page continues a previous one and must not add index
  /// entries.
  #[must_use]
  pub fn is_continuation(&self) -> bool {
    self.path.ends_with(CONTINUATION_SUFFIX)
  }
}

/// Primary rules plus the backup rules used when the primary ones find
/// nothing on a page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
  #[serde(default, rename = "selectors")]
  pub primary: Vec<MatchRule>,

  #[serde(default, rename = "backup_selectors")]
  pub backup: Vec<MatchRule>,
}

impl RuleSet {
  #[must_use]
  pub const fn new(primary: Vec<MatchRule>, backup: Vec<MatchRule>) -> Self {
    Self { primary, backup }
  }

  /// Extracts the references of one page, injecting TOC anchors for every
  /// accepted match.
  ///
  /// The backup rules run only when the primary rules produced no reference,
  /// so the result always comes from exactly one of the two lists. References
  /// are in document order, then rule order for a node matched by several
  /// rules.
  pub fn extract(
    &self,
    document: &NodeRef,
    page: &PageContext<'_>,
    anchors: &mut AnchorCounter,
  ) -> Vec<Reference> {
    let references = find_references(document, &self.primary, page, anchors);
    if !references.is_empty() || self.backup.is_empty() {
      return references;
    }

    debug!("No primary matches in {}, trying backup selectors", page.path);
    find_references(document, &self.backup, page, anchors)
  }
}

/// In-page fragment for an entry: the node's own `#...` href, or its id.
fn fragment(node: &NodeRef) -> String {
  match text::attribute(node, "href") {
    Some(href) if href.starts_with('#') => href,
    _ => format!("#{}", text::attribute(node, "id").unwrap_or_default()),
  }
}

fn find_references(
  document: &NodeRef,
  rules: &[MatchRule],
  page: &PageContext<'_>,
  anchors: &mut AnchorCounter,
) -> Vec<Reference> {
  let rules: Vec<&MatchRule> =
    rules.iter().filter(|rule| rule.applies_to(page.path)).collect();
  if rules.is_empty() {
    return Vec::new();
  }

  let head = mutate::head(document);
  // Anchors injected below must never become candidates themselves
  let candidates: Vec<NodeRef> = document.descendants().collect();
  let mut references = Vec::new();

  for node in &candidates {
    for rule in &rules {
      if !rule.selector.matches(node) {
        continue;
      }

      let text = text::text(node);
      if !rule.accepts_text(&text) {
        continue;
      }

      let name = rule.entry_name(node, &text);
      let prefix = rule.name_prefix(document, &text);

      if !page.is_continuation() {
        let reference = Reference {
          selector:         rule.selector.to_string(),
          name:             format!("{prefix}{name}"),
          entry_type:       rule.entry_type.clone(),
          href:             format!("{}{}", page.path, fragment(node)),
          menu_description: page.title.to_string(),
        };
        debug!(
          "Match({}): '{}' is type {} at {}",
          reference.selector,
          reference.name,
          reference.entry_type,
          reference.href
        );
        references.push(reference);
      }

      let target = anchor::toc_target(
        anchors.next_id(),
        &rule.entry_type,
        &name,
        rule.toc_root,
      );
      anchor::inject(node, head.as_ref(), &target);
    }
  }

  references
}
