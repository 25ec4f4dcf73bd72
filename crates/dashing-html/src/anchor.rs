//! Table-of-contents anchors.
//!
//! Every matched entry gets an empty `<a class="dashAnchor" name="...">` right
//! before it and a `<link href="...">` in the document head. Both carry the
//! same target string, `//ref_<n>/<type>/<name>/<level>`, which downstream
//! viewers parse to build their navigation.

use kuchikikiki::{Attribute, ExpandedName, NodeRef};
use log::debug;
use markup5ever::{LocalName, QualName, local_name, ns};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Class carried by every injected anchor element.
pub const ANCHOR_CLASS: &str = "dashAnchor";

/// Bytes left untouched when encoding entry names. Everything else,
/// including space and `+`, becomes `%XX`.
const NAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
  .remove(b'-')
  .remove(b'_')
  .remove(b'.')
  .remove(b'~');

/// Run-scoped source of anchor ids.
///
/// One counter is shared by every page of a run so that no two anchors carry
/// the same numeric suffix. It is passed explicitly to whoever injects
/// anchors; parallel processing would need one counter per worker with
/// disjoint ranges.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AnchorCounter {
  next: u64,
}

impl AnchorCounter {
  #[must_use]
  pub const fn new() -> Self {
    Self { next: 0 }
  }

  /// A counter whose first id is `first`.
  #[must_use]
  pub const fn starting_at(first: u64) -> Self {
    Self { next: first }
  }

  /// Hands out the next id.
  pub const fn next_id(&mut self) -> u64 {
    let id = self.next;
    self.next += 1;
    id
  }

  /// Number of ids handed out so far, or the next id for a counter that
  /// started at zero.
  #[must_use]
  pub const fn peek(&self) -> u64 {
    self.next
  }
}

/// Percent-encodes an entry name for use inside a target string.
#[must_use]
pub fn encode_name(name: &str) -> String {
  utf8_percent_encode(name, NAME_ENCODE_SET).to_string()
}

/// Builds the target string shared by an anchor and its head link.
///
/// `root` marks section-level entries (level `1`); everything else is a
/// child entry (level `0`).
#[must_use]
pub fn toc_target(id: u64, entry_type: &str, name: &str, root: bool) -> String {
  let level = u8::from(root);
  format!("//ref_{id}/{entry_type}/{}/{level}", encode_name(name))
}

fn html_element(local: LocalName, attributes: Vec<(&str, String)>) -> NodeRef {
  NodeRef::new_element(
    QualName::new(None, ns!(html), local),
    attributes.into_iter().map(|(name, value)| {
      (ExpandedName::new("", name), Attribute {
        prefix: None,
        value,
      })
    }),
  )
}

/// The empty inline anchor placed before a matched node.
#[must_use]
pub fn anchor_node(target: &str) -> NodeRef {
  html_element(local_name!("a"), vec![
    ("class", ANCHOR_CLASS.to_string()),
    ("name", target.to_string()),
  ])
}

/// The empty head element pointing at an anchor.
#[must_use]
pub fn link_node(target: &str) -> NodeRef {
  html_element(local_name!("link"), vec![("href", target.to_string())])
}

/// Splices an anchor in front of `node` and, when the document has a head,
/// appends the matching link to it.
pub fn inject(node: &NodeRef, head: Option<&NodeRef>, target: &str) {
  node.insert_before(anchor_node(target));
  match head {
    Some(head) => head.append(link_node(target)),
    None => debug!("No <head> to receive TOC link {target}"),
  }
}
