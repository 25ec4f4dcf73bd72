//! Whole-document rewrites that run before entry extraction.

use kuchikikiki::NodeRef;
use log::{debug, warn};
use markup5ever::{LocalName, QualName, local_name, ns};

use crate::selector::Selector;

/// Inline style added to the element promoted to page body.
pub const MAX_WIDTH_STYLE: &str = "max-width: 100%;";

fn first_element_named(document: &NodeRef, local: &LocalName) -> Option<NodeRef> {
  document
    .descendants()
    .find(|node| node.as_element().is_some_and(|el| el.name.local == *local))
}

/// The document's `<head>`, if it has one.
#[must_use]
pub fn head(document: &NodeRef) -> Option<NodeRef> {
  first_element_named(document, &local_name!("head"))
}

/// The document's `<body>`, if it has one.
#[must_use]
pub fn body(document: &NodeRef) -> Option<NodeRef> {
  first_element_named(document, &local_name!("body"))
}

/// Detaches every node matched by any of `selectors`.
///
/// Returns the number of detached subtrees. Matches nested inside an already
/// detached subtree are counted too.
pub fn remove_elements<S: Selector>(
  document: &NodeRef,
  selectors: &[S],
  path: &str,
) -> usize {
  let mut removed = 0;
  for selector in selectors {
    let matches = selector.all_matches(document);
    if matches.is_empty() {
      debug!("Removal selector '{selector}' matched nothing in {path}");
      continue;
    }
    for node in matches {
      node.detach();
      removed += 1;
    }
  }
  removed
}

/// Replaces the document body with the first node matched by `selector`.
///
/// The matched node is detached, given a `max-width` inline style, and
/// wrapped in a fresh `<body>` that copies the original body's attributes.
/// Returns `false`, after logging, when nothing matches or the match cannot be
/// moved under a new body.
pub fn replace_body(
  document: &NodeRef,
  selector: &dyn Selector,
  path: &str,
) -> bool {
  let Some(content) = selector.first_match(document) else {
    warn!("No body found matching '{selector}' in {path}");
    return false;
  };

  let Some(old_body) = body(document) else {
    warn!("Document {path} has no <body> to replace");
    return false;
  };

  if content.inclusive_descendants().any(|node| node == old_body) {
    warn!(
      "Body selector '{selector}' in {path} matched the body or one of its \
       ancestors, keeping the original body"
    );
    return false;
  }

  content.detach();
  add_max_width(&content);

  let attributes = old_body
    .as_element()
    .map(|el| el.attributes.borrow().map.clone())
    .unwrap_or_default();
  let new_body = NodeRef::new_element(
    QualName::new(None, ns!(html), local_name!("body")),
    attributes,
  );
  new_body.append(content);

  old_body.insert_before(new_body);
  old_body.detach();
  true
}

fn add_max_width(node: &NodeRef) {
  let Some(element) = node.as_element() else {
    return;
  };
  let mut attributes = element.attributes.borrow_mut();
  let style = match attributes.get("style").map(str::trim) {
    Some(existing) if !existing.is_empty() => {
      if existing.ends_with(';') {
        format!("{existing} {MAX_WIDTH_STYLE}")
      } else {
        format!("{existing}; {MAX_WIDTH_STYLE}")
      }
    },
    _ => MAX_WIDTH_STYLE.to_string(),
  };
  attributes.insert("style", style);
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use tendril::TendrilSink;

  use super::*;
  use crate::selector::CssSelector;

  fn render(doc: &NodeRef) -> String {
    let mut out = Vec::new();
    doc.serialize(&mut out).unwrap();
    String::from_utf8(out).unwrap()
  }

  #[test]
  fn test_remove_elements_detaches_all_matches() {
    let doc = kuchikikiki::parse_html().one(
      r#"<body><div class="ad">buy<span class="ad">now</span></div><p>keep</p><div class="ad">x</div></body>"#,
    );
    let selectors = vec![CssSelector::parse(".ad").unwrap()];

    let removed = remove_elements(&doc, &selectors, "page.html");

    assert_eq!(removed, 3);
    let html = render(&doc);
    assert!(!html.contains(r#"class="ad""#));
    assert!(!html.contains("buy"));
    assert!(html.contains("<p>keep</p>"));
  }

  #[test]
  fn test_remove_elements_tolerates_no_match() {
    let doc = kuchikikiki::parse_html().one("<p>text</p>");
    let selectors = vec![CssSelector::parse("nav").unwrap()];
    assert_eq!(remove_elements(&doc, &selectors, "page.html"), 0);
  }

  #[test]
  fn test_replace_body_keeps_body_attributes() {
    let doc = kuchikikiki::parse_html().one(
      r#"<html><head></head><body class="theme" data-x="1"><nav>menu</nav><main id="content"><p>hi</p></main></body></html>"#,
    );
    let selector = CssSelector::parse("#content").unwrap();

    assert!(replace_body(&doc, &selector, "page.html"));

    let html = render(&doc);
    assert!(!html.contains("menu"));
    assert!(html.contains(r#"<main id="content" style="max-width: 100%;"><p>hi</p></main>"#));
    let new_body = body(&doc).unwrap();
    let attrs = new_body.as_element().unwrap().attributes.borrow();
    assert_eq!(attrs.get("class"), Some("theme"));
    assert_eq!(attrs.get("data-x"), Some("1"));
    assert_eq!(doc.select("body").unwrap().count(), 1);
  }

  #[test]
  fn test_replace_body_appends_to_existing_style() {
    let doc = kuchikikiki::parse_html()
      .one(r#"<body><div id="c" style="color: red">x</div></body>"#);
    let selector = CssSelector::parse("#c").unwrap();

    assert!(replace_body(&doc, &selector, "page.html"));

    let div = doc.select_first("#c").unwrap();
    let attrs = div.attributes.borrow();
    assert_eq!(attrs.get("style"), Some("color: red; max-width: 100%;"));
  }

  #[test]
  fn test_replace_body_without_match_is_a_no_op() {
    let source = "<html><head></head><body><p>x</p></body></html>";
    let doc = kuchikikiki::parse_html().one(source);
    let before = render(&doc);
    let selector = CssSelector::parse("#missing").unwrap();

    assert!(!replace_body(&doc, &selector, "page.html"));
    assert_eq!(render(&doc), before);
  }

  #[test]
  fn test_replace_body_refuses_to_move_the_body_itself() {
    let doc = kuchikikiki::parse_html().one("<body><p>x</p></body>");
    let selector = CssSelector::parse("html").unwrap();
    assert!(!replace_body(&doc, &selector, "page.html"));
    assert!(body(&doc).is_some());
  }
}
