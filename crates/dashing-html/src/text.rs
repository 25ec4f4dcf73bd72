use kuchikikiki::NodeRef;

/// Extracts the text under `node`, depth first, trimmed at both ends.
///
/// Only text nodes contribute; element children are descended into while
/// comments, doctypes and processing instructions are ignored. Whitespace
/// inside the text is left as the document has it.
#[must_use]
pub fn text(node: &NodeRef) -> String {
  let mut buf = String::new();
  collect_text(node, &mut buf);
  buf.trim().to_string()
}

fn collect_text(node: &NodeRef, buf: &mut String) {
  for child in node.children() {
    if let Some(contents) = child.as_text() {
      buf.push_str(&contents.borrow());
    } else if child.as_element().is_some() {
      collect_text(&child, buf);
    }
  }
}

/// Returns the value of attribute `name` on an element node.
///
/// Non-element nodes and missing attributes both yield [`None`].
#[must_use]
pub fn attribute(node: &NodeRef, name: &str) -> Option<String> {
  node
    .as_element()
    .and_then(|el| el.attributes.borrow().get(name).map(str::to_string))
}
