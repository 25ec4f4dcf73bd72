//! Discovery of the local files a page links to.

use std::path::PathBuf;

use kuchikikiki::NodeRef;
use log::warn;
use percent_encoding::percent_decode_str;
use url::{ParseError, Url};

/// Why a link value could not be interpreted.
#[derive(Debug)]
enum LinkError {
  Url(ParseError),
  BadEscape,
  NotUtf8,
}

impl std::fmt::Display for LinkError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Url(e) => write!(f, "{e}"),
      Self::BadEscape => f.write_str("invalid percent escape"),
      Self::NotUtf8 => f.write_str("escaped path is not valid UTF-8"),
    }
  }
}

/// Collects the same-origin relative files referenced from `document`.
///
/// Every element with an `href` or `src` attribute contributes its first
/// such attribute. Values with a scheme or a host, and values that are only a
/// query or fragment, are not local files. The rest are resolved against the
/// directory of `page_path`. Malformed values are logged and skipped.
#[must_use]
pub fn used_files(document: &NodeRef, page_path: &str) -> Vec<PathBuf> {
  let page_dir = page_path.rsplit_once('/').map_or("", |(dir, _)| dir);
  let mut files = Vec::new();

  for node in document.descendants() {
    let Some(element) = node.as_element() else {
      continue;
    };
    let attributes = element.attributes.borrow();
    let Some(value) = attributes.map.iter().find_map(|(name, attr)| {
      matches!(&*name.local, "href" | "src").then_some(attr.value.as_str())
    }) else {
      continue;
    };

    match local_path(value) {
      Ok(Some(path)) => files.push(PathBuf::from(join_clean(page_dir, &path))),
      Ok(None) => {},
      Err(e) => warn!("{page_path}: Error parsing URL '{value}': {e}"),
    }
  }

  files
}

/// The decoded path of a relative reference, or [`None`] for anything that
/// does not point at a local file.
fn local_path(value: &str) -> Result<Option<String>, LinkError> {
  match Url::parse(value) {
    // Has a scheme
    Ok(_) => return Ok(None),
    Err(ParseError::RelativeUrlWithoutBase) => {},
    Err(e) => return Err(LinkError::Url(e)),
  }

  // Network-path reference, i.e. has a host
  if value.starts_with("//") {
    return Ok(None);
  }

  let end = value.find(['?', '#']).unwrap_or(value.len());
  let raw = &value[..end];
  if raw.is_empty() {
    return Ok(None);
  }

  if !has_valid_escapes(raw) {
    return Err(LinkError::BadEscape);
  }
  let decoded = percent_decode_str(raw)
    .decode_utf8()
    .map_err(|_| LinkError::NotUtf8)?;
  Ok(Some(decoded.into_owned()))
}

fn has_valid_escapes(raw: &str) -> bool {
  let bytes = raw.as_bytes();
  let mut i = 0;
  while i < bytes.len() {
    if bytes[i] == b'%' {
      let valid = bytes
        .get(i + 1..i + 3)
        .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
      if !valid {
        return false;
      }
      i += 3;
    } else {
      i += 1;
    }
  }
  true
}

/// Joins `rel` onto `dir` and lexically resolves `.` and `..` segments.
///
/// Leading `..` segments of a relative result are kept; `..` above the root
/// of an absolute path is dropped.
#[must_use]
pub fn join_clean(dir: &str, rel: &str) -> String {
  let rooted = if dir.is_empty() {
    rel.starts_with('/')
  } else {
    dir.starts_with('/')
  };

  let mut segments: Vec<&str> = Vec::new();
  for segment in dir.split('/').chain(rel.split('/')) {
    match segment {
      "" | "." => {},
      ".." => {
        if segments.last().is_some_and(|last| *last != "..") {
          segments.pop();
        } else if !rooted {
          segments.push("..");
        }
      },
      _ => segments.push(segment),
    }
  }

  let joined = segments.join("/");
  match (rooted, joined.is_empty()) {
    (true, _) => format!("/{joined}"),
    (false, true) => ".".to_string(),
    (false, false) => joined,
  }
}
