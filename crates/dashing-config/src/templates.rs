use std::fmt;

/// Error type for template lookups.
#[derive(Debug)]
pub enum TemplateError {
  /// The requested configuration format has no template.
  UnsupportedFormat(String),
}

impl fmt::Display for TemplateError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::UnsupportedFormat(format) => {
        write!(f, "Unsupported config format: {format}")
      },
    }
  }
}

impl std::error::Error for TemplateError {}

/// Default configuration in TOML, commented so that a first-time user can
/// adapt it without reading any documentation.
pub const DEFAULT_TOML_TEMPLATE: &str = r#"# dashing configuration file

# Human-oriented name of the docset (defaults to the upper-cased package)
name = "Dashing"

# Machine name, used as bundle identifier and for the default output
# directory (<package>.docset)
package = "dashing"

# Index page, relative to the documents root
index = "index.html"

# Directory to walk for documentation files
walk_root = "."

# Paths matching any of these regexps are skipped entirely
# ignore_path_regexes = ["^build/", "\\.min\\.js$"]

# Elements matching any of these selectors are deleted from every page
# remove_elements = [".ad", "nav.sidebar"]

# The first element matching this selector becomes the whole page body
# css_selector_for_body = "main"

# Text of the first element matching this selector becomes the menu
# description of every entry on the page
css_selector_for_title = "title"

# A 32x32 PNG copied to the bundle as icon.png
# icon32x32 = "icon.png"

# Whether the docset viewer may run JavaScript
allow_js = false

# Fallback URL for "Open Online Page"
# external_url = "https://example.com/docs/"

# Extraction rules. Every element matching `css` becomes an index entry of
# type `type`.
[[selectors]]
css = "h1"
type = "Guide"
toc_root = true

[[selectors]]
css = "h2"
type = "Section"
# Read the entry name from an attribute instead of the element text
# attr = "id"
# Only keep entries whose text matches
# requiretext = "^[A-Z]"
# Drop entries whose text matches
# skiptext = "^Example"
# Only apply the rule to matching file paths
# matchpath = "^guide/"
# Prepend the text of the first match of this selector, as "<prefix>."
# css_selector_for_search_prefix = "h1"

# Rules used for pages where none of the selectors above match
[[backup_selectors]]
css = "title"
type = "Guide"
"#;

/// Default configuration in JSON.
pub const DEFAULT_JSON_TEMPLATE: &str = r#"{
  "name": "Dashing",
  "package": "dashing",
  "index": "index.html",
  "walk_root": ".",
  "ignore_path_regexes": [],
  "remove_elements": [],
  "css_selector_for_title": "title",
  "allow_js": false,
  "selectors": [
    {
      "css": "h1",
      "type": "Guide",
      "toc_root": true
    },
    {
      "css": "h2",
      "type": "Section"
    }
  ],
  "backup_selectors": [
    {
      "css": "title",
      "type": "Guide"
    }
  ]
}
"#;

/// Default configuration in YAML.
pub const DEFAULT_YAML_TEMPLATE: &str = r#"# dashing configuration file
name: Dashing
package: dashing
index: index.html
walk_root: .
# ignore_path_regexes:
#   - "^build/"
# remove_elements:
#   - .ad
css_selector_for_title: title
allowJS: false
# externalURL: https://example.com/docs/
selectors:
  - css: h1
    type: Guide
    toc_root: true
  - css: h2
    type: Section
backup_selectors:
  - css: title
    type: Guide
"#;

/// Get the configuration template for `format`.
///
/// # Errors
///
/// Returns an error if the requested format is not supported.
pub fn get_template(format: &str) -> Result<&'static str, TemplateError> {
  match format.to_lowercase().as_str() {
    "toml" => Ok(DEFAULT_TOML_TEMPLATE),
    "json" => Ok(DEFAULT_JSON_TEMPLATE),
    "yaml" | "yml" => Ok(DEFAULT_YAML_TEMPLATE),
    _ => Err(TemplateError::UnsupportedFormat(format.to_string())),
  }
}
