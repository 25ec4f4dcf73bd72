use std::{
  fs,
  path::{Component, Path, PathBuf},
  sync::OnceLock,
};

use dashing_html::{PageRules, pattern};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File names probed, in order, when no configuration file is given. Files
/// with these names are never copied into a docset.
pub const CONFIG_FILE_NAMES: &[&str] = &[
  "dashing.toml",
  "dashing.json",
  "dashing.yaml",
  "dashing.yml",
];

/// Path components that mark version control metadata.
const VCS_DIRS: &[&str] = &[".git", ".svn"];

/// Configuration for building a docset.
///
/// [`Config`] names the docset, points at the documentation tree and carries
/// the [`PageRules`] that drive entry extraction. It is loaded from a TOML,
/// JSON or YAML file; selectors and regexps are compiled while loading, so a
/// loaded config is always usable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Human-oriented name of the docset.
  #[serde(skip_serializing_if = "String::is_empty")]
  pub name: String,

  /// Machine name of the docset, one word.
  pub package: String,

  /// Index page, relative to the documents root.
  pub index: String,

  /// Extraction, removal, body and title rules.
  #[serde(flatten)]
  pub page: PageRules,

  /// Walked paths matching any of these are skipped.
  #[serde(with = "pattern::list", skip_serializing_if = "Vec::is_empty")]
  pub ignore_path_regexes: Vec<Regex>,

  /// Directory to walk for documentation files.
  pub walk_root: PathBuf,

  /// A 32x32 PNG image used as the docset icon.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub icon32x32: Option<PathBuf>,

  /// Whether viewers may run the pages' JavaScript.
  #[serde(alias = "allowJS")]
  pub allow_js: bool,

  /// Online location of the documentation.
  #[serde(alias = "externalURL", skip_serializing_if = "Option::is_none")]
  pub external_url: Option<String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      name:                String::new(),
      package:             String::new(),
      index:               String::new(),
      page:                PageRules::default(),
      ignore_path_regexes: Vec::new(),
      walk_root:           PathBuf::from("."),
      icon32x32:           None,
      allow_js:            false,
      external_url:        None,
    }
  }
}

impl Config {
  /// Load configuration from a file, picking the format by extension.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to read config file: {}: {}",
        path.display(),
        e
      ))
    })?;

    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
      return Err(ConfigError::Config(format!(
        "Config file has no extension: {}",
        path.display()
      )));
    };

    let parsed: Result<Self, ConfigError> = match ext.to_lowercase().as_str() {
      "json" => serde_json::from_str(&content).map_err(ConfigError::from),
      "toml" => toml::from_str(&content).map_err(ConfigError::from),
      "yaml" | "yml" => serde_yaml::from_str(&content).map_err(ConfigError::from),
      _ => {
        return Err(ConfigError::Config(format!(
          "Unsupported config file format: {}",
          path.display()
        )));
      },
    };

    parsed.map_err(|e| {
      ConfigError::Config(format!(
        "Failed to parse {} config from {}: {}",
        ext.to_uppercase(),
        path.display(),
        e
      ))
    })
  }

  /// Load configuration from the given files, or from a discovered one.
  ///
  /// Several files are merged in order, later files taking precedence. The
  /// result is validated before it is returned.
  ///
  /// # Errors
  ///
  /// Returns an error if no configuration can be found, a file fails to load,
  /// or the merged configuration is invalid.
  pub fn load(config_files: &[PathBuf]) -> Result<Self, ConfigError> {
    let config = if let Some((first, rest)) = config_files.split_first() {
      let mut merged = Self::from_file(first)?;
      for path in rest {
        merged.merge(Self::from_file(path)?);
      }

      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }

      merged
    } else if let Some(discovered) = Self::find_config_file() {
      log::info!("Using discovered config file: {}", discovered.display());
      Self::from_file(&discovered)?
    } else {
      return Err(ConfigError::Config(format!(
        "No configuration file found (looked for {}). Run `dashing init` to \
         create one.",
        CONFIG_FILE_NAMES.join(", ")
      )));
    };

    config.validate()?;
    Ok(config)
  }

  /// Merge another config into this one, with the other config's values taking
  /// precedence.
  ///
  /// Non-empty strings and [`Some`] values replace, lists are appended, and
  /// `walk_root` replaces unless it is the default. `allow_js` is enabled if
  /// either side enables it.
  pub fn merge(&mut self, other: Self) {
    fn replace_if_set(target: &mut String, value: String) {
      if !value.is_empty() {
        *target = value;
      }
    }

    replace_if_set(&mut self.name, other.name);
    replace_if_set(&mut self.package, other.package);
    replace_if_set(&mut self.index, other.index);

    let page = other.page;
    self.page.rule_set.primary.extend(page.rule_set.primary);
    self.page.rule_set.backup.extend(page.rule_set.backup);
    self.page.remove_elements.extend(page.remove_elements);
    if page.css_selector_for_body.is_some() {
      self.page.css_selector_for_body = page.css_selector_for_body;
    }
    if page.css_selector_for_title.is_some() {
      self.page.css_selector_for_title = page.css_selector_for_title;
    }

    self.ignore_path_regexes.extend(other.ignore_path_regexes);
    if other.walk_root != Path::new(".") {
      self.walk_root = other.walk_root;
    }
    if other.icon32x32.is_some() {
      self.icon32x32 = other.icon32x32;
    }
    self.allow_js |= other.allow_js;
    if other.external_url.is_some() {
      self.external_url = other.external_url;
    }
  }

  /// Search the current directory for a configuration file.
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    static RESULT: OnceLock<Option<PathBuf>> = OnceLock::new();
    RESULT
      .get_or_init(|| {
        let current_dir = std::env::current_dir().ok()?;
        CONFIG_FILE_NAMES
          .iter()
          .map(|filename| current_dir.join(filename))
          .find(|path| path.is_file())
      })
      .clone()
  }

  /// Check the settings a build cannot do without.
  ///
  /// # Errors
  ///
  /// Returns an error listing every problem found.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if self.package.trim().is_empty() {
      errors.push("`package` must be set".to_string());
    }

    if !self.walk_root.exists() {
      errors.push(format!(
        "Walk root does not exist: {}",
        self.walk_root.display()
      ));
    } else if !self.walk_root.is_dir() {
      errors.push(format!(
        "Walk root is not a directory: {}",
        self.walk_root.display()
      ));
    }

    if self.index.is_empty() {
      log::warn!("No `index` configured; the docset will have no start page");
    }

    if self.page.rule_set.primary.is_empty() && self.page.rule_set.backup.is_empty()
    {
      log::warn!("No selectors configured; the index will be empty");
    }

    if let Some(ref icon) = self.icon32x32
      && !icon.is_file()
    {
      log::warn!("Icon file does not exist: {}", icon.display());
    }

    if !errors.is_empty() {
      let error_message = errors.join("\n");
      return Err(ConfigError::Config(format!(
        "Configuration validation errors:\n{error_message}"
      )));
    }

    Ok(())
  }

  /// Display name of the docset: `name`, or the upper-cased package.
  #[must_use]
  pub fn fancy_name(&self) -> String {
    if self.name.is_empty() {
      self.package.to_uppercase()
    } else {
      self.name.clone()
    }
  }

  /// Default output location, `<package>.docset`.
  #[must_use]
  pub fn default_output_dir(&self) -> PathBuf {
    PathBuf::from(format!("{}.docset", self.package))
  }

  /// Whether a walked path must be left out of the docset.
  ///
  /// Configuration files, paths matched by an ignore regexp and anything
  /// inside a version control directory are ignored.
  #[must_use]
  pub fn should_ignore(&self, path: &Path) -> bool {
    if path
      .file_name()
      .and_then(|name| name.to_str())
      .is_some_and(|name| CONFIG_FILE_NAMES.contains(&name))
    {
      return true;
    }

    let path_str = path.to_string_lossy();
    if let Some(re) = self
      .ignore_path_regexes
      .iter()
      .find(|re| re.is_match(&path_str))
    {
      log::debug!("Ignoring {path_str} (matches '{re}')");
      return true;
    }

    path.components().any(|component| {
      matches!(component, Component::Normal(part)
        if part.to_str().is_some_and(|part| VCS_DIRS.contains(&part)))
    })
  }

  /// Write a default configuration file in `format`.
  ///
  /// Refuses to replace an existing file unless `force` is set.
  ///
  /// # Errors
  ///
  /// Returns an error if the format has no template, the file exists and
  /// `force` is not set, or the file cannot be written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
    force: bool,
  ) -> Result<(), ConfigError> {
    let config_content = crate::templates::get_template(format)
      .map_err(|e| ConfigError::Template(e.to_string()))?;

    if path.exists() && !force {
      return Err(ConfigError::Config(format!(
        "File {} already exists. Use --force to overwrite.",
        path.display()
      )));
    }

    fs::write(path, config_content).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to write default config to {}: {}",
        path.display(),
        e
      ))
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  #![allow(
    clippy::unwrap_used,
    clippy::field_reassign_with_default,
    reason = "Fine in tests"
  )]

  use dashing_html::{CssSelector, MatchRule};
  use tempfile::TempDir;

  use super::*;
  use crate::templates;

  fn rule(css: &str, entry_type: &str) -> MatchRule {
    MatchRule::new(CssSelector::parse(css).unwrap(), entry_type)
  }

  #[test]
  fn test_default_walk_root_is_current_dir() {
    let config: Config = toml::from_str("package = \"x\"").unwrap();
    assert_eq!(config.walk_root, PathBuf::from("."));
    assert!(!config.allow_js);
    assert!(config.page.rule_set.primary.is_empty());
  }

  #[test]
  fn test_yaml_aliases() {
    let config: Config = serde_yaml::from_str(
      "package: x\nallowJS: true\nexternalURL: https://example.com/\n",
    )
    .unwrap();
    assert!(config.allow_js);
    assert_eq!(config.external_url.as_deref(), Some("https://example.com/"));
  }

  #[test]
  fn test_flattened_rules_from_toml() {
    let config: Config = toml::from_str(
      r#"
package = "x"
remove_elements = [".ad"]
css_selector_for_title = "h1"

[[selectors]]
css = "dt"
type = "Function"
matchpath = "^api/"
"#,
    )
    .unwrap();

    assert_eq!(config.page.rule_set.primary.len(), 1);
    assert!(config.page.rule_set.primary[0].applies_to("api/x.html"));
    assert!(!config.page.rule_set.primary[0].applies_to("guide/x.html"));
    assert_eq!(config.page.remove_elements[0].as_str(), ".ad");
  }

  #[test]
  fn test_invalid_regex_is_rejected() {
    let result: Result<Config, _> =
      toml::from_str("package = \"x\"\nignore_path_regexes = [\"(\"]");
    assert!(result.is_err());
  }

  #[test]
  fn test_fancy_name_falls_back_to_package() {
    let mut config = Config::default();
    config.package = "tokio".to_string();
    assert_eq!(config.fancy_name(), "TOKIO");

    config.name = "Tokio".to_string();
    assert_eq!(config.fancy_name(), "Tokio");
    assert_eq!(config.default_output_dir(), PathBuf::from("tokio.docset"));
  }

  #[test]
  fn test_should_ignore() {
    let mut config = Config::default();
    config.ignore_path_regexes = vec![Regex::new(r"\.min\.js$").unwrap()];

    assert!(config.should_ignore(Path::new("dashing.json")));
    assert!(config.should_ignore(Path::new("docs/dashing.yaml")));
    assert!(config.should_ignore(Path::new("js/app.min.js")));
    assert!(config.should_ignore(Path::new(".git/HEAD")));
    assert!(config.should_ignore(Path::new("vendor/.svn/entries")));
    assert!(!config.should_ignore(Path::new("js/app.js")));
    assert!(!config.should_ignore(Path::new(".github/readme.html")));
  }

  #[test]
  fn test_merge() {
    let mut base = Config::default();
    base.package = "base".to_string();
    base.index = "index.html".to_string();
    base.page.rule_set.primary = vec![rule("h1", "Guide")];

    let mut other = Config::default();
    other.name = "Other".to_string();
    other.page.rule_set.primary = vec![rule("h2", "Section")];
    other.allow_js = true;

    base.merge(other);

    assert_eq!(base.package, "base");
    assert_eq!(base.name, "Other");
    assert_eq!(base.index, "index.html");
    assert_eq!(base.page.rule_set.primary.len(), 2);
    assert_eq!(base.walk_root, PathBuf::from("."));
    assert!(base.allow_js);
  }

  #[test]
  fn test_validate_requires_package() {
    let config = Config::default();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("`package` must be set"));
  }

  #[test]
  fn test_validate_requires_existing_walk_root() {
    let mut config = Config::default();
    config.package = "x".to_string();
    config.walk_root = PathBuf::from("/definitely/not/a/real/dir");
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("Walk root does not exist"));
  }

  #[test]
  fn test_default_templates_parse() {
    let from_toml: Config = toml::from_str(templates::DEFAULT_TOML_TEMPLATE).unwrap();
    let from_json: Config =
      serde_json::from_str(templates::DEFAULT_JSON_TEMPLATE).unwrap();
    let from_yaml: Config =
      serde_yaml::from_str(templates::DEFAULT_YAML_TEMPLATE).unwrap();

    for config in [&from_toml, &from_json, &from_yaml] {
      assert_eq!(config.package, "dashing");
      assert_eq!(config.page.rule_set.primary.len(), 2);
      assert_eq!(config.page.rule_set.backup.len(), 1);
      assert!(config.page.rule_set.primary[0].toc_root);
    }
  }

  #[test]
  fn test_unsupported_template_format() {
    assert!(templates::get_template("ini").is_err());
    assert!(templates::get_template("YML").is_ok());
  }

  #[test]
  fn test_from_file_picks_parser_by_extension() {
    let temp_dir = TempDir::new().unwrap();
    let sources = [
      (
        "docs.toml",
        "package = \"pkg\"\n\n[[selectors]]\ncss = \"h2\"\ntype = \"Section\"\n",
      ),
      (
        "docs.json",
        r#"{ "package": "pkg", "selectors": [{ "css": "h2", "type": "Section" }] }"#,
      ),
      ("docs.yaml", "package: pkg\nselectors:\n  - css: h2\n    type: Section\n"),
      ("docs.YML", "package: pkg\nselectors:\n  - css: h2\n    type: Section\n"),
    ];

    for (file_name, content) in sources {
      let path = temp_dir.path().join(file_name);
      fs::write(&path, content).unwrap();

      let config = Config::from_file(&path).unwrap();
      assert_eq!(config.package, "pkg", "{file_name}");
      assert_eq!(config.page.rule_set.primary[0].entry_type, "Section");
    }
  }

  #[test]
  fn test_from_file_rejects_unknown_or_missing_extension() {
    let temp_dir = TempDir::new().unwrap();

    let ini = temp_dir.path().join("dashing.ini");
    fs::write(&ini, "package = pkg").unwrap();
    let err = Config::from_file(&ini).unwrap_err();
    assert!(err.to_string().contains("Unsupported config file format"));

    let bare = temp_dir.path().join("dashing");
    fs::write(&bare, "package = \"pkg\"").unwrap();
    let err = Config::from_file(&bare).unwrap_err();
    assert!(err.to_string().contains("has no extension"));
  }

  #[test]
  fn test_from_file_reports_read_and_parse_failures() {
    let temp_dir = TempDir::new().unwrap();

    let missing = temp_dir.path().join("missing.toml");
    let err = Config::from_file(&missing).unwrap_err();
    assert!(matches!(err, ConfigError::Config(_)));
    assert!(err.to_string().contains("missing.toml"));

    let broken = temp_dir.path().join("broken.json");
    fs::write(&broken, "{ \"package\": ").unwrap();
    let err = Config::from_file(&broken).unwrap_err();
    assert!(err.to_string().contains("Failed to parse JSON config"));
  }

  #[test]
  fn test_load_merges_files_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().join("base.toml");
    fs::write(
      &base,
      format!(
        "package = \"base\"\nindex = \"index.html\"\nwalk_root = '{}'\n\n\
         [[selectors]]\ncss = \"h1\"\ntype = \"Guide\"\n",
        temp_dir.path().display()
      ),
    )
    .unwrap();
    let overlay = temp_dir.path().join("overlay.yaml");
    fs::write(
      &overlay,
      "package: overlay\nallowJS: true\nselectors:\n  - css: h2\n    type: \
       Section\n",
    )
    .unwrap();

    let config = Config::load(&[base.clone(), overlay.clone()]).unwrap();

    assert_eq!(config.package, "overlay");
    assert_eq!(config.index, "index.html");
    assert_eq!(config.walk_root, temp_dir.path());
    assert!(config.allow_js);
    let types: Vec<_> = config
      .page
      .rule_set
      .primary
      .iter()
      .map(|rule| rule.entry_type.as_str())
      .collect();
    assert_eq!(types, ["Guide", "Section"]);

    let reversed = Config::load(&[overlay, base]).unwrap();
    assert_eq!(reversed.package, "base");
  }

  #[test]
  fn test_load_validates_merged_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("dashing.toml");
    fs::write(&path, "walk_root = '/definitely/not/a/real/dir'").unwrap();

    let err = Config::load(&[path]).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("`package` must be set"));
    assert!(message.contains("Walk root does not exist"));
  }

  #[test]
  fn test_generate_default_config_respects_force() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("dashing.yaml");

    Config::generate_default_config("yaml", &path, false).unwrap();
    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.package, "dashing");

    fs::write(&path, "package: edited\n").unwrap();
    let err = Config::generate_default_config("yaml", &path, false).unwrap_err();
    assert!(err.to_string().contains("already exists"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "package: edited\n");

    Config::generate_default_config("yaml", &path, true).unwrap();
    assert_eq!(
      fs::read_to_string(&path).unwrap(),
      templates::DEFAULT_YAML_TEMPLATE
    );
  }

  #[test]
  fn test_generate_default_config_rejects_unknown_format() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("dashing.ini");

    let err = Config::generate_default_config("ini", &path, false).unwrap_err();
    assert!(matches!(err, ConfigError::Template(_)));
    assert!(!path.exists());
  }
}
