use std::path::{Component, Path, PathBuf};

use dashing_config::Config;
use log::{debug, warn};
use walkdir::WalkDir;

/// Drops `.` components, so `./docs/./a.html` becomes `docs/a.html`.
#[must_use]
pub fn clean_path(path: &Path) -> PathBuf {
  path
    .components()
    .filter(|component| !matches!(component, Component::CurDir))
    .collect()
}

/// Collects the files under the configured walk root, in file-name order,
/// leaving out everything [`Config::should_ignore`] rejects.
///
/// Unreadable entries are logged and skipped.
#[must_use]
pub fn collect_files(config: &Config) -> Vec<PathBuf> {
  let mut files = Vec::new();

  for entry in WalkDir::new(&config.walk_root)
    .follow_links(true)
    .sort_by_file_name()
  {
    let entry = match entry {
      Ok(entry) => entry,
      Err(e) => {
        warn!("Skipping unreadable entry: {e}");
        continue;
      },
    };
    if !entry.file_type().is_file() {
      continue;
    }

    let path = clean_path(entry.path());
    if config.should_ignore(&path) {
      debug!("Ignoring {}", path.display());
      continue;
    }
    files.push(path);
  }

  files
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use std::fs;

  use regex::Regex;
  use tempfile::TempDir;

  use super::*;

  #[test]
  fn test_clean_path() {
    assert_eq!(clean_path(Path::new("./docs/./a.html")), PathBuf::from("docs/a.html"));
    assert_eq!(clean_path(Path::new("a.html")), PathBuf::from("a.html"));
  }

  #[test]
  fn test_collect_files_sorted_and_filtered() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    for file in [
      "b.html",
      "a.html",
      "css/site.css",
      "dashing.toml",
      ".git/HEAD",
      "build/out.html",
    ] {
      let path = root.join(file);
      fs::create_dir_all(path.parent().unwrap()).unwrap();
      fs::write(path, "x").unwrap();
    }

    let config = Config {
      walk_root: root.to_path_buf(),
      ignore_path_regexes: vec![Regex::new("/build/").unwrap()],
      ..Config::default()
    };

    let files: Vec<_> = collect_files(&config)
      .into_iter()
      .map(|path| path.strip_prefix(root).unwrap().to_path_buf())
      .collect();

    assert_eq!(files, vec![
      PathBuf::from("a.html"),
      PathBuf::from("b.html"),
      PathBuf::from("css/site.css"),
    ]);
  }
}
