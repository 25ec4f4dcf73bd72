//! Docset build orchestration.

use std::path::Path;

use color_eyre::eyre::{Context, Result};
use dashing_config::Config;
use dashing_html::{PageProcessor, is_htmlish};
use dashing_utils::{
  DocsetWriter,
  IndexRecord,
  IndexSink,
  SqliteIndex,
  collect_files,
  output::{ICON_FILE, PLIST_FILE},
  plist,
};
use log::{debug, error, info, warn};

/// Counters reported at the end of a build.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
  /// Markup files processed.
  pub pages:      usize,
  /// Entries extracted across all pages.
  pub references: usize,
  /// Entries newly added to the index.
  pub indexed:    usize,
  /// Files copied into the documents tree.
  pub copied:     usize,
  /// Files that could not be processed or copied.
  pub failed:     usize,
}

/// Builds a complete docset for `config` at `output`.
///
/// # Errors
///
/// Returns an error if the bundle skeleton, its metadata or its index cannot
/// be created. Failures on individual files are logged and counted instead.
pub fn build(config: &Config, output: &Path) -> Result<BuildSummary> {
  info!(
    "Building {} from files in '{}'",
    config.package,
    config.walk_root.display()
  );

  let writer = DocsetWriter::create(output).wrap_err_with(|| {
    format!("Failed to create docset at {}", output.display())
  })?;

  let info_plist =
    plist::render_info_plist(config).wrap_err("Failed to render Info.plist")?;
  writer
    .write_file(PLIST_FILE, info_plist)
    .wrap_err("Failed to write Info.plist")?;

  if let Some(ref icon) = config.icon32x32
    && let Err(e) = writer.copy_file(icon, ICON_FILE)
  {
    warn!("Error copying icon: {e}");
  }

  let index_path = writer.index_path();
  let mut index = SqliteIndex::open(&index_path).wrap_err_with(|| {
    format!("Failed to create database at {}", index_path.display())
  })?;

  let summary = build_into(config, &writer, &mut index);
  index.finish().wrap_err("Failed to commit search index")?;

  info!(
    "Built {} with {} pages and {} index entries ({} files copied, {} failed)",
    output.display(),
    summary.pages,
    summary.indexed,
    summary.copied,
    summary.failed
  );
  Ok(summary)
}

/// Walks the documentation tree, writing pages and resources through `writer`
/// and entries into `index`.
///
/// Never fails as a whole: each file that cannot be handled is logged and
/// skipped.
pub fn build_into<I: IndexSink>(
  config: &Config,
  writer: &DocsetWriter,
  index: &mut I,
) -> BuildSummary {
  let mut processor = PageProcessor::new(&config.page);
  let mut summary = BuildSummary::default();

  for path in collect_files(config) {
    if is_htmlish(&path) {
      if let Err(e) =
        add_page(config, writer, index, &mut processor, &path, &mut summary)
      {
        error!("Error parsing {}: {e:#}", path.display());
        summary.failed += 1;
      }
    } else {
      copy_content(writer, &path, &mut summary);
    }
  }

  summary
}

fn add_page<I: IndexSink>(
  config: &Config,
  writer: &DocsetWriter,
  index: &mut I,
  processor: &mut PageProcessor<'_>,
  path: &Path,
  summary: &mut BuildSummary,
) -> Result<()> {
  let page = processor.process_file(path)?;
  summary.pages += 1;
  summary.references += page.references.len();

  for reference in &page.references {
    let record = IndexRecord::from_reference(reference);
    debug!("{}", record.path);
    if index
      .insert(&record)
      .wrap_err_with(|| format!("Failed to index '{}'", record.name))?
    {
      summary.indexed += 1;
    }
  }

  let html = page.render()?;
  writer
    .write_html(path, &html)
    .wrap_err_with(|| format!("Failed to write {}", path.display()))?;

  for used in &page.used_files {
    if !used.is_file() || config.should_ignore(used) {
      continue;
    }
    copy_content(writer, used, summary);
  }

  Ok(())
}

fn copy_content(writer: &DocsetWriter, path: &Path, summary: &mut BuildSummary) {
  match writer.add_content_file(path) {
    Ok(true) => summary.copied += 1,
    Ok(false) => {},
    Err(e) => {
      error!("Error copying {}: {e}", path.display());
      summary.failed += 1;
    },
  }
}
