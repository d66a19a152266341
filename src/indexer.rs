use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::db;
use crate::parser::kind::{Classification, Classifier};
use crate::parser::{self, DocPage};

/// Everything the builder needs to know about one API subset's layout.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Rendered-page directory relative to the docset's Documents folder.
    pub relative_output: String,
    pub source_extension: String,
    pub rendered_extension: String,
    /// Entry names in the source folder that are never read as pages.
    pub excluded: Vec<String>,
    /// Abort on the first page with bad metadata instead of skipping it.
    pub strict: bool,
}

impl IndexOptions {
    pub fn rendered_path(&self, file_name: &str) -> String {
        let rendered = Path::new(file_name).with_extension(&self.rendered_extension);
        let rendered = rendered.to_string_lossy();
        let prefix = self.relative_output.trim_end_matches('/');
        if prefix.is_empty() {
            rendered.into_owned()
        } else {
            format!("{}/{}", prefix, rendered)
        }
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.excluded.iter().any(|e| e == name)
    }

    fn is_source_page(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext == self.source_extension.as_str())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPage {
    pub file: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct IndexReport {
    pub inserted: usize,
    pub duplicates: usize,
    /// Pages whose metadata could not be used.
    pub skipped: Vec<SkippedPage>,
    /// Pages indexed as `Unknown` because of their filename prefix.
    pub unknown: Vec<String>,
    /// Entries that are neither excluded nor source pages (subfolders, other files).
    pub ignored: Vec<String>,
}

impl IndexReport {
    pub fn print(&self) {
        println!(
            "Indexed {} entries ({} duplicates ignored, {} unknown kind, {} skipped).",
            self.inserted,
            self.duplicates,
            self.unknown.len(),
            self.skipped.len(),
        );
        for s in &self.skipped {
            println!("  skipped {}: {}", s.file, s.reason);
        }
    }
}

/// Clears the progress bar however the build loop exits.
struct ClearOnDrop(ProgressBar);

impl Drop for ClearOnDrop {
    fn drop(&mut self) {
        self.0.finish_and_clear();
    }
}

/// Rebuild the search index from every page in `source_dir`.
///
/// Schema reset and inserts share one transaction, so the index on disk is
/// either the previous one or the complete new one.
pub fn build_index(
    conn: &Connection,
    source_dir: &Path,
    options: &IndexOptions,
    classifier: &Classifier,
) -> Result<IndexReport> {
    let entries = list_entries(source_dir)?;
    info!("{} entries in {:?}", entries.len(), source_dir);

    let tx = conn.unchecked_transaction()?;
    db::reset_schema(&tx)?;

    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("#>-"),
    );
    let _clear = ClearOnDrop(pb.clone());

    let mut report = IndexReport::default();

    for path in entries {
        pb.inc(1);
        let file_name = match path.file_name() {
            Some(n) => n.to_string_lossy().into_owned(),
            None => continue,
        };

        if options.is_excluded(&file_name) {
            debug!("Excluded entry {}", file_name);
            continue;
        }
        if path.is_dir() || !options.is_source_page(&path) {
            debug!("Ignoring non-page entry {}", file_name);
            report.ignored.push(file_name);
            continue;
        }

        let raw_content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if options.strict => {
                return Err(e).with_context(|| format!("Failed to read {:?}", path));
            }
            Err(e) => {
                pb.suspend(|| warn!("Skipping unreadable {}: {}", file_name, e));
                report.skipped.push(SkippedPage {
                    file: file_name,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let page = DocPage {
            source_path: path,
            file_name,
            raw_content,
        };

        let processed = match parser::process_page(&page, classifier, |f| options.rendered_path(f)) {
            Ok(p) => p,
            Err(e) if options.strict => {
                return Err(e).with_context(|| format!("Bad metadata in {:?}", page.source_path));
            }
            Err(e) => {
                pb.suspend(|| warn!("Skipping {}: {}", page.file_name, e));
                report.skipped.push(SkippedPage {
                    file: page.file_name,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if let Classification::Unrecognized(token) = &processed.classification {
            pb.suspend(|| warn!("Unknown type prefix '{}' in {}", token, page.file_name));
            report.unknown.push(page.file_name.clone());
        }

        match db::insert_record(&tx, &processed.record)? {
            0 => report.duplicates += 1,
            n => report.inserted += n,
        }
    }

    tx.commit()?;
    Ok(report)
}

/// Entries of `dir` sorted by name, so repeated builds insert in the same order.
fn list_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to list {:?}", dir))?
        .map(|e| e.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to list {:?}", dir))?;
    entries.sort();
    Ok(entries)
}

// ── Tests ──
