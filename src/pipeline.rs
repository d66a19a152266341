//! Acquire → render → index → archive.
//!
//! Stages run in order and any failure stops the run; nothing produced by an
//! earlier stage is cleaned up.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::settings::Settings;
use crate::indexer::{self, IndexReport};
use crate::process::{ExitStatus, Invocation, ProcessRunner};
use crate::{archive, db, render};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("error cloning {url} ({status})")]
    AcquisitionFailed { url: String, status: ExitStatus },
    #[error("source repo not found at {0:?}, pass --clone to clone the repo or --repo to specify the repo location")]
    RepoNotFound(PathBuf),
    #[error("error running docfx ({0})")]
    RenderFailed(ExitStatus),
    #[error("docfx output not found at {0:?}, pass --docfx to build")]
    RenderedOutputMissing(PathBuf),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Which stages to run. Index and archive are on unless disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stages {
    pub acquire: bool,
    pub render: bool,
    pub index: bool,
    pub archive: bool,
}

impl Default for Stages {
    fn default() -> Self {
        Self {
            acquire: false,
            render: false,
            index: true,
            archive: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub cloned: bool,
    pub rendered: bool,
    pub index: Option<IndexReport>,
    pub kind_counts: Vec<(String, i64)>,
    pub archive: Option<PathBuf>,
}

impl RunSummary {
    pub fn print(&self) {
        if self.cloned {
            println!("Cloned source repo.");
        }
        if self.rendered {
            println!("Rendered pages with docfx.");
        }
        if let Some(report) = &self.index {
            report.print();
            for (kind, n) in &self.kind_counts {
                println!("  {:<10} {:>6}", kind, n);
            }
        }
        if let Some(path) = &self.archive {
            println!("Archive: {}", path.display());
        }
    }
}

pub struct Pipeline<'a, R: ProcessRunner> {
    settings: &'a Settings,
    runner: &'a R,
    strict: bool,
}

impl<'a, R: ProcessRunner> Pipeline<'a, R> {
    pub fn new(settings: &'a Settings, runner: &'a R) -> Self {
        Self {
            settings,
            runner,
            strict: false,
        }
    }

    /// Abort the index build on the first page with bad metadata.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn run(&self, stages: Stages) -> Result<RunSummary, PipelineError> {
        let s = self.settings;
        let mut summary = RunSummary::default();

        if stages.acquire {
            summary.cloned = self.acquire()?;
        }
        if !s.repo_dir.exists() {
            return Err(PipelineError::RepoNotFound(s.repo_dir.clone()));
        }

        if stages.render {
            println!("Running docfx");
            self.render()?;
            summary.rendered = true;
        }

        if (stages.index || stages.archive) && !s.documents_dir().exists() {
            return Err(PipelineError::RenderedOutputMissing(s.documents_dir()));
        }

        if stages.index {
            println!("Creating docset");
            let (report, counts) = self.index()?;
            summary.index = Some(report);
            summary.kind_counts = counts;
        }

        if stages.archive {
            println!("Creating archive");
            let path = s.archive_path();
            archive::write_archive(&s.docset_dir(), &path)?;
            summary.archive = Some(path);
        }

        Ok(summary)
    }

    /// Shallow clone, unless the destination already holds something.
    fn acquire(&self) -> Result<bool, PipelineError> {
        let s = self.settings;
        if is_populated(&s.repo_dir) {
            info!("{:?} already populated, skipping clone", s.repo_dir);
            return Ok(false);
        }

        println!("Cloning {} to {}", s.repo_url, s.repo_dir.display());
        let git = Invocation::new("git")
            .arg("clone")
            .arg("--depth")
            .arg("1")
            .arg(s.repo_url.as_str())
            .arg(s.repo_dir.to_string_lossy());
        let status = self.runner.invoke(&git, Path::new("."))?;
        if !status.success() {
            return Err(PipelineError::AcquisitionFailed {
                url: s.repo_url.clone(),
                status,
            });
        }
        Ok(true)
    }

    fn render(&self) -> Result<(), PipelineError> {
        let s = self.settings;
        let config = render::write_narrowed_config(&s.content_dir(), &s.build_config, &s.api_subset)?;
        let docfx = render::docfx_invocation(&s.docfx_exe, &config, &s.documents_dir())?;
        let status = self.runner.invoke(&docfx, &s.repo_dir)?;
        if !status.success() {
            return Err(PipelineError::RenderFailed(status));
        }
        Ok(())
    }

    /// The connection lives only for this stage.
    fn index(&self) -> Result<(IndexReport, Vec<(String, i64)>), PipelineError> {
        let s = self.settings;
        let conn = db::connect(&s.index_path())?;
        let report = indexer::build_index(
            &conn,
            &s.source_pages_dir(),
            &s.index_options(self.strict),
            &s.classifier(),
        )?;
        let counts = db::kind_counts(&conn)?;
        Ok((report, counts))
    }
}

fn is_populated(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

// ── Tests ──
