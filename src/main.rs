mod archive;
mod db;
mod indexer;
mod parser;
mod pipeline;
mod process;
mod render;
mod settings;

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing::info;

use pipeline::{Pipeline, Stages};
use process::SystemRunner;
use settings::Settings;

#[derive(Parser)]
#[command(name = "d3d12_docset", about = "Build a Dash docset for the Direct3D 12 API docs")]
struct Cli {
    /// Use path specified for the sdk-api repo
    #[arg(long)]
    repo: Option<PathBuf>,
    /// Clone the sdk-api repo before processing
    #[arg(long)]
    clone: bool,
    /// Generate the documentation pages with docfx
    #[arg(long)]
    docfx: bool,
    /// Path to the docfx tool (assumed to be on PATH otherwise)
    #[arg(long)]
    docfx_exe: Option<String>,
    /// Skip building the docset index
    #[arg(long)]
    no_docset: bool,
    /// Skip creating the docset archive
    #[arg(long)]
    no_archive: bool,
    /// Abort on the first page with missing or malformed metadata
    #[arg(long)]
    strict: bool,
    /// Where the .docset folder and archive are written
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Settings file (defaults to ./docset.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn stages(&self) -> Stages {
        Stages {
            acquire: self.clone,
            render: self.docfx,
            index: !self.no_docset,
            archive: !self.no_archive,
        }
    }

    fn apply(&self, settings: &mut Settings) {
        if let Some(repo) = &self.repo {
            settings.repo_dir = repo.clone();
        }
        if let Some(exe) = &self.docfx_exe {
            settings.docfx_exe = exe.clone();
        }
        if let Some(out) = &self.output {
            settings.output_dir = out.clone();
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    cli.apply(&mut settings);
    info!(settings = ?settings, "Starting docset build");

    let runner = SystemRunner;
    let summary = Pipeline::new(&settings, &runner)
        .strict(cli.strict)
        .run(cli.stages())?;
    summary.print();

    println!("\nDone in {}", format_duration(t0.elapsed()));
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_flags() {
        let cli = Cli::parse_from(["d3d12_docset"]);
        assert_eq!(cli.stages(), Stages::default());
    }

    #[test]
    fn all_flags() {
        let cli = Cli::parse_from([
            "d3d12_docset",
            "--clone",
            "--docfx",
            "--no-docset",
            "--no-archive",
            "--repo",
            "/src/sdk-api",
            "--docfx-exe",
            "/opt/docfx/docfx",
        ]);
        assert_eq!(
            cli.stages(),
            Stages {
                acquire: true,
                render: true,
                index: false,
                archive: false,
            }
        );
        let mut s = Settings::default();
        cli.apply(&mut s);
        assert_eq!(s.repo_dir, PathBuf::from("/src/sdk-api"));
        assert_eq!(s.docfx_exe, "/opt/docfx/docfx");
        assert_eq!(s.output_dir, PathBuf::from("."));
    }

    #[test]
    fn durations() {
        use std::time::Duration;
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m 5s");
    }
}
