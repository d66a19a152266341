use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::indexer::IndexOptions;
use crate::parser::kind::{default_prefixes, Classifier, EntityKind};

pub const ENV_PREFIX: &str = "DOCSET";
pub const DEFAULT_CONFIG_FILE: &str = "docset.toml";

/// Where things live and how pages are named for one docset build.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub repo_url: String,
    pub repo_dir: PathBuf,
    /// Folder that receives `<docset_name>.docset` and the archive.
    pub output_dir: PathBuf,
    pub docset_name: String,
    /// Folder name of the API subset under the content directory, e.g. `d3d12`.
    pub api_subset: String,
    pub content_subdir: String,
    pub build_config: String,
    pub docfx_exe: String,
    pub relative_output: String,
    pub source_extension: String,
    pub rendered_extension: String,
    pub excluded_entries: Vec<String>,
    pub prefix_separator: char,
    pub kind_prefixes: BTreeMap<String, EntityKind>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            repo_url: "https://github.com/MicrosoftDocs/sdk-api.git".to_string(),
            repo_dir: PathBuf::from("sdk-api"),
            output_dir: PathBuf::from("."),
            docset_name: "Direct3D12".to_string(),
            api_subset: "d3d12".to_string(),
            content_subdir: "sdk-api-src/content".to_string(),
            build_config: "docfx.json".to_string(),
            docfx_exe: "docfx".to_string(),
            relative_output: "windows/win32/api/d3d12".to_string(),
            source_extension: "md".to_string(),
            rendered_extension: "html".to_string(),
            excluded_entries: vec!["index.md".to_string(), "images".to_string()],
            prefix_separator: '-',
            kind_prefixes: default_prefixes(),
        }
    }
}

impl Settings {
    /// Defaults, then `file` (or `docset.toml` if present), then `DOCSET_*` env vars.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let source = match file {
            Some(p) => config::File::from(p).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        let settings = config::Config::builder()
            .add_source(source)
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to load settings")?
            .try_deserialize()
            .context("Invalid settings")?;
        Ok(settings)
    }

    pub fn docset_dir(&self) -> PathBuf {
        self.output_dir.join(format!("{}.docset", self.docset_name))
    }

    pub fn resources_dir(&self) -> PathBuf {
        self.docset_dir().join("Contents").join("Resources")
    }

    /// Renderer output, i.e. the docset's `Documents` folder.
    pub fn documents_dir(&self) -> PathBuf {
        self.resources_dir().join("Documents")
    }

    pub fn index_path(&self) -> PathBuf {
        self.resources_dir().join("docSet.dsidx")
    }

    pub fn archive_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.tgz", self.docset_name))
    }

    pub fn content_dir(&self) -> PathBuf {
        self.repo_dir.join(&self.content_subdir)
    }

    /// Folder holding the subset's source pages.
    pub fn source_pages_dir(&self) -> PathBuf {
        self.content_dir().join(&self.api_subset)
    }

    pub fn classifier(&self) -> Classifier {
        Classifier::new(self.kind_prefixes.clone(), self.prefix_separator)
    }

    pub fn index_options(&self, strict: bool) -> IndexOptions {
        IndexOptions {
            relative_output: self.relative_output.clone(),
            source_extension: self.source_extension.clone(),
            rendered_extension: self.rendered_extension.clone(),
            excluded: self.excluded_entries.clone(),
            strict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_layout() {
        let s = Settings::default();
        assert_eq!(s.docset_dir(), PathBuf::from("./Direct3D12.docset"));
        assert_eq!(
            s.index_path(),
            PathBuf::from("./Direct3D12.docset/Contents/Resources/docSet.dsidx")
        );
        assert_eq!(
            s.documents_dir(),
            PathBuf::from("./Direct3D12.docset/Contents/Resources/Documents")
        );
        assert_eq!(s.archive_path(), PathBuf::from("./Direct3D12.tgz"));
        assert_eq!(
            s.source_pages_dir(),
            PathBuf::from("sdk-api/sdk-api-src/content/d3d12")
        );
    }

    #[test]
    fn file_overrides_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("d3d11.toml");
        std::fs::write(
            &path,
            r#"
docset_name = "Direct3D11"
api_subset = "d3d11"
relative_output = "windows/win32/api/d3d11"

[kind_prefixes]
nf = "Function"
ni = "Method"
"#,
        )
        .unwrap();

        let s = Settings::load(Some(&path)).unwrap();
        assert_eq!(s.docset_name, "Direct3D11");
        assert_eq!(s.api_subset, "d3d11");
        // Untouched keys keep their defaults
        assert_eq!(s.source_extension, "md");
        assert_eq!(s.excluded_entries, vec!["index.md", "images"]);

        let c = s.classifier();
        assert_eq!(c.classify("ni-d3d11-foo.md").kind(), EntityKind::Method);
        assert_eq!(c.classify("ne-d3d11-foo.md").kind(), EntityKind::Unknown);
    }

    #[test]
    fn missing_explicit_file_is_error() {
        let tmp = TempDir::new().unwrap();
        assert!(Settings::load(Some(&tmp.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn index_options_follow_settings() {
        let s = Settings::default();
        let o = s.index_options(true);
        assert!(o.strict);
        assert_eq!(
            o.rendered_path("nf-example.md"),
            "windows/win32/api/d3d12/nf-example.html"
        );
    }
}
