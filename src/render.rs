use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::info;

use crate::process::Invocation;

#[derive(Debug, Error)]
pub enum RenderConfigError {
    #[error("build config has no `{0}` entry to narrow")]
    MissingSection(&'static str),
}

pub fn content_globs(subset: &str) -> Vec<String> {
    ["md", "yml"]
        .iter()
        .map(|ext| format!("**/{}/*.{}", subset, ext))
        .collect()
}

pub fn resource_globs(subset: &str) -> Vec<String> {
    ["png", "jpg", "gif"]
        .iter()
        .map(|ext| format!("**/{}/*.{}", subset, ext))
        .collect()
}

/// Restrict the first content and resource groups to one API subset.
/// Everything else in the config is left as is.
pub fn narrow(config: &mut Value, subset: &str) -> Result<(), RenderConfigError> {
    let content = config
        .pointer_mut("/build/content/0")
        .and_then(Value::as_object_mut)
        .ok_or(RenderConfigError::MissingSection("build.content[0]"))?;
    content.insert("files".to_string(), json!(content_globs(subset)));

    let resource = config
        .pointer_mut("/build/resource/0")
        .and_then(Value::as_object_mut)
        .ok_or(RenderConfigError::MissingSection("build.resource[0]"))?;
    resource.insert("files".to_string(), json!(resource_globs(subset)));
    Ok(())
}

/// Read `<content_dir>/<config_name>`, narrow it and write
/// `<content_dir>/<subset>.<config_name>`. Returns the written path.
pub fn write_narrowed_config(content_dir: &Path, config_name: &str, subset: &str) -> Result<PathBuf> {
    let source = content_dir.join(config_name);
    let raw = fs::read_to_string(&source).with_context(|| format!("Failed to read {:?}", source))?;
    let mut config: Value =
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse {:?}", source))?;
    narrow(&mut config, subset).with_context(|| format!("Cannot narrow {:?}", source))?;

    let target = content_dir.join(format!("{}.{}", subset, config_name));
    fs::write(&target, serde_json::to_string_pretty(&config)?)
        .with_context(|| format!("Failed to write {:?}", target))?;
    info!("Wrote narrowed build config {:?}", target);
    Ok(target)
}

/// `<exe> build <config> -o <output>`, with both paths made absolute since the
/// renderer runs from the repository root.
pub fn docfx_invocation(exe: &str, config: &Path, output: &Path) -> Result<Invocation> {
    let config = std::path::absolute(config)?;
    let output = std::path::absolute(output)?;
    Ok(Invocation::new(exe)
        .arg("build")
        .arg(config.to_string_lossy())
        .arg("-o")
        .arg(output.to_string_lossy()))
}
