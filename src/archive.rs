use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::info;

/// Pack `docset_dir` into a gzip tarball at `archive_path`, stored under its
/// own folder name (e.g. `Direct3D12.docset/...`).
pub fn write_archive(docset_dir: &Path, archive_path: &Path) -> Result<()> {
    let root = docset_dir
        .file_name()
        .with_context(|| format!("No folder name in {:?}", docset_dir))?;

    let file = File::create(archive_path)
        .with_context(|| format!("Failed to create {:?}", archive_path))?;
    let mut tar = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    tar.append_dir_all(root, docset_dir)
        .with_context(|| format!("Failed to add {:?} to archive", docset_dir))?;
    tar.into_inner()?.finish()?;

    info!("Wrote {:?}", archive_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn archive_contains_docset_root() {
        let tmp = TempDir::new().unwrap();
        let docset = tmp.path().join("Direct3D12.docset");
        let docs = docset.join("Contents/Resources/Documents");
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("nf-create.html"), "<html></html>").unwrap();
        fs::write(docset.join("Contents/Resources/docSet.dsidx"), "db").unwrap();

        let out = tmp.path().join("Direct3D12.tgz");
        write_archive(&docset, &out).unwrap();

        let mut archive = tar::Archive::new(GzDecoder::new(File::open(&out).unwrap()));
        let names: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().all(|n| n.starts_with("Direct3D12.docset")));
        assert!(names
            .iter()
            .any(|n| n == "Direct3D12.docset/Contents/Resources/docSet.dsidx"));
        assert!(names
            .iter()
            .any(|n| n == "Direct3D12.docset/Contents/Resources/Documents/nf-create.html"));
    }

    #[test]
    fn missing_docset_is_error() {
        let tmp = TempDir::new().unwrap();
        let res = write_archive(&tmp.path().join("Nope.docset"), &tmp.path().join("x.tgz"));
        assert!(res.is_err());
    }
}
