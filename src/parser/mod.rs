pub mod frontmatter;
pub mod kind;

use std::path::PathBuf;

use crate::db::IndexRecord;
use frontmatter::MetadataError;
use kind::{Classification, Classifier};

/// One source page as read from disk.
#[derive(Debug)]
pub struct DocPage {
    pub source_path: PathBuf,
    pub file_name: String,
    pub raw_content: String,
}

/// Record for the page plus how its filename was classified.
#[derive(Debug)]
pub struct ProcessedPage {
    pub record: IndexRecord,
    pub classification: Classification,
}

/// Front matter → name, filename → kind, filename → rendered path.
pub fn process_page(
    page: &DocPage,
    classifier: &Classifier,
    rendered_path: impl FnOnce(&str) -> String,
) -> Result<ProcessedPage, MetadataError> {
    let name = frontmatter::read_api_name(&page.raw_content)?;
    let classification = classifier.classify(&page.file_name);
    let record = IndexRecord {
        name,
        kind: classification.kind(),
        path: rendered_path(&page.file_name),
    };
    Ok(ProcessedPage {
        record,
        classification,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kind::EntityKind;

    fn page(file_name: &str, content: &str) -> DocPage {
        DocPage {
            source_path: PathBuf::from(file_name),
            file_name: file_name.to_string(),
            raw_content: content.to_string(),
        }
    }

    #[test]
    fn builds_record() {
        let p = page("nf-example.md", "---\napi_name: [Example]\n---\n");
        let out = process_page(&p, &Classifier::default(), |f| format!("out/{f}")).unwrap();
        assert_eq!(out.record.name, "Example");
        assert_eq!(out.record.kind, EntityKind::Function);
        assert_eq!(out.record.path, "out/nf-example.md");
        assert_eq!(out.classification, Classification::Known(EntityKind::Function));
    }

    #[test]
    fn callback_page_is_unrecognized() {
        let name = "nc-d3d12-pfn_d3d12_create_device.md";
        let content = std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap();
        let out = process_page(&page(name, &content), &Classifier::default(), |f| f.to_string()).unwrap();
        assert_eq!(out.record.name, "PFN_D3D12_CREATE_DEVICE");
        assert_eq!(out.record.kind, EntityKind::Unknown);
        assert_eq!(out.classification, Classification::Unrecognized("nc".to_string()));
    }

    #[test]
    fn metadata_failure_produces_no_record() {
        let p = page("ne-broken.md", "no front matter");
        assert!(process_page(&p, &Classifier::default(), |f| f.to_string()).is_err());
    }
}
