use std::collections::BTreeMap;

use serde::Deserialize;

/// Entry type stored in the `type` column of the search index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub enum EntityKind {
    Enum,
    Function,
    Method,
    Struct,
    Unknown,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Enum => "Enum",
            EntityKind::Function => "Function",
            EntityKind::Method => "Method",
            EntityKind::Struct => "Struct",
            EntityKind::Unknown => "Unknown",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Enum" => Some(EntityKind::Enum),
            "Function" => Some(EntityKind::Function),
            "Method" => Some(EntityKind::Method),
            "Struct" => Some(EntityKind::Struct),
            "Unknown" => Some(EntityKind::Unknown),
            _ => None,
        }
    }
}

/// Prefix table used by the sdk-api repo: `ne-`, `nf-`, `nn-`, `ns-`.
pub fn default_prefixes() -> BTreeMap<String, EntityKind> {
    [
        ("ne", EntityKind::Enum),
        ("nf", EntityKind::Function),
        ("nn", EntityKind::Method),
        ("ns", EntityKind::Struct),
    ]
    .into_iter()
    .map(|(p, k)| (p.to_string(), k))
    .collect()
}

/// Outcome of classifying one filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Known(EntityKind),
    /// The prefix token was not in the table; carries the token for reporting.
    Unrecognized(String),
}

impl Classification {
    pub fn kind(&self) -> EntityKind {
        match self {
            Classification::Known(kind) => *kind,
            Classification::Unrecognized(_) => EntityKind::Unknown,
        }
    }
}

/// Maps a page filename to its entity kind through a closed prefix table.
///
/// The `api_type` field in the front matter is not used: in the d3d12 pages it
/// only ever holds values like `COM`, `DllExport` or `HeaderDef`.
#[derive(Debug, Clone)]
pub struct Classifier {
    prefixes: BTreeMap<String, EntityKind>,
    separator: char,
}

impl Classifier {
    pub fn new(prefixes: BTreeMap<String, EntityKind>, separator: char) -> Self {
        Self { prefixes, separator }
    }

    /// Text before the first separator, or the whole name when there is none.
    pub fn prefix_token<'a>(&self, filename: &'a str) -> &'a str {
        filename
            .split_once(self.separator)
            .map(|(head, _)| head)
            .unwrap_or(filename)
    }

    pub fn classify(&self, filename: &str) -> Classification {
        let token = self.prefix_token(filename);
        match self.prefixes.get(token) {
            Some(kind) => Classification::Known(*kind),
            None => Classification::Unrecognized(token.to_string()),
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(default_prefixes(), '-')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_prefixes() {
        let c = Classifier::default();
        assert_eq!(c.classify("ne-d3d12-d3d12_flags.md").kind(), EntityKind::Enum);
        assert_eq!(c.classify("nf-d3d12-d3d12createdevice.md").kind(), EntityKind::Function);
        assert_eq!(
            c.classify("nn-d3d12-id3d12device.md").kind(),
            EntityKind::Method
        );
        assert_eq!(
            c.classify("ns-d3d12-d3d12_box.md").kind(),
            EntityKind::Struct
        );
    }

    #[test]
    fn unrecognized_prefix_is_unknown() {
        let c = Classifier::default();
        let result = c.classify("nc-d3d12-pfn_callback.md");
        assert_eq!(result, Classification::Unrecognized("nc".to_string()));
        assert_eq!(result.kind(), EntityKind::Unknown);
    }

    #[test]
    fn no_separator_uses_whole_name() {
        let c = Classifier::default();
        assert_eq!(c.prefix_token("overview.md"), "overview.md");
        assert_eq!(c.classify("overview.md").kind(), EntityKind::Unknown);
    }

    #[test]
    fn prefix_is_case_sensitive() {
        let c = Classifier::default();
        assert_eq!(c.classify("NF-d3d12-foo.md").kind(), EntityKind::Unknown);
    }

    #[test]
    fn custom_table_and_separator() {
        let mut table = BTreeMap::new();
        table.insert("fn".to_string(), EntityKind::Function);
        let c = Classifier::new(table, '_');
        assert_eq!(c.classify("fn_vkCreateDevice.md").kind(), EntityKind::Function);
        assert_eq!(c.classify("nf-d3d12-foo.md").kind(), EntityKind::Unknown);
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in [
            EntityKind::Enum,
            EntityKind::Function,
            EntityKind::Method,
            EntityKind::Struct,
            EntityKind::Unknown,
        ] {
            assert_eq!(EntityKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(EntityKind::parse("Class"), None);
    }
}
