//! Languages the built-in chunker understands.

use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    TypeScript,
    JavaScript,
    Python,
    Java,
    Go,
    Rust,
}

/// Name stored in `chunks.language`, and the extensions the chunker claims.
/// Indexed by discriminant.
const TABLE: [(Language, &str, &[&str]); 6] = [
    (Language::TypeScript, "typescript", &["ts", "tsx", "mts", "cts"]),
    (Language::JavaScript, "javascript", &["js", "jsx", "mjs", "cjs"]),
    (Language::Python, "python", &["py", "pyi"]),
    (Language::Java, "java", &["java"]),
    (Language::Go, "go", &["go"]),
    (Language::Rust, "rust", &["rs"]),
];

impl Language {
    pub const ALL: [Language; 6] = [
        Language::TypeScript,
        Language::JavaScript,
        Language::Python,
        Language::Java,
        Language::Go,
        Language::Rust,
    ];

    fn entry(&self) -> (&'static str, &'static [&'static str]) {
        let (_, name, exts) = TABLE[*self as usize];
        (name, exts)
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        self.entry().1
    }

    pub fn as_str(&self) -> &'static str {
        self.entry().0
    }

    /// Language claiming the path's extension, compared case-insensitively.
    pub fn from_path(path: &Path) -> Option<Language> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.extensions().contains(&ext.as_str()))
    }

    /// Grammar for a file; `.tsx` needs the TSX dialect.
    pub fn grammar(&self, ext: Option<&str>) -> tree_sitter::Language {
        match self {
            Language::TypeScript if ext == Some("tsx") => {
                tree_sitter_typescript::LANGUAGE_TSX.into()
            }
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Language::Python => tree_sitter_python::LANGUAGE.into(),
            Language::Java => tree_sitter_java::LANGUAGE.into(),
            Language::Go => tree_sitter_go::LANGUAGE.into(),
            Language::Rust => tree_sitter_rust::LANGUAGE.into(),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_language_has_a_name_and_extensions() {
        let mut seen = HashSet::new();
        for lang in Language::ALL {
            assert!(!lang.as_str().is_empty());
            assert!(!lang.extensions().is_empty());
            for ext in lang.extensions() {
                assert!(seen.insert(*ext), "{ext} claimed twice");
            }
        }
    }

    #[test]
    fn table_follows_declaration_order() {
        for (i, lang) in Language::ALL.iter().enumerate() {
            assert_eq!(TABLE[i].0, *lang);
        }
    }

    #[test]
    fn path_extension_picks_the_language() {
        assert_eq!(Language::from_path(Path::new("src/app.tsx")), Some(Language::TypeScript));
        assert_eq!(Language::from_path(Path::new("lib/util.PY")), Some(Language::Python));
        assert_eq!(Language::from_path(Path::new("main.rs")), Some(Language::Rust));
        assert_eq!(Language::from_path(Path::new("README.md")), None);
        assert_eq!(Language::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn names_match_serde() {
        for lang in Language::ALL {
            let json = serde_json::to_string(&lang).unwrap();
            assert_eq!(json, format!("\"{}\"", lang.as_str()));
        }
    }
}
