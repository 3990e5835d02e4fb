//! Per-output-type manifest documents and their conversion into [`FileItem`]s.
//!
//! ```json
//! {
//!   "generated_at": "2025-12-15T18:35:00Z",
//!   "categories": {
//!     "calculus": [
//!       { "filename": "deriv.ipynb", "title": "Derivatives", "topic": "calculus.derivative" }
//!     ]
//!   }
//! }
//! ```
//!
//! Category order in the document is the order of the resulting file list,
//! so categories are read into a `Vec` straight from the map visitor.

use super::{FileItem, LinkBuilder, OutputType};
use crate::log;
use serde::{
    Deserialize, Deserializer,
    de::{self, MapAccess, Visitor},
};
use std::{collections::HashSet, fmt};

/// One file as written by the generators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawFileEntry {
    pub filename: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    /// Pre-built Colab link; wins over the derived one.
    #[serde(default)]
    pub colab_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
}

/// `{outputs}/{type}/manifest.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OutputManifest {
    #[serde(default)]
    pub generated_at: Option<String>,
    #[serde(default)]
    pub output_type: Option<String>,
    #[serde(default)]
    pub total_files: Option<usize>,
    #[serde(deserialize_with = "ordered_categories")]
    pub categories: Vec<(String, Vec<RawFileEntry>)>,
}

impl OutputManifest {
    pub fn file_count(&self) -> usize {
        self.categories.iter().map(|(_, files)| files.len()).sum()
    }

    /// Normalize into file items, preserving category and entry order.
    ///
    /// Entries whose file name is not a plain leaf name, or whose
    /// `category/name` path was already produced, are skipped.
    pub fn into_files(self, output: OutputType, base_url: &str, links: &LinkBuilder) -> Vec<FileItem> {
        let base_url = base_url.trim_end_matches('/');
        let mut seen = HashSet::new();
        let mut files = Vec::with_capacity(self.file_count());

        for (category, entries) in self.categories {
            for entry in entries {
                if !is_leaf_name(&entry.filename) {
                    log!("cache"; "{output}: skipping entry `{}` in `{category}`", entry.filename);
                    continue;
                }
                let path = format!("{category}/{}", entry.filename);
                if !seen.insert(path.clone()) {
                    log!("cache"; "{output}: duplicate entry `{path}`");
                    continue;
                }

                let colab_url = output.is_notebook().then(|| {
                    entry
                        .colab_url
                        .filter(|url| !url.is_empty())
                        .unwrap_or_else(|| links.colab_url(&category, &entry.filename))
                });

                files.push(FileItem {
                    url: format!("{base_url}/{}/{path}", output.slug()),
                    github_url: Some(links.github_url(output, &category, &entry.filename)),
                    colab_url,
                    title: entry.title,
                    extension: output.extension(),
                    category: category.clone(),
                    name: entry.filename,
                    path,
                });
            }
        }

        files
    }
}

fn is_leaf_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

fn ordered_categories<'de, D>(deserializer: D) -> Result<Vec<(String, Vec<RawFileEntry>)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Categories;

    impl<'de> Visitor<'de> for Categories {
        type Value = Vec<(String, Vec<RawFileEntry>)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map from category name to file entries")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut names = HashSet::new();
            let mut categories = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, entries)) = map.next_entry::<String, Vec<RawFileEntry>>()? {
                if !names.insert(name.clone()) {
                    return Err(de::Error::custom(format!("duplicate category `{name}`")));
                }
                categories.push((name, entries));
            }
            Ok(categories)
        }
    }

    deserializer.deserialize_map(Categories)
}
