//! Output types and the normalized file entries built from their manifests.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};
use thiserror::Error;

/// A kind of generated artifact. Each has its own manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputType {
    Colab,
    Jupyter,
    LlmRag,
    Latex,
    Mdbook,
    ApiDocs,
    Json,
    Vue,
}

impl OutputType {
    /// Every output type, in display order.
    pub const ALL: [Self; 8] = [
        Self::Colab,
        Self::Jupyter,
        Self::LlmRag,
        Self::Latex,
        Self::Mdbook,
        Self::ApiDocs,
        Self::Json,
        Self::Vue,
    ];

    /// Directory and URL segment under the outputs root.
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Colab => "colab",
            Self::Jupyter => "jupyter",
            Self::LlmRag => "llm-rag",
            Self::Latex => "latex",
            Self::Mdbook => "mdbook",
            Self::ApiDocs => "api-docs",
            Self::Json => "json",
            Self::Vue => "vue",
        }
    }

    /// File kind of every artifact of this type.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Colab | Self::Jupyter => "ipynb",
            Self::LlmRag | Self::Mdbook => "md",
            Self::Latex => "tex",
            Self::ApiDocs | Self::Json => "json",
            Self::Vue => "vue",
        }
    }

    /// Notebooks that open directly in Colab.
    pub const fn is_notebook(self) -> bool {
        matches!(self, Self::Colab)
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown output type `{0}`")]
pub struct UnknownOutputType(pub String);

impl FromStr for OutputType {
    type Err = UnknownOutputType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.slug() == s)
            .ok_or_else(|| UnknownOutputType(s.to_owned()))
    }
}

/// One discoverable artifact.
///
/// `path` (`category/name`) is unique within one output type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileItem {
    pub name: String,
    pub path: String,
    pub url: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub extension: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colab_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
}

/// Counts for one output type in `summary.json`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputCounts {
    pub total_files: usize,
    pub categories: usize,
}

/// Cross-type counts, cheap to load for index pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    /// Keyed by output type slug.
    #[serde(default)]
    pub outputs: BTreeMap<String, OutputCounts>,
}

impl OutputSummary {
    pub fn counts(&self, output: OutputType) -> OutputCounts {
        self.outputs.get(output.slug()).copied().unwrap_or_default()
    }

    pub fn total_files(&self) -> usize {
        self.outputs.values().map(|c| c.total_files).sum()
    }
}
