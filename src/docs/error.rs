//! Failures of the topic and index stores, with their HTTP mapping.

use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or unsafe topic key. Never reaches the filesystem.
    #[error("invalid topic: {0}")]
    Validation(String),

    #[error("topic '{0}' not found")]
    NotFound(String),

    /// The index document is missing from the data directory.
    #[error("docs index not found at {}", .0.display())]
    Unavailable(PathBuf),

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The index parsed but is neither an object nor an array.
    #[error("{} is not a JSON object or array", .0.display())]
    Shape(PathBuf),
}

impl ApiError {
    pub const fn status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Unavailable(_) => 503,
            Self::Parse { .. } | Self::Io { .. } | Self::Shape(_) => 500,
        }
    }

    /// Text for the response body. Filesystem paths stay in the log.
    pub fn message(&self) -> String {
        match self {
            Self::Validation(reason) => format!("Invalid topic: {reason}"),
            Self::NotFound(topic) => format!("Topic '{topic}' not found"),
            Self::Unavailable(_) => "Docs index not available".to_owned(),
            Self::Parse { .. } | Self::Shape(_) => "Docs data is malformed".to_owned(),
            Self::Io { .. } => "Failed to read docs data".to_owned(),
        }
    }

    /// `{"statusCode": .., "message": ..}`
    pub fn to_json(&self) -> String {
        serde_json::json!({
            "statusCode": self.status(),
            "message": self.message(),
        })
        .to_string()
    }
}
