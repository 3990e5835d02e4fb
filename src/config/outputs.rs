//! `[outputs]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[outputs]` section in docsite.toml - generated artifact catalogue.
///
/// # Example
/// ```toml
/// [outputs]
/// dir = "public/outputs"
/// base_url = "https://mathhook.org/outputs"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct OutputsConfig {
    /// Local directory holding one sub-directory per output type.
    #[serde(default = "defaults::outputs::dir")]
    #[educe(Default = defaults::outputs::dir())]
    pub dir: PathBuf,

    /// Where clients fetch `{base_url}/{type}/manifest.json` from.
    #[serde(default = "defaults::outputs::base_url")]
    #[educe(Default = defaults::outputs::base_url())]
    pub base_url: String,

    /// File name of the cross-type summary, relative to `dir`/`base_url`.
    #[serde(default = "defaults::outputs::summary")]
    #[educe(Default = defaults::outputs::summary())]
    pub summary: String,
}
