//! `[base]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[base]` section in docsite.toml - where the site lives.
///
/// # Example
/// ```toml
/// [base]
/// url = "https://mathhook.org"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BaseConfig {
    /// Public origin used for absolute links in the sitemap.
    #[serde(default = "defaults::base::url")]
    #[educe(Default = defaults::base::url())]
    pub url: String,

    /// Project root; every relative path below resolves against it.
    #[serde(default = "defaults::base::root")]
    #[educe(Default = defaults::base::root())]
    pub root: Option<PathBuf>,
}
