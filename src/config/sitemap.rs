//! `[sitemap]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[sitemap]` section in docsite.toml.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SitemapConfig {
    /// Output file for `docsite sitemap`.
    #[serde(default = "defaults::sitemap::path")]
    #[educe(Default = defaults::sitemap::path())]
    pub path: PathBuf,

    /// URL prefix of topic pages (`{docs_prefix}/{topic}`).
    #[serde(default = "defaults::sitemap::docs_prefix")]
    #[educe(Default = defaults::sitemap::docs_prefix())]
    pub docs_prefix: String,
}
