//! `[github]` section configuration.
//!
//! Source links and Colab links both point into this repository.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[github]` section in docsite.toml.
///
/// # Example
/// ```toml
/// [github]
/// user = "AhmedMashour"
/// repo = "mathhook-kb"
/// branch = "master"
/// outputs_path = "mathhook-docs-site/public/outputs"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct GithubConfig {
    #[serde(default = "defaults::github::user")]
    #[educe(Default = defaults::github::user())]
    pub user: String,

    #[serde(default = "defaults::github::repo")]
    #[educe(Default = defaults::github::repo())]
    pub repo: String,

    #[serde(default = "defaults::github::branch")]
    #[educe(Default = defaults::github::branch())]
    pub branch: String,

    /// Repository-relative path of the outputs directory.
    #[serde(default = "defaults::github::outputs_path")]
    #[educe(Default = defaults::github::outputs_path())]
    pub outputs_path: String,
}
