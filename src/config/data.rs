//! `[data]` section configuration.
//!
//! Topic documents and the aggregate index live in one directory. A
//! production bundle and a development tree keep it in different places,
//! so two candidates are configured and one is picked at startup.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[data]` section in docsite.toml.
///
/// # Example
/// ```toml
/// [data]
/// production = ".output/public/data"
/// development = "public/data"
/// index = "_index.json"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    /// Data directory inside a built bundle. Tried first.
    #[serde(default = "defaults::data::production")]
    #[educe(Default = defaults::data::production())]
    pub production: PathBuf,

    /// Data directory of a development checkout.
    #[serde(default = "defaults::data::development")]
    #[educe(Default = defaults::data::development())]
    pub development: PathBuf,

    /// File name of the aggregate index document.
    #[serde(default = "defaults::data::index")]
    #[educe(Default = defaults::data::index())]
    pub index: String,
}
