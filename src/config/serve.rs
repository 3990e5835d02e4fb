//! `[serve]` section configuration.
//!
//! Contains HTTP server settings, including the document cache policy.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// `[serve]` section in docsite.toml - HTTP server settings.
///
/// # Example
/// ```toml
/// [serve]
/// interface = "0.0.0.0"  # Listen on all interfaces
/// port = 3000
/// cache_ttl = 60         # seconds
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    #[serde(default = "defaults::serve::interface")]
    #[educe(Default = defaults::serve::interface())]
    pub interface: String,

    /// HTTP port number (default: 5277).
    #[serde(default = "defaults::serve::port")]
    #[educe(Default = defaults::serve::port())]
    pub port: u16,

    /// Directory served for every path outside `/api`.
    #[serde(default = "defaults::serve::public")]
    #[educe(Default = defaults::serve::public())]
    pub public: PathBuf,

    /// Seconds a parsed topic or index document is served from memory.
    #[serde(default = "defaults::serve::cache_ttl")]
    #[educe(Default = defaults::serve::cache_ttl())]
    pub cache_ttl: u64,

    /// `Cache-Control` header sent with API responses.
    #[serde(default = "defaults::serve::cache_control")]
    #[educe(Default = defaults::serve::cache_control())]
    pub cache_control: String,
}

impl ServeConfig {
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }
}
