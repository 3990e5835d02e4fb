//! Server-side stores for the docs API.
//!
//! - [`TopicStore`]: `{data}/{topic}.json`, one cache entry per topic
//! - [`IndexStore`]: `{data}/_index.json`, a single cache entry
//!
//! Both keep parsed documents for a fixed TTL and never cache failures.

mod error;
mod index;
mod root;
mod topic;
pub mod ttl;

pub use error::ApiError;
pub use index::IndexStore;
pub use root::DataRoot;
pub use topic::TopicStore;
pub use ttl::{Clock, SystemClock};

use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    /// Value of the `X-Cache` response header.
    pub const fn header(self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
        }
    }
}

/// A parsed document and whether it came from the cache.
#[derive(Debug, Clone)]
pub struct Lookup {
    pub value: Arc<Value>,
    pub cache: CacheStatus,
}
