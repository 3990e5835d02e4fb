//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// [base] Section Defaults
// ============================================================================

pub mod base {
    use std::path::PathBuf;

    pub fn url() -> String {
        "http://localhost:5277".into()
    }

    pub fn root() -> Option<PathBuf> {
        None
    }
}

// ============================================================================
// [data] Section Defaults
// ============================================================================

pub mod data {
    use std::path::PathBuf;

    pub fn production() -> PathBuf {
        ".output/public/data".into()
    }

    pub fn development() -> PathBuf {
        "public/data".into()
    }

    pub fn index() -> String {
        "_index.json".into()
    }
}

// ============================================================================
// [outputs] Section Defaults
// ============================================================================

pub mod outputs {
    use std::path::PathBuf;

    pub fn dir() -> PathBuf {
        "public/outputs".into()
    }

    pub fn base_url() -> String {
        "http://localhost:5277/outputs".into()
    }

    pub fn summary() -> String {
        "summary.json".into()
    }
}

// ============================================================================
// [github] Section Defaults
// ============================================================================

pub mod github {
    pub fn user() -> String {
        "AhmedMashour".into()
    }

    pub fn repo() -> String {
        "mathhook-kb".into()
    }

    pub fn branch() -> String {
        "master".into()
    }

    pub fn outputs_path() -> String {
        "mathhook-docs-site/public/outputs".into()
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    use std::path::PathBuf;

    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        5277
    }

    pub fn public() -> PathBuf {
        "public".into()
    }

    /// Seconds a parsed document stays fresh in the server caches.
    pub fn cache_ttl() -> u64 {
        300
    }

    pub fn cache_control() -> String {
        "public, max-age=300".into()
    }
}

// ============================================================================
// [sitemap] Section Defaults
// ============================================================================

pub mod sitemap {
    use std::path::PathBuf;

    pub fn path() -> PathBuf {
        "public/sitemap.xml".into()
    }

    pub fn docs_prefix() -> String {
        "/docs".into()
    }
}
