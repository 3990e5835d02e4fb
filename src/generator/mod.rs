//! One-shot generators over the data and outputs directories.

pub mod sitemap;
pub mod summary;

pub use sitemap::{build_sitemap, render_sitemap};
pub use summary::build_summary;
