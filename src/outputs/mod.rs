//! Catalogue of generated artifacts, as seen by a client of the site.
//!
//! # Data Flow
//!
//! ```text
//! view.load() ──► ManifestCache ──hit──► Arc<[FileItem]>
//!                      │
//!                     miss (one fetch per type in flight)
//!                      ▼
//!              ManifestSource::fetch_manifest
//!                      │
//!                      ▼
//!          OutputManifest::into_files + LinkBuilder
//! ```

pub(crate) mod cache;
mod links;
mod manifest;
mod source;
mod types;
mod views;

pub use cache::ManifestCache;
pub use links::LinkBuilder;
pub use manifest::OutputManifest;
pub use source::{FetchError, HttpSource, ManifestSource};
pub use types::{FileItem, OutputCounts, OutputSummary, OutputType};
pub use views::{AllTypesView, SummaryView, TypeView};
