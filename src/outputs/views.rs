//! Read-only views over a [`ManifestCache`].
//!
//! | View            | Loads                  | `refresh()` evicts |
//! |-----------------|------------------------|--------------------|
//! | `SummaryView`   | `summary.json` only    | nothing            |
//! | `TypeView`      | one output type        | that type          |
//! | `AllTypesView`  | every output type      | the whole cache    |
//!
//! Views borrow the cache; they never own fetched data beyond cheap
//! `Arc` handles to what the cache already holds.

use super::{FileItem, ManifestCache, ManifestSource, OutputSummary, OutputType};
use futures::future::join_all;
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

// ============================================================================
// Summary
// ============================================================================

/// Per-type counts for landing pages, without loading any manifest.
pub struct SummaryView<'a, S> {
    cache: &'a ManifestCache<S>,
    summary: Option<Arc<OutputSummary>>,
    error: Option<String>,
}

impl<'a, S: ManifestSource + 'static> SummaryView<'a, S> {
    pub fn new(cache: &'a ManifestCache<S>) -> Self {
        Self {
            cache,
            summary: None,
            error: None,
        }
    }

    /// Load the summary. A no-op once it is loaded.
    pub async fn load(&mut self) {
        if self.summary.is_some() {
            return;
        }
        match self.cache.try_summary().await {
            Ok(summary) => {
                self.summary = Some(summary);
                self.error = None;
            }
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.summary.is_some()
    }

    pub fn count(&self, output: OutputType) -> usize {
        self.summary
            .as_ref()
            .map_or(0, |summary| summary.counts(output).total_files)
    }

    pub fn categories(&self, output: OutputType) -> usize {
        self.summary
            .as_ref()
            .map_or(0, |summary| summary.counts(output).categories)
    }

    pub fn total_files(&self) -> usize {
        self.summary.as_ref().map_or(0, |summary| summary.total_files())
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

// ============================================================================
// Single output type
// ============================================================================

/// Files of one output type and the categories they fall into.
pub struct TypeView<'a, S> {
    cache: &'a ManifestCache<S>,
    output: OutputType,
    files: Arc<[FileItem]>,
    error: Option<String>,
}

impl<'a, S: ManifestSource + 'static> TypeView<'a, S> {
    pub fn new(cache: &'a ManifestCache<S>, output: OutputType) -> Self {
        Self {
            cache,
            output,
            files: Vec::new().into(),
            error: None,
        }
    }

    pub async fn load(&mut self) {
        match self.cache.try_manifest(self.output).await {
            Ok(files) => {
                self.files = files;
                self.error = None;
            }
            Err(err) => {
                self.files = Vec::new().into();
                self.error = Some(err.to_string());
            }
        }
    }

    /// Evict this type only, then load it again.
    pub async fn refresh(&mut self) {
        self.cache.evict(self.output);
        self.load().await;
    }

    pub fn output(&self) -> OutputType {
        self.output
    }

    pub fn files(&self) -> &[FileItem] {
        &self.files
    }

    /// Unique category names, sorted.
    pub fn categories(&self) -> Vec<&str> {
        self.files
            .iter()
            .map(|file| file.category.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn files_in<'v>(&'v self, category: &'v str) -> impl Iterator<Item = &'v FileItem> {
        self.files.iter().filter(move |file| file.category == category)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

// ============================================================================
// All output types
// ============================================================================

/// Every output type at once, with cross-type statistics.
///
/// Kept for pages that want the whole catalogue; prefer [`TypeView`].
pub struct AllTypesView<'a, S> {
    cache: &'a ManifestCache<S>,
    files: BTreeMap<OutputType, Arc<[FileItem]>>,
    error: Option<String>,
}

impl<'a, S: ManifestSource + 'static> AllTypesView<'a, S> {
    pub fn new(cache: &'a ManifestCache<S>) -> Self {
        Self {
            cache,
            files: BTreeMap::new(),
            error: None,
        }
    }

    /// Fetch every output type concurrently. Already cached types
    /// resolve without a fetch; a failed type contributes no files.
    pub async fn load(&mut self) {
        let cache = self.cache;
        let results = join_all(
            OutputType::ALL
                .into_iter()
                .map(|output| async move { (output, cache.try_manifest(output).await) }),
        )
        .await;

        let mut failed = Vec::new();
        self.files.clear();
        for (output, result) in results {
            match result {
                Ok(files) => {
                    self.files.insert(output, files);
                }
                Err(err) => {
                    failed.push(format!("{output}: {err}"));
                    self.files.insert(output, Vec::new().into());
                }
            }
        }
        self.error = (!failed.is_empty()).then(|| failed.join("; "));
    }

    /// Clear the whole cache, then load every type again.
    pub async fn refresh(&mut self) {
        self.cache.evict_all();
        self.load().await;
    }

    pub fn files(&self, output: OutputType) -> &[FileItem] {
        self.files.get(&output).map(|files| &**files).unwrap_or_default()
    }

    /// Files of one category, per output type.
    pub fn files_by_category(&self, category: &str) -> BTreeMap<OutputType, Vec<&FileItem>> {
        self.files
            .iter()
            .map(|(output, files)| {
                let matching: Vec<_> = files.iter().filter(|f| f.category == category).collect();
                (*output, matching)
            })
            .collect()
    }

    /// Sorted union of categories across every type.
    pub fn categories(&self) -> Vec<&str> {
        self.files
            .values()
            .flat_map(|files| files.iter().map(|file| file.category.as_str()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn total_files(&self) -> usize {
        self.files.values().map(|files| files.len()).sum()
    }

    pub fn count_by_type(&self) -> BTreeMap<OutputType, usize> {
        OutputType::ALL
            .into_iter()
            .map(|output| (output, self.files(output).len()))
            .collect()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
