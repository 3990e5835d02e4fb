//! Session-wide cache of output manifests and the cross-type summary.
//!
//! # Request coalescing
//!
//! ```text
//!  caller A ──► manifest(colab) ──► miss ──► pending[colab] = fetch.shared() ──┐
//!  caller B ──► manifest(colab) ──► pending hit ──► clone handle ──────────────┤
//!                                                                              ▼
//!                                          fetch settles: store files (Ok only),
//!                                          drop guard removes pending[colab]
//! ```
//!
//! At most one fetch per key is outstanding. Failures are handed to every
//! waiter but never stored, so the next call fetches again. Eviction only
//! touches stored results; a fetch already running still stores its result
//! when it settles.

use super::{FetchError, FileItem, LinkBuilder, ManifestSource, OutputSummary, OutputType};
use crate::log;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};

type Pending<T> = Shared<BoxFuture<'static, T>>;

pub type ManifestResult = Result<Arc<[FileItem]>, FetchError>;
pub type SummaryResult = Result<Arc<OutputSummary>, FetchError>;

#[derive(Default)]
struct CacheState {
    summary: Option<Arc<OutputSummary>>,
    summary_pending: Option<Pending<SummaryResult>>,
    manifests: HashMap<OutputType, Arc<[FileItem]>>,
    pending: HashMap<OutputType, Pending<ManifestResult>>,
}

struct Inner<S> {
    source: S,
    links: LinkBuilder,
    state: Mutex<CacheState>,
}

/// Manifest cache shared by every view in a session.
///
/// Cloning is cheap and yields a handle to the same cache.
pub struct ManifestCache<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for ManifestCache<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Runs `clear` against the cache state when dropped.
///
/// Lives inside the shared fetch future, so the pending entry goes away
/// when the fetch settles, whether it succeeded, failed, or was dropped
/// half way.
struct SettleGuard<'a, F: FnOnce(&mut CacheState)> {
    state: &'a Mutex<CacheState>,
    clear: Option<F>,
}

impl<'a, F: FnOnce(&mut CacheState)> SettleGuard<'a, F> {
    fn new(state: &'a Mutex<CacheState>, clear: F) -> Self {
        Self {
            state,
            clear: Some(clear),
        }
    }
}

impl<F: FnOnce(&mut CacheState)> Drop for SettleGuard<'_, F> {
    fn drop(&mut self) {
        if let Some(clear) = self.clear.take() {
            clear(&mut self.state.lock());
        }
    }
}

impl<S: ManifestSource + 'static> ManifestCache<S> {
    pub fn new(source: S, links: LinkBuilder) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                links,
                state: Mutex::new(CacheState::default()),
            }),
        }
    }

    // ========================================================================
    // Summary
    // ========================================================================

    /// Cached summary, or the result of the (single) fetch for it.
    pub async fn try_summary(&self) -> SummaryResult {
        let pending = {
            let mut state = self.inner.state.lock();
            if let Some(summary) = &state.summary {
                return Ok(Arc::clone(summary));
            }
            state
                .summary_pending
                .get_or_insert_with(|| self.fetch_summary())
                .clone()
        };
        pending.await
    }

    /// Like [`try_summary`](Self::try_summary), with failures as `None`.
    pub async fn summary(&self) -> Option<Arc<OutputSummary>> {
        self.try_summary().await.ok()
    }

    fn fetch_summary(&self) -> Pending<SummaryResult> {
        let inner = Arc::clone(&self.inner);
        async move {
            let _settle = SettleGuard::new(&inner.state, |state| state.summary_pending = None);

            let result = inner.source.fetch_summary().await.map(Arc::new);
            match &result {
                Ok(summary) => inner.state.lock().summary = Some(Arc::clone(summary)),
                Err(err) => log!("cache"; "summary unavailable: {err}"),
            }
            result
        }
        .boxed()
        .shared()
    }

    // ========================================================================
    // Manifests
    // ========================================================================

    /// Files of one output type, fetched at most once at a time.
    pub async fn try_manifest(&self, output: OutputType) -> ManifestResult {
        let pending = {
            let mut state = self.inner.state.lock();
            if let Some(files) = state.manifests.get(&output) {
                return Ok(Arc::clone(files));
            }
            state
                .pending
                .entry(output)
                .or_insert_with(|| self.fetch_manifest(output))
                .clone()
        };
        pending.await
    }

    /// Like [`try_manifest`](Self::try_manifest), with failures as an empty list.
    pub async fn manifest(&self, output: OutputType) -> Arc<[FileItem]> {
        self.try_manifest(output)
            .await
            .unwrap_or_else(|_| Vec::new().into())
    }

    fn fetch_manifest(&self, output: OutputType) -> Pending<ManifestResult> {
        let inner = Arc::clone(&self.inner);
        async move {
            let _settle = SettleGuard::new(&inner.state, move |state| {
                state.pending.remove(&output);
            });

            let result = inner.source.fetch_manifest(output).await.map(|manifest| {
                let files = manifest.into_files(output, inner.source.base_url(), &inner.links);
                Arc::<[FileItem]>::from(files)
            });
            match &result {
                Ok(files) => {
                    inner.state.lock().manifests.insert(output, Arc::clone(files));
                }
                Err(err) => log!("cache"; "{output} manifest unavailable: {err}"),
            }
            result
        }
        .boxed()
        .shared()
    }

    // ========================================================================
    // Eviction
    // ========================================================================

    /// Drop the stored files of one output type.
    pub fn evict(&self, output: OutputType) {
        self.inner.state.lock().manifests.remove(&output);
    }

    /// Drop every stored manifest and the summary.
    pub fn evict_all(&self) {
        let mut state = self.inner.state.lock();
        state.manifests.clear();
        state.summary = None;
    }

    pub fn is_cached(&self, output: OutputType) -> bool {
        self.inner.state.lock().manifests.contains_key(&output)
    }

    pub fn is_pending(&self, output: OutputType) -> bool {
        self.inner.state.lock().pending.contains_key(&output)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::outputs::{OutputCounts, OutputManifest};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// In-memory source that counts fetches and can hold them open.
    #[derive(Default)]
    pub(crate) struct FakeSource {
        pub manifests: Mutex<HashMap<OutputType, Result<OutputManifest, FetchError>>>,
        pub summary: Mutex<Option<Result<OutputSummary, FetchError>>>,
        pub manifest_calls: Mutex<HashMap<OutputType, usize>>,
        pub summary_calls: AtomicUsize,
        pub gate: Option<Arc<Notify>>,
    }

    impl FakeSource {
        pub fn with_manifest(self, output: OutputType, json: &str) -> Self {
            let manifest = serde_json::from_str(json).unwrap();
            self.manifests.lock().insert(output, Ok(manifest));
            self
        }

        pub fn with_summary(self, summary: OutputSummary) -> Self {
            *self.summary.lock() = Some(Ok(summary));
            self
        }

        pub fn fail(&self, output: OutputType) {
            self.manifests.lock().insert(output, Err(not_found(output.slug())));
        }

        pub fn calls(&self, output: OutputType) -> usize {
            self.manifest_calls.lock().get(&output).copied().unwrap_or(0)
        }

        async fn suspend(&self) {
            match &self.gate {
                Some(gate) => gate.notified().await,
                None => tokio::task::yield_now().await,
            }
        }
    }

    fn not_found(what: &str) -> FetchError {
        FetchError::Status {
            url: format!("/outputs/{what}"),
            status: 404,
        }
    }

    #[async_trait]
    impl ManifestSource for FakeSource {
        async fn fetch_summary(&self) -> Result<OutputSummary, FetchError> {
            self.summary_calls.fetch_add(1, Ordering::SeqCst);
            self.suspend().await;
            self.summary
                .lock()
                .clone()
                .unwrap_or_else(|| Err(not_found("summary.json")))
        }

        async fn fetch_manifest(&self, output: OutputType) -> Result<OutputManifest, FetchError> {
            *self.manifest_calls.lock().entry(output).or_default() += 1;
            self.suspend().await;
            self.manifests
                .lock()
                .get(&output)
                .cloned()
                .unwrap_or_else(|| Err(not_found(output.slug())))
        }

        fn base_url(&self) -> &str {
            "/outputs"
        }
    }

    impl ManifestCache<FakeSource> {
        pub(crate) fn source_calls(&self, output: OutputType) -> usize {
            self.inner.source.calls(output)
        }

        pub(crate) fn summary_calls(&self) -> usize {
            self.inner.source.summary_calls.load(Ordering::SeqCst)
        }

        pub(crate) fn set_manifest(&self, output: OutputType, json: &str) {
            let manifest = serde_json::from_str(json).unwrap();
            self.inner.source.manifests.lock().insert(output, Ok(manifest));
        }
    }

    pub(crate) const CALCULUS: &str =
        r#"{"categories": {"calculus": [{"filename": "deriv.ipynb", "title": "Derivatives"}]}}"#;

    pub(crate) const TWO_BY_TWO: &str = r#"{"categories": {
        "a": [{"filename": "f1"}, {"filename": "f2"}],
        "b": [{"filename": "f1"}, {"filename": "f2"}]
    }}"#;

    fn cache(source: FakeSource) -> ManifestCache<FakeSource> {
        ManifestCache::new(source, LinkBuilder::default())
    }

    #[tokio::test]
    async fn test_concurrent_manifest_requests_share_one_fetch() {
        let cache = cache(FakeSource::default().with_manifest(OutputType::Colab, CALCULUS));

        let (a, b, c) = tokio::join!(
            cache.manifest(OutputType::Colab),
            cache.manifest(OutputType::Colab),
            cache.manifest(OutputType::Colab),
        );

        assert_eq!(cache.source_calls(OutputType::Colab), 1);
        assert!(Arc::ptr_eq(&a, &b) && Arc::ptr_eq(&b, &c));
        assert!(!cache.is_pending(OutputType::Colab));
        assert!(cache.is_cached(OutputType::Colab));
    }

    #[tokio::test]
    async fn test_cached_manifest_not_refetched() {
        let cache = cache(FakeSource::default().with_manifest(OutputType::Latex, TWO_BY_TWO));

        let first = cache.manifest(OutputType::Latex).await;
        let second = cache.manifest(OutputType::Latex).await;

        assert_eq!(cache.source_calls(OutputType::Latex), 1);
        assert!(Arc::ptr_eq(&first, &second));
        let paths: Vec<_> = first.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["a/f1", "a/f2", "b/f1", "b/f2"]);
    }

    #[tokio::test]
    async fn test_failure_returns_empty_and_is_retried() {
        let cache = cache(FakeSource::default());

        assert!(cache.manifest(OutputType::Vue).await.is_empty());
        assert!(!cache.is_cached(OutputType::Vue));
        assert!(!cache.is_pending(OutputType::Vue));

        // Artifact shows up later; the next call fetches again
        cache.set_manifest(OutputType::Vue, TWO_BY_TWO);
        assert_eq!(cache.manifest(OutputType::Vue).await.len(), 4);
        assert_eq!(cache.source_calls(OutputType::Vue), 2);
    }

    #[tokio::test]
    async fn test_failure_is_isolated_per_type() {
        let cache = cache(FakeSource::default().with_manifest(OutputType::Json, TWO_BY_TWO));
        cache.inner.source.fail(OutputType::Latex);

        let (latex, json) = tokio::join!(
            cache.try_manifest(OutputType::Latex),
            cache.try_manifest(OutputType::Json),
        );

        assert!(latex.is_err());
        assert_eq!(json.unwrap().len(), 4);
        assert!(cache.is_cached(OutputType::Json));
        assert!(!cache.is_cached(OutputType::Latex));
    }

    #[tokio::test]
    async fn test_concurrent_waiters_share_failure() {
        let cache = cache(FakeSource::default());

        let (a, b) = tokio::join!(
            cache.try_manifest(OutputType::Mdbook),
            cache.try_manifest(OutputType::Mdbook),
        );

        assert_eq!(a, b);
        assert!(a.is_err());
        assert_eq!(cache.source_calls(OutputType::Mdbook), 1);
    }

    #[tokio::test]
    async fn test_evict_single_type() {
        let cache = cache(
            FakeSource::default()
                .with_manifest(OutputType::Colab, CALCULUS)
                .with_manifest(OutputType::Latex, TWO_BY_TWO),
        );
        cache.manifest(OutputType::Colab).await;
        cache.manifest(OutputType::Latex).await;

        cache.evict(OutputType::Colab);

        assert!(!cache.is_cached(OutputType::Colab));
        assert!(cache.is_cached(OutputType::Latex));
        cache.manifest(OutputType::Colab).await;
        assert_eq!(cache.source_calls(OutputType::Colab), 2);
        assert_eq!(cache.source_calls(OutputType::Latex), 1);
    }

    #[tokio::test]
    async fn test_evict_does_not_cancel_running_fetch() {
        let gate = Arc::new(Notify::new());
        let source = FakeSource {
            gate: Some(Arc::clone(&gate)),
            ..FakeSource::default()
        }
        .with_manifest(OutputType::Colab, CALCULUS);
        let cache = cache(source);

        let background = cache.clone();
        let task = tokio::spawn(async move { background.manifest(OutputType::Colab).await });
        tokio::task::yield_now().await;
        assert!(cache.is_pending(OutputType::Colab));

        cache.evict_all();
        gate.notify_one();

        assert_eq!(task.await.unwrap().len(), 1);
        assert!(cache.is_cached(OutputType::Colab));
        assert!(!cache.is_pending(OutputType::Colab));
    }

    #[tokio::test]
    async fn test_summary_loaded_once() {
        let mut summary = OutputSummary::default();
        summary.outputs.insert(
            "colab".into(),
            OutputCounts {
                total_files: 3,
                categories: 2,
            },
        );
        let cache = cache(FakeSource::default().with_summary(summary));

        let (a, b) = tokio::join!(cache.summary(), cache.summary());
        let c = cache.summary().await;

        assert_eq!(cache.summary_calls(), 1);
        assert_eq!(a.unwrap().counts(OutputType::Colab).total_files, 3);
        assert!(Arc::ptr_eq(&b.unwrap(), &c.unwrap()));
    }

    #[tokio::test]
    async fn test_summary_failure_not_cached() {
        let cache = cache(FakeSource::default());

        assert!(cache.summary().await.is_none());
        assert!(cache.summary().await.is_none());
        assert_eq!(cache.summary_calls(), 2);
    }

    #[tokio::test]
    async fn test_evict_all_drops_summary() {
        let cache = cache(FakeSource::default().with_summary(OutputSummary::default()));
        cache.summary().await;
        cache.evict_all();
        cache.summary().await;
        assert_eq!(cache.summary_calls(), 2);
    }
}
