//! Public scan API over a host's loaded elements.

use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use loadscan_core::{
    Element, ElementId, Host, Matcher, ScanConfig, ScanError, ScanEvent, ScanMode, ScanReport,
    ScanStats, Snapshot, SnapshotIter,
};

use crate::family::FamilyFilter;
use crate::governor::TimeoutGovernor;
use crate::guard::{ProtectScope, ReentrancyGuard, ThreadProtector};
use crate::task::{ScanContext, ScanTask};

const EVENT_CHANNEL_SIZE: usize = 64;

/// Lists and searches the elements currently loaded in a host.
///
/// Owns a long-lived worker pool that every scan through this source
/// reuses. The listing operations never fail: when a scan cannot finish
/// (timeout, cancellation, lost worker) they return an empty result, so an
/// empty result means either "nothing matched" or "the scan did not
/// complete". Use [`LoadedDataSource::scan`] to tell the two apart.
pub struct LoadedDataSource<H: Host> {
    host: Arc<H>,
    config: ScanConfig,
    family: Arc<FamilyFilter>,
    governor: TimeoutGovernor,
    guard: Arc<dyn ReentrancyGuard>,
    pool: ThreadPool,
    events_tx: broadcast::Sender<ScanEvent>,
}

impl<H: Host> LoadedDataSource<H> {
    /// Create a data source with default configuration.
    pub fn new(host: Arc<H>) -> Result<Self, ScanError> {
        Self::with_config(host, ScanConfig::new())
    }

    /// Create a data source, building its worker pool.
    pub fn with_config(host: Arc<H>, config: ScanConfig) -> Result<Self, ScanError> {
        if config.leaf_threshold == 0 || config.timeout_ms == 0 {
            return Err(ScanError::InvalidConfig {
                message: "leaf threshold and timeout must be non-zero".to_string(),
            });
        }
        let family = Arc::new(FamilyFilter::from_config(&config)?);

        let prefix = config.thread_name_prefix.clone();
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .thread_name(move |i| format!("{prefix}-{i}"))
            .build()
            .map_err(|e| ScanError::PoolBuild {
                message: e.to_string(),
            })?;

        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);

        Ok(Self {
            host,
            governor: TimeoutGovernor::new(config.timeout()),
            config,
            family,
            guard: Arc::new(ThreadProtector::new()),
            pool,
            events_tx,
        })
    }

    /// Replace the reentrancy guard signalled around every scan.
    pub fn with_guard(mut self, guard: Arc<dyn ReentrancyGuard>) -> Self {
        self.guard = guard;
        self
    }

    /// Subscribe to the terminal event of every subsequent scan.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.events_tx.subscribe()
    }

    /// The configuration this source was built with.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Number of worker threads in the pool.
    pub fn worker_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Every element currently loaded, in host order, without duplicates.
    ///
    /// No matcher and no exclusion applies; this is a plain listing.
    pub fn list_all(&self) -> Vec<H::Element> {
        let mut unique: IndexMap<ElementId, H::Element> = IndexMap::new();
        for element in self.host.snapshot() {
            unique.entry(element.id()).or_insert(element);
        }
        unique.into_values().collect()
    }

    /// Walk a fresh snapshot of the loaded elements lazily.
    pub fn iter_loaded(&self) -> SnapshotIter<H::Element> {
        Snapshot::capture(self.host.as_ref()).into_iter()
    }

    /// Elements matching `matcher`, in snapshot order, excluding the
    /// scanner's own family. Empty if the scan could not complete.
    pub fn find_matching<M>(&self, matcher: M) -> Vec<H::Element>
    where
        M: Matcher<H::View> + 'static,
    {
        self.find_or_empty(ScanMode::All, matcher)
    }

    /// Like [`find_matching`](Self::find_matching), additionally excluding
    /// elements the host does not allow to be modified.
    pub fn find_eligible_matching<M>(&self, matcher: M) -> Vec<H::Element>
    where
        M: Matcher<H::View> + 'static,
    {
        self.find_or_empty(ScanMode::Eligible, matcher)
    }

    /// Unrestricted matches keyed by identity, first occurrence first.
    pub fn find_set<M>(&self, matcher: M) -> IndexMap<ElementId, H::Element>
    where
        M: Matcher<H::View> + 'static,
    {
        let mut set = IndexMap::new();
        for element in self.find_or_empty(ScanMode::All, matcher) {
            set.entry(element.id()).or_insert(element);
        }
        set
    }

    /// Run one scan and report why it failed, if it did.
    pub fn scan<M>(&self, mode: ScanMode, matcher: M) -> Result<ScanReport<H::Element>, ScanError>
    where
        M: Matcher<H::View> + 'static,
    {
        self.scan_with_cancel(mode, matcher, &CancellationToken::new())
    }

    /// Run one scan that `cancel` can abort early.
    ///
    /// Cancelling discards the partial result and yields
    /// [`ScanError::Cancelled`].
    pub fn scan_with_cancel<M>(
        &self,
        mode: ScanMode,
        matcher: M,
        cancel: &CancellationToken,
    ) -> Result<ScanReport<H::Element>, ScanError>
    where
        M: Matcher<H::View> + 'static,
    {
        let _scope = ProtectScope::enter(self.guard.as_ref());
        let start = Instant::now();

        let snapshot = Snapshot::capture(self.host.as_ref());
        let snapshot_len = snapshot.len();
        if cancel.is_cancelled() {
            return Err(self.fail(mode, ScanError::Cancelled, snapshot_len));
        }
        if snapshot.is_empty() {
            return Ok(self.complete(mode, Vec::new(), ScanStats::new(), 0, start));
        }

        let token = cancel.child_token();
        let ctx = ScanContext {
            host: Arc::clone(&self.host),
            matcher,
            snapshot,
            family: Arc::clone(&self.family),
            mode,
            allow_unsafe: self.config.allow_unsafe,
            leaf_threshold: self.config.leaf_threshold,
            cancel: token.clone(),
        };

        let result = self
            .governor
            .run(&self.pool, &token, move || ScanTask::root(&ctx).compute());

        match result {
            Ok(output) => Ok(self.complete(mode, output.matched, output.stats, snapshot_len, start)),
            Err(err) => Err(self.fail(mode, err, snapshot_len)),
        }
    }

    fn find_or_empty<M>(&self, mode: ScanMode, matcher: M) -> Vec<H::Element>
    where
        M: Matcher<H::View> + 'static,
    {
        self.scan(mode, matcher)
            .map(|report| report.matched)
            .unwrap_or_default()
    }

    fn fail(&self, mode: ScanMode, err: ScanError, snapshot_len: usize) -> ScanError {
        let event = match &err {
            ScanError::Timeout { timeout_ms } => {
                info!(%mode, timeout_ms = *timeout_ms, snapshot_len, "scan timed out, discarding results");
                ScanEvent::TimedOut {
                    mode,
                    timeout_ms: *timeout_ms,
                }
            }
            ScanError::Cancelled => {
                info!(%mode, "scan cancelled by caller");
                ScanEvent::Cancelled { mode }
            }
            other => {
                info!(%mode, error = %other, "scan failed");
                ScanEvent::Failed {
                    mode,
                    reason: other.to_string(),
                }
            }
        };
        let _ = self.events_tx.send(event);
        err
    }

    fn complete(
        &self,
        mode: ScanMode,
        matched: Vec<H::Element>,
        stats: ScanStats,
        snapshot_len: usize,
        start: Instant,
    ) -> ScanReport<H::Element> {
        let elapsed = start.elapsed();
        debug!(
            %mode,
            snapshot_len,
            matched = stats.matched,
            excluded = stats.total_excluded(),
            leaves = stats.leaves,
            elapsed_ms = elapsed.as_millis() as u64,
            "scan complete"
        );
        let _ = self.events_tx.send(ScanEvent::Completed {
            mode,
            stats,
            elapsed_ms: elapsed.as_millis() as u64,
        });
        ScanReport {
            matched,
            stats,
            snapshot_len,
            elapsed,
        }
    }
}

impl<H: Host> std::fmt::Debug for LoadedDataSource<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedDataSource")
            .field("config", &self.config)
            .field("workers", &self.pool.current_num_threads())
            .finish_non_exhaustive()
    }
}
