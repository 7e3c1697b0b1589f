//! Reentrancy guard integration.
//!
//! A scan may run inside an instrumented host whose hooks would themselves
//! ask for a scan. The host's guard is told when a scan starts and ends so
//! it can suppress those nested requests; the engine only guarantees that
//! every `enter` is paired with exactly one `exit`.

use std::cell::Cell;
use std::fmt;

/// Boundary signals around a protected scan.
pub trait ReentrancyGuard: Send + Sync {
    /// The calling thread is entering a protected scan.
    fn enter(&self);

    /// The calling thread has left a protected scan.
    fn exit(&self);
}

/// Scoped acquisition of a [`ReentrancyGuard`].
///
/// `exit` runs on drop, so it fires on early returns, timeouts and while
/// unwinding from a panic.
#[must_use = "the guard is released as soon as the scope is dropped"]
pub struct ProtectScope<'a> {
    guard: &'a dyn ReentrancyGuard,
}

impl<'a> ProtectScope<'a> {
    /// Signal `enter` and return the scope that will signal `exit`.
    pub fn enter(guard: &'a dyn ReentrancyGuard) -> Self {
        guard.enter();
        Self { guard }
    }
}

impl Drop for ProtectScope<'_> {
    fn drop(&mut self) {
        self.guard.exit();
    }
}

impl fmt::Debug for ProtectScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtectScope").finish_non_exhaustive()
    }
}

thread_local! {
    static PROTECT_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Guard that tracks protection depth per thread.
///
/// Host hooks call [`ThreadProtector::is_protecting`] to find out whether
/// they are running underneath a scan on the same thread.
///
/// Only the thread that called into the scan is marked. Inspection and
/// matching run on the source's worker pool, where the depth stays 0;
/// hooks that must recognise those calls can match the worker thread
/// name against [`ScanConfig::thread_name_prefix`](loadscan_core::ScanConfig).
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadProtector;

impl ThreadProtector {
    /// Create a protector.
    pub fn new() -> Self {
        Self
    }

    /// Current nesting depth on the calling thread.
    pub fn depth(&self) -> usize {
        PROTECT_DEPTH.with(Cell::get)
    }

    /// Whether the calling thread is inside a protected scan.
    pub fn is_protecting(&self) -> bool {
        self.depth() > 0
    }
}

impl ReentrancyGuard for ThreadProtector {
    fn enter(&self) {
        PROTECT_DEPTH.with(|depth| depth.set(depth.get() + 1));
    }

    fn exit(&self) {
        PROTECT_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Guard for hosts without instrumentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopGuard;

impl ReentrancyGuard for NoopGuard {
    fn enter(&self) {}

    fn exit(&self) {}
}
