//! Scan results, statistics and lifecycle events.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which listing a scan produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScanMode {
    /// Every matching element except the scanner's own.
    All,
    /// Matching elements the host also allows to be modified.
    Eligible,
}

impl ScanMode {
    /// Whether the host-modifiability exclusion applies.
    pub fn is_eligible(self) -> bool {
        matches!(self, Self::Eligible)
    }
}

/// Counters collected by one scan.
///
/// Every task produces its own copy; they are summed at join points so no
/// counter is ever shared between threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Snapshot indices processed by a leaf.
    pub visited: u64,
    /// Elements that matched.
    pub matched: u64,
    /// Elements rejected as members of the scanner's own family.
    pub skipped_family: u64,
    /// Elements rejected because the host declares them non-modifiable.
    pub skipped_unmodifiable: u64,
    /// Elements whose structural view could not be built.
    pub inspection_failures: u64,
    /// Elements whose matcher panicked.
    pub match_failures: u64,
    /// Leaf tasks executed.
    pub leaves: u64,
    /// Tasks that split into two children.
    pub forks: u64,
}

impl ScanStats {
    /// Create empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add another task's counters into this one.
    pub fn merge(&mut self, other: &ScanStats) {
        self.visited += other.visited;
        self.matched += other.matched;
        self.skipped_family += other.skipped_family;
        self.skipped_unmodifiable += other.skipped_unmodifiable;
        self.inspection_failures += other.inspection_failures;
        self.match_failures += other.match_failures;
        self.leaves += other.leaves;
        self.forks += other.forks;
    }

    /// Elements excluded for any reason other than simply not matching.
    pub fn total_excluded(&self) -> u64 {
        self.skipped_family
            + self.skipped_unmodifiable
            + self.inspection_failures
            + self.match_failures
    }
}

/// Outcome of a scan that ran to completion.
#[derive(Debug, Clone)]
pub struct ScanReport<E> {
    /// Matched elements in snapshot order.
    pub matched: Vec<E>,
    /// Counters summed over the task tree.
    pub stats: ScanStats,
    /// Size of the snapshot that was scanned.
    pub snapshot_len: usize,
    /// Wall time from submission to result.
    pub elapsed: Duration,
}

impl<E> ScanReport<E> {
    /// Number of matched elements.
    pub fn len(&self) -> usize {
        self.matched.len()
    }

    /// Check if nothing matched.
    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }
}

/// Terminal event published once per scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScanEvent {
    /// The scan finished within its time bound.
    Completed {
        mode: ScanMode,
        stats: ScanStats,
        elapsed_ms: u64,
    },
    /// The time bound elapsed; the result was discarded.
    TimedOut { mode: ScanMode, timeout_ms: u64 },
    /// The caller cancelled the scan.
    Cancelled { mode: ScanMode },
    /// The scan could not run or its worker was lost.
    Failed { mode: ScanMode, reason: String },
}

impl ScanEvent {
    /// The mode of the scan this event belongs to.
    pub fn mode(&self) -> ScanMode {
        match self {
            Self::Completed { mode, .. }
            | Self::TimedOut { mode, .. }
            | Self::Cancelled { mode }
            | Self::Failed { mode, .. } => *mode,
        }
    }
}
