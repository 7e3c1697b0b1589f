//! Parallel, fault-isolated scanning engine for loadscan.
//!
//! This crate evaluates a pluggable [`Matcher`] against every element a
//! [`Host`] currently has loaded and returns the ones that match.
//!
//! # Overview
//!
//! - **Fork/join traversal** of an immutable snapshot on a long-lived rayon pool
//! - **Per-element fault isolation**: inspection errors and panics only drop
//!   the element they happened on
//! - **Bounded wall time** with cooperative cancellation of in-flight work
//! - **Self-family exclusion** so the scanner never reports its own elements
//! - **Reentrancy guard** signalled around every scan
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use loadscan_scan::{LoadedDataSource, from_fn};
//!
//! let source = LoadedDataSource::new(Arc::new(my_host))?;
//! let services = source.find_matching(from_fn(|view: &MyView| view.name().ends_with("Service")));
//! let patchable = source.find_eligible_matching(from_fn(|view: &MyView| view.name().ends_with("Service")));
//! ```
//!
//! # Empty results
//!
//! `find_matching` and `find_eligible_matching` return an empty list both
//! when nothing matched and when the scan timed out. Call
//! [`LoadedDataSource::scan`] when the difference matters:
//!
//! ```rust,ignore
//! use loadscan_scan::{ScanError, ScanMode, always};
//!
//! match source.scan(ScanMode::All, always()) {
//!     Ok(report) => println!("{} matched in {:?}", report.len(), report.elapsed),
//!     Err(ScanError::Timeout { timeout_ms }) => eprintln!("gave up after {timeout_ms}ms"),
//!     Err(err) => eprintln!("scan failed: {err}"),
//! }
//! ```

mod eligibility;
mod family;
mod governor;
mod guard;
mod source;
mod task;

pub use eligibility::EligibilityMatcher;
pub use family::FamilyFilter;
pub use governor::TimeoutGovernor;
pub use guard::{NoopGuard, ProtectScope, ReentrancyGuard, ThreadProtector};
pub use source::LoadedDataSource;

// Re-export core types for convenience
pub use loadscan_core::{
    Element, ElementId, Host, InspectError, LoadedUnit, Matcher, MatcherExt, Owner, OwnerId,
    ScanConfig, ScanError, ScanEvent, ScanMode, ScanReport, ScanStats, Snapshot, StructuralView,
    always, from_fn, never,
};
pub use tokio_util::sync::CancellationToken;
