//! Core types and traits for loadscan.
//!
//! This crate provides the host-facing vocabulary shared by the scanning
//! engine and its integrations: element identities, the [`Host`] trait that
//! bundles the external collaborators, matchers, configuration, and the
//! statistics and events a scan reports.

mod config;
mod element;
mod error;
mod host;
mod matcher;
mod report;
mod snapshot;

pub use config::{DEFAULT_LEAF_THRESHOLD, DEFAULT_TIMEOUT_MS, ScanConfig, ScanConfigBuilder};
pub use element::{Element, ElementId, LoadedUnit, Owner, OwnerId};
pub use error::{InspectError, ScanError};
pub use host::{Host, StructuralView};
pub use matcher::{Always, And, FnMatcher, Matcher, MatcherExt, Never, Not, Or, always, from_fn, never};
pub use report::{ScanEvent, ScanMode, ScanReport, ScanStats};
pub use snapshot::{Snapshot, SnapshotIter};
