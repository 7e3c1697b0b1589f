//! Divide-and-conquer scan tasks.
//!
//! A [`ScanTask`] covers a half-open index range of the snapshot. Ranges at
//! or below the leaf threshold are scanned serially; larger ranges split at
//! their midpoint and both halves run through `rayon::join`. Results are
//! concatenated left before right, so the output order is snapshot order no
//! matter how the pool schedules the halves.

use std::ops::Range;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use loadscan_core::{Element, Host, InspectError, Matcher, MatcherExt, ScanMode, ScanStats, Snapshot};

use crate::eligibility::EligibilityMatcher;
use crate::family::FamilyFilter;

/// Everything the tasks of one scan share. Read-only for the scan's lifetime.
pub(crate) struct ScanContext<H: Host, M> {
    pub host: Arc<H>,
    pub matcher: M,
    pub snapshot: Snapshot<H::Element>,
    pub family: Arc<FamilyFilter>,
    pub mode: ScanMode,
    pub allow_unsafe: bool,
    pub leaf_threshold: usize,
    pub cancel: CancellationToken,
}

/// What happened to one element.
#[derive(Debug)]
pub(crate) enum Verdict {
    Matched,
    Rejected,
    Family,
    Unmodifiable,
    InspectFailed(InspectError),
    MatchFailed(InspectError),
}

/// Matches and counters produced by one task.
#[derive(Debug)]
pub(crate) struct TaskOutput<E> {
    pub matched: Vec<E>,
    pub stats: ScanStats,
}

impl<E> TaskOutput<E> {
    fn empty() -> Self {
        Self {
            matched: Vec::new(),
            stats: ScanStats::new(),
        }
    }

    fn append(&mut self, mut right: TaskOutput<E>) {
        self.matched.append(&mut right.matched);
        self.stats.merge(&right.stats);
    }
}

/// One unit of divide-and-conquer work over `[range.start, range.end)`.
pub(crate) struct ScanTask<'a, H: Host, M> {
    ctx: &'a ScanContext<H, M>,
    range: Range<usize>,
}

impl<'a, H, M> ScanTask<'a, H, M>
where
    H: Host,
    M: Matcher<H::View>,
{
    /// The task covering the whole snapshot.
    pub fn root(ctx: &'a ScanContext<H, M>) -> Self {
        Self {
            ctx,
            range: 0..ctx.snapshot.len(),
        }
    }

    /// Run this task and every task it forks.
    pub fn compute(self) -> TaskOutput<H::Element> {
        let len = self.range.len();
        if len == 0 || self.ctx.cancel.is_cancelled() {
            return TaskOutput::empty();
        }
        if len <= self.ctx.leaf_threshold {
            return self.compute_leaf();
        }

        let (left, right) = self.split();
        trace!(left = ?left.range, right = ?right.range, "forking scan task");
        let (mut output, right) = rayon::join(|| left.compute(), || right.compute());
        output.append(right);
        output.stats.forks += 1;
        output
    }

    /// Split at the midpoint; the midpoint belongs to the right half.
    fn split(&self) -> (Self, Self) {
        let mid = self.range.start + self.range.len() / 2;
        (
            Self {
                ctx: self.ctx,
                range: self.range.start..mid,
            },
            Self {
                ctx: self.ctx,
                range: mid..self.range.end,
            },
        )
    }

    fn compute_leaf(&self) -> TaskOutput<H::Element> {
        let mut output = TaskOutput::empty();
        output.stats.leaves = 1;

        for index in self.range.clone() {
            if self.ctx.cancel.is_cancelled() {
                trace!(index, "scan cancelled, abandoning leaf");
                break;
            }
            let element = &self.ctx.snapshot[index];
            output.stats.visited += 1;

            match self.ctx.examine(element) {
                Verdict::Matched => {
                    output.stats.matched += 1;
                    output.matched.push(element.clone());
                }
                Verdict::Rejected => {}
                Verdict::Family => output.stats.skipped_family += 1,
                Verdict::Unmodifiable => output.stats.skipped_unmodifiable += 1,
                Verdict::InspectFailed(err) => {
                    debug!(element = element.name(), error = %err, "excluding element: inspection failed");
                    output.stats.inspection_failures += 1;
                }
                Verdict::MatchFailed(err) => {
                    debug!(element = element.name(), error = %err, "excluding element: matcher failed");
                    output.stats.match_failures += 1;
                }
            }
        }

        output
    }
}

impl<H, M> ScanContext<H, M>
where
    H: Host,
    M: Matcher<H::View>,
{
    /// Run the per-element pipeline: cheap exclusions first, then the
    /// structural view, then the matcher.
    pub fn examine(&self, element: &H::Element) -> Verdict {
        let excluded = catch_unwind(AssertUnwindSafe(|| {
            if self.family.is_member(element) {
                Some(Verdict::Family)
            } else if self.mode.is_eligible() && !self.host.is_modifiable(element) {
                Some(Verdict::Unmodifiable)
            } else {
                None
            }
        }));
        match excluded {
            Ok(Some(verdict)) => return verdict,
            Ok(None) => {}
            Err(payload) => {
                return Verdict::InspectFailed(InspectError::panicked(element.name(), payload.as_ref()));
            }
        }

        let view = match catch_unwind(AssertUnwindSafe(|| self.host.inspect(element))) {
            Ok(Ok(view)) => view,
            Ok(Err(err)) => return Verdict::InspectFailed(err),
            Err(payload) => {
                return Verdict::InspectFailed(InspectError::panicked(element.name(), payload.as_ref()));
            }
        };

        let matched = catch_unwind(AssertUnwindSafe(|| {
            if self.mode.is_eligible() {
                let eligible = EligibilityMatcher::for_element(element, self.allow_unsafe);
                MatcherExt::<H::View>::and(eligible, &self.matcher).matches(&view)
            } else {
                self.matcher.matches(&view)
            }
        }));

        match matched {
            Ok(true) => Verdict::Matched,
            Ok(false) => Verdict::Rejected,
            Err(payload) => Verdict::MatchFailed(InspectError::panicked(element.name(), payload.as_ref())),
        }
    }
}
