//! Matchers: predicates over structural views.
//!
//! The predicate language itself belongs to the host; this module only
//! defines the capability the engine consumes plus the handful of
//! combinators needed to compose it with the engine's own eligibility test.

use std::sync::Arc;

/// A predicate evaluated against one element's structural view.
///
/// Implementations are expected to be pure but the engine does not rely on
/// it: a matcher that panics only loses the element it panicked on. As with
/// [`Host::inspect`](crate::Host::inspect), the panic hook still reports
/// the panic before the engine catches it.
pub trait Matcher<V: ?Sized>: Send + Sync {
    /// Returns `true` if the view matches.
    fn matches(&self, view: &V) -> bool;
}

impl<V: ?Sized, M: Matcher<V> + ?Sized> Matcher<V> for &M {
    fn matches(&self, view: &V) -> bool {
        (**self).matches(view)
    }
}

impl<V: ?Sized, M: Matcher<V> + ?Sized> Matcher<V> for Box<M> {
    fn matches(&self, view: &V) -> bool {
        (**self).matches(view)
    }
}

impl<V: ?Sized, M: Matcher<V> + ?Sized> Matcher<V> for Arc<M> {
    fn matches(&self, view: &V) -> bool {
        (**self).matches(view)
    }
}

/// Matcher backed by a closure. See [`from_fn`].
#[derive(Clone, Copy)]
pub struct FnMatcher<F>(F);

impl<V: ?Sized, F> Matcher<V> for FnMatcher<F>
where
    F: Fn(&V) -> bool + Send + Sync,
{
    fn matches(&self, view: &V) -> bool {
        (self.0)(view)
    }
}

/// Wrap a closure as a matcher.
pub fn from_fn<V: ?Sized, F>(f: F) -> FnMatcher<F>
where
    F: Fn(&V) -> bool + Send + Sync,
{
    FnMatcher(f)
}

/// Matches every view.
#[derive(Debug, Clone, Copy, Default)]
pub struct Always;

impl<V: ?Sized> Matcher<V> for Always {
    fn matches(&self, _view: &V) -> bool {
        true
    }
}

/// Matches no view.
#[derive(Debug, Clone, Copy, Default)]
pub struct Never;

impl<V: ?Sized> Matcher<V> for Never {
    fn matches(&self, _view: &V) -> bool {
        false
    }
}

/// Create a matcher that accepts everything.
pub fn always() -> Always {
    Always
}

/// Create a matcher that accepts nothing.
pub fn never() -> Never {
    Never
}

/// Logical AND; the right side is not evaluated when the left rejects.
#[derive(Debug, Clone, Copy)]
pub struct And<A, B>(A, B);

impl<V: ?Sized, A: Matcher<V>, B: Matcher<V>> Matcher<V> for And<A, B> {
    fn matches(&self, view: &V) -> bool {
        self.0.matches(view) && self.1.matches(view)
    }
}

/// Logical OR; the right side is not evaluated when the left accepts.
#[derive(Debug, Clone, Copy)]
pub struct Or<A, B>(A, B);

impl<V: ?Sized, A: Matcher<V>, B: Matcher<V>> Matcher<V> for Or<A, B> {
    fn matches(&self, view: &V) -> bool {
        self.0.matches(view) || self.1.matches(view)
    }
}

/// Logical negation.
#[derive(Debug, Clone, Copy)]
pub struct Not<A>(A);

impl<V: ?Sized, A: Matcher<V>> Matcher<V> for Not<A> {
    fn matches(&self, view: &V) -> bool {
        !self.0.matches(view)
    }
}

/// Combinators available on every matcher.
pub trait MatcherExt<V: ?Sized>: Matcher<V> + Sized {
    /// Match only when both `self` and `other` match.
    fn and<M: Matcher<V>>(self, other: M) -> And<Self, M> {
        And(self, other)
    }

    /// Match when either `self` or `other` matches.
    fn or<M: Matcher<V>>(self, other: M) -> Or<Self, M> {
        Or(self, other)
    }

    /// Invert this matcher.
    fn not(self) -> Not<Self> {
        Not(self)
    }
}

impl<V: ?Sized, M: Matcher<V>> MatcherExt<V> for M {}
