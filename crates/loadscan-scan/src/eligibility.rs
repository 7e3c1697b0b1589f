//! Eligibility test applied in [`ScanMode::Eligible`](loadscan_core::ScanMode) scans.

use loadscan_core::{Element, Matcher, StructuralView};

/// Rejects elements that must never be offered for modification.
///
/// Built per element, then combined with the caller's matcher so the two run
/// as one predicate over the element's view. Generated elements are always
/// rejected; root-context elements (no live owner) are rejected unless
/// unsafe mode is enabled.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityMatcher {
    has_owner: bool,
    allow_unsafe: bool,
}

impl EligibilityMatcher {
    /// Create the test for one element.
    pub fn for_element<E: Element>(element: &E, allow_unsafe: bool) -> Self {
        Self {
            has_owner: element.owner().is_some(),
            allow_unsafe,
        }
    }
}

impl<V: StructuralView> Matcher<V> for EligibilityMatcher {
    fn matches(&self, view: &V) -> bool {
        !view.is_synthetic() && (self.has_owner || self.allow_unsafe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadscan_core::{ElementId, LoadedUnit, Owner, OwnerId};

    struct View {
        synthetic: bool,
    }

    impl StructuralView for View {
        fn name(&self) -> &str {
            "view"
        }

        fn is_synthetic(&self) -> bool {
            self.synthetic
        }
    }

    const PLAIN: View = View { synthetic: false };
    const GENERATED: View = View { synthetic: true };

    #[test]
    fn test_owned_element_is_eligible() {
        let owner = Owner::new(OwnerId::new(1), "app");
        let unit = LoadedUnit::new(ElementId::new(1), "app::Main", &owner);
        let test = EligibilityMatcher::for_element(&unit, false);

        assert!(test.matches(&PLAIN));
        assert!(!test.matches(&GENERATED));
    }

    #[test]
    fn test_rooted_element_needs_unsafe() {
        let unit = LoadedUnit::rooted(ElementId::new(1), "core::String");

        assert!(!EligibilityMatcher::for_element(&unit, false).matches(&PLAIN));
        assert!(EligibilityMatcher::for_element(&unit, true).matches(&PLAIN));
        assert!(!EligibilityMatcher::for_element(&unit, true).matches(&GENERATED));
    }
}
