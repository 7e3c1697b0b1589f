//! Self-family exclusion.

use std::collections::HashSet;

use globset::GlobSet;

use loadscan_core::{Element, OwnerId, ScanConfig, ScanError};

/// Recognizes elements that belong to the scanner itself.
///
/// An element is a family member when its name matches one of the family
/// patterns, or when its live owner is one of the family owners. Members are
/// never matched, whatever the predicate says.
#[derive(Debug, Clone)]
pub struct FamilyFilter {
    patterns: GlobSet,
    owners: HashSet<OwnerId>,
}

impl FamilyFilter {
    /// Build the filter from a scan config.
    pub fn from_config(config: &ScanConfig) -> Result<Self, ScanError> {
        Ok(Self {
            patterns: config.family_globs()?,
            owners: config.family_owners.iter().copied().collect(),
        })
    }

    /// A filter that recognizes nothing.
    pub fn empty() -> Self {
        Self {
            patterns: GlobSet::empty(),
            owners: HashSet::new(),
        }
    }

    /// Check whether `element` is part of the scanner's family.
    pub fn is_member<E: Element>(&self, element: &E) -> bool {
        if self.patterns.is_match(element.name()) {
            return true;
        }
        // Skip the weak upgrade when no owners are configured.
        !self.owners.is_empty()
            && element
                .owner_id()
                .is_some_and(|owner| self.owners.contains(&owner))
    }
}
