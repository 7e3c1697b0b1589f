//! Element identities and owning contexts.

use std::sync::{Arc, Weak};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Unique identifier for an element of the host collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl ElementId {
    /// Create a new ElementId from a u64.
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Unique identifier for an owning context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerId(pub u64);

impl OwnerId {
    /// Create a new OwnerId from a u64.
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

/// The context that defined an element (a loader, a module, a namespace).
///
/// Elements only keep a weak reference to their owner: once the host tears
/// the context down, [`Element::owner`] starts returning `None`.
#[derive(Debug)]
pub struct Owner {
    id: OwnerId,
    name: CompactString,
}

impl Owner {
    /// Create a new shared owner.
    pub fn new(id: OwnerId, name: impl Into<CompactString>) -> Arc<Self> {
        Arc::new(Self {
            id,
            name: name.into(),
        })
    }

    /// Get the owner's identifier.
    pub fn id(&self) -> OwnerId {
        self.id
    }

    /// Get the owner's display name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Opaque handle to one unit of the host collection.
///
/// The scanner never owns elements; it clones handles out of a snapshot and
/// hands matched ones back to the caller.
pub trait Element: Clone + Send + Sync + 'static {
    /// Stable identity of this element.
    fn id(&self) -> ElementId;

    /// Fully qualified name, used by the self-family exclusion test.
    fn name(&self) -> &str;

    /// Upgrade the back-reference to the owning context.
    ///
    /// `None` means the element lives in the root context or its owner is gone.
    fn owner(&self) -> Option<Arc<Owner>>;

    /// Identifier of the owning context, if it is still alive.
    fn owner_id(&self) -> Option<OwnerId> {
        self.owner().map(|o| o.id())
    }
}

/// A ready-made element record for hosts without their own handle type.
#[derive(Debug, Clone)]
pub struct LoadedUnit {
    id: ElementId,
    name: CompactString,
    owner: Weak<Owner>,
}

impl LoadedUnit {
    /// Create a unit defined by `owner`.
    pub fn new(id: ElementId, name: impl Into<CompactString>, owner: &Arc<Owner>) -> Self {
        Self {
            id,
            name: name.into(),
            owner: Arc::downgrade(owner),
        }
    }

    /// Create a unit that lives in the root context.
    pub fn rooted(id: ElementId, name: impl Into<CompactString>) -> Self {
        Self {
            id,
            name: name.into(),
            owner: Weak::new(),
        }
    }
}

impl Element for LoadedUnit {
    fn id(&self) -> ElementId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn owner(&self) -> Option<Arc<Owner>> {
        self.owner.upgrade()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_back_reference_is_weak() {
        let owner = Owner::new(OwnerId::new(7), "app");
        let unit = LoadedUnit::new(ElementId::new(1), "app::Main", &owner);

        assert_eq!(unit.owner_id(), Some(OwnerId::new(7)));
        assert_eq!(Arc::strong_count(&owner), 1);

        drop(owner);
        assert!(unit.owner().is_none());
        assert!(unit.owner_id().is_none());
    }

    #[test]
    fn test_rooted_unit_has_no_owner() {
        let unit = LoadedUnit::rooted(ElementId::new(2), "core::Object");
        assert_eq!(unit.name(), "core::Object");
        assert!(unit.owner().is_none());
    }
}
