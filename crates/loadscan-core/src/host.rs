//! The host integration seam.

use crate::element::Element;
use crate::error::InspectError;

/// Inspectable form of one element, built on demand by the host.
pub trait StructuralView: Send {
    /// Name of the element this view describes.
    fn name(&self) -> &str;

    /// Whether the element is compiler or runtime generated.
    ///
    /// Generated elements are never eligible for modification.
    fn is_synthetic(&self) -> bool {
        false
    }
}

/// The live system whose collection is being scanned.
///
/// A host bundles the collaborators the engine does not implement itself:
/// the snapshot source, the modifiability test and the structural view
/// builder. Implementations are called concurrently from worker threads.
pub trait Host: Send + Sync + 'static {
    /// Handle type of the collection's elements.
    type Element: Element;

    /// Structural view produced by [`Host::inspect`].
    type View: StructuralView;

    /// Capture the current collection, in the host's own order.
    fn snapshot(&self) -> Vec<Self::Element>;

    /// Whether the host allows `element` to be modified.
    ///
    /// Only consulted by eligible scans. A panic here excludes `element`
    /// as an inspection failure.
    fn is_modifiable(&self, element: &Self::Element) -> bool;

    /// Build the structural view of `element`.
    ///
    /// May fail for any single element, and may panic. The engine isolates
    /// both and logs the failure at debug level. The process panic hook
    /// still runs for an isolated panic, so a host that wants those
    /// messages off stderr installs its own with [`std::panic::set_hook`].
    fn inspect(&self, element: &Self::Element) -> Result<Self::View, InspectError>;
}
