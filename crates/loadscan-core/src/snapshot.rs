//! Immutable captures of the host collection.

use std::ops::Index;
use std::sync::Arc;

use crate::element::Element;
use crate::host::Host;

/// Fixed, ordered capture of the collection, taken once per scan.
///
/// Cloning is cheap: every task of a scan shares the same backing slice.
/// The capture may be stale relative to the live collection; nothing
/// tries to reconcile it.
#[derive(Debug, Clone)]
pub struct Snapshot<E> {
    elements: Arc<[E]>,
}

impl<E: Element> Snapshot<E> {
    /// Capture the host's current collection.
    pub fn capture<H: Host<Element = E>>(host: &H) -> Self {
        Self::from(host.snapshot())
    }

    /// Number of captured elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the capture is empty.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Get the element at `index`.
    pub fn get(&self, index: usize) -> Option<&E> {
        self.elements.get(index)
    }

    /// View the capture as a slice.
    pub fn as_slice(&self) -> &[E] {
        &self.elements
    }

    /// Iterate over the captured elements by reference.
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.elements.iter()
    }
}

impl<E> From<Vec<E>> for Snapshot<E> {
    fn from(elements: Vec<E>) -> Self {
        Self {
            elements: elements.into(),
        }
    }
}

impl<E> Index<usize> for Snapshot<E> {
    type Output = E;

    fn index(&self, index: usize) -> &E {
        &self.elements[index]
    }
}

impl<E: Element> IntoIterator for Snapshot<E> {
    type Item = E;
    type IntoIter = SnapshotIter<E>;

    fn into_iter(self) -> SnapshotIter<E> {
        SnapshotIter {
            elements: self.elements,
            pos: 0,
        }
    }
}

/// Owning iterator over a snapshot; yields cloned handles.
#[derive(Debug, Clone)]
pub struct SnapshotIter<E> {
    elements: Arc<[E]>,
    pos: usize,
}

impl<E: Element> Iterator for SnapshotIter<E> {
    type Item = E;

    fn next(&mut self) -> Option<E> {
        let item = self.elements.get(self.pos)?.clone();
        self.pos += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.elements.len() - self.pos;
        (remaining, Some(remaining))
    }
}

impl<E: Element> ExactSizeIterator for SnapshotIter<E> {}
