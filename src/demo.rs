//! Synthetic host used by the command line.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use loadscan_core::{
    Element, ElementId, Host, InspectError, LoadedUnit, Owner, OwnerId, StructuralView,
};

/// Layout of the synthetic collection, in snapshot order: family members
/// first, then locked units, then units whose inspection fails, then
/// ordinary units.
#[derive(Debug, Clone, Copy)]
pub struct DemoLayout {
    pub elements: u64,
    pub family: u64,
    pub locked: u64,
    pub failing: u64,
    pub delay: Duration,
}

/// View produced by [`DemoHost`].
#[derive(Debug)]
pub struct DemoView {
    name: String,
}

impl StructuralView for DemoView {
    fn name(&self) -> &str {
        &self.name
    }
}

/// In-memory host standing in for a real runtime.
pub struct DemoHost {
    units: Vec<LoadedUnit>,
    locked: HashSet<ElementId>,
    failing: HashSet<ElementId>,
    delay: Duration,
    _owner: Arc<Owner>,
}

impl DemoHost {
    pub fn new(layout: DemoLayout) -> Self {
        let owner = Owner::new(OwnerId::new(1), "demo-app");
        let locked_from = layout.family;
        let failing_from = locked_from + layout.locked;
        let ordinary_from = failing_from + layout.failing;

        let mut locked = HashSet::new();
        let mut failing = HashSet::new();
        let units = (0..layout.elements)
            .map(|i| {
                let id = ElementId::new(i);
                let name = if i < locked_from {
                    format!("loadscan::demo::Probe{i}")
                } else {
                    if i < failing_from {
                        locked.insert(id);
                    } else if i < ordinary_from {
                        failing.insert(id);
                    }
                    format!("app::Unit{i}")
                };
                LoadedUnit::new(id, name, &owner)
            })
            .collect();

        Self {
            units,
            locked,
            failing,
            delay: layout.delay,
            _owner: owner,
        }
    }
}

impl Host for DemoHost {
    type Element = LoadedUnit;
    type View = DemoView;

    fn snapshot(&self) -> Vec<LoadedUnit> {
        self.units.clone()
    }

    fn is_modifiable(&self, element: &LoadedUnit) -> bool {
        !self.locked.contains(&element.id())
    }

    fn inspect(&self, element: &LoadedUnit) -> Result<DemoView, InspectError> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if self.failing.contains(&element.id()) {
            return Err(InspectError::unavailable(element.name()));
        }
        Ok(DemoView {
            name: element.name().to_string(),
        })
    }
}
