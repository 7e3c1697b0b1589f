#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use loadscan_scan::{
    Element, ElementId, Host, InspectError, LoadedUnit, Owner, OwnerId, ReentrancyGuard,
    StructuralView, ThreadProtector,
};

/// View handed to matchers by [`FixtureHost`].
#[derive(Debug, Clone)]
pub struct UnitView {
    pub id: ElementId,
    pub name: String,
    pub synthetic: bool,
}

impl StructuralView for UnitView {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_synthetic(&self) -> bool {
        self.synthetic
    }
}

/// In-memory host with knobs for every exclusion and failure path.
pub struct FixtureHost {
    units: Vec<LoadedUnit>,
    owner: Arc<Owner>,
    locked: HashSet<ElementId>,
    failing: HashSet<ElementId>,
    panicking: HashSet<ElementId>,
    panicking_query: HashSet<ElementId>,
    synthetic: HashSet<ElementId>,
    delay: Duration,
    inspections: AtomicUsize,
    protected_inspections: AtomicUsize,
    threads_seen: Mutex<HashSet<String>>,
}

impl FixtureHost {
    /// `n` units named `app::Unit{i}`, all owned by the `app` context.
    pub fn new(n: u64) -> Self {
        let owner = Owner::new(OwnerId::new(1), "app");
        let units = (0..n)
            .map(|i| LoadedUnit::new(ElementId::new(i), format!("app::Unit{i}"), &owner))
            .collect();
        Self {
            units,
            owner,
            locked: HashSet::new(),
            failing: HashSet::new(),
            panicking: HashSet::new(),
            panicking_query: HashSet::new(),
            synthetic: HashSet::new(),
            delay: Duration::ZERO,
            inspections: AtomicUsize::new(0),
            protected_inspections: AtomicUsize::new(0),
            threads_seen: Mutex::new(HashSet::new()),
        }
    }

    /// Rename these units into the scanner's own namespace.
    pub fn with_family(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        for id in ids {
            let i = id as usize;
            self.units[i] = LoadedUnit::new(ElementId::new(id), format!("loadscan::agent::Probe{id}"), &self.owner);
        }
        self
    }

    /// Move these units to the root context.
    pub fn with_rooted(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        for id in ids {
            let i = id as usize;
            let name = self.units[i].name().to_string();
            self.units[i] = LoadedUnit::rooted(ElementId::new(id), name);
        }
        self
    }

    /// Units the host refuses to let anyone modify.
    pub fn with_locked(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.locked.extend(ids.into_iter().map(ElementId::new));
        self
    }

    /// Units whose inspection returns an error.
    pub fn with_failing(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.failing.extend(ids.into_iter().map(ElementId::new));
        self
    }

    /// Units whose inspection panics.
    pub fn with_panicking(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.panicking.extend(ids.into_iter().map(ElementId::new));
        self
    }

    /// Units whose modifiability query panics.
    pub fn with_panicking_query(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.panicking_query.extend(ids.into_iter().map(ElementId::new));
        self
    }

    /// Units whose view reports a generated element.
    pub fn with_synthetic(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.synthetic.extend(ids.into_iter().map(ElementId::new));
        self
    }

    /// Append a second handle to an existing unit.
    pub fn with_duplicate(mut self, id: u64) -> Self {
        let copy = self.units[id as usize].clone();
        self.units.push(copy);
        self
    }

    /// Sleep this long in every inspection.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn owner_id(&self) -> OwnerId {
        self.owner.id()
    }

    /// How many inspections have started so far.
    pub fn inspections(&self) -> usize {
        self.inspections.load(Ordering::SeqCst)
    }

    /// Inspections that ran while their thread reported an active scan.
    pub fn protected_inspections(&self) -> usize {
        self.protected_inspections.load(Ordering::SeqCst)
    }

    /// Names of the threads that ran inspections.
    pub fn threads_seen(&self) -> HashSet<String> {
        self.threads_seen.lock().unwrap().clone()
    }
}

impl Host for FixtureHost {
    type Element = LoadedUnit;
    type View = UnitView;

    fn snapshot(&self) -> Vec<LoadedUnit> {
        self.units.clone()
    }

    fn is_modifiable(&self, element: &LoadedUnit) -> bool {
        if self.panicking_query.contains(&element.id()) {
            panic!("modifiability of {} is unknown", element.name());
        }
        !self.locked.contains(&element.id())
    }

    fn inspect(&self, element: &LoadedUnit) -> Result<UnitView, InspectError> {
        self.inspections.fetch_add(1, Ordering::SeqCst);
        if ThreadProtector::new().is_protecting() {
            self.protected_inspections.fetch_add(1, Ordering::SeqCst);
        }
        if let Some(name) = std::thread::current().name() {
            self.threads_seen.lock().unwrap().insert(name.to_string());
        }
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        let id = element.id();
        if self.panicking.contains(&id) {
            panic!("inspection of {} blew up", element.name());
        }
        if self.failing.contains(&id) {
            return Err(InspectError::Unloaded {
                name: element.name().to_string(),
                owner: "app".to_string(),
            });
        }
        Ok(UnitView {
            id,
            name: element.name().to_string(),
            synthetic: self.synthetic.contains(&id),
        })
    }
}

/// Guard that counts its signals.
#[derive(Debug, Default)]
pub struct CountingGuard {
    pub enters: AtomicUsize,
    pub exits: AtomicUsize,
}

impl CountingGuard {
    pub fn enters(&self) -> usize {
        self.enters.load(Ordering::SeqCst)
    }

    pub fn exits(&self) -> usize {
        self.exits.load(Ordering::SeqCst)
    }
}

impl ReentrancyGuard for CountingGuard {
    fn enter(&self) {
        self.enters.fetch_add(1, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.exits.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn ids(units: &[LoadedUnit]) -> Vec<u64> {
    units.iter().map(|u| u.id().0).collect()
}
