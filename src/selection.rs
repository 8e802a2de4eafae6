use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexMap;

use crate::diagram::{Link, LinkId, Node, NodeId, PortRef};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Select,
    Deselect,
}

/// One entry of a selector's change stream.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionChange<K, D> {
    pub kind: ChangeKind,
    pub id: K,
    pub data: D,
    /// Echo of the caller's preserve flag. Consumers use it to decide whether
    /// other selectors should be cleared as well.
    pub preserve: bool,
}

/// Ordered selection of one entity class.
///
/// Insertion order is kept so the most recently selected entry can be drawn
/// on top. Every select and deselect is recorded as a [`SelectionChange`]
/// until drained with [`take_changes`](Self::take_changes).
#[derive(Debug)]
pub struct Selector<K, D> {
    selected: IndexMap<K, D>,
    locked: bool,
    changes: Vec<SelectionChange<K, D>>,
}

impl<K, D> Default for Selector<K, D> {
    fn default() -> Self {
        Self {
            selected: IndexMap::new(),
            locked: false,
            changes: Vec::new(),
        }
    }
}

impl<K, D> Selector<K, D>
where
    K: Clone + Eq + Hash + Debug,
    D: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `id`. Without `preserve` everything else is deselected first.
    ///
    /// Returns `false` if `id` was already selected.
    pub fn select(&mut self, id: K, data: D, preserve: bool) -> bool {
        if !preserve {
            self.deselect_all();
        }
        self.insert(id, data, preserve)
    }

    fn insert(&mut self, id: K, data: D, preserve: bool) -> bool {
        if self.selected.contains_key(&id) {
            return false;
        }
        log::trace!("select {id:?} (preserve: {preserve})");
        self.selected.insert(id.clone(), data.clone());
        self.changes.push(SelectionChange {
            kind: ChangeKind::Select,
            id,
            data,
            preserve,
        });
        true
    }

    /// Deselect `id` if selected, otherwise select it.
    ///
    /// Without `preserve`, every other entry is deselected first. If there
    /// were any, `id` ends up as the only selected entry instead of being
    /// toggled off.
    pub fn toggle(&mut self, id: K, data: D, preserve: bool) {
        if !preserve {
            let others: Vec<K> = self
                .selected
                .keys()
                .filter(|k| **k != id)
                .cloned()
                .collect();
            if !others.is_empty() {
                for other in &others {
                    self.deselect(other, false);
                }
                self.insert(id, data, false);
                return;
            }
        }
        if self.selected.contains_key(&id) {
            self.deselect(&id, preserve);
        } else {
            self.insert(id, data, preserve);
        }
    }

    /// Remove `id`. Absent ids are ignored.
    pub fn deselect(&mut self, id: &K, preserve: bool) -> bool {
        let Some(data) = self.selected.shift_remove(id) else {
            return false;
        };
        log::trace!("deselect {id:?}");
        self.changes.push(SelectionChange {
            kind: ChangeKind::Deselect,
            id: id.clone(),
            data,
            preserve,
        });
        true
    }

    /// Deselect every entry, one change per entry. Returns how many there were.
    pub fn deselect_all(&mut self) -> usize {
        let ids: Vec<K> = self.selected.keys().cloned().collect();
        for id in &ids {
            self.deselect(id, false);
        }
        ids.len()
    }

    /// Background-click handler: deselects everything unless locked.
    pub fn deselect_handler(&mut self) -> bool {
        if self.locked {
            return false;
        }
        self.deselect_all();
        true
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_selected(&self, id: &K) -> bool {
        self.selected.contains_key(id)
    }

    pub fn get(&self, id: &K) -> Option<&D> {
        self.selected.get(id)
    }

    /// Selected ids in selection order.
    pub fn ids(&self) -> impl Iterator<Item = &K> {
        self.selected.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &D)> {
        self.selected.iter()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn take_changes(&mut self) -> Vec<SelectionChange<K, D>> {
        std::mem::take(&mut self.changes)
    }

    /// Forget everything without recording changes.
    pub fn reset(&mut self) {
        self.selected.clear();
        self.changes.clear();
        self.locked = false;
    }
}

/// Selectors for every entity class of a diagram.
#[derive(Debug, Default)]
pub struct SelectionManager {
    pub nodes: Selector<NodeId, Node>,
    pub links: Selector<LinkId, Link>,
    pub ports: Selector<PortRef, PortRef>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_all(&mut self) {
        self.nodes.lock();
        self.links.lock();
        self.ports.lock();
    }

    pub fn unlock_all(&mut self) {
        self.nodes.unlock();
        self.links.unlock();
        self.ports.unlock();
    }

    pub fn is_locked(&self) -> bool {
        self.nodes.is_locked() || self.links.is_locked() || self.ports.is_locked()
    }

    pub fn has_any_selection(&self) -> bool {
        !(self.nodes.is_empty() && self.links.is_empty() && self.ports.is_empty())
    }

    pub fn deselect_all(&mut self) -> usize {
        self.nodes.deselect_all() + self.links.deselect_all() + self.ports.deselect_all()
    }

    /// Background-click handler over all selectors. Returns `true` if the
    /// selection was cleared, `false` if any selector is locked.
    pub fn deselect_all_handler(&mut self) -> bool {
        if self.is_locked() {
            return false;
        }
        self.deselect_all();
        true
    }

    pub fn reset(&mut self) {
        self.nodes.reset();
        self.links.reset();
        self.ports.reset();
    }
}
