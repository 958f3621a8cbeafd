//! Selection set with outline notifications.
//!
//! Generic over any identity type.  The [`SelectionAdapter`] applies the
//! visual outline and answers bounding-box queries; it is passed to each
//! call so the selection never owns the scene it decorates.
//!
//! Invariant: every selected object has had `outline(true)` exactly once
//! since its last `outline(false)`.

use std::collections::HashSet;
use std::hash::Hash;

use crate::rpc::batch;
use crate::rpc::types::Box3;

/// Applies the selection overlay for one kind of object.
#[allow(async_fn_in_trait)]
pub trait SelectionAdapter<T> {
    fn outline(&mut self, object: &T, on: bool);

    /// `None` when the object has no bounds.
    async fn bounding_box(&self, object: &T) -> Option<Box3>;
}

pub struct Selection<T> {
    selected: HashSet<T>,
    enabled: bool,
    toggle_on_repeat: bool,
}

impl<T: Eq + Hash + Clone> Selection<T> {
    pub fn new() -> Self {
        Self {
            selected: HashSet::new(),
            enabled: true,
            toggle_on_repeat: true,
        }
    }

    pub fn with_toggle_on_repeat(mut self, toggle: bool) -> Self {
        self.toggle_on_repeat = toggle;
        self
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling keeps the current selection but ignores every mutation.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn has(&self, object: &T) -> bool {
        self.selected.contains(object)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.selected.iter()
    }

    /// Replace the selection.  Re-selecting the sole selected object
    /// deselects it when `toggle_on_repeat` is set.
    pub fn select(&mut self, objects: &[T], adapter: &mut impl SelectionAdapter<T>) {
        if !self.enabled {
            return;
        }
        let repeat = match objects {
            [only] => self.selected.len() == 1 && self.selected.contains(only),
            _ => false,
        };
        if repeat {
            if self.toggle_on_repeat {
                self.clear(adapter);
            }
            return;
        }

        let wanted: HashSet<T> = objects.iter().cloned().collect();
        let dropped: Vec<T> = self.selected.difference(&wanted).cloned().collect();
        for object in dropped {
            self.selected.remove(&object);
            adapter.outline(&object, false);
        }
        for object in objects {
            if self.selected.insert(object.clone()) {
                adapter.outline(object, true);
            }
        }
    }

    pub fn toggle(&mut self, objects: &[T], adapter: &mut impl SelectionAdapter<T>) {
        if !self.enabled {
            return;
        }
        for object in objects {
            if self.selected.remove(object) {
                adapter.outline(object, false);
            } else {
                self.selected.insert(object.clone());
                adapter.outline(object, true);
            }
        }
    }

    pub fn add(&mut self, objects: &[T], adapter: &mut impl SelectionAdapter<T>) {
        if !self.enabled {
            return;
        }
        for object in objects {
            if self.selected.insert(object.clone()) {
                adapter.outline(object, true);
            }
        }
    }

    pub fn remove(&mut self, objects: &[T], adapter: &mut impl SelectionAdapter<T>) {
        if !self.enabled {
            return;
        }
        for object in objects {
            if self.selected.remove(object) {
                adapter.outline(object, false);
            }
        }
    }

    pub fn clear(&mut self, adapter: &mut impl SelectionAdapter<T>) {
        if !self.enabled {
            return;
        }
        for object in self.selected.drain() {
            adapter.outline(&object, false);
        }
    }

    /// Union of the bounds of all selected objects that have any.
    pub async fn bounding_box(&self, adapter: &impl SelectionAdapter<T>) -> Option<Box3> {
        let mut boxes = Vec::with_capacity(self.selected.len());
        for object in &self.selected {
            if let Some(b) = adapter.bounding_box(object).await {
                boxes.push(b);
            }
        }
        batch::union_all(boxes)
    }
}

impl<T: Eq + Hash + Clone> Default for Selection<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ────────────────────────────────────────────────────
