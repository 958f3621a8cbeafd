//! Default state plus sparse per-element overrides.
//!
//! Invariant: `state(i) == overrides[i]` when present, else `default`,
//! and no override ever equals the default.

use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct StateTracker<S> {
    default: S,
    overrides: HashMap<u32, S>,
}

/// What a [`StateTracker::replace`] changed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Replaced {
    /// The default matched and was replaced.
    pub default_replaced: bool,
    /// Indices whose override was rewritten or pruned.
    pub touched: Vec<u32>,
}

impl<S: Copy + PartialEq> StateTracker<S> {
    pub fn new(default: S) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
        }
    }

    pub fn default_state(&self) -> S {
        self.default
    }

    /// Effective state of `index`.
    pub fn state(&self, index: u32) -> S {
        self.overrides.get(&index).copied().unwrap_or(self.default)
    }

    pub fn is_overridden(&self, index: u32) -> bool {
        self.overrides.contains_key(&index)
    }

    /// Set one element.  Returns the previous effective state.
    pub fn set(&mut self, index: u32, state: S) -> S {
        let previous = self.state(index);
        if state == self.default {
            self.overrides.remove(&index);
        } else {
            self.overrides.insert(index, state);
        }
        previous
    }

    /// Replace the default and drop every override.
    pub fn set_all(&mut self, state: S) {
        self.default = state;
        self.overrides.clear();
    }

    /// Rewrite everything currently in one of `from` to `to`.
    ///
    /// A matching default is replaced; overrides that then equal the new
    /// default are pruned.
    pub fn replace(&mut self, from: &[S], to: S) -> Replaced {
        let mut out = Replaced::default();

        if from.contains(&self.default) && self.default != to {
            self.default = to;
            out.default_replaced = true;
        }

        let default = self.default;
        self.overrides.retain(|&index, state| {
            if from.contains(state) && *state != to {
                *state = to;
                out.touched.push(index);
            }
            if *state == default {
                if out.touched.last() != Some(&index) {
                    out.touched.push(index);
                }
                return false;
            }
            true
        });
        out.touched.sort_unstable();
        out
    }

    pub fn overrides(&self) -> impl Iterator<Item = (u32, S)> + '_ {
        self.overrides.iter().map(|(&i, &s)| (i, s))
    }

    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }
}

impl<S: Copy + PartialEq + Default> Default for StateTracker<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

// ── Tests ────────────────────────────────────────────────────
