//! Remap collision detection
//!
//! Two rules with the same trigger stroke land in the same slot of the
//! compiled dispatch table, and the later one silently replaces the earlier
//! one. This module finds those collisions ahead of time using HashMap-based
//! indexing on the trigger.
//!
//! Rules only collide when their scopes can be active for the same window,
//! so a `class_only = firefox` rule and a `class_only = urxvt` rule sharing a
//! trigger are not reported.

use std::collections::HashMap;

use crate::core::scope::Scope;
use crate::core::types::{KeyStroke, Remap};

/// A remap together with the scope it was declared in
#[derive(Clone, Debug, PartialEq)]
pub struct ScopedRemap {
    pub scope: Scope,
    pub remap: Remap,
}

/// Indexes remaps by trigger stroke
pub struct ConflictDetector {
    /// Maps a trigger to every rule bound to it, in declaration order.
    bindings: HashMap<KeyStroke, Vec<ScopedRemap>>,
}

/// A trigger bound more than once in overlapping scopes
#[derive(Clone, Debug, PartialEq)]
pub struct Conflict {
    /// The trigger stroke
    pub key_stroke: KeyStroke,

    /// All rules on this trigger (always 2 or more), declaration order.
    /// The last one wins at runtime.
    pub conflicting_remaps: Vec<ScopedRemap>,
}

impl ConflictDetector {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Adds a rule to the index.
    pub fn add_remap(&mut self, scope: &Scope, remap: &Remap) {
        self.bindings
            .entry(remap.from)
            .or_default()
            .push(ScopedRemap {
                scope: scope.clone(),
                remap: remap.clone(),
            });
    }

    /// Finds all triggers with two or more rules whose scopes overlap.
    ///
    /// Results are sorted by their printed trigger so output is stable.
    pub fn find_conflicts(&self) -> Vec<Conflict> {
        let mut conflicts: Vec<Conflict> = self
            .bindings
            .iter()
            .filter_map(|(stroke, remaps)| {
                let overlapping: Vec<ScopedRemap> = remaps
                    .iter()
                    .enumerate()
                    .filter(|(i, candidate)| {
                        remaps.iter().enumerate().any(|(j, other)| {
                            *i != j && candidate.scope.may_overlap(&other.scope)
                        })
                    })
                    .map(|(_, r)| r.clone())
                    .collect();

                (overlapping.len() > 1).then(|| Conflict {
                    key_stroke: *stroke,
                    conflicting_remaps: overlapping,
                })
            })
            .collect();

        conflicts.sort_by_key(|c| c.key_stroke.to_string());
        conflicts
    }

    /// Checks whether a specific trigger has a conflict.
    pub fn has_conflict(&self, key_stroke: &KeyStroke) -> bool {
        self.find_conflicts()
            .iter()
            .any(|c| &c.key_stroke == key_stroke)
    }

    /// Returns the total number of rules tracked.
    pub fn total_remaps(&self) -> usize {
        self.bindings.values().map(|v| v.len()).sum()
    }
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new()
    }
}
