// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Rule compiler
//!
//! Turns the rules that apply to the focused window into a [`DispatchTable`]:
//! keycode first, then the exact modifier mask the rule was written with,
//! then the ordered actions to run.
//!
//! The table is rebuilt from scratch on every focus or keymap change and is
//! never patched in place.

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::config::Config;
use crate::core::types::{KeyStroke, Keycode, ModifierMask, Remap, Target};
use crate::display::{CommandRunner, WindowSystem};
use crate::engine::tracker::ActiveWindowState;

/// Ordered targets bound to one (keycode, mask) slot
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ActionList(Vec<Target>);

impl ActionList {
    pub fn new(targets: Vec<Target>) -> Self {
        Self(targets)
    }

    pub fn targets(&self) -> &[Target] {
        &self.0
    }

    /// Runs every target in order with the same leftover modifiers.
    pub fn invoke<D, R>(&self, remaining: ModifierMask, display: &mut D, runner: &mut R)
    where
        D: WindowSystem + ?Sized,
        R: CommandRunner + ?Sized,
    {
        for target in &self.0 {
            perform(target, remaining, display, runner);
        }
    }
}

/// Executes one target.
///
/// Key targets are sent with their own modifiers plus whatever the user held
/// beyond the rule's mask. Commands ignore modifiers.
pub fn perform<D, R>(target: &Target, remaining: ModifierMask, display: &mut D, runner: &mut R)
where
    D: WindowSystem + ?Sized,
    R: CommandRunner + ?Sized,
{
    match target {
        Target::Input(stroke) => {
            display.synthesize_input(stroke.keysym, stroke.modifiers | remaining)
        }
        Target::Press(stroke) => {
            display.synthesize_press(stroke.keysym, stroke.modifiers | remaining)
        }
        Target::Release(stroke) => {
            display.synthesize_release(stroke.keysym, stroke.modifiers | remaining)
        }
        Target::Execute(command) => runner.run_detached(command),
    }
}

/// Per-event lookup structure
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DispatchTable {
    /// Masks per keycode in registration order
    entries: HashMap<Keycode, Vec<(ModifierMask, ActionList)>>,
    /// Triggers the layout had no keycode for
    unmapped: Vec<KeyStroke>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `actions` to `(keycode, mask)`.
    ///
    /// A slot that already exists is overwritten where it stands, so it keeps
    /// its original registration position.
    pub fn insert(&mut self, keycode: Keycode, mask: ModifierMask, actions: ActionList) {
        let slots = self.entries.entry(keycode).or_default();
        match slots.iter_mut().find(|(existing, _)| *existing == mask) {
            Some(slot) => slot.1 = actions,
            None => slots.push((mask, actions)),
        }
    }

    /// Finds the rule to fire for a press of `keycode` with `state` held.
    ///
    /// A rule matches when every bit of its mask is held. Among matches the
    /// mask with the most bits wins; equal counts go to the earliest
    /// registered.
    pub fn lookup(
        &self,
        keycode: Keycode,
        state: ModifierMask,
    ) -> Option<(ModifierMask, &ActionList)> {
        let slots = self.entries.get(&keycode)?;

        let mut best: Option<&(ModifierMask, ActionList)> = None;
        for slot in slots.iter().filter(|(mask, _)| state.holds(*mask)) {
            match best {
                Some((current, _)) if current.specificity() >= slot.0.specificity() => {}
                _ => best = Some(slot),
            }
        }

        best.map(|(mask, actions)| (*mask, actions))
    }

    /// Actions bound to exactly `(keycode, mask)`
    pub fn get(&self, keycode: Keycode, mask: ModifierMask) -> Option<&ActionList> {
        self.entries
            .get(&keycode)?
            .iter()
            .find(|(existing, _)| *existing == mask)
            .map(|(_, actions)| actions)
    }

    /// Every slot, ordered by keycode and then registration.
    pub fn bindings(&self) -> Vec<(Keycode, ModifierMask, &ActionList)> {
        let mut keycodes: Vec<&Keycode> = self.entries.keys().collect();
        keycodes.sort();

        keycodes
            .into_iter()
            .flat_map(|code| {
                self.entries[code]
                    .iter()
                    .map(move |(mask, actions)| (*code, *mask, actions))
            })
            .collect()
    }

    /// Triggers that landed on `Keycode::NONE` when the table was built
    pub fn unmapped(&self) -> &[KeyStroke] {
        &self.unmapped
    }

    /// Number of (keycode, mask) slots
    pub fn len(&self) -> usize {
        self.entries.values().map(|slots| slots.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds a table from an ordered rule list.
///
/// Keycodes come straight from the layout; an unmapped keysym lands on
/// keycode 0 like any other and is also listed in
/// [`unmapped`](DispatchTable::unmapped).
pub fn build_table<D>(remaps: &[&Remap], display: &D) -> DispatchTable
where
    D: WindowSystem + ?Sized,
{
    let mut table = DispatchTable::new();
    for remap in remaps {
        let keycode = display.keysym_to_keycode(remap.from.keysym);
        if keycode.is_none() && !table.unmapped.contains(&remap.from) {
            table.unmapped.push(remap.from);
        }
        table.insert(keycode, remap.from.modifiers, ActionList::new(remap.to.clone()));
    }
    table
}

/// Class of the active window.
///
/// A class reported by the shell feed wins. Otherwise the display is asked,
/// and a failed lookup counts as the empty class.
pub fn window_class<D>(window: &ActiveWindowState, display: &mut D) -> String
where
    D: WindowSystem + ?Sized,
{
    if let Some(class) = &window.cached_class {
        return class.clone();
    }

    display.fetch_window_class(window.handle).unwrap_or_else(|e| {
        warn!(window = %window.handle, error = %e, "window class lookup failed, using empty class");
        String::new()
    })
}

/// Compiles the rules that apply to `window`.
///
/// With no focused window the table is empty and the display is not asked
/// for anything.
pub fn compile<D>(config: &Config, window: &ActiveWindowState, display: &mut D) -> DispatchTable
where
    D: WindowSystem + ?Sized,
{
    if window.handle.is_none() {
        debug!("no active window, nothing to compile");
        return DispatchTable::new();
    }

    let class = window_class(window, display);
    compile_for_class(config, &class, display)
}

/// Compiles the rules for a window of the given class.
pub fn compile_for_class<D>(config: &Config, window_class: &str, display: &D) -> DispatchTable
where
    D: WindowSystem + ?Sized,
{
    let remaps = config.remaps_for_class(window_class);
    let table = build_table(&remaps, display);

    debug!(
        class = window_class,
        rules = remaps.len(),
        slots = table.len(),
        "compiled dispatch table"
    );

    table
}
