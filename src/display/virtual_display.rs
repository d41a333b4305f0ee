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

//! In-memory display server
//!
//! `VirtualDisplay` implements [`WindowSystem`] without a server. It keeps a
//! window table, a focused window and a keyboard layout, and records every
//! grab and synthesized event so callers can inspect what a real display
//! would have received.
//!
//! The default layout assigns keycodes from [`MIN_KEYCODE`] upwards, one per
//! keysym in [`keysym::all`] order. It is deterministic, so tests and the
//! `compile` command print the same codes on every machine.

use std::collections::HashMap;
use std::fmt;
use tracing::trace;

use crate::core::keysym;
use crate::core::types::{KeyStroke, Keycode, Keysym, ModifierMask, WindowHandle};
use crate::display::{DisplayError, WindowSystem};

/// Lowest keycode X11 hands out
pub const MIN_KEYCODE: u32 = 8;

/// One synthesized event
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Emitted {
    Input(KeyStroke),
    Press(KeyStroke),
    Release(KeyStroke),
}

impl fmt::Display for Emitted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Emitted::Input(stroke) => write!(f, "input {}", stroke),
            Emitted::Press(stroke) => write!(f, "press {}", stroke),
            Emitted::Release(stroke) => write!(f, "release {}", stroke),
        }
    }
}

#[derive(Clone, Debug)]
pub struct VirtualDisplay {
    to_keycode: HashMap<Keysym, Keycode>,
    to_keysym: HashMap<Keycode, Keysym>,
    /// `None` class means the window has no `WM_CLASS`
    windows: HashMap<WindowHandle, Option<String>>,
    active: WindowHandle,
    grabs: Vec<(Keycode, ModifierMask)>,
    emitted: Vec<Emitted>,
    class_lookups: usize,
}

impl Default for VirtualDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualDisplay {
    /// Creates a display with the default layout and no windows.
    pub fn new() -> Self {
        let mut display = Self {
            to_keycode: HashMap::new(),
            to_keysym: HashMap::new(),
            windows: HashMap::new(),
            active: WindowHandle::NONE,
            grabs: Vec::new(),
            emitted: Vec::new(),
            class_lookups: 0,
        };

        for (offset, keysym) in keysym::all().into_iter().enumerate() {
            display.set_layout(keysym, Keycode(MIN_KEYCODE + offset as u32));
        }

        display
    }

    /// Adds (or replaces) a window with the given class.
    pub fn add_window(&mut self, handle: WindowHandle, class: impl Into<String>) {
        self.windows.insert(handle, Some(class.into()));
    }

    /// Adds a window that has no class property.
    pub fn add_unclassed_window(&mut self, handle: WindowHandle) {
        self.windows.insert(handle, None);
    }

    /// Moves focus. Focusing an unknown handle is allowed, as on a real
    /// server where the window may already be gone.
    pub fn focus(&mut self, handle: WindowHandle) {
        trace!(window = %handle, "focus");
        self.active = handle;
    }

    /// Binds `keysym` to `keycode`, dropping whatever either was bound to.
    pub fn set_layout(&mut self, keysym: Keysym, keycode: Keycode) {
        if let Some(old_code) = self.to_keycode.remove(&keysym) {
            self.to_keysym.remove(&old_code);
        }
        if let Some(old_sym) = self.to_keysym.remove(&keycode) {
            self.to_keycode.remove(&old_sym);
        }
        self.to_keycode.insert(keysym, keycode);
        self.to_keysym.insert(keycode, keysym);
    }

    /// Grabs currently held, in the order they were made
    pub fn grabs(&self) -> &[(Keycode, ModifierMask)] {
        &self.grabs
    }

    /// Events synthesized so far, oldest first
    pub fn emitted(&self) -> &[Emitted] {
        &self.emitted
    }

    /// Returns and clears the synthesized events
    pub fn take_emitted(&mut self) -> Vec<Emitted> {
        std::mem::take(&mut self.emitted)
    }

    /// Number of `fetch_window_class` calls served
    pub fn class_lookups(&self) -> usize {
        self.class_lookups
    }

    fn emit(&mut self, event: Emitted) {
        trace!(%event, "synthesized");
        self.emitted.push(event);
    }
}

impl WindowSystem for VirtualDisplay {
    fn fetch_active_window(&self) -> WindowHandle {
        self.active
    }

    fn fetch_window_class(&mut self, window: WindowHandle) -> Result<String, DisplayError> {
        self.class_lookups += 1;
        match self.windows.get(&window) {
            Some(Some(class)) => Ok(class.clone()),
            Some(None) => Err(DisplayError::MissingClass(window)),
            None => Err(DisplayError::UnknownWindow(window)),
        }
    }

    fn keysym_to_keycode(&self, keysym: Keysym) -> Keycode {
        self.to_keycode.get(&keysym).copied().unwrap_or(Keycode::NONE)
    }

    fn keycode_to_keysym(&self, keycode: Keycode) -> Keysym {
        self.to_keysym.get(&keycode).copied().unwrap_or(Keysym(0))
    }

    fn grab_key(&mut self, keycode: Keycode, modifiers: ModifierMask) {
        self.grabs.push((keycode, modifiers));
    }

    fn ungrab_all(&mut self) {
        self.grabs.clear();
    }

    fn synthesize_input(&mut self, keysym: Keysym, modifiers: ModifierMask) {
        self.emit(Emitted::Input(KeyStroke::new(keysym, modifiers)));
    }

    fn synthesize_press(&mut self, keysym: Keysym, modifiers: ModifierMask) {
        self.emit(Emitted::Press(KeyStroke::new(keysym, modifiers)));
    }

    fn synthesize_release(&mut self, keysym: Keysym, modifiers: ModifierMask) {
        self.emit(Emitted::Release(KeyStroke::new(keysym, modifiers)));
    }
}
