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

//! Window system collaborators
//!
//! The engine never talks to a display server directly. Everything it needs
//! from one goes through [`WindowSystem`], and shell commands go through
//! [`CommandRunner`]. This module defines both seams and ships the
//! implementations the crate uses itself:
//!
//! - **VirtualDisplay**: in-memory display with a deterministic keyboard
//!   layout. Records grabs and synthesized input, never reaches a server.
//! - **ShellRunner**: runs commands detached through `/bin/sh -c`
//! - **RecordingRunner**: collects commands instead of running them
//! - **WindowFeed**: active-window reports pushed by a desktop shell
//!
//! # Example
//! ```
//! use keyremap::display::{VirtualDisplay, WindowSystem, Emitted};
//! use keyremap::core::{expression, ModifierMask, WindowHandle};
//!
//! let mut display = VirtualDisplay::new();
//! display.add_window(WindowHandle(1), "Firefox");
//! display.focus(WindowHandle(1));
//!
//! let left = expression::parse("Left").unwrap();
//! display.synthesize_input(left.keysym, ModifierMask::SHIFT);
//!
//! assert_eq!(display.fetch_active_window(), WindowHandle(1));
//! assert_eq!(display.emitted().len(), 1);
//! ```

pub mod feed;
pub mod runner;
pub mod virtual_display;

pub use feed::{WindowFeed, WindowInfo};
pub use runner::{CommandRunner, RecordingRunner, ShellRunner};
pub use virtual_display::{Emitted, VirtualDisplay};

use thiserror::Error;

use crate::core::types::{Keycode, Keysym, ModifierMask, WindowHandle};

/// Errors reported by window system collaborators
#[derive(Debug, Error)]
pub enum DisplayError {
    /// The handle does not name a live window.
    #[error("Window {0} does not exist")]
    UnknownWindow(WindowHandle),

    /// The window exists but carries no class property.
    #[error("Window {0} has no class property")]
    MissingClass(WindowHandle),

    /// A shell feed line was not a window report.
    #[error("Malformed window report: {0}")]
    MalformedReport(#[from] serde_json::Error),

    /// Socket or other I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything the engine asks of the display server
///
/// Keycode lookups never fail: an unmapped keysym yields keycode 0 and an
/// unmapped keycode yields keysym 0, as the X11 calls do.
pub trait WindowSystem {
    /// The currently focused window, or `WindowHandle::NONE`.
    fn fetch_active_window(&self) -> WindowHandle;

    /// The class half of the window's `WM_CLASS`.
    fn fetch_window_class(&mut self, window: WindowHandle) -> Result<String, DisplayError>;

    fn keysym_to_keycode(&self, keysym: Keysym) -> Keycode;

    fn keycode_to_keysym(&self, keycode: Keycode) -> Keysym;

    /// Intercept `keycode` pressed with exactly `modifiers`.
    fn grab_key(&mut self, keycode: Keycode, modifiers: ModifierMask);

    /// Release every grab this client holds.
    fn ungrab_all(&mut self);

    /// Press and release `keysym` with `modifiers` held.
    fn synthesize_input(&mut self, keysym: Keysym, modifiers: ModifierMask);

    fn synthesize_press(&mut self, keysym: Keysym, modifiers: ModifierMask);

    fn synthesize_release(&mut self, keysym: Keysym, modifiers: ModifierMask);
}

#[cfg(test)]
mod tests;
