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

//! Rule resolution and dispatch engine
//!
//! Given a loaded [`Config`](crate::config::Config) and a
//! [`WindowSystem`](crate::display::WindowSystem), the engine:
//! - tracks which window is focused ([`tracker`])
//! - compiles the rules for that window into a dispatch table ([`compiler`])
//! - grabs exactly the keys the table needs ([`grab`])
//! - matches caught presses against the table ([`dispatch`])
//!
//! [`handler::EventHandler`] wires these together behind the event callbacks
//! a display binding calls.
//!
//! # Example
//! ```
//! use keyremap::config::parser::parse_config;
//! use keyremap::core::{expression, ModifierMask, WindowHandle};
//! use keyremap::display::{RecordingRunner, VirtualDisplay, WindowSystem};
//! use keyremap::engine::EventHandler;
//! use std::time::Duration;
//!
//! let config = parse_config("remap C-b => Left\n").unwrap();
//!
//! let mut display = VirtualDisplay::new();
//! display.add_window(WindowHandle(1), "Firefox");
//! display.focus(WindowHandle(1));
//!
//! let mut handler = EventHandler::new(config, display, RecordingRunner::new(), Duration::ZERO);
//!
//! let b = expression::parse("b").unwrap();
//! let keycode = handler.display().keysym_to_keycode(b.keysym);
//! assert!(handler.on_key_press(keycode, ModifierMask::CONTROL).is_match());
//! ```

pub mod compiler;
pub mod dispatch;
pub mod grab;
pub mod handler;
pub mod tracker;

pub use compiler::{compile, ActionList, DispatchTable};
pub use dispatch::{dispatch, DispatchOutcome};
pub use grab::GrabManager;
pub use handler::EventHandler;
pub use tracker::{ActiveWindowState, ActiveWindowTracker};

#[cfg(test)]
mod tests;
