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

//! keyremap
//!
//! A window-aware key remapper for X11. Rules bind a key stroke to new
//! input, press/release halves, or shell commands, optionally only for
//! windows of certain classes. For the focused window the rules compile into
//! a dispatch table, and each caught key press is matched against it.
//!
//! # Features
//!
//! - **Window scopes:** `class_only` / `class_not` lists, with regex entries
//! - **Modifier pass-through:** modifiers held beyond a rule's own are
//!   forwarded to the produced keys
//! - **Most specific rule wins:** `C-Shift-b` beats `C-b` when both apply
//! - **Shell integration:** a desktop shell can report the focused class
//! - **Conflict detection:** triggers bound twice in overlapping scopes
//! - **Hot reload:** rule file edits take effect without a restart
//!
//! # Architecture
//!
//! - **`core`:** Rule model (strokes, masks, targets, scopes, key expressions)
//! - **`config`:** Rule file language, loading, settings, file watching
//! - **`display`:** Window system and command runner seams, virtual display
//! - **`engine`:** Tracker, compiler, grab manager, dispatcher, event handler
//! - **`replay`:** Scripted events for exercising rules without a server
//!
//! # Examples
//!
//! ## Loading rules
//!
//! ```no_run
//! use keyremap::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Path::new("/tmp/config.remap"))?;
//! println!("Loaded {} remaps", config.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Detecting conflicts
//!
//! ```
//! use keyremap::config::parser::parse_config;
//!
//! let config = parse_config("remap C-b => Left\nremap C-b => Home\n")?;
//! assert_eq!(config.conflicts().len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod core;
pub mod display;
pub mod engine;
pub mod replay;

// Re-export commonly used types for convenience
pub use crate::config::Config;
pub use crate::core::{KeyStroke, Modifier, ModifierMask, Remap, Target};
pub use crate::engine::EventHandler;
