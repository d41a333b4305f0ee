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

//! src/core/mod.rs
//!
//! Core rule model
//!
//! This module contains the fundamental data structures and pure algorithms
//! of the remapper:
//! - Type definitions for strokes, masks, targets and remaps
//! - The keysym name table
//! - Key expression parsing
//! - Window scope resolution
//! - Collision detection between rules
//!
//! Nothing here talks to a display server, so all of it is unit-tested
//! directly.

pub mod conflict;
pub mod expression;
pub mod keysym;
pub mod scope;
pub mod types;

pub use conflict::{Conflict, ConflictDetector, ScopedRemap};
pub use expression::ExpressionError;
pub use scope::{resolve, ClassPattern, Scope, WindowScope};
pub use types::*;

#[cfg(test)]
mod tests;
