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

//! src/core/types.rs
//!
//! Core type definitions for key remapping
//!
//! This module defines the fundamental types used throughout the engine:
//! - `Modifier`: The four modifier keys a rule can name (Ctrl, Alt, Shift, Super)
//! - `ModifierMask`: The X11 modifier bitset carried by rules and live events
//! - `Keysym` / `Keycode`: Layout-independent symbol vs physical key code
//! - `KeyStroke`: A keysym plus the modifiers held with it
//! - `Target`: What a remap produces (input, press, release or a command)
//! - `Remap`: One trigger stroke fanned out to an ordered list of targets

use bitflags::bitflags;
use std::fmt;

use crate::core::keysym;

/// Keyboard modifier keys
///
/// These are the modifiers a key expression can name. Each maps to exactly
/// one bit of [`ModifierMask`]; Alt is Mod1 and Super is Mod4 as on a
/// stock X11 keyboard map.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Modifier {
    /// Control key
    Ctrl,
    /// Alt key (Mod1)
    Alt,
    /// Shift key
    Shift,
    /// Super/Windows key (Mod4)
    Super,
}

impl Modifier {
    /// All modifiers in canonical expression order (`C-M-Shift-Super-`)
    pub const ALL: [Modifier; 4] = [
        Modifier::Ctrl,
        Modifier::Alt,
        Modifier::Shift,
        Modifier::Super,
    ];

    /// The mask bit this modifier sets
    pub fn mask(self) -> ModifierMask {
        match self {
            Modifier::Ctrl => ModifierMask::CONTROL,
            Modifier::Alt => ModifierMask::MOD1,
            Modifier::Shift => ModifierMask::SHIFT,
            Modifier::Super => ModifierMask::MOD4,
        }
    }

    /// Short token used when printing an expression
    pub fn token(self) -> &'static str {
        match self {
            Modifier::Ctrl => "C",
            Modifier::Alt => "M",
            Modifier::Shift => "Shift",
            Modifier::Super => "Super",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

bitflags! {
    /// X11 modifier state bits
    ///
    /// Live event states can carry bits no rule ever names (Lock, NumLock on
    /// Mod2, pointer buttons), so masks are built with `from_bits_retain` and
    /// unknown bits survive every operation.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
    pub struct ModifierMask: u32 {
        const SHIFT = 1 << 0;
        const LOCK = 1 << 1;
        const CONTROL = 1 << 2;
        const MOD1 = 1 << 3;
        const MOD2 = 1 << 4;
        const MOD3 = 1 << 5;
        const MOD4 = 1 << 6;
        const MOD5 = 1 << 7;
    }
}

impl ModifierMask {
    /// Combines modifiers into one mask. Order and repetition are irrelevant.
    pub fn from_modifiers<I: IntoIterator<Item = Modifier>>(modifiers: I) -> Self {
        modifiers
            .into_iter()
            .fold(ModifierMask::empty(), |mask, modifier| mask | modifier.mask())
    }

    /// Bitmask subset test: every bit of `rule` is held in `self`
    pub fn holds(self, rule: ModifierMask) -> bool {
        self.bits() & rule.bits() == rule.bits()
    }

    /// Number of modifier bits set
    pub fn specificity(self) -> u32 {
        self.bits().count_ones()
    }

    /// Expression prefix for the nameable modifiers, e.g. `C-Shift-`
    pub fn expression_prefix(self) -> String {
        Modifier::ALL
            .iter()
            .filter(|m| self.contains(m.mask()))
            .map(|m| format!("{}-", m.token()))
            .collect()
    }
}

/// Abstract, layout-independent key identifier (an X11 keysym value)
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Keysym(pub u32);

impl Keysym {
    /// Symbolic name if the keysym is in the known table
    pub fn name(self) -> Option<&'static str> {
        keysym::name_of(self)
    }
}

impl fmt::Display for Keysym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "{:#x}", self.0),
        }
    }
}

/// Layout-dependent physical key code
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Keycode(pub u32);

impl Keycode {
    /// What the layout reports for a keysym it doesn't map. X11 reads a
    /// grab on this code as "any key".
    pub const NONE: Keycode = Keycode(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Keycode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque window identifier; zero means "no focused window"
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct WindowHandle(pub u64);

impl WindowHandle {
    /// The null sentinel
    pub const NONE: WindowHandle = WindowHandle(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A keysym combined with the modifiers held with it
///
/// Used both as the trigger of a remap and as the payload of key targets.
/// Displays as a canonical key expression (`C-M-Left`), which parses back to
/// an equal stroke.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct KeyStroke {
    pub keysym: Keysym,
    pub modifiers: ModifierMask,
}

impl KeyStroke {
    pub fn new(keysym: Keysym, modifiers: ModifierMask) -> Self {
        Self { keysym, modifiers }
    }
}

impl fmt::Display for KeyStroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.modifiers.expression_prefix(), self.keysym)
    }
}

/// What a remap produces when its trigger fires
///
/// A closed set: the compiler matches on it exhaustively.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Target {
    /// Full press + release of the stroke
    Input(KeyStroke),
    /// Press half only
    Press(KeyStroke),
    /// Release half only
    Release(KeyStroke),
    /// Detached shell command
    Execute(String),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Input(stroke) => write!(f, "{}", stroke),
            Target::Press(stroke) => write!(f, "press {}", stroke),
            Target::Release(stroke) => write!(f, "release {}", stroke),
            Target::Execute(command) => write!(f, "exec {:?}", command),
        }
    }
}

/// One remap rule: a trigger stroke and the targets it fans out to
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Remap {
    pub from: KeyStroke,
    pub to: Vec<Target>,
}

impl fmt::Display for Remap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let targets = self
            .to
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{} => {}", self.from, targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_display_matches_expression_prefix() {
        assert_eq!(format!("{}", Modifier::Ctrl), "C");
        assert_eq!(format!("{}", Modifier::Super), "Super");

        for modifier in Modifier::ALL {
            assert_eq!(format!("{}-", modifier), modifier.mask().expression_prefix());
        }
    }

    #[test]
    fn test_mask_from_modifiers_ignores_order() {
        let a = ModifierMask::from_modifiers([Modifier::Ctrl, Modifier::Alt]);
        let b = ModifierMask::from_modifiers([Modifier::Alt, Modifier::Ctrl, Modifier::Ctrl]);

        assert_eq!(a, b);
        assert_eq!(a, ModifierMask::CONTROL | ModifierMask::MOD1);
    }

    #[test]
    fn test_window_handle_sentinel() {
        assert!(WindowHandle::NONE.is_none());
        assert!(!WindowHandle(0x1a00003).is_none());
    }

    #[test]
    fn test_keycode_sentinel() {
        assert!(Keycode::NONE.is_none());
        assert!(!Keycode(8).is_none());
    }
}
