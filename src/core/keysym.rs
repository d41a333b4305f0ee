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

//! X11 keysym name table
//!
//! Values follow `X11/keysymdef.h` and `X11/XF86keysym.h`. Printable ASCII
//! keysyms equal their character code, so single characters are resolved
//! arithmetically and only named keys live in the table.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::core::types::Keysym;

/// Prefix of vendor (XF86) keysym names, looked up verbatim
pub const EXTENDED_PREFIX: &str = "XF86XK_";

/// Named keysyms. Aliases share a value; the first name listed for a value is
/// the one used when printing.
const NAMED: &[(&str, u32)] = &[
    ("space", 0x0020),
    ("exclam", 0x0021),
    ("quotedbl", 0x0022),
    ("numbersign", 0x0023),
    ("dollar", 0x0024),
    ("percent", 0x0025),
    ("ampersand", 0x0026),
    ("apostrophe", 0x0027),
    ("parenleft", 0x0028),
    ("parenright", 0x0029),
    ("asterisk", 0x002a),
    ("plus", 0x002b),
    ("comma", 0x002c),
    ("minus", 0x002d),
    ("period", 0x002e),
    ("slash", 0x002f),
    ("colon", 0x003a),
    ("semicolon", 0x003b),
    ("less", 0x003c),
    ("equal", 0x003d),
    ("greater", 0x003e),
    ("question", 0x003f),
    ("at", 0x0040),
    ("bracketleft", 0x005b),
    ("backslash", 0x005c),
    ("bracketright", 0x005d),
    ("asciicircum", 0x005e),
    ("underscore", 0x005f),
    ("grave", 0x0060),
    ("braceleft", 0x007b),
    ("bar", 0x007c),
    ("braceright", 0x007d),
    ("asciitilde", 0x007e),
    // TTY function keys
    ("BackSpace", 0xff08),
    ("Tab", 0xff09),
    ("Linefeed", 0xff0a),
    ("Clear", 0xff0b),
    ("Return", 0xff0d),
    ("Pause", 0xff13),
    ("Scroll_Lock", 0xff14),
    ("Sys_Req", 0xff15),
    ("Escape", 0xff1b),
    ("Delete", 0xffff),
    // Cursor control
    ("Home", 0xff50),
    ("Left", 0xff51),
    ("Up", 0xff52),
    ("Right", 0xff53),
    ("Down", 0xff54),
    ("Prior", 0xff55),
    ("Page_Up", 0xff55),
    ("Next", 0xff56),
    ("Page_Down", 0xff56),
    ("End", 0xff57),
    ("Begin", 0xff58),
    // Misc functions
    ("Select", 0xff60),
    ("Print", 0xff61),
    ("Execute", 0xff62),
    ("Insert", 0xff63),
    ("Undo", 0xff65),
    ("Redo", 0xff66),
    ("Menu", 0xff67),
    ("Find", 0xff68),
    ("Cancel", 0xff69),
    ("Help", 0xff6a),
    ("Break", 0xff6b),
    ("Mode_switch", 0xff7e),
    ("Num_Lock", 0xff7f),
    // Keypad
    ("KP_Space", 0xff80),
    ("KP_Tab", 0xff89),
    ("KP_Enter", 0xff8d),
    ("KP_Home", 0xff95),
    ("KP_Left", 0xff96),
    ("KP_Up", 0xff97),
    ("KP_Right", 0xff98),
    ("KP_Down", 0xff99),
    ("KP_Page_Up", 0xff9a),
    ("KP_Page_Down", 0xff9b),
    ("KP_End", 0xff9c),
    ("KP_Begin", 0xff9d),
    ("KP_Insert", 0xff9e),
    ("KP_Delete", 0xff9f),
    ("KP_Equal", 0xffbd),
    ("KP_Multiply", 0xffaa),
    ("KP_Add", 0xffab),
    ("KP_Separator", 0xffac),
    ("KP_Subtract", 0xffad),
    ("KP_Decimal", 0xffae),
    ("KP_Divide", 0xffaf),
    ("KP_0", 0xffb0),
    ("KP_1", 0xffb1),
    ("KP_2", 0xffb2),
    ("KP_3", 0xffb3),
    ("KP_4", 0xffb4),
    ("KP_5", 0xffb5),
    ("KP_6", 0xffb6),
    ("KP_7", 0xffb7),
    ("KP_8", 0xffb8),
    ("KP_9", 0xffb9),
    // Function keys
    ("F1", 0xffbe),
    ("F2", 0xffbf),
    ("F3", 0xffc0),
    ("F4", 0xffc1),
    ("F5", 0xffc2),
    ("F6", 0xffc3),
    ("F7", 0xffc4),
    ("F8", 0xffc5),
    ("F9", 0xffc6),
    ("F10", 0xffc7),
    ("F11", 0xffc8),
    ("F12", 0xffc9),
    ("F13", 0xffca),
    ("F14", 0xffcb),
    ("F15", 0xffcc),
    ("F16", 0xffcd),
    ("F17", 0xffce),
    ("F18", 0xffcf),
    ("F19", 0xffd0),
    ("F20", 0xffd1),
    ("F21", 0xffd2),
    ("F22", 0xffd3),
    ("F23", 0xffd4),
    ("F24", 0xffd5),
    // Modifiers
    ("Shift_L", 0xffe1),
    ("Shift_R", 0xffe2),
    ("Control_L", 0xffe3),
    ("Control_R", 0xffe4),
    ("Caps_Lock", 0xffe5),
    ("Shift_Lock", 0xffe6),
    ("Meta_L", 0xffe7),
    ("Meta_R", 0xffe8),
    ("Alt_L", 0xffe9),
    ("Alt_R", 0xffea),
    ("Super_L", 0xffeb),
    ("Super_R", 0xffec),
    ("Hyper_L", 0xffed),
    ("Hyper_R", 0xffee),
    ("ISO_Level3_Shift", 0xfe03),
    ("ISO_Left_Tab", 0xfe20),
    // XF86 vendor keys
    ("XF86XK_MonBrightnessUp", 0x1008ff02),
    ("XF86XK_MonBrightnessDown", 0x1008ff03),
    ("XF86XK_KbdLightOnOff", 0x1008ff04),
    ("XF86XK_KbdBrightnessUp", 0x1008ff05),
    ("XF86XK_KbdBrightnessDown", 0x1008ff06),
    ("XF86XK_Standby", 0x1008ff10),
    ("XF86XK_AudioLowerVolume", 0x1008ff11),
    ("XF86XK_AudioMute", 0x1008ff12),
    ("XF86XK_AudioRaiseVolume", 0x1008ff13),
    ("XF86XK_AudioPlay", 0x1008ff14),
    ("XF86XK_AudioStop", 0x1008ff15),
    ("XF86XK_AudioPrev", 0x1008ff16),
    ("XF86XK_AudioNext", 0x1008ff17),
    ("XF86XK_HomePage", 0x1008ff18),
    ("XF86XK_Mail", 0x1008ff19),
    ("XF86XK_Search", 0x1008ff1b),
    ("XF86XK_AudioRecord", 0x1008ff1c),
    ("XF86XK_Calculator", 0x1008ff1d),
    ("XF86XK_Back", 0x1008ff26),
    ("XF86XK_Forward", 0x1008ff27),
    ("XF86XK_Stop", 0x1008ff28),
    ("XF86XK_Refresh", 0x1008ff29),
    ("XF86XK_PowerOff", 0x1008ff2a),
    ("XF86XK_Sleep", 0x1008ff2f),
    ("XF86XK_Favorites", 0x1008ff30),
    ("XF86XK_AudioPause", 0x1008ff31),
    ("XF86XK_ScreenSaver", 0x1008ff2d),
    ("XF86XK_Copy", 0x1008ff57),
    ("XF86XK_Cut", 0x1008ff58),
    ("XF86XK_Paste", 0x1008ff6d),
    ("XF86XK_TouchpadToggle", 0x1008ffa9),
    ("XF86XK_AudioMicMute", 0x1008ffb2),
];

struct Tables {
    by_name: HashMap<&'static str, u32>,
    by_value: HashMap<u32, &'static str>,
}

fn tables() -> &'static Tables {
    static TABLES: OnceLock<Tables> = OnceLock::new();
    TABLES.get_or_init(|| {
        let mut by_name = HashMap::with_capacity(NAMED.len());
        let mut by_value = HashMap::with_capacity(NAMED.len());
        for &(name, value) in NAMED {
            by_name.insert(name, value);
            by_value.entry(value).or_insert(name);
        }
        Tables { by_name, by_value }
    })
}

/// Resolves a multi-character keysym name (case-sensitive)
pub fn lookup(name: &str) -> Option<Keysym> {
    tables().by_name.get(name).copied().map(Keysym)
}

/// Resolves a single printable character, folding letters to lower case
pub fn lookup_char(c: char) -> Option<Keysym> {
    if c.is_ascii_graphic() || c == ' ' {
        Some(Keysym(c.to_ascii_lowercase() as u32))
    } else {
        None
    }
}

/// Printable name for a keysym: the table name, or the character itself for
/// letters and digits
pub fn name_of(keysym: Keysym) -> Option<&'static str> {
    if let Some(name) = tables().by_value.get(&keysym.0) {
        return Some(name);
    }
    ALNUM
        .iter()
        .position(|&c| c as u32 == keysym.0)
        .map(|idx| &ALNUM_STR[idx..idx + 1])
}

const ALNUM_STR: &str = "0123456789abcdefghijklmnopqrstuvwxyz";
const ALNUM: &[u8] = ALNUM_STR.as_bytes();

/// Every keysym this crate can name, in a stable order: letters and digits
/// first, then the named table (aliases collapsed).
pub fn all() -> Vec<Keysym> {
    let mut result: Vec<Keysym> = ALNUM.iter().map(|&c| Keysym(c as u32)).collect();
    for &(_, value) in NAMED {
        let keysym = Keysym(value);
        if !result.contains(&keysym) {
            result.push(keysym);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_named_is_case_sensitive() {
        assert_eq!(lookup("Left"), Some(Keysym(0xff51)));
        assert_eq!(lookup("left"), None);
    }

    #[test]
    fn test_aliases_share_value_and_print_first_name() {
        assert_eq!(lookup("Page_Up"), lookup("Prior"));
        assert_eq!(name_of(Keysym(0xff55)), Some("Prior"));
    }

    #[test]
    fn test_lookup_char_folds_case() {
        assert_eq!(lookup_char('A'), lookup_char('a'));
        assert_eq!(lookup_char('a'), Some(Keysym(0x61)));
        assert_eq!(lookup_char('\t'), None);
    }

    #[test]
    fn test_all_has_no_duplicates() {
        let keysyms = all();
        let mut deduped = keysyms.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(keysyms.len(), deduped.len());
    }
}
