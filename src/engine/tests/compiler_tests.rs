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

//! Compiler module tests
//!
//! Tests for turning rules into dispatch tables:
//! - Slot insertion and overwrite
//! - Most-specific-mask lookup
//! - Null window and class lookup handling
//! - AnyWindow and scoped rule ordering

use crate::config::parser::parse_config;
use crate::core::expression::parse;
use crate::core::types::{Keycode, ModifierMask, Target, WindowHandle};
use crate::display::{VirtualDisplay, WindowSystem};
use crate::engine::compiler::*;
use crate::engine::tracker::ActiveWindowState;

fn actions(exprs: &[&str]) -> ActionList {
    ActionList::new(
        exprs
            .iter()
            .map(|e| Target::Input(parse(e).unwrap()))
            .collect(),
    )
}

fn window(handle: u64) -> ActiveWindowState {
    ActiveWindowState {
        handle: WindowHandle(handle),
        cached_class: None,
    }
}

#[test]
fn test_insert_overwrites_in_place() {
    let mut table = DispatchTable::new();
    table.insert(Keycode(10), ModifierMask::CONTROL, actions(&["Left"]));
    table.insert(Keycode(10), ModifierMask::MOD1, actions(&["Right"]));
    table.insert(Keycode(10), ModifierMask::CONTROL, actions(&["Home"]));

    assert_eq!(table.len(), 2);
    assert_eq!(
        table.get(Keycode(10), ModifierMask::CONTROL),
        Some(&actions(&["Home"]))
    );

    let masks: Vec<ModifierMask> = table.bindings().iter().map(|(_, m, _)| *m).collect();
    assert_eq!(masks, vec![ModifierMask::CONTROL, ModifierMask::MOD1]);
}

#[test]
fn test_lookup_requires_subset() {
    let mut table = DispatchTable::new();
    table.insert(
        Keycode(10),
        ModifierMask::CONTROL | ModifierMask::MOD1,
        actions(&["Left"]),
    );

    assert!(table.lookup(Keycode(10), ModifierMask::CONTROL).is_none());
    assert!(table
        .lookup(
            Keycode(10),
            ModifierMask::CONTROL | ModifierMask::MOD1 | ModifierMask::SHIFT
        )
        .is_some());
    assert!(table.lookup(Keycode(11), ModifierMask::all()).is_none());
}

#[test]
fn test_lookup_prefers_most_specific_mask() {
    let mut table = DispatchTable::new();
    table.insert(Keycode(10), ModifierMask::CONTROL, actions(&["Left"]));
    table.insert(
        Keycode(10),
        ModifierMask::CONTROL | ModifierMask::SHIFT,
        actions(&["Home"]),
    );

    let (mask, found) = table
        .lookup(Keycode(10), ModifierMask::CONTROL | ModifierMask::SHIFT)
        .unwrap();
    assert_eq!(mask, ModifierMask::CONTROL | ModifierMask::SHIFT);
    assert_eq!(found, &actions(&["Home"]));

    let (mask, _) = table.lookup(Keycode(10), ModifierMask::CONTROL).unwrap();
    assert_eq!(mask, ModifierMask::CONTROL);
}

#[test]
fn test_lookup_equal_specificity_goes_to_earliest() {
    let mut table = DispatchTable::new();
    table.insert(Keycode(10), ModifierMask::MOD1, actions(&["Right"]));
    table.insert(Keycode(10), ModifierMask::CONTROL, actions(&["Left"]));

    let (mask, _) = table
        .lookup(Keycode(10), ModifierMask::CONTROL | ModifierMask::MOD1)
        .unwrap();
    assert_eq!(mask, ModifierMask::MOD1);
}

#[test]
fn test_empty_mask_rule_matches_any_state() {
    let mut table = DispatchTable::new();
    table.insert(Keycode(10), ModifierMask::empty(), actions(&["Left"]));

    let state = ModifierMask::from_bits_retain(ModifierMask::MOD2.bits() | 1 << 13);
    assert_eq!(
        table.lookup(Keycode(10), state).map(|(m, _)| m),
        Some(ModifierMask::empty())
    );
}

#[test]
fn test_null_window_compiles_empty_without_class_lookup() {
    let config = parse_config("remap C-b => Left\n").unwrap();
    let mut display = VirtualDisplay::new();

    let table = compile(&config, &window(0), &mut display);

    assert!(table.is_empty());
    assert_eq!(display.class_lookups(), 0);
}

#[test]
fn test_cached_class_skips_display_lookup() {
    let config = parse_config("window class_only = Firefox {\nremap M-f => C-f\n}\n").unwrap();
    let mut display = VirtualDisplay::new();
    display.add_window(WindowHandle(1), "Navigator");

    let state = ActiveWindowState {
        handle: WindowHandle(1),
        cached_class: Some("Firefox".to_string()),
    };
    let table = compile(&config, &state, &mut display);

    assert_eq!(table.len(), 1);
    assert_eq!(display.class_lookups(), 0);
}

#[test]
fn test_failed_class_lookup_uses_empty_class() {
    let config = parse_config(
        "window class_not = urxvt {\nremap C-w => C-BackSpace\n}\n\
         window class_only = urxvt {\nremap C-a => Home\n}\n",
    )
    .unwrap();
    let mut display = VirtualDisplay::new();
    display.add_unclassed_window(WindowHandle(5));

    let state = window(5);
    assert_eq!(window_class(&state, &mut display), "");

    let table = compile(&config, &state, &mut display);
    let w = display.keysym_to_keycode(parse("w").unwrap().keysym);
    assert_eq!(table.len(), 1);
    assert!(table.get(w, ModifierMask::CONTROL).is_some());
}

#[test]
fn test_any_window_rules_always_present() {
    let config = parse_config(
        "remap C-b => Left\nremap C-f => Right\n\
         window class_only = urxvt {\nremap C-a => Home\n}\n",
    )
    .unwrap();
    let display = VirtualDisplay::new();

    for class in ["urxvt", "Firefox", ""] {
        let table = compile_for_class(&config, class, &display);
        for expr in ["C-b", "C-f"] {
            let stroke = parse(expr).unwrap();
            let keycode = display.keysym_to_keycode(stroke.keysym);
            assert!(
                table.get(keycode, stroke.modifiers).is_some(),
                "{} missing for class {:?}",
                expr,
                class
            );
        }
    }
}

#[test]
fn test_scoped_rule_overrides_any_window_rule() {
    let config = parse_config(
        "window class_only = Emacs {\nremap C-b => C-b\n}\nremap C-b => Left\n",
    )
    .unwrap();
    let display = VirtualDisplay::new();
    let b = parse("C-b").unwrap();
    let keycode = display.keysym_to_keycode(b.keysym);

    let emacs = compile_for_class(&config, "Emacs", &display);
    assert_eq!(emacs.get(keycode, b.modifiers), Some(&actions(&["C-b"])));

    let other = compile_for_class(&config, "Firefox", &display);
    assert_eq!(other.get(keycode, b.modifiers), Some(&actions(&["Left"])));
}

#[test]
fn test_perform_merges_remaining_into_key_targets() {
    let mut display = VirtualDisplay::new();
    let mut runner = crate::display::RecordingRunner::new();
    let list = ActionList::new(vec![
        Target::Press(parse("C-Shift_L").unwrap()),
        Target::Execute("notify-send hi".to_string()),
    ]);

    list.invoke(ModifierMask::MOD1, &mut display, &mut runner);

    assert_eq!(
        display
            .emitted()
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>(),
        vec!["press C-M-Shift_L"]
    );
    assert_eq!(runner.commands(), ["notify-send hi"]);
}

#[test]
fn test_build_table_records_unmapped_triggers() {
    let config =
        parse_config("remap C-b => Left\nremap M-b => Right\nremap C-f => End\n").unwrap();
    let mut display = VirtualDisplay::new();
    let b = parse("b").unwrap().keysym;
    display.set_layout(parse("a").unwrap().keysym, display.keysym_to_keycode(b));

    let table = compile_for_class(&config, "Firefox", &display);

    assert_eq!(
        table.unmapped(),
        [parse("C-b").unwrap(), parse("M-b").unwrap()]
    );
    // Slots are still compiled; only grabbing skips them
    assert!(table.get(Keycode::NONE, ModifierMask::CONTROL).is_some());
}
