use crate::config::parser::parse_config;
use crate::core::expression::parse;
use crate::core::types::{KeyStroke, Keycode, ModifierMask};
use crate::display::{Emitted, RecordingRunner, VirtualDisplay, WindowSystem};
use crate::engine::compiler::compile_for_class;
use crate::engine::dispatch::{dispatch, DispatchOutcome};

fn setup(config: &str, class: &str) -> (crate::engine::DispatchTable, VirtualDisplay) {
    let config = parse_config(config).unwrap();
    let display = VirtualDisplay::new();
    let table = compile_for_class(&config, class, &display);
    (table, display)
}

fn keycode_of(display: &VirtualDisplay, expr: &str) -> Keycode {
    display.keysym_to_keycode(parse(expr).unwrap().keysym)
}

fn stroke(expr: &str) -> KeyStroke {
    parse(expr).unwrap()
}

#[test]
fn test_control_b_sends_left() {
    let (table, mut display) = setup("remap C-b => Left\n", "Firefox");
    let mut runner = RecordingRunner::new();
    let b = keycode_of(&display, "b");

    let outcome = dispatch(&table, b, ModifierMask::CONTROL, &mut display, &mut runner);

    assert_eq!(
        outcome,
        DispatchOutcome::Matched {
            rule_mask: ModifierMask::CONTROL,
            remaining: ModifierMask::empty(),
        }
    );
    assert_eq!(display.emitted(), [Emitted::Input(stroke("Left"))]);
}

#[test]
fn test_extra_shift_is_forwarded() {
    let (table, mut display) = setup("remap C-b => Left\n", "Firefox");
    let mut runner = RecordingRunner::new();
    let b = keycode_of(&display, "b");

    let outcome = dispatch(
        &table,
        b,
        ModifierMask::CONTROL | ModifierMask::SHIFT,
        &mut display,
        &mut runner,
    );

    assert_eq!(
        outcome,
        DispatchOutcome::Matched {
            rule_mask: ModifierMask::CONTROL,
            remaining: ModifierMask::SHIFT,
        }
    );
    assert_eq!(display.emitted(), [Emitted::Input(stroke("Shift-Left"))]);
}

#[test]
fn test_lock_bits_survive_into_target() {
    let (table, mut display) = setup("remap C-b => Left\n", "Firefox");
    let mut runner = RecordingRunner::new();
    let b = keycode_of(&display, "b");
    let state = ModifierMask::CONTROL | ModifierMask::LOCK | ModifierMask::MOD2;

    dispatch(&table, b, state, &mut display, &mut runner);

    let left = stroke("Left");
    assert_eq!(
        display.emitted(),
        [Emitted::Input(KeyStroke::new(
            left.keysym,
            ModifierMask::LOCK | ModifierMask::MOD2
        ))]
    );
}

#[test]
fn test_insufficient_modifiers_pass_through_unchanged() {
    let (table, mut display) = setup("remap C-M-b => Left\n", "Firefox");
    let mut runner = RecordingRunner::new();
    let b = keycode_of(&display, "b");
    let state = ModifierMask::CONTROL | ModifierMask::LOCK;

    let outcome = dispatch(&table, b, state, &mut display, &mut runner);

    assert_eq!(outcome, DispatchOutcome::PassedThrough);
    assert_eq!(
        display.emitted(),
        [Emitted::Press(KeyStroke::new(stroke("b").keysym, state))]
    );
}

#[test]
fn test_unknown_keycode_passes_through() {
    let (table, mut display) = setup("remap C-b => Left\n", "Firefox");
    let mut runner = RecordingRunner::new();
    let x = keycode_of(&display, "x");

    let outcome = dispatch(&table, x, ModifierMask::CONTROL, &mut display, &mut runner);

    assert!(!outcome.is_match());
    assert_eq!(
        display.emitted(),
        [Emitted::Press(stroke("C-x"))]
    );
    assert!(runner.commands().is_empty());
}

#[test]
fn test_scoped_two_action_rule_fires_in_order() {
    let config = "window class_not = urxvt {\nremap C-w => Ctrl-Shift-Left, Ctrl-x\n}\n";
    let (table, mut display) = setup(config, "Firefox");
    let mut runner = RecordingRunner::new();
    let w = keycode_of(&display, "w");

    dispatch(&table, w, ModifierMask::CONTROL, &mut display, &mut runner);

    assert_eq!(
        display.emitted(),
        [
            Emitted::Input(stroke("C-Shift-Left")),
            Emitted::Input(stroke("C-x")),
        ]
    );

    let (urxvt_table, display) = setup(config, "urxvt");
    assert!(urxvt_table.get(keycode_of(&display, "w"), ModifierMask::CONTROL).is_none());
}

#[test]
fn test_execute_ignores_remaining() {
    let (table, mut display) = setup("remap Super-Return => exec \"urxvt\"\n", "Firefox");
    let mut runner = RecordingRunner::new();
    let ret = keycode_of(&display, "Return");

    let outcome = dispatch(
        &table,
        ret,
        ModifierMask::MOD4 | ModifierMask::SHIFT,
        &mut display,
        &mut runner,
    );

    assert!(outcome.is_match());
    assert_eq!(runner.commands(), ["urxvt"]);
    assert!(display.emitted().is_empty());
}

#[test]
fn test_press_release_pair() {
    let (table, mut display) = setup(
        "remap C-space => press Shift_L, release Shift_L\n",
        "Firefox",
    );
    let mut runner = RecordingRunner::new();
    let space = keycode_of(&display, "space");

    dispatch(&table, space, ModifierMask::CONTROL, &mut display, &mut runner);

    let shift = stroke("Shift_L");
    assert_eq!(
        display.emitted(),
        [Emitted::Press(shift), Emitted::Release(shift)]
    );
}
