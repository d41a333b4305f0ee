use std::time::Duration;

use crate::config::parser::parse_config;
use crate::core::expression::parse;
use crate::core::types::{Keycode, ModifierMask, WindowHandle};
use crate::display::{Emitted, RecordingRunner, VirtualDisplay, WindowInfo, WindowSystem};
use crate::engine::{DispatchOutcome, EventHandler};

const RULES: &str = r#"
remap C-b => Left
window class_not = urxvt {
    remap C-w => Ctrl-Shift-Left, Ctrl-x
}
window class_only = Firefox {
    remap C-l => exec "notify-send location"
}
"#;

fn handler_with(
    windows: &[(u64, &str)],
    focused: u64,
) -> EventHandler<VirtualDisplay, RecordingRunner> {
    let mut display = VirtualDisplay::new();
    for (handle, class) in windows {
        display.add_window(WindowHandle(*handle), *class);
    }
    display.focus(WindowHandle(focused));

    EventHandler::new(
        parse_config(RULES).unwrap(),
        display,
        RecordingRunner::new(),
        Duration::ZERO,
    )
}

fn keycode_of(handler: &EventHandler<VirtualDisplay, RecordingRunner>, expr: &str) -> Keycode {
    handler
        .display()
        .keysym_to_keycode(parse(expr).unwrap().keysym)
}

#[test]
fn test_initial_compile_grabs_rule_keys() {
    let handler = handler_with(&[(1, "Firefox")], 1);

    assert_eq!(handler.table().len(), 3);
    assert_eq!(handler.grabs().grabbed().len(), 3);
    assert_eq!(handler.display().grabs(), handler.grabs().grabbed());
}

#[test]
fn test_focus_change_recompiles() {
    let mut handler = handler_with(&[(1, "Firefox"), (2, "urxvt")], 1);
    let w = keycode_of(&handler, "w");

    handler.display_mut().focus(WindowHandle(2));
    assert!(handler.on_property_notify());

    assert_eq!(handler.table().len(), 1);
    assert_eq!(
        handler.on_key_press(w, ModifierMask::CONTROL),
        DispatchOutcome::PassedThrough
    );

    // Unrelated property change
    assert!(!handler.on_property_notify());
}

#[test]
fn test_two_action_rule_end_to_end() {
    let mut handler = handler_with(&[(1, "Firefox")], 1);
    let w = keycode_of(&handler, "w");

    assert!(handler.on_key_press(w, ModifierMask::CONTROL).is_match());

    let emitted = handler.display_mut().take_emitted();
    assert_eq!(
        emitted,
        vec![
            Emitted::Input(parse("C-Shift-Left").unwrap()),
            Emitted::Input(parse("C-x").unwrap()),
        ]
    );
}

#[test]
fn test_execute_goes_to_runner() {
    let mut handler = handler_with(&[(1, "Firefox")], 1);
    let l = keycode_of(&handler, "l");

    handler.on_key_press(l, ModifierMask::CONTROL);

    assert_eq!(handler.runner().commands(), ["notify-send location"]);
}

#[test]
fn test_null_window_releases_everything() {
    let mut handler = handler_with(&[(1, "Firefox")], 1);

    handler.display_mut().focus(WindowHandle::NONE);
    let lookups_before = handler.display().class_lookups();
    assert!(handler.on_property_notify());

    assert!(handler.table().is_empty());
    assert!(handler.display().grabs().is_empty());
    assert_eq!(handler.display().class_lookups(), lookups_before);
}

#[test]
fn test_mapping_notify_follows_new_layout() {
    let mut handler = handler_with(&[(1, "Firefox")], 1);
    let b = parse("b").unwrap().keysym;

    handler.display_mut().set_layout(b, Keycode(200));
    handler.on_mapping_notify();

    assert!(handler
        .on_key_press(Keycode(200), ModifierMask::CONTROL)
        .is_match());
}

#[test]
fn test_shell_feed_class_wins() {
    let mut handler = handler_with(&[(1, "Navigator")], 1);
    let l = keycode_of(&handler, "l");
    assert!(!handler.on_key_press(l, ModifierMask::CONTROL).is_match());

    let info = WindowInfo {
        title: "Mozilla Firefox".to_string(),
        resource_class: "Firefox".to_string(),
        resource_name: "Navigator".to_string(),
    };
    assert!(handler.on_window_info(&info));
    assert!(!handler.on_window_info(&info));

    assert_eq!(handler.window().cached_class.as_deref(), Some("Firefox"));
    assert!(handler.on_key_press(l, ModifierMask::CONTROL).is_match());
}

#[test]
fn test_reload_swaps_rules() {
    let mut handler = handler_with(&[(1, "Firefox")], 1);
    let f = keycode_of(&handler, "f");
    assert!(!handler.on_key_press(f, ModifierMask::CONTROL).is_match());

    handler.reload(parse_config("remap C-f => Right\n").unwrap());

    assert_eq!(handler.config().len(), 1);
    assert_eq!(handler.table().len(), 1);
    assert!(handler.on_key_press(f, ModifierMask::CONTROL).is_match());
}

#[test]
fn test_unmapped_trigger_is_never_grabbed_as_any_key() {
    let mut display = VirtualDisplay::new();
    display.add_window(WindowHandle(1), "Firefox");
    display.focus(WindowHandle(1));

    // Put `a` on b's keycode, leaving `b` without one
    let a = parse("a").unwrap().keysym;
    let b = parse("b").unwrap().keysym;
    let b_code = display.keysym_to_keycode(b);
    display.set_layout(a, b_code);
    assert!(display.keysym_to_keycode(b).is_none());

    let mut handler = EventHandler::new(
        parse_config("remap C-b => Left\nremap C-f => Right\n").unwrap(),
        display,
        RecordingRunner::new(),
        Duration::ZERO,
    );

    assert_eq!(handler.table().unmapped(), [parse("C-b").unwrap()]);
    assert!(handler
        .display()
        .grabs()
        .iter()
        .all(|(keycode, _)| !keycode.is_none()));
    assert_eq!(handler.grabs().grabbed().len(), 1);

    // Mapping `b` again brings its grab back
    handler.display_mut().set_layout(b, Keycode(230));
    handler.on_mapping_notify();
    assert!(handler.table().unmapped().is_empty());
    assert!(handler
        .display()
        .grabs()
        .contains(&(Keycode(230), ModifierMask::CONTROL)));
}
