//! Event script replay
//!
//! Drives an [`EventHandler`] over a [`VirtualDisplay`] from a line-based
//! script, so a rule file can be exercised without a display server. One
//! event per line:
//!
//! ```text
//! # comment
//! window 0x1 Firefox        # create a window with a class
//! focus 0x1                 # focus it (property notify follows)
//! key C-b                   # press a key expression
//! keycode 56 4              # press a raw keycode with a raw state mask
//! layout b 200              # rebind a keysym (mapping notify follows)
//! shell {"resource_class": "Firefox"}
//! ```
//!
//! Handles and numbers accept decimal or `0x` hex.

use thiserror::Error;

use crate::core::expression::{self, ExpressionError};
use crate::core::types::{Keycode, KeyStroke, ModifierMask, WindowHandle};
use crate::display::{CommandRunner, DisplayError, VirtualDisplay, WindowInfo, WindowSystem};
use crate::engine::{DispatchOutcome, EventHandler};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Script error on line {line}: {message}")]
    InvalidEvent { line: usize, message: String },

    #[error("Invalid key expression on line {line}: {source}")]
    InvalidExpression {
        line: usize,
        #[source]
        source: ExpressionError,
    },

    #[error("Invalid window report on line {line}: {source}")]
    InvalidReport {
        line: usize,
        #[source]
        source: DisplayError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One scripted event
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReplayEvent {
    Window { handle: WindowHandle, class: String },
    Focus(WindowHandle),
    Key(KeyStroke),
    Keycode { keycode: Keycode, state: ModifierMask },
    Layout { key: KeyStroke, keycode: Keycode },
    Shell(WindowInfo),
}

/// Parses one script line. Blank lines and comments yield `None`.
pub fn parse_line(line: &str, line_num: usize) -> Result<Option<ReplayEvent>, ReplayError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let invalid = |message: String| ReplayError::InvalidEvent {
        line: line_num,
        message,
    };

    let (verb, rest) = trimmed
        .split_once(char::is_whitespace)
        .map(|(v, r)| (v, r.trim()))
        .unwrap_or((trimmed, ""));

    let event = match verb {
        "window" => {
            let (handle, class) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| invalid("expected 'window ID CLASS'".to_string()))?;
            ReplayEvent::Window {
                handle: WindowHandle(parse_number(handle).map_err(&invalid)?),
                class: class.trim().to_string(),
            }
        }
        "focus" => ReplayEvent::Focus(WindowHandle(parse_number(rest).map_err(&invalid)?)),
        "key" => ReplayEvent::Key(parse_stroke(rest, line_num)?),
        "keycode" => {
            let mut parts = rest.split_whitespace();
            let (code, state) = match (parts.next(), parts.next(), parts.next()) {
                (Some(code), Some(state), None) => (code, state),
                _ => return Err(invalid("expected 'keycode CODE STATE'".to_string())),
            };
            ReplayEvent::Keycode {
                keycode: Keycode(parse_u32(code).map_err(&invalid)?),
                state: ModifierMask::from_bits_retain(parse_u32(state).map_err(&invalid)?),
            }
        }
        "layout" => {
            let mut parts = rest.split_whitespace();
            let (key, code) = match (parts.next(), parts.next(), parts.next()) {
                (Some(key), Some(code), None) => (key, code),
                _ => return Err(invalid("expected 'layout KEYSYM CODE'".to_string())),
            };
            ReplayEvent::Layout {
                key: parse_stroke(key, line_num)?,
                keycode: Keycode(parse_u32(code).map_err(&invalid)?),
            }
        }
        "shell" => ReplayEvent::Shell(WindowInfo::parse(rest).map_err(|source| {
            ReplayError::InvalidReport {
                line: line_num,
                source,
            }
        })?),
        other => return Err(invalid(format!("unknown event '{}'", other))),
    };

    Ok(Some(event))
}

/// Parses a whole script.
pub fn parse_script(content: &str) -> Result<Vec<ReplayEvent>, ReplayError> {
    let mut events = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if let Some(event) = parse_line(line, idx + 1)? {
            events.push(event);
        }
    }
    Ok(events)
}

/// Feeds one event to the handler.
///
/// Returns the dispatch outcome for key events and `None` for the rest.
pub fn apply<R>(
    handler: &mut EventHandler<VirtualDisplay, R>,
    event: &ReplayEvent,
) -> Option<DispatchOutcome>
where
    R: CommandRunner,
{
    match event {
        ReplayEvent::Window { handle, class } => {
            handler.display_mut().add_window(*handle, class.clone());
            None
        }
        ReplayEvent::Focus(handle) => {
            handler.display_mut().focus(*handle);
            handler.on_property_notify();
            None
        }
        ReplayEvent::Key(stroke) => {
            let keycode = handler.display().keysym_to_keycode(stroke.keysym);
            Some(handler.on_key_press(keycode, stroke.modifiers))
        }
        ReplayEvent::Keycode { keycode, state } => Some(handler.on_key_press(*keycode, *state)),
        ReplayEvent::Layout { key, keycode } => {
            handler.display_mut().set_layout(key.keysym, *keycode);
            handler.on_mapping_notify();
            None
        }
        ReplayEvent::Shell(info) => {
            handler.on_window_info(info);
            None
        }
    }
}

fn parse_stroke(expr: &str, line: usize) -> Result<KeyStroke, ReplayError> {
    expression::parse(expr).map_err(|source| ReplayError::InvalidExpression { line, source })
}

/// Keycodes and X11 state masks are 32-bit; larger values are rejected.
fn parse_u32(raw: &str) -> Result<u32, String> {
    let value = parse_number(raw)?;
    u32::try_from(value).map_err(|_| format!("'{}' does not fit in 32 bits", raw.trim()))
}

fn parse_number(raw: &str) -> Result<u64, String> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    parsed.map_err(|_| format!("invalid number '{}'", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parser::parse_config;
    use crate::display::{Emitted, RecordingRunner};
    use std::time::Duration;

    #[test]
    fn test_parse_script() {
        let script = r#"
# set up
window 0x1 Firefox
focus 1
key C-b
keycode 56 0x14
layout b 200
shell {"wm_class": "urxvt"}
"#;
        let events = parse_script(script).unwrap();

        assert_eq!(events.len(), 6);
        assert_eq!(
            events[0],
            ReplayEvent::Window {
                handle: WindowHandle(1),
                class: "Firefox".to_string()
            }
        );
        assert_eq!(
            events[3],
            ReplayEvent::Keycode {
                keycode: Keycode(56),
                state: ModifierMask::CONTROL | ModifierMask::MOD2,
            }
        );
        assert!(matches!(&events[5], ReplayEvent::Shell(info) if info.resource_class == "urxvt"));
    }

    #[test]
    fn test_parse_errors_carry_line() {
        assert!(matches!(
            parse_script("focus 1\njump 2\n"),
            Err(ReplayError::InvalidEvent { line: 2, .. })
        ));
        assert!(matches!(
            parse_script("key C-Nope\n"),
            Err(ReplayError::InvalidExpression { line: 1, .. })
        ));
        assert!(matches!(
            parse_script("\n\nshell {oops\n"),
            Err(ReplayError::InvalidReport { line: 3, .. })
        ));
        assert!(matches!(
            parse_script("focus zz\n"),
            Err(ReplayError::InvalidEvent { line: 1, .. })
        ));
        assert!(matches!(
            parse_script("window 3\n"),
            Err(ReplayError::InvalidEvent { line: 1, .. })
        ));
    }

    #[test]
    fn test_oversized_numbers_are_rejected() {
        assert!(matches!(
            parse_script("keycode 4294967352 4\n"),
            Err(ReplayError::InvalidEvent { line: 1, .. })
        ));
        assert!(matches!(
            parse_script("keycode 56 0x100000004\n"),
            Err(ReplayError::InvalidEvent { line: 1, .. })
        ));
        assert!(matches!(
            parse_script("layout b 4294967296\n"),
            Err(ReplayError::InvalidEvent { line: 1, .. })
        ));

        let events = parse_script("keycode 0xffffffff 4\n").unwrap();
        assert_eq!(
            events[0],
            ReplayEvent::Keycode {
                keycode: Keycode(u32::MAX),
                state: ModifierMask::CONTROL,
            }
        );
    }

    #[test]
    fn test_replay_drives_handler() {
        let config = parse_config(
            "remap C-b => Left\nwindow class_only = urxvt {\nremap C-a => Home\n}\n",
        )
        .unwrap();
        let mut handler = EventHandler::new(
            config,
            VirtualDisplay::new(),
            RecordingRunner::new(),
            Duration::ZERO,
        );
        assert!(handler.table().is_empty());

        let script = "window 2 urxvt\nfocus 2\nkey C-a\nkey C-q\n";
        let outcomes: Vec<Option<DispatchOutcome>> = parse_script(script)
            .unwrap()
            .iter()
            .map(|event| apply(&mut handler, event))
            .collect();

        assert_eq!(outcomes[0], None);
        assert_eq!(outcomes[1], None);
        assert!(outcomes[2].unwrap().is_match());
        assert_eq!(outcomes[3], Some(DispatchOutcome::PassedThrough));

        let emitted = handler.display_mut().take_emitted();
        assert_eq!(emitted[0], Emitted::Input(expression::parse("Home").unwrap()));
    }
}
