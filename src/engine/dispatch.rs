//! Event dispatch
//!
//! Matches one caught key press against the compiled table. A match runs the
//! rule's actions with the modifiers the rule didn't consume; anything else
//! is replayed unchanged.

use tracing::debug;

use crate::core::types::{Keycode, ModifierMask};
use crate::display::{CommandRunner, WindowSystem};
use crate::engine::compiler::DispatchTable;

/// What happened to a key press
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DispatchOutcome {
    /// A rule fired
    Matched {
        rule_mask: ModifierMask,
        remaining: ModifierMask,
    },
    /// No rule applied; the press was replayed as-is
    PassedThrough,
}

impl DispatchOutcome {
    pub fn is_match(self) -> bool {
        matches!(self, DispatchOutcome::Matched { .. })
    }
}

/// Handles one key press.
pub fn dispatch<D, R>(
    table: &DispatchTable,
    keycode: Keycode,
    state: ModifierMask,
    display: &mut D,
    runner: &mut R,
) -> DispatchOutcome
where
    D: WindowSystem + ?Sized,
    R: CommandRunner + ?Sized,
{
    match table.lookup(keycode, state) {
        Some((rule_mask, actions)) => {
            let remaining = state.difference(rule_mask);
            debug!(
                %keycode,
                state = state.bits(),
                rule_mask = rule_mask.bits(),
                remaining = remaining.bits(),
                actions = actions.targets().len(),
                "key matched"
            );
            actions.invoke(remaining, display, runner);
            DispatchOutcome::Matched {
                rule_mask,
                remaining,
            }
        }
        None => {
            let keysym = display.keycode_to_keysym(keycode);
            debug!(%keycode, state = state.bits(), "key passed through");
            display.synthesize_press(keysym, state);
            DispatchOutcome::PassedThrough
        }
    }
}
