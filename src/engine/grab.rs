//! Key grab management
//!
//! Only keys with a compiled rule are grabbed, each with exactly the mask
//! it was written with. Every other key reaches applications without a
//! round trip through the remapper.
//!
//! Slots on `Keycode::NONE` are never grabbed: X11 treats a grab on keycode
//! 0 as a grab on every key.

use tracing::{debug, info, warn};

use crate::core::types::{Keycode, ModifierMask, WindowHandle};
use crate::display::WindowSystem;
use crate::engine::compiler::DispatchTable;

#[derive(Debug, Default)]
pub struct GrabManager {
    grabbed: Vec<(Keycode, ModifierMask)>,
}

impl GrabManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all grabs with the slots of `table`.
    ///
    /// Old grabs are always released. Nothing new is grabbed when no window
    /// has focus.
    pub fn apply<D>(&mut self, window: WindowHandle, table: &DispatchTable, display: &mut D)
    where
        D: WindowSystem + ?Sized,
    {
        display.ungrab_all();
        self.grabbed.clear();

        if window.is_none() {
            debug!("no active window, keys released");
            return;
        }

        for stroke in table.unmapped() {
            warn!(
                keysym = %stroke.keysym,
                mask = stroke.modifiers.bits(),
                "trigger has no keycode in the current layout, not grabbing"
            );
        }

        for (keycode, mask, _) in table.bindings() {
            if keycode.is_none() {
                continue;
            }
            display.grab_key(keycode, mask);
            self.grabbed.push((keycode, mask));
        }

        info!(window = %window, keys = self.grabbed.len(), "grabbed remapped keys");
    }

    pub fn grabbed(&self) -> &[(Keycode, ModifierMask)] {
        &self.grabbed
    }
}
