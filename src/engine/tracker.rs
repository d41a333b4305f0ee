//! Active window tracking
//!
//! Property notifications arrive for many reasons besides focus changes, so
//! the tracker samples the active window and compares it with the last
//! sample before anything is recompiled.

use std::thread;
use std::time::Duration;
use tracing::debug;

use crate::core::types::WindowHandle;
use crate::display::{WindowInfo, WindowSystem};

/// The window the engine currently compiles for
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ActiveWindowState {
    /// `WindowHandle::NONE` when nothing is focused
    pub handle: WindowHandle,
    /// Class reported by the shell feed, if any
    pub cached_class: Option<String>,
}

#[derive(Debug)]
pub struct ActiveWindowTracker {
    delay: Duration,
    state: ActiveWindowState,
    has_baseline: bool,
}

impl ActiveWindowTracker {
    /// `delay` is slept before every sample; window managers update the
    /// active-window property before the new window's metadata is ready.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: ActiveWindowState::default(),
            has_baseline: false,
        }
    }

    /// Samples the active window and reports whether it differs from the
    /// previous sample. The new sample becomes the baseline either way.
    ///
    /// The first call only records the baseline and returns `false`.
    pub fn changed<D>(&mut self, display: &D) -> bool
    where
        D: WindowSystem + ?Sized,
    {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }

        let sampled = display.fetch_active_window();

        if !self.has_baseline {
            self.has_baseline = true;
            self.state.handle = sampled;
            debug!(window = %sampled, "active window baseline");
            return false;
        }

        if sampled == self.state.handle {
            return false;
        }

        debug!(from = %self.state.handle, to = %sampled, "active window changed");
        self.state.handle = sampled;
        self.state.cached_class = None;
        true
    }

    /// Merges a shell feed report and reports whether the class changed.
    ///
    /// An empty reported class drops the cached value so the display is
    /// asked instead.
    pub fn merge_feed(&mut self, info: &WindowInfo) -> bool {
        let reported = (!info.resource_class.is_empty()).then(|| info.resource_class.clone());
        if reported == self.state.cached_class {
            return false;
        }

        debug!(
            class = info.resource_class.as_str(),
            title = info.title.as_str(),
            "shell reported window class"
        );
        self.state.cached_class = reported;
        true
    }

    pub fn current(&self) -> &ActiveWindowState {
        &self.state
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}
