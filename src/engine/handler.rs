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

//! Event handler facade
//!
//! The display binding's event loop owns one `EventHandler` and forwards
//! three kinds of server events to it:
//!
//! - key presses on grabbed keys ([`on_key_press`](EventHandler::on_key_press))
//! - property changes on the root window ([`on_property_notify`](EventHandler::on_property_notify))
//! - keyboard mapping changes ([`on_mapping_notify`](EventHandler::on_mapping_notify))
//!
//! Shell feed reports and config reloads come in through
//! [`on_window_info`](EventHandler::on_window_info) and
//! [`reload`](EventHandler::reload). Every path that can change which rules
//! apply ends in the same recompile-and-regrab step.

use std::time::Duration;
use tracing::info;

use crate::config::Config;
use crate::core::types::{Keycode, ModifierMask};
use crate::display::{CommandRunner, WindowInfo, WindowSystem};
use crate::engine::compiler::{self, DispatchTable};
use crate::engine::dispatch::{self, DispatchOutcome};
use crate::engine::grab::GrabManager;
use crate::engine::tracker::{ActiveWindowState, ActiveWindowTracker};

pub struct EventHandler<D: WindowSystem, R: CommandRunner> {
    config: Config,
    display: D,
    runner: R,
    tracker: ActiveWindowTracker,
    grabs: GrabManager,
    table: DispatchTable,
}

impl<D: WindowSystem, R: CommandRunner> EventHandler<D, R> {
    /// Takes the initial active-window sample and compiles for it.
    pub fn new(config: Config, display: D, runner: R, window_delay: Duration) -> Self {
        let mut tracker = ActiveWindowTracker::new(window_delay);
        tracker.changed(&display);

        let mut handler = Self {
            config,
            display,
            runner,
            tracker,
            grabs: GrabManager::new(),
            table: DispatchTable::new(),
        };
        handler.remap();
        handler
    }

    /// A grabbed key was pressed.
    pub fn on_key_press(&mut self, keycode: Keycode, state: ModifierMask) -> DispatchOutcome {
        dispatch::dispatch(&self.table, keycode, state, &mut self.display, &mut self.runner)
    }

    /// A root window property changed. Recompiles only if focus moved.
    pub fn on_property_notify(&mut self) -> bool {
        if self.tracker.changed(&self.display) {
            self.remap();
            true
        } else {
            false
        }
    }

    /// The keyboard mapping changed; keycodes must be recomputed.
    pub fn on_mapping_notify(&mut self) {
        self.remap();
    }

    /// The shell reported the active window. Recompiles if the class changed.
    pub fn on_window_info(&mut self, info: &WindowInfo) -> bool {
        if self.tracker.merge_feed(info) {
            self.remap();
            true
        } else {
            false
        }
    }

    /// Swaps in a freshly loaded rule set.
    pub fn reload(&mut self, config: Config) {
        info!(remaps = config.len(), "rules reloaded");
        self.config = config;
        self.remap();
    }

    fn remap(&mut self) {
        let window = self.tracker.current();
        self.table = compiler::compile(&self.config, window, &mut self.display);
        self.grabs.apply(window.handle, &self.table, &mut self.display);
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    pub fn window(&self) -> &ActiveWindowState {
        self.tracker.current()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn grabs(&self) -> &GrabManager {
        &self.grabs
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn runner_mut(&mut self) -> &mut R {
        &mut self.runner
    }
}
