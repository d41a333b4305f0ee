//! Remap configuration: the rule model, its loader, and runtime settings.
//!
//! A [`Config`] groups remaps by the scope they were declared in. It is built
//! once at load time and is read-only afterwards; a reload builds a fresh
//! `Config` and swaps it in whole.
//!
//! - **Rule groups**: an ordered mapping from [`Scope`] to remaps, filled with
//!   an explicit insert-or-append operation
//! - **Rule files**: parsed by [`parser`], see that module for the syntax
//! - **Settings**: runtime knobs from the environment, see [`settings`]
//! - **Hot reload**: [`watcher::ConfigWatcher`] reports edits to the rule file
//!
//! # Example
//!
//! ```no_run
//! use keyremap::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Path::new("/home/user/.config/keyremap/config.remap"))?;
//! for remap in config.remaps_for_class("Firefox") {
//!     println!("{}", remap);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod parser;
pub mod settings;
pub mod watcher;

pub use error::ConfigError;
pub use parser::ParseError;
pub use settings::Settings;
pub use watcher::ConfigWatcher;

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::conflict::{Conflict, ConflictDetector};
use crate::core::scope::{self, Scope, WindowScope};
use crate::core::types::Remap;

/// Default rule file location, before tilde expansion
pub const DEFAULT_CONFIG_PATH: &str = "~/.config/keyremap/config.remap";

/// Remap rules grouped by window scope.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Scope groups in order of first declaration.
    groups: Vec<(Scope, Vec<Remap>)>,
    /// File the rules came from, if any.
    source: Option<PathBuf>,
}

impl Config {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and parses a rule file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file doesn't exist, or
    /// `ConfigError::Parse` with a line number if any statement is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let mut config = parser::parse_config(&content)?;
        config.source = Some(path.to_path_buf());

        info!(
            path = %path.display(),
            remaps = config.len(),
            scopes = config.groups.len(),
            "config loaded"
        );

        Ok(config)
    }

    /// Expands `~` in a user-supplied path.
    pub fn expand_path(path: &Path) -> Result<PathBuf, ConfigError> {
        let raw = path
            .to_str()
            .ok_or_else(|| ConfigError::InvalidPath(path.display().to_string()))?;
        Ok(PathBuf::from(shellexpand::tilde(raw).as_ref()))
    }

    /// Appends a remap to its scope group, creating the group on first use.
    pub fn add_remap(&mut self, scope: Scope, remap: Remap) {
        match self.groups.iter_mut().find(|(existing, _)| *existing == scope) {
            Some((_, remaps)) => remaps.push(remap),
            None => self.groups.push((scope, vec![remap])),
        }
    }

    /// All groups, in declaration order.
    pub fn groups(&self) -> &[(Scope, Vec<Remap>)] {
        &self.groups
    }

    /// Remaps declared outside any window block.
    pub fn any_window_remaps(&self) -> &[Remap] {
        self.groups
            .iter()
            .find(|(scope, _)| *scope == Scope::AnyWindow)
            .map(|(_, remaps)| remaps.as_slice())
            .unwrap_or(&[])
    }

    /// Class-restricted scopes, in declaration order.
    pub fn window_scopes(&self) -> impl Iterator<Item = &WindowScope> {
        self.groups.iter().filter_map(|(scope, _)| match scope {
            Scope::Window(window) => Some(window),
            Scope::AnyWindow => None,
        })
    }

    /// Every remap that applies to a window of the given class.
    ///
    /// AnyWindow remaps come first, followed by each matching scope's remaps
    /// in declaration order.
    pub fn remaps_for_class(&self, window_class: &str) -> Vec<&Remap> {
        let matched = scope::resolve(self.window_scopes(), window_class);

        let scoped = self.groups.iter().filter_map(|(scope, remaps)| match scope {
            Scope::Window(window) if matched.iter().any(|m| std::ptr::eq(*m, window)) => {
                Some(remaps)
            }
            _ => None,
        });

        self.any_window_remaps()
            .iter()
            .chain(scoped.flatten())
            .collect()
    }

    /// Triggers bound more than once in overlapping scopes.
    pub fn conflicts(&self) -> Vec<Conflict> {
        let mut detector = ConflictDetector::new();
        for (scope, remaps) in &self.groups {
            for remap in remaps {
                detector.add_remap(scope, remap);
            }
        }
        detector.find_conflicts()
    }

    /// Total number of remaps across all scopes.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, remaps)| remaps.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

#[cfg(test)]
mod tests;
