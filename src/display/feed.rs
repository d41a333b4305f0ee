//! Shell integration feed
//!
//! Some desktops know the focused application long before `WM_CLASS` can be
//! read back from the server. A shell extension can report it directly: it
//! writes one JSON object per line to the feed socket,
//!
//! ```text
//! {"title": "Inbox", "resource_class": "Thunderbird", "resource_name": "Mail"}
//! ```
//!
//! and the engine treats the reported class as the authoritative class of
//! the active window. `wm_class` is accepted in place of `resource_class`.
//!
//! The listener runs on helper threads and only ever pushes into a channel;
//! the event loop drains it between events.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufRead, BufReader};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use tracing::{debug, info, warn};

use crate::display::DisplayError;

/// One active-window report
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct WindowInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "wm_class")]
    pub resource_class: String,
    #[serde(default)]
    pub resource_name: String,
}

impl WindowInfo {
    /// Parses a single report line.
    pub fn parse(line: &str) -> Result<Self, DisplayError> {
        Ok(serde_json::from_str(line.trim())?)
    }
}

/// Receiving end of the shell feed
pub struct WindowFeed {
    tx: Sender<WindowInfo>,
    rx: Receiver<WindowInfo>,
    socket_path: Option<PathBuf>,
}

impl Default for WindowFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowFeed {
    /// Creates an in-process feed. Reports arrive through [`sender`](Self::sender).
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self {
            tx,
            rx,
            socket_path: None,
        }
    }

    /// Creates a feed that listens on a Unix socket.
    ///
    /// A stale socket file at `path` is removed first. Each connection is
    /// served on its own thread; malformed lines are logged and skipped.
    pub fn listen(path: &Path) -> Result<Self, DisplayError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        if path.exists() {
            fs::remove_file(path)?;
        }

        let listener = UnixListener::bind(path)?;
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        let mut feed = Self::new();
        feed.socket_path = Some(path.to_path_buf());

        let tx = feed.tx.clone();
        thread::spawn(move || {
            for stream in listener.incoming() {
                match stream {
                    Ok(stream) => {
                        let tx = tx.clone();
                        thread::spawn(move || serve_connection(stream, tx));
                    }
                    Err(e) => warn!(error = %e, "feed accept failed"),
                }
            }
        });

        info!(socket = %path.display(), "window feed listening");
        Ok(feed)
    }

    /// Handle for pushing reports from inside the process
    pub fn sender(&self) -> Sender<WindowInfo> {
        self.tx.clone()
    }

    /// Drains pending reports and returns the newest one.
    pub fn latest(&self) -> Option<WindowInfo> {
        self.rx.try_iter().last()
    }

    pub fn socket_path(&self) -> Option<&Path> {
        self.socket_path.as_deref()
    }
}

impl Drop for WindowFeed {
    fn drop(&mut self) {
        if let Some(path) = &self.socket_path {
            let _ = fs::remove_file(path);
        }
    }
}

fn serve_connection(stream: UnixStream, tx: Sender<WindowInfo>) {
    debug!("feed client connected");
    for line in BufReader::new(stream).lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "feed read failed");
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match WindowInfo::parse(&line) {
            Ok(info) => {
                if tx.send(info).is_err() {
                    return; // feed dropped
                }
            }
            Err(e) => warn!(error = %e, line = %line, "ignoring window report"),
        }
    }
}
