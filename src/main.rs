//! CLI entry point for keyremap
//!
//! Provides commands for validating a rule file, inspecting what it compiles
//! to for a given window class, and replaying scripted events through the
//! engine.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use keyremap::config::{settings, Config, ConfigWatcher, Settings, DEFAULT_CONFIG_PATH};
use keyremap::core::{expression, WindowHandle};
use keyremap::display::{
    CommandRunner, RecordingRunner, ShellRunner, VirtualDisplay, WindowFeed, WindowSystem,
};
use keyremap::engine::{compiler, DispatchOutcome, EventHandler};
use keyremap::replay;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "keyremap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a rule file and check for conflicting remaps
    Check {
        /// Path to the rule file
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },

    /// List all remaps grouped by window scope
    List {
        /// Path to the rule file
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },

    /// Print the dispatch table for a window class
    Compile {
        /// Path to the rule file
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Window class to compile for
        #[arg(long)]
        class: String,
    },

    /// Show what key presses would produce in a window class
    Simulate {
        /// Path to the rule file
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Window class of the focused window
        #[arg(long)]
        class: String,

        /// Key expressions to press, e.g. C-b M-Shift-f
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Drive the engine from an event script (stdin by default)
    Replay {
        /// Path to the rule file
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Event script to read instead of stdin
        #[arg(short, long)]
        script: Option<PathBuf>,

        /// Reload the rule file when it changes
        #[arg(short, long)]
        watch: bool,

        /// Unix socket to accept shell window reports on
        #[arg(long)]
        feed: Option<PathBuf>,

        /// Seconds to wait before sampling the active window
        #[arg(long)]
        delay: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { config } => check_conflicts(&config)?,
        Commands::List { config } => list_remaps(&config)?,
        Commands::Compile { config, class } => compile_table(&config, &class)?,
        Commands::Simulate {
            config,
            class,
            keys,
        } => simulate(&config, &class, &keys)?,
        Commands::Replay {
            config,
            script,
            watch,
            feed,
            delay,
        } => {
            let mut settings = Settings::from_env()?;
            if let Some(raw) = delay {
                settings.window_delay = settings::parse_delay("--delay", &raw)?;
            }
            if let Some(socket) = feed {
                settings.feed_socket = Some(Config::expand_path(&socket)?);
            }
            replay_events(&config, script.as_deref(), watch, &settings)?
        }
    }

    Ok(())
}

/// Expand the path and load the rule file
fn load_config(config_path: &Path) -> anyhow::Result<(PathBuf, Config)> {
    let path = Config::expand_path(config_path)?;
    println!("{} Parsing config: {}", "→".cyan(), path.display());

    let config = Config::load(&path)?;
    Ok((path, config))
}

/// Check the rule file for conflicting remaps
fn check_conflicts(config_path: &Path) -> anyhow::Result<()> {
    let (_, config) = load_config(config_path)?;

    println!("{} Found {} remaps\n", "✓".green(), config.len());

    let conflicts = config.conflicts();

    if conflicts.is_empty() {
        println!("{} {}", "✓".green().bold(), "No conflicts detected!".bold());
    } else {
        println!(
            "{} Found {} conflict{}:\n",
            "✗".red().bold(),
            conflicts.len(),
            if conflicts.len() == 1 { "" } else { "s" }
        );

        for (i, conflict) in conflicts.iter().enumerate() {
            println!(
                "{} {}",
                format!("Conflict {}", i + 1).yellow().bold(),
                format!("{}", conflict.key_stroke).cyan()
            );

            for (idx, scoped) in conflict.conflicting_remaps.iter().enumerate() {
                println!(
                    "  {} {} → {}",
                    format!("{}.", idx + 1).dimmed(),
                    format!("[{}]", scoped.scope).magenta(),
                    scoped.remap,
                );
            }
            println!();
        }

        println!("{}", "⚠ The last rule for each trigger wins at runtime!".yellow());
        std::process::exit(1);
    }

    Ok(())
}

/// List all remaps in the rule file
fn list_remaps(config_path: &Path) -> anyhow::Result<()> {
    let (path, config) = load_config(config_path)?;

    println!("{}", format!("Remaps from: {}\n", path.display()).bold());

    for (scope, remaps) in config.groups() {
        println!("{}", format!("[{}]", scope).magenta().bold());
        for remap in remaps {
            let targets = remap
                .to
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            println!("  {} → {}", format!("{}", remap.from).cyan().bold(), targets.green());
        }
        println!();
    }

    println!("{} Total: {} remaps", "✓".green(), config.len());

    Ok(())
}

/// Print the dispatch table a window of `class` would get
fn compile_table(config_path: &Path, class: &str) -> anyhow::Result<()> {
    let (_, config) = load_config(config_path)?;
    let display = VirtualDisplay::new();

    let table = compiler::compile_for_class(&config, class, &display);

    println!("{}", format!("Dispatch table for class '{}':\n", class).bold());

    for (keycode, mask, actions) in table.bindings() {
        let key = display.keycode_to_keysym(keycode);
        let targets = actions
            .targets()
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "  {} {} → {}",
            format!("{}{}", mask.expression_prefix(), key).cyan().bold(),
            format!("(keycode {}, mask {:#x})", keycode, mask.bits()).dimmed(),
            targets.green()
        );
    }

    println!("\n{} {} grabbed keys", "✓".green(), table.len());

    Ok(())
}

/// Press keys in a virtual window and show the result
fn simulate(config_path: &Path, class: &str, keys: &[String]) -> anyhow::Result<()> {
    let (_, config) = load_config(config_path)?;

    let window = WindowHandle(1);
    let mut display = VirtualDisplay::new();
    display.add_window(window, class);
    display.focus(window);

    let mut handler = EventHandler::new(
        config,
        display,
        RecordingRunner::new(),
        std::time::Duration::ZERO,
    );

    for key in keys {
        let stroke = expression::parse(key).with_context(|| format!("Invalid key '{}'", key))?;
        let keycode = handler.display().keysym_to_keycode(stroke.keysym);
        let outcome = handler.on_key_press(keycode, stroke.modifiers);
        report_key(&stroke.to_string(), outcome, &mut handler);

        for command in handler.runner_mut().take() {
            println!("    {} {}", "exec".magenta(), command);
        }
    }

    Ok(())
}

/// Replay an event script through the engine
fn replay_events(
    config_path: &Path,
    script: Option<&Path>,
    watch: bool,
    settings: &Settings,
) -> anyhow::Result<()> {
    let (path, config) = load_config(config_path)?;

    let watcher = if watch {
        Some(ConfigWatcher::new(&path)?)
    } else {
        None
    };
    let feed = match &settings.feed_socket {
        Some(socket) => Some(WindowFeed::listen(socket)?),
        None => None,
    };

    let mut handler = EventHandler::new(
        config,
        VirtualDisplay::new(),
        ShellRunner::new(),
        settings.window_delay,
    );

    let reader: Box<dyn BufRead> = match script {
        Some(script) => Box::new(BufReader::new(
            File::open(script).with_context(|| format!("Failed to open {}", script.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;

        if let Some(watcher) = &watcher {
            if watcher.check_for_changes() {
                reload(&path, &mut handler);
            }
        }
        if let Some(info) = feed.as_ref().and_then(|f| f.latest()) {
            handler.on_window_info(&info);
        }

        let event = match replay::parse_line(&line, idx + 1) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(e) => {
                println!("{} {}", "✗".red(), e);
                continue;
            }
        };

        if let Some(outcome) = replay::apply(&mut handler, &event) {
            report_key(line.trim(), outcome, &mut handler);
        }
    }

    Ok(())
}

/// Reload after a rule file change, keeping the old rules on failure
fn reload<R: CommandRunner>(path: &Path, handler: &mut EventHandler<VirtualDisplay, R>) {
    match Config::load(path) {
        Ok(config) => {
            info!(path = %path.display(), "rule file changed");
            handler.reload(config);
        }
        Err(e) => error!(error = %e, "reload failed, keeping previous rules"),
    }
}

fn report_key<R: CommandRunner>(
    label: &str,
    outcome: DispatchOutcome,
    handler: &mut EventHandler<VirtualDisplay, R>,
) {
    let verdict = match outcome {
        DispatchOutcome::Matched { remaining, .. } if remaining.is_empty() => "remapped".green(),
        DispatchOutcome::Matched { .. } => "remapped (+modifiers)".green(),
        DispatchOutcome::PassedThrough => "passed through".yellow(),
    };
    println!("{} {}", label.cyan().bold(), verdict);

    for event in handler.display_mut().take_emitted() {
        println!("    {}", event);
    }
}
