//! huewheel - control Philips Hue lights from a color wheel
//!
//! ## Usage
//!
//! ```bash
//! # Find the bridge on your network and open the control loop
//! huewheel run
//!
//! # Explore the interface against a bundled fixture, no bridge needed
//! huewheel demo
//! ```

mod display;

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use huewheel_bridge::FullState;
use huewheel_session::{CONNECTING, RecoveryAction, Session, SettingsStore, WheelMode};

use display::*;

/// Full state served in demo mode instead of a bridge.
const DEMO_STATE: &str = include_str!("demo.json");

/// huewheel - control Philips Hue lights from a color wheel
#[derive(Parser)]
#[command(name = "huewheel")]
#[command(about = "A color wheel for Philips Hue lights")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (defaults to the platform data directory)
    #[arg(short, long)]
    settings: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to the bridge and open the interactive control loop
    Run,
    /// Run against a bundled fixture without touching the network
    Demo,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("huewheel=info".parse().unwrap())
                .add_directive("huewheel_session=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let store = match &cli.settings {
        Some(path) => SettingsStore::open(path.clone())?,
        None => SettingsStore::open_default()?,
    };
    tracing::debug!(path = %store.path().display(), "settings file");
    let mut session = Session::new(store);

    match cli.command {
        Commands::Run => cmd_run(&mut session).await,
        Commands::Demo => cmd_demo(&mut session).await,
    }
}

async fn cmd_run(session: &mut Session) -> Result<()> {
    print_banner();
    startup(session).await?;
    control_loop(session).await
}

async fn cmd_demo(session: &mut Session) -> Result<()> {
    print_banner();
    load_demo(session)?;
    control_loop(session).await
}

/// Runs the startup pipeline, walking through the banner's recovery
/// options until the session is usable.
async fn startup(session: &mut Session) -> Result<()> {
    loop {
        print_info(CONNECTING);
        match session.init().await {
            Ok(()) => {
                if let Some(banner) = session.banner() {
                    print_success(banner.text());
                }
                // Printing is this UI's whole banner lifecycle.
                session.dismiss_banner();
                return Ok(());
            }
            Err(error) => {
                print_error(&error.user_message());
                match error.recovery() {
                    Some(RecoveryAction::Retry) => {
                        if !confirm("Try again?")? {
                            anyhow::bail!("startup aborted");
                        }
                    }
                    Some(RecoveryAction::DemoMode) => {
                        if confirm("Start in demo mode instead?")? {
                            load_demo(session)?;
                            return Ok(());
                        }
                        anyhow::bail!("startup aborted");
                    }
                    None => return Err(error.into()),
                }
            }
        }
    }
}

fn load_demo(session: &mut Session) -> Result<()> {
    let state: FullState =
        serde_json::from_str(DEMO_STATE).context("demo fixture is not valid full-state JSON")?;
    session.start_demo(state);
    print_demo_mode();
    Ok(())
}

async fn control_loop(session: &mut Session) -> Result<()> {
    print_lights(session);
    print_interactive_help();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print_prompt(if session.is_demo() { "demo" } else { "hue" });
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input).is_err() {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                print_info("Goodbye!");
                break;
            }
            "help" | "?" => print_interactive_help(),
            "list" | "ls" => print_lights(session),
            "wheel" | "w" => print_wheel(session),
            "on" | "off" => {
                let on = cmd == "on";
                match parts.get(1) {
                    Some(id) => match session.toggle_light(id, on).await {
                        Ok(()) => print_lights(session),
                        Err(error) => print_error(&error.to_string()),
                    },
                    None => print_warning(&format!("Usage: {} <light-id>", cmd)),
                }
            }
            "toggle" | "t" => match parts.get(1) {
                Some(id) => match session.record(id).map(|r| !r.is_on()) {
                    Some(on) => match session.toggle_light(id, on).await {
                        Ok(()) => print_lights(session),
                        Err(error) => print_error(&error.to_string()),
                    },
                    None => print_error(&format!("No light with id {}", id)),
                },
                None => print_warning("Usage: toggle <light-id>"),
            },
            "bri" | "b" => {
                match (parts.get(1), parts.get(2).and_then(|v| v.parse::<u8>().ok())) {
                    (Some(id), Some(bri)) => match session.set_brightness(id, bri).await {
                        Ok(()) => print_lights(session),
                        Err(error) => print_error(&error.to_string()),
                    },
                    _ => print_warning("Usage: bri <light-id> <1-254>"),
                }
            }
            "hue" | "h" => {
                match (
                    parts.get(1),
                    parts.get(2).and_then(|v| v.parse::<f32>().ok()),
                ) {
                    (Some(id), Some(degrees)) => {
                        match session.set_marker_hue(id, degrees).await {
                            Ok(()) => print_wheel(session),
                            Err(error) => print_error(&error.to_string()),
                        }
                    }
                    _ => print_warning("Usage: hue <light-id> <0-360>"),
                }
            }
            "mode" | "m" => {
                let mode = match parts.get(1).map(|m| m.to_lowercase()).as_deref() {
                    Some("mono") | Some("monochromatic") => Some(WheelMode::Monochromatic),
                    Some("custom") => Some(WheelMode::Custom),
                    // Bare `mode` flips between the two.
                    None => Some(match session.wheel().mode() {
                        WheelMode::Custom => WheelMode::Monochromatic,
                        WheelMode::Monochromatic => WheelMode::Custom,
                    }),
                    Some(_) => None,
                };
                match mode {
                    Some(mode) => {
                        session.set_mode(mode).await;
                        print_wheel(session);
                    }
                    None => print_warning("Usage: mode [mono|custom]"),
                }
            }
            "random" | "r" => {
                session.randomize_colors().await;
                print_wheel(session);
            }
            "settings" | "s" => {
                if settings_editor(session)? {
                    tracing::info!("settings changed, restarting session");
                    startup(session).await?;
                    print_lights(session);
                }
            }
            _ => print_warning(&format!("Unknown command: {} (help for a list)", cmd)),
        }
    }

    Ok(())
}

/// Interactive settings editor. Returns true when something changed and
/// the session has to start over.
fn settings_editor(session: &mut Session) -> Result<bool> {
    let before = session.settings().clone();
    print_settings(&before);

    let bridge_ip = prompt("Bridge IP (empty keeps current, '-' clears)")?;
    let auto = prompt("Auto-discover on start? (y/n, empty keeps current)")?;
    let forget = prompt("Forget the stored bridge username? (y/n)")?;

    session.update_settings(|s| {
        match bridge_ip.as_str() {
            "" => {}
            "-" => s.bridge_ip = None,
            ip => s.bridge_ip = Some(ip.to_string()),
        }
        match auto.to_lowercase().as_str() {
            "y" | "yes" => s.auto_discover = true,
            "n" | "no" => s.auto_discover = false,
            _ => {}
        }
        if matches!(forget.to_lowercase().as_str(), "y" | "yes") {
            s.username = None;
        }
    })?;

    if let Some(entries) = session.settings().lights.clone() {
        println!();
        println!("{}", "Lights:".yellow().bold());
        for entry in &entries {
            let shown = if entry.active { "shown" } else { "hidden" };
            println!("  {} {}", entry.name.cyan(), format!("({})", shown).dimmed());
        }
        let toggle = prompt("Toggle visibility of (light name, empty skips)")?;
        if !toggle.is_empty() {
            session.update_settings(|s| {
                if let Some(list) = s.lights.as_mut()
                    && let Some(entry) = list.iter_mut().find(|e| e.name == toggle)
                {
                    entry.active = !entry.active;
                }
            })?;
        }
    }

    let changed = *session.settings() != before;
    if changed {
        print_info("Settings changed, reconnecting.");
    }
    Ok(changed)
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} {} ", question.yellow(), "[y/N]".dimmed());
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn prompt(question: &str) -> Result<String> {
    print!("{} ", format!("{}:", question).cyan());
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_demo_fixture_parses() {
        let state: FullState = serde_json::from_str(DEMO_STATE).unwrap();
        assert_eq!(state.lights.len(), 4);
        // The wheel needs at least one color-capable light.
        assert!(state.lights.values().any(|l| l.state.xy.is_some()));
        assert_eq!(state.config.bridgeid, "001788FFFE09ABCD");
    }

    #[tokio::test]
    async fn test_demo_session_builds() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::open(dir.path().join("settings.json")).unwrap();
        let mut session = Session::new(store);

        let state: FullState = serde_json::from_str(DEMO_STATE).unwrap();
        session.start_demo(state);

        assert!(session.is_demo());
        assert_eq!(session.records().len(), 4);
        // Three color lights get markers, id 4 is dimmable-only.
        assert_eq!(session.wheel().table().len(), 3);
        assert_eq!(session.panels().off_panel(), &["3"]);
    }

    #[tokio::test]
    async fn test_demo_changes_stay_local() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::open(dir.path().join("settings.json")).unwrap();
        let mut session = Session::new(store);
        let state: FullState = serde_json::from_str(DEMO_STATE).unwrap();
        session.start_demo(state);

        session.toggle_light("3", true).await.unwrap();
        assert!(session.record("3").unwrap().is_on());
        assert_eq!(session.flush().await, 0);
    }
}
