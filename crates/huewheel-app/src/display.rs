//! Terminal rendering for the switch panels, the wheel and the banner.

use colored::Colorize;

use huewheel_color::hsv_to_hex;
use huewheel_session::{Session, Settings};

/// Print the application banner
pub fn print_banner() {
    println!();
    println!(
        "{}",
        "╔═══════════════════════════════════════════════════╗".cyan()
    );
    println!(
        "{}",
        "║      huewheel - a color wheel for your Hue        ║".cyan()
    );
    println!(
        "{}",
        "╚═══════════════════════════════════════════════════╝".cyan()
    );
    println!();
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg.green());
}

/// Print an info message
pub fn print_info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg.dimmed());
}

/// Print an error message
pub fn print_error(msg: &str) {
    println!("{} {}", "✗".red().bold(), msg.red());
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg.yellow());
}

/// Print the command prompt
pub fn print_prompt(scope: &str) {
    print!("{} {} ", format!("[{}]", scope).cyan(), ">".green());
}

/// Print interactive mode help
pub fn print_interactive_help() {
    println!();
    println!("{}", "Commands:".yellow().bold());
    println!("  {}            - Show the lights", "list".cyan());
    println!("  {}           - Show the color wheel", "wheel".cyan());
    println!("  {}     - Switch a light", "on/off <id>".cyan());
    println!("  {}     - Flip a light's switch", "toggle <id>".cyan());
    println!("  {}  - Set brightness", "bri <id> <1-254>".cyan());
    println!(
        "  {}  - Move a light's marker around the wheel",
        "hue <id> <0-360>".cyan()
    );
    println!(
        "  {}            - Toggle or set the wheel mode (mono|custom)",
        "mode".cyan()
    );
    println!(
        "  {}          - Shuffle colors among the lit lights",
        "random".cyan()
    );
    println!("  {}        - Edit bridge and light settings", "settings".cyan());
    println!("  {}            - Show this help", "help".cyan());
    println!("  {}            - Exit", "quit".cyan());
    println!();
}

/// Print both switch panels, lit lights first.
pub fn print_lights(session: &Session) {
    println!();
    println!("{}", "Lights:".yellow().bold());
    println!("{}", "───────────────────────────────────────".dimmed());
    if session.records().is_empty() {
        println!("{}", "  (no lights)".dimmed());
    }
    for id in session.panels().on_panel() {
        print_light_row(session, id);
    }
    for id in session.panels().off_panel() {
        print_light_row(session, id);
    }
    println!();
}

fn print_light_row(session: &Session, light_id: &str) {
    let Some(record) = session.record(light_id) else {
        return;
    };
    let switch = if record.is_on() {
        "on ".green().bold()
    } else {
        "off".red().dimmed()
    };
    let color = match record.xy() {
        Some(xy) => {
            let hex = xy.to_hex(1.0);
            format!("{} {}", swatch(&hex), hex.dimmed())
        }
        None => "no color".dimmed().to_string(),
    };
    let reach = if record.is_reachable() {
        String::new()
    } else {
        format!(" {}", "unreachable".red().dimmed())
    };
    println!(
        "  {} {} {} {} {:>3} {}{}",
        format!("{:>2}.", record.id()).dimmed(),
        switch,
        format!("{:<18}", record.name()).cyan(),
        bri_bar(record.bri()).dimmed(),
        record.bri(),
        color,
        reach
    );
}

/// Print the wheel markers in stacking order.
pub fn print_wheel(session: &Session) {
    let wheel = session.wheel();
    println!();
    println!(
        "{} {}",
        "Color wheel".yellow().bold(),
        format!("({:?} mode)", wheel.mode()).dimmed()
    );
    println!("{}", "───────────────────────────────────────".dimmed());
    if wheel.table().is_empty() {
        println!("{}", "  (no color-capable lights)".dimmed());
    }
    for (position, light_id) in wheel.table().iter() {
        let Some(marker) = wheel.marker(light_id) else {
            continue;
        };
        let name = session
            .record(light_id)
            .map(|r| r.name().to_string())
            .unwrap_or_else(|| light_id.to_string());
        let hex = hsv_to_hex(marker.hsv);
        let visibility = if marker.visible {
            "visible".green()
        } else {
            "hidden".dimmed()
        };
        println!(
            "  {} {} {} {} {} {}",
            format!("{}.", position).dimmed(),
            swatch(&hex),
            format!("{:<18}", name).cyan(),
            format!("{:>5.1}°", marker.hsv.hue.into_positive_degrees()).bold(),
            hex.dimmed(),
            visibility
        );
    }
    println!();
}

/// Print the stored settings.
pub fn print_settings(settings: &Settings) {
    println!();
    println!("{}", "Settings:".yellow().bold());
    println!("{}", "───────────────────────────────────────".dimmed());
    println!(
        "  {} {}",
        "Bridge IP:".cyan(),
        settings.bridge_ip.as_deref().unwrap_or("(none yet)")
    );
    println!(
        "  {} {}",
        "Auto-discover:".cyan(),
        if settings.auto_discover { "yes" } else { "no" }
    );
    println!(
        "  {} {}",
        "Paired:".cyan(),
        if settings.username.is_some() {
            "yes"
        } else {
            "no"
        }
    );
}

/// Print the demo mode banner
pub fn print_demo_mode() {
    println!();
    println!(
        "{}",
        "════════════════════════════════════════════════════".yellow()
    );
    println!(
        "{}",
        "  Running in DEMO mode - changes stay local         ".yellow()
    );
    println!(
        "{}",
        "════════════════════════════════════════════════════".yellow()
    );
    println!();
}

/// A terminal color chip for a `#rrggbb` string.
fn swatch(hex: &str) -> colored::ColoredString {
    let rgb = u32::from_str_radix(hex.trim_start_matches('#'), 16).unwrap_or(0xffffff);
    "██".truecolor((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

fn bri_bar(bri: u8) -> String {
    let filled = (usize::from(bri) * 10 + 127) / 254;
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}
