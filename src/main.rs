// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use port_schedule::{load_settings, Settings};
use std::fs::File;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let settings = load_settings().context("configuration could not be initialized")?;
    init_tracing(&settings)?;

    run_ui_mode(settings)
}

/// Log to a file so the alternate screen stays clean
fn init_tracing(settings: &Settings) -> Result<()> {
    let log_file = File::create(&settings.log_file)
        .with_context(|| format!("failed to create log file {}", settings.log_file))?;

    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(log_file))
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(settings: Settings) -> Result<()> {
    use port_schedule::{Dashboard, ScheduleClient};

    println!("🚢 Loading Port Schedule Monitor...\n");
    println!("   Schedule: {}", settings.schedule_url);
    println!("   Roster:   {}", settings.roster_url);
    println!("   Logs:     {}\n", settings.log_file);

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let client = ScheduleClient::from_settings(&settings);
    let dashboard = Dashboard::new(settings.pinned_line.clone());

    let mut app = ui::App::new(dashboard, client, runtime.handle().clone());
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_settings: Settings) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use web UI: cargo run --bin port-schedule-server --features server");
    std::process::exit(1);
}
