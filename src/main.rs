// ============================================================================
// src/main.rs – rm-version-switcher entrypoint
// ============================================================================

mod cmd;
mod config;
mod device;
mod dry_run;
mod error;
mod host;
mod menu;
mod mount;
mod partition;
mod resolver;
mod session;
mod state;
mod switch;
mod ui;
mod util;
mod version;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use crate::cmd::{interactive, reset, show};
use crate::config::Config;
use crate::dry_run::DryRunStore;
use crate::host::SystemHost;
use crate::session::Session;
use crate::state::{BootBackend, Device};
use crate::ui::UX;

#[derive(Parser, Debug)]
#[command(
    name = "rm-version-switcher",
    version,
    about = "Show and change which reMarkable OS partition boots next"
)]
struct Cli {
    /// Simulate with a local marker file instead of touching the device
    #[arg(long)]
    dry_run: bool,

    /// Print the partition overview and exit
    #[arg(long)]
    show_only: bool,

    /// Reset dry run state to defaults
    #[arg(long)]
    reset_dry_run: bool,

    /// Append debug logging to the debug log file
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = Config::discover()?;
    util::logging::init(cli.debug, &cfg.logging);
    debug!("{:?}", cli);

    let ui = UX::new();
    let store = DryRunStore::new(cfg.dry_run.marker_path.clone());

    if cli.reset_dry_run {
        return reset::run_reset(&ui, &store);
    }

    let backend: Box<dyn BootBackend> = if cli.dry_run {
        Box::new(store)
    } else {
        Box::new(Device::new(SystemHost, cfg.paths))
    };

    let mut session = Session::new(backend.as_ref());
    let info = session
        .resolve()
        .context("Failed to get system info")?
        .clone();

    show::run_show(&ui, &info);
    if cli.show_only {
        return Ok(());
    }
    let result = interactive::run_interactive(&ui, &mut session, &info);
    debug!("session ended in phase {:?}", session.phase());
    result
}
