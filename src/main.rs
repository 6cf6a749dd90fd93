use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{fs::File, io, path::Path, sync::Arc, sync::Mutex};
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod clock;
mod config;
mod geo;
mod owm;
mod state;
mod ui;
mod units;
mod weather;

use crate::app::{run_app, Services};
use crate::cli::Args;
use crate::config::{Config, LocationProvider};
use crate::geo::{DeniedLocator, FixedLocator, IpLocator, Locator};
use crate::owm::WeatherClient;
use crate::state::AppState;

/// Logs go to a file; the terminal belongs to the UI.
fn init_logging(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    }
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn build_services(config: &Config) -> Result<Services> {
    let locator: Arc<dyn Locator> = match config.location.provider {
        LocationProvider::Ip => Arc::new(
            IpLocator::new(&config.location.endpoint, config.timeout())
                .context("Failed to set up the location lookup")?,
        ),
        LocationProvider::Fixed => Arc::new(FixedLocator(config.fixed_position()?)),
        LocationProvider::Off => Arc::new(DeniedLocator),
    };

    let api_key = config.api_key.as_deref().unwrap_or_default().trim();
    let weather = WeatherClient::new(&config.endpoint, api_key, config.timeout())
        .context("Failed to set up the weather client")?;

    Ok(Services {
        locator,
        weather: Arc::new(weather),
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    config.apply_args(&args);
    config.validate()?;

    init_logging(&config.log_path())?;
    tracing::info!(
        provider = ?config.location.provider,
        endpoint = %config.endpoint,
        "wxnow starting"
    );

    let services = build_services(&config)?;
    let state = AppState::new(args.city.clone());

    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // create app and run it
    let res = run_app(&mut terminal, state, services);

    // restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "terminal failure");
        println!("{:?}", err)
    }

    Ok(())
}
