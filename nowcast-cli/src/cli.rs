use anyhow::{Context, bail};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use inquire::{Confirm, Password, PasswordDisplayMode};
use nowcast_core::{
    Config, Coordinate, FixedPosition, IpGeolocation, LocationProvider, LocationService,
    Permission, Refresh, WeatherScreen, source_from_config,
};
use tracing::info;

use crate::{
    consent::{self, AskFirst},
    render,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "nowcast", version, about = "Current, hourly and daily weather")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the WeatherAPI key and whether IP-based location lookup is allowed.
    Configure,

    /// Show the weather screen for your location.
    Show(ShowArgs),
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Latitude to use instead of looking up your location.
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude to use instead of looking up your location.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// WeatherAPI key for this run only; the config file is left untouched.
    #[arg(long)]
    pub api_key: Option<String>,

    /// Print the snapshot and hourly window as JSON.
    #[arg(long)]
    pub json: bool,

    /// Exit on failure instead of offering a retry.
    #[arg(long)]
    pub no_retry: bool,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure().await,
            Command::Show(args) => show(args).await,
        }
    }
}

async fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let config = tokio::task::spawn_blocking(move || -> anyhow::Result<Config> {
        let key = Password::new("WeatherAPI key:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .with_help_message("Get one at https://www.weatherapi.com; leave empty to keep the current key")
            .prompt()
            .context("Failed to read API key")?;
        if !key.trim().is_empty() {
            config.set_api_key(key);
        }

        let auto_detect = Confirm::new("Look up your approximate location from your IP address?")
            .with_default(config.location.auto_detect.unwrap_or(true))
            .prompt()
            .context("Failed to read location preference")?;
        config.location.auto_detect = Some(auto_detect);

        Ok(config)
    })
    .await
    .context("Configuration prompt task failed")??;

    config.require_api_key()?;
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn location_provider(args: &ShowArgs, stored: &Config) -> anyhow::Result<LocationProvider> {
    let service: Box<dyn LocationService> = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => Box::new(FixedPosition(Coordinate::new(lat, lon))),
        _ => {
            let lookup = IpGeolocation::with_timeout(
                Permission::from_setting(stored.location.auto_detect),
                stored.location.fix_timeout(),
            )?;
            Box::new(AskFirst::new(
                lookup,
                stored.clone(),
                Config::config_file_path()?,
                consent::terminal_prompt(),
            ))
        }
    };

    Ok(LocationProvider::new(service)
        .with_fallback(stored.location.fallback())
        .with_fix_timeout(stored.location.fix_timeout())
        .with_permission_timeout(stored.location.permission_timeout()))
}

async fn ask_retry() -> bool {
    let answer = tokio::task::spawn_blocking(|| {
        Confirm::new("Retry?").with_default(true).prompt()
    })
    .await;

    matches!(answer, Ok(Ok(true)))
}

async fn show(args: ShowArgs) -> anyhow::Result<()> {
    let stored = Config::load()?;

    let mut config = stored.clone();
    if let Some(key) = &args.api_key {
        config.set_api_key(key.clone());
    }

    let source = source_from_config(&config)?;
    let location = location_provider(&args, &stored)?;
    info!(fallback = %location.fallback(), "location provider ready");

    let screen = WeatherScreen::new(location, source);

    loop {
        if !args.json {
            eprintln!("{}", render::LOADING);
        }

        match screen.refresh(Local::now().naive_local()).await {
            Refresh::Ready(loaded) => {
                if args.json {
                    let out = serde_json::json!({
                        "coordinate": loaded.coordinate,
                        "snapshot": loaded.snapshot,
                        "hourly": loaded.hourly,
                    });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                } else {
                    print!("{}", render::screen(&loaded));
                }
                return Ok(());
            }
            Refresh::Failed(e) => {
                eprintln!("{}", render::FAILED);
                if args.no_retry || !ask_retry().await {
                    return Err(e).context(render::FAILED);
                }
            }
            Refresh::AlreadyRunning => bail!("A refresh is already running"),
        }
    }
}
