use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inquire::{Select, Text};

use skycast_core::{
    Config, Coordinates, Dashboard, HistoryStore, JsonFileHistoryStore, NoticeKind,
    StaticCoordinates,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "SkyCast weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Show the dashboard for a city and exit.
    Show {
        /// City name, e.g. "New York" or "Paris, FR".
        city: String,
    },

    /// Show the dashboard for explicit device coordinates and exit.
    Here {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },

    /// Print the recent-search list.
    History,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Some(Command::Configure) => configure(),
            Some(Command::Show { city }) => show(&city).await,
            Some(Command::Here { lat, lon }) => here(lat, lon).await,
            Some(Command::History) => history(),
            None => interactive().await,
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = Text::new("OpenWeather API key:")
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key.trim().to_string());
    config.save()?;

    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

fn build_dashboard() -> Result<Dashboard<JsonFileHistoryStore>> {
    let config = Config::load()?;
    let store = JsonFileHistoryStore::at_default_path()?;
    Ok(Dashboard::new(config.resolve_api_key(), store)?)
}

async fn show(city: &str) -> Result<()> {
    let mut dashboard = build_dashboard()?;

    if let Err(err) = dashboard.search(city).await {
        bail!("{}", err.user_message());
    }
    if let Some(view) = dashboard.view() {
        render::dashboard(view);
    }
    Ok(())
}

async fn here(lat: f64, lon: f64) -> Result<()> {
    let mut dashboard = build_dashboard()?;
    let provider = StaticCoordinates(Coordinates {
        latitude: lat,
        longitude: lon,
    });

    if let Err(err) = dashboard.locate(&provider).await {
        bail!("{}", err.user_message());
    }
    if let Some(view) = dashboard.view() {
        render::dashboard(view);
    }
    Ok(())
}

fn history() -> Result<()> {
    let store = JsonFileHistoryStore::at_default_path()?;
    let entries = store.load()?;

    if entries.is_empty() {
        println!("No recent searches.");
    } else {
        for city in entries {
            println!("{city}");
        }
    }
    Ok(())
}

const ACTION_SEARCH: &str = "Search for a city";
const ACTION_REFRESH: &str = "Refresh";
const ACTION_HISTORY: &str = "Search again from history";
const ACTION_FORGET: &str = "Remove a city from history";
const ACTION_QUIT: &str = "Quit";

/// Session-style dashboard: search, refresh and history behave as they do in
/// the single-page app.
async fn interactive() -> Result<()> {
    let mut dashboard = build_dashboard()?;
    println!("SkyCast — interactive dashboard.");

    loop {
        let mut actions = vec![ACTION_SEARCH, ACTION_REFRESH];
        if !dashboard.history().is_empty() {
            actions.push(ACTION_HISTORY);
            actions.push(ACTION_FORGET);
        }
        actions.push(ACTION_QUIT);

        let Some(action) = Select::new("What next?", actions)
            .prompt_skippable()
            .context("Failed to read menu choice")?
        else {
            break;
        };

        match action {
            ACTION_SEARCH => {
                let city = Text::new("City:").prompt().context("Failed to read city")?;
                let _ = dashboard.search(&city).await;
            }
            ACTION_REFRESH => {
                let _ = dashboard.refresh().await;
            }
            ACTION_HISTORY => {
                let cities = dashboard.history().to_vec();
                if let Some(city) = Select::new("Recent searches:", cities)
                    .prompt_skippable()
                    .context("Failed to read history choice")?
                {
                    let _ = dashboard.search(&city).await;
                }
            }
            ACTION_FORGET => {
                let cities = dashboard.history().to_vec();
                if let Some(city) = Select::new("Remove which?", cities)
                    .prompt_skippable()
                    .context("Failed to read history choice")?
                {
                    dashboard.remove_from_history(&city);
                }
            }
            _ => break,
        }

        print_notice(&mut dashboard);
        if let Some(view) = dashboard.view() {
            render::dashboard(view);
        }
    }

    Ok(())
}

fn print_notice<S: HistoryStore>(dashboard: &mut Dashboard<S>) {
    if let Some(notice) = dashboard.notice() {
        match notice.kind {
            NoticeKind::Success => println!("✔ {}", notice.message),
            NoticeKind::Error => println!("✘ {}", notice.message),
        }
    }
}
