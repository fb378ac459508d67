use std::fmt;
use std::io::{Stdout, Write};
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use forecast_core::{
    Config, ForecastScreen, PatternDateFormatter, ServiceDataSource, Task, service_from_config,
};
use inquire::{CustomType, InquireError, Select, Text};
use tokio::runtime::Handle;
use tracing::debug;

use crate::coordinator::Coordinator;
use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Forecast screen in the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the forecast and print the grid.
    Show {
        #[command(flatten)]
        screen: ScreenArgs,

        /// Print the laid-out cells as JSON instead of drawing them.
        #[arg(long)]
        json: bool,
    },

    /// Load the forecast and pick days interactively.
    Browse {
        #[command(flatten)]
        screen: ScreenArgs,
    },

    /// Interactively edit and save the configuration.
    Configure,

    /// Print where the configuration file lives.
    ConfigPath,
}

/// Per-run overrides for the saved configuration.
#[derive(Debug, Args)]
pub struct ScreenArgs {
    /// Viewport width in terminal columns.
    #[arg(long, env = "COLUMNS")]
    width: Option<f64>,

    /// Location name shown in the title.
    #[arg(long)]
    location: Option<String>,

    /// Number of forecast days.
    #[arg(long)]
    days: Option<usize>,

    /// Simulated latency per request, in milliseconds.
    #[arg(long)]
    latency_ms: Option<u64>,

    /// Make the forecast request fail.
    #[arg(long)]
    fail: bool,
}

impl ScreenArgs {
    fn apply(self, config: &mut Config) {
        if let Some(width) = self.width {
            config.viewport_width = width;
        }
        if let Some(location) = self.location {
            config.location = Some(location);
        }
        if let Some(days) = self.days {
            config.days = days;
        }
        if let Some(latency_ms) = self.latency_ms {
            config.demo.latency_ms = latency_ms;
        }
        if self.fail {
            config.demo.fail_forecast = true;
        }
    }

    fn into_config(self) -> anyhow::Result<Config> {
        let mut config = Config::load()?;
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Show { screen, json } => show(screen.into_config()?, json).await,
            Command::Browse { screen } => browse(screen.into_config()?).await,
            Command::Configure => configure(),
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

/// Screen plus the collaborators it only holds weakly.
struct Hosted {
    screen: ForecastScreen,
    _source: Rc<ServiceDataSource>,
    coordinator: Rc<Coordinator<Stdout>>,
}

async fn open_screen(config: &Config) -> Hosted {
    let today = Local::now().date_naive();
    let service = Arc::from(service_from_config(config, today));
    let source = Rc::new(ServiceDataSource::new(service, Handle::current()));
    let coordinator = Rc::new(Coordinator::new(std::io::stdout()));

    let mut screen = ForecastScreen::new()
        .with_grid(config.grid)
        .with_date_formatter(PatternDateFormatter::new(config.date_format.as_str()));
    screen.set_data_source(&source);
    screen.set_delegate(&coordinator);

    coordinator.switch_to(Task::Forecast);
    screen.activate();
    source.settle().await;
    debug!(cells = screen.cell_count(), state = ?screen.state(), "forecast screen ready");

    Hosted { screen, _source: source, coordinator }
}

async fn show(config: Config, json: bool) -> anyhow::Result<()> {
    let hosted = open_screen(&config).await;
    let screen = &hosted.screen;
    let metrics = screen.on_viewport_resized(config.viewport_width);

    let mut out = std::io::stdout().lock();
    if json {
        let snapshot = render::snapshot(screen, metrics)?;
        serde_json::to_writer_pretty(&mut out, &snapshot).context("Failed to write JSON output")?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", screen.title())?;
        for line in render::render_grid(screen, metrics)? {
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}

enum Choice {
    Day { index: usize, text: String },
    Help,
    Quit,
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Day { text, .. } => f.write_str(text),
            Choice::Help => f.write_str("Help"),
            Choice::Quit => f.write_str("Quit"),
        }
    }
}

async fn browse(config: Config) -> anyhow::Result<()> {
    let hosted = open_screen(&config).await;
    let screen = &hosted.screen;

    loop {
        let metrics = screen.on_viewport_resized(config.viewport_width);
        println!("{}", screen.title());
        for line in render::render_grid(screen, metrics)? {
            println!("{line}");
        }

        let mut choices = Vec::with_capacity(screen.cell_count() + 2);
        for index in 0..screen.cell_count() {
            let cell = screen.render_cell(index)?;
            let text = format!("{}  {}", cell.date_label, cell.label);
            choices.push(Choice::Day { index, text });
        }
        choices.push(Choice::Help);
        choices.push(Choice::Quit);

        let picked = match Select::new("Pick a day:", choices).prompt() {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err.into()),
        };

        match picked {
            Choice::Day { index, .. } => screen.on_cell_activated(index)?,
            Choice::Help => screen.on_help_activated(),
            Choice::Quit => break,
        }
    }

    debug!(task = %hosted.coordinator.task(), "leaving browse");
    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let current_location = cfg.location_name().unwrap_or_default().to_string();
    let location = Text::new("Location name:").with_default(&current_location).prompt()?;
    cfg.location = Some(location.trim().to_string()).filter(|s| !s.is_empty());

    cfg.days = CustomType::<usize>::new("Days of forecast:").with_default(cfg.days).prompt()?;
    cfg.viewport_width = CustomType::<f64>::new("Viewport width (columns):")
        .with_default(cfg.viewport_width)
        .prompt()?;

    let current_format = cfg.date_format.clone();
    cfg.date_format = Text::new("Date format (strftime):").with_default(&current_format).prompt()?;

    cfg.validate()?;
    cfg.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
