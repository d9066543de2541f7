mod commands;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand};
use tracing::{error, info};

use commands::{CliError, Headless};

#[derive(Parser, Debug)]
#[command(name = "floorplan", about = "Headless floor canvas: fit, focus, scene and overlay dumps")]
struct Cli {
    /// Viewport width in CSS pixels.
    #[arg(long, env = "FLOORPLAN_VIEWPORT_WIDTH", default_value_t = 1280.0)]
    viewport_width: f64,

    /// Viewport height in CSS pixels.
    #[arg(long, env = "FLOORPLAN_VIEWPORT_HEIGHT", default_value_t = 800.0)]
    viewport_height: f64,

    /// Fit padding on each side; overrides the config file.
    #[arg(long, env = "FLOORPLAN_PADDING")]
    padding: Option<f64>,

    /// JSON canvas config.
    #[arg(long, env = "FLOORPLAN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Camera that fits every element into the viewport.
    Fit { plan: PathBuf },
    /// Camera that focuses a floor section.
    Focus { plan: PathBuf, section: String },
    /// Paint-ready nodes in draw order.
    Scene {
        plan: PathBuf,
        /// JSON object of element id to status.
        #[arg(long)]
        statuses: Option<PathBuf>,
        /// Clock reading for seated timers, epoch ms. Defaults to now.
        #[arg(long)]
        now_ms: Option<f64>,
    },
    /// Overlay layout for every seated element.
    Overlay {
        plan: PathBuf,
        #[arg(long)]
        statuses: Option<PathBuf>,
        #[arg(long)]
        now_ms: Option<f64>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("floorplan: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String, CliError> {
    let config = commands::load_config(cli.config.as_deref(), cli.padding)?;
    let headless = Headless::new(config, cli.viewport_width, cli.viewport_height);

    let value = match cli.command {
        Command::Fit { plan } => {
            info!(plan = %plan.display(), "fit");
            headless.fit(&commands::read_json(&plan)?)?
        }
        Command::Focus { plan, section } => {
            info!(plan = %plan.display(), section = %section, "focus");
            headless.focus(&commands::read_json(&plan)?, &section)?
        }
        Command::Scene { plan, statuses, now_ms } => {
            info!(plan = %plan.display(), "scene");
            let statuses = commands::load_statuses(statuses.as_deref())?;
            headless.scene(&commands::read_json(&plan)?, statuses, now_ms.unwrap_or_else(now_epoch_ms))?
        }
        Command::Overlay { plan, statuses, now_ms } => {
            info!(plan = %plan.display(), "overlay");
            let statuses = commands::load_statuses(statuses.as_deref())?;
            headless.overlays(&commands::read_json(&plan)?, &statuses, now_ms.unwrap_or_else(now_epoch_ms))?
        }
    };
    Ok(serde_json::to_string_pretty(&value)?)
}

fn now_epoch_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64() * 1000.0)
}
