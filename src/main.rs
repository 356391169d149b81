use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use cros_updates::config::{self, Settings};
use cros_updates::fetcher::Fetcher;
use cros_updates::{commands, logging};
use cros_updates::{log_error, log_info};

const MODULE: &str = "main";

#[derive(Parser)]
#[command(name = "cros-updates")]
#[command(about = "Fetch and normalize Chrome OS device update data", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON settings file; missing fields keep their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for the data and metadata caches
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Also append log lines to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Args)]
struct OutArgs {
    /// Output directory
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the device catalog, device index and redirects
    Build(OutArgs),
    /// Load enhanced per-board metadata
    Enhanced(OutArgs),
    /// Load Chrome OS Flex data
    Flex(OutArgs),
    /// Print the device a single-device board redirects to
    Redirect {
        /// Board key
        board: String,
    },
    /// Run build, enhanced and flex
    All(OutArgs),
}

fn load_settings(cli: &Cli) -> Result<Settings, String> {
    let mut settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    if let Some(dir) = &cli.cache_dir {
        settings.cache_dir = dir.clone();
    }
    Ok(settings)
}

async fn run(cli: Cli) -> Result<bool, String> {
    let settings = load_settings(&cli)?;
    log_info!(MODULE, "Cache directory: {}", settings.cache_dir.display());

    match &cli.command {
        Commands::Build(args) => {
            commands::build_catalog(&Fetcher::new()?, &settings, &args.out).await?;
        }
        Commands::Enhanced(args) => {
            commands::load_enhanced(&Fetcher::new()?, &settings, &args.out).await?;
        }
        Commands::Flex(args) => {
            commands::load_flex_data(&Fetcher::new()?, &settings, &args.out).await?;
        }
        Commands::All(args) => commands::run_all(&Fetcher::new()?, &settings, &args.out).await?,
        Commands::Redirect { board } => match commands::lookup_redirect(&settings, board) {
            Some(device) => println!("{}", device),
            None => return Ok(false),
        },
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    logging::init();
    logging::set_log_level(cli.debug);
    if let Some(path) = &cli.log_file {
        if let Err(e) = logging::set_log_file(path) {
            log_error!(MODULE, "{}", e);
        }
    }

    log_info!(MODULE, "=== {} {} ===", config::app::NAME, env!("CARGO_PKG_VERSION"));

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            log_error!(MODULE, "{}", e);
            ExitCode::FAILURE
        }
    }
}
