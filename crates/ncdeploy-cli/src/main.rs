//! ncdeploy CLI - newscollector deployment orchestrator

use clap::{Parser, Subcommand};
use miette::Result;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

/// ncdeploy - deploy and operate the newscollector service
#[derive(Debug, Parser)]
#[command(name = "ncdeploy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project root directory
    #[arg(short = 'C', long, global = true)]
    project: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build the image and deploy it to a remote host
    Deploy(commands::deploy::DeployArgs),

    /// Start the deployed container on a remote host
    Start(commands::start::StartArgs),

    /// Stop the deployed container on a remote host
    Stop(commands::stop::StopArgs),

    /// Create the remote directory layout and default configuration
    Setup(commands::setup::SetupArgs),

    /// Import local data into a running remote deployment
    ImportData(commands::import_data::ImportDataArgs),

    /// Run the service locally (compose or host process)
    LocalStart(commands::local_start::LocalStartArgs),

    /// Smoke-test a local deployment
    LocalTest(commands::local_test::LocalTestArgs),
}

fn main() -> Result<()> {
    // Initialize tracing with indicatif layer for progress bar support
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let indicatif_layer = IndicatifLayer::new();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(indicatif_layer.get_stderr_writer()))
        .with(indicatif_layer)
        .with(filter)
        .init();

    let cli = Cli::parse();

    // Determine project root
    let project_root = if let Some(ref path) = cli.project {
        camino::Utf8PathBuf::from(path)
    } else {
        std::env::current_dir()
            .ok()
            .and_then(|p| camino::Utf8PathBuf::try_from(p).ok())
            .unwrap_or_else(|| camino::Utf8PathBuf::from("."))
    };

    match cli.command {
        Commands::Deploy(args) => commands::deploy::run(&project_root, args),
        Commands::Start(args) => commands::start::run(&project_root, args),
        Commands::Stop(args) => commands::stop::run(&project_root, args),
        Commands::Setup(args) => commands::setup::run(&project_root, args),
        Commands::ImportData(args) => commands::import_data::run(&project_root, args),
        Commands::LocalStart(args) => commands::local_start::run(&project_root, args),
        Commands::LocalTest(args) => commands::local_test::run(&project_root, args),
    }
}
