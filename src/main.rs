use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use peso_tracker::core::Currency;
use peso_tracker::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for peso_tracker::AppCommand {
    fn from(cmd: Commands) -> peso_tracker::AppCommand {
        match cmd {
            Commands::Ingest => peso_tracker::AppCommand::Ingest,
            Commands::Serve => peso_tracker::AppCommand::Serve,
            Commands::Latest { currency, limit } => {
                peso_tracker::AppCommand::Latest { currency, limit }
            }
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Download, normalize and upsert today's quotation workbook
    Ingest,
    /// Serve the read API over the persisted rates
    Serve,
    /// Display the most recent quotes for one currency
    Latest {
        /// Currency to display: usd, ebrou, eur, ars or brl
        currency: Currency,
        /// Number of days to display
        #[arg(short, long, default_value_t = 7)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => peso_tracker::cli::setup::setup(),
        Some(cmd) => peso_tracker::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
