use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod account;
mod report;
mod state;

use report::ViewArgs;
use state::StateCommands;

#[derive(Debug, Parser)]
#[command(name = "aivis")]
#[command(about = "AI visibility analytics over brand-monitoring runs")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Report on a run saved as JSON
    Report {
        /// Path to a run-status JSON payload
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Fetch a run from the backend, wait for it to finish, and report on it
    Run {
        run_id: String,
        /// Report on the run as it is now instead of waiting for completion
        #[arg(long)]
        no_wait: bool,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Audit a website's readiness for AI crawlers and answers
    Audit { url: String },
    /// Check a brand or category name before starting a run
    Validate { name: String },
    /// Show subscription status and remaining reports
    Billing,
    /// Open a checkout session for a plan
    Checkout {
        #[arg(long)]
        price_id: String,
    },
    /// Open the billing portal
    Portal,
    /// Inspect or change the saved dashboard state
    State {
        #[command(subcommand)]
        command: StateCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = aivis_core::load_app_config()?;
    init_tracing(&config.log_level)?;

    match cli.command {
        Some(Commands::Report { input, view }) => report::run_report_file(&config, &input, &view)?,
        Some(Commands::Run {
            run_id,
            no_wait,
            view,
        }) => report::run_report_remote(&config, &run_id, !no_wait, &view).await?,
        Some(Commands::Audit { url }) => account::run_audit(&config, &url).await?,
        Some(Commands::Validate { name }) => account::run_validate(&config, &name).await?,
        Some(Commands::Billing) => account::run_billing(&config).await?,
        Some(Commands::Checkout { price_id }) => account::run_checkout(&config, &price_id).await?,
        Some(Commands::Portal) => account::run_portal(&config).await?,
        Some(Commands::State { command }) => state::run_state(&config, &command)?,
        None => Cli::command().print_help()?,
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise the configured level. Logs go to stderr so
/// report output on stdout stays machine-readable.
fn init_tracing(level: &str) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
