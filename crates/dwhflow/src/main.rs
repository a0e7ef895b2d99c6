mod commands;
mod utils;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dwh")]
#[command(
    about = "Provision a Redshift data warehouse and render its ETL statements",
    long_about = None,
    version
)]
struct Cli {
    /// Config file (defaults to dwh.local.kdl / dwh.kdl discovery)
    #[arg(short, long, global = true, env = "DWH_CONFIG_PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the IAM role and the cluster, wait for it, then open its port
    Create {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Delete the cluster and the IAM role
    Delete {
        #[command(flatten)]
        run: DeleteArgs,
    },
    /// Show the current cluster status
    Status,
    /// List a few keys under each S3 data source
    Sources {
        /// Keys to list per source
        #[arg(short = 'n', long, default_value_t = 5)]
        limit: usize,
    },
    /// Validate and print the ETL statements in execution order
    Catalog {
        /// Only validate the catalog (no config needed)
        #[arg(long)]
        check: bool,
        /// Print statements as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Clone, Copy)]
pub struct RunArgs {
    /// Stop at the first failed step instead of logging and continuing
    #[arg(long)]
    fail_fast: bool,

    /// Give up waiting for the cluster after this many seconds (0 waits forever)
    #[arg(long, value_name = "SECS", default_value_t = 1800)]
    timeout: u64,

    /// Seconds between two status checks
    #[arg(long, value_name = "SECS", default_value_t = 1)]
    poll_interval: u64,
}

impl RunArgs {
    fn wait_config(&self) -> dwhflow_cloud::WaitConfig {
        dwhflow_cloud::WaitConfig {
            poll_interval: Duration::from_secs(self.poll_interval.max(1)),
            timeout: (self.timeout > 0).then(|| Duration::from_secs(self.timeout)),
            show_progress: true,
        }
    }

    fn error_policy(&self) -> dwhflow_cloud::ErrorPolicy {
        if self.fail_fast {
            dwhflow_cloud::ErrorPolicy::FailFast
        } else {
            dwhflow_cloud::ErrorPolicy::BestEffort
        }
    }
}

/// Delete does not wait on the cluster, so it takes no timing flags
#[derive(Args, Clone, Copy)]
pub struct DeleteArgs {
    /// Stop at the first failed step instead of logging and continuing
    #[arg(long)]
    fail_fast: bool,
}

impl DeleteArgs {
    fn error_policy(&self) -> dwhflow_cloud::ErrorPolicy {
        if self.fail_fast {
            dwhflow_cloud::ErrorPolicy::FailFast
        } else {
            dwhflow_cloud::ErrorPolicy::BestEffort
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries progress and statements, logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Create { run } => commands::create::handle(config_path, run).await,
        Commands::Delete { run } => commands::delete::handle(config_path, run).await,
        Commands::Status => commands::status::handle(config_path).await,
        Commands::Sources { limit } => commands::sources::handle(config_path, limit).await,
        Commands::Catalog { check, json } => {
            commands::catalog::handle(config_path, check, json).await
        }
    }
}
