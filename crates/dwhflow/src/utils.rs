use colored::Colorize;
use dwhflow_cloud::{ProvisionReport, StateManager};
use dwhflow_cloud_aws::{AwsProvider, ConnectOptions};
use dwhflow_config::DwhConfig;
use std::path::Path;
use tokio::sync::watch;

/// Load the config and show where it came from
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<DwhConfig> {
    let (path, config) = dwhflow_config::load_config(explicit)?;
    println!("📄 Config: {}", path.display().to_string().cyan());
    Ok(config)
}

pub async fn connect(config: &DwhConfig) -> AwsProvider {
    let mut options = ConnectOptions::new(&config.aws.region);
    if let (Some(key), Some(secret)) = (&config.aws.key, &config.aws.secret) {
        options = options.with_static_credentials(key, secret);
    }
    AwsProvider::connect(options).await
}

/// State file under `.dwhflow/` in the working directory
pub fn state_manager() -> anyhow::Result<StateManager> {
    Ok(StateManager::new(std::env::current_dir()?))
}

/// Flip the returned receiver to `true` on Ctrl-C
pub fn cancel_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!();
            eprintln!("{}", "Interrupted, stopping...".yellow());
            let _ = tx.send(true);
        }
    });
    rx
}

pub fn print_report(report: &ProvisionReport) {
    println!();
    for step in &report.steps {
        if step.success {
            println!("  {} {:<16} {}", "✓".green(), step.step.to_string(), step.message);
        } else {
            println!(
                "  {} {:<16} {}",
                "✗".red(),
                step.step.to_string(),
                step.error.as_deref().unwrap_or("failed").red()
            );
        }
    }

    let summary = report.summary();
    let elapsed = format!("{:.1}s", report.duration_ms as f64 / 1000.0);
    println!();
    if summary.failed == 0 {
        println!("{} ({}, {})", "✓ Done".green().bold(), summary, elapsed);
    } else {
        println!("{} ({}, {})", "⚠ Done with errors".yellow().bold(), summary, elapsed);
    }
}
