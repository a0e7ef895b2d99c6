use crate::utils;
use colored::Colorize;
use std::path::Path;

pub async fn handle(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = utils::load_config(config_path)?;
    let provider = utils::connect(&config).await;
    let identifier = &config.cluster.identifier;

    println!();
    let state = match provider.handles().clusters.describe_cluster(identifier).await {
        Ok(state) => state,
        Err(e) if e.is_not_found() => {
            println!("Cluster {} {}", identifier.cyan(), "not found".yellow());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let status = if state.status.is_available() {
        state.status.to_string().green()
    } else {
        state.status.to_string().yellow()
    };
    println!("Cluster:  {}", state.identifier.cyan());
    println!("Status:   {}", status);
    println!("Endpoint: {}", state.endpoint.as_deref().unwrap_or("-"));
    println!("Role ARN: {}", state.role_arn.as_deref().unwrap_or("-"));
    println!("VPC:      {}", state.vpc_id.as_deref().unwrap_or("-"));

    let recorded = utils::state_manager()?.load().await?;
    if let Some(record) = recorded.get_cluster(identifier) {
        println!(
            "Recorded: {} (port {})",
            record.recorded_at.to_rfc3339(),
            record.port
        );
    }

    Ok(())
}
