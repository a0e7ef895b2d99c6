use crate::RunArgs;
use crate::utils;
use colored::Colorize;
use dwhflow_cloud::Provisioner;
use std::path::Path;

pub async fn handle(config_path: Option<&Path>, run: RunArgs) -> anyhow::Result<()> {
    let config = utils::load_config(config_path)?;
    let provider = utils::connect(&config).await;

    let cluster = config.cluster_spec();
    println!("{}", "Creating warehouse...".yellow());
    println!(
        "Cluster: {} ({} x {}, {})",
        cluster.identifier.cyan(),
        cluster.node_count,
        cluster.node_type,
        provider.region()
    );
    println!("Role:    {}", config.iam_role.name.cyan());

    let provisioner = Provisioner::new(provider.handles(), cluster, config.role_spec())
        .with_policy(run.error_policy())
        .with_wait(run.wait_config())
        .with_state_manager(utils::state_manager()?)
        .with_cancel(utils::cancel_on_ctrl_c());

    println!();
    println!("{}", "Waiting for the cluster to become available".blue());
    let report = provisioner.create().await?;
    utils::print_report(&report);

    if let Some(cluster) = &report.cluster {
        println!();
        println!(
            "DWH_ENDPOINT: {}",
            cluster.endpoint.as_deref().unwrap_or("-").cyan()
        );
        println!(
            "DWH_ROLE_ARN: {}",
            cluster.role_arn.as_deref().unwrap_or("-").cyan()
        );
        println!(
            "DWH_VPC_ID:   {}",
            cluster.vpc_id.as_deref().unwrap_or("-").cyan()
        );
    }

    Ok(())
}
