use crate::DeleteArgs;
use crate::utils;
use colored::Colorize;
use dwhflow_cloud::Provisioner;
use std::path::Path;

pub async fn handle(config_path: Option<&Path>, run: DeleteArgs) -> anyhow::Result<()> {
    let config = utils::load_config(config_path)?;
    let provider = utils::connect(&config).await;

    println!("{}", "Deleting warehouse...".yellow());
    println!("Cluster: {}", config.cluster.identifier.cyan());
    println!("Role:    {}", config.iam_role.name.cyan());

    let report = Provisioner::new(provider.handles(), config.cluster_spec(), config.role_spec())
        .with_policy(run.error_policy())
        .with_state_manager(utils::state_manager()?)
        .delete()
        .await?;
    utils::print_report(&report);

    Ok(())
}
