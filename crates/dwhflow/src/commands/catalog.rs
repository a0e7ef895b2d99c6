use crate::utils;
use colored::Colorize;
use dwhflow_config::DwhConfig;
use dwhflow_sql::{CATALOG_VERSION, Catalog, CopySources, TableKind};
use std::path::Path;

pub async fn handle(config_path: Option<&Path>, check: bool, json: bool) -> anyhow::Result<()> {
    let catalog = Catalog::star_schema();

    if check {
        catalog.validate()?;
        let count = |kind: TableKind| catalog.tables.iter().filter(|t| t.kind == kind).count();
        println!(
            "{} catalog v{}: {} staging, {} fact, {} dimension tables",
            "✓".green(),
            CATALOG_VERSION,
            count(TableKind::Staging),
            count(TableKind::Fact),
            count(TableKind::Dimension)
        );
        return Ok(());
    }

    // stdout carries only SQL or JSON here
    let (path, config) = dwhflow_config::load_config(config_path)?;
    tracing::info!("Config: {}", path.display());
    let sources = copy_sources(&config).await?;
    let statements = catalog.statements_in_order(&sources)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&statements)?);
        return Ok(());
    }

    println!("-- catalog v{}", CATALOG_VERSION);
    for statement in &statements {
        println!();
        println!("-- {} {}", statement.kind, statement.table);
        println!("{}", statement.sql);
    }
    Ok(())
}

/// COPY inputs from the config, falling back to the state file for the role ARN
async fn copy_sources(config: &DwhConfig) -> anyhow::Result<CopySources> {
    let role_arn = match &config.iam_role.arn {
        Some(arn) => arn.clone(),
        None => {
            let state = utils::state_manager()?.load().await?;
            state
                .get_cluster(&config.cluster.identifier)
                .and_then(|record| record.role_arn.clone())
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "No role ARN: set iam-role.arn in the config or run `dwh create` first"
                    )
                })?
        }
    };

    Ok(CopySources {
        log_data: config.s3.log_data.clone(),
        log_jsonpath: config.s3.log_jsonpath.clone(),
        song_data: config.s3.song_data.clone(),
        role_arn,
        region: Some(config.aws.region.clone()),
    })
}
