use crate::utils;
use colored::Colorize;
use dwhflow_cloud::StorageLocation;
use std::path::Path;

pub async fn handle(config_path: Option<&Path>, limit: usize) -> anyhow::Result<()> {
    let config = utils::load_config(config_path)?;
    let provider = utils::connect(&config).await;
    let storage = provider.handles().storage;

    let sources = [
        ("log-data", &config.s3.log_data),
        ("log-jsonpath", &config.s3.log_jsonpath),
        ("song-data", &config.s3.song_data),
    ];

    let mut unreachable = 0;
    for (name, uri) in sources {
        println!();
        println!("{} {}", format!("■ {}", name).bold(), uri.cyan());

        let Some(location) = StorageLocation::parse(uri) else {
            println!("  {} not an s3:// location", "✗".red());
            unreachable += 1;
            continue;
        };

        match storage.list_objects(&location, limit).await {
            Ok(keys) if keys.is_empty() => {
                println!("  {} no objects under this prefix", "⚠".yellow());
                unreachable += 1;
            }
            Ok(keys) => {
                for key in keys {
                    println!("  • {}", key);
                }
            }
            Err(e) => {
                tracing::error!("Failed to list {}: {}", location, e);
                println!("  {} {}", "✗".red(), e);
                unreachable += 1;
            }
        }
    }

    println!();
    if unreachable > 0 {
        anyhow::bail!("{} of {} sources are not readable", unreachable, sources.len());
    }
    println!("{}", "✓ All sources readable".green());
    Ok(())
}
