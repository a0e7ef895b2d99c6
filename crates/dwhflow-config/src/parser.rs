//! KDL parsing into [`DwhConfig`]

use crate::error::{ConfigError, Result};
use crate::model::{
    AwsSettings, ClusterSettings, DEFAULT_PORT, DEFAULT_REGION, DbSettings, DwhConfig,
    RoleSettings, SourceSettings,
};
use dwhflow_cloud::ClusterType;
use kdl::{KdlDocument, KdlNode, KdlValue};

/// Parse config text
pub fn parse_config_str(content: &str) -> Result<DwhConfig> {
    let doc: KdlDocument = content.parse()?;

    Ok(DwhConfig {
        aws: parse_aws(&doc)?,
        cluster: parse_cluster(&doc)?,
        db: parse_db(&doc)?,
        iam_role: parse_iam_role(&doc)?,
        s3: parse_s3(&doc)?,
    })
}

fn parse_aws(doc: &KdlDocument) -> Result<AwsSettings> {
    // The whole section may be left out when the default credential chain is used
    let Some(section) = optional_section(doc, "aws") else {
        return Ok(AwsSettings {
            key: None,
            secret: None,
            region: DEFAULT_REGION.to_string(),
        });
    };

    Ok(AwsSettings {
        key: optional_string(section, "aws", "key")?,
        secret: optional_string(section, "aws", "secret")?,
        region: optional_string(section, "aws", "region")?
            .unwrap_or_else(|| DEFAULT_REGION.to_string()),
    })
}

fn parse_cluster(doc: &KdlDocument) -> Result<ClusterSettings> {
    let section = required_section(doc, "cluster")?;

    let type_name = required_string(section, "cluster", "type")?;
    let cluster_type = type_name
        .parse::<ClusterType>()
        .map_err(|_| ConfigError::InvalidValue {
            section: "cluster",
            key: "type",
            message: format!("expected single-node or multi-node, got '{}'", type_name),
        })?;

    let nodes = match optional_integer(section, "cluster", "nodes")? {
        Some(n) => u32::try_from(n)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| ConfigError::InvalidValue {
                section: "cluster",
                key: "nodes",
                message: format!("expected a positive node count, got {}", n),
            })?,
        None if cluster_type == ClusterType::SingleNode => 1,
        None => {
            return Err(ConfigError::MissingKey {
                section: "cluster",
                key: "nodes",
            });
        }
    };

    Ok(ClusterSettings {
        cluster_type,
        node_type: required_string(section, "cluster", "node-type")?,
        nodes,
        identifier: required_string(section, "cluster", "identifier")?,
    })
}

fn parse_db(doc: &KdlDocument) -> Result<DbSettings> {
    let section = required_section(doc, "db")?;

    let port = match optional_integer(section, "db", "port")? {
        Some(p) => u16::try_from(p).ok().filter(|p| *p > 0).ok_or_else(|| {
            ConfigError::InvalidValue {
                section: "db",
                key: "port",
                message: format!("{} is not a valid port", p),
            }
        })?,
        None => DEFAULT_PORT,
    };

    Ok(DbSettings {
        name: required_string(section, "db", "name")?,
        user: required_string(section, "db", "user")?,
        password: required_string(section, "db", "password")?,
        port,
    })
}

fn parse_iam_role(doc: &KdlDocument) -> Result<RoleSettings> {
    let section = required_section(doc, "iam-role")?;

    Ok(RoleSettings {
        name: required_string(section, "iam-role", "name")?,
        arn: optional_string(section, "iam-role", "arn")?.filter(|arn| !arn.is_empty()),
    })
}

fn parse_s3(doc: &KdlDocument) -> Result<SourceSettings> {
    let section = required_section(doc, "s3")?;

    Ok(SourceSettings {
        log_data: required_string(section, "s3", "log-data")?,
        log_jsonpath: required_string(section, "s3", "log-jsonpath")?,
        song_data: required_string(section, "s3", "song-data")?,
    })
}

fn optional_section<'a>(doc: &'a KdlDocument, name: &'static str) -> Option<&'a KdlDocument> {
    doc.get(name).and_then(|node| node.children())
}

fn required_section<'a>(doc: &'a KdlDocument, name: &'static str) -> Result<&'a KdlDocument> {
    optional_section(doc, name).ok_or(ConfigError::MissingSection(name))
}

fn first_value<'a>(section: &'a KdlDocument, key: &str) -> Option<&'a KdlValue> {
    section
        .get(key)
        .and_then(|node: &KdlNode| node.entries().first())
        .map(|entry| entry.value())
}

fn optional_string(
    section: &KdlDocument,
    section_name: &'static str,
    key: &'static str,
) -> Result<Option<String>> {
    match first_value(section, key) {
        None => Ok(None),
        Some(value) => value
            .as_string()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| ConfigError::InvalidValue {
                section: section_name,
                key,
                message: format!("expected a string, got {}", value),
            }),
    }
}

fn required_string(
    section: &KdlDocument,
    section_name: &'static str,
    key: &'static str,
) -> Result<String> {
    optional_string(section, section_name, key)?.ok_or(ConfigError::MissingKey {
        section: section_name,
        key,
    })
}

fn optional_integer(
    section: &KdlDocument,
    section_name: &'static str,
    key: &'static str,
) -> Result<Option<i128>> {
    match first_value(section, key) {
        None => Ok(None),
        Some(value) => value
            .as_integer()
            .map(Some)
            .ok_or_else(|| ConfigError::InvalidValue {
                section: section_name,
                key,
                message: format!("expected an integer, got {}", value),
            }),
    }
}
