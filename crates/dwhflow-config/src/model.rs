//! Typed settings read from the config file

use dwhflow_cloud::{ClusterSpec, ClusterType, RoleSpec};

pub const DEFAULT_REGION: &str = "us-west-2";
pub const DEFAULT_PORT: u16 = 5439;

/// Everything a provisioning run needs, read once and never mutated
#[derive(Debug, Clone, PartialEq)]
pub struct DwhConfig {
    pub aws: AwsSettings,
    pub cluster: ClusterSettings,
    pub db: DbSettings,
    pub iam_role: RoleSettings,
    pub s3: SourceSettings,
}

/// Credentials and region. Without a key pair the SDK default chain is used.
#[derive(Debug, Clone, PartialEq)]
pub struct AwsSettings {
    pub key: Option<String>,
    pub secret: Option<String>,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSettings {
    pub cluster_type: ClusterType,
    pub node_type: String,
    pub nodes: u32,
    pub identifier: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DbSettings {
    pub name: String,
    pub user: String,
    pub password: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoleSettings {
    pub name: String,
    pub arn: Option<String>,
}

/// S3 locations of the raw data
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSettings {
    pub log_data: String,
    pub log_jsonpath: String,
    pub song_data: String,
}

impl DwhConfig {
    pub fn cluster_spec(&self) -> ClusterSpec {
        ClusterSpec {
            identifier: self.cluster.identifier.clone(),
            cluster_type: self.cluster.cluster_type,
            node_type: self.cluster.node_type.clone(),
            node_count: self.cluster.nodes,
            db_name: self.db.name.clone(),
            master_username: self.db.user.clone(),
            master_password: self.db.password.clone(),
            port: self.db.port,
        }
    }

    pub fn role_spec(&self) -> RoleSpec {
        RoleSpec::warehouse(&self.iam_role.name)
    }
}
