//! Warehouse resource model
//!
//! Descriptions of the resources dwhflow provisions (cluster, access role,
//! ingress rule) and the observed state of a cluster.

use crate::error::CloudError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Managed policy granting read-only access to object storage
pub const S3_READ_ONLY_POLICY_ARN: &str = "arn:aws:iam::aws:policy/AmazonS3ReadOnlyAccess";

/// Service principal allowed to assume the warehouse role
pub const WAREHOUSE_SERVICE_PRINCIPAL: &str = "redshift.amazonaws.com";

/// Address range that matches every IPv4 source
pub const ANY_IPV4: &str = "0.0.0.0/0";

/// Cluster layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClusterType {
    SingleNode,
    MultiNode,
}

impl FromStr for ClusterType {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single-node" | "single_node" => Ok(Self::SingleNode),
            "multi-node" | "multi_node" => Ok(Self::MultiNode),
            _ => Err(CloudError::InvalidConfig(format!(
                "expected single-node or multi-node, got '{}'",
                s
            ))),
        }
    }
}

impl ClusterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleNode => "single-node",
            Self::MultiNode => "multi-node",
        }
    }
}

impl std::fmt::Display for ClusterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Desired cluster, built once from configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSpec {
    /// Unique cluster identifier
    pub identifier: String,

    pub cluster_type: ClusterType,

    /// Node type (e.g. "dc2.large")
    pub node_type: String,

    pub node_count: u32,

    /// Database created inside the cluster
    pub db_name: String,

    pub master_username: String,

    pub master_password: String,

    /// Port the database listens on
    pub port: u16,
}

/// Access role assumed by the warehouse service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSpec {
    pub name: String,

    pub description: String,

    /// Service principal allowed to assume the role
    pub trusted_service: String,

    /// ARNs of the policies attached after creation
    pub policy_arns: Vec<String>,
}

impl RoleSpec {
    /// Role trusted by the warehouse service with read-only storage access
    pub fn warehouse(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: "Allows Redshift clusters to call AWS services on your behalf."
                .to_string(),
            trusted_service: WAREHOUSE_SERVICE_PRINCIPAL.to_string(),
            policy_arns: vec![S3_READ_ONLY_POLICY_ARN.to_string()],
        }
    }

    /// Trust policy document restricting `sts:AssumeRole` to the trusted service
    pub fn trust_policy(&self) -> serde_json::Value {
        serde_json::json!({
            "Statement": [{
                "Action": "sts:AssumeRole",
                "Effect": "Allow",
                "Principal": { "Service": self.trusted_service },
            }],
            "Version": "2012-10-17",
        })
    }
}

/// Cluster status as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterStatus {
    Creating,
    Available,
    Deleting,
    Deleted,
    Error,
    /// Any status string the model does not name
    Other(String),
}

impl ClusterStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "creating" => Self::Creating,
            "available" => Self::Available,
            "deleting" => Self::Deleting,
            "deleted" => Self::Deleted,
            "error" | "failed" | "hardware-failure" => Self::Error,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

impl std::fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterStatus::Creating => write!(f, "creating"),
            ClusterStatus::Available => write!(f, "available"),
            ClusterStatus::Deleting => write!(f, "deleting"),
            ClusterStatus::Deleted => write!(f, "deleted"),
            ClusterStatus::Error => write!(f, "error"),
            ClusterStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Observed state of a provisioned cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterState {
    pub identifier: String,

    pub status: ClusterStatus,

    /// Endpoint address, known once the cluster is available
    pub endpoint: Option<String>,

    /// ARN of the first attached role
    pub role_arn: Option<String>,

    /// Network (VPC) the cluster lives in
    pub vpc_id: Option<String>,
}

impl ClusterState {
    pub fn new(identifier: impl Into<String>, status: ClusterStatus) -> Self {
        Self {
            identifier: identifier.into(),
            status,
            endpoint: None,
            role_arn: None,
            vpc_id: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_role_arn(mut self, role_arn: impl Into<String>) -> Self {
        self.role_arn = Some(role_arn.into());
        self
    }

    pub fn with_vpc_id(mut self, vpc_id: impl Into<String>) -> Self {
        self.vpc_id = Some(vpc_id.into());
        self
    }
}

/// Network protocol of an ingress rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
        }
    }
}

/// Inbound permission on a port range from an address range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressRule {
    pub protocol: Protocol,
    pub cidr: String,
    pub from_port: u16,
    pub to_port: u16,
}

impl IngressRule {
    /// TCP on exactly `port`, open to every IPv4 address
    pub fn tcp_from_anywhere(port: u16) -> Self {
        Self {
            protocol: Protocol::Tcp,
            cidr: ANY_IPV4.to_string(),
            from_port: port,
            to_port: port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trust_policy_names_service() {
        let role = RoleSpec::warehouse("dwhRole");
        let policy = role.trust_policy();

        assert_eq!(policy["Version"], "2012-10-17");
        assert_eq!(policy["Statement"][0]["Action"], "sts:AssumeRole");
        assert_eq!(
            policy["Statement"][0]["Principal"]["Service"],
            "redshift.amazonaws.com"
        );
        assert_eq!(role.policy_arns, vec![S3_READ_ONLY_POLICY_ARN.to_string()]);
    }

    #[test]
    fn test_cluster_status_parse() {
        assert_eq!(ClusterStatus::parse("available"), ClusterStatus::Available);
        assert_eq!(ClusterStatus::parse("creating"), ClusterStatus::Creating);
        assert_eq!(
            ClusterStatus::parse("modifying"),
            ClusterStatus::Other("modifying".to_string())
        );
        assert!(!ClusterStatus::parse("modifying").is_available());
        assert_eq!(ClusterStatus::parse("modifying").to_string(), "modifying");
    }

    #[test]
    fn test_cluster_type_from_str() {
        assert_eq!("multi-node".parse::<ClusterType>().unwrap(), ClusterType::MultiNode);
        assert_eq!("Single_Node".parse::<ClusterType>().unwrap(), ClusterType::SingleNode);
        let err = "triple".parse::<ClusterType>().unwrap_err();
        assert!(matches!(err, CloudError::InvalidConfig(_)));
        assert!(err.to_string().contains("'triple'"));
    }

    #[test]
    fn test_ingress_rule_uses_port_for_both_bounds() {
        let rule = IngressRule::tcp_from_anywhere(5439);
        assert_eq!(rule.from_port, 5439);
        assert_eq!(rule.to_port, 5439);
        assert_eq!(rule.cidr, "0.0.0.0/0");
        assert_eq!(rule.protocol, Protocol::Tcp);
    }
}
