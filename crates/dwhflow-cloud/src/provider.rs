//! Provider capability traits
//!
//! The provisioning state machine only talks to these traits. The AWS
//! implementation lives in `dwhflow-cloud-aws`; tests use in-memory stubs.

use crate::error::Result;
use crate::resource::{ClusterSpec, ClusterState, IngressRule, RoleSpec};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Identity and access-role management
#[async_trait]
pub trait IdentityApi: Send + Sync {
    /// Create the role with its trust policy.
    /// Fails with `ResourceAlreadyExists` when a role of that name exists.
    async fn create_role(&self, role: &RoleSpec) -> Result<()>;

    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()>;

    async fn detach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()>;

    /// Look up the ARN of an existing role
    async fn get_role_arn(&self, role_name: &str) -> Result<String>;

    async fn delete_role(&self, role_name: &str) -> Result<()>;
}

/// Managed database cluster management
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Request cluster creation with `role_arns` attached
    async fn create_cluster(&self, spec: &ClusterSpec, role_arns: &[String]) -> Result<()>;

    /// Fetch the current state. Fails with `ResourceNotFound` for unknown identifiers.
    async fn describe_cluster(&self, identifier: &str) -> Result<ClusterState>;

    async fn delete_cluster(&self, identifier: &str, skip_final_snapshot: bool) -> Result<()>;
}

/// Compute-network access
#[async_trait]
pub trait NetworkApi: Send + Sync {
    /// Authorize `rule` on the first security group of `vpc_id`.
    /// Returns the id of the group the rule was added to.
    async fn authorize_ingress(&self, vpc_id: &str, rule: &IngressRule) -> Result<String>;
}

/// Object-storage access
#[async_trait]
pub trait StorageApi: Send + Sync {
    /// List at most `limit` object keys under `location`
    async fn list_objects(&self, location: &StorageLocation, limit: usize) -> Result<Vec<String>>;
}

/// `s3://bucket/prefix` style location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageLocation {
    pub bucket: String,
    pub prefix: String,
}

impl StorageLocation {
    /// Parse `s3://bucket/prefix`. Surrounding single quotes are accepted
    /// because locations are often written as SQL literals.
    pub fn parse(uri: &str) -> Option<Self> {
        let trimmed = uri.trim().trim_matches('\'');
        let rest = trimmed.strip_prefix("s3://")?;
        let (bucket, prefix) = match rest.split_once('/') {
            Some((bucket, prefix)) => (bucket, prefix),
            None => (rest, ""),
        };
        if bucket.is_empty() {
            return None;
        }
        Some(Self {
            bucket: bucket.to_string(),
            prefix: prefix.to_string(),
        })
    }
}

impl std::fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.prefix)
    }
}

/// The four capability handles a provider exposes
#[derive(Clone)]
pub struct ProviderHandles {
    pub network: Arc<dyn NetworkApi>,
    pub storage: Arc<dyn StorageApi>,
    pub identity: Arc<dyn IdentityApi>,
    pub clusters: Arc<dyn ClusterApi>,
}

impl std::fmt::Debug for ProviderHandles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderHandles").finish_non_exhaustive()
    }
}
