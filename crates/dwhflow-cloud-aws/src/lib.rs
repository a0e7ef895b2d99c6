//! AWS provider for dwhflow
//!
//! Implements the dwhflow capability traits on top of the AWS SDK:
//!
//! - IAM for the warehouse access role
//! - Redshift for the cluster itself
//! - EC2 for the security-group ingress rule
//! - S3 for listing the staged source data
//!
//! # Example
//!
//! ```ignore
//! use dwhflow_cloud_aws::{AwsProvider, ConnectOptions};
//!
//! let provider = AwsProvider::connect(ConnectOptions::new("us-west-2")).await;
//! let handles = provider.handles();
//! let state = handles.clusters.describe_cluster("dwhCluster").await?;
//! ```

pub mod ec2;
pub mod error;
pub mod iam;
pub mod redshift;
pub mod s3;

pub use ec2::Ec2Network;
pub use error::{AwsError, Result};
pub use iam::IamRoles;
pub use redshift::RedshiftClusters;
pub use s3::S3Storage;

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use dwhflow_cloud::ProviderHandles;
use std::sync::Arc;

/// Name reported for credentials that come from the config file
const STATIC_CREDENTIALS_SOURCE: &str = "dwhflow-config";

/// Region and credentials used to build the service clients
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl ConnectOptions {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            access_key_id: None,
            secret_access_key: None,
        }
    }

    /// Use a fixed key pair instead of the default credential chain
    pub fn with_static_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }
}

/// Service clients sharing one region and credential source
#[derive(Debug, Clone)]
pub struct AwsProvider {
    region: String,
    iam: IamRoles,
    redshift: RedshiftClusters,
    ec2: Ec2Network,
    s3: S3Storage,
}

impl AwsProvider {
    pub async fn connect(options: ConnectOptions) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(options.region.clone()));

        // Empty strings in the config mean "use the default chain"
        if let (Some(key), Some(secret)) = (&options.access_key_id, &options.secret_access_key)
            && !key.is_empty()
            && !secret.is_empty()
        {
            tracing::debug!("Using static credentials from config");
            loader = loader.credentials_provider(Credentials::new(
                key.clone(),
                secret.clone(),
                None,
                None,
                STATIC_CREDENTIALS_SOURCE,
            ));
        }

        let sdk_config = loader.load().await;
        tracing::info!("AWS clients ready in {}", options.region);

        Self {
            region: options.region,
            iam: IamRoles::new(aws_sdk_iam::Client::new(&sdk_config)),
            redshift: RedshiftClusters::new(aws_sdk_redshift::Client::new(&sdk_config)),
            ec2: Ec2Network::new(aws_sdk_ec2::Client::new(&sdk_config)),
            s3: S3Storage::new(aws_sdk_s3::Client::new(&sdk_config)),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn handles(&self) -> ProviderHandles {
        ProviderHandles {
            network: Arc::new(self.ec2.clone()),
            storage: Arc::new(self.s3.clone()),
            identity: Arc::new(self.iam.clone()),
            clusters: Arc::new(self.redshift.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_options() {
        let options = ConnectOptions::new("us-west-2").with_static_credentials("AKIA", "secret");
        assert_eq!(options.region, "us-west-2");
        assert_eq!(options.access_key_id.as_deref(), Some("AKIA"));
        assert_eq!(options.secret_access_key.as_deref(), Some("secret"));
    }

    #[tokio::test]
    async fn test_connect_builds_handles_without_network() {
        let provider =
            AwsProvider::connect(ConnectOptions::new("us-west-2").with_static_credentials("AKIA", "secret"))
                .await;
        assert_eq!(provider.region(), "us-west-2");
        let handles = provider.handles();
        assert!(format!("{:?}", handles).contains("ProviderHandles"));
    }
}
