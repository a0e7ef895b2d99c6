//! Redshift cluster management

use crate::error::{AwsError, Result};
use async_trait::async_trait;
use aws_sdk_redshift::Client;
use aws_sdk_redshift::types::Cluster;
use dwhflow_cloud::{ClusterApi, ClusterSpec, ClusterState, ClusterStatus, ClusterType};

/// Warehouse clusters through the Redshift API
#[derive(Debug, Clone)]
pub struct RedshiftClusters {
    client: Client,
}

impl RedshiftClusters {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn create(&self, spec: &ClusterSpec, role_arns: &[String]) -> Result<()> {
        tracing::debug!(
            "redshift create-cluster {} ({} x {})",
            spec.identifier,
            spec.node_count,
            spec.node_type
        );

        let mut request = self
            .client
            .create_cluster()
            .cluster_identifier(&spec.identifier)
            .cluster_type(spec.cluster_type.as_str())
            .node_type(&spec.node_type)
            .db_name(&spec.db_name)
            .master_username(&spec.master_username)
            .master_user_password(&spec.master_password)
            .port(i32::from(spec.port))
            .set_iam_roles(Some(role_arns.to_vec()));

        // NumberOfNodes is rejected for single-node clusters
        if spec.cluster_type == ClusterType::MultiNode {
            request = request.number_of_nodes(number_of_nodes(spec)?);
        }

        request.send().await.map_err(|e| {
            let e = e.into_service_error();
            if e.is_cluster_already_exists_fault() {
                AwsError::AlreadyExists(format!("cluster {}", spec.identifier))
            } else {
                AwsError::from_service("CreateCluster", &e)
            }
        })?;
        Ok(())
    }

    pub async fn describe(&self, identifier: &str) -> Result<ClusterState> {
        let output = self
            .client
            .describe_clusters()
            .cluster_identifier(identifier)
            .send()
            .await
            .map_err(|e| {
                let e = e.into_service_error();
                if e.is_cluster_not_found_fault() {
                    AwsError::NotFound(format!("cluster {}", identifier))
                } else {
                    AwsError::from_service("DescribeClusters", &e)
                }
            })?;

        let cluster = output
            .clusters()
            .first()
            .ok_or_else(|| AwsError::NotFound(format!("cluster {}", identifier)))?;
        Ok(cluster_state(identifier, cluster))
    }

    pub async fn delete(&self, identifier: &str, skip_final_snapshot: bool) -> Result<()> {
        tracing::debug!("redshift delete-cluster {}", identifier);
        self.client
            .delete_cluster()
            .cluster_identifier(identifier)
            .skip_final_cluster_snapshot(skip_final_snapshot)
            .send()
            .await
            .map_err(|e| {
                let e = e.into_service_error();
                if e.is_cluster_not_found_fault() {
                    AwsError::NotFound(format!("cluster {}", identifier))
                } else {
                    AwsError::from_service("DeleteCluster", &e)
                }
            })?;
        Ok(())
    }
}

/// Convert a described cluster into the provider-neutral state
fn cluster_state(identifier: &str, cluster: &Cluster) -> ClusterState {
    let status = cluster
        .cluster_status()
        .map(ClusterStatus::parse)
        .unwrap_or_else(|| ClusterStatus::Other("unknown".to_string()));

    ClusterState {
        identifier: cluster
            .cluster_identifier()
            .unwrap_or(identifier)
            .to_string(),
        status,
        endpoint: cluster
            .endpoint()
            .and_then(|e| e.address())
            .map(str::to_string),
        role_arn: cluster
            .iam_roles()
            .first()
            .and_then(|r| r.iam_role_arn())
            .map(str::to_string),
        vpc_id: cluster.vpc_id().map(str::to_string),
    }
}

#[async_trait]
impl ClusterApi for RedshiftClusters {
    async fn create_cluster(&self, spec: &ClusterSpec, role_arns: &[String]) -> dwhflow_cloud::Result<()> {
        Ok(self.create(spec, role_arns).await?)
    }

    async fn describe_cluster(&self, identifier: &str) -> dwhflow_cloud::Result<ClusterState> {
        Ok(self.describe(identifier).await?)
    }

    async fn delete_cluster(&self, identifier: &str, skip_final_snapshot: bool) -> dwhflow_cloud::Result<()> {
        Ok(self.delete(identifier, skip_final_snapshot).await?)
    }
}

/// Node count as the API takes it
fn number_of_nodes(spec: &ClusterSpec) -> Result<i32> {
    i32::try_from(spec.node_count).map_err(|_| AwsError::Api {
        operation: "CreateCluster",
        message: format!(
            "node count {} for {} is out of range",
            spec.node_count, spec.identifier
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_redshift::types::{ClusterIamRole, Endpoint};

    #[test]
    fn test_cluster_state_from_available_cluster() {
        let cluster = Cluster::builder()
            .cluster_identifier("dwhcluster")
            .cluster_status("available")
            .endpoint(
                Endpoint::builder()
                    .address("dwhcluster.abc.us-west-2.redshift.amazonaws.com")
                    .port(5439)
                    .build(),
            )
            .iam_roles(
                ClusterIamRole::builder()
                    .iam_role_arn("arn:aws:iam::123456789012:role/dwhRole")
                    .build(),
            )
            .vpc_id("vpc-0abc")
            .build();

        let state = cluster_state("dwhCluster", &cluster);

        assert_eq!(state.identifier, "dwhcluster");
        assert!(state.status.is_available());
        assert_eq!(
            state.endpoint.as_deref(),
            Some("dwhcluster.abc.us-west-2.redshift.amazonaws.com")
        );
        assert_eq!(
            state.role_arn.as_deref(),
            Some("arn:aws:iam::123456789012:role/dwhRole")
        );
        assert_eq!(state.vpc_id.as_deref(), Some("vpc-0abc"));
    }

    #[test]
    fn test_cluster_state_while_creating() {
        let cluster = Cluster::builder().cluster_status("creating").build();

        let state = cluster_state("dwhCluster", &cluster);

        assert_eq!(state.identifier, "dwhCluster");
        assert_eq!(state.status, ClusterStatus::Creating);
        assert!(state.endpoint.is_none());
        assert!(state.role_arn.is_none());
    }

    fn spec_with_nodes(node_count: u32) -> ClusterSpec {
        ClusterSpec {
            identifier: "dwhCluster".to_string(),
            cluster_type: ClusterType::MultiNode,
            node_type: "dc2.large".to_string(),
            node_count,
            db_name: "dwh".to_string(),
            master_username: "dwhuser".to_string(),
            master_password: "Passw0rd".to_string(),
            port: 5439,
        }
    }

    #[test]
    fn test_number_of_nodes_in_range() {
        assert_eq!(number_of_nodes(&spec_with_nodes(4)).unwrap(), 4);
    }

    #[test]
    fn test_number_of_nodes_overflow_is_rejected() {
        let err = number_of_nodes(&spec_with_nodes(u32::MAX)).unwrap_err();
        assert!(matches!(err, AwsError::Api { operation: "CreateCluster", .. }));
        assert!(err.to_string().contains("4294967295"));
    }
}
