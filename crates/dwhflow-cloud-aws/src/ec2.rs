//! Security-group ingress on the cluster's VPC

use crate::error::{AwsError, Result};
use async_trait::async_trait;
use aws_sdk_ec2::Client;
use aws_sdk_ec2::error::ProvideErrorMetadata;
use aws_sdk_ec2::types::Filter;
use dwhflow_cloud::{IngressRule, NetworkApi};

/// Returned when the same permission is already on the group
const DUPLICATE_PERMISSION: &str = "InvalidPermission.Duplicate";

/// Network access through the EC2 API
#[derive(Debug, Clone)]
pub struct Ec2Network {
    client: Client,
}

impl Ec2Network {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// First security group of the VPC (the default group on a fresh VPC)
    pub async fn first_security_group(&self, vpc_id: &str) -> Result<String> {
        let output = self
            .client
            .describe_security_groups()
            .filters(Filter::builder().name("vpc-id").values(vpc_id).build())
            .send()
            .await
            .map_err(|e| {
                AwsError::from_service("DescribeSecurityGroups", &e.into_service_error())
            })?;

        output
            .security_groups()
            .iter()
            .find_map(|group| group.group_id())
            .map(str::to_string)
            .ok_or_else(|| AwsError::NoSecurityGroup(vpc_id.to_string()))
    }

    pub async fn authorize(&self, group_id: &str, rule: &IngressRule) -> Result<()> {
        tracing::debug!(
            "ec2 authorize-security-group-ingress {} {}/{}-{} from {}",
            group_id,
            rule.protocol.as_str(),
            rule.from_port,
            rule.to_port,
            rule.cidr
        );
        self.client
            .authorize_security_group_ingress()
            .group_id(group_id)
            .ip_protocol(rule.protocol.as_str())
            .cidr_ip(&rule.cidr)
            .from_port(i32::from(rule.from_port))
            .to_port(i32::from(rule.to_port))
            .send()
            .await
            .map_err(|e| {
                let e = e.into_service_error();
                if e.code() == Some(DUPLICATE_PERMISSION) {
                    AwsError::AlreadyExists(format!(
                        "ingress {}/{} on {}",
                        rule.protocol.as_str(),
                        rule.from_port,
                        group_id
                    ))
                } else {
                    AwsError::from_service("AuthorizeSecurityGroupIngress", &e)
                }
            })?;
        Ok(())
    }
}

#[async_trait]
impl NetworkApi for Ec2Network {
    async fn authorize_ingress(&self, vpc_id: &str, rule: &IngressRule) -> dwhflow_cloud::Result<String> {
        let group_id = self.first_security_group(vpc_id).await?;
        self.authorize(&group_id, rule).await?;
        Ok(group_id)
    }
}
