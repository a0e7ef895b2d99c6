//! IAM role management

use crate::error::{AwsError, Result};
use async_trait::async_trait;
use aws_sdk_iam::Client;
use dwhflow_cloud::{IdentityApi, RoleSpec};

/// Access roles through the IAM API
#[derive(Debug, Clone)]
pub struct IamRoles {
    client: Client,
}

impl IamRoles {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn create(&self, role: &RoleSpec) -> Result<()> {
        tracing::debug!("iam create-role {}", role.name);
        self.client
            .create_role()
            .path("/")
            .role_name(&role.name)
            .description(&role.description)
            .assume_role_policy_document(role.trust_policy().to_string())
            .send()
            .await
            .map_err(|e| {
                let e = e.into_service_error();
                if e.is_entity_already_exists_exception() {
                    AwsError::AlreadyExists(format!("role {}", role.name))
                } else {
                    AwsError::from_service("CreateRole", &e)
                }
            })?;
        Ok(())
    }

    pub async fn attach_policy(&self, role_name: &str, policy_arn: &str) -> Result<()> {
        tracing::debug!("iam attach-role-policy {} {}", role_name, policy_arn);
        self.client
            .attach_role_policy()
            .role_name(role_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(|e| {
                let e = e.into_service_error();
                if e.is_no_such_entity_exception() {
                    AwsError::NotFound(format!("role {}", role_name))
                } else {
                    AwsError::from_service("AttachRolePolicy", &e)
                }
            })?;
        Ok(())
    }

    pub async fn detach_policy(&self, role_name: &str, policy_arn: &str) -> Result<()> {
        tracing::debug!("iam detach-role-policy {} {}", role_name, policy_arn);
        self.client
            .detach_role_policy()
            .role_name(role_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(|e| {
                let e = e.into_service_error();
                if e.is_no_such_entity_exception() {
                    AwsError::NotFound(format!("policy {} on role {}", policy_arn, role_name))
                } else {
                    AwsError::from_service("DetachRolePolicy", &e)
                }
            })?;
        Ok(())
    }

    pub async fn arn(&self, role_name: &str) -> Result<String> {
        let output = self
            .client
            .get_role()
            .role_name(role_name)
            .send()
            .await
            .map_err(|e| {
                let e = e.into_service_error();
                if e.is_no_such_entity_exception() {
                    AwsError::NotFound(format!("role {}", role_name))
                } else {
                    AwsError::from_service("GetRole", &e)
                }
            })?;

        output
            .role()
            .map(|role| role.arn().to_string())
            .ok_or_else(|| AwsError::unexpected("GetRole", "response has no role"))
    }

    pub async fn delete(&self, role_name: &str) -> Result<()> {
        tracing::debug!("iam delete-role {}", role_name);
        self.client
            .delete_role()
            .role_name(role_name)
            .send()
            .await
            .map_err(|e| {
                let e = e.into_service_error();
                if e.is_no_such_entity_exception() {
                    AwsError::NotFound(format!("role {}", role_name))
                } else {
                    AwsError::from_service("DeleteRole", &e)
                }
            })?;
        Ok(())
    }
}

#[async_trait]
impl IdentityApi for IamRoles {
    async fn create_role(&self, role: &RoleSpec) -> dwhflow_cloud::Result<()> {
        Ok(self.create(role).await?)
    }

    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> dwhflow_cloud::Result<()> {
        Ok(self.attach_policy(role_name, policy_arn).await?)
    }

    async fn detach_role_policy(&self, role_name: &str, policy_arn: &str) -> dwhflow_cloud::Result<()> {
        Ok(self.detach_policy(role_name, policy_arn).await?)
    }

    async fn get_role_arn(&self, role_name: &str) -> dwhflow_cloud::Result<String> {
        Ok(self.arn(role_name).await?)
    }

    async fn delete_role(&self, role_name: &str) -> dwhflow_cloud::Result<()> {
        Ok(self.delete(role_name).await?)
    }
}
