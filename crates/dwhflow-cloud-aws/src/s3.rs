//! Read-only access to the data sources in S3

use crate::error::{AwsError, Result};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use dwhflow_cloud::{StorageApi, StorageLocation};

/// Object storage through the S3 API
#[derive(Debug, Clone)]
pub struct S3Storage {
    client: Client,
}

impl S3Storage {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn list(&self, location: &StorageLocation, limit: usize) -> Result<Vec<String>> {
        let max_keys = i32::try_from(limit).unwrap_or(i32::MAX);
        let output = self
            .client
            .list_objects_v2()
            .bucket(&location.bucket)
            .prefix(&location.prefix)
            .max_keys(max_keys)
            .send()
            .await
            .map_err(|e| {
                let e = e.into_service_error();
                if e.is_no_such_bucket() {
                    AwsError::NotFound(format!("bucket {}", location.bucket))
                } else {
                    AwsError::from_service("ListObjectsV2", &e)
                }
            })?;

        Ok(output
            .contents()
            .iter()
            .filter_map(|object| object.key())
            .take(limit)
            .map(str::to_string)
            .collect())
    }
}

#[async_trait]
impl StorageApi for S3Storage {
    async fn list_objects(
        &self,
        location: &StorageLocation,
        limit: usize,
    ) -> dwhflow_cloud::Result<Vec<String>> {
        Ok(self.list(location, limit).await?)
    }
}
