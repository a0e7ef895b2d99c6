//! AWS provider error types

use aws_sdk_iam::error::{DisplayErrorContext, ProvideErrorMetadata};
use dwhflow_cloud::CloudError;
use thiserror::Error;

/// Error codes AWS returns for bad or expired credentials
const AUTH_ERROR_CODES: &[&str] = &[
    "AuthFailure",
    "ExpiredToken",
    "InvalidClientTokenId",
    "SignatureDoesNotMatch",
    "UnrecognizedClientException",
];

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("AWS authentication failed in {operation}: {message}")]
    AuthenticationFailed {
        operation: &'static str,
        message: String,
    },

    #[error("{operation} failed: {message}")]
    Api {
        operation: &'static str,
        message: String,
    },

    #[error("No security group found in VPC {0}")]
    NoSecurityGroup(String),

    #[error("Unexpected response from {operation}: {message}")]
    UnexpectedResponse {
        operation: &'static str,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, AwsError>;

impl AwsError {
    /// Build an error for a failed call, spotting credential problems by code
    pub(crate) fn from_service<E>(operation: &'static str, err: &E) -> Self
    where
        E: std::error::Error + ProvideErrorMetadata,
    {
        let message = DisplayErrorContext(err).to_string();
        match err.code() {
            Some(code) if AUTH_ERROR_CODES.contains(&code) => {
                AwsError::AuthenticationFailed { operation, message }
            }
            _ => AwsError::Api { operation, message },
        }
    }

    pub(crate) fn unexpected(operation: &'static str, message: impl Into<String>) -> Self {
        AwsError::UnexpectedResponse {
            operation,
            message: message.into(),
        }
    }
}

impl From<AwsError> for CloudError {
    fn from(err: AwsError) -> Self {
        match err {
            AwsError::AlreadyExists(what) => CloudError::ResourceAlreadyExists(what),
            AwsError::NotFound(what) => CloudError::ResourceNotFound(what),
            e @ AwsError::AuthenticationFailed { .. } => {
                CloudError::AuthenticationFailed(e.to_string())
            }
            e => CloudError::ApiError(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_survive_conversion() {
        let err: CloudError = AwsError::AlreadyExists("role dwhRole".to_string()).into();
        assert!(err.is_already_exists());

        let err: CloudError = AwsError::NotFound("cluster dwhCluster".to_string()).into();
        assert!(err.is_not_found());

        let err: CloudError = AwsError::NoSecurityGroup("vpc-0abc".to_string()).into();
        assert!(matches!(err, CloudError::ApiError(msg) if msg.contains("vpc-0abc")));
    }
}
