//! State file for provisioned clusters
//!
//! Manages the `.dwhflow/state.json` file, which records the endpoint, role
//! ARN and network of each cluster once it became available.

use crate::error::{CloudError, Result};
use crate::resource::ClusterState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

const STATE_VERSION: u32 = 1;
const STATE_DIR: &str = ".dwhflow";
const STATE_FILE: &str = "state.json";
const STATE_BACKUP: &str = "state.json.backup";

/// Contents of the state file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFile {
    /// State file version
    pub version: u32,

    /// Last modified timestamp
    pub updated_at: DateTime<Utc>,

    /// Clusters indexed by identifier
    pub clusters: HashMap<String, ClusterRecord>,
}

impl Default for StateFile {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            clusters: HashMap::new(),
        }
    }
}

impl StateFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a cluster record
    pub fn set_cluster(&mut self, record: ClusterRecord) {
        self.clusters.insert(record.identifier.clone(), record);
        self.updated_at = Utc::now();
    }

    pub fn remove_cluster(&mut self, identifier: &str) -> Option<ClusterRecord> {
        let result = self.clusters.remove(identifier);
        if result.is_some() {
            self.updated_at = Utc::now();
        }
        result
    }

    pub fn get_cluster(&self, identifier: &str) -> Option<&ClusterRecord> {
        self.clusters.get(identifier)
    }
}

/// What was observed about a cluster when it became available
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRecord {
    pub identifier: String,
    pub endpoint: Option<String>,
    pub role_arn: Option<String>,
    pub vpc_id: Option<String>,
    pub port: u16,
    pub recorded_at: DateTime<Utc>,
}

impl ClusterRecord {
    pub fn from_state(state: &ClusterState, port: u16) -> Self {
        Self {
            identifier: state.identifier.clone(),
            endpoint: state.endpoint.clone(),
            role_arn: state.role_arn.clone(),
            vpc_id: state.vpc_id.clone(),
            port,
            recorded_at: Utc::now(),
        }
    }
}

/// Reads and writes the state file under a project root
#[derive(Debug, Clone)]
pub struct StateManager {
    project_root: PathBuf,
}

impl StateManager {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    fn state_dir(&self) -> PathBuf {
        self.project_root.join(STATE_DIR)
    }

    /// Path of the state file
    pub fn state_path(&self) -> PathBuf {
        self.state_dir().join(STATE_FILE)
    }

    fn backup_path(&self) -> PathBuf {
        self.state_dir().join(STATE_BACKUP)
    }

    async fn ensure_state_dir(&self) -> Result<()> {
        let dir = self.state_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
            tracing::debug!("Created state directory: {}", dir.display());
        }
        Ok(())
    }

    /// Load the state, or an empty one if no file exists yet
    pub async fn load(&self) -> Result<StateFile> {
        let path = self.state_path();
        if !path.exists() {
            tracing::debug!("State file not found, returning empty state");
            return Ok(StateFile::new());
        }

        let content = fs::read_to_string(&path).await?;
        let state: StateFile = serde_json::from_str(&content)?;

        if state.version > STATE_VERSION {
            return Err(CloudError::StateError(format!(
                "State file version {} is newer than supported version {}",
                state.version, STATE_VERSION
            )));
        }

        tracing::debug!("Loaded state with {} clusters", state.clusters.len());
        Ok(state)
    }

    /// Save the state, keeping the previous file as a backup
    pub async fn save(&self, state: &StateFile) -> Result<()> {
        self.ensure_state_dir().await?;

        let path = self.state_path();
        let backup = self.backup_path();

        if path.exists() {
            if backup.exists() {
                fs::remove_file(&backup).await?;
            }
            fs::rename(&path, &backup).await?;
            tracing::debug!("Created state backup");
        }

        let content = serde_json::to_string_pretty(state)?;
        fs::write(&path, content).await?;

        tracing::debug!("Saved state with {} clusters", state.clusters.len());
        Ok(())
    }

    /// Record a cluster and save
    pub async fn record_cluster(&self, record: ClusterRecord) -> Result<()> {
        let mut state = self.load().await?;
        state.set_cluster(record);
        self.save(&state).await
    }

    /// Forget a cluster and save. Returns whether it was recorded.
    pub async fn forget_cluster(&self, identifier: &str) -> Result<bool> {
        let mut state = self.load().await?;
        let removed = state.remove_cluster(identifier).is_some();
        if removed {
            self.save(&state).await?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ClusterStatus;
    use tempfile::tempdir;

    fn available_state() -> ClusterState {
        ClusterState::new("dwhCluster", ClusterStatus::Available)
            .with_endpoint("dwhcluster.abc.us-west-2.redshift.amazonaws.com")
            .with_role_arn("arn:aws:iam::123456789012:role/dwhRole")
            .with_vpc_id("vpc-0abc")
    }

    #[tokio::test]
    async fn test_state_save_load() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        manager
            .record_cluster(ClusterRecord::from_state(&available_state(), 5439))
            .await
            .unwrap();

        let loaded = manager.load().await.unwrap();
        let record = loaded.get_cluster("dwhCluster").unwrap();
        assert_eq!(
            record.role_arn.as_deref(),
            Some("arn:aws:iam::123456789012:role/dwhRole")
        );
        assert_eq!(record.port, 5439);
    }

    #[tokio::test]
    async fn test_empty_state() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let state = manager.load().await.unwrap();
        assert!(state.clusters.is_empty());
    }

    #[tokio::test]
    async fn test_save_keeps_backup_and_forget() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        manager
            .record_cluster(ClusterRecord::from_state(&available_state(), 5439))
            .await
            .unwrap();
        assert!(manager.forget_cluster("dwhCluster").await.unwrap());
        assert!(!manager.forget_cluster("dwhCluster").await.unwrap());

        assert!(temp_dir.path().join(".dwhflow/state.json.backup").exists());
        assert!(manager.load().await.unwrap().clusters.is_empty());
    }

    #[tokio::test]
    async fn test_newer_version_rejected() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());
        let mut state = StateFile::new();
        state.version = STATE_VERSION + 1;
        manager.save(&state).await.unwrap();

        let err = manager.load().await.unwrap_err();
        assert!(matches!(err, CloudError::StateError(_)));
    }
}
