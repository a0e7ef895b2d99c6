//! Provisioning actions and their reports

use crate::resource::ClusterState;
use serde::{Deserialize, Serialize};

/// Provisioning action requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create the role, the cluster and the ingress rule
    Create,
    /// Delete the cluster and the role
    Delete,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Delete => write!(f, "delete"),
        }
    }
}

/// A single step of the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    CreateRole,
    AttachPolicy,
    LookupRole,
    CreateCluster,
    WaitAvailable,
    OpenIngress,
    SaveState,
    DeleteCluster,
    DeleteRole,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Step::CreateRole => "create-role",
            Step::AttachPolicy => "attach-policy",
            Step::LookupRole => "lookup-role",
            Step::CreateCluster => "create-cluster",
            Step::WaitAvailable => "wait-available",
            Step::OpenIngress => "open-ingress",
            Step::SaveState => "save-state",
            Step::DeleteCluster => "delete-cluster",
            Step::DeleteRole => "delete-role",
        };
        f.write_str(name)
    }
}

/// Outcome of a single step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step: Step,

    pub success: bool,

    /// Success message
    pub message: String,

    /// Error message if failed
    pub error: Option<String>,
}

/// Result of running an action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionReport {
    pub action: ActionType,

    /// Steps in the order they ran
    pub steps: Vec<StepResult>,

    /// Last observed cluster state, if any
    pub cluster: Option<ClusterState>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl ProvisionReport {
    pub fn new(action: ActionType) -> Self {
        Self {
            action,
            steps: Vec::new(),
            cluster: None,
            duration_ms: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.steps.iter().all(|s| s.success)
    }

    pub fn add_success(&mut self, step: Step, message: impl Into<String>) {
        self.steps.push(StepResult {
            step,
            success: true,
            message: message.into(),
            error: None,
        });
    }

    pub fn add_failure(&mut self, step: Step, error: impl Into<String>) {
        self.steps.push(StepResult {
            step,
            success: false,
            message: String::new(),
            error: Some(error.into()),
        });
    }

    pub fn failed(&self) -> impl Iterator<Item = &StepResult> {
        self.steps.iter().filter(|s| !s.success)
    }

    pub fn summary(&self) -> ReportSummary {
        let failed = self.failed().count();
        ReportSummary {
            succeeded: self.steps.len() - failed,
            failed,
        }
    }
}

/// Step counts of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl std::fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} succeeded, {} failed", self.succeeded, self.failed)
    }
}
