//! Provisioning state machine
//!
//! `create`: role → policy → role ARN → cluster → wait until available →
//! record state → open ingress.
//! `delete`: cluster → forget state → detach policy and delete role.
//!
//! Provider failures are logged and recorded in the [`ProvisionReport`].
//! Under [`ErrorPolicy::BestEffort`] the sequence continues; under
//! [`ErrorPolicy::FailFast`] the first failure is returned. The status poll is
//! the only retry, and it is bounded by [`WaitConfig::timeout`] and the
//! cancellation signal.

use crate::action::{ActionType, ProvisionReport, Step};
use crate::error::{CloudError, Result};
use crate::provider::ProviderHandles;
use crate::resource::{ClusterSpec, ClusterState, IngressRule, RoleSpec};
use crate::state::{ClusterRecord, StateManager};
use std::io::Write;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, sleep};

/// What to do when a provider call fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Log the failure and move on to the next step
    #[default]
    BestEffort,
    /// Stop at the first failure and return it
    FailFast,
}

/// Status polling settings
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// Pause between two status fetches
    pub poll_interval: Duration,

    /// Give up after this long. `None` waits until cancelled.
    pub timeout: Option<Duration>,

    /// Print a dot on stdout for every poll that is not yet available
    pub show_progress: bool,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            timeout: Some(Duration::from_secs(30 * 60)),
            show_progress: true,
        }
    }
}

/// Drives the provider through the create and delete sequences
pub struct Provisioner {
    handles: ProviderHandles,
    cluster: ClusterSpec,
    role: RoleSpec,
    policy: ErrorPolicy,
    wait: WaitConfig,
    state: Option<StateManager>,
    cancel: Option<watch::Receiver<bool>>,
}

impl Provisioner {
    pub fn new(handles: ProviderHandles, cluster: ClusterSpec, role: RoleSpec) -> Self {
        Self {
            handles,
            cluster,
            role,
            policy: ErrorPolicy::default(),
            wait: WaitConfig::default(),
            state: None,
            cancel: None,
        }
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_wait(mut self, wait: WaitConfig) -> Self {
        self.wait = wait;
        self
    }

    /// Record available clusters in (and forget deleted ones from) a state file
    pub fn with_state_manager(mut self, state: StateManager) -> Self {
        self.state = Some(state);
        self
    }

    /// Stop waiting as soon as the watched value becomes `true`
    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn cluster(&self) -> &ClusterSpec {
        &self.cluster
    }

    pub async fn run(&self, action: ActionType) -> Result<ProvisionReport> {
        match action {
            ActionType::Create => self.create().await,
            ActionType::Delete => self.delete().await,
        }
    }

    /// Bring the role, the cluster and the ingress rule into existence
    pub async fn create(&self) -> Result<ProvisionReport> {
        let start = std::time::Instant::now();
        let mut report = ProvisionReport::new(ActionType::Create);

        let role_arn = self.create_role(&mut report).await?;
        self.create_cluster(&mut report, &role_arn).await?;

        let cluster = match self.wait_until_available().await {
            Ok(cluster) => cluster,
            Err(e) => {
                tracing::error!(step = %Step::WaitAvailable, "{}", e);
                return Err(e);
            }
        };
        tracing::info!("Cluster status: {}", cluster.status);
        tracing::info!(
            "Cluster endpoint: {}",
            cluster.endpoint.as_deref().unwrap_or("<none>")
        );
        tracing::info!(
            "Cluster role ARN: {}",
            cluster.role_arn.as_deref().unwrap_or("<none>")
        );
        tracing::info!(
            "Cluster VPC: {}",
            cluster.vpc_id.as_deref().unwrap_or("<none>")
        );
        report.add_success(
            Step::WaitAvailable,
            format!(
                "cluster {} is available in {}",
                cluster.identifier,
                cluster.vpc_id.as_deref().unwrap_or("<no vpc>")
            ),
        );

        if let Some(state) = &self.state {
            let record = ClusterRecord::from_state(&cluster, self.cluster.port);
            match state.record_cluster(record).await {
                Ok(()) => report.add_success(
                    Step::SaveState,
                    format!("recorded in {}", state.state_path().display()),
                ),
                Err(e) => self.record_failure(&mut report, Step::SaveState, e)?,
            }
        }

        self.open_ingress(&mut report, &cluster).await?;

        report.cluster = Some(cluster);
        report.duration_ms = start.elapsed().as_millis() as u64;
        Ok(report)
    }

    /// Remove the cluster, then the role
    pub async fn delete(&self) -> Result<ProvisionReport> {
        let start = std::time::Instant::now();
        let mut report = ProvisionReport::new(ActionType::Delete);
        let identifier = &self.cluster.identifier;

        tracing::info!("Deleting cluster {}...", identifier);
        // The state entry goes only once the cluster is gone
        let cluster_gone = match self.handles.clusters.delete_cluster(identifier, true).await {
            Ok(()) => {
                tracing::info!("Cluster {} deleted!", identifier);
                report.add_success(Step::DeleteCluster, format!("deleted cluster {}", identifier));
                true
            }
            Err(e) => {
                let not_found = e.is_not_found();
                self.record_failure(&mut report, Step::DeleteCluster, e)?;
                not_found
            }
        };

        if let Some(state) = &self.state {
            if cluster_gone {
                if let Err(e) = state.forget_cluster(identifier).await {
                    self.record_failure(&mut report, Step::SaveState, e)?;
                }
            } else {
                tracing::warn!("Keeping state entry for cluster {}", identifier);
            }
        }

        match self.delete_role().await {
            Ok(role_arn) => {
                tracing::info!(
                    "Deleted role: {} with Amazon Resource Name (ARN): {}",
                    self.role.name,
                    role_arn
                );
                report.add_success(Step::DeleteRole, format!("deleted role {}", role_arn));
            }
            Err(e) => self.record_failure(&mut report, Step::DeleteRole, e)?,
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        Ok(report)
    }

    /// Poll the cluster until it reports `available`.
    ///
    /// An unknown cluster counts as "not yet available"; any other describe
    /// error ends the wait.
    pub async fn wait_until_available(&self) -> Result<ClusterState> {
        let identifier = &self.cluster.identifier;
        let started = Instant::now();
        let mut polls: u32 = 0;

        loop {
            polls += 1;
            match self.handles.clusters.describe_cluster(identifier).await {
                Ok(state) if state.status.is_available() => {
                    if self.wait.show_progress && polls > 1 {
                        println!();
                    }
                    tracing::debug!(polls, "cluster {} is available", identifier);
                    return Ok(state);
                }
                Ok(state) => {
                    tracing::debug!(status = %state.status, polls, "cluster not available yet");
                }
                Err(e) if e.is_not_found() => {
                    tracing::debug!(polls, "cluster {} not visible yet", identifier);
                }
                Err(e) => return Err(e),
            }

            if let Some(timeout) = self.wait.timeout
                && started.elapsed() >= timeout
            {
                if self.wait.show_progress {
                    println!();
                }
                return Err(CloudError::Timeout(format!(
                    "cluster {} not available after {}s ({} polls)",
                    identifier,
                    timeout.as_secs(),
                    polls
                )));
            }

            if self.wait.show_progress {
                print!(".");
                let _ = std::io::stdout().flush();
            }
            self.pause().await?;
        }
    }

    async fn create_role(&self, report: &mut ProvisionReport) -> Result<String> {
        let name = &self.role.name;

        tracing::info!("Creating a new IAM role: {}", name);
        match self.handles.identity.create_role(&self.role).await {
            Ok(()) => report.add_success(Step::CreateRole, format!("created role {}", name)),
            Err(e) if e.is_already_exists() => {
                tracing::warn!("Role {} already exists, reusing it", name);
                report.add_success(Step::CreateRole, format!("role {} already exists", name));
            }
            Err(e) => self.record_failure(report, Step::CreateRole, e)?,
        }

        for policy_arn in &self.role.policy_arns {
            tracing::info!("Attaching policy {}", policy_arn);
            match self
                .handles
                .identity
                .attach_role_policy(name, policy_arn)
                .await
            {
                Ok(()) => report.add_success(Step::AttachPolicy, format!("attached {}", policy_arn)),
                Err(e) => self.record_failure(report, Step::AttachPolicy, e)?,
            }
        }

        // The cluster cannot reference a role without its ARN.
        match self.handles.identity.get_role_arn(name).await {
            Ok(role_arn) => {
                tracing::info!(
                    "Created role: {} with Amazon Resource Name (ARN): {}",
                    name,
                    role_arn
                );
                report.add_success(Step::LookupRole, role_arn.clone());
                Ok(role_arn)
            }
            Err(e) => {
                tracing::error!(step = %Step::LookupRole, "{}", e);
                Err(e)
            }
        }
    }

    async fn create_cluster(&self, report: &mut ProvisionReport, role_arn: &str) -> Result<()> {
        let identifier = &self.cluster.identifier;

        tracing::info!(
            cluster_type = %self.cluster.cluster_type,
            node_type = %self.cluster.node_type,
            nodes = self.cluster.node_count,
            "Creating cluster {}...",
            identifier
        );
        match self
            .handles
            .clusters
            .create_cluster(&self.cluster, &[role_arn.to_string()])
            .await
        {
            Ok(()) => {
                report.add_success(Step::CreateCluster, format!("requested cluster {}", identifier))
            }
            Err(e) if e.is_already_exists() => {
                tracing::warn!("Cluster {} already exists, waiting for it", identifier);
                report.add_success(
                    Step::CreateCluster,
                    format!("cluster {} already exists", identifier),
                );
            }
            Err(e) => self.record_failure(report, Step::CreateCluster, e)?,
        }
        Ok(())
    }

    async fn open_ingress(&self, report: &mut ProvisionReport, cluster: &ClusterState) -> Result<()> {
        let Some(vpc_id) = cluster.vpc_id.as_deref() else {
            return self.record_failure(
                report,
                Step::OpenIngress,
                CloudError::ApiError(format!("cluster {} reports no VPC", cluster.identifier)),
            );
        };

        let rule = IngressRule::tcp_from_anywhere(self.cluster.port);
        tracing::info!("Opening TCP port {} on {}...", rule.from_port, vpc_id);
        match self.handles.network.authorize_ingress(vpc_id, &rule).await {
            Ok(group_id) => {
                report.add_success(
                    Step::OpenIngress,
                    format!("opened port {} on {}", rule.from_port, group_id),
                );
            }
            Err(e) if e.is_already_exists() => {
                tracing::warn!("Port {} is already open on {}", rule.from_port, vpc_id);
                report.add_success(
                    Step::OpenIngress,
                    format!("port {} already open", rule.from_port),
                );
            }
            Err(e) => self.record_failure(report, Step::OpenIngress, e)?,
        }
        Ok(())
    }

    /// Look up the ARN, detach every policy, delete the role.
    /// The first failure ends the teardown; a policy that is already
    /// detached does not count as one.
    async fn delete_role(&self) -> Result<String> {
        let name = &self.role.name;
        let identity = &self.handles.identity;

        let role_arn = identity.get_role_arn(name).await?;
        for policy_arn in &self.role.policy_arns {
            match identity.detach_role_policy(name, policy_arn).await {
                Ok(()) => {}
                // Never attached, or detached by an earlier run
                Err(e) if e.is_not_found() => {
                    tracing::warn!("Policy {} is not attached to {}", policy_arn, name);
                }
                Err(e) => return Err(e),
            }
        }
        identity.delete_role(name).await?;
        Ok(role_arn)
    }

    fn record_failure(
        &self,
        report: &mut ProvisionReport,
        step: Step,
        error: CloudError,
    ) -> Result<()> {
        tracing::error!(step = %step, "{}", error);
        report.add_failure(step, error.to_string());
        match self.policy {
            ErrorPolicy::BestEffort => Ok(()),
            ErrorPolicy::FailFast => Err(error),
        }
    }

    async fn pause(&self) -> Result<()> {
        let interval = self.wait.poll_interval;
        let Some(cancel) = &self.cancel else {
            sleep(interval).await;
            return Ok(());
        };

        let mut cancel = cancel.clone();
        let cancelled = async move {
            if cancel.wait_for(|cancelled| *cancelled).await.is_err() {
                // Sender gone: nobody can cancel any more.
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            _ = sleep(interval) => Ok(()),
            _ = cancelled => Err(CloudError::Cancelled(format!(
                "stopped waiting for cluster {}",
                self.cluster.identifier
            ))),
        }
    }
}
