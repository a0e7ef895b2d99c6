//! dwhflow cloud layer
//!
//! Provider capability traits, the warehouse resource model and the
//! provisioning state machine that creates and tears down a warehouse
//! cluster together with its access role and ingress rule.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                    dwh CLI                       │
//! │              (dwh create / delete)               │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                dwhflow-cloud                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │          Provisioner (state machine)      │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │ Capabilities │  │  State file  │            │
//! │  └──────────────┘  └──────────────┘            │
//! └───────┬─────────────────────────────────────────┘
//!         │
//! ┌───────▼───────┐
//! │  dwhflow-     │
//! │  cloud-aws    │
//! └───────────────┘
//! ```

pub mod action;
pub mod error;
pub mod provider;
pub mod provisioner;
pub mod resource;
pub mod state;

// Re-exports
pub use action::{ActionType, ProvisionReport, ReportSummary, Step, StepResult};
pub use error::{CloudError, Result};
pub use provider::{
    ClusterApi, IdentityApi, NetworkApi, ProviderHandles, StorageApi, StorageLocation,
};
pub use provisioner::{ErrorPolicy, Provisioner, WaitConfig};
pub use resource::{
    ClusterSpec, ClusterState, ClusterStatus, ClusterType, IngressRule, Protocol, RoleSpec,
    S3_READ_ONLY_POLICY_ARN,
};
pub use state::{ClusterRecord, StateFile, StateManager};
