//! scalesync-core: Reconciliation engine
//!
//! Implements the `ReconcilerActor`, which owns the host registry and the
//! status counters and is the only place either is mutated. Contains message
//! types, the registry and the reconciliation policy.

pub mod actor;
pub mod config;
pub mod error;
pub mod message;
pub mod registry;
pub mod state;

pub use actor::reconciler::{ReconcilerActor, ReconcilerActorArgs, RegistryReader};
pub use config::{ReconcileSettings, ScaleDownAction};
pub use error::CoreError;
pub use message::{
    GetStatus, HandleTermination, HostCount, InitialSync, ReconcileHost, RecordError,
    RecordWarning, RefreshRegistry, StatusSnapshot, SweepReport,
};
pub use registry::HostRegistry;
pub use state::{ReconcileOutcome, StatusCounters};
