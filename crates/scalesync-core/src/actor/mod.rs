//! Actor implementations

pub mod reconciler;

pub use reconciler::{ReconcilerActor, ReconcilerActorArgs, RegistryReader};
