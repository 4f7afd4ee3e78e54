//! Reconcilers
//!
//! The two long-lived background loops: the periodic repo refresher and the
//! cluster event reconciler. Both are spawned once at startup and talk to
//! request handlers only through the store; if either exits, the process
//! exits with it.

pub mod events;
pub mod repos;

pub use events::ClusterEventReconciler;
pub use repos::RepoRefresher;
