//! Core algorithms: partition-set work, reconciliation, and topology
//! correspondence.

pub mod correspond;
pub mod partition;
pub mod reconcile;
