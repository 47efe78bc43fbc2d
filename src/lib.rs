//! # bake-graph
//!
//! bake-graph is the core of a texture-bake preparation pipeline: it generates
//! and maintains a network of per-partition bake groups (retopo, reference and
//! cage chains) from a pair of source meshes, reconciles that network when the
//! sources change, and aggregates the chain outputs for export to baking
//! tools.
//!
//! ## Features
//! - Partition-driven network generation: one retopo/reference/cage group
//!   triple per named primitive group in the retopo source
//! - Set-difference reconciliation on update, preserving untouched groups and
//!   in-progress cage edits bit-for-bit
//! - Protected, resurrectable user-edit region in every cage chain
//! - Index-correspondence engine matching sculpted cage positions onto
//!   retriangulated retopo topology
//! - Positional per-role aggregation with interchange (multi-object) or
//!   native (merged) export shaping
//!
//! ## Determinism
//!
//! Partition sets are ordered, group registries are keyed deterministically,
//! and all diffing walks names in sorted order, so reconciling the same
//! snapshots always produces the same graph.
//!
//! ## Usage
//! The host supplies the I/O boundary: a [`mesh::source::SourceResolver`] to
//! load snapshots, a [`mesh::ops::MeshOps`] operator set, and an
//! [`export::MeshEncoder`] for output files. [`network::BakeNetwork`] ties
//! them together and exposes the command surface.

pub mod algs;
pub mod bake_error;
pub mod control;
pub mod export;
pub mod graph;
pub mod mesh;
pub mod network;
pub mod progress;

pub use bake_error::BakeGraphError;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::correspond::correspond;
    pub use crate::algs::partition::{partition_names, validate_partition_sets};
    pub use crate::algs::reconcile::{ReconcileReport, ReconcileWarning, reconcile};
    pub use crate::bake_error::BakeGraphError;
    pub use crate::control::{ControlState, ExportConfig, InterchangeVersion, NetworkConfig};
    pub use crate::export::{ExportFormat, ExportObject, MeshEncoder};
    pub use crate::graph::ArtifactGraph;
    pub use crate::graph::aggregator::Aggregator;
    pub use crate::graph::group::{BakeGroup, EditRegion, GroupParams, Role};
    pub use crate::graph::node::{Node, NodeId, NodeKind};
    pub use crate::mesh::Mesh;
    pub use crate::mesh::ops::{DefaultMeshOps, MeshOps, SubdivisionScheme};
    pub use crate::mesh::source::{MemoryResolver, MeshSource, SourceResolver};
    pub use crate::network::BakeNetwork;
    pub use crate::progress::{LogProgress, NullProgress, ProgressSink};
}
