//! BakeGraphError: unified error type for bake-graph public APIs.
//!
//! Every fallible public operation in this crate reports through this enum so
//! callers get non-panicking, matchable failures. Fatal variants abort the
//! user-triggered operation before any graph mutation; reconciliation-time
//! lookups degrade to recorded warnings instead (see
//! [`crate::algs::reconcile`]).

use thiserror::Error;

use crate::graph::group::Role;
use crate::graph::node::NodeId;

/// Unified error type for bake-graph operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BakeGraphError {
    /// Attempted to construct a NodeId with a zero value (invalid).
    #[error("NodeId must be non-zero (0 is reserved as invalid/sentinel)")]
    InvalidNodeId,
    /// An input mesh source (path or in-graph reference) did not resolve.
    #[error("mesh source `{0}` could not be resolved")]
    SourceMissing(String),
    /// Both meshes expose zero partitions; there is nothing to build.
    #[error("no partitions found in either the retopo or the reference mesh")]
    PartitionSetEmpty,
    /// Exactly one mesh exposes partitions; the other has none.
    #[error("partition sets are asymmetric: one mesh has no partitions")]
    PartitionSetAsymmetric,
    /// The two meshes expose different partition name sets.
    #[error("partition sets of the retopo and reference meshes do not match")]
    PartitionMismatch,
    /// A graph node expected to exist could not be found.
    #[error("graph node `{0}` not found")]
    GraphNodeMissing(NodeId),
    /// No bake group registered for this `(partition, role)` pair.
    #[error("no `{role}` bake group for partition `{partition}`")]
    UnknownGroup {
        /// Partition name used for the lookup.
        partition: String,
        /// Role used for the lookup.
        role: Role,
    },
    /// A bake group for this `(partition, role)` pair already exists.
    #[error("a `{role}` bake group for partition `{partition}` already exists")]
    DuplicateGroup {
        /// Partition name of the colliding group.
        partition: String,
        /// Role of the colliding group.
        role: Role,
    },
    /// Wiring referenced an input slot the consumer node does not have.
    #[error("node `{node}` has no input slot {slot}")]
    InvalidInputSlot {
        /// Consumer node of the attempted wire.
        node: NodeId,
        /// Requested slot index.
        slot: usize,
    },
    /// A chain node was reached during evaluation with an unwired input.
    #[error("node `{node}` input slot {slot} is not wired")]
    UnwiredInput {
        /// Node whose input was unwired.
        node: NodeId,
        /// Slot index that had no source.
        slot: usize,
    },
    /// The export path has no extension or an unsupported one.
    #[error("export path `{0}` does not select a supported output encoding")]
    UnsupportedExportPath(String),
    /// The mesh encoder backing an export operation reported a failure.
    #[error("export failed: {0}")]
    ExportFailed(String),
}
