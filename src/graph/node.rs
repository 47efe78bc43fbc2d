//! `NodeId`: a strong, zero-cost handle for artifact-graph nodes.
//!
//! Every stage in a bake-group chain is represented by an opaque, unique
//! identifier. `NodeId` wraps a nonzero `u64` so that 0 stays reserved as an
//! invalid/sentinel value, and so handles cannot be confused with plain
//! indices. Creation calls return handles; there is no lookup by constructed
//! name or path anywhere in the graph.

use std::{fmt, num::NonZeroU64};

use serde::{Deserialize, Serialize};

use crate::bake_error::BakeGraphError;

/// Opaque handle to one artifact-graph node.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct NodeId(NonZeroU64);

impl NodeId {
    /// Creates a `NodeId` from a raw `u64`.
    ///
    /// # Errors
    /// Returns [`BakeGraphError::InvalidNodeId`] when `raw == 0`.
    #[inline]
    pub fn new(raw: u64) -> Result<Self, BakeGraphError> {
        NonZeroU64::new(raw)
            .map(NodeId)
            .ok_or(BakeGraphError::InvalidNodeId)
    }

    /// Returns the raw `u64` behind this handle.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeId").field(&self.get()).finish()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// The processing stages a chain can contain.
///
/// Stage semantics live in the evaluator ([`crate::network`]); the graph
/// only records the kind and its wiring. Conditional stages (`Subdivide`,
/// `Triangulate`, `TopologyMatch`) are bypassed at evaluation time when the
/// corresponding global flag is off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Pulls one named partition out of a source mesh.
    ExtractPartition {
        /// Which of the two sources feeds this chain.
        source: SourceSlot,
        /// Partition to extract.
        partition: String,
    },
    /// Applies the temporary material marker.
    ApplyMaterial,
    /// Computes point normals.
    Normals,
    /// Offsets points along their normals by the group's peak distance.
    Peak,
    /// Opening marker of the protected user-edit region.
    EditBegin,
    /// Closing marker of the protected user-edit region.
    EditEnd,
    /// Applies the group's user-authored point edits.
    UserEdit,
    /// Applies the group's translate offset.
    Translate,
    /// Applies the global export scale.
    ExportScale,
    /// Conditional subdivision with the group's iteration count.
    Subdivide,
    /// Conditional triangulation.
    Triangulate,
    /// Re-imports the final output of a sibling group's chain.
    ReimportOutput {
        /// Partition of the sibling group.
        partition: String,
    },
    /// Strips the material marker from a re-imported branch.
    StripMaterial,
    /// Conditional topology-correspondence stage. Slot 0 carries the
    /// position donor branch, slot 1 the topology donor branch.
    TopologyMatch,
    /// Normal recomputation on the final connectivity.
    PostNormals,
    /// Terminal marker; the group's exportable output.
    Output,
}

/// Which imported source mesh a chain extracts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceSlot {
    /// The retopo (low-resolution) source.
    Retopo,
    /// The reference (high-resolution) source.
    Reference,
}

/// One artifact-graph node: a stage kind plus slot-addressed input wiring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Stage kind.
    pub kind: NodeKind,
    /// Upstream sources per input slot; `None` until wired.
    pub inputs: Vec<Option<NodeId>>,
}

impl Node {
    /// Creates a node of `kind` with its canonical input-slot count.
    pub fn new(kind: NodeKind) -> Self {
        let slots = match kind {
            NodeKind::ExtractPartition { .. } | NodeKind::ReimportOutput { .. } => 0,
            NodeKind::TopologyMatch => 2,
            _ => 1,
        };
        Self {
            kind,
            inputs: vec![None; slots],
        }
    }
}
