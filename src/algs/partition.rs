//! Partition extraction and cross-mesh partition-set validation.

use std::collections::BTreeSet;

use crate::bake_error::BakeGraphError;
use crate::mesh::Mesh;

/// Returns the sorted set of distinct partition names on `mesh`.
///
/// Deterministic and side-effect-free; a mesh with no primitive groups
/// yields the empty set, which downstream validation reports as its own
/// error condition.
pub fn partition_names(mesh: &Mesh) -> BTreeSet<String> {
    mesh.prim_groups.keys().cloned().collect()
}

/// Validates that two meshes expose an identical, non-empty partition set.
///
/// Invoked at network creation between the two freshly imported meshes, and
/// again at every update cycle against freshly reloaded temporary copies,
/// before anything in the live graph is touched.
///
/// # Errors
/// - [`BakeGraphError::PartitionSetEmpty`] when both sets are empty.
/// - [`BakeGraphError::PartitionSetAsymmetric`] when exactly one is empty.
/// - [`BakeGraphError::PartitionMismatch`] when the name sets differ.
pub fn validate_partition_sets(
    a: &BTreeSet<String>,
    b: &BTreeSet<String>,
) -> Result<(), BakeGraphError> {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Err(BakeGraphError::PartitionSetEmpty),
        (true, false) | (false, true) => Err(BakeGraphError::PartitionSetAsymmetric),
        (false, false) if a != b => Err(BakeGraphError::PartitionMismatch),
        _ => Ok(()),
    }
}
