//! Bake groups: the generated subgraph for one `(partition, role)` pair.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::NodeId;

/// The three generated chains per partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Low-resolution bake target.
    Retopo,
    /// High-resolution source.
    Reference,
    /// Offset shell bounding the bake projection.
    Cage,
}

impl Role {
    /// All roles in reconciliation creation order. `Reference` wires its
    /// group input from `Retopo`'s output and `Cage` from `Reference`'s, so
    /// the order is load-bearing.
    pub const ALL: [Role; 3] = [Role::Retopo, Role::Reference, Role::Cage];

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Role::Retopo => "retopo",
            Role::Reference => "reference",
            Role::Cage => "cage",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-group parameters that persist across regeneration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupParams {
    /// Whole-group translation offset.
    pub translate: [f64; 3],
    /// Cage offset distance from the retopo surface, clamped to `[0, 1]`.
    pub peak_dist: f64,
    /// Subdivision iteration count for this partition.
    pub subdiv_iterations: u32,
}

impl Default for GroupParams {
    fn default() -> Self {
        Self {
            translate: [0.0; 3],
            peak_dist: 0.0,
            subdiv_iterations: 0,
        }
    }
}

impl GroupParams {
    /// Sets the peak distance, clamping into `[0, 1]`.
    pub fn set_peak_dist(&mut self, dist: f64) {
        self.peak_dist = dist.clamp(0.0, 1.0);
    }
}

/// One user-authored point edit inside a cage's protected region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointEdit {
    /// Point index in the chain mesh at the user-edit stage.
    pub point: usize,
    /// Position delta applied to that point.
    pub offset: [f64; 3],
}

/// The protected edit region of a cage group.
///
/// Bracketed by `EditBegin`/`EditEnd` markers in the chain; reconciliation
/// never regenerates it in place. Destroyed (content lost) together with its
/// group, including on an explicit cage reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditRegion {
    /// User edits, applied in order by the `UserEdit` stage.
    pub edits: Vec<PointEdit>,
}

impl EditRegion {
    /// True when no user edits have been recorded.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Records an edit.
    pub fn push(&mut self, point: usize, offset: [f64; 3]) {
        self.edits.push(PointEdit { point, offset });
    }
}

/// The generated subgraph for one `(partition, role)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BakeGroup {
    /// Owning partition name.
    pub partition: String,
    /// Chain role.
    pub role: Role,
    /// Chain nodes in upstream-to-downstream order.
    pub nodes: Vec<NodeId>,
    /// Terminal output node.
    pub output: NodeId,
    /// External input feeding the whole group, wired by the reconciler
    /// (`reference <- retopo`, `cage <- reference`).
    pub group_input: Option<NodeId>,
    /// Persisted per-group parameters.
    pub params: GroupParams,
    /// Protected user-edit region; `Some` for the cage role only.
    pub edit_region: Option<EditRegion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_order_is_retopo_reference_cage() {
        assert_eq!(Role::ALL, [Role::Retopo, Role::Reference, Role::Cage]);
        assert_eq!(Role::Cage.name(), "cage");
    }

    #[test]
    fn peak_dist_is_clamped() {
        let mut params = GroupParams::default();
        params.set_peak_dist(3.0);
        assert_eq!(params.peak_dist, 1.0);
        params.set_peak_dist(-1.0);
        assert_eq!(params.peak_dist, 0.0);
        params.set_peak_dist(0.25);
        assert_eq!(params.peak_dist, 0.25);
    }
}
