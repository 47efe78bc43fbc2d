//! Topology correspondence: transplanting positions onto new connectivity.
//!
//! After the retopo chain triangulates, the cage mesh must be exported with
//! the *triangulated* connectivity while keeping the cage's sculpted point
//! positions. `correspond` takes the triangulated mesh as the topology donor
//! and the (untriangulated) cage mesh as the position donor and produces a
//! mesh with the donor topology, the cage positions, and the cage's named
//! partition membership carried through.
//!
//! Precondition (a contract of the upstream triangulation operator, verified
//! defensively rather than assumed): triangulation preserves the order of
//! pre-existing points and only appends new ones. Points past the position
//! donor's count are left untouched and the degrade is logged.

use crate::mesh::normals::recompute_smooth_normals;
use crate::mesh::{MATERIAL_ATTR, Mesh};

/// Produces a mesh with `topology_donor`'s connectivity and
/// `position_donor`'s point positions.
///
/// Steps:
/// 1. per-index position transplant (out-of-range indices degrade silently,
///    flagged via `log::debug!`);
/// 2. bookkeeping strip: the donor's own groups and the temporary material
///    marker are dropped, after partition point-group membership has been
///    re-derived from the position donor;
/// 3. smooth normals recomputed on the final connectivity.
pub fn correspond(position_donor: &Mesh, topology_donor: &Mesh) -> Mesh {
    let mut out = topology_donor.clone();

    let shared = out.point_count().min(position_donor.point_count());
    let unmatched = out.point_count() - shared;
    if unmatched > 0 {
        log::debug!(
            "topology donor has {unmatched} point(s) with no counterpart in the \
             position donor; leaving their positions unchanged"
        );
    }
    out.positions[..shared].copy_from_slice(&position_donor.positions[..shared]);

    // Groups recorded during topology preparation describe the donor's own
    // bookkeeping; membership authoritative for the result was recorded on
    // the position donor's points before triangulation.
    out.point_groups.clear();
    out.prim_groups.clear();
    for (name, members) in &position_donor.point_groups {
        let members: Vec<usize> = members.iter().copied().filter(|&p| p < out.point_count()).collect();
        out.point_groups.insert(name.clone(), members);
    }
    out.remove_prim_attr(MATERIAL_ATTR);

    recompute_smooth_normals(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn donor_pair() -> (Mesh, Mesh) {
        // Position donor: a quad, sculpted upward, membership recorded.
        let mut position = Mesh::new(
            vec![
                [0.0, 0.0, 1.0],
                [1.0, 0.0, 2.0],
                [1.0, 1.0, 3.0],
                [0.0, 1.0, 4.0],
            ],
            vec![vec![0, 1, 2, 3]],
        );
        position.set_prim_group("wheel", vec![0]);
        position.record_point_partitions();

        // Topology donor: the triangulated counterpart, flat positions.
        let mut topology = Mesh::new(
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            vec![vec![0, 1, 2], vec![0, 2, 3]],
        );
        topology.set_prim_group("wheel", vec![0, 1]);
        topology.set_prim_attr_uniform(MATERIAL_ATTR, "retopo");
        (position, topology)
    }

    #[test]
    fn connectivity_from_donor_positions_from_cage() {
        let (position, topology) = donor_pair();
        let out = correspond(&position, &topology);
        assert_eq!(out.prims, topology.prims);
        assert_eq!(out.positions, position.positions);
    }

    #[test]
    fn membership_restored_and_bookkeeping_stripped() {
        let (position, topology) = donor_pair();
        let out = correspond(&position, &topology);
        assert_eq!(out.point_groups["wheel"], vec![0, 1, 2, 3]);
        assert!(out.prim_groups.is_empty());
        assert!(!out.prim_attrs.contains_key(MATERIAL_ATTR));
        assert!(out.normals.is_some());
    }

    #[test]
    fn appended_points_keep_donor_positions() {
        let (position, mut topology) = donor_pair();
        // Simulate a triangulation that split faces and appended a point.
        topology.positions.push([0.5, 0.5, 9.0]);
        topology.prims = vec![vec![0, 1, 4], vec![1, 2, 4], vec![2, 3, 4], vec![3, 0, 4]];

        let out = correspond(&position, &topology);
        assert_eq!(out.point_count(), 5);
        assert_eq!(out.positions[..4], position.positions[..]);
        assert_eq!(out.positions[4], [0.5, 0.5, 9.0]);
    }

    #[test]
    fn membership_indices_never_exceed_result() {
        let (mut position, topology) = donor_pair();
        // Position donor longer than the topology donor: membership entries
        // past the result's point count are dropped, not carried dangling.
        position.positions.push([5.0, 5.0, 5.0]);
        position.point_groups.get_mut("wheel").unwrap().push(4);

        let out = correspond(&position, &topology);
        assert_eq!(out.point_count(), 4);
        assert!(out.point_groups["wheel"].iter().all(|&p| p < 4));
    }
}
