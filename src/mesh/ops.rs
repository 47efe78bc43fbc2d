//! Opaque mesh-operator boundary.
//!
//! Subdivision, triangulation, normal computation and the transform stages
//! are external operations as far as the core is concerned: chains invoke
//! them through [`MeshOps`] and never look inside. [`DefaultMeshOps`]
//! supplies simple reference behavior so the pipeline is runnable and
//! testable without a host application.

use serde::{Deserialize, Serialize};

use super::normals::recompute_smooth_normals;
use super::{MATERIAL_ATTR, Mesh};

/// Subdivision algorithm choices, forwarded verbatim to the operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubdivisionScheme {
    /// Built-in Catmull-Clark.
    CatmullClark,
    /// Renderer-compatible Catmull-Clark.
    RendererCatmullClark,
    /// OpenSubdiv Catmull-Clark.
    #[default]
    OsdCatmullClark,
    /// OpenSubdiv Loop.
    OsdLoop,
    /// OpenSubdiv Bilinear.
    OsdBilinear,
}

/// The external mesh operators invoked by bake-group chains.
///
/// Implementations must be deterministic for a given input mesh; the
/// reconciler and evaluator assume re-running a chain over an unchanged
/// snapshot reproduces the same output.
pub trait MeshOps {
    /// Subdivides `mesh` with the given scheme and iteration count.
    fn subdivide(&self, mesh: &mut Mesh, scheme: SubdivisionScheme, iterations: u32);

    /// Triangulates `mesh`.
    ///
    /// The correspondence engine relies on triangulation preserving the
    /// order of pre-existing points and only *appending* new ones; see
    /// [`crate::algs::correspond`].
    fn triangulate(&self, mesh: &mut Mesh);

    /// Computes per-point normals; `smooth` requests fully averaged normals.
    fn compute_normals(&self, mesh: &mut Mesh, smooth: bool);

    /// Translates every point by `offset`.
    fn translate(&self, mesh: &mut Mesh, offset: [f64; 3]);

    /// Uniformly scales every point about the origin.
    fn scale(&self, mesh: &mut Mesh, factor: f64);

    /// Offsets every point along its normal by `dist`.
    fn peak(&self, mesh: &mut Mesh, dist: f64);

    /// Applies `material` as the uniform material marker attribute.
    fn apply_material(&self, mesh: &mut Mesh, material: &str);

    /// Removes the material marker attribute if present.
    fn strip_material(&self, mesh: &mut Mesh);
}

/// Reference [`MeshOps`] implementation.
///
/// Subdivision is a no-op placeholder (the host operator owns the real
/// algorithm); triangulation is a fan split that appends no points, the
/// simplest form satisfying the append-only contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMeshOps;

impl MeshOps for DefaultMeshOps {
    fn subdivide(&self, _mesh: &mut Mesh, _scheme: SubdivisionScheme, _iterations: u32) {}

    fn triangulate(&self, mesh: &mut Mesh) {
        let mut prims = Vec::with_capacity(mesh.prims.len());
        let mut prim_map: Vec<Vec<usize>> = Vec::with_capacity(mesh.prims.len());
        for prim in &mesh.prims {
            let mut produced = Vec::new();
            if prim.len() <= 3 {
                produced.push(prims.len());
                prims.push(prim.clone());
            } else {
                for i in 1..prim.len() - 1 {
                    produced.push(prims.len());
                    prims.push(vec![prim[0], prim[i], prim[i + 1]]);
                }
            }
            prim_map.push(produced);
        }

        for members in mesh.prim_groups.values_mut() {
            let mut remapped: Vec<usize> = members
                .iter()
                .flat_map(|&old| prim_map[old].iter().copied())
                .collect();
            remapped.sort_unstable();
            *members = remapped;
        }
        for values in mesh.prim_attrs.values_mut() {
            let mut remapped = Vec::with_capacity(prims.len());
            for (old, produced) in prim_map.iter().enumerate() {
                for _ in produced {
                    remapped.push(values.get(old).cloned().unwrap_or_default());
                }
            }
            *values = remapped;
        }
        mesh.prims = prims;
    }

    fn compute_normals(&self, mesh: &mut Mesh, smooth: bool) {
        // Only the smooth variant is distinguished downstream.
        let _ = smooth;
        recompute_smooth_normals(mesh);
    }

    fn translate(&self, mesh: &mut Mesh, offset: [f64; 3]) {
        for p in &mut mesh.positions {
            p[0] += offset[0];
            p[1] += offset[1];
            p[2] += offset[2];
        }
    }

    fn scale(&self, mesh: &mut Mesh, factor: f64) {
        for p in &mut mesh.positions {
            p[0] *= factor;
            p[1] *= factor;
            p[2] *= factor;
        }
    }

    fn peak(&self, mesh: &mut Mesh, dist: f64) {
        if dist == 0.0 {
            return;
        }
        if mesh.normals.is_none() {
            recompute_smooth_normals(mesh);
        }
        let normals = mesh.normals.clone().unwrap_or_default();
        for (p, n) in mesh.positions.iter_mut().zip(normals.iter()) {
            p[0] += n[0] * dist;
            p[1] += n[1] * dist;
            p[2] += n[2] * dist;
        }
    }

    fn apply_material(&self, mesh: &mut Mesh, material: &str) {
        mesh.set_prim_attr_uniform(MATERIAL_ATTR, material);
    }

    fn strip_material(&self, mesh: &mut Mesh) {
        mesh.remove_prim_attr(MATERIAL_ATTR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fan_triangulation_remaps_groups_and_attrs() {
        let mut mesh = Mesh::new(
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
                [2.0, 0.5, 0.0],
            ],
            vec![vec![0, 1, 2, 3], vec![1, 4, 2]],
        );
        mesh.set_prim_group("wheel", vec![0]);
        mesh.set_prim_group("body", vec![1]);
        mesh.set_prim_attr_uniform(MATERIAL_ATTR, "cage");

        DefaultMeshOps.triangulate(&mut mesh);

        assert_eq!(mesh.prim_count(), 3);
        assert!(mesh.prims.iter().all(|p| p.len() == 3));
        // Quad split into prims 0 and 1, triangle became prim 2.
        assert_eq!(mesh.prim_groups["wheel"], vec![0, 1]);
        assert_eq!(mesh.prim_groups["body"], vec![2]);
        assert_eq!(mesh.prim_attrs[MATERIAL_ATTR].len(), 3);
        // Point order untouched.
        assert_eq!(mesh.point_count(), 5);
    }

    #[test]
    fn peak_moves_points_along_normals() {
        let mut mesh = Mesh::new(
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            vec![vec![0, 1, 2, 3]],
        );
        DefaultMeshOps.peak(&mut mesh, 0.5);
        for p in &mesh.positions {
            assert!((p[2] - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn material_round_trip() {
        let mut mesh = Mesh::new(vec![[0.0; 3]; 3], vec![vec![0, 1, 2]]);
        DefaultMeshOps.apply_material(&mut mesh, "cage");
        assert!(mesh.prim_attrs.contains_key(MATERIAL_ATTR));
        DefaultMeshOps.strip_material(&mut mesh);
        assert!(!mesh.prim_attrs.contains_key(MATERIAL_ATTR));
    }
}
