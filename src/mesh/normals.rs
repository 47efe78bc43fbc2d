//! Smooth vertex normal recomputation.
//!
//! Equivalent to a normal stage with a fully-open cusp angle: every face
//! incident to a point contributes, weighted by face area, and the result is
//! normalized. Used by the correspondence engine after transplanting
//! positions onto new connectivity, and by the default normal operator.

use super::Mesh;

/// Recomputes `mesh.normals` as area-weighted smooth vertex normals.
///
/// Degenerate faces (fewer than 3 points) and zero-area accumulations
/// contribute nothing; points with no incident area get a zero normal.
pub fn recompute_smooth_normals(mesh: &mut Mesh) {
    let mut accum = vec![[0.0f64; 3]; mesh.positions.len()];

    for prim in &mesh.prims {
        if prim.len() < 3 {
            continue;
        }
        // Fan decomposition; cross products already carry the area weight.
        let origin = mesh.positions[prim[0]];
        let mut face = [0.0f64; 3];
        for window in prim[1..].windows(2) {
            let a = sub(mesh.positions[window[0]], origin);
            let b = sub(mesh.positions[window[1]], origin);
            let c = cross(a, b);
            face = add(face, c);
        }
        for &point in prim {
            accum[point] = add(accum[point], face);
        }
    }

    for normal in &mut accum {
        let len = (normal[0] * normal[0] + normal[1] * normal[1] + normal[2] * normal[2]).sqrt();
        if len > 0.0 {
            normal[0] /= len;
            normal[1] /= len;
            normal[2] /= len;
        }
    }
    mesh.normals = Some(accum);
}

#[inline]
fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planar_quad_gets_unit_z_normals() {
        let mut mesh = Mesh::new(
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            vec![vec![0, 1, 2, 3]],
        );
        recompute_smooth_normals(&mut mesh);
        let normals = mesh.normals.unwrap();
        for n in normals {
            assert!((n[2] - 1.0).abs() < 1e-12, "expected +Z, got {n:?}");
        }
    }

    #[test]
    fn isolated_point_gets_zero_normal() {
        let mut mesh = Mesh::new(
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [9.0, 9.0, 9.0],
            ],
            vec![vec![0, 1, 2]],
        );
        recompute_smooth_normals(&mut mesh);
        assert_eq!(mesh.normals.unwrap()[3], [0.0, 0.0, 0.0]);
    }
}
