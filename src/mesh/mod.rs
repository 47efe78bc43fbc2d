//! Mesh snapshot model consumed by the bake-graph core.
//!
//! A [`Mesh`] is a value: positions, primitives, named groups and string
//! attributes, recomputed from scratch every time a source is (re)loaded and
//! never mutated in place by the core. Named primitive groups are the
//! *partitions* the whole system is organized around; point groups carry
//! partition membership through retriangulation so the correspondence engine
//! can restore it afterwards.
//!
//! Group and attribute queries return deterministically ordered results so
//! that diffing two snapshots is stable across runs.

pub mod normals;
pub mod ops;
pub mod source;

use std::collections::BTreeMap;

/// Name of the primitive attribute used as the temporary material marker on
/// cage geometry. Applied by the cage chain and stripped again by the
/// correspondence stage.
pub const MATERIAL_ATTR: &str = "material";

/// A mesh snapshot: point positions, primitives, named groups, attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Point positions.
    pub positions: Vec<[f64; 3]>,
    /// Optional per-point normals; recomputed lazily by normal stages.
    pub normals: Option<Vec<[f64; 3]>>,
    /// Primitives as point-index lists (triangles after triangulation).
    pub prims: Vec<Vec<usize>>,
    /// Named primitive groups: the mesh's partitions.
    pub prim_groups: BTreeMap<String, Vec<usize>>,
    /// Named point groups; used to record partition membership on points.
    pub point_groups: BTreeMap<String, Vec<usize>>,
    /// Per-primitive string attributes (e.g. the material marker).
    pub prim_attrs: BTreeMap<String, Vec<String>>,
}

impl Mesh {
    /// Creates a mesh from positions and primitives, with no groups.
    pub fn new(positions: Vec<[f64; 3]>, prims: Vec<Vec<usize>>) -> Self {
        Self {
            positions,
            prims,
            ..Self::default()
        }
    }

    /// Number of points.
    #[inline]
    pub fn point_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of primitives.
    #[inline]
    pub fn prim_count(&self) -> usize {
        self.prims.len()
    }

    /// Adds (or replaces) a named primitive group.
    ///
    /// Member indices are sorted and deduplicated so group equality is
    /// membership equality.
    pub fn set_prim_group(&mut self, name: &str, mut prims: Vec<usize>) {
        prims.sort_unstable();
        prims.dedup();
        self.prim_groups.insert(name.to_string(), prims);
    }

    /// Adds (or replaces) a named point group.
    pub fn set_point_group(&mut self, name: &str, mut points: Vec<usize>) {
        points.sort_unstable();
        points.dedup();
        self.point_groups.insert(name.to_string(), points);
    }

    /// Extracts the sub-mesh selected by a named primitive group.
    ///
    /// Points are reindexed to a compact range in ascending parent order;
    /// group membership and primitive attributes are carried over for the
    /// retained elements. Returns an empty mesh for an unknown group name.
    pub fn extract_prim_group(&self, name: &str) -> Mesh {
        let Some(members) = self.prim_groups.get(name) else {
            return Mesh::default();
        };

        let mut keep_points: Vec<usize> = members
            .iter()
            .filter_map(|&p| self.prims.get(p))
            .flatten()
            .copied()
            .collect();
        keep_points.sort_unstable();
        keep_points.dedup();

        let mut parent_to_sub: BTreeMap<usize, usize> = BTreeMap::new();
        for (sub, &parent) in keep_points.iter().enumerate() {
            parent_to_sub.insert(parent, sub);
        }

        let mut out = Mesh::default();
        out.positions = keep_points.iter().map(|&p| self.positions[p]).collect();
        if let Some(normals) = &self.normals {
            out.normals = Some(keep_points.iter().map(|&p| normals[p]).collect());
        }
        for &prim in members {
            let Some(points) = self.prims.get(prim) else {
                continue;
            };
            out.prims
                .push(points.iter().map(|p| parent_to_sub[p]).collect());
        }
        out.set_prim_group(name, (0..out.prims.len()).collect());

        for (attr, values) in &self.prim_attrs {
            out.prim_attrs.insert(
                attr.clone(),
                members
                    .iter()
                    .filter_map(|&p| values.get(p).cloned())
                    .collect(),
            );
        }
        out
    }

    /// Records every primitive group's membership onto points.
    ///
    /// For each named partition, the set of points referenced by its
    /// primitives becomes a point group of the same name. Invoked
    /// immediately before triangulation so membership survives connectivity
    /// changes and can be restored by the correspondence engine.
    pub fn record_point_partitions(&mut self) {
        let mut recorded: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (name, members) in &self.prim_groups {
            let mut points: Vec<usize> = members
                .iter()
                .filter_map(|&p| self.prims.get(p))
                .flatten()
                .copied()
                .collect();
            points.sort_unstable();
            points.dedup();
            recorded.insert(name.clone(), points);
        }
        self.point_groups.append(&mut recorded);
    }

    /// Sets a constant-valued primitive string attribute on every primitive.
    pub fn set_prim_attr_uniform(&mut self, name: &str, value: &str) {
        self.prim_attrs
            .insert(name.to_string(), vec![value.to_string(); self.prims.len()]);
    }

    /// Removes a primitive string attribute, returning whether it existed.
    pub fn remove_prim_attr(&mut self, name: &str) -> bool {
        self.prim_attrs.remove(name).is_some()
    }

    /// Renames every group (point and primitive) by appending `suffix`.
    pub fn suffix_group_names(&mut self, suffix: &str) {
        if suffix.is_empty() {
            return;
        }
        self.prim_groups = std::mem::take(&mut self.prim_groups)
            .into_iter()
            .map(|(name, members)| (format!("{name}{suffix}"), members))
            .collect();
        self.point_groups = std::mem::take(&mut self.point_groups)
            .into_iter()
            .map(|(name, members)| (format!("{name}{suffix}"), members))
            .collect();
    }

    /// Appends another mesh, offsetting its point and primitive indices.
    ///
    /// Groups with the same name are unioned. This is the positional merge
    /// the aggregator stage performs over per-partition role outputs.
    pub fn merge(&mut self, other: &Mesh) {
        let point_offset = self.positions.len();
        let prim_offset = self.prims.len();

        self.positions.extend_from_slice(&other.positions);
        match (&mut self.normals, &other.normals) {
            (Some(ours), Some(theirs)) => ours.extend_from_slice(theirs),
            // Mixed presence invalidates the merged normals.
            (Some(_), None) => self.normals = None,
            (None, Some(_)) | (None, None) => {}
        }
        for prim in &other.prims {
            self.prims.push(prim.iter().map(|p| p + point_offset).collect());
        }

        for (name, members) in &other.prim_groups {
            let entry = self.prim_groups.entry(name.clone()).or_default();
            entry.extend(members.iter().map(|p| p + prim_offset));
        }
        for (name, members) in &other.point_groups {
            let entry = self.point_groups.entry(name.clone()).or_default();
            entry.extend(members.iter().map(|p| p + point_offset));
        }

        for (attr, values) in &mut self.prim_attrs {
            let theirs = other.prim_attrs.get(attr);
            for i in 0..other.prims.len() {
                values.push(
                    theirs
                        .and_then(|v| v.get(i).cloned())
                        .unwrap_or_default(),
                );
            }
        }
        for (attr, theirs) in &other.prim_attrs {
            if self.prim_attrs.contains_key(attr) {
                continue;
            }
            let mut values = vec![String::new(); prim_offset];
            values.extend(theirs.iter().cloned());
            self.prim_attrs.insert(attr.clone(), values);
        }
    }
}
