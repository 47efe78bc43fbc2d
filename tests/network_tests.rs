use std::path::{Path, PathBuf};

use bake_graph::prelude::*;

fn part_mesh(parts: &[&str], z: f64) -> Mesh {
    let mut positions = Vec::new();
    let mut prims = Vec::new();
    let mut mesh_groups: Vec<(String, usize)> = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        let x = i as f64 * 3.0;
        let base = positions.len();
        positions.extend([
            [x, 0.0, z],
            [x + 1.0, 0.0, z],
            [x + 1.0, 1.0, z],
            [x, 1.0, z],
        ]);
        prims.push(vec![base, base + 1, base + 2, base + 3]);
        mesh_groups.push((part.to_string(), prims.len() - 1));
    }
    let mut mesh = Mesh::new(positions, prims);
    for (name, prim) in mesh_groups {
        mesh.set_prim_group(&name, vec![prim]);
    }
    mesh
}

fn seeded_network(parts: &[&str]) -> BakeNetwork<MemoryResolver, DefaultMeshOps> {
    let mut resolver = MemoryResolver::new();
    resolver.insert(MeshSource::parse("retopo.bgeo"), part_mesh(parts, 0.0));
    resolver.insert(MeshSource::parse("op:/obj/reference"), part_mesh(parts, 0.2));
    let mut network = BakeNetwork::new(resolver, DefaultMeshOps);
    network
        .create(
            MeshSource::parse("retopo.bgeo"),
            MeshSource::parse("op:/obj/reference"),
            &mut NullProgress,
        )
        .unwrap();
    network
}

/// Records every encode call instead of writing files.
#[derive(Default)]
struct RecordingEncoder {
    calls: Vec<(PathBuf, ExportFormat, Vec<String>)>,
}

impl MeshEncoder for RecordingEncoder {
    fn encode(
        &mut self,
        path: &Path,
        format: ExportFormat,
        objects: &[ExportObject],
    ) -> Result<(), BakeGraphError> {
        self.calls.push((
            path.to_path_buf(),
            format,
            objects.iter().map(|o| o.name.clone()).collect(),
        ));
        Ok(())
    }
}

#[test]
fn create_then_update_applies_the_partition_delta() {
    let mut network = seeded_network(&["body", "wheel"]);
    assert_eq!(network.control().partition_list(), "body wheel");

    // Sculpt the surviving cage so the update has state to preserve.
    network.edit_cage("body").unwrap().push(2, [0.0, 0.0, 0.3]);
    let body_cage = network
        .graph()
        .find_group("body", Role::Cage)
        .unwrap()
        .clone();

    // Asset iteration: wheel gone, door new.
    let resolver = network.resolver_mut();
    resolver.insert(MeshSource::parse("retopo.bgeo"), part_mesh(&["body", "door"], 0.0));
    resolver.insert(
        MeshSource::parse("op:/obj/reference"),
        part_mesh(&["body", "door"], 0.2),
    );

    let report = network.update(&mut NullProgress).unwrap();
    assert_eq!(report.removed, vec!["wheel"]);
    assert_eq!(report.added, vec!["door"]);
    assert!(report.warnings.is_empty());
    assert_eq!(network.control().partition_list(), "body door");

    // The untouched cage, edits included, survived bit-for-bit.
    assert_eq!(
        network.graph().find_group("body", Role::Cage),
        Some(&body_cage)
    );
    assert!(network.graph().find_group("wheel", Role::Cage).is_none());
    // The new partition is immediately evaluable.
    assert!(network.evaluate_group("door", Role::Cage).is_ok());
}

#[test]
fn failed_update_leaves_the_network_intact() {
    let mut resolver = MemoryResolver::new();
    resolver.insert(MeshSource::parse("retopo.bgeo"), part_mesh(&["body"], 0.0));
    resolver.insert(
        MeshSource::parse("reference.bgeo"),
        part_mesh(&["body"], 0.2),
    );
    let mut network = BakeNetwork::new(resolver, DefaultMeshOps);
    network
        .create(
            MeshSource::parse("retopo.bgeo"),
            MeshSource::parse("reference.bgeo"),
            &mut NullProgress,
        )
        .unwrap();
    let groups_before = network.graph().groups().count();

    // Break the reference source: its partition set no longer matches.
    // Both create and update must reject this before mutating anything.
    let bad = part_mesh(&["fender"], 0.2);
    let mut broken_resolver = MemoryResolver::new();
    broken_resolver.insert(MeshSource::parse("retopo.bgeo"), part_mesh(&["body"], 0.0));
    broken_resolver.insert(MeshSource::parse("reference.bgeo"), bad);
    let mut broken = BakeNetwork::new(broken_resolver, DefaultMeshOps);
    let err = broken
        .create(
            MeshSource::parse("retopo.bgeo"),
            MeshSource::parse("reference.bgeo"),
            &mut NullProgress,
        )
        .unwrap_err();
    assert_eq!(err, BakeGraphError::PartitionMismatch);
    assert_eq!(broken.graph().groups().count(), 0);
    assert!(broken.control().partitions().is_empty());

    // A vanished source on update is also fatal but non-destructive.
    network
        .control_mut()
        .reference_source = Some(MeshSource::parse("gone.bgeo"));
    let err = network.update(&mut NullProgress).unwrap_err();
    assert!(matches!(err, BakeGraphError::SourceMissing(_)));
    assert_eq!(network.graph().groups().count(), groups_before);
    assert!(network.evaluate_group("body", Role::Cage).is_ok());
}

#[test]
fn cage_pipeline_restores_membership_over_new_topology() {
    let mut network = seeded_network(&["body", "wheel"]);
    network.control_mut().config.triangulate = true;
    network.edit_cage("wheel").unwrap().push(0, [0.0, 0.0, 0.7]);

    let retopo = network.evaluate_group("wheel", Role::Retopo).unwrap();
    let cage = network.evaluate_group("wheel", Role::Cage).unwrap();

    // Quad fanned into two triangles on both sides.
    assert_eq!(retopo.prim_count(), 2);
    assert_eq!(cage.prims, retopo.prims);
    assert!((cage.positions[0][2] - 0.7).abs() < 1e-12);
    assert_eq!(cage.point_groups["wheel"], vec![0, 1, 2, 3]);
    assert!(!cage.prim_attrs.contains_key("material"));
    assert!(cage.normals.is_some());
}

#[test]
fn export_selects_encoding_per_role_path() {
    let mut network = seeded_network(&["body", "wheel"]);
    network.control_mut().exports.retopo = ExportConfig {
        path: PathBuf::from("out/retopo.fbx"),
        version: InterchangeVersion::V201400,
        ascii: true,
    };
    network.control_mut().exports.cage = ExportConfig {
        path: PathBuf::from("out/cage.bgeo"),
        ..Default::default()
    };

    let mut encoder = RecordingEncoder::default();
    network
        .export(&[Role::Retopo, Role::Cage], &mut encoder, &mut NullProgress)
        .unwrap();

    assert_eq!(encoder.calls.len(), 2);
    let (path, format, objects) = &encoder.calls[0];
    assert_eq!(path, Path::new("out/retopo.fbx"));
    assert_eq!(
        *format,
        ExportFormat::Interchange {
            version: InterchangeVersion::V201400,
            ascii: true,
        }
    );
    // Per-partition objects in aggregator order, retopo suffix applied.
    assert_eq!(objects, &vec!["body_low".to_string(), "wheel_low".to_string()]);

    let (path, format, objects) = &encoder.calls[1];
    assert_eq!(path, Path::new("out/cage.bgeo"));
    assert_eq!(*format, ExportFormat::Native);
    // Native export merges everything, cage names never suffixed.
    assert_eq!(objects, &vec!["cage_output".to_string()]);
}

#[test]
fn export_without_extension_is_rejected() {
    let mut network = seeded_network(&["body"]);
    network.control_mut().exports.reference.path = PathBuf::from("out/reference");
    let mut encoder = RecordingEncoder::default();
    let err = network
        .export(&[Role::Reference], &mut encoder, &mut NullProgress)
        .unwrap_err();
    assert!(matches!(err, BakeGraphError::UnsupportedExportPath(_)));
    assert!(encoder.calls.is_empty());
}

#[test]
fn reset_cage_recreates_in_place() {
    let mut network = seeded_network(&["body", "wheel"]);
    network.edit_cage("wheel").unwrap().push(3, [0.1, 0.0, 0.0]);
    assert_eq!(network.aggregators()[2].position("wheel"), Some(1));

    network.reset_cage("wheel").unwrap();

    let cage = network.graph().find_group("wheel", Role::Cage).unwrap();
    assert!(cage.edit_region.as_ref().unwrap().is_empty());
    assert_eq!(cage.params, GroupParams::default());
    // Still wired from the reference output, still exported second.
    let reference = network.graph().find_group("wheel", Role::Reference).unwrap();
    assert_eq!(cage.group_input, Some(reference.output));
    assert_eq!(network.aggregators()[2].position("wheel"), Some(1));
    // Partition never left the control state.
    assert!(network.control().partitions().contains("wheel"));
}

#[test]
fn edit_cage_resurrects_a_pruned_edit_node() {
    let mut network = seeded_network(&["body"]);
    network.edit_cage("body").unwrap().push(1, [0.0, 0.2, 0.0]);

    // Host tooling pruned the edit node out from under us.
    let edit_id = {
        let group = network.graph().find_group("body", Role::Cage).unwrap();
        group
            .nodes
            .iter()
            .copied()
            .find(|&id| network.graph().node(id).unwrap().kind == NodeKind::UserEdit)
            .unwrap()
    };
    network.graph_mut().remove_node(edit_id);

    // Re-entering the edit region recreates the node; edits persist.
    let region = network.edit_cage("body").unwrap();
    assert_eq!(region.edits.len(), 1);
    let cage = network.evaluate_group("body", Role::Cage).unwrap();
    assert!((cage.positions[1][1] - 0.2).abs() < 1e-12);
}
