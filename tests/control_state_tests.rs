use std::path::PathBuf;

use bake_graph::control::{ControlState, ExportConfig, InterchangeVersion};
use bake_graph::mesh::source::MeshSource;

#[test]
fn control_state_survives_json_round_trip() {
    let mut control = ControlState::new();
    control.set_partition_list("body door wheel");
    control.retopo_source = Some(MeshSource::parse("assets/car_low.bgeo"));
    control.reference_source = Some(MeshSource::parse("op:/obj/car_high"));
    control.config.triangulate = true;
    control.config.import_scale = 0.01;
    control.exports.cage = ExportConfig {
        path: PathBuf::from("out/cage.fbx"),
        version: InterchangeVersion::V201200,
        ascii: true,
    };

    let json = serde_json::to_string(&control).unwrap();
    let restored: ControlState = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, control);
    assert_eq!(restored.partition_list(), "body door wheel");
}

#[test]
fn legacy_partition_list_is_normalized() {
    let mut control = ControlState::new();
    // Persisted strings from older sessions may carry irregular spacing.
    control.set_partition_list("  wheel \t body\nbody ");
    assert_eq!(control.partition_list(), "body wheel");
}

#[test]
fn node_ref_sources_round_trip_distinctly() {
    let node = MeshSource::parse("op:/obj/car_high");
    let path = MeshSource::parse("obj/car_high");
    assert_ne!(node, path);

    let json = serde_json::to_string(&node).unwrap();
    let restored: MeshSource = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, node);
    assert_eq!(restored.describe(), "op:/obj/car_high");
}
