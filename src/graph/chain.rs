//! Per-role chain construction.
//!
//! Builds the processing chain for one `(partition, role)` pair and returns
//! the assembled [`BakeGroup`]. Construction only wires intra-group stages;
//! inter-group wiring order (`reference <- retopo`, `cage <- reference`) is
//! decided by the reconciler.

use crate::bake_error::BakeGraphError;
use crate::graph::ArtifactGraph;
use crate::graph::group::{BakeGroup, EditRegion, GroupParams, Role};
use crate::graph::node::{NodeId, NodeKind, SourceSlot};

/// Builds the chain for `(partition, role)` inside `graph`.
pub(crate) fn build_chain(
    graph: &mut ArtifactGraph,
    partition: &str,
    role: Role,
) -> Result<BakeGroup, BakeGraphError> {
    match role {
        Role::Retopo => build_retopo(graph, partition),
        Role::Reference => build_reference(graph, partition),
        Role::Cage => build_cage(graph, partition),
    }
}

/// extract -> translate -> export-scale -> subdivide -> triangulate -> out.
fn build_retopo(graph: &mut ArtifactGraph, partition: &str) -> Result<BakeGroup, BakeGraphError> {
    let kinds = [
        NodeKind::ExtractPartition {
            source: SourceSlot::Retopo,
            partition: partition.to_string(),
        },
        NodeKind::Translate,
        NodeKind::ExportScale,
        NodeKind::Subdivide,
        NodeKind::Triangulate,
        NodeKind::Output,
    ];
    let nodes = link_linear(graph, &kinds)?;
    let output = *nodes.last().ok_or(BakeGraphError::InvalidNodeId)?;
    Ok(assemble(partition, Role::Retopo, nodes, output, None))
}

/// extract -> translate -> export-scale -> out. No subdivision or
/// triangulation on the reference chain.
fn build_reference(graph: &mut ArtifactGraph, partition: &str) -> Result<BakeGroup, BakeGraphError> {
    let kinds = [
        NodeKind::ExtractPartition {
            source: SourceSlot::Reference,
            partition: partition.to_string(),
        },
        NodeKind::Translate,
        NodeKind::ExportScale,
        NodeKind::Output,
    ];
    let nodes = link_linear(graph, &kinds)?;
    let output = *nodes.last().ok_or(BakeGraphError::InvalidNodeId)?;
    Ok(assemble(partition, Role::Reference, nodes, output, None))
}

/// The cage chain extracts from the *retopo* source, brackets a protected
/// edit region, and ends in the topology-correspondence stage fed by a
/// re-import of the sibling retopo chain's output with its material marker
/// stripped.
fn build_cage(graph: &mut ArtifactGraph, partition: &str) -> Result<BakeGroup, BakeGraphError> {
    let kinds = [
        NodeKind::ExtractPartition {
            source: SourceSlot::Retopo,
            partition: partition.to_string(),
        },
        NodeKind::ApplyMaterial,
        NodeKind::Normals,
        NodeKind::Peak,
        NodeKind::EditBegin,
        NodeKind::EditEnd,
        NodeKind::UserEdit,
        NodeKind::Translate,
        NodeKind::ExportScale,
        NodeKind::Subdivide,
    ];
    let mut nodes = link_linear(graph, &kinds)?;
    let subdivide = *nodes.last().ok_or(BakeGraphError::InvalidNodeId)?;

    // Topology donor branch: the sibling retopo output, material stripped.
    let reimport = graph.add_node(NodeKind::ReimportOutput {
        partition: partition.to_string(),
    })?;
    let strip = graph.add_node(NodeKind::StripMaterial)?;
    graph.wire(reimport, strip, 0)?;

    let topo_match = graph.add_node(NodeKind::TopologyMatch)?;
    graph.wire(subdivide, topo_match, 0)?;
    graph.wire(strip, topo_match, 1)?;

    let post_normals = graph.add_node(NodeKind::PostNormals)?;
    graph.wire(topo_match, post_normals, 0)?;
    let output = graph.add_node(NodeKind::Output)?;
    graph.wire(post_normals, output, 0)?;

    nodes.extend([reimport, strip, topo_match, post_normals, output]);
    Ok(assemble(
        partition,
        Role::Cage,
        nodes,
        output,
        Some(EditRegion::default()),
    ))
}

/// Adds the given kinds and wires them into a linear chain.
fn link_linear(
    graph: &mut ArtifactGraph,
    kinds: &[NodeKind],
) -> Result<Vec<NodeId>, BakeGraphError> {
    let mut nodes = Vec::with_capacity(kinds.len());
    let mut upstream: Option<NodeId> = None;
    for kind in kinds {
        let id = graph.add_node(kind.clone())?;
        if let Some(prev) = upstream {
            graph.wire(prev, id, 0)?;
        }
        upstream = Some(id);
        nodes.push(id);
    }
    Ok(nodes)
}

fn assemble(
    partition: &str,
    role: Role,
    nodes: Vec<NodeId>,
    output: NodeId,
    edit_region: Option<EditRegion>,
) -> BakeGroup {
    BakeGroup {
        partition: partition.to_string(),
        role,
        nodes,
        output,
        group_input: None,
        params: GroupParams::default(),
        edit_region,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retopo_chain_shape() {
        let mut graph = ArtifactGraph::new();
        let group = build_chain(&mut graph, "wheel", Role::Retopo).unwrap();
        assert_eq!(group.nodes.len(), 6);
        assert_eq!(group.output, *group.nodes.last().unwrap());
        assert!(group.edit_region.is_none());
        // Linear wiring: each node after the first consumes its predecessor.
        for pair in group.nodes.windows(2) {
            assert_eq!(graph.input_of(pair[1], 0).unwrap(), Some(pair[0]));
        }
    }

    #[test]
    fn reference_chain_has_no_conditional_stages() {
        let mut graph = ArtifactGraph::new();
        let group = build_chain(&mut graph, "wheel", Role::Reference).unwrap();
        for &id in &group.nodes {
            let kind = &graph.node(id).unwrap().kind;
            assert!(!matches!(
                kind,
                NodeKind::Subdivide | NodeKind::Triangulate | NodeKind::TopologyMatch
            ));
        }
    }

    #[test]
    fn cage_chain_feeds_topology_match_from_both_branches() {
        let mut graph = ArtifactGraph::new();
        let group = build_chain(&mut graph, "wheel", Role::Cage).unwrap();
        assert!(group.edit_region.is_some());

        let topo_match = group
            .nodes
            .iter()
            .copied()
            .find(|&id| graph.node(id).unwrap().kind == NodeKind::TopologyMatch)
            .unwrap();
        let position_branch = graph.input_of(topo_match, 0).unwrap().unwrap();
        let topology_branch = graph.input_of(topo_match, 1).unwrap().unwrap();
        assert_eq!(graph.node(position_branch).unwrap().kind, NodeKind::Subdivide);
        assert_eq!(graph.node(topology_branch).unwrap().kind, NodeKind::StripMaterial);
    }
}
