//! The bake network: user-triggered operations over one artifact graph.
//!
//! `BakeNetwork` owns the graph, control state, aggregators, a source
//! resolver and the opaque operator set, and exposes the command surface:
//! create, update, evaluate, export, reset-cage, edit-cage. Commands are
//! first-class methods (there is no string-dispatched callback anywhere)
//! and all of them take `&mut self`, which serializes invocations
//! structurally: a second reconciliation cannot start while one is in
//! flight.
//!
//! All operations are synchronous and run on the calling thread. Fatal
//! failures abort before any mutation; update validates freshly resolved
//! temporary copies of both sources before the live snapshots are replaced,
//! so a mismatched new asset version leaves the existing network fully
//! intact.

use crate::algs::correspond::correspond;
use crate::algs::partition::{partition_names, validate_partition_sets};
use crate::algs::reconcile::{ReconcileReport, reconcile};
use crate::bake_error::BakeGraphError;
use crate::control::ControlState;
use crate::export::{ExportFormat, MeshEncoder, build_export_objects};
use crate::graph::aggregator::Aggregator;
use crate::graph::group::{BakeGroup, EditRegion, GroupParams, Role};
use crate::graph::node::{NodeId, NodeKind, SourceSlot};
use crate::graph::{ArtifactGraph, aggregator_for, new_aggregators};
use crate::mesh::Mesh;
use crate::mesh::ops::MeshOps;
use crate::mesh::source::{MeshSource, SourceResolver};
use crate::progress::ProgressSink;

/// Material marker value applied by cage chains.
const CAGE_MATERIAL: &str = "cage";

/// One artifact graph plus everything needed to drive it.
pub struct BakeNetwork<R, O> {
    graph: ArtifactGraph,
    control: ControlState,
    aggregators: [Aggregator; 3],
    resolver: R,
    ops: O,
    retopo_mesh: Option<Mesh>,
    reference_mesh: Option<Mesh>,
}

impl<R, O> BakeNetwork<R, O>
where
    R: SourceResolver,
    O: MeshOps,
{
    /// Creates an empty network with default configuration.
    pub fn new(resolver: R, ops: O) -> Self {
        Self {
            graph: ArtifactGraph::new(),
            control: ControlState::new(),
            aggregators: new_aggregators(),
            resolver,
            ops,
            retopo_mesh: None,
            reference_mesh: None,
        }
    }

    /// The control state.
    pub fn control(&self) -> &ControlState {
        &self.control
    }

    /// Mutable control state, for configuration changes between commands.
    pub fn control_mut(&mut self) -> &mut ControlState {
        &mut self.control
    }

    /// The artifact graph.
    pub fn graph(&self) -> &ArtifactGraph {
        &self.graph
    }

    /// Mutable graph access for host tooling (node pruning, direct group
    /// parameter edits).
    pub fn graph_mut(&mut self) -> &mut ArtifactGraph {
        &mut self.graph
    }

    /// The source resolver.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Mutable resolver access, for hosts whose inputs change in place.
    pub fn resolver_mut(&mut self) -> &mut R {
        &mut self.resolver
    }

    /// The three role aggregators, in retopo/reference/cage order.
    pub fn aggregators(&self) -> &[Aggregator; 3] {
        &self.aggregators
    }

    /// Creates the network from the two sources.
    ///
    /// Resolves and validates both meshes first; any failure aborts before
    /// the graph is touched. On success every partition gets its bake-group
    /// triple, wired `reference <- retopo`, `cage <- reference`.
    pub fn create(
        &mut self,
        retopo: MeshSource,
        reference: MeshSource,
        progress: &mut dyn ProgressSink,
    ) -> Result<ReconcileReport, BakeGraphError> {
        progress.checkpoint(0, 0, "Loading geometry");
        let retopo_mesh = self.import(&retopo, false)?;
        let reference_mesh = self.import(&reference, true)?;

        let retopo_names = partition_names(&retopo_mesh);
        let reference_names = partition_names(&reference_mesh);
        validate_partition_sets(&retopo_names, &reference_names)?;

        self.control.retopo_source = Some(retopo);
        self.control.reference_source = Some(reference);
        self.retopo_mesh = Some(retopo_mesh);
        self.reference_mesh = Some(reference_mesh);

        reconcile(
            &mut self.graph,
            &mut self.control,
            &mut self.aggregators,
            &retopo_names,
            progress,
        )
    }

    /// Updates the network after an asset iteration.
    ///
    /// Both sources are re-resolved into temporary copies and validated
    /// *before* the live snapshots are replaced; a failure at that stage
    /// leaves the existing network fully intact. Reconciliation then
    /// removes stale partitions, adds new ones, and leaves everything else
    /// untouched, including in-progress cage edits.
    pub fn update(
        &mut self,
        progress: &mut dyn ProgressSink,
    ) -> Result<ReconcileReport, BakeGraphError> {
        let retopo_source = self
            .control
            .retopo_source
            .clone()
            .ok_or_else(|| BakeGraphError::SourceMissing("retopo source".to_string()))?;
        let reference_source = self
            .control
            .reference_source
            .clone()
            .ok_or_else(|| BakeGraphError::SourceMissing("reference source".to_string()))?;

        progress.checkpoint(0, 0, "Reloading geometry");
        let retopo_temp = self.import(&retopo_source, false)?;
        let reference_temp = self.import(&reference_source, true)?;

        let new_names = partition_names(&retopo_temp);
        validate_partition_sets(&new_names, &partition_names(&reference_temp))?;

        // Validation passed; the temporary copies become the live snapshots.
        self.retopo_mesh = Some(retopo_temp);
        self.reference_mesh = Some(reference_temp);

        reconcile(
            &mut self.graph,
            &mut self.control,
            &mut self.aggregators,
            &new_names,
            progress,
        )
    }

    /// Resolves a source and applies the import transforms.
    fn import(&self, source: &MeshSource, smoothable: bool) -> Result<Mesh, BakeGraphError> {
        let mut mesh = self.resolver.resolve(source)?;
        if mesh.point_count() == 0 {
            return Err(BakeGraphError::SourceMissing(source.describe()));
        }
        let scale = self.control.config.import_scale;
        if scale != 1.0 {
            self.ops.scale(&mut mesh, scale);
        }
        if smoothable && self.control.config.smooth_normals {
            self.ops.compute_normals(&mut mesh, true);
        }
        Ok(mesh)
    }

    /// Evaluates the exportable output mesh of `(partition, role)`.
    pub fn evaluate_group(&self, partition: &str, role: Role) -> Result<Mesh, BakeGraphError> {
        let group = self.graph.find_group(partition, role).ok_or_else(|| {
            BakeGraphError::UnknownGroup {
                partition: partition.to_string(),
                role,
            }
        })?;
        self.eval_node(group, group.output)
    }

    fn eval_node(&self, group: &BakeGroup, id: NodeId) -> Result<Mesh, BakeGraphError> {
        let node = self.graph.node(id)?;
        let config = &self.control.config;

        match &node.kind {
            NodeKind::ExtractPartition { source, partition } => {
                let mesh = match source {
                    SourceSlot::Retopo => self.retopo_mesh.as_ref(),
                    SourceSlot::Reference => self.reference_mesh.as_ref(),
                };
                let mesh = mesh.ok_or_else(|| {
                    BakeGraphError::SourceMissing(format!("{source:?} snapshot"))
                })?;
                Ok(mesh.extract_prim_group(partition))
            }
            NodeKind::ReimportOutput { partition } => {
                self.evaluate_group(partition, Role::Retopo)
            }
            NodeKind::TopologyMatch => {
                let mut position = self.eval_input(group, id, 0)?;
                if !config.triangulate {
                    // Without triangulation the two meshes already share
                    // topology; the stage passes straight through.
                    return Ok(position);
                }
                position.record_point_partitions();
                let topology = self.eval_input(group, id, 1)?;
                Ok(correspond(&position, &topology))
            }
            kind => {
                let mut mesh = self.eval_input(group, id, 0)?;
                match kind {
                    NodeKind::ApplyMaterial => self.ops.apply_material(&mut mesh, CAGE_MATERIAL),
                    NodeKind::Normals | NodeKind::PostNormals => {
                        self.ops.compute_normals(&mut mesh, config.smooth_normals)
                    }
                    NodeKind::Peak => self.ops.peak(&mut mesh, group.params.peak_dist),
                    NodeKind::Translate => self.ops.translate(&mut mesh, group.params.translate),
                    NodeKind::ExportScale => self.ops.scale(&mut mesh, config.export_scale),
                    NodeKind::Subdivide => {
                        if config.subdivide {
                            self.ops.subdivide(
                                &mut mesh,
                                config.algorithm,
                                group.params.subdiv_iterations,
                            );
                        }
                    }
                    NodeKind::Triangulate => {
                        if config.triangulate {
                            // Membership must survive the connectivity change.
                            mesh.record_point_partitions();
                            self.ops.triangulate(&mut mesh);
                        }
                    }
                    NodeKind::StripMaterial => self.ops.strip_material(&mut mesh),
                    NodeKind::UserEdit => {
                        if let Some(region) = &group.edit_region {
                            apply_edits(&mut mesh, region);
                        }
                    }
                    NodeKind::EditBegin
                    | NodeKind::EditEnd
                    | NodeKind::Output => {}
                    // Handled in the outer match.
                    NodeKind::ExtractPartition { .. }
                    | NodeKind::ReimportOutput { .. }
                    | NodeKind::TopologyMatch => unreachable!(),
                }
                Ok(mesh)
            }
        }
    }

    fn eval_input(
        &self,
        group: &BakeGroup,
        id: NodeId,
        slot: usize,
    ) -> Result<Mesh, BakeGraphError> {
        let upstream = self
            .graph
            .input_of(id, slot)?
            .ok_or(BakeGraphError::UnwiredInput { node: id, slot })?;
        self.eval_node(group, upstream)
    }

    /// Exports the given roles through `encoder`.
    ///
    /// Each role's aggregator is walked positionally; retopo and reference
    /// objects are suffixed when name correspondence is enabled, cage output
    /// never is.
    pub fn export(
        &self,
        roles: &[Role],
        encoder: &mut dyn MeshEncoder,
        progress: &mut dyn ProgressSink,
    ) -> Result<(), BakeGraphError> {
        for (done, &role) in roles.iter().enumerate() {
            progress.checkpoint(done, roles.len(), &format!("Exporting {role}"));

            let export = self.control.exports.for_role(role);
            let format = ExportFormat::from_path(&export.path, export.version, export.ascii)?;

            let aggregator = match role {
                Role::Retopo => &self.aggregators[0],
                Role::Reference => &self.aggregators[1],
                Role::Cage => &self.aggregators[2],
            };
            let mut outputs = Vec::with_capacity(aggregator.len());
            for entry in aggregator.refs() {
                let mesh = self.evaluate_group(&entry.partition, role)?;
                outputs.push((entry.partition.clone(), mesh));
            }

            let suffix = self.control.config.suffix_for(role);
            let objects = build_export_objects(format, role.name(), &outputs, suffix);
            encoder.encode(&export.path, format, &objects)?;
        }
        progress.checkpoint(roles.len(), roles.len(), "Export complete");
        Ok(())
    }

    /// Restores `partition`'s cage group to its default state.
    ///
    /// Destroy-then-recreate: the edit region's content is discarded and the
    /// per-partition translate/peak parameters are zeroed. This loss is the
    /// operation's documented meaning, not an accident. The aggregator entry
    /// is recreated at its old position so export order is unchanged.
    pub fn reset_cage(&mut self, partition: &str) -> Result<(), BakeGraphError> {
        let cage_aggregator = aggregator_for(&mut self.aggregators, Role::Cage);
        let old_position = cage_aggregator.position(partition);

        self.graph.destroy_group(
            &mut self.control,
            &mut self.aggregators,
            partition,
            Role::Cage,
        )?;
        let output = self.graph.create_group(
            &mut self.control,
            &mut self.aggregators,
            partition,
            Role::Cage,
            GroupParams::default(),
        )?;

        if let Some(index) = old_position {
            let cage_aggregator = aggregator_for(&mut self.aggregators, Role::Cage);
            cage_aggregator.remove(partition);
            cage_aggregator.insert(index, partition, output);
        }

        let reference_output = self
            .graph
            .find_group(partition, Role::Reference)
            .map(|g| g.output);
        if let Some(group) = self.graph.find_group_mut(partition, Role::Cage) {
            group.group_input = reference_output;
        }
        Ok(())
    }

    /// Opens `partition`'s cage edit region for mutation.
    ///
    /// Recreates the user-edit node if host tooling dropped it.
    pub fn edit_cage(&mut self, partition: &str) -> Result<&mut EditRegion, BakeGraphError> {
        self.graph.ensure_user_edit_node(partition)?;
        self.graph.edit_region_mut(partition)
    }
}

/// Applies recorded user edits as point-position deltas.
fn apply_edits(mesh: &mut Mesh, region: &EditRegion) {
    for edit in &region.edits {
        if let Some(p) = mesh.positions.get_mut(edit.point) {
            p[0] += edit.offset[0];
            p[1] += edit.offset[1];
            p[2] += edit.offset[2];
        } else {
            log::debug!(
                "user edit targets point {} beyond mesh size {}; skipped",
                edit.point,
                mesh.point_count()
            );
        }
    }
}
