//! Artifact graph model.
//!
//! The in-memory representation of the generated network: chain nodes, bake
//! groups keyed by `(partition, role)`, and slot-addressed wiring. All
//! references are strong handles returned by creation calls; nothing is ever
//! located by a constructed name or path. Group lifecycle operations keep the
//! control state's partition list and the three per-role aggregators in sync,
//! which callers pass in explicitly.

pub mod aggregator;
pub mod chain;
pub mod group;
pub mod node;

use std::collections::{BTreeMap, HashMap};

use crate::bake_error::BakeGraphError;
use crate::control::ControlState;
use aggregator::Aggregator;
use group::{BakeGroup, EditRegion, GroupParams, Role};
use node::{Node, NodeId, NodeKind};

/// The generated network: nodes, groups, wiring.
#[derive(Debug, Clone, Default)]
pub struct ArtifactGraph {
    nodes: HashMap<NodeId, Node>,
    groups: BTreeMap<(String, Role), BakeGroup>,
    next_id: u64,
}

impl ArtifactGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a new node of `kind` and returns its handle.
    pub fn add_node(&mut self, kind: NodeKind) -> Result<NodeId, BakeGraphError> {
        self.next_id += 1;
        let id = NodeId::new(self.next_id)?;
        self.nodes.insert(id, Node::new(kind));
        Ok(id)
    }

    /// Borrows a node.
    ///
    /// # Errors
    /// [`BakeGraphError::GraphNodeMissing`] when `id` is not in the graph.
    pub fn node(&self, id: NodeId) -> Result<&Node, BakeGraphError> {
        self.nodes.get(&id).ok_or(BakeGraphError::GraphNodeMissing(id))
    }

    /// Removes a node outright. Intended for host tooling that prunes
    /// untouched edit nodes; wiring into the node is left dangling and
    /// resurrected by [`ArtifactGraph::ensure_user_edit_node`].
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        self.nodes.remove(&id).is_some()
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Wires `output`'s result into `input`'s slot `slot`.
    ///
    /// Single input slot per consumer except the topology-match stage.
    pub fn wire(
        &mut self,
        output: NodeId,
        input: NodeId,
        slot: usize,
    ) -> Result<(), BakeGraphError> {
        if !self.nodes.contains_key(&output) {
            return Err(BakeGraphError::GraphNodeMissing(output));
        }
        let node = self
            .nodes
            .get_mut(&input)
            .ok_or(BakeGraphError::GraphNodeMissing(input))?;
        let entry = node
            .inputs
            .get_mut(slot)
            .ok_or(BakeGraphError::InvalidInputSlot { node: input, slot })?;
        *entry = Some(output);
        Ok(())
    }

    /// The node wired into `input`'s slot `slot`, if any.
    pub fn input_of(&self, input: NodeId, slot: usize) -> Result<Option<NodeId>, BakeGraphError> {
        let node = self.node(input)?;
        node.inputs
            .get(slot)
            .copied()
            .ok_or(BakeGraphError::InvalidInputSlot { node: input, slot })
    }

    /// Creates the bake group for `(partition, role)`, building its chain.
    ///
    /// Appends the group's output to the matching aggregator and registers
    /// the partition in the control state. Per-group `params` persist across
    /// regeneration and are supplied by the caller.
    ///
    /// # Errors
    /// [`BakeGraphError::DuplicateGroup`] when the pair already exists.
    pub fn create_group(
        &mut self,
        control: &mut ControlState,
        aggregators: &mut [Aggregator; 3],
        partition: &str,
        role: Role,
        params: GroupParams,
    ) -> Result<NodeId, BakeGraphError> {
        let key = (partition.to_string(), role);
        if self.groups.contains_key(&key) {
            return Err(BakeGraphError::DuplicateGroup {
                partition: partition.to_string(),
                role,
            });
        }

        let mut built = chain::build_chain(self, partition, role)?;
        built.params = params;
        let output = built.output;
        self.groups.insert(key, built);

        aggregator_for(aggregators, role).push(partition, output);
        control.insert_partition(partition);
        Ok(output)
    }

    /// Looks up the group for `(partition, role)`.
    pub fn find_group(&self, partition: &str, role: Role) -> Option<&BakeGroup> {
        self.groups.get(&(partition.to_string(), role))
    }

    /// Mutable lookup for `(partition, role)`.
    pub fn find_group_mut(&mut self, partition: &str, role: Role) -> Option<&mut BakeGroup> {
        self.groups.get_mut(&(partition.to_string(), role))
    }

    /// Destroys the group for `(partition, role)` and all of its nodes.
    ///
    /// For a cage group this destroys the edit region with it. The matching
    /// aggregator entry is removed with index compaction, and the partition
    /// leaves the control state once no role group remains for it.
    ///
    /// # Errors
    /// [`BakeGraphError::UnknownGroup`] when the pair does not exist.
    pub fn destroy_group(
        &mut self,
        control: &mut ControlState,
        aggregators: &mut [Aggregator; 3],
        partition: &str,
        role: Role,
    ) -> Result<(), BakeGraphError> {
        let group = self
            .groups
            .remove(&(partition.to_string(), role))
            .ok_or_else(|| BakeGraphError::UnknownGroup {
                partition: partition.to_string(),
                role,
            })?;
        for id in &group.nodes {
            self.nodes.remove(id);
        }
        aggregator_for(aggregators, role).remove(partition);

        let still_known = Role::ALL
            .iter()
            .any(|&r| self.groups.contains_key(&(partition.to_string(), r)));
        if !still_known {
            control.remove_partition(partition);
        }
        Ok(())
    }

    /// All registered groups in deterministic `(partition, role)` order.
    pub fn groups(&self) -> impl Iterator<Item = &BakeGroup> {
        self.groups.values()
    }

    /// The edit region of `partition`'s cage group, if both exist.
    pub fn edit_region(&self, partition: &str) -> Option<&EditRegion> {
        self.find_group(partition, Role::Cage)
            .and_then(|g| g.edit_region.as_ref())
    }

    /// Mutable access to `partition`'s cage edit region.
    ///
    /// # Errors
    /// [`BakeGraphError::UnknownGroup`] when the cage group does not exist.
    pub fn edit_region_mut(&mut self, partition: &str) -> Result<&mut EditRegion, BakeGraphError> {
        let group = self.groups.get_mut(&(partition.to_string(), Role::Cage)).ok_or_else(|| {
            BakeGraphError::UnknownGroup {
                partition: partition.to_string(),
                role: Role::Cage,
            }
        })?;
        Ok(group.edit_region.get_or_insert_with(EditRegion::default))
    }

    /// Recreates the cage chain's user-edit node if it was dropped.
    ///
    /// Host tooling removes edit nodes that were entered but never touched;
    /// this re-wires a fresh one between the edit-region end marker and the
    /// downstream stage, leaving recorded edits intact.
    pub fn ensure_user_edit_node(&mut self, partition: &str) -> Result<NodeId, BakeGraphError> {
        let group = self
            .find_group(partition, Role::Cage)
            .ok_or_else(|| BakeGraphError::UnknownGroup {
                partition: partition.to_string(),
                role: Role::Cage,
            })?;

        let mut existing = None;
        let mut edit_end = None;
        let mut downstream = None;
        for (pos, &id) in group.nodes.iter().enumerate() {
            match self.nodes.get(&id).map(|n| &n.kind) {
                Some(NodeKind::UserEdit) => existing = Some(id),
                Some(NodeKind::EditEnd) => edit_end = Some((pos, id)),
                _ => {}
            }
        }
        if let Some(id) = existing {
            return Ok(id);
        }
        let (end_pos, end_id) =
            edit_end.ok_or_else(|| BakeGraphError::UnknownGroup {
                partition: partition.to_string(),
                role: Role::Cage,
            })?;

        // The stage that used to consume the edit node's output.
        let nodes = group.nodes.clone();
        for &candidate in &nodes[end_pos + 1..] {
            if self.nodes.contains_key(&candidate) {
                downstream = Some(candidate);
                break;
            }
        }

        log::warn!("user-edit node for cage `{partition}` was dropped; recreating");
        let edit = self.add_node(NodeKind::UserEdit)?;
        self.wire(end_id, edit, 0)?;
        if let Some(consumer) = downstream {
            self.wire(edit, consumer, 0)?;
        }
        let group = self
            .groups
            .get_mut(&(partition.to_string(), Role::Cage))
            .ok_or_else(|| BakeGraphError::UnknownGroup {
                partition: partition.to_string(),
                role: Role::Cage,
            })?;
        // Drop the stale handle the removed node left behind.
        let live: Vec<NodeId> = group
            .nodes
            .iter()
            .copied()
            .filter(|id| self.nodes.contains_key(id))
            .collect();
        group.nodes = live;
        let insert_at = group
            .nodes
            .iter()
            .position(|&id| id == end_id)
            .map(|p| p + 1)
            .unwrap_or(group.nodes.len());
        group.nodes.insert(insert_at, edit);
        Ok(edit)
    }
}

/// The aggregator responsible for `role`.
pub fn aggregator_for(aggregators: &mut [Aggregator; 3], role: Role) -> &mut Aggregator {
    match role {
        Role::Retopo => &mut aggregators[0],
        Role::Reference => &mut aggregators[1],
        Role::Cage => &mut aggregators[2],
    }
}

/// Creates the three role aggregators in canonical order.
pub fn new_aggregators() -> [Aggregator; 3] {
    [
        Aggregator::new(Role::Retopo),
        Aggregator::new(Role::Reference),
        Aggregator::new(Role::Cage),
    ]
}
