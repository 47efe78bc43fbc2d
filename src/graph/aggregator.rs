//! Per-role aggregator nodes.
//!
//! An aggregator holds an ordered, index-addressable list of references to
//! role-specific group outputs; downstream export consumes entries
//! positionally, so removal must compact the list and close the gap.
//! Entries are addressed by partition name, never by a computed flat index.

use serde::{Deserialize, Serialize};

use super::group::Role;
use super::node::NodeId;

/// One positional reference to a group output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatorRef {
    /// Partition whose output this entry merges.
    pub partition: String,
    /// The group's terminal output node.
    pub output: NodeId,
}

/// Ordered reference list combining all partitions' outputs for one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregator {
    /// Role this aggregator combines.
    pub role: Role,
    refs: Vec<AggregatorRef>,
}

impl Aggregator {
    /// Creates an empty aggregator for `role`.
    pub fn new(role: Role) -> Self {
        Self {
            role,
            refs: Vec::new(),
        }
    }

    /// Appends a reference at the next index.
    pub fn push(&mut self, partition: &str, output: NodeId) {
        self.refs.push(AggregatorRef {
            partition: partition.to_string(),
            output,
        });
    }

    /// Inserts a reference at `index`, shifting later entries up.
    ///
    /// Used when a destroyed group is recreated in place (cage reset) so the
    /// positional export order is preserved. Indices past the end append.
    pub fn insert(&mut self, index: usize, partition: &str, output: NodeId) {
        let index = index.min(self.refs.len());
        self.refs.insert(
            index,
            AggregatorRef {
                partition: partition.to_string(),
                output,
            },
        );
    }

    /// Position of `partition`'s entry, if present.
    pub fn position(&self, partition: &str) -> Option<usize> {
        self.refs.iter().position(|r| r.partition == partition)
    }

    /// Removes the entry for `partition`, compacting the index list.
    ///
    /// Returns `true` when an entry was removed. Later entries shift down by
    /// one position; there is never a gap.
    pub fn remove(&mut self, partition: &str) -> bool {
        match self.refs.iter().position(|r| r.partition == partition) {
            Some(index) => {
                self.refs.remove(index);
                true
            }
            None => false,
        }
    }

    /// Positional entries, in merge order.
    pub fn refs(&self) -> &[AggregatorRef] {
        &self.refs
    }

    /// Number of referenced partitions.
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    /// True when no partitions are referenced.
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// True when `partition` currently has an entry.
    pub fn contains(&self, partition: &str) -> bool {
        self.refs.iter().any(|r| r.partition == partition)
    }
}
