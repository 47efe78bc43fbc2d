//! Reconciliation: diffing the known partition set against a new snapshot
//! and applying the delta to the artifact graph.
//!
//! Removal and addition are atomic per partition name: a failure on one name
//! is recorded and skipped so partial progress never corrupts the remaining
//! entries. Names present in both the old and new sets are never touched:
//! their groups, parameters, wiring and edit regions survive bit-identical,
//! which is what protects in-progress user edits across asset iterations.

use std::collections::BTreeSet;

use crate::bake_error::BakeGraphError;
use crate::control::ControlState;
use crate::graph::aggregator::Aggregator;
use crate::graph::group::{GroupParams, Role};
use crate::graph::{ArtifactGraph, aggregator_for};
use crate::progress::ProgressSink;

/// A non-fatal problem encountered while reconciling one name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileWarning {
    /// Partition the problem occurred on.
    pub partition: String,
    /// Role being processed.
    pub role: Role,
    /// The underlying error, recorded instead of aborting.
    pub error: BakeGraphError,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    /// Names whose groups were destroyed, in processing order.
    pub removed: Vec<String>,
    /// Names whose groups were created, in processing order.
    pub added: Vec<String>,
    /// Recorded-and-skipped problems.
    pub warnings: Vec<ReconcileWarning>,
}

/// Reconciles the graph with `new_names`.
///
/// Afterwards the control state's partition set equals `new_names`
/// regardless of what it was before. Creation processes roles in the fixed
/// order retopo, reference, cage because each later role wires its group
/// input from the previous role's output.
pub fn reconcile(
    graph: &mut ArtifactGraph,
    control: &mut ControlState,
    aggregators: &mut [Aggregator; 3],
    new_names: &BTreeSet<String>,
    progress: &mut dyn ProgressSink,
) -> Result<ReconcileReport, BakeGraphError> {
    let to_remove: Vec<String> = control
        .partitions()
        .difference(new_names)
        .cloned()
        .collect();
    let to_add: Vec<String> = new_names
        .difference(control.partitions())
        .cloned()
        .collect();

    let total = to_remove.len() + to_add.len();
    let mut done = 0usize;
    let mut report = ReconcileReport::default();

    for name in to_remove {
        progress.checkpoint(done, total, &format!("Removing bake groups for {name}"));
        for role in Role::ALL {
            if let Err(error) = graph.destroy_group(control, aggregators, &name, role) {
                log::warn!("skipping removal of `{name}` {role} group: {error}");
                report.warnings.push(ReconcileWarning {
                    partition: name.clone(),
                    role,
                    error,
                });
                // The aggregator entry may still exist even when the group
                // itself went missing; compact it regardless.
                aggregator_for(aggregators, role).remove(&name);
            }
        }
        // Converge the control state even when every lookup failed.
        control.remove_partition(&name);
        report.removed.push(name);
        done += 1;
    }

    for name in to_add {
        progress.checkpoint(done, total, &format!("Creating bake groups for {name}"));
        let retopo = graph.create_group(
            control,
            aggregators,
            &name,
            Role::Retopo,
            GroupParams::default(),
        )?;
        let reference = graph.create_group(
            control,
            aggregators,
            &name,
            Role::Reference,
            GroupParams::default(),
        )?;
        graph.create_group(
            control,
            aggregators,
            &name,
            Role::Cage,
            GroupParams::default(),
        )?;

        if let Some(group) = graph.find_group_mut(&name, Role::Reference) {
            group.group_input = Some(retopo);
        }
        if let Some(group) = graph.find_group_mut(&name, Role::Cage) {
            group.group_input = Some(reference);
        }
        report.added.push(name);
        done += 1;
    }

    progress.checkpoint(done, total, "Reconciliation complete");
    Ok(report)
}
