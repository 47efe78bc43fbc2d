//! Control state: the single source of truth the reconciler consults.
//!
//! One explicit record passed by reference to all operations, never looked
//! up by name at call sites: the ordered set of currently-known partition
//! names, the two source references, and the global + per-role export
//! configuration.
//!
//! Invariant: [`ControlState::partitions`] always equals the set of names
//! for which a full bake-group triple exists. Only the reconciler and the
//! group-lifecycle operations mutate it.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::graph::group::Role;
use crate::mesh::ops::SubdivisionScheme;
use crate::mesh::source::MeshSource;

/// Interchange-format version selector for multi-object export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterchangeVersion {
    /// FBX 2016.
    #[default]
    V201600,
    /// FBX 2014.
    V201400,
    /// FBX 2013.
    V201300,
    /// FBX 2012.
    V201200,
    /// FBX 2011.
    V201100,
    /// FBX 2010 (6.0 series).
    V201000,
    /// FBX 2009 (6.0 series).
    V200900,
    /// FBX 2006.11 (6.0 series).
    V200611,
}

/// Per-role export settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Target file path; its extension selects the output encoding.
    pub path: PathBuf,
    /// Interchange version when the interchange encoding is selected.
    pub version: InterchangeVersion,
    /// ASCII variant of the interchange encoding.
    pub ascii: bool,
}

/// Export settings for the three roles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleExports {
    /// Retopo output settings.
    pub retopo: ExportConfig,
    /// Reference output settings.
    pub reference: ExportConfig,
    /// Cage output settings.
    pub cage: ExportConfig,
}

impl RoleExports {
    /// Settings for `role`.
    pub fn for_role(&self, role: Role) -> &ExportConfig {
        match role {
            Role::Retopo => &self.retopo,
            Role::Reference => &self.reference,
            Role::Cage => &self.cage,
        }
    }
}

/// Global network configuration consumed by chain evaluation and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Enables the subdivision stages.
    pub subdivide: bool,
    /// Subdivision algorithm forwarded to the operator.
    pub algorithm: SubdivisionScheme,
    /// Smooth reference normals on import.
    pub smooth_normals: bool,
    /// Scale applied on import.
    pub import_scale: f64,
    /// Scale applied by the export-scale stages.
    pub export_scale: f64,
    /// Enables the triangulation and topology-correspondence stages.
    pub triangulate: bool,
    /// Suffix retopo/reference outputs for baker name matching.
    pub name_correspondence: bool,
    /// Suffix for retopo objects when name correspondence is on.
    pub retopo_suffix: String,
    /// Suffix for reference objects when name correspondence is on.
    pub reference_suffix: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            subdivide: false,
            algorithm: SubdivisionScheme::default(),
            smooth_normals: true,
            import_scale: 1.0,
            export_scale: 1.0,
            triangulate: false,
            name_correspondence: true,
            retopo_suffix: "_low".to_string(),
            reference_suffix: "_high".to_string(),
        }
    }
}

impl NetworkConfig {
    /// The group-name suffix applied to `role` aggregates, if any.
    ///
    /// Cage output is never suffixed; retopo/reference only when name
    /// correspondence is enabled.
    pub fn suffix_for(&self, role: Role) -> Option<&str> {
        if !self.name_correspondence {
            return None;
        }
        match role {
            Role::Retopo => Some(self.retopo_suffix.as_str()),
            Role::Reference => Some(self.reference_suffix.as_str()),
            Role::Cage => None,
        }
    }
}

/// The persisted control record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlState {
    partitions: BTreeSet<String>,
    /// Source reference for the retopo mesh.
    pub retopo_source: Option<MeshSource>,
    /// Source reference for the reference mesh.
    pub reference_source: Option<MeshSource>,
    /// Global configuration.
    pub config: NetworkConfig,
    /// Per-role export configuration.
    pub exports: RoleExports,
}

impl ControlState {
    /// Creates a control state with default configuration and no partitions.
    pub fn new() -> Self {
        Self::default()
    }

    /// The ordered set of currently-known partition names.
    pub fn partitions(&self) -> &BTreeSet<String> {
        &self.partitions
    }

    /// Registers a partition name. Idempotent.
    pub(crate) fn insert_partition(&mut self, name: &str) {
        self.partitions.insert(name.to_string());
    }

    /// Unregisters a partition name. Idempotent.
    pub(crate) fn remove_partition(&mut self, name: &str) {
        self.partitions.remove(name);
    }

    /// Legacy persisted form: the sorted names joined by single spaces.
    pub fn partition_list(&self) -> String {
        itertools::join(self.partitions.iter(), " ")
    }

    /// Restores the partition set from the legacy whitespace-joined form.
    pub fn set_partition_list(&mut self, list: &str) {
        self.partitions = list
            .split_whitespace()
            .map(|name| name.to_string())
            .collect();
    }
}
