//! Mesh source boundary: resolving paths and in-graph references.
//!
//! The core never performs file I/O itself. A [`SourceResolver`] turns a
//! [`MeshSource`] into a fresh mesh snapshot; a source that fails to resolve
//! is a fatal precondition failure for the operation that needed it, reported
//! before any graph mutation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bake_error::BakeGraphError;
use crate::mesh::Mesh;

/// Where a source mesh comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeshSource {
    /// A file-system path.
    Path(PathBuf),
    /// An in-graph reference expression (`op:`-prefixed host node path).
    NodeRef(String),
}

impl MeshSource {
    /// Parses a source string: `op:/`-prefixed strings become node
    /// references, everything else a path.
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix("op:") {
            Some(node) => MeshSource::NodeRef(node.to_string()),
            None => MeshSource::Path(PathBuf::from(raw)),
        }
    }

    /// Display form used in errors and logs.
    pub fn describe(&self) -> String {
        match self {
            MeshSource::Path(path) => path.display().to_string(),
            MeshSource::NodeRef(node) => format!("op:{node}"),
        }
    }
}

/// Resolves sources to mesh snapshots. Implemented by the host; tests use
/// [`MemoryResolver`].
pub trait SourceResolver {
    /// Resolves `source` to a fresh snapshot.
    ///
    /// # Errors
    /// [`BakeGraphError::SourceMissing`] when the source does not resolve to
    /// a mesh with point and primitive data.
    fn resolve(&self, source: &MeshSource) -> Result<Mesh, BakeGraphError>;
}

/// In-memory resolver keyed by source; every lookup clones the stored
/// snapshot, modeling a fresh reload.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    meshes: HashMap<MeshSource, Mesh>,
}

impl MemoryResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the mesh behind `source`.
    pub fn insert(&mut self, source: MeshSource, mesh: Mesh) {
        self.meshes.insert(source, mesh);
    }

    /// Removes the mesh behind `source`, simulating a deleted input.
    pub fn remove(&mut self, source: &MeshSource) {
        self.meshes.remove(source);
    }
}

impl SourceResolver for MemoryResolver {
    fn resolve(&self, source: &MeshSource) -> Result<Mesh, BakeGraphError> {
        self.meshes
            .get(source)
            .cloned()
            .ok_or_else(|| BakeGraphError::SourceMissing(source.describe()))
    }
}

/// True when `path` selects the multi-object interchange encoding on export.
///
/// Selection is by extension, case-insensitive.
pub fn is_interchange_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("fbx"))
}
