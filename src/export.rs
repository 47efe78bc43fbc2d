//! Aggregation and the export boundary.
//!
//! The aggregation stage merges all per-partition outputs for a role into
//! one exportable mesh, optionally applying the role's naming suffix. The
//! actual byte encoding is owned elsewhere: the core selects an
//! [`ExportFormat`] from the target path and hands named objects to a
//! [`MeshEncoder`].

use std::path::Path;

use crate::bake_error::BakeGraphError;
use crate::control::InterchangeVersion;
use crate::mesh::Mesh;
use crate::mesh::source::is_interchange_path;

/// Output encoding, selected by the export path's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Multi-object interchange encoding (one export operation per role).
    Interchange {
        /// Format-specific version.
        version: InterchangeVersion,
        /// ASCII rather than binary output.
        ascii: bool,
    },
    /// Native single-mesh encoding; objects are pre-merged.
    Native,
}

impl ExportFormat {
    /// Selects the encoding for `path`.
    ///
    /// # Errors
    /// [`BakeGraphError::UnsupportedExportPath`] when the path carries no
    /// extension to select by.
    pub fn from_path(
        path: &Path,
        version: InterchangeVersion,
        ascii: bool,
    ) -> Result<Self, BakeGraphError> {
        if path.extension().is_none() {
            return Err(BakeGraphError::UnsupportedExportPath(
                path.display().to_string(),
            ));
        }
        if is_interchange_path(path) {
            Ok(ExportFormat::Interchange { version, ascii })
        } else {
            Ok(ExportFormat::Native)
        }
    }
}

/// One named object handed to the encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportObject {
    /// Object name (partition name, possibly suffixed).
    pub name: String,
    /// The evaluated mesh.
    pub mesh: Mesh,
}

/// The encoding boundary. Implementations own file I/O and format details.
pub trait MeshEncoder {
    /// Writes `objects` to `path` using `format`.
    ///
    /// # Errors
    /// Implementations report failures as
    /// [`BakeGraphError::ExportFailed`].
    fn encode(
        &mut self,
        path: &Path,
        format: ExportFormat,
        objects: &[ExportObject],
    ) -> Result<(), BakeGraphError>;
}

/// Merges per-partition role outputs positionally into one mesh.
///
/// `outputs` must already be in aggregator order; `suffix` (when name
/// correspondence applies to the role) is appended to every group name so
/// baker tooling can pair objects across roles.
pub fn aggregate(outputs: &[(String, Mesh)], suffix: Option<&str>) -> Mesh {
    let mut merged = Mesh::default();
    for (_, mesh) in outputs {
        merged.merge(mesh);
    }
    if let Some(suffix) = suffix {
        merged.suffix_group_names(suffix);
    }
    merged
}

/// Shapes role outputs into encoder objects for `format`.
///
/// Interchange export keeps one object per partition (suffix applied to the
/// object names); native export merges everything into a single object named
/// after the role's aggregate.
pub fn build_export_objects(
    format: ExportFormat,
    role_name: &str,
    outputs: &[(String, Mesh)],
    suffix: Option<&str>,
) -> Vec<ExportObject> {
    match format {
        ExportFormat::Interchange { .. } => outputs
            .iter()
            .map(|(partition, mesh)| ExportObject {
                name: match suffix {
                    Some(suffix) => format!("{partition}{suffix}"),
                    None => partition.clone(),
                },
                mesh: mesh.clone(),
            })
            .collect(),
        ExportFormat::Native => vec![ExportObject {
            name: format!("{role_name}_output"),
            mesh: aggregate(outputs, suffix),
        }],
    }
}
