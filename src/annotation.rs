//! @ai:module:intent Shape stored diagnostics into UI-ready annotation payloads
//! @ai:module:layer application
//! @ai:module:public_api AnnotationPayload, FileMetadata, shape_annotations, collect_file_metadata
//! @ai:module:depends_on store, paths, line_count, severity
//! @ai:module:stateless true

use crate::diagnostic::Diagnostic;
use crate::error::Result;
use crate::paths::{display_relative, resolve};
use crate::severity::{Channel, Severity};
use crate::store::DiagnosticStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Column reported when the compiler did not print one.
pub const DEFAULT_COLUMN: u32 = 1;

/// @ai:intent Per-file facts needed to shape annotations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileMetadata {
    pub name: String,
    pub path: String,
    pub line_count: usize,
}

/// @ai:intent Everything the annotation publisher needs for one diagnostic
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnnotationPayload {
    pub file_path: String,
    pub line: u32,
    pub column: u32,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub channel: Channel,
}

impl FileMetadata {
    /// @ai:intent Compute metadata for one stored file key
    /// @ai:effects fs:read via count
    fn load<F>(file: &str, base: &Path, count: &mut F) -> Result<Self>
    where
        F: FnMut(&Path) -> Result<usize>,
    {
        let on_disk = PathBuf::from(resolve(file, base));
        let name = Path::new(file)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.to_string());

        Ok(Self {
            name,
            path: display_relative(file, base),
            line_count: count(&on_disk)?,
        })
    }

    /// @ai:intent Clamp a reported line into the file's bounds
    /// @ai:example line_count=7, line=10 -> 7
    /// @ai:effects pure
    pub fn clamp_line(&self, line: u32) -> u32 {
        let last = u32::try_from(self.line_count).unwrap_or(u32::MAX).max(1);
        line.min(last)
    }
}

/// @ai:intent Compute metadata once per distinct file, keyed by the store's file key
/// @ai:effects fs:read via count
pub fn collect_file_metadata<F>(
    store: &DiagnosticStore,
    base: &Path,
    mut count: F,
) -> Result<HashMap<String, FileMetadata>>
where
    F: FnMut(&Path) -> Result<usize>,
{
    store
        .files()
        .map(|file| -> Result<(String, FileMetadata)> {
            Ok((file.to_string(), FileMetadata::load(file, base, &mut count)?))
        })
        .collect()
}

/// @ai:intent Shape every stored diagnostic, grouped by file in first-seen order
/// @ai:pre the producing phase has ended
/// @ai:post one payload per stored diagnostic
/// @ai:effects fs:read via count
pub fn shape_annotations<F>(
    store: &DiagnosticStore,
    base: &Path,
    count: F,
) -> Result<Vec<AnnotationPayload>>
where
    F: FnMut(&Path) -> Result<usize>,
{
    let metadata = collect_file_metadata(store, base, count)?;
    let mut payloads = Vec::with_capacity(store.len());

    for file in store.files() {
        let Some(meta) = metadata.get(file) else {
            continue;
        };
        payloads.extend(store.by_file(file).map(|d| shape(d, meta)));
    }

    tracing::debug!(files = metadata.len(), annotations = payloads.len(), "shaped annotations");
    Ok(payloads)
}

/// @ai:intent Shape a single diagnostic against its file metadata
/// @ai:effects pure
pub fn shape(diagnostic: &Diagnostic, meta: &FileMetadata) -> AnnotationPayload {
    let line = meta.clamp_line(diagnostic.line);
    let column = diagnostic
        .column
        .filter(|c| *c > 0)
        .unwrap_or(DEFAULT_COLUMN);

    let mut title = match diagnostic.column {
        Some(c) if c > 0 => format!("{}({},{})", meta.name, line, c),
        _ => format!("{}({})", meta.name, line),
    };
    title.push_str(": ");
    title.push_str(diagnostic.severity.label());
    if diagnostic.user_defined {
        title.push_str(" (user defined)");
    }

    AnnotationPayload {
        file_path: meta.path.clone(),
        line,
        column,
        title,
        message: diagnostic.message.clone(),
        severity: diagnostic.severity,
        channel: diagnostic.severity.channel(),
    }
}
