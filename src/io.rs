use glob::{glob, Pattern};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{LabelsError, Result};
use crate::types::{get_image_extensions_set, DatasetLabels};
use crate::utils::natural_cmp;

/// Check whether a path has one of the recognized image extensions
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| get_image_extensions_set().contains(&ext.to_lowercase()))
        .unwrap_or(false)
}

/// List the image files directly inside `dir`, in natural file-name order
pub fn list_frames(dir: &Path) -> Result<Vec<PathBuf>> {
    let listing_error = |reason: String| LabelsError::FrameListing {
        path: dir.to_path_buf(),
        reason,
    };

    let dir_str = dir
        .to_str()
        .ok_or_else(|| listing_error("path is not valid UTF-8".to_string()))?;
    let pattern = format!("{}/*", Pattern::escape(dir_str));

    let mut frames = Vec::new();
    for entry in glob(&pattern).map_err(|e| listing_error(e.to_string()))? {
        let path = entry.map_err(|e| listing_error(e.to_string()))?;
        if path.is_file() && is_image_file(&path) {
            frames.push(path);
        }
    }

    frames.sort_by(|a, b| natural_cmp(&file_name_lossy(a), &file_name_lossy(b)));
    Ok(frames)
}

fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Create the output directory (and parents) if needed. Existing content is kept.
pub fn ensure_output_directory(path: &Path) -> Result<PathBuf> {
    fs::create_dir_all(path).map_err(|source| LabelsError::WriteOutput {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(path.to_path_buf())
}

/// Write the labels as four-space indented JSON, replacing `path` atomically.
///
/// A new file gets the process umask mode; an existing file keeps its permissions.
pub fn write_dataset_labels(labels: &DatasetLabels, path: &Path) -> Result<()> {
    let write_error = |source: std::io::Error| LabelsError::WriteOutput {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = create_temp_file(dir).map_err(write_error)?;
    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(write_error)?;
    }

    write_json(labels, temp.as_file_mut(), path)?;
    temp.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}

// Temp files default to 0600; ask for 0666 so the umask decides like a plain create.
#[cfg(unix)]
fn create_temp_file(dir: &Path) -> std::io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;

    tempfile::Builder::new()
        .permissions(fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn create_temp_file(dir: &Path) -> std::io::Result<NamedTempFile> {
    NamedTempFile::new_in(dir)
}

fn write_json<W: Write>(labels: &DatasetLabels, writer: W, path: &Path) -> Result<()> {
    let write_error = |source: std::io::Error| LabelsError::WriteOutput {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = BufWriter::new(writer);
    let mut serializer =
        Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    labels.serialize(&mut serializer).map_err(|e| {
        if e.is_io() {
            write_error(e.into())
        } else {
            LabelsError::Serialize(e)
        }
    })?;
    writer.flush().map_err(write_error)
}
