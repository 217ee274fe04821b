//! Loading and saving notebook files.
//!
//! Saves write a uniquely named temp file next to the target and rename it
//! over the target, so the original is either fully replaced or left as it
//! was. A symlinked path is resolved first and the file it points to is
//! replaced; the link itself stays.

use super::{Notebook, NotebookError};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::Builder;
use tracing::{debug, info};

pub fn load(path: impl AsRef<Path>) -> Result<Notebook, NotebookError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| NotebookError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let notebook = Notebook::from_json(&text)?;
    info!(path = %path.display(), cells = notebook.cells.len(), "loaded notebook");
    Ok(notebook)
}

pub fn save(path: impl AsRef<Path>, notebook: &Notebook) -> Result<(), NotebookError> {
    let path = path.as_ref();
    let text = notebook.to_json()?;
    let io_error = |source| NotebookError::Io {
        path: path.to_path_buf(),
        source,
    };

    let target = resolve_target(path).map_err(io_error)?;
    write_replacing(&target, text.as_bytes()).map_err(io_error)?;

    info!(path = %target.display(), bytes = text.len(), "saved notebook");
    Ok(())
}

/// Follows symlinks to the file that should be replaced. A path that does
/// not exist yet is used as given.
fn resolve_target(path: &Path) -> io::Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(target) => Ok(target),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(err) => Err(err),
    }
}

fn write_replacing(target: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // Dropped (and deleted) on any early return.
    let mut temp = Builder::new()
        .prefix(".nb-delim-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    temp.write_all(bytes)?;
    // Rename gives the file a fresh inode; carry the original mode over.
    if let Ok(metadata) = fs::metadata(target) {
        temp.as_file().set_permissions(metadata.permissions())?;
    }
    let temp_path = temp.path().to_path_buf();
    temp.persist(target).map_err(|err| err.error)?;
    debug!(from = %temp_path.display(), to = %target.display(), "renamed temp file");
    Ok(())
}
