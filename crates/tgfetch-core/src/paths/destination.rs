//! Destination directory preparation.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::error::PathError;

/// What to do when the destination directory does not exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingDirectory {
    /// Create it, parents included.
    #[default]
    Create,
    /// Fail with `PathError::Missing`.
    Fail,
}

/// Make sure downloads can be written to `dir`.
///
/// Returns the directory as given. A probe file is created and removed to
/// catch read-only mounts before any transfer starts.
pub fn prepare_destination(dir: &Path, missing: MissingDirectory) -> Result<PathBuf, PathError> {
    if dir.as_os_str().is_empty() {
        return Err(PathError::Empty);
    }

    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(PathError::NotADirectory(dir.to_path_buf())),
        Err(e) if e.kind() == ErrorKind::NotFound => match missing {
            MissingDirectory::Create => {
                fs::create_dir_all(dir).map_err(|source| PathError::Create {
                    path: dir.to_path_buf(),
                    source,
                })?;
                tracing::debug!(path = %dir.display(), "Created destination directory");
            }
            MissingDirectory::Fail => return Err(PathError::Missing(dir.to_path_buf())),
        },
        Err(source) => {
            return Err(PathError::NotWritable {
                path: dir.to_path_buf(),
                source,
            });
        }
    }

    probe_writable(dir)?;
    Ok(dir.to_path_buf())
}

fn probe_writable(dir: &Path) -> Result<(), PathError> {
    let probe = dir.join(".tgfetch_probe");
    OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&probe)
        .map_err(|source| PathError::NotWritable {
            path: dir.to_path_buf(),
            source,
        })?;
    // Best effort.
    let _ = fs::remove_file(&probe);
    Ok(())
}
