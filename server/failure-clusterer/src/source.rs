//! Log directory enumeration and reading.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::ClusterError;
use crate::types::{RawLog, SourceRef};

/// List regular files directly under `dir`, sorted by file name.
///
/// Sorting gives the clusterer the same input order on every run regardless
/// of how the filesystem returns entries.
pub fn list_logs(dir: &Path) -> Result<Vec<PathBuf>, ClusterError> {
  let enumerate_err = |source: io::Error| ClusterError::Enumerate {
    path: dir.to_path_buf(),
    source,
  };

  let mut files = Vec::new();
  for entry in fs::read_dir(dir).map_err(enumerate_err)? {
    let entry = entry.map_err(enumerate_err)?;
    let file_type = entry.file_type().map_err(enumerate_err)?;
    if file_type.is_file() {
      files.push(entry.path());
    }
  }
  files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
  Ok(files)
}

/// Read one log file as UTF-8 text.
pub fn read_log(path: &Path) -> Result<RawLog, ClusterError> {
  let read_err = |source: io::Error| ClusterError::Read {
    path: path.to_path_buf(),
    source,
  };
  let bytes = fs::read(path).map_err(read_err)?;
  let text = String::from_utf8(bytes)
    .map_err(|e| read_err(io::Error::new(io::ErrorKind::InvalidData, e)))?;
  Ok(RawLog {
    source: SourceRef::from_path(path),
    text,
  })
}

/// Enumerate `dir` eagerly and read its logs lazily, in sorted order.
///
/// Fails only when the directory itself cannot be listed or holds no files;
/// individual unreadable logs surface as `Err` items.
pub fn read_dir_logs(
  dir: &Path,
) -> Result<impl Iterator<Item = Result<RawLog, ClusterError>>, ClusterError> {
  let files = list_logs(dir)?;
  if files.is_empty() {
    return Err(ClusterError::EmptyInput(dir.to_path_buf()));
  }
  Ok(files.into_iter().map(|p| read_log(&p)))
}
