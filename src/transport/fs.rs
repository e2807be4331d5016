use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::constants::persistence::TEMP_EXTENSION;
use crate::errors::OrderError;

/// Read a whole file, reporting IO failures against `source_id`.
///
/// A missing file is returned as `Ok(None)` so callers can tell "absent" from
/// "present but unreadable". Bytes are not decoded; callers decide what
/// invalid content means for them.
pub fn read_bytes_if_exists(
    source_id: &str,
    path: &Path,
) -> Result<Option<Vec<u8>>, OrderError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(OrderError::SourceUnavailable {
            source_id: source_id.to_string(),
            reason: format!("failed reading {}: {err}", path.display()),
        }),
    }
}

/// Read a whole UTF-8 file that must exist.
pub fn read_text(source_id: &str, path: &Path) -> Result<String, OrderError> {
    let bytes =
        read_bytes_if_exists(source_id, path)?.ok_or_else(|| OrderError::SourceUnavailable {
            source_id: source_id.to_string(),
            reason: format!("{} not found", path.display()),
        })?;
    String::from_utf8(bytes).map_err(|err| OrderError::SourceUnavailable {
        source_id: source_id.to_string(),
        reason: format!("{} is not valid UTF-8: {err}", path.display()),
    })
}

/// Replace `path` with `bytes` through a sibling temp file and a rename.
pub fn write_atomic(source_id: &str, path: &Path, bytes: &[u8]) -> Result<(), OrderError> {
    ensure_parent_dir(path)?;
    let tmp_path = path.with_extension(TEMP_EXTENSION);
    fs::write(&tmp_path, bytes).map_err(|err| OrderError::SourceUnavailable {
        source_id: source_id.to_string(),
        reason: format!("failed writing temp file {}: {err}", tmp_path.display()),
    })?;
    fs::rename(&tmp_path, path).map_err(|err| OrderError::SourceUnavailable {
        source_id: source_id.to_string(),
        reason: format!("failed replacing {}: {err}", path.display()),
    })
}

/// Resolve a directory to `<dir>/<file_name>`; any other path is kept as-is.
pub fn coerce_file_path(path: PathBuf, file_name: &str) -> PathBuf {
    if path.is_dir() {
        return path.join(file_name);
    }
    path
}

fn ensure_parent_dir(path: &Path) -> Result<(), OrderError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
