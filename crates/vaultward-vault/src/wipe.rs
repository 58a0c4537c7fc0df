// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable writes and best-effort scrubbing of plaintext artifacts.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use tracing::debug;
use vaultward_core::VaultwardError;

const ZERO_CHUNK: [u8; 8192] = [0u8; 8192];

/// Atomically replace `path` with `bytes`.
///
/// Writes to a temp file in the same directory, fsyncs it, and renames it
/// over the target, so readers never observe a partial file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), VaultwardError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| VaultwardError::io("create", parent, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .map_err(|e| VaultwardError::io("create temp file in", parent, e))?;
    tmp.write_all(bytes)
        .map_err(|e| VaultwardError::io("write", tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| VaultwardError::io("sync", tmp.path(), e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o600));
    }

    tmp.persist(path)
        .map_err(|e| VaultwardError::io("replace", path, e.error))?;
    Ok(())
}

/// Overwrite a plaintext file with zeros, flush it, and remove it.
///
/// Scrubbing is best effort (copy-on-write filesystems and SSD wear levelling
/// may keep old blocks); removal is not.
pub fn scrub_and_remove(path: &Path) -> Result<(), VaultwardError> {
    let len = fs::metadata(path)
        .map_err(|e| VaultwardError::io("stat", path, e))?
        .len();

    match OpenOptions::new().write(true).open(path) {
        Ok(mut file) => {
            let mut remaining = len;
            while remaining > 0 {
                let n = remaining.min(ZERO_CHUNK.len() as u64) as usize;
                if file.write_all(&ZERO_CHUNK[..n]).is_err() {
                    break;
                }
                remaining -= n as u64;
            }
            let _ = file.sync_all();
        }
        Err(e) => debug!(path = %path.display(), error = %e, "could not open file for scrubbing"),
    }

    fs::remove_file(path).map_err(|e| VaultwardError::io("remove", path, e))?;
    debug!(path = %path.display(), bytes = len, "plaintext scrubbed and removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_atomic_creates_parents_and_replaces() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("nested/catalog.enc");

        write_atomic(&target, b"first").unwrap();
        write_atomic(&target, b"second").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"second");
        // No temp files left behind.
        let leftovers = fs::read_dir(target.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn scrub_and_remove_deletes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("passwords.txt");
        fs::write(&path, "master\ndecoy\npanic\n").unwrap();

        scrub_and_remove(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn scrub_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = scrub_and_remove(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, VaultwardError::Io { .. }));
    }
}
