//! Advisory lock serialising access to the sensor across processes.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

/// Lock file shared by every reader on this host.
pub const DEFAULT_LOCK_FILE: &str = "/var/run/dht.lock";

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("cannot open lock file '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("lock file '{}' is held by another process", path.display())]
    Busy { path: PathBuf },

    #[error("cannot lock '{}': {source}", path.display())]
    Flock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Exclusive `flock` on a well-known path, released when dropped.
///
/// If the process dies instead, the kernel releases the lock with the
/// descriptor.
#[derive(Debug)]
pub struct LockFile {
    file: File,
    path: PathBuf,
}

impl LockFile {
    /// Takes the lock without waiting.
    ///
    /// A held lock more likely means a runaway reader than a short wait, so
    /// contention fails with [`LockError::Busy`].
    pub fn acquire(path: &Path) -> Result<Self, LockError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .mode(0o600)
            .open(path)
            .map_err(|source| LockError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        // SAFETY: the descriptor belongs to `file`, which outlives the call.
        let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
        if rc != 0 {
            let source = io::Error::last_os_error();
            let path = path.to_path_buf();
            return Err(match source.kind() {
                io::ErrorKind::WouldBlock => LockError::Busy { path },
                _ => LockError::Flock { path, source },
            });
        }

        Ok(LockFile {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        // SAFETY: the descriptor is still open; closing it follows right after.
        let rc = unsafe { libc::flock(self.file.as_raw_fd(), libc::LOCK_UN) };
        if rc != 0 {
            log::warn!(
                "unlocking {} failed: {}",
                self.path.display(),
                io::Error::last_os_error()
            );
        }
    }
}
