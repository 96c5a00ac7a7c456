//! Workspace reset and teardown

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

/// Hidden directory inside the workspace that holds the sealed record
pub const STATE_DIR: &str = ".bashquest";

const STATE_FILE: &str = "state.bin";

#[cfg(unix)]
const DIR_MODE: u32 = 0o777;

#[cfg(unix)]
const FILE_MODE: u32 = 0o666;

/// Location of the sealed progression record for a workspace
pub fn state_path(workspace: &Path) -> PathBuf {
    workspace.join(STATE_DIR).join(STATE_FILE)
}

/// Error types for workspace operations
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("Failed to restore permissions on {path}")]
    Repair {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove {path}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create workspace {path}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// How to treat failures while tearing a tree down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Teardown {
    /// First failure aborts
    Strict,
    /// Failures are logged and skipped
    BestEffort,
}

/// Creates, resets and destroys workspace directories
#[derive(Debug, Clone, Default)]
pub struct WorkspaceManager;

impl WorkspaceManager {
    pub fn new() -> Self {
        Self
    }

    /// Leave `path` as an empty, normally-permissioned directory
    ///
    /// Any failure is returned: a half-cleared workspace must never be handed
    /// to a challenge's setup.
    pub fn reset(&self, path: &Path) -> Result<(), WorkspaceError> {
        debug!(?path, "WorkspaceManager::reset: called");

        match fs::symlink_metadata(path) {
            Ok(meta) if meta.is_dir() => {
                self.repair(path, Teardown::Strict)?;
                fs::remove_dir_all(path).map_err(|source| WorkspaceError::Remove {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
            Ok(_) => {
                debug!(?path, "WorkspaceManager::reset: replacing non-directory");
                fs::remove_file(path).map_err(|source| WorkspaceError::Remove {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(?path, "WorkspaceManager::reset: nothing to clear");
            }
            Err(source) => {
                return Err(WorkspaceError::Repair {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }

        fs::create_dir_all(path).map_err(|source| WorkspaceError::Create {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Reset workspace {:?}", path);
        Ok(())
    }

    /// Best-effort removal of `path` and everything below it
    pub fn destroy(&self, path: &Path) {
        debug!(?path, "WorkspaceManager::destroy: called");

        match fs::symlink_metadata(path) {
            Ok(meta) if meta.is_dir() => {
                // BestEffort never returns Err
                let _ = self.repair(path, Teardown::BestEffort);
                if let Err(e) = fs::remove_dir_all(path) {
                    warn!("Failed to remove workspace {:?}: {}", path, e);
                    return;
                }
            }
            Ok(_) => {
                if let Err(e) = fs::remove_file(path) {
                    warn!("Failed to remove {:?}: {}", path, e);
                    return;
                }
            }
            Err(_) => {
                debug!(?path, "WorkspaceManager::destroy: nothing to remove");
                return;
            }
        }

        info!("Destroyed workspace {:?}", path);
    }

    /// Restore owner access on every entry below `root`
    ///
    /// Walks top-down with an explicit stack: a directory's mode is fixed
    /// before it is listed, so trees locked to `--x` are still traversable.
    /// Symlinks are never followed.
    fn repair(&self, root: &Path, teardown: Teardown) -> Result<usize, WorkspaceError> {
        debug!(?root, ?teardown, "WorkspaceManager::repair: called");
        let mut stack = vec![root.to_path_buf()];
        let mut repaired = 0usize;

        while let Some(path) = stack.pop() {
            let meta = match fs::symlink_metadata(&path) {
                Ok(meta) => meta,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(source) => {
                    self.tolerate(teardown, WorkspaceError::Repair { path, source })?;
                    continue;
                }
            };

            if meta.file_type().is_symlink() {
                continue;
            }

            if let Err(source) = restore_mode(&path, meta.is_dir()) {
                self.tolerate(
                    teardown,
                    WorkspaceError::Repair {
                        path: path.clone(),
                        source,
                    },
                )?;
            } else {
                repaired += 1;
            }

            if !meta.is_dir() {
                continue;
            }

            match fs::read_dir(&path) {
                Ok(entries) => {
                    for entry in entries {
                        match entry {
                            Ok(entry) => stack.push(entry.path()),
                            Err(source) => self.tolerate(
                                teardown,
                                WorkspaceError::Repair {
                                    path: path.clone(),
                                    source,
                                },
                            )?,
                        }
                    }
                }
                Err(source) => self.tolerate(teardown, WorkspaceError::Repair { path, source })?,
            }
        }

        debug!(repaired, "WorkspaceManager::repair: complete");
        Ok(repaired)
    }

    fn tolerate(&self, teardown: Teardown, err: WorkspaceError) -> Result<(), WorkspaceError> {
        match teardown {
            Teardown::Strict => Err(err),
            Teardown::BestEffort => {
                warn!("{}", err);
                Ok(())
            }
        }
    }
}

#[cfg(unix)]
fn restore_mode(path: &Path, is_dir: bool) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = if is_dir { DIR_MODE } else { FILE_MODE };
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn restore_mode(path: &Path, _is_dir: bool) -> std::io::Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_readonly(false);
    fs::set_permissions(path, perms)
}
