//! Pointer to the workspace chosen by the last `start`

use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use tracing::{debug, warn};

/// Plain-text file remembering the active workspace path
#[derive(Debug, Clone)]
pub struct ActiveWorkspace {
    pointer: PathBuf,
}

impl ActiveWorkspace {
    pub fn new(pointer: impl Into<PathBuf>) -> Self {
        Self { pointer: pointer.into() }
    }

    /// The remembered workspace, if any
    pub fn get(&self) -> Option<PathBuf> {
        let content = fs::read_to_string(&self.pointer).ok()?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            debug!(pointer = ?self.pointer, "ActiveWorkspace::get: empty pointer");
            return None;
        }
        Some(PathBuf::from(trimmed))
    }

    pub fn set(&self, workspace: &Path) -> Result<()> {
        debug!(?workspace, "ActiveWorkspace::set: called");
        if let Some(parent) = self.pointer.parent() {
            fs::create_dir_all(parent).context("Failed to create state directory")?;
        }
        fs::write(&self.pointer, format!("{}\n", workspace.display()))
            .with_context(|| format!("Failed to write {}", self.pointer.display()))
    }

    /// Forget the active workspace (best-effort)
    pub fn clear(&self) {
        debug!(pointer = ?self.pointer, "ActiveWorkspace::clear: called");
        if let Err(e) = fs::remove_file(&self.pointer)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!("Failed to remove {:?}: {}", self.pointer, e);
        }
    }
}
