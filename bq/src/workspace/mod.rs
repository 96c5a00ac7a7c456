//! Workspace lifecycle
//!
//! The workspace is the directory the learner manipulates. Challenges may
//! lock parts of it down (read-only files, non-listable directories), so
//! every teardown repairs permissions before deleting anything.

mod active;
mod manager;

pub use active::ActiveWorkspace;
pub use manager::{STATE_DIR, WorkspaceError, WorkspaceManager, state_path};
