//! Bashquest - filesystem puzzles for learning the shell
//!
//! A learner works through an ordered list of challenges. Each challenge
//! prepares a scratch workspace directory, tells the learner what to do and
//! later checks the result, either by inspecting the workspace or by
//! verifying a submitted flag.
//!
//! # Core Concepts
//!
//! - **One transition per command**: every invocation loads the record,
//!   performs at most one state change and persists before reporting
//! - **Sealed progress**: the record is encrypted and authenticated; a
//!   tampered file reads as "no record"
//! - **No plaintext flags**: only keyed digests of expected answers are stored
//! - **Two authoring shapes**: structured types and convention namespaces both
//!   resolve to [`challenge::Challenge`]
//!
//! # Modules
//!
//! - [`challenge`] - challenge contract, loader and builtin content
//! - [`engine`] - progression state machine
//! - [`record`] - progression record
//! - [`seal`] - answer digests
//! - [`render`] - description templating
//! - [`workspace`] - workspace reset and teardown
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod challenge;
pub mod cli;
pub mod config;
pub mod engine;
pub mod record;
pub mod render;
pub mod seal;
pub mod workspace;

// Re-export commonly used types
pub use challenge::{Catalog, Challenge, ChallengeView, LoadError, Registry, SetupContext};
pub use config::Config;
pub use engine::{Engine, EnginePaths, ListEntry, Outcome};
pub use record::{FieldValue, Record};
pub use seal::{FLAG_HASH, FlagSeal};
pub use workspace::{ActiveWorkspace, WorkspaceError, WorkspaceManager};
