//! Challenge contract
//!
//! Every challenge, however it was authored, reaches the engine as a
//! `Box<dyn Challenge>`. Two authoring shapes exist:
//!
//! - structured: a type implementing [`Challenge`] directly
//! - convention: a [`Namespace`] of `title_<id>`, `description_<id>`,
//!   `setup_<id>`, `check_<id>` and optional `requires_flag_<id>` bindings,
//!   adapted by [`ConventionChallenge`]
//!
//! The [`Registry`] resolves a manifest of ids against a [`Catalog`] of both
//! shapes once at startup; nothing downstream branches on the shape.

pub mod builtin;
mod convention;
mod registry;

pub use convention::{Binding, CheckFn, ConventionChallenge, Namespace, SetupFn};
pub use registry::{Catalog, ChallengeSource, LoadError, Registry};

use rand::rngs::StdRng;

use crate::record::Record;
use crate::render;
use crate::seal::FlagSeal;

/// Collaborators handed to `setup`
///
/// Threaded explicitly so setup stays deterministic for a given rng.
pub struct SetupContext<'a> {
    pub seal: &'a FlagSeal,
    pub rng: &'a mut StdRng,
}

impl<'a> SetupContext<'a> {
    pub fn new(seal: &'a FlagSeal, rng: &'a mut StdRng) -> Self {
        Self { seal, rng }
    }
}

/// One puzzle
pub trait Challenge {
    /// Stable identifier, unique within a registry
    fn id(&self) -> &str;

    fn title(&self) -> &str;

    /// Description templates; `{field}` placeholders are filled from the record
    fn description(&self) -> Vec<String>;

    /// Whether `submit` needs an explicit answer
    fn requires_flag(&self) -> bool {
        true
    }

    /// Populate the (already empty) workspace and the record's scratch fields
    fn setup(&self, record: Record, ctx: &mut SetupContext<'_>) -> eyre::Result<Record>;

    /// Decide whether the challenge is solved
    fn evaluate(&self, record: &Record, answer: Option<&str>, seal: &FlagSeal) -> bool;
}

/// A challenge rendered against the live record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeView {
    /// 1-based position in the registry
    pub number: usize,
    pub id: String,
    pub title: String,
    pub lines: Vec<String>,
}

impl ChallengeView {
    pub fn render(index: usize, challenge: &dyn Challenge, record: &Record) -> Self {
        Self {
            number: index + 1,
            id: challenge.id().to_string(),
            title: challenge.title().to_string(),
            lines: render::render(&challenge.description(), record),
        }
    }
}
