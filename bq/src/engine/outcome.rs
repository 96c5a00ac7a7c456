//! Command outcomes

use std::path::PathBuf;

use crate::challenge::ChallengeView;

/// One row of `list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub number: usize,
    pub id: String,
    pub title: String,
    pub current: bool,
    pub passed: bool,
}

/// Result of one engine command
///
/// User-input failures are outcomes, not errors: the process is healthy and
/// the record is untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Progression (re)started at the first challenge
    Started { workspace: PathBuf, view: ChallengeView },

    /// `goto` entered the chosen challenge
    Jumped { view: ChallengeView },

    /// Correct answer; the next challenge is set up
    Advanced { passed: String, next: ChallengeView },

    /// Correct answer on the final challenge
    Completed { passed: String },

    /// Nothing left to do
    AllCompleted,

    WrongAnswer,

    /// The current challenge needs an explicit answer
    AnswerRequired { id: String },

    InvalidTarget { target: String },

    NoActiveWorkspace,

    Listing { entries: Vec<ListEntry> },

    Current { view: ChallengeView },

    /// Workspace and record removed; `None` if there was nothing to remove
    Cancelled { workspace: Option<PathBuf> },
}

impl Outcome {
    /// Whether the command should exit with status 0
    pub fn is_success(&self) -> bool {
        !matches!(
            self,
            Self::WrongAnswer | Self::AnswerRequired { .. } | Self::InvalidTarget { .. } | Self::NoActiveWorkspace
        )
    }
}
