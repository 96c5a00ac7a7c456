//! Challenge loader
//!
//! Resolves the configured manifest of ids, in order, into runtime challenges.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use super::convention::{ConventionChallenge, Namespace};
use super::{Challenge, builtin};

/// Error types for challenge loading; all of them are fatal at startup
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("Challenge manifest is empty")]
    EmptyManifest,

    #[error("Unknown challenge: {0}")]
    UnknownChallenge(String),

    #[error("Duplicate challenge id: {0}")]
    DuplicateId(String),

    #[error("Challenge {id} is missing binding {binding}")]
    MissingBinding { id: String, binding: String },

    #[error("Challenge {id}: {binding} must be {expected}, found {found}")]
    InvalidBinding {
        id: String,
        binding: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Challenge {id}: {reason}")]
    MissingField { id: String, reason: String },
}

/// How a catalog entry is authored
#[derive(Clone, Copy)]
pub enum ChallengeSource {
    Structured(fn() -> Box<dyn Challenge>),
    Convention(fn() -> Namespace),
}

/// Every challenge the binary knows about, keyed by id
#[derive(Clone, Default)]
pub struct Catalog {
    sources: HashMap<String, ChallengeSource>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog of the builtin challenges
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        builtin::register(&mut catalog);
        catalog
    }

    pub fn register(&mut self, id: impl Into<String>, source: ChallengeSource) {
        self.sources.insert(id.into(), source);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    /// Build and check the challenge registered as `id`
    pub fn instantiate(&self, id: &str) -> Result<Box<dyn Challenge>, LoadError> {
        match self.sources.get(id) {
            Some(ChallengeSource::Structured(make)) => {
                let challenge = make();
                validate(id, challenge.as_ref())?;
                Ok(challenge)
            }
            Some(ChallengeSource::Convention(namespace)) => {
                Ok(Box::new(ConventionChallenge::resolve(id, &namespace())?))
            }
            None => Err(LoadError::UnknownChallenge(id.to_string())),
        }
    }
}

fn validate(id: &str, challenge: &dyn Challenge) -> Result<(), LoadError> {
    let missing = |reason: &str| LoadError::MissingField {
        id: id.to_string(),
        reason: reason.to_string(),
    };

    if challenge.id() != id {
        return Err(missing(&format!("declares id {}", challenge.id())));
    }
    if challenge.title().trim().is_empty() {
        return Err(missing("empty title"));
    }
    if challenge.description().is_empty() {
        return Err(missing("empty description"));
    }
    Ok(())
}

/// The ordered challenges of one run
pub struct Registry {
    challenges: Vec<Box<dyn Challenge>>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.challenges.iter().map(|c| c.id())).finish()
    }
}

impl Registry {
    /// Resolve `ids` in order; the position of an id is its challenge index
    pub fn load<S: AsRef<str>>(ids: &[S], catalog: &Catalog) -> Result<Self, LoadError> {
        debug!(count = ids.len(), "Registry::load: called");
        if ids.is_empty() {
            return Err(LoadError::EmptyManifest);
        }

        let mut seen = HashSet::new();
        let mut challenges = Vec::with_capacity(ids.len());
        for id in ids {
            let id = id.as_ref().trim();
            if !seen.insert(id.to_string()) {
                return Err(LoadError::DuplicateId(id.to_string()));
            }
            challenges.push(catalog.instantiate(id)?);
        }

        info!("Loaded {} challenges", challenges.len());
        Ok(Self { challenges })
    }

    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&dyn Challenge> {
        self.challenges.get(index).map(|c| c.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Challenge> {
        self.challenges.iter().map(|c| c.as_ref())
    }

    /// Index for a `goto` target: a 1-based number, else an exact id
    pub fn resolve(&self, target: &str) -> Option<usize> {
        let target = target.trim();
        if !target.is_empty() && target.bytes().all(|b| b.is_ascii_digit()) {
            return target
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .filter(|&index| index < self.len());
        }
        self.challenges.iter().position(|c| c.id() == target)
    }
}
