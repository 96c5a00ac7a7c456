//! Convention-based challenges
//!
//! A [`Namespace`] is a loose table of named bindings. A challenge `foo` is
//! defined by `title_foo`, `description_foo`, `setup_foo`, `check_foo` and,
//! optionally, `requires_flag_foo`. [`ConventionChallenge::resolve`] checks
//! the bindings once and adapts them to [`Challenge`].

use std::collections::BTreeMap;

use tracing::debug;

use super::registry::LoadError;
use super::{Challenge, SetupContext};
use crate::record::Record;
use crate::seal::FlagSeal;

/// Setup binding
pub type SetupFn = fn(Record, &mut SetupContext<'_>) -> eyre::Result<Record>;

/// Check binding
pub type CheckFn = fn(&Record, Option<&str>, &FlagSeal) -> bool;

/// A value bound in a namespace
#[derive(Clone)]
pub enum Binding {
    Text(String),
    Lines(Vec<String>),
    Flag(bool),
    Setup(SetupFn),
    Check(CheckFn),
}

impl Binding {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Lines(_) => "lines",
            Self::Flag(_) => "flag",
            Self::Setup(_) => "setup function",
            Self::Check(_) => "check function",
        }
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Self::Lines(l) => f.debug_tuple("Lines").field(l).finish(),
            Self::Flag(b) => f.debug_tuple("Flag").field(b).finish(),
            Self::Setup(_) => f.write_str("Setup(..)"),
            Self::Check(_) => f.write_str("Check(..)"),
        }
    }
}

/// Named bindings exported by one content module
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    name: String,
    bindings: BTreeMap<String, Binding>,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bindings: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&Binding> {
        self.bindings.get(key)
    }

    pub fn bind(mut self, key: impl Into<String>, binding: Binding) -> Self {
        self.bindings.insert(key.into(), binding);
        self
    }

    pub fn text(self, key: impl Into<String>, value: &str) -> Self {
        self.bind(key, Binding::Text(value.to_string()))
    }

    pub fn lines(self, key: impl Into<String>, lines: &[&str]) -> Self {
        self.bind(key, Binding::Lines(lines.iter().map(|l| l.to_string()).collect()))
    }

    pub fn flag(self, key: impl Into<String>, value: bool) -> Self {
        self.bind(key, Binding::Flag(value))
    }

    pub fn setup(self, key: impl Into<String>, f: SetupFn) -> Self {
        self.bind(key, Binding::Setup(f))
    }

    pub fn check(self, key: impl Into<String>, f: CheckFn) -> Self {
        self.bind(key, Binding::Check(f))
    }
}

/// A challenge assembled from namespace bindings
#[derive(Debug, Clone)]
pub struct ConventionChallenge {
    id: String,
    title: String,
    description: Vec<String>,
    requires_flag: bool,
    setup: SetupFn,
    check: CheckFn,
}

impl ConventionChallenge {
    /// Look up and type-check the bindings for `id`
    pub fn resolve(id: &str, namespace: &Namespace) -> Result<Self, LoadError> {
        debug!(%id, namespace = namespace.name(), "ConventionChallenge::resolve: called");

        let title = match required(namespace, id, "title")? {
            Binding::Text(title) => title.clone(),
            other => return Err(invalid(id, "title", "text", other)),
        };

        let description = match required(namespace, id, "description")? {
            Binding::Lines(lines) => lines.clone(),
            other => return Err(invalid(id, "description", "lines", other)),
        };

        let setup = match required(namespace, id, "setup")? {
            Binding::Setup(f) => *f,
            other => return Err(invalid(id, "setup", "setup function", other)),
        };

        let check = match required(namespace, id, "check")? {
            Binding::Check(f) => *f,
            other => return Err(invalid(id, "check", "check function", other)),
        };

        let requires_flag = match namespace.get(&binding_name("requires_flag", id)) {
            None => true,
            Some(Binding::Flag(value)) => *value,
            Some(other) => return Err(invalid(id, "requires_flag", "flag", other)),
        };

        Ok(Self {
            id: id.to_string(),
            title,
            description,
            requires_flag,
            setup,
            check,
        })
    }
}

impl Challenge for ConventionChallenge {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> Vec<String> {
        self.description.clone()
    }

    fn requires_flag(&self) -> bool {
        self.requires_flag
    }

    fn setup(&self, record: Record, ctx: &mut SetupContext<'_>) -> eyre::Result<Record> {
        (self.setup)(record, ctx)
    }

    fn evaluate(&self, record: &Record, answer: Option<&str>, seal: &FlagSeal) -> bool {
        (self.check)(record, answer, seal)
    }
}

fn binding_name(prefix: &str, id: &str) -> String {
    format!("{}_{}", prefix, id)
}

fn required<'n>(namespace: &'n Namespace, id: &str, prefix: &str) -> Result<&'n Binding, LoadError> {
    let name = binding_name(prefix, id);
    namespace.get(&name).ok_or_else(|| LoadError::MissingBinding {
        id: id.to_string(),
        binding: name,
    })
}

fn invalid(id: &str, prefix: &str, expected: &'static str, found: &Binding) -> LoadError {
    LoadError::InvalidBinding {
        id: id.to_string(),
        binding: binding_name(prefix, id),
        expected,
        found: found.kind(),
    }
}
