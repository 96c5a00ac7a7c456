//! Engine - runs learner commands against the registry, workspace and store

use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result, eyre};
use queststore::{SealedStore, Secret};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use super::{ListEntry, Outcome};
use crate::challenge::{ChallengeView, Registry, SetupContext};
use crate::record::Record;
use crate::seal::FlagSeal;
use crate::workspace::{ActiveWorkspace, WorkspaceManager, state_path};

/// Filesystem locations the engine works with
#[derive(Debug, Clone)]
pub struct EnginePaths {
    /// Workspace used when neither an override nor a pointer names one
    pub default_workspace: PathBuf,

    /// Active-workspace pointer file
    pub pointer: PathBuf,
}

/// Progression state machine
pub struct Engine {
    registry: Registry,
    store: SealedStore,
    seal: FlagSeal,
    workspaces: WorkspaceManager,
    active: ActiveWorkspace,
    default_workspace: PathBuf,
    override_workspace: Option<PathBuf>,
    rng: StdRng,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("registry", &self.registry)
            .field("default_workspace", &self.default_workspace)
            .field("override_workspace", &self.override_workspace)
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new(registry: Registry, secret: &Secret, paths: EnginePaths) -> Self {
        Self {
            registry,
            store: SealedStore::new(secret),
            seal: FlagSeal::new(secret),
            workspaces: WorkspaceManager::new(),
            active: ActiveWorkspace::new(paths.pointer),
            default_workspace: paths.default_workspace,
            override_workspace: None,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Use a fixed rng (deterministic setup)
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Pin the workspace for this invocation, ignoring the pointer
    pub fn with_workspace(mut self, workspace: impl Into<PathBuf>) -> Self {
        self.override_workspace = Some(workspace.into());
        self
    }

    /// The persisted record of the active workspace, if any
    pub fn record(&self) -> Option<Record> {
        let workspace = self.locate().ok()?;
        self.load_at(&workspace)
    }

    /// Reset the workspace and enter the first challenge
    ///
    /// An existing record for the same workspace keeps its passed set.
    pub fn start(&mut self, path: Option<&Path>) -> Result<Outcome> {
        debug!(?path, "Engine::start: called");
        let chosen = path
            .map(Path::to_path_buf)
            .or_else(|| self.override_workspace.clone())
            .unwrap_or_else(|| self.default_workspace.clone());
        let workspace = absolute(&chosen)?;

        let record = self.load_at(&workspace).unwrap_or_else(|| {
            debug!(?workspace, "Engine::start: fresh record");
            Record::new(&workspace)
        });

        let (record, view) = self.enter(record, 0, &workspace)?;
        info!("Started progression in {}", record.workspace.display());
        Ok(Outcome::Started {
            workspace: record.workspace,
            view,
        })
    }

    /// Jump to a challenge by 1-based number or id
    pub fn goto(&mut self, target: &str) -> Result<Outcome> {
        debug!(%target, "Engine::goto: called");
        let Some(index) = self.registry.resolve(target) else {
            debug!(%target, "Engine::goto: unresolved target");
            return Ok(Outcome::InvalidTarget {
                target: target.to_string(),
            });
        };

        let workspace = self.locate()?;
        let record = self.load_at(&workspace).unwrap_or_else(|| Record::new(&workspace));

        let (record, view) = self.enter(record, index, &workspace)?;
        info!("Jumped to challenge {} ({})", view.number, view.id);
        debug!(index = record.challenge_index, "Engine::goto: entered");
        Ok(Outcome::Jumped { view })
    }

    /// Check the current challenge, advancing on success
    ///
    /// Failures leave the persisted record untouched.
    pub fn submit(&mut self, answer: Option<&str>) -> Result<Outcome> {
        debug!(answered = answer.is_some(), "Engine::submit: called");
        let workspace = self.locate()?;
        let Some(mut record) = self.load_at(&workspace) else {
            return Ok(Outcome::NoActiveWorkspace);
        };

        let index = record.challenge_index;
        let Some(challenge) = self.registry.get(index) else {
            return Ok(Outcome::AllCompleted);
        };
        let id = challenge.id().to_string();

        let answer = answer.filter(|a| !a.trim().is_empty());
        if challenge.requires_flag() && answer.is_none() {
            return Ok(Outcome::AnswerRequired { id });
        }

        if !challenge.evaluate(&record, answer, &self.seal) {
            debug!(%id, "Engine::submit: wrong answer");
            return Ok(Outcome::WrongAnswer);
        }

        info!("Challenge {} passed", id);
        record.mark_passed(&id);
        record.challenge_index = index + 1;
        self.persist(&record)?;

        if record.challenge_index < self.registry.len() {
            let workspace = record.workspace.clone();
            let next = record.challenge_index;
            let (_, view) = self.enter(record, next, &workspace)?;
            Ok(Outcome::Advanced { passed: id, next: view })
        } else {
            info!("All challenges completed");
            Ok(Outcome::Completed { passed: id })
        }
    }

    /// Every challenge with current and passed markers
    pub fn list(&self) -> Result<Outcome> {
        debug!("Engine::list: called");
        let workspace = self.locate()?;
        let Some(record) = self.load_at(&workspace) else {
            return Ok(Outcome::NoActiveWorkspace);
        };

        let entries = self
            .registry
            .iter()
            .enumerate()
            .map(|(i, challenge)| ListEntry {
                number: i + 1,
                id: challenge.id().to_string(),
                title: challenge.title().to_string(),
                current: i == record.challenge_index,
                passed: record.has_passed(challenge.id()),
            })
            .collect();
        Ok(Outcome::Listing { entries })
    }

    /// The current challenge rendered against the live record
    pub fn current(&self) -> Result<Outcome> {
        debug!("Engine::current: called");
        let workspace = self.locate()?;
        let Some(record) = self.load_at(&workspace) else {
            return Ok(Outcome::NoActiveWorkspace);
        };

        match self.registry.get(record.challenge_index) {
            Some(challenge) => Ok(Outcome::Current {
                view: ChallengeView::render(record.challenge_index, challenge, &record),
            }),
            None => Ok(Outcome::AllCompleted),
        }
    }

    /// Remove the workspace and its record, and forget the pointer
    pub fn done(&mut self) -> Result<Outcome> {
        debug!("Engine::done: called");
        let workspace = self.locate()?;
        let owned = state_path(&workspace).exists();
        self.active.clear();

        if !owned {
            debug!(?workspace, "Engine::done: no quest workspace to remove");
            return Ok(Outcome::Cancelled { workspace: None });
        }

        self.workspaces.destroy(&workspace);
        info!("Quest cancelled, removed {}", workspace.display());
        Ok(Outcome::Cancelled {
            workspace: Some(workspace),
        })
    }

    /// Override, then pointer, then default
    fn locate(&self) -> Result<PathBuf> {
        let chosen = match &self.override_workspace {
            Some(path) => path.clone(),
            None => self.active.get().unwrap_or_else(|| self.default_workspace.clone()),
        };
        absolute(&chosen)
    }

    /// Load the record stored in `workspace`, rejecting foreign or stale ones
    fn load_at(&self, workspace: &Path) -> Option<Record> {
        let canonical = fs::canonicalize(workspace).ok()?;
        let record: Record = self.store.load(&state_path(&canonical))?;

        if record.workspace != canonical {
            warn!(
                "Ignoring record for {} found in {}",
                record.workspace.display(),
                canonical.display()
            );
            return None;
        }
        if record.challenge_index > self.registry.len() {
            warn!(
                "Ignoring record at index {} beyond {} challenges",
                record.challenge_index,
                self.registry.len()
            );
            return None;
        }
        Some(record)
    }

    /// Reset the workspace, set up challenge `index`, persist, update pointer
    fn enter(&mut self, mut record: Record, index: usize, workspace: &Path) -> Result<(Record, ChallengeView)> {
        debug!(index, ?workspace, "Engine::enter: called");
        let challenge = self
            .registry
            .get(index)
            .ok_or_else(|| eyre!("No challenge at index {}", index))?;

        self.workspaces
            .reset(workspace)
            .with_context(|| format!("Failed to reset workspace {}", workspace.display()))?;
        let canonical = fs::canonicalize(workspace)
            .with_context(|| format!("Failed to resolve workspace {}", workspace.display()))?;

        // reset wiped the sealed record along with the workspace
        let mut previous = record.clone();
        previous.workspace = canonical.clone();

        record.workspace = canonical;
        record.challenge_index = index;
        record.clear_fields();

        let mut ctx = SetupContext::new(&self.seal, &mut self.rng);
        let record = match challenge.setup(record, &mut ctx) {
            Ok(record) => record,
            Err(e) => {
                if let Err(save) = self.persist(&previous) {
                    warn!("Failed to restore progress after setup error: {:#}", save);
                }
                return Err(e).with_context(|| format!("Failed to set up challenge {}", challenge.id()));
            }
        };
        let view = ChallengeView::render(index, challenge, &record);

        self.persist(&record)?;
        self.active.set(&record.workspace)?;
        Ok((record, view))
    }

    fn persist(&self, record: &Record) -> Result<()> {
        self.store
            .save(record, &state_path(&record.workspace))
            .context("Failed to save progress")
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("Failed to resolve path {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::{Catalog, Challenge, ChallengeSource};
    use crate::workspace::WorkspaceError;
    use tempfile::TempDir;

    /// Setup always fails
    struct Broken;

    impl Challenge for Broken {
        fn id(&self) -> &str {
            "broken"
        }

        fn title(&self) -> &str {
            "Broken"
        }

        fn description(&self) -> Vec<String> {
            vec!["Never ready.".to_string()]
        }

        fn requires_flag(&self) -> bool {
            false
        }

        fn setup(&self, _record: Record, _ctx: &mut SetupContext<'_>) -> Result<Record> {
            Err(eyre!("No space left on device"))
        }

        fn evaluate(&self, _record: &Record, _answer: Option<&str>, _seal: &FlagSeal) -> bool {
            false
        }
    }

    fn engine(temp: &TempDir) -> Engine {
        let registry = Registry::load(&["cat_file", "list_dir", "mkdir_single_directory"], &Catalog::builtin()).unwrap();
        let paths = EnginePaths {
            default_workspace: temp.path().join("default"),
            pointer: temp.path().join("state").join("active"),
        };
        Engine::new(registry, &Secret::new("engine-test"), paths).with_rng(StdRng::seed_from_u64(7))
    }

    #[test]
    fn test_start_uses_default_workspace() {
        let temp = TempDir::new().unwrap();
        let mut engine = engine(&temp);

        let outcome = engine.start(None).unwrap();
        let expected = temp.path().join("default").canonicalize().unwrap();
        assert!(matches!(outcome, Outcome::Started { ref workspace, .. } if *workspace == expected));
        assert!(state_path(&expected).is_file());
    }

    #[test]
    fn test_start_records_pointer() {
        let temp = TempDir::new().unwrap();
        let mut engine = engine(&temp);
        let chosen = temp.path().join("elsewhere");

        engine.start(Some(chosen.as_path())).unwrap();
        let pointed = engine.active.get().unwrap();
        assert_eq!(pointed, chosen.canonicalize().unwrap());

        // later commands follow the pointer, not the default
        assert!(matches!(engine.current().unwrap(), Outcome::Current { .. }));
        assert!(!temp.path().join("default").exists());
    }

    #[test]
    fn test_override_beats_pointer() {
        let temp = TempDir::new().unwrap();
        let mut engine = engine(&temp);
        engine.start(Some(temp.path().join("first").as_path())).unwrap();

        let engine = engine.with_workspace(temp.path().join("second"));
        assert_eq!(engine.current().unwrap(), Outcome::NoActiveWorkspace);
    }

    #[test]
    fn test_record_moved_to_other_workspace_is_ignored() {
        let temp = TempDir::new().unwrap();
        let mut engine = engine(&temp);
        engine.start(None).unwrap();

        let source = temp.path().join("default");
        let copy = temp.path().join("copy");
        fs::create_dir_all(copy.join(crate::workspace::STATE_DIR)).unwrap();
        fs::copy(state_path(&source), state_path(&copy)).unwrap();

        let engine = engine.with_workspace(&copy);
        assert_eq!(engine.current().unwrap(), Outcome::NoActiveWorkspace);
    }

    #[test]
    fn test_start_keeps_passed() {
        let temp = TempDir::new().unwrap();
        let mut engine = engine(&temp);
        engine.goto("mkdir_single_directory").unwrap();

        let record = engine.record().unwrap();
        fs::create_dir(record.path(record.text("dir_name").unwrap())).unwrap();
        assert!(matches!(engine.submit(None).unwrap(), Outcome::Completed { .. }));

        engine.start(None).unwrap();
        let record = engine.record().unwrap();
        assert_eq!(record.challenge_index, 0);
        assert!(record.has_passed("mkdir_single_directory"));
    }

    #[test]
    fn test_blank_answer_counts_as_missing() {
        let temp = TempDir::new().unwrap();
        let mut engine = engine(&temp);
        engine.start(None).unwrap();

        let outcome = engine.submit(Some("   ")).unwrap();
        assert_eq!(outcome, Outcome::AnswerRequired { id: "cat_file".into() });
    }

    #[test]
    fn test_done_without_quest_leaves_directory() {
        let temp = TempDir::new().unwrap();
        let mut engine = engine(&temp);
        let unrelated = temp.path().join("default");
        fs::create_dir_all(&unrelated).unwrap();
        fs::write(unrelated.join("keep.txt"), "mine").unwrap();

        assert_eq!(engine.done().unwrap(), Outcome::Cancelled { workspace: None });
        assert!(unrelated.join("keep.txt").is_file());
    }

    #[test]
    fn test_failed_reset_is_fatal() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("file.txt");
        fs::write(&blocker, "not a directory").unwrap();
        let ws = blocker.join("ws");

        let manager = WorkspaceManager::new();
        assert!(matches!(
            manager.reset(&ws),
            Err(WorkspaceError::Repair { .. } | WorkspaceError::Create { .. })
        ));

        let mut engine = engine(&temp);
        assert!(engine.start(Some(ws.as_path())).is_err());
        assert!(engine.active.get().is_none());

        // teardown of the same path is best-effort
        manager.destroy(&ws);
        assert!(blocker.is_file());
    }

    #[test]
    fn test_setup_failure_keeps_progress() {
        let temp = TempDir::new().unwrap();
        let mut catalog = Catalog::builtin();
        catalog.register("broken", ChallengeSource::Structured(|| Box::new(Broken)));
        let registry = Registry::load(&["mkdir_single_directory", "broken"], &catalog).unwrap();
        let paths = EnginePaths {
            default_workspace: temp.path().join("default"),
            pointer: temp.path().join("state").join("active"),
        };
        let mut engine = Engine::new(registry, &Secret::new("engine-test"), paths).with_rng(StdRng::seed_from_u64(7));

        engine.start(None).unwrap();
        let record = engine.record().unwrap();
        fs::create_dir(record.path(record.text("dir_name").unwrap())).unwrap();

        let err = engine.submit(None).unwrap_err();
        assert!(format!("{:?}", err).contains("broken"));

        let record = engine.record().unwrap();
        assert_eq!(record.challenge_index, 1);
        assert!(record.has_passed("mkdir_single_directory"));
    }
}
