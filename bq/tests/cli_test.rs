//! CLI tests: drive the `bashquest` binary end-to-end

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Sandbox {
    temp: TempDir,
    config: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("env"), "# quest secret\nSECRET_KEY=\"cli-test-secret\"\n").unwrap();

        let config = root.join("bashquest.yml");
        let yaml = format!(
            "challenges:\n  - cat_file\n  - mkdir_single_directory\nworkspace: {}\nsecret-file: {}\nstate-dir: {}\n",
            root.join("workspace").display(),
            root.join("env").display(),
            root.join("state").display(),
        );
        fs::write(&config, yaml).unwrap();
        Self { temp, config }
    }

    fn workspace(&self) -> PathBuf {
        self.temp.path().join("workspace")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("bashquest").unwrap();
        cmd.current_dir(self.temp.path())
            .env("XDG_DATA_HOME", self.temp.path().join("data"))
            .env("NO_COLOR", "1")
            .arg("-c")
            .arg(&self.config);
        cmd
    }
}

fn flag(ws: &Path) -> String {
    let message = fs::read_to_string(ws.join("message.txt")).unwrap();
    message.lines().nth(1).unwrap().to_string()
}

#[test]
fn test_start_shows_first_challenge() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .arg("start")
        .assert()
        .success()
        .stdout(predicate::str::contains("Challenge 1: Display file content"));

    assert!(sandbox.workspace().join("message.txt").is_file());
}

#[test]
fn test_wrong_then_right_submit() {
    let sandbox = Sandbox::new();
    sandbox.cmd().arg("start").assert().success();

    sandbox
        .cmd()
        .args(["submit", "wrongword"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Wrong answer"));

    let answer = flag(&sandbox.workspace());
    sandbox
        .cmd()
        .args(["submit", &answer])
        .assert()
        .success()
        .stdout(predicate::str::contains("Correct!").and(predicate::str::contains("Challenge 2")));
}

#[test]
fn test_submit_without_flag() {
    let sandbox = Sandbox::new();
    sandbox.cmd().arg("start").assert().success();

    sandbox
        .cmd()
        .arg("submit")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("needs a flag"));
}

#[test]
fn test_list_and_current() {
    let sandbox = Sandbox::new();
    sandbox.cmd().arg("start").assert().success();

    sandbox
        .cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("cat_file").and(predicate::str::contains("mkdir_single_directory")));

    sandbox
        .cmd()
        .arg("current")
        .assert()
        .success()
        .stdout(predicate::str::contains("Challenge 1"));
}

#[test]
fn test_goto_and_finish() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["goto", "99"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Invalid challenge: 99"));

    sandbox
        .cmd()
        .args(["goto", "mkdir_single_directory"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Challenge 2"));

    // the directory name is only told to the learner through the description
    let output = sandbox.cmd().arg("challenge").output().unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    let name = stdout
        .split("named: ")
        .nth(1)
        .and_then(|rest| rest.split('.').next())
        .unwrap()
        .to_string();
    fs::create_dir(sandbox.workspace().join(&name)).unwrap();

    sandbox
        .cmd()
        .arg("submit")
        .assert()
        .success()
        .stdout(predicate::str::contains("All challenges completed"));
}

#[test]
fn test_no_active_workspace() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .arg("challenge")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("No active workspace"));
}

#[test]
fn test_done_removes_workspace() {
    let sandbox = Sandbox::new();
    sandbox.cmd().arg("start").assert().success();

    sandbox
        .cmd()
        .arg("done")
        .assert()
        .success()
        .stdout(predicate::str::contains("Quest cancelled"));
    assert!(!sandbox.workspace().exists());

    sandbox
        .cmd()
        .arg("list")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("No active workspace"));
}

#[test]
fn test_workspace_flag_overrides() {
    let sandbox = Sandbox::new();
    let other = sandbox.temp.path().join("other");

    sandbox
        .cmd()
        .arg("-w")
        .arg(&other)
        .arg("start")
        .assert()
        .success();

    assert!(other.join("message.txt").is_file());
    assert!(!sandbox.workspace().exists());
}

#[test]
fn test_missing_secret_is_fatal() {
    let sandbox = Sandbox::new();
    fs::remove_file(sandbox.temp.path().join("env")).unwrap();

    sandbox
        .cmd()
        .arg("start")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load secret"));
}

#[test]
fn test_unknown_challenge_in_manifest_is_fatal() {
    let sandbox = Sandbox::new();
    let yaml = fs::read_to_string(&sandbox.config).unwrap().replace("cat_file", "cat_files");
    fs::write(&sandbox.config, yaml).unwrap();

    sandbox
        .cmd()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid challenge manifest"));
}

#[test]
fn test_invalid_local_config_is_fatal() {
    let sandbox = Sandbox::new();
    let root = sandbox.temp.path();
    let user_dir = root.join("config").join("bashquest");
    fs::create_dir_all(&user_dir).unwrap();
    fs::write(user_dir.join("env"), "SECRET_KEY=cli-test-secret\n").unwrap();
    fs::write(root.join(".bashquest.yml"), "challenges: cat_file\n").unwrap();

    let mut cmd = Command::cargo_bin("bashquest").unwrap();
    cmd.current_dir(root)
        .env("XDG_CONFIG_HOME", root.join("config"))
        .env("XDG_DATA_HOME", root.join("data"))
        .env("NO_COLOR", "1")
        .args(["goto", "2"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Challenge 2").not())
        .stderr(predicate::str::contains(".bashquest.yml"));
}
