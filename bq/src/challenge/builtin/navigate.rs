//! Navigation challenges: cd, pwd and paths

use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

use super::{SHORT_NAMES, flag_matches, make_dirs, pick, random_word, sample, write_file};
use crate::challenge::{Challenge, Namespace, SetupContext};
use crate::record::Record;
use crate::seal::{FLAG_HASH, FlagSeal};

const INSTRUCTIONS: &str = "INSTRUCTIONS.txt";

const USERS: &[&str] = &["alice", "bob", "charlie", "diana", "eve"];
const TOP_FOLDERS: &[&str] = &["documents", "photos", "music", "downloads", "projects"];
const SUBFOLDERS: &[&str] = &["work", "personal", "archive", "2022", "2023", "misc"];

// ===== deepest_directory =====

pub fn deepest_directory() -> Namespace {
    Namespace::new("deepest_directory")
        .text("title_deepest_directory", "Find the deepest directory")
        .lines(
            "description_deepest_directory",
            &[
                "Three directories were created, one inside another, inside workspace.",
                "Find the deepest one. The flag is its name.",
            ],
        )
        .setup("setup_deepest_directory", setup_deepest_directory)
        .check("check_deepest_directory", flag_matches)
}

fn setup_deepest_directory(mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
    let [d1, d2, d3] = sample::<3>(ctx.rng, SHORT_NAMES);
    make_dirs(&record.path(d1).join(d2).join(d3))?;
    ctx.seal.seal(&mut record, FLAG_HASH, d3);
    Ok(record)
}

// ===== tab_completion =====

pub fn tab_completion() -> Namespace {
    Namespace::new("tab_completion")
        .text("title_tab_completion", "Advanced tab completion with ambiguity")
        .lines(
            "description_tab_completion",
            &[
                "Four directories were created, one inside another.",
                "The first three levels use extremely ambiguous directory names.",
                "At the first two levels, there are TWO directories:",
                "only one continues the path, the other is empty.",
                "You must type at least one character before using TAB.",
                "The flag is the name of the deepest directory.",
            ],
        )
        .setup("setup_tab_completion", setup_tab_completion)
        .check("check_tab_completion", flag_matches)
}

fn ambiguous_name(rng: &mut StdRng) -> String {
    random_word(rng, b"0O1l", 20)
}

fn setup_tab_completion(mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
    let level1 = record.path(ambiguous_name(ctx.rng));
    make_dirs(&record.path(ambiguous_name(ctx.rng)))?;

    let level2 = level1.join(ambiguous_name(ctx.rng));
    make_dirs(&level1.join(ambiguous_name(ctx.rng)))?;

    let level3 = level2.join(ambiguous_name(ctx.rng));
    let flag = pick(ctx.rng, SHORT_NAMES);
    make_dirs(&level3.join(flag))?;

    ctx.seal.seal(&mut record, FLAG_HASH, flag);
    Ok(record)
}

// ===== cd_maze =====

pub fn cd_maze() -> Namespace {
    Namespace::new("cd_maze")
        .text("title_cd_maze", "Navigate a directory maze using cd")
        .lines(
            "description_cd_maze",
            &[
                "Navigate the directory maze using 'cd'.",
                "There are multiple paths, but only one leads to the deepest directory.",
                "The name of that directory is the flag.",
            ],
        )
        .setup("setup_cd_maze", setup_cd_maze)
        .check("check_cd_maze", flag_matches)
}

fn setup_cd_maze(mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
    let start = record.path("start");
    make_dirs(&start.join("go_left").join("treasure"))?;
    make_dirs(&start.join("go_right").join("deadend"))?;
    ctx.seal.seal(&mut record, FLAG_HASH, "treasure");
    Ok(record)
}

// ===== cd_permissions =====

pub fn cd_permissions() -> Namespace {
    Namespace::new("cd_permissions")
        .text("title_cd_permissions", "Change directory with restricted permissions")
        .lines(
            "description_cd_permissions",
            &[
                "You cannot list directories.",
                "Read INSTRUCTIONS.txt (autocompletion is disabled) and use 'cd'.",
                "The flag is the deepest directory name.",
                "Use pwd anytime.",
            ],
        )
        .setup("setup_cd_permissions", setup_cd_permissions)
        .check("check_cd_permissions", flag_matches)
}

fn setup_cd_permissions(mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
    const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let d1 = random_word(ctx.rng, LETTERS, 6);
    let d2 = random_word(ctx.rng, LETTERS, 6);
    let d3 = random_word(ctx.rng, LETTERS, 6);

    let p1 = record.path(&d1);
    let p2 = p1.join(&d2);
    let p3 = p2.join(&d3);
    make_dirs(&p3)?;

    write_file(&p1.join(INSTRUCTIONS), format!("To continue, cd into:\n{}\n", d2))?;
    write_file(&p2.join(INSTRUCTIONS), format!("To continue, cd into:\n{}\n", d3))?;
    write_file(
        &p3.join(INSTRUCTIONS),
        "You reached the deepest directory.\nThe directory name is the flag.\nUse pwd to show the full path.\n",
    )?;

    lock_down(&[p1, p2, p3])?;

    ctx.seal.seal(&mut record, FLAG_HASH, &d3);
    Ok(record)
}

/// Read-only instructions, traverse-only directories (innermost first)
#[cfg(unix)]
fn lock_down(dirs: &[PathBuf]) -> Result<()> {
    use eyre::Context;
    use std::os::unix::fs::PermissionsExt;

    for dir in dirs.iter().rev() {
        let file = dir.join(INSTRUCTIONS);
        fs::set_permissions(&file, fs::Permissions::from_mode(0o444))
            .with_context(|| format!("Failed to lock {}", file.display()))?;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o111))
            .with_context(|| format!("Failed to lock {}", dir.display()))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn lock_down(dirs: &[PathBuf]) -> Result<()> {
    for dir in dirs {
        let file = dir.join(INSTRUCTIONS);
        let mut perms = fs::metadata(&file)?.permissions();
        perms.set_readonly(true);
        fs::set_permissions(&file, perms)?;
    }
    Ok(())
}

// ===== pwd_absolute_path =====

const PWD_NAMES: &[&str] = &[
    "projects", "workspace", "sandbox", "data", "files", "docs", "notes", "src", "build", "output", "results",
    "archive",
];

pub struct PwdAbsolutePath;

impl PwdAbsolutePath {
    /// Absolute form of a submitted path; trailing slashes and `..` are resolved
    fn normalize(answer: &str) -> Option<String> {
        let trimmed = answer.trim();
        if trimmed.is_empty() {
            return None;
        }
        let resolved = fs::canonicalize(trimmed).unwrap_or_else(|_| {
            let stripped = trimmed.trim_end_matches('/');
            PathBuf::from(if stripped.is_empty() { "/" } else { stripped })
        });
        Some(resolved.to_string_lossy().into_owned())
    }
}

impl Challenge for PwdAbsolutePath {
    fn id(&self) -> &str {
        "pwd_absolute_path"
    }

    fn title(&self) -> &str {
        "Print the working directory"
    }

    fn description(&self) -> Vec<String> {
        super::lines(&[
            "Two directories have been created, one inside the other.",
            "",
            "Change directory into the deepest one.",
            "Then print its absolute path.",
            "",
            "The flag is the absolute path of the current directory.",
            "",
            "NOTE:",
            "Move out of the tree in the workspace before submitting,",
            "otherwise, if you pass the challenge, the tree will be deleted",
            "and you will end up in a non-existent directory.",
        ])
    }

    fn setup(&self, mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
        let [d1, d2] = sample::<2>(ctx.rng, PWD_NAMES);
        let deepest = record.path(d1).join(d2);
        make_dirs(&deepest)?;

        let absolute = fs::canonicalize(&deepest).unwrap_or(deepest);
        ctx.seal.seal(&mut record, FLAG_HASH, &absolute.to_string_lossy());
        Ok(record)
    }

    fn evaluate(&self, record: &Record, answer: Option<&str>, seal: &FlagSeal) -> bool {
        answer
            .and_then(Self::normalize)
            .is_some_and(|path| seal.verify(record, FLAG_HASH, &path))
    }
}

// ===== absolute_paths =====

const TARGET_FILE: &str = "target.txt";

/// user -> folder -> subfolders
type Tree = Vec<(&'static str, Vec<(&'static str, Vec<&'static str>)>)>;

/// Three users, each with `folders.0..=folders.1` folders of one or two subfolders
fn build_tree(rng: &mut StdRng, folders: (usize, usize)) -> Tree {
    let mut tree = Vec::new();
    for user in USERS.choose_multiple(rng, 3).copied().collect::<Vec<_>>() {
        let folder_count = rng.random_range(folders.0..=folders.1);
        let mut branches = Vec::new();
        for folder in TOP_FOLDERS.choose_multiple(rng, folder_count).copied().collect::<Vec<_>>() {
            let sub_count = rng.random_range(1..=2);
            let subs: Vec<&str> = SUBFOLDERS.choose_multiple(rng, sub_count).copied().collect();
            branches.push((folder, subs));
        }
        tree.push((user, branches));
    }
    tree
}

/// Create the tree under `ws`, returning the leaf directories
fn create_tree(ws: &Path, tree: &Tree) -> Result<Vec<PathBuf>> {
    let mut leaves = Vec::new();
    for (user, branches) in tree {
        for (folder, subs) in branches {
            for sub in subs {
                let dir = ws.join(user).join(folder).join(sub);
                make_dirs(&dir)?;
                leaves.push(dir);
            }
        }
    }
    Ok(leaves)
}

pub struct AbsolutePaths;

impl Challenge for AbsolutePaths {
    fn id(&self) -> &str {
        "absolute_paths"
    }

    fn title(&self) -> &str {
        "Find a file using absolute paths"
    }

    fn description(&self) -> Vec<String> {
        super::lines(&[
            "A directory tree has been created in the workspace.",
            "Inside this tree, a *single unique file* exists.",
            "",
            "Find the *absolute path* of the following file:",
            "  {target_file}",
            "",
            "The flag is the absolute path to the file.",
        ])
    }

    fn setup(&self, mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
        let tree = build_tree(ctx.rng, (2, 3));
        let leaves = create_tree(record.workspace(), &tree)?;
        let target = leaves
            .choose(ctx.rng)
            .ok_or_else(|| eyre!("directory tree is empty"))?
            .join(TARGET_FILE);
        write_file(&target, "")?;

        record.set_text("target_file", TARGET_FILE);
        ctx.seal.seal(&mut record, FLAG_HASH, &target.to_string_lossy());
        Ok(record)
    }

    fn evaluate(&self, record: &Record, answer: Option<&str>, seal: &FlagSeal) -> bool {
        flag_matches(record, answer, seal)
    }
}

// ===== relative_paths =====

pub struct RelativePaths;

impl Challenge for RelativePaths {
    fn id(&self) -> &str {
        "relative_paths"
    }

    fn title(&self) -> &str {
        "Navigate using relative paths"
    }

    fn description(&self) -> Vec<String> {
        super::lines(&[
            "A directory tree has been created in the workspace.",
            "You are currently located in the directory:",
            "  {start_dir}",
            "",
            "What is the *relative path* from this directory to:",
            "  {target_dir}",
            "",
            "The flag is the relative path.",
            "Note: the path MUST be the shortest possible one.",
        ])
    }

    fn setup(&self, mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
        let tree = build_tree(ctx.rng, (2, 4));
        create_tree(record.workspace(), &tree)?;

        let (user, branches) = tree.choose(ctx.rng).ok_or_else(|| eyre!("directory tree is empty"))?;
        let picked: Vec<_> = branches.choose_multiple(ctx.rng, 2).collect();
        let [(start_folder, start_subs), (target_folder, target_subs)] = picked.as_slice() else {
            return Err(eyre!("user {} has fewer than two folders", user));
        };
        let start_sub = start_subs.choose(ctx.rng).ok_or_else(|| eyre!("empty folder"))?;
        let target_sub = target_subs.choose(ctx.rng).ok_or_else(|| eyre!("empty folder"))?;

        record.set_text("start_dir", format!("{}/{}/{}", user, start_folder, start_sub));
        record.set_text("target_dir", format!("{}/{}/{}", user, target_folder, target_sub));
        let relative = format!("../../{}/{}", target_folder, target_sub);
        ctx.seal.seal(&mut record, FLAG_HASH, &relative);
        Ok(record)
    }

    fn evaluate(&self, record: &Record, answer: Option<&str>, seal: &FlagSeal) -> bool {
        flag_matches(record, answer, seal)
    }
}
