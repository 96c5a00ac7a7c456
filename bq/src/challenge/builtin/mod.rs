//! Builtin challenge content
//!
//! Grouped by theme. Structured challenges are unit structs implementing
//! [`Challenge`]; convention challenges export a [`Namespace`] per id.

mod copy_move;
mod create;
mod inspect;
mod navigate;
mod remove;

use std::fs;
use std::path::Path;

use eyre::{Context, Result};
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

use super::{Catalog, Challenge, ChallengeSource};
use crate::record::Record;
use crate::seal::{FLAG_HASH, FlagSeal};

/// Default manifest order
pub const DEFAULT_ORDER: &[&str] = &[
    "cat_file",
    "list_dir",
    "deepest_directory",
    "tab_completion",
    "cd_maze",
    "cd_permissions",
    "pwd_absolute_path",
    "absolute_paths",
    "relative_paths",
    "largest_file",
    "ls_count_files",
    "ls_wildcards_star",
    "wc_random",
    "grep_flag_line",
    "grep_flag_across_files",
    "mkdir_single_directory",
    "mkdir_nested_directories",
    "echo_redirect_single_word",
    "echo_redirect_two_words",
    "echo_redirect_append_two_lines",
    "copy_file_in_same_directory",
    "cp_copy_file_to_dir",
    "move_file_into_directory",
    "mv_rename_file",
    "mv_rename_directory",
    "rm_file_in_deepest_directory",
    "rmdir_deepest_directory",
    "rmdir_non_empty_deepest_directory",
    "rmdir_three_nested_directories",
];

/// Register every builtin challenge
pub fn register(catalog: &mut Catalog) {
    let structured: [(&str, fn() -> Box<dyn Challenge>); 16] = [
        ("cat_file", || Box::new(inspect::CatFile)),
        ("list_dir", || Box::new(inspect::ListDir)),
        ("largest_file", || Box::new(inspect::LargestFile)),
        ("ls_count_files", || Box::new(inspect::LsCountFiles)),
        ("ls_wildcards_star", || Box::new(inspect::LsWildcardsStar)),
        ("wc_random", || Box::new(inspect::WcRandom)),
        ("grep_flag_line", || Box::new(inspect::GrepFlagLine)),
        ("grep_flag_across_files", || Box::new(inspect::GrepFlagAcrossFiles)),
        ("pwd_absolute_path", || Box::new(navigate::PwdAbsolutePath)),
        ("absolute_paths", || Box::new(navigate::AbsolutePaths)),
        ("relative_paths", || Box::new(navigate::RelativePaths)),
        ("copy_file_in_same_directory", || Box::new(copy_move::CopyFileInSameDirectory)),
        ("cp_copy_file_to_dir", || Box::new(copy_move::CopyFileToDir)),
        ("move_file_into_directory", || Box::new(copy_move::MoveFileIntoDirectory)),
        ("mv_rename_file", || Box::new(copy_move::RenameFile)),
        ("mv_rename_directory", || Box::new(copy_move::RenameDirectory)),
    ];
    for (id, make) in structured {
        catalog.register(id, ChallengeSource::Structured(make));
    }

    let convention: [(&str, fn() -> super::Namespace); 13] = [
        ("deepest_directory", navigate::deepest_directory),
        ("tab_completion", navigate::tab_completion),
        ("cd_maze", navigate::cd_maze),
        ("cd_permissions", navigate::cd_permissions),
        ("mkdir_single_directory", create::mkdir_single_directory),
        ("mkdir_nested_directories", create::mkdir_nested_directories),
        ("echo_redirect_single_word", create::echo_redirect_single_word),
        ("echo_redirect_two_words", create::echo_redirect_two_words),
        ("echo_redirect_append_two_lines", create::echo_redirect_append_two_lines),
        ("rm_file_in_deepest_directory", remove::rm_file_in_deepest_directory),
        ("rmdir_deepest_directory", remove::rmdir_deepest_directory),
        ("rmdir_non_empty_deepest_directory", remove::rmdir_non_empty_deepest_directory),
        ("rmdir_three_nested_directories", remove::rmdir_three_nested_directories),
    ];
    for (id, namespace) in convention {
        catalog.register(id, ChallengeSource::Convention(namespace));
    }
}

// ===== shared helpers =====

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Short unix-ish directory names
const SHORT_NAMES: &[&str] = &["bin", "lib", "src", "tmp", "var", "log", "opt", "dev", "etc", "run"];

/// Directory names for the create/remove exercises
const GREEK: &[&str] = &["alpha", "beta", "gamma", "delta", "omega"];

const FRUITS: &[&str] = &[
    "apple", "banana", "orange", "grape", "lemon", "peach", "pear", "plum", "mango", "papaya", "kiwi", "melon",
    "cherry", "fig", "apricot", "avocado", "coconut", "lime", "guava", "raspberry", "blueberry", "pineapple",
];

const FIRST_NAMES: &[&str] = &[
    "alice", "bob", "carol", "david", "emma", "frank", "grace", "henry", "irene", "jack", "kate", "leo", "maria",
    "nathan", "olivia", "paul", "quinn", "rachel", "sam", "tina",
];

fn pick(rng: &mut StdRng, items: &[&'static str]) -> &'static str {
    items[rng.random_range(0..items.len())]
}

/// `N` distinct items; `items` must hold at least `N`
fn sample<const N: usize>(rng: &mut StdRng, items: &[&'static str]) -> [&'static str; N] {
    debug_assert!(items.len() >= N);
    let mut picked = [""; N];
    for (slot, item) in picked.iter_mut().zip(items.choose_multiple(rng, N)) {
        *slot = *item;
    }
    picked
}

fn lines(src: &[&str]) -> Vec<String> {
    src.iter().map(|line| line.to_string()).collect()
}

fn random_word(rng: &mut StdRng, alphabet: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
        .collect()
}

fn lowercase(rng: &mut StdRng, len: usize) -> String {
    random_word(rng, LOWERCASE, len)
}

/// Several text fields at once; `None` if any is absent
fn texts<'r, const N: usize>(record: &'r Record, keys: [&str; N]) -> Option<[&'r str; N]> {
    let mut values = [""; N];
    for (slot, key) in values.iter_mut().zip(keys) {
        *slot = record.text(key)?;
    }
    Some(values)
}

/// Submitted answer against the sealed flag
fn flag_matches(record: &Record, answer: Option<&str>, seal: &FlagSeal) -> bool {
    answer.is_some_and(|answer| seal.verify(record, FLAG_HASH, answer.trim()))
}

/// Numeric answer against a sealed count; `042` and `42` are the same answer
fn count_matches(record: &Record, answer: Option<&str>, seal: &FlagSeal) -> bool {
    answer
        .and_then(|answer| answer.trim().parse::<u64>().ok())
        .is_some_and(|n| seal.verify(record, FLAG_HASH, &n.to_string()))
}

fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

fn make_dirs(path: &Path) -> Result<()> {
    fs::create_dir_all(path).with_context(|| format!("Failed to create {}", path.display()))
}

fn read_text(path: &Path) -> Option<String> {
    if !path.is_file() {
        return None;
    }
    fs::read_to_string(path).ok()
}
