//! Removal challenges: rm and rmdir

use std::path::PathBuf;

use eyre::Result;

use super::{GREEK, lowercase, make_dirs, sample, texts, write_file};
use crate::challenge::{Namespace, SetupContext};
use crate::record::Record;
use crate::seal::FlagSeal;

/// Create `dir1/dir2/dir3` and remember the names
fn nested(record: &mut Record, ctx: &mut SetupContext<'_>) -> Result<PathBuf> {
    let [d1, d2, d3] = sample::<3>(ctx.rng, GREEK);
    let deepest = record.path(d1).join(d2).join(d3);
    make_dirs(&deepest)?;

    record.set_text("dir1", d1);
    record.set_text("dir2", d2);
    record.set_text("dir3", d3);
    Ok(deepest)
}

/// Same as [`nested`], plus a random file in the deepest directory
fn nested_with_file(record: &mut Record, ctx: &mut SetupContext<'_>) -> Result<()> {
    let deepest = nested(record, ctx)?;
    let filename = format!("{}.txt", lowercase(ctx.rng, 8));
    write_file(&deepest.join(&filename), "temporary file\n")?;
    record.set_text("filename", filename);
    Ok(())
}

/// `[dir1, dir1/dir2, dir1/dir2/dir3]` inside the workspace
fn levels(record: &Record) -> Option<[PathBuf; 3]> {
    let [d1, d2, d3] = texts(record, ["dir1", "dir2", "dir3"])?;
    let first = record.path(d1);
    let second = first.join(d2);
    let third = second.join(d3);
    Some([first, second, third])
}

// ===== rm_file_in_deepest_directory =====

pub fn rm_file_in_deepest_directory() -> Namespace {
    Namespace::new("rm_file_in_deepest_directory")
        .flag("requires_flag_rm_file_in_deepest_directory", false)
        .text("title_rm_file_in_deepest_directory", "Remove a file in the deepest directory")
        .lines(
            "description_rm_file_in_deepest_directory",
            &[
                "Three directories were created, one inside another, inside the workspace.",
                "Inside the deepest directory there is a file named: {filename}.",
                "Remove ONLY this file.",
                "All directories must remain.",
            ],
        )
        .setup("setup_rm_file_in_deepest_directory", setup_rm_file_in_deepest_directory)
        .check("check_rm_file_in_deepest_directory", check_rm_file_in_deepest_directory)
}

fn setup_rm_file_in_deepest_directory(mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
    nested_with_file(&mut record, ctx)?;
    Ok(record)
}

fn check_rm_file_in_deepest_directory(record: &Record, _answer: Option<&str>, _seal: &FlagSeal) -> bool {
    let (Some(levels), Some(filename)) = (levels(record), record.text("filename")) else {
        return false;
    };
    !levels[2].join(filename).exists() && levels.iter().all(|dir| dir.is_dir())
}

// ===== rmdir_deepest_directory =====

pub fn rmdir_deepest_directory() -> Namespace {
    Namespace::new("rmdir_deepest_directory")
        .flag("requires_flag_rmdir_deepest_directory", false)
        .text("title_rmdir_deepest_directory", "Remove the deepest directory")
        .lines(
            "description_rmdir_deepest_directory",
            &[
                "Three directories were created, one inside another, inside the workspace.",
                "Remove only the deepest directory using rmdir.",
                "The directory to remove is: {dir1}/{dir2}/{dir3}.",
                "The parent directories must remain.",
            ],
        )
        .setup("setup_rmdir_deepest_directory", setup_rmdir_deepest_directory)
        .check("check_rmdir_deepest_directory", check_rmdir_deepest_directory)
}

fn setup_rmdir_deepest_directory(mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
    nested(&mut record, ctx)?;
    Ok(record)
}

fn check_rmdir_deepest_directory(record: &Record, _answer: Option<&str>, _seal: &FlagSeal) -> bool {
    levels(record).is_some_and(|[first, second, third]| !third.exists() && second.is_dir() && first.is_dir())
}

// ===== rmdir_non_empty_deepest_directory =====

pub fn rmdir_non_empty_deepest_directory() -> Namespace {
    Namespace::new("rmdir_non_empty_deepest_directory")
        .flag("requires_flag_rmdir_non_empty_deepest_directory", false)
        .text("title_rmdir_non_empty_deepest_directory", "Remove a non-empty deepest directory")
        .lines(
            "description_rmdir_non_empty_deepest_directory",
            &[
                "Three directories were created, one inside another, inside the workspace.",
                "The deepest directory is NOT empty.",
                "It contains a file named: {filename}.",
                "Remove the file, then remove ONLY the deepest directory using rmdir.",
                "The parent directories must remain.",
            ],
        )
        .setup("setup_rmdir_non_empty_deepest_directory", setup_rmdir_non_empty_deepest_directory)
        .check("check_rmdir_non_empty_deepest_directory", check_rmdir_deepest_directory)
}

fn setup_rmdir_non_empty_deepest_directory(mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
    nested_with_file(&mut record, ctx)?;
    Ok(record)
}

// ===== rmdir_three_nested_directories =====

pub fn rmdir_three_nested_directories() -> Namespace {
    Namespace::new("rmdir_three_nested_directories")
        .flag("requires_flag_rmdir_three_nested_directories", false)
        .text("title_rmdir_three_nested_directories", "Remove three nested directories")
        .lines(
            "description_rmdir_three_nested_directories",
            &[
                "Three directories were created, one inside another, inside the workspace.",
                "Remove all three directories.",
                "At the end, none of the three directories must exist.",
                "Can you do it with one single command?",
            ],
        )
        .setup("setup_rmdir_three_nested_directories", setup_rmdir_deepest_directory)
        .check("check_rmdir_three_nested_directories", check_rmdir_three_nested_directories)
}

fn check_rmdir_three_nested_directories(record: &Record, _answer: Option<&str>, _seal: &FlagSeal) -> bool {
    levels(record).is_some_and(|levels| levels.iter().all(|dir| !dir.exists()))
}
