//! Copy and move challenges: cp and mv

use eyre::Result;

use super::{FIRST_NAMES, FRUITS, lines, make_dirs, pick, read_text, sample, texts, write_file};
use crate::challenge::{Challenge, SetupContext};
use crate::record::Record;
use crate::seal::FlagSeal;

const DIR_NAMES: &[&str] = &[
    "alpha", "beta", "gamma", "delta", "epsilon", "omega", "sigma", "theta", "lambda", "kappa", "docs", "data",
    "config", "assets", "backup", "cache", "logs", "tmp", "bin", "lib",
];

fn same_contents(a: &std::path::Path, b: &std::path::Path) -> bool {
    match (read_text(a), read_text(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

// ===== copy_file_in_same_directory =====

pub struct CopyFileInSameDirectory;

impl Challenge for CopyFileInSameDirectory {
    fn id(&self) -> &str {
        "copy_file_in_same_directory"
    }

    fn title(&self) -> &str {
        "Copy a file in the same directory"
    }

    fn description(&self) -> Vec<String> {
        lines(&[
            "The workspace contains one file.",
            "",
            "Create a copy of the file in the same directory.",
            "The name of the file must be:",
            "  {cp_dst}",
            "",
            "The challenge is completed when BOTH files exist.",
        ])
    }

    fn requires_flag(&self) -> bool {
        false
    }

    fn setup(&self, mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
        let [src, dst] = sample::<2>(ctx.rng, FRUITS);
        let src_name = format!("{}.txt", src);
        write_file(&record.path(&src_name), format!("This file is named {}.\n", src))?;

        record.set_text("cp_src", src_name);
        record.set_text("cp_dst", format!("{}.txt", dst));
        Ok(record)
    }

    fn evaluate(&self, record: &Record, _answer: Option<&str>, _seal: &FlagSeal) -> bool {
        texts(record, ["cp_src", "cp_dst"]).is_some_and(|[src, dst]| same_contents(&record.path(src), &record.path(dst)))
    }
}

// ===== cp_copy_file_to_dir =====

pub struct CopyFileToDir;

impl Challenge for CopyFileToDir {
    fn id(&self) -> &str {
        "cp_copy_file_to_dir"
    }

    fn title(&self) -> &str {
        "Copy a file into a directory"
    }

    fn description(&self) -> Vec<String> {
        lines(&[
            "The workspace contains one file and one directory.",
            "Copy the file into the directory.",
            "The challenge is completed when the file exists inside the directory.",
        ])
    }

    fn requires_flag(&self) -> bool {
        false
    }

    fn setup(&self, mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
        let fruit = pick(ctx.rng, FRUITS);
        let dir = pick(ctx.rng, FIRST_NAMES);
        let file = format!("{}.txt", fruit);

        write_file(&record.path(&file), format!("This file is named {}.\n", fruit))?;
        make_dirs(&record.path(dir))?;

        record.set_text("cp_source_file", file);
        record.set_text("cp_dest_dir", dir);
        Ok(record)
    }

    fn evaluate(&self, record: &Record, _answer: Option<&str>, _seal: &FlagSeal) -> bool {
        texts(record, ["cp_source_file", "cp_dest_dir"])
            .is_some_and(|[file, dir]| same_contents(&record.path(file), &record.path(dir).join(file)))
    }
}

// ===== move_file_into_directory =====

pub struct MoveFileIntoDirectory;

impl Challenge for MoveFileIntoDirectory {
    fn id(&self) -> &str {
        "move_file_into_directory"
    }

    fn title(&self) -> &str {
        "Move a file into a directory"
    }

    fn description(&self) -> Vec<String> {
        lines(&[
            "The workspace contains one file and one directory.",
            "",
            "Move the file into the directory.",
            "",
            "The challenge is completed when the file exists",
            "inside the directory and no longer exists",
            "in the workspace root.",
        ])
    }

    fn requires_flag(&self) -> bool {
        false
    }

    fn setup(&self, mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
        let fruit = pick(ctx.rng, FRUITS);
        let dir = pick(ctx.rng, FIRST_NAMES);
        let file = format!("{}.txt", fruit);

        write_file(&record.path(&file), format!("This file is named {}.\n", fruit))?;
        make_dirs(&record.path(dir))?;

        record.set_text("mv_src", file);
        record.set_text("mv_dir", dir);
        Ok(record)
    }

    fn evaluate(&self, record: &Record, _answer: Option<&str>, _seal: &FlagSeal) -> bool {
        texts(record, ["mv_src", "mv_dir"])
            .is_some_and(|[file, dir]| !record.path(file).exists() && record.path(dir).join(file).is_file())
    }
}

// ===== mv_rename_file =====

pub struct RenameFile;

impl Challenge for RenameFile {
    fn id(&self) -> &str {
        "mv_rename_file"
    }

    fn title(&self) -> &str {
        "Rename a file"
    }

    fn description(&self) -> Vec<String> {
        lines(&[
            "The workspace contains a single file.",
            "",
            "Rename the file to:",
            "  {mv_new_name}",
            "",
            "The challenge is completed when:",
            "- the original file no longer exists",
            "- the new file exists in the workspace",
        ])
    }

    fn requires_flag(&self) -> bool {
        false
    }

    fn setup(&self, mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
        let [old, new] = sample::<2>(ctx.rng, FRUITS);
        let old_name = format!("{}.txt", old);
        write_file(&record.path(&old_name), format!("This file was originally named {}.\n", old))?;

        record.set_text("mv_old_name", old_name);
        record.set_text("mv_new_name", format!("{}.txt", new));
        Ok(record)
    }

    fn evaluate(&self, record: &Record, _answer: Option<&str>, _seal: &FlagSeal) -> bool {
        texts(record, ["mv_old_name", "mv_new_name"])
            .is_some_and(|[old, new]| !record.path(old).exists() && record.path(new).is_file())
    }
}

// ===== mv_rename_directory =====

pub struct RenameDirectory;

impl Challenge for RenameDirectory {
    fn id(&self) -> &str {
        "mv_rename_directory"
    }

    fn title(&self) -> &str {
        "Rename a directory"
    }

    fn description(&self) -> Vec<String> {
        lines(&[
            "The workspace contains two directories, one inside the other.",
            "",
            "Rename the deepest directory to:",
            "  {mv_new_dir}",
            "",
            "The challenge is completed when:",
            "- the original directory name no longer exists",
            "- the renamed directory exists in the same parent directory",
        ])
    }

    fn requires_flag(&self) -> bool {
        false
    }

    fn setup(&self, mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
        let [parent, old, new] = sample::<3>(ctx.rng, DIR_NAMES);
        make_dirs(&record.path(parent).join(old))?;

        record.set_text("mv_parent_dir", parent);
        record.set_text("mv_old_dir", old);
        record.set_text("mv_new_dir", new);
        Ok(record)
    }

    fn evaluate(&self, record: &Record, _answer: Option<&str>, _seal: &FlagSeal) -> bool {
        texts(record, ["mv_parent_dir", "mv_old_dir", "mv_new_dir"]).is_some_and(|[parent, old, new]| {
            let parent = record.path(parent);
            !parent.join(old).exists() && parent.join(new).is_dir()
        })
    }
}
