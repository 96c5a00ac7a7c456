//! Inspection challenges: cat, ls, wc and grep

use std::collections::BTreeSet;

use eyre::{Result, eyre};
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use tracing::debug;

use super::{FRUITS, count_matches, flag_matches, lines, lowercase, pick, write_file};
use crate::challenge::{Challenge, SetupContext};
use crate::record::Record;
use crate::seal::{FLAG_HASH, FlagSeal};

const MESSAGE_WORDS: &[&str] = &["hello", "banana", "penguin", "ocean", "terminal", "kernel"];

const COUNTRIES: &[&str] = &[
    "italy", "france", "germany", "spain", "portugal", "greece", "belgium", "netherlands", "sweden", "norway",
    "china", "japan", "india", "south_korea", "thailand", "egypt", "south_africa", "nigeria", "kenya", "morocco",
    "canada", "mexico", "cuba", "jamaica", "venezuela", "brazil", "argentina", "chile", "peru", "colombia",
];

const PLACES: &[&str] = &[
    "albania", "algeria", "andorra", "angola", "armenia", "australia", "austria", "bahamas", "bahrain",
    "belarus", "belize", "benin", "bhutan", "bolivia", "botswana", "brunei", "bulgaria", "burundi", "cambodia",
    "cameroon", "chad", "croatia", "cyprus", "denmark", "djibouti", "ecuador", "estonia", "ethiopia", "fiji",
    "finland", "gabon", "gambia", "georgia", "ghana", "grenada", "guyana", "haiti", "honduras", "hungary",
    "iceland", "ireland", "israel", "jordan", "kuwait", "laos", "latvia", "lebanon", "lesotho", "liberia",
    "libya", "malawi", "mali", "malta", "monaco", "nepal", "oman", "panama", "qatar", "rwanda", "samoa",
    "london", "paris", "berlin", "madrid", "rome", "tokyo", "osaka", "kyoto", "cairo", "lagos", "oslo",
    "vienna", "prague", "lisbon", "zurich", "geneva",
];

const DATA_FILE: &str = "data.txt";

// ===== cat_file =====

pub struct CatFile;

impl Challenge for CatFile {
    fn id(&self) -> &str {
        "cat_file"
    }

    fn title(&self) -> &str {
        "Display file content"
    }

    fn description(&self) -> Vec<String> {
        lines(&[
            "A file has been created in the workspace.",
            "Display its contents using the appropriate command.",
            "The flag is a single word written inside the file.",
        ])
    }

    fn setup(&self, mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
        let word = pick(ctx.rng, MESSAGE_WORDS);
        write_file(
            &record.path("message.txt"),
            format!("The flag is the word below:\n{}\n", word),
        )?;
        ctx.seal.seal(&mut record, FLAG_HASH, word);
        Ok(record)
    }

    fn evaluate(&self, record: &Record, answer: Option<&str>, seal: &FlagSeal) -> bool {
        flag_matches(record, answer, seal)
    }
}

// ===== list_dir =====

pub struct ListDir;

impl Challenge for ListDir {
    fn id(&self) -> &str {
        "list_dir"
    }

    fn title(&self) -> &str {
        "Find file name"
    }

    fn description(&self) -> Vec<String> {
        lines(&[
            "A file has been created in the workspace.",
            "The name of the file (without extension) is the flag.",
        ])
    }

    fn setup(&self, mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
        let country = pick(ctx.rng, COUNTRIES);
        write_file(
            &record.path(format!("{}.txt", country)),
            "This file is used to test ls command.\n",
        )?;
        ctx.seal.seal(&mut record, FLAG_HASH, country);
        Ok(record)
    }

    fn evaluate(&self, record: &Record, answer: Option<&str>, seal: &FlagSeal) -> bool {
        flag_matches(record, answer, seal)
    }
}

// ===== largest_file =====

pub struct LargestFile;

impl Challenge for LargestFile {
    fn id(&self) -> &str {
        "largest_file"
    }

    fn title(&self) -> &str {
        "Find the largest file"
    }

    fn description(&self) -> Vec<String> {
        lines(&[
            "Several files have been created in the workspace.",
            "Each file has a different size.",
            "The flag is the name of the largest file (without extension).",
        ])
    }

    fn setup(&self, mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
        // strictly increasing, then shuffled: sizes are distinct
        let mut size = 10_000usize;
        let mut sizes: Vec<usize> = PLACES
            .iter()
            .map(|_| {
                size += ctx.rng.random_range(5..=100);
                size
            })
            .collect();
        sizes.shuffle(ctx.rng);

        for (name, size) in PLACES.iter().zip(&sizes) {
            write_file(&record.path(format!("{}.txt", name)), "X".repeat(*size))?;
        }

        let largest = PLACES
            .iter()
            .zip(&sizes)
            .max_by_key(|(_, size)| **size)
            .map(|(name, _)| *name)
            .ok_or_else(|| eyre!("no files generated"))?;

        debug!(files = PLACES.len(), "LargestFile::setup: files written");
        ctx.seal.seal(&mut record, FLAG_HASH, largest);
        Ok(record)
    }

    fn evaluate(&self, record: &Record, answer: Option<&str>, seal: &FlagSeal) -> bool {
        flag_matches(record, answer, seal)
    }
}

// ===== ls_count_files =====

const COUNT_MIN: usize = 20;
const COUNT_MAX: usize = 60;

pub struct LsCountFiles;

impl Challenge for LsCountFiles {
    fn id(&self) -> &str {
        "ls_count_files"
    }

    fn title(&self) -> &str {
        "Count files in a directory"
    }

    fn description(&self) -> Vec<String> {
        lines(&[
            "A random number of files have been created in the workspace.",
            "Use the appropriate command(s) to count how many files are present.",
            "The flag is the number of files.",
        ])
    }

    fn setup(&self, mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
        let count = ctx.rng.random_range(COUNT_MIN..=COUNT_MAX.min(PLACES.len()));
        for name in PLACES.choose_multiple(ctx.rng, count) {
            write_file(&record.path(name), "")?;
        }
        ctx.seal.seal(&mut record, FLAG_HASH, &count.to_string());
        Ok(record)
    }

    fn evaluate(&self, record: &Record, answer: Option<&str>, seal: &FlagSeal) -> bool {
        count_matches(record, answer, seal)
    }
}

// ===== ls_wildcards_star =====

const WILDCARD_TOTAL: usize = 300;
const WILDCARD_MAX_MATCHES: usize = 10;

pub struct LsWildcardsStar;

impl LsWildcardsStar {
    /// A 2-3 letter pattern that cannot match inside the `.txt` suffix
    fn pattern(rng: &mut StdRng) -> String {
        loop {
            let len = if rng.random_bool(0.5) { 2 } else { 3 };
            let pattern = lowercase(rng, len);
            if !"txt".contains(pattern.as_str()) {
                return pattern;
            }
        }
    }

    fn matching_name(rng: &mut StdRng, pattern: &str) -> String {
        let len = rng.random_range(4..=8);
        let at = rng.random_range(0..=len - pattern.len());
        let name = lowercase(rng, len);
        format!("{}{}{}", &name[..at], pattern, &name[at + pattern.len()..])
    }

    fn other_name(rng: &mut StdRng, pattern: &str) -> String {
        loop {
            let len = rng.random_range(4..=8);
            let name = lowercase(rng, len);
            if !name.contains(pattern) {
                return name;
            }
        }
    }
}

impl Challenge for LsWildcardsStar {
    fn id(&self) -> &str {
        "ls_wildcards_star"
    }

    fn title(&self) -> &str {
        "List files using wildcards"
    }

    fn description(&self) -> Vec<String> {
        lines(&[
            "The workspace contains hundreds of text files.",
            "All files have names made of 4-8 lowercase letters and end with '.txt'.",
            "",
            "How many files contain the sequence:",
            "  '{ls_pattern}'",
            "",
            "Use wildcards with ls to find the answer.",
            "The flag is the number of matching files.",
        ])
    }

    fn setup(&self, mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
        let pattern = Self::pattern(ctx.rng);
        let matches = ctx.rng.random_range(0..=WILDCARD_MAX_MATCHES);

        let mut names = BTreeSet::new();
        while names.len() < matches {
            names.insert(Self::matching_name(ctx.rng, &pattern));
        }
        while names.len() < WILDCARD_TOTAL {
            names.insert(Self::other_name(ctx.rng, &pattern));
        }

        for name in &names {
            write_file(&record.path(format!("{}.txt", name)), "")?;
        }

        debug!(%pattern, matches, "LsWildcardsStar::setup: files written");
        record.set_text("ls_pattern", pattern);
        ctx.seal.seal(&mut record, FLAG_HASH, &matches.to_string());
        Ok(record)
    }

    fn evaluate(&self, record: &Record, answer: Option<&str>, seal: &FlagSeal) -> bool {
        count_matches(record, answer, seal)
    }
}

// ===== wc_random =====

pub struct WcRandom;

impl Challenge for WcRandom {
    fn id(&self) -> &str {
        "wc_random"
    }

    fn title(&self) -> &str {
        "Count words in a file"
    }

    fn description(&self) -> Vec<String> {
        lines(&[
            "A file named {wc_file_name} has been created in the workspace.",
            "It contains a random number of words separated by spaces.",
            "Use the appropriate command to count the words in the file.",
            "The flag is the number of words in the file.",
        ])
    }

    fn setup(&self, mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
        let file_name = format!("{}.txt", lowercase(ctx.rng, 8));
        let count = ctx.rng.random_range(50..=500);
        let words: Vec<String> = (0..count)
            .map(|_| {
                let len = ctx.rng.random_range(3..=10);
                lowercase(ctx.rng, len)
            })
            .collect();

        write_file(&record.path(&file_name), words.join(" "))?;

        record.set_text("wc_file_name", file_name);
        ctx.seal.seal(&mut record, FLAG_HASH, &count.to_string());
        Ok(record)
    }

    fn evaluate(&self, record: &Record, answer: Option<&str>, seal: &FlagSeal) -> bool {
        count_matches(record, answer, seal)
    }
}

// ===== grep =====

/// Short line of noise; some contain `flag` but never `flag:`
fn noise_line(rng: &mut StdRng) -> String {
    if rng.random_bool(0.3) {
        let prefix_len = rng.random_range(1..=5);
        let prefix = lowercase(rng, prefix_len);
        let suffix_len = rng.random_range(1..=5);
        let suffix = lowercase(rng, suffix_len);
        format!("{}flag{}", prefix, suffix)
    } else {
        let len = rng.random_range(2..=15);
        lowercase(rng, len)
    }
}

/// `count` noise lines with `flag:<word>` at `flag_at`, if given
fn haystack(rng: &mut StdRng, count: usize, flag_at: Option<usize>, word: &str) -> String {
    let mut text = String::new();
    for i in 0..count {
        if Some(i) == flag_at {
            text.push_str("flag:");
            text.push_str(word);
        } else {
            text.push_str(&noise_line(rng));
        }
        text.push('\n');
    }
    text
}

pub struct GrepFlagLine;

impl Challenge for GrepFlagLine {
    fn id(&self) -> &str {
        "grep_flag_line"
    }

    fn title(&self) -> &str {
        "Search line in file"
    }

    fn description(&self) -> Vec<String> {
        lines(&[
            "A large text file named 'data.txt' has been created in the workspace.",
            "The file contains thousands of short lines of text.",
            "",
            "Exactly one line contains:",
            "  flag:WORD",
            "",
            "The flag is the word after 'flag:'.",
            "Use grep to find the correct line.",
        ])
    }

    fn setup(&self, mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
        let word = pick(ctx.rng, FRUITS);
        let total = ctx.rng.random_range(10_000..=20_000);
        let flag_at = ctx.rng.random_range(0..total);

        write_file(&record.path(DATA_FILE), haystack(ctx.rng, total, Some(flag_at), word))?;

        ctx.seal.seal(&mut record, FLAG_HASH, word);
        Ok(record)
    }

    fn evaluate(&self, record: &Record, answer: Option<&str>, seal: &FlagSeal) -> bool {
        flag_matches(record, answer, seal)
    }
}

const GREP_FILES: usize = 100;

pub struct GrepFlagAcrossFiles;

impl Challenge for GrepFlagAcrossFiles {
    fn id(&self) -> &str {
        "grep_flag_across_files"
    }

    fn title(&self) -> &str {
        "Find a line across many files using grep"
    }

    fn description(&self) -> Vec<String> {
        lines(&[
            "The workspace contains many text files.",
            "Each file contains hundreds of short lines of text.",
            "",
            "Exactly one line across all files starts with:",
            "  flag:WORD",
            "",
            "The flag is the word after 'flag:'.",
            "Use grep to find the correct line.",
        ])
    }

    fn setup(&self, mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
        let word = pick(ctx.rng, FRUITS);
        let flag_file = ctx.rng.random_range(0..GREP_FILES);

        for i in 0..GREP_FILES {
            let count = ctx.rng.random_range(100..=300);
            let flag_at = (i == flag_file).then(|| ctx.rng.random_range(0..count));
            let text = haystack(ctx.rng, count, flag_at, word);
            write_file(&record.path(format!("data_{:03}.txt", i)), text)?;
        }

        ctx.seal.seal(&mut record, FLAG_HASH, word);
        Ok(record)
    }

    fn evaluate(&self, record: &Record, answer: Option<&str>, seal: &FlagSeal) -> bool {
        flag_matches(record, answer, seal)
    }
}
