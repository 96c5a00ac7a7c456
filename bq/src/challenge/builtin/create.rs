//! Creation challenges: mkdir and echo redirection

use eyre::Result;

use super::{GREEK, pick, read_text, sample, texts, write_file};
use crate::challenge::{Namespace, SetupContext};
use crate::record::Record;
use crate::seal::FlagSeal;

const ECHO_FILE: &str = "flag.txt";
const ECHO_WORDS: &[&str] = &["apple", "banana", "orange", "grape", "lemon"];

// ===== mkdir_single_directory =====

pub fn mkdir_single_directory() -> Namespace {
    Namespace::new("mkdir_single_directory")
        .flag("requires_flag_mkdir_single_directory", false)
        .text("title_mkdir_single_directory", "Create a directory")
        .lines(
            "description_mkdir_single_directory",
            &[
                "Create a single directory inside the workspace named: {dir_name}.",
                "The flag is the presence of this directory.",
            ],
        )
        .setup("setup_mkdir_single_directory", setup_mkdir_single_directory)
        .check("check_mkdir_single_directory", check_mkdir_single_directory)
}

fn setup_mkdir_single_directory(mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
    record.set_text("dir_name", pick(ctx.rng, GREEK));
    Ok(record)
}

fn check_mkdir_single_directory(record: &Record, _answer: Option<&str>, _seal: &FlagSeal) -> bool {
    texts(record, ["dir_name"]).is_some_and(|[name]| record.path(name).is_dir())
}

// ===== mkdir_nested_directories =====

pub fn mkdir_nested_directories() -> Namespace {
    Namespace::new("mkdir_nested_directories")
        .flag("requires_flag_mkdir_nested_directories", false)
        .text("title_mkdir_nested_directories", "Create nested directories")
        .lines(
            "description_mkdir_nested_directories",
            &[
                "Create three directories, one inside another, inside the workspace.",
                "The directories must be named (in this order): {dir1}/{dir2}/{dir3}.",
                "The flag is the presence of this directory structure.",
            ],
        )
        .setup("setup_mkdir_nested_directories", setup_mkdir_nested_directories)
        .check("check_mkdir_nested_directories", check_mkdir_nested_directories)
}

fn setup_mkdir_nested_directories(mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
    let [d1, d2, d3] = sample::<3>(ctx.rng, GREEK);
    record.set_text("dir1", d1);
    record.set_text("dir2", d2);
    record.set_text("dir3", d3);
    Ok(record)
}

fn check_mkdir_nested_directories(record: &Record, _answer: Option<&str>, _seal: &FlagSeal) -> bool {
    texts(record, ["dir1", "dir2", "dir3"]).is_some_and(|[d1, d2, d3]| record.path(d1).join(d2).join(d3).is_dir())
}

// ===== echo_redirect_single_word =====

pub fn echo_redirect_single_word() -> Namespace {
    Namespace::new("echo_redirect_single_word")
        .text("title_echo_redirect_single_word", "Create a file using echo")
        .lines(
            "description_echo_redirect_single_word",
            &[
                "Use the echo command with output redirection.",
                "Create a file named 'flag.txt' containing the word: {echo_word}.",
                "The flag is this single word.",
            ],
        )
        .setup("setup_echo_redirect_single_word", setup_echo_redirect_single_word)
        .check("check_echo_redirect_single_word", check_echo_redirect_single_word)
}

fn setup_echo_redirect_single_word(mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
    record.set_text("echo_word", pick(ctx.rng, ECHO_WORDS));
    Ok(record)
}

/// The file must hold the word and the submitted flag must be the word
fn check_echo_redirect_single_word(record: &Record, answer: Option<&str>, _seal: &FlagSeal) -> bool {
    let (Some([word]), Some(answer)) = (texts(record, ["echo_word"]), answer) else {
        return false;
    };
    read_text(&record.path(ECHO_FILE)).is_some_and(|content| content.trim() == word && answer.trim() == word)
}

// ===== echo_redirect_two_words =====

pub fn echo_redirect_two_words() -> Namespace {
    Namespace::new("echo_redirect_two_words")
        .flag("requires_flag_echo_redirect_two_words", false)
        .text("title_echo_redirect_two_words", "Create a file using echo (two words)")
        .lines(
            "description_echo_redirect_two_words",
            &[
                "Use the echo command with output redirection.",
                "Create a file named 'flag.txt' containing the text: \"{echo_words}\".",
                "The two words must be separated by exactly 3 (three) spaces.",
                "Hint: you will need quotes in the command line.",
                "The flag is the exact content of the file.",
            ],
        )
        .setup("setup_echo_redirect_two_words", setup_echo_redirect_two_words)
        .check("check_echo_redirect_two_words", check_echo_redirect_two_words)
}

fn setup_echo_redirect_two_words(mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
    let [w1, w2] = sample::<2>(ctx.rng, ECHO_WORDS);
    record.set_text("echo_words", format!("{}   {}", w1, w2));
    Ok(record)
}

/// File content must match; a submitted answer, if any, must match too
fn check_echo_redirect_two_words(record: &Record, answer: Option<&str>, _seal: &FlagSeal) -> bool {
    let Some([expected]) = texts(record, ["echo_words"]) else {
        return false;
    };
    let Some(content) = read_text(&record.path(ECHO_FILE)) else {
        return false;
    };
    let content = content.trim();
    content == expected && answer.is_none_or(|answer| answer == content)
}

// ===== echo_redirect_append_two_lines =====

pub fn echo_redirect_append_two_lines() -> Namespace {
    Namespace::new("echo_redirect_append_two_lines")
        .flag("requires_flag_echo_redirect_append_two_lines", false)
        .text("title_echo_redirect_append_two_lines", "Append to a file")
        .lines(
            "description_echo_redirect_append_two_lines",
            &[
                "The file 'flag.txt' has been created in the workspace.",
                "It contains exactly one line:",
                "  '{echo_word_1}'",
                "",
                "Append a second line so that the file contains exactly two lines.",
                "The second line must be: '{echo_word_2}'",
                "The flag is the exact content of the file.",
            ],
        )
        .setup("setup_echo_redirect_append_two_lines", setup_echo_redirect_append_two_lines)
        .check("check_echo_redirect_append_two_lines", check_echo_redirect_append_two_lines)
}

fn setup_echo_redirect_append_two_lines(mut record: Record, ctx: &mut SetupContext<'_>) -> Result<Record> {
    let [w1, w2] = sample::<2>(ctx.rng, ECHO_WORDS);
    write_file(&record.path(ECHO_FILE), format!("{}\n", w1))?;
    record.set_text("echo_word_1", w1);
    record.set_text("echo_word_2", w2);
    Ok(record)
}

fn check_echo_redirect_append_two_lines(record: &Record, answer: Option<&str>, _seal: &FlagSeal) -> bool {
    let Some([w1, w2]) = texts(record, ["echo_word_1", "echo_word_2"]) else {
        return false;
    };
    let Some(content) = read_text(&record.path(ECHO_FILE)) else {
        return false;
    };
    let expected = format!("{}\n{}", w1, w2);
    let content = content.trim_end_matches('\n');
    content == expected && answer.is_none_or(|answer| answer == content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::builtin::testing::{builtin, prepare};
    use std::fs;

    #[test]
    fn test_mkdir_single_directory() {
        let challenge = builtin("mkdir_single_directory");
        let p = prepare(challenge.as_ref(), 21);
        assert!(!challenge.requires_flag());
        assert!(!challenge.evaluate(&p.record, None, &p.seal));

        let name = p.record.text("dir_name").unwrap();
        fs::write(p.ws().join(name), "not a dir").unwrap();
        assert!(!challenge.evaluate(&p.record, None, &p.seal));

        fs::remove_file(p.ws().join(name)).unwrap();
        fs::create_dir(p.ws().join(name)).unwrap();
        assert!(challenge.evaluate(&p.record, None, &p.seal));
    }

    #[test]
    fn test_mkdir_nested_directories() {
        let challenge = builtin("mkdir_nested_directories");
        let p = prepare(challenge.as_ref(), 22);
        let d1 = p.record.text("dir1").unwrap();
        let d2 = p.record.text("dir2").unwrap();
        let d3 = p.record.text("dir3").unwrap();

        fs::create_dir_all(p.ws().join(d3).join(d2).join(d1)).unwrap();
        assert!(!challenge.evaluate(&p.record, None, &p.seal));

        fs::create_dir_all(p.ws().join(d1).join(d2).join(d3)).unwrap();
        assert!(challenge.evaluate(&p.record, None, &p.seal));
    }

    #[test]
    fn test_echo_redirect_single_word() {
        let challenge = builtin("echo_redirect_single_word");
        let p = prepare(challenge.as_ref(), 23);
        assert!(challenge.requires_flag());
        let word = p.record.text("echo_word").unwrap().to_string();

        assert!(!challenge.evaluate(&p.record, Some(&word), &p.seal));

        fs::write(p.ws().join(ECHO_FILE), format!("{}\n", word)).unwrap();
        assert!(challenge.evaluate(&p.record, Some(&word), &p.seal));
        assert!(!challenge.evaluate(&p.record, Some("wrongword"), &p.seal));
        assert!(!challenge.evaluate(&p.record, None, &p.seal));
    }

    #[test]
    fn test_echo_redirect_two_words() {
        let challenge = builtin("echo_redirect_two_words");
        let p = prepare(challenge.as_ref(), 24);
        let expected = p.record.text("echo_words").unwrap().to_string();
        assert_eq!(expected.matches("   ").count(), 1);

        let single = expected.split_whitespace().collect::<Vec<_>>().join(" ");
        fs::write(p.ws().join(ECHO_FILE), format!("{}\n", single)).unwrap();
        assert!(!challenge.evaluate(&p.record, None, &p.seal));

        fs::write(p.ws().join(ECHO_FILE), format!("{}\n", expected)).unwrap();
        assert!(challenge.evaluate(&p.record, None, &p.seal));
        assert!(challenge.evaluate(&p.record, Some(&expected), &p.seal));
        assert!(!challenge.evaluate(&p.record, Some(&single), &p.seal));
    }

    #[test]
    fn test_echo_redirect_append_two_lines() {
        let challenge = builtin("echo_redirect_append_two_lines");
        let p = prepare(challenge.as_ref(), 25);
        let w1 = p.record.text("echo_word_1").unwrap().to_string();
        let w2 = p.record.text("echo_word_2").unwrap().to_string();

        let file = p.ws().join(ECHO_FILE);
        assert_eq!(fs::read_to_string(&file).unwrap(), format!("{}\n", w1));
        assert!(!challenge.evaluate(&p.record, None, &p.seal));

        // overwriting instead of appending loses the first line
        fs::write(&file, format!("{}\n", w2)).unwrap();
        assert!(!challenge.evaluate(&p.record, None, &p.seal));

        fs::write(&file, format!("{}\n{}\n", w1, w2)).unwrap();
        assert!(challenge.evaluate(&p.record, None, &p.seal));
        assert!(challenge.evaluate(&p.record, Some(&format!("{}\n{}", w1, w2)), &p.seal));
        assert!(!challenge.evaluate(&p.record, Some(&w2), &p.seal));
    }
}
