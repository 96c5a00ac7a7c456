//! Description templates
//!
//! Lines may reference record fields as `{name}`. Known fields are
//! substituted with their current value; anything else is left untouched.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::record::Record;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid"));

/// Render one template line against `record`
pub fn render_line(template: &str, record: &Record) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match record.field(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Render every line of a description
pub fn render<S: AsRef<str>>(lines: &[S], record: &Record) -> Vec<String> {
    lines.iter().map(|line| render_line(line.as_ref(), record)).collect()
}
