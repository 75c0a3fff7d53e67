//! Line-set difference between two URL lists
//!
//! Used to compare two inventories (for example the internal pages of two
//! crawls). Lines are trimmed and blank lines are ignored; order and
//! duplicates do not matter.

use crate::output::traits::{OutputError, OutputResult};
use std::collections::BTreeSet;
use std::path::Path;

/// Lines present in one list but not the other
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlListDiff {
    pub only_in_first: Vec<String>,
    pub only_in_second: Vec<String>,
}

impl UrlListDiff {
    pub fn is_empty(&self) -> bool {
        self.only_in_first.is_empty() && self.only_in_second.is_empty()
    }

    /// Renders both directions under the given names
    pub fn render(&self, first: &str, second: &str) -> String {
        let mut out = String::new();
        for (from, to, lines) in [
            (first, second, &self.only_in_first),
            (second, first, &self.only_in_second),
        ] {
            out.push_str(&format!("unmatched urls between {} and {}\n", from, to));
            for line in lines {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }
}

fn line_set(content: &str) -> BTreeSet<&str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

pub fn diff_url_lists(first: &str, second: &str) -> UrlListDiff {
    let a = line_set(first);
    let b = line_set(second);

    UrlListDiff {
        only_in_first: a.difference(&b).map(|s| s.to_string()).collect(),
        only_in_second: b.difference(&a).map(|s| s.to_string()).collect(),
    }
}

pub fn diff_files(first: &Path, second: &Path) -> OutputResult<UrlListDiff> {
    let a = std::fs::read_to_string(first).map_err(|e| OutputError::read(first, e))?;
    let b = std::fs::read_to_string(second).map_err(|e| OutputError::read(second, e))?;
    Ok(diff_url_lists(&a, &b))
}
