use regex::Regex;

use crate::api::Patch;

/// Added line calling a sleep function with a literal duration. Lines starting with a comment
/// marker before the call are ignored.
pub const DEFAULT_SLEEP_PATTERN: &str = r"^\+[^#/]*(?i:sleep)[ (]+[0-9]+[ )]*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Clean,
    HardcodedSleep { line: String },
}

impl Verdict {
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Clean)
    }
}

#[derive(Debug, Clone)]
pub struct SleepClassifier {
    pattern: Regex,
}

impl SleepClassifier {
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }

    /// Matches the pattern against each line of the patch separately, so that additions are
    /// found anywhere in a multi-line diff.
    pub fn classify(&self, patch: &Patch) -> Verdict {
        match patch.hunk_lines().find(|line| self.pattern.is_match(line)) {
            Some(line) => Verdict::HardcodedSleep {
                line: line.to_owned(),
            },
            None => Verdict::Clean,
        }
    }
}

impl Default for SleepClassifier {
    fn default() -> Self {
        Self::new(Regex::new(DEFAULT_SLEEP_PATTERN).expect("default sleep pattern is valid"))
    }
}
