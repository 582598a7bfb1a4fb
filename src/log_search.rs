//! Line-oriented regex search over raw job logs.

use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogMatch {
    /// 1-based line number
    pub line_number: usize,
    pub line: String,
    pub before: Vec<String>,
    pub after: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LogSearch {
    pattern: Regex,
    context: usize,
    max_matches: usize,
}

impl LogSearch {
    pub fn new(pattern: &str, ignore_case: bool) -> Result<Self, regex::Error> {
        let pattern = if ignore_case {
            Regex::new(&format!("(?i){pattern}"))?
        } else {
            Regex::new(pattern)?
        };

        Ok(Self {
            pattern,
            context: 0,
            max_matches: usize::MAX,
        })
    }

    #[must_use]
    pub fn with_context(mut self, lines: usize) -> Self {
        self.context = lines;
        self
    }

    #[must_use]
    pub fn with_max_matches(mut self, max: usize) -> Self {
        self.max_matches = max;
        self
    }

    pub fn search(&self, text: &str) -> Vec<LogMatch> {
        let lines: Vec<&str> = text.lines().collect();

        lines
            .iter()
            .enumerate()
            .filter(|(_, line)| self.pattern.is_match(line))
            .take(self.max_matches)
            .map(|(idx, line)| {
                let start = idx.saturating_sub(self.context);
                let end = (idx + 1 + self.context).min(lines.len());
                LogMatch {
                    line_number: idx + 1,
                    line: (*line).to_string(),
                    before: lines[start..idx].iter().map(|l| (*l).to_string()).collect(),
                    after: lines[idx + 1..end].iter().map(|l| (*l).to_string()).collect(),
                }
            })
            .collect()
    }
}
