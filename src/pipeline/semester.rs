//! Canonical academic semester ordering

use std::collections::HashSet;

/// Semester codes in academic order, as used by the default configuration.
pub const CANONICAL_SEMESTERS: [&str; 10] = [
    "2011", "2021", "2111", "2121", "2211", "2221", "2311", "2321", "2411", "2421",
];

/// A fixed total order over known semester codes.
///
/// Codes that are not part of the sequence rank after every known code
/// (rank == `len()`), so sorting keeps them at the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemesterSequence {
    codes: Vec<String>,
}

impl SemesterSequence {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    /// Position of `code` in the sequence, if known
    pub fn position(&self, code: &str) -> Option<usize> {
        self.codes.iter().position(|c| c == code)
    }

    /// Sort key for `code`; unknown codes get `len()`
    pub fn rank(&self, code: &str) -> usize {
        self.position(code).unwrap_or(self.codes.len())
    }

    /// The code following `code`, or `None` when `code` is unknown or last.
    pub fn successor(&self, code: &str) -> Option<&str> {
        let idx = self.position(code)?;
        self.codes.get(idx + 1).map(String::as_str)
    }

    /// Deduplicate `codes` and order them by rank.
    ///
    /// The sort is stable, so unknown codes keep their first-seen order.
    pub fn sort_distinct<I, S>(&self, codes: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut distinct: Vec<String> = codes
            .into_iter()
            .filter_map(|c| {
                let c = c.as_ref();
                seen.insert(c.to_string()).then(|| c.to_string())
            })
            .collect();
        distinct.sort_by_key(|c| self.rank(c));
        distinct
    }
}

impl Default for SemesterSequence {
    fn default() -> Self {
        Self::new(CANONICAL_SEMESTERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_code_ranks_last() {
        let seq = SemesterSequence::default();
        assert_eq!(seq.rank("2011"), 0);
        assert_eq!(seq.rank("2421"), 9);
        assert_eq!(seq.rank("1999"), 10);
    }

    #[test]
    fn test_successor() {
        let seq = SemesterSequence::default();
        assert_eq!(seq.successor("2121"), Some("2211"));
        assert_eq!(seq.successor("2421"), None);
        assert_eq!(seq.successor("9999"), None);
    }

    #[test]
    fn test_sort_distinct_dedups_and_orders() {
        let seq = SemesterSequence::default();
        let sorted = seq.sort_distinct(["2111", "2011", "X2", "2111", "X1", "2021", "X2"]);
        assert_eq!(sorted, vec!["2011", "2021", "2111", "X2", "X1"]);
    }
}
