//! Read-only filters and transforms over a result set.
//!
//! Filters produce derived views and never mutate the underlying
//! [`ResultSet`]; applying the same filter twice yields the same view.
//! Substring matching is case-insensitive throughout, mirroring how
//! operators grep CLI output. [`ColumnSplit`] and [`RegexExtract`] turn a
//! filtered line view into tabular data when no template covers the
//! command.

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::parser::Row;
use crate::result::ResultSet;

/// One raw output line, attributed to its host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineView<'a> {
    /// Host the line came from.
    pub host: &'a str,

    /// 1-based line number within the host's raw output.
    pub line_no: usize,

    /// The line text.
    pub line: &'a str,
}

/// Filter over raw output lines.
#[derive(Debug, Default)]
pub struct LineFilter {
    host_contains: Option<String>,
    contains: Option<String>,
    not_contains: Option<String>,
    matches: Option<Regex>,
    not_matches: Option<Regex>,
}

impl LineFilter {
    /// Filter that passes every line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep lines from hosts whose address contains this substring.
    pub fn host_contains(mut self, needle: impl Into<String>) -> Self {
        self.host_contains = Some(needle.into());
        self
    }

    /// Keep lines containing this substring.
    pub fn contains(mut self, needle: impl Into<String>) -> Self {
        self.contains = Some(needle.into());
        self
    }

    /// Drop lines containing this substring.
    pub fn not_contains(mut self, needle: impl Into<String>) -> Self {
        self.not_contains = Some(needle.into());
        self
    }

    /// Keep lines matching this regex (case-insensitive). Invalid patterns
    /// are rejected here, before any filtering happens.
    pub fn matches(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.matches = Some(case_insensitive(pattern)?);
        Ok(self)
    }

    /// Drop lines matching this regex (case-insensitive).
    pub fn not_matches(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.not_matches = Some(case_insensitive(pattern)?);
        Ok(self)
    }

    /// Apply the filter, producing a derived line view.
    pub fn apply<'a>(&self, results: &'a ResultSet) -> Vec<LineView<'a>> {
        let mut views = Vec::new();

        for result in results {
            if let Some(ref needle) = self.host_contains {
                if !contains_ci(&result.host, needle) {
                    continue;
                }
            }

            for (i, line) in result.raw.lines().enumerate() {
                if let Some(ref needle) = self.contains {
                    if !contains_ci(line, needle) {
                        continue;
                    }
                }
                if let Some(ref needle) = self.not_contains {
                    if contains_ci(line, needle) {
                        continue;
                    }
                }
                if let Some(ref re) = self.matches {
                    if !re.is_match(line) {
                        continue;
                    }
                }
                if let Some(ref re) = self.not_matches {
                    if re.is_match(line) {
                        continue;
                    }
                }

                views.push(LineView {
                    host: &result.host,
                    line_no: i + 1,
                    line,
                });
            }
        }

        views
    }
}

/// One structured row, attributed to its host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView<'a> {
    /// Host the row came from.
    pub host: &'a str,

    /// The structured row.
    pub row: &'a Row,
}

/// Filter over structured rows. Only meaningful for hosts with non-empty
/// rows; hosts without rows simply contribute nothing to the view.
#[derive(Debug, Default)]
pub struct RowFilter {
    column: Option<String>,
    equals: Option<String>,
    contains: Option<String>,
}

impl RowFilter {
    /// Filter that passes every row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict matching to one named column. Without this, a row matches
    /// if any of its columns does.
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.column = Some(name.into());
        self
    }

    /// Keep rows where the value equals this exactly.
    pub fn equals(mut self, value: impl Into<String>) -> Self {
        self.equals = Some(value.into());
        self
    }

    /// Keep rows where the value contains this substring (case-insensitive).
    pub fn contains(mut self, needle: impl Into<String>) -> Self {
        self.contains = Some(needle.into());
        self
    }

    /// Apply the filter, producing a derived row view.
    pub fn apply<'a>(&self, results: &'a ResultSet) -> Vec<RowView<'a>> {
        let mut views = Vec::new();

        for result in results {
            for row in &result.rows {
                if self.row_matches(row) {
                    views.push(RowView {
                        host: &result.host,
                        row,
                    });
                }
            }
        }

        views
    }

    fn row_matches(&self, row: &Row) -> bool {
        if self.equals.is_none() && self.contains.is_none() {
            return true;
        }

        match self.column {
            Some(ref column) => row
                .get(column)
                .is_some_and(|value| self.value_matches(value)),
            None => row.values().any(|value| self.value_matches(value)),
        }
    }

    fn value_matches(&self, value: &str) -> bool {
        if let Some(ref expected) = self.equals {
            if value != expected {
                return false;
            }
        }
        if let Some(ref needle) = self.contains {
            if !contains_ci(value, needle) {
                return false;
            }
        }
        true
    }
}

/// One filtered line split into positional columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitView<'a> {
    /// Host the line came from.
    pub host: &'a str,

    /// 1-based line number within the host's raw output.
    pub line_no: usize,

    /// The original line text.
    pub line: &'a str,

    /// Positional columns, leftmost first.
    pub columns: Vec<&'a str>,
}

/// Splits lines into positional columns by delimiter, turning a filtered
/// line view into tabular data without a template.
#[derive(Debug, Clone)]
pub struct ColumnSplit {
    delimiter: Delimiter,
    max_splits: usize,
}

#[derive(Debug, Clone)]
enum Delimiter {
    Whitespace,
    Literal(String),
}

impl ColumnSplit {
    /// Split on runs of whitespace.
    pub fn whitespace() -> Self {
        Self {
            delimiter: Delimiter::Whitespace,
            max_splits: 0,
        }
    }

    /// Split on a literal delimiter. An empty delimiter produces no output.
    pub fn on(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: Delimiter::Literal(delimiter.into()),
            max_splits: 0,
        }
    }

    /// Cap the number of splits; the rest of the line stays in the last
    /// column unsplit. Zero (the default) means unlimited.
    pub fn with_max_splits(mut self, max_splits: usize) -> Self {
        self.max_splits = max_splits;
        self
    }

    /// Split every line in the view. Rows keep their column count; short
    /// lines simply yield fewer columns.
    pub fn apply<'a>(&self, lines: &[LineView<'a>]) -> Vec<SplitView<'a>> {
        if let Delimiter::Literal(ref d) = self.delimiter {
            if d.is_empty() {
                return Vec::new();
            }
        }

        lines
            .iter()
            .map(|view| SplitView {
                host: view.host,
                line_no: view.line_no,
                line: view.line,
                columns: self.split(view.line),
            })
            .collect()
    }

    fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match self.delimiter {
            Delimiter::Whitespace => split_whitespace_limited(line, self.max_splits),
            Delimiter::Literal(ref d) => {
                if self.max_splits > 0 {
                    line.splitn(self.max_splits + 1, d.as_str()).collect()
                } else {
                    line.split(d.as_str()).collect()
                }
            }
        }
    }
}

/// Split on whitespace runs, keeping at most `max_splits` boundaries when
/// non-zero; the remainder keeps its internal spacing.
fn split_whitespace_limited(line: &str, max_splits: usize) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = line.trim_start();

    while !rest.is_empty() {
        if max_splits > 0 && parts.len() == max_splits {
            parts.push(rest.trim_end());
            return parts;
        }
        match rest.find(char::is_whitespace) {
            Some(end) => {
                parts.push(&rest[..end]);
                rest = rest[end..].trim_start();
            }
            None => {
                parts.push(rest);
                rest = "";
            }
        }
    }

    parts
}

/// One filtered line with named-group captures as columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractView<'a> {
    /// Host the line came from.
    pub host: &'a str,

    /// 1-based line number within the host's raw output.
    pub line_no: usize,

    /// The original line text.
    pub line: &'a str,

    /// Captured named groups; only groups that matched are present.
    pub captures: Row,
}

/// Extracts named capture groups from lines into structured columns, for
/// output no template covers. Lines the pattern does not match contribute
/// nothing to the view.
#[derive(Debug)]
pub struct RegexExtract {
    pattern: Regex,
}

impl RegexExtract {
    /// Compile a named-group pattern (case-insensitive). Invalid patterns
    /// are rejected here, before any extraction happens.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: case_insensitive(pattern)?,
        })
    }

    /// Extract captures from every matching line, first match per line.
    pub fn apply<'a>(&self, lines: &[LineView<'a>]) -> Vec<ExtractView<'a>> {
        let names: Vec<&str> = self.pattern.capture_names().flatten().collect();
        let mut views = Vec::new();

        for view in lines {
            let Some(caps) = self.pattern.captures(view.line) else {
                continue;
            };

            let mut captures = Row::new();
            for name in &names {
                if let Some(m) = caps.name(name) {
                    captures.insert((*name).to_string(), m.as_str().to_string());
                }
            }
            if captures.is_empty() {
                continue;
            }

            views.push(ExtractView {
                host: view.host,
                line_no: view.line_no,
                line: view.line,
                captures,
            });
        }

        views
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

fn case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::HostOutput;
    use crate::templates::TemplateDirectory;

    fn sample_set() -> ResultSet {
        let outputs = vec![
            HostOutput {
                host: "core-sw-01".to_string(),
                raw: "GigabitEthernet0/1 up up\nGigabitEthernet0/2 down down\n".to_string(),
                error: None,
            },
            HostOutput {
                host: "edge-rtr-01".to_string(),
                raw: "Vlan10 up up\n".to_string(),
                error: None,
            },
        ];
        // No templates: raw lines are all these tests need.
        ResultSet::assemble(
            outputs,
            "cisco_ios",
            "show ip interface brief",
            &TemplateDirectory::unavailable(),
        )
    }

    fn structured_set() -> ResultSet {
        use std::fs;
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("index"),
            "cisco_ios_show_ip_interface_brief.textfsm, cisco_ios, show ip interface brief\n",
        )
        .unwrap();
        fs::write(
            tmp.path().join("cisco_ios_show_ip_interface_brief.textfsm"),
            "Value INTERFACE (\\S+)\nValue STATUS (up|down)\n\nStart\n  ^${INTERFACE} ${STATUS} -> Record\n",
        )
        .unwrap();
        let dir = crate::templates::TemplateResolver::with_providers(vec![Box::new(
            crate::templates::FixedRoot(tmp.path().into()),
        )])
        .resolve();

        let outputs = vec![
            HostOutput {
                host: "core-sw-01".to_string(),
                raw: "Gi0/1 up\nGi0/2 down\n".to_string(),
                error: None,
            },
            HostOutput {
                host: "edge-rtr-01".to_string(),
                raw: "Vlan10 up\n".to_string(),
                error: None,
            },
        ];
        ResultSet::assemble(outputs, "cisco_ios", "show ip interface brief", &dir)
    }

    #[test]
    fn test_line_filter_contains() {
        let set = sample_set();
        let views = LineFilter::new().contains("DOWN").apply(&set);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].host, "core-sw-01");
        assert_eq!(views[0].line_no, 2);
    }

    #[test]
    fn test_line_filter_not_contains() {
        let set = sample_set();
        let views = LineFilter::new().not_contains("down").apply(&set);
        assert_eq!(views.len(), 2);
    }

    #[test]
    fn test_line_filter_host_and_regex() {
        let set = sample_set();
        let views = LineFilter::new()
            .host_contains("core")
            .matches(r"^gigabitethernet\d+/\d+")
            .unwrap()
            .apply(&set);
        assert_eq!(views.len(), 2);
        assert!(views.iter().all(|v| v.host == "core-sw-01"));
    }

    #[test]
    fn test_line_filter_invalid_regex_rejected() {
        assert!(LineFilter::new().matches("[unclosed").is_err());
    }

    #[test]
    fn test_line_filter_idempotent() {
        let set = sample_set();
        let filter = LineFilter::new().contains("up");
        let once = filter.apply(&set);
        let twice = filter.apply(&set);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_does_not_mutate_results() {
        let set = sample_set();
        let before: Vec<String> = set.iter().map(|r| r.raw.clone()).collect();
        let _ = LineFilter::new().contains("down").apply(&set);
        let after: Vec<String> = set.iter().map(|r| r.raw.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_row_filter_named_column_equality() {
        let set = structured_set();
        let views = RowFilter::new().column("STATUS").equals("down").apply(&set);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].row["INTERFACE"], "Gi0/2");
    }

    #[test]
    fn test_row_filter_any_column_substring() {
        let set = structured_set();
        let views = RowFilter::new().contains("vlan").apply(&set);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].host, "edge-rtr-01");
    }

    #[test]
    fn test_row_filter_without_criteria_passes_all() {
        let set = structured_set();
        let views = RowFilter::new().apply(&set);
        assert_eq!(views.len(), 3);
    }

    #[test]
    fn test_row_filter_missing_column_matches_nothing() {
        let set = structured_set();
        let views = RowFilter::new().column("VRF").equals("mgmt").apply(&set);
        assert!(views.is_empty());
    }

    fn line<'a>(host: &'a str, line_no: usize, text: &'a str) -> LineView<'a> {
        LineView {
            host,
            line_no,
            line: text,
        }
    }

    #[test]
    fn test_split_whitespace_into_columns() {
        let lines = vec![line("core-sw-01", 1, "Gi0/1   10.0.0.1  up    up")];
        let views = ColumnSplit::whitespace().apply(&lines);

        assert_eq!(views.len(), 1);
        assert_eq!(views[0].columns, vec!["Gi0/1", "10.0.0.1", "up", "up"]);
        assert_eq!(views[0].host, "core-sw-01");
        assert_eq!(views[0].line_no, 1);
    }

    #[test]
    fn test_split_whitespace_max_splits_keeps_remainder() {
        let lines = vec![line("h", 1, "Gi0/1 up   link to   core")];
        let views = ColumnSplit::whitespace().with_max_splits(2).apply(&lines);

        assert_eq!(views[0].columns, vec!["Gi0/1", "up", "link to   core"]);
    }

    #[test]
    fn test_split_literal_delimiter() {
        let lines = vec![line("h", 1, "eth0,up,1500")];
        let views = ColumnSplit::on(",").apply(&lines);
        assert_eq!(views[0].columns, vec!["eth0", "up", "1500"]);

        let capped = ColumnSplit::on(",").with_max_splits(1).apply(&lines);
        assert_eq!(capped[0].columns, vec!["eth0", "up,1500"]);
    }

    #[test]
    fn test_split_empty_delimiter_yields_nothing() {
        let lines = vec![line("h", 1, "anything")];
        assert!(ColumnSplit::on("").apply(&lines).is_empty());
    }

    #[test]
    fn test_split_ragged_lines_keep_own_counts() {
        let lines = vec![line("h", 1, "a b c"), line("h", 2, "d")];
        let views = ColumnSplit::whitespace().apply(&lines);
        assert_eq!(views[0].columns.len(), 3);
        assert_eq!(views[1].columns.len(), 1);
    }

    #[test]
    fn test_regex_extract_named_groups() {
        let lines = vec![
            line("core-sw-01", 1, "GigabitEthernet0/1 10.0.0.1 up"),
            line("core-sw-01", 2, "--- separator ---"),
            line("edge-rtr-01", 1, "Vlan10 10.0.10.1 down"),
        ];

        let extract =
            RegexExtract::new(r"^(?P<interface>\S+)\s+(?P<ip>\d+\.\d+\.\d+\.\d+)\s+(?P<status>\S+)$")
                .unwrap();
        let views = extract.apply(&lines);

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].captures["interface"], "GigabitEthernet0/1");
        assert_eq!(views[0].captures["ip"], "10.0.0.1");
        assert_eq!(views[1].host, "edge-rtr-01");
        assert_eq!(views[1].captures["status"], "down");
    }

    #[test]
    fn test_regex_extract_is_case_insensitive() {
        let lines = vec![line("h", 1, "VLAN10 active")];
        let extract = RegexExtract::new(r"^(?P<name>vlan\d+)\s+(?P<state>\S+)").unwrap();
        let views = extract.apply(&lines);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].captures["name"], "VLAN10");
    }

    #[test]
    fn test_regex_extract_invalid_pattern_rejected() {
        assert!(RegexExtract::new("(?P<bad>[unclosed").is_err());
    }

    #[test]
    fn test_regex_extract_composes_with_line_filter() {
        let set = sample_set();
        let lines = LineFilter::new().contains("up").apply(&set);
        let extract = RegexExtract::new(r"^(?P<interface>\S+)\s").unwrap();
        let views = extract.apply(&lines);

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].captures["interface"], "GigabitEthernet0/1");
        assert_eq!(views[1].captures["interface"], "Vlan10");
    }
}
