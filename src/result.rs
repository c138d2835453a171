//! Per-host result records and the aggregated result set.
//!
//! The [`ResultSet`] is the sole contract handed to any presentation or
//! export layer: host, raw text, structured rows, and error/reason, in
//! original host-input order.

use serde::Serialize;

use crate::collector::HostOutput;
use crate::parser::{self, ParseReason, Row};
use crate::templates::TemplateDirectory;

/// The merged record for one host.
///
/// The two error channels are independent: `error` describes a connection
/// failure (raw text absent), `reason` describes why structured rows are
/// absent even though raw text was collected. They are never both set.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionResult {
    /// The host as listed in the input.
    pub host: String,

    /// Raw command output (empty when the connection failed).
    pub raw: String,

    /// Connection error description, absent on success.
    pub error: Option<String>,

    /// Structured rows; empty when parsing failed or no template matched.
    pub rows: Vec<Row>,

    /// Why `rows` is empty despite raw text being collected; absent on
    /// parse success and on connection failure.
    pub reason: Option<ParseReason>,
}

/// Ordered per-host results for one collection run.
///
/// Always exactly one entry per input host, in input order. Read-only to
/// filters; only a new run produces a new set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultSet {
    results: Vec<CollectionResult>,
}

impl ResultSet {
    /// Merge raw collector output with parser output.
    ///
    /// Hosts with a connection error keep empty rows and no reason; hosts
    /// with raw text are parsed against the run's directory snapshot.
    pub fn assemble(
        outputs: Vec<HostOutput>,
        platform: &str,
        command: &str,
        directory: &TemplateDirectory,
    ) -> Self {
        let results = outputs
            .into_iter()
            .map(|output| {
                if output.error.is_some() {
                    return CollectionResult {
                        host: output.host,
                        raw: output.raw,
                        error: output.error,
                        rows: Vec::new(),
                        reason: None,
                    };
                }

                let outcome = parser::parse(platform, command, &output.raw, directory);
                CollectionResult {
                    host: output.host,
                    raw: output.raw,
                    error: None,
                    rows: outcome.rows,
                    reason: outcome.reason,
                }
            })
            .collect();

        Self { results }
    }

    /// All results, in input host order.
    pub fn results(&self) -> &[CollectionResult] {
        &self.results
    }

    /// Iterate the results in input host order.
    pub fn iter(&self) -> impl Iterator<Item = &CollectionResult> {
        self.results.iter()
    }

    /// Number of hosts (== number of input hosts).
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Result for one host by input position.
    pub fn get(&self, index: usize) -> Option<&CollectionResult> {
        self.results.get(index)
    }

    /// Count of hosts whose connection failed.
    pub fn failed_hosts(&self) -> usize {
        self.results.iter().filter(|r| r.error.is_some()).count()
    }

    /// Total structured rows across all hosts.
    pub fn structured_rows(&self) -> usize {
        self.results.iter().map(|r| r.rows.len()).sum()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a CollectionResult;
    type IntoIter = std::slice::Iter<'a, CollectionResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::{FixedRoot, TemplateResolver};
    use std::fs;
    use std::path::Path;

    const TEMPLATE: &str = "\
Value VERSION (\\S+)
Value UPTIME (.+)

Start
  ^Cisco IOS Software.*Version ${VERSION},
  ^\\S+ uptime is ${UPTIME} -> Record
";

    const OUTPUT: &str = "\
Cisco IOS Software, Version 15.2, RELEASE SOFTWARE (fc3)
Switch uptime is 10 days
";

    fn directory(dir: &Path) -> TemplateDirectory {
        fs::write(
            dir.join("index"),
            "cisco_ios_show_version.textfsm, cisco_ios, show version\n",
        )
        .unwrap();
        fs::write(dir.join("cisco_ios_show_version.textfsm"), TEMPLATE).unwrap();
        TemplateResolver::with_providers(vec![Box::new(FixedRoot(dir.into()))]).resolve()
    }

    fn output(host: &str, raw: &str, error: Option<&str>) -> HostOutput {
        HostOutput {
            host: host.to_string(),
            raw: raw.to_string(),
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_assemble_mixed_success_and_timeout() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = directory(tmp.path());

        let outputs = vec![
            output("10.1.1.1", OUTPUT, None),
            output("10.1.1.2", "", Some("timeout")),
        ];
        let set = ResultSet::assemble(outputs, "cisco_ios", "show version", &dir);

        assert_eq!(set.len(), 2);

        let first = set.get(0).unwrap();
        assert_eq!(first.host, "10.1.1.1");
        assert!(first.error.is_none());
        assert!(first.reason.is_none());
        assert_eq!(first.rows[0]["VERSION"], "15.2");
        assert_eq!(first.rows[0]["UPTIME"], "10 days");

        let second = set.get(1).unwrap();
        assert_eq!(second.host, "10.1.1.2");
        assert_eq!(second.error.as_deref(), Some("timeout"));
        assert!(second.rows.is_empty());
        assert!(second.reason.is_none());

        assert_eq!(set.failed_hosts(), 1);
        assert_eq!(set.structured_rows(), 1);
    }

    #[test]
    fn test_unindexed_command_keeps_raw_with_reason() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = directory(tmp.path());

        let outputs = vec![output("10.1.1.1", "NAME: \"Chassis\"", None)];
        let set = ResultSet::assemble(outputs, "cisco_ios", "show inventory", &dir);

        let result = set.get(0).unwrap();
        assert_eq!(result.raw, "NAME: \"Chassis\"");
        assert!(result.rows.is_empty());
        assert_eq!(result.reason, Some(ParseReason::NoMatchingTemplate));
    }

    #[test]
    fn test_unparseable_output_reports_zero_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = directory(tmp.path());

        let outputs = vec![output("10.1.1.1", "completely different format", None)];
        let set = ResultSet::assemble(outputs, "cisco_ios", "show version", &dir);

        assert_eq!(set.get(0).unwrap().reason, Some(ParseReason::ZeroRows));
    }

    #[test]
    fn test_no_silent_empty_rows() {
        // Every entry with empty rows has either a connection error or a
        // parse reason, never neither.
        let tmp = tempfile::tempdir().unwrap();
        let dir = directory(tmp.path());

        let outputs = vec![
            output("a", OUTPUT, None),
            output("b", "", Some("timeout")),
            output("c", "garbage", None),
            output("d", "", None),
        ];
        let set = ResultSet::assemble(outputs, "cisco_ios", "show version", &dir);

        for result in &set {
            if result.rows.is_empty() {
                assert!(
                    result.error.is_some() || result.reason.is_some(),
                    "host {} has empty rows with no explanation",
                    result.host
                );
            } else {
                assert!(result.reason.is_none());
            }
        }
    }

    #[test]
    fn test_assemble_without_templates_degrades() {
        let dir = TemplateDirectory::unavailable();
        let outputs = vec![output("a", "raw text", None)];
        let set = ResultSet::assemble(outputs, "cisco_ios", "show version", &dir);

        let result = set.get(0).unwrap();
        assert_eq!(result.raw, "raw text");
        assert_eq!(result.reason, Some(ParseReason::IndexNotFound));
    }

    #[test]
    fn test_serializes_for_export() {
        let dir = TemplateDirectory::unavailable();
        let set = ResultSet::assemble(
            vec![output("a", "", Some("timeout"))],
            "cisco_ios",
            "show version",
            &dir,
        );
        let json = serde_json::to_string(&set).unwrap();
        assert!(json.contains("\"timeout\""));
    }
}
