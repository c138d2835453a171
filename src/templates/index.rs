//! Template index file parsing and lookup.
//!
//! The index maps `(platform, command)` pairs to template filenames, one
//! entry per line: `<template-filename>, <platform>, <command text>`.
//! Lookup uses exact-string matching after normalization; there is no
//! wildcard or regex matching on the command.

use indexmap::IndexMap;
use log::warn;
use serde::Serialize;

/// One line of the template index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateIndexEntry {
    /// Template filename relative to the directory root.
    pub template: String,

    /// Template platform identifier.
    pub platform: String,

    /// Command text as listed in the index.
    pub command: String,
}

/// Parsed template index with normalized first-wins lookup.
#[derive(Debug, Clone, Default)]
pub struct TemplateIndex {
    /// Normalized (platform, command) -> entry. Insertion-ordered so
    /// duplicate index lines resolve deterministically to the first listed.
    entries: IndexMap<(String, String), TemplateIndexEntry>,

    /// Count of malformed lines skipped during parsing.
    skipped: usize,
}

impl TemplateIndex {
    /// Parse an index file body.
    ///
    /// Blank and `#`-prefixed lines are ignored. Malformed lines (not three
    /// comma-separated fields, or any field empty) are skipped and counted,
    /// never fatal.
    pub fn parse(text: &str) -> Self {
        let mut index = Self::default();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() != 3 || fields.iter().any(|f| f.is_empty()) {
                warn!("skipping malformed index line: {line:?}");
                index.skipped += 1;
                continue;
            }

            let entry = TemplateIndexEntry {
                template: fields[0].to_string(),
                platform: fields[1].to_string(),
                command: fields[2].to_string(),
            };

            let key = (normalize(&entry.platform), normalize(&entry.command));
            // First listed wins on duplicates.
            index.entries.entry(key).or_insert(entry);
        }

        index
    }

    /// Look up the template for a platform/command pair.
    pub fn find(&self, platform: &str, command: &str) -> Option<&TemplateIndexEntry> {
        self.entries
            .get(&(normalize(platform), normalize(command)))
    }

    /// All entries in index-file order (duplicates removed).
    pub fn entries(&self) -> impl Iterator<Item = &TemplateIndexEntry> {
        self.entries.values()
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of malformed lines skipped during parsing.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

/// Normalize a platform or command string for lookup: trim, collapse
/// internal whitespace to single spaces, lowercase (ASCII).
fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = "\
# First-match wins
cisco_ios_show_version.textfsm, cisco_ios, show version
cisco_ios_show_ip_interface_brief.textfsm, cisco_ios, show ip interface brief

arista_eos_show_version.textfsm, arista_eos, show version
";

    #[test]
    fn test_parse_and_find() {
        let index = TemplateIndex::parse(INDEX);
        assert_eq!(index.len(), 3);
        assert_eq!(index.skipped(), 0);

        let entry = index.find("cisco_ios", "show version").unwrap();
        assert_eq!(entry.template, "cisco_ios_show_version.textfsm");
    }

    #[test]
    fn test_find_normalizes_command() {
        let index = TemplateIndex::parse(INDEX);
        assert!(index.find("cisco_ios", "  Show   Version ").is_some());
        assert!(index.find("CISCO_IOS", "show version").is_some());
    }

    #[test]
    fn test_no_entry_for_unlisted_command() {
        let index = TemplateIndex::parse(INDEX);
        assert!(index.find("cisco_ios", "show inventory").is_none());
        assert!(index.find("cisco_nxos", "show version").is_none());
    }

    #[test]
    fn test_malformed_lines_skipped_and_counted() {
        let text = "\
good.textfsm, cisco_ios, show version
this line has no commas
only_two.textfsm, cisco_ios
, cisco_ios, show clock
";
        let index = TemplateIndex::parse(text);
        assert_eq!(index.len(), 1);
        assert_eq!(index.skipped(), 3);
    }

    #[test]
    fn test_duplicate_first_listed_wins() {
        let text = "\
first.textfsm, cisco_ios, show version
second.textfsm, cisco_ios, show version
";
        let index = TemplateIndex::parse(text);
        assert_eq!(index.len(), 1);
        assert_eq!(
            index.find("cisco_ios", "show version").unwrap().template,
            "first.textfsm"
        );
    }

    #[test]
    fn test_exact_match_not_prefix() {
        let index = TemplateIndex::parse(INDEX);
        assert!(index.find("cisco_ios", "show ip interface").is_none());
    }
}
