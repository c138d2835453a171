//! Template directory resolution and index lookup.
//!
//! A template directory is any filesystem root containing an `index` file
//! mapping `(platform, command)` pairs to TextFSM template files. The
//! resolver tries a fixed priority list of candidate roots and the first one
//! with a readable index wins; total failure degrades to an empty directory
//! rather than an error so raw-text collection keeps working without
//! templates.

mod index;
mod resolver;

pub use index::{TemplateIndex, TemplateIndexEntry};
pub use resolver::{
    BundleRoot, CandidateRoot, FixedRoot, PackagedRoot, TemplateResolver, WorkingDirRoot,
};

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Name of the index file inside a template directory.
pub const INDEX_FILE: &str = "index";

/// Environment variable naming an explicit template directory override.
pub const TEMPLATE_DIR_ENV: &str = "NET_TEXTFSM";

/// A resolved template directory: a snapshot of one resolution pass.
///
/// Immutable once built; a collection run shares one snapshot (behind `Arc`)
/// across all of its parsing tasks, so a concurrent `refresh()` or archive
/// upload never races in-flight parses.
#[derive(Debug, Clone, Default)]
pub struct TemplateDirectory {
    /// Resolved filesystem root, if any candidate produced one.
    pub root: Option<PathBuf>,

    /// Whether a readable index file was found at the root.
    pub index_present: bool,

    /// Parsed index (empty when `index_present` is false).
    pub index: TemplateIndex,
}

impl TemplateDirectory {
    /// The degraded directory used when no candidate root resolves.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Absolute path of a template file under this root.
    pub fn template_path(&self, template: &str) -> Option<PathBuf> {
        self.root.as_ref().map(|root| root.join(template))
    }
}

/// A template file discovered under the resolved root, with platform and
/// command inferred from the filename for diagnostic display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    /// Template filename.
    pub file: String,

    /// Inferred platform identifier.
    pub platform: String,

    /// Inferred command text.
    pub command: String,

    /// Containing folder relative to the template root.
    pub folder: String,
}

/// Infer `(platform, command)` from a conventional template filename like
/// `cisco_ios_show_ip_interface_brief.textfsm`.
///
/// The `_show_` marker splits platform from command when present; otherwise
/// the first underscore-separated token is taken as the platform.
pub(crate) fn infer_platform_command(filename: &str) -> (String, String) {
    let stem = filename
        .strip_suffix(".textfsm")
        .unwrap_or(filename)
        .to_ascii_lowercase();

    if let Some(pos) = stem.find("_show_") {
        let platform = stem[..pos].to_string();
        let command = stem[pos + 1..].replace('_', " ");
        return (platform, command);
    }

    match stem.split_once('_') {
        Some((platform, rest)) => (platform.to_string(), rest.replace('_', " ")),
        None => (stem, String::new()),
    }
}

/// Scan a directory tree for the shallowest folder containing an index file.
///
/// Shared by archive upload (scanning an extraction root) and resolver tests.
pub(crate) fn find_index_root(base: &Path) -> Option<PathBuf> {
    let mut candidates = Vec::new();
    collect_index_dirs(base, &mut candidates);
    candidates.sort_by_key(|p| p.components().count());
    candidates.into_iter().next()
}

fn collect_index_dirs(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    if dir.join(INDEX_FILE).is_file() {
        out.push(dir.to_path_buf());
    }

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_index_dirs(&path, out);
        }
    }
}
