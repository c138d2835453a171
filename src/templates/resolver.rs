//! Template directory resolution.
//!
//! Resolution walks an ordered list of candidate roots and picks the first
//! whose directory contains a readable index file. Candidate production is
//! decoupled from selection via [`CandidateRoot`], so each packaging shape
//! is independently testable.

use std::env;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use tempfile::TempDir;
use zip::ZipArchive;

use super::{
    INDEX_FILE, TEMPLATE_DIR_ENV, TemplateDirectory, TemplateIndex, TemplateInfo,
    find_index_root, infer_platform_command,
};
use crate::error::{Result, TemplateError};

/// A source of one candidate template root.
pub trait CandidateRoot: Send + Sync {
    /// Produce the candidate path, if this source applies at all.
    fn candidate(&self) -> Option<PathBuf>;

    /// Short human-readable description for diagnostics.
    fn describe(&self) -> &str;
}

/// A fixed filesystem path. Useful for injecting roots in tests and for
/// callers that manage their own template locations.
pub struct FixedRoot(pub PathBuf);

impl CandidateRoot for FixedRoot {
    fn candidate(&self) -> Option<PathBuf> {
        Some(self.0.clone())
    }

    fn describe(&self) -> &str {
        "fixed path"
    }
}

/// The templates directory shipped with the installed crate.
pub struct PackagedRoot;

impl CandidateRoot for PackagedRoot {
    fn candidate(&self) -> Option<PathBuf> {
        Some(Path::new(env!("CARGO_MANIFEST_DIR")).join("templates"))
    }

    fn describe(&self) -> &str {
        "packaged templates"
    }
}

/// Templates bundled with the running executable.
///
/// Two packaging shapes exist: a single self-extracting bundle that unpacks
/// to a private extraction root (named by `NETHARVEST_BUNDLE_DIR`), and a
/// multi-file bundle with templates adjacent to the executable.
pub struct BundleRoot {
    shape: BundleShape,
}

enum BundleShape {
    Extracted,
    ExeAdjacent,
}

impl BundleRoot {
    /// Single-file bundle: templates under the private extraction root.
    pub fn extracted() -> Self {
        Self {
            shape: BundleShape::Extracted,
        }
    }

    /// Multi-file bundle: templates in a subdirectory next to the executable.
    pub fn exe_adjacent() -> Self {
        Self {
            shape: BundleShape::ExeAdjacent,
        }
    }
}

impl CandidateRoot for BundleRoot {
    fn candidate(&self) -> Option<PathBuf> {
        match self.shape {
            BundleShape::Extracted => env::var_os("NETHARVEST_BUNDLE_DIR")
                .map(|dir| PathBuf::from(dir).join("templates")),
            BundleShape::ExeAdjacent => env::current_exe()
                .ok()?
                .parent()
                .map(|dir| dir.join("templates")),
        }
    }

    fn describe(&self) -> &str {
        match self.shape {
            BundleShape::Extracted => "bundle extraction root",
            BundleShape::ExeAdjacent => "executable-adjacent templates",
        }
    }
}

/// `./templates` relative to the working directory (source checkouts).
pub struct WorkingDirRoot;

impl CandidateRoot for WorkingDirRoot {
    fn candidate(&self) -> Option<PathBuf> {
        env::current_dir().ok().map(|dir| dir.join("templates"))
    }

    fn describe(&self) -> &str {
        "working directory templates"
    }
}

/// Resolves the template directory from an ordered candidate list.
///
/// The explicit override is configuration state, not a provider: it is
/// checked before every provider and snapshotted at the start of each
/// `resolve()` call. `resolve()` never fails; when nothing resolves it
/// returns a directory with `index_present == false`.
pub struct TemplateResolver {
    override_path: Option<PathBuf>,
    providers: Vec<Box<dyn CandidateRoot>>,

    /// Extraction roots from archive uploads, kept alive for the session.
    extractions: Vec<TempDir>,
}

impl TemplateResolver {
    /// Resolver with the standard provider order, override seeded from the
    /// `NET_TEXTFSM` environment variable.
    ///
    /// The environment is read once, here; later changes to the variable
    /// are not observed. Use [`set_override`](Self::set_override) to move
    /// the override afterwards.
    pub fn new() -> Self {
        let mut resolver = Self::with_providers(vec![
            Box::new(PackagedRoot),
            Box::new(BundleRoot::extracted()),
            Box::new(BundleRoot::exe_adjacent()),
            Box::new(WorkingDirRoot),
        ]);
        resolver.override_path = env::var_os(TEMPLATE_DIR_ENV).map(PathBuf::from);
        resolver
    }

    /// Resolver over an explicit provider list, with no override set.
    /// Does not consult the environment.
    pub fn with_providers(providers: Vec<Box<dyn CandidateRoot>>) -> Self {
        Self {
            override_path: None,
            providers,
            extractions: Vec::new(),
        }
    }

    /// Set the explicit override location. Takes first priority until
    /// cleared or replaced (e.g., by an archive upload).
    pub fn set_override(&mut self, path: impl Into<PathBuf>) {
        self.override_path = Some(path.into());
    }

    /// Clear the explicit override.
    pub fn clear_override(&mut self) {
        self.override_path = None;
    }

    /// Current override location, if set.
    pub fn override_path(&self) -> Option<&Path> {
        self.override_path.as_deref()
    }

    /// Resolve a template directory snapshot. Never fails.
    pub fn resolve(&self) -> TemplateDirectory {
        if let Some(ref path) = self.override_path {
            if let Some(dir) = load_root(path) {
                debug!("templates resolved via override: {}", path.display());
                return dir;
            }
            warn!(
                "template override {} has no readable index, trying other locations",
                path.display()
            );
        }

        for provider in &self.providers {
            let Some(path) = provider.candidate() else {
                continue;
            };
            if let Some(dir) = load_root(&path) {
                debug!(
                    "templates resolved via {}: {}",
                    provider.describe(),
                    path.display()
                );
                return dir;
            }
        }

        debug!("no template directory found, structured parsing unavailable");
        TemplateDirectory::unavailable()
    }

    /// Re-run resolution, e.g. after an archive upload or a change on disk.
    ///
    /// Filesystem state is re-examined, but the `NET_TEXTFSM` override is
    /// the one captured at construction (or set since via
    /// [`set_override`](Self::set_override)); the environment is not
    /// re-read here.
    pub fn refresh(&self) -> TemplateDirectory {
        self.resolve()
    }

    /// Load a user-supplied template archive (zip).
    ///
    /// The archive is extracted to a private temporary directory that lives
    /// as long as this resolver. Its entries are scanned for any folder
    /// containing an index file, root or nested (shallowest wins); that
    /// folder becomes the override location for the rest of the session.
    pub fn load_archive<R: Read + Seek>(&mut self, reader: R) -> Result<PathBuf> {
        let mut archive = ZipArchive::new(reader).map_err(TemplateError::Archive)?;

        let extraction = tempfile::Builder::new()
            .prefix("netharvest_templates_")
            .tempdir()
            .map_err(TemplateError::Io)?;

        archive
            .extract(extraction.path())
            .map_err(TemplateError::Archive)?;

        let root =
            find_index_root(extraction.path()).ok_or(TemplateError::NoIndexInArchive)?;

        debug!("archive templates extracted to {}", root.display());
        self.override_path = Some(root.clone());
        self.extractions.push(extraction);

        Ok(root)
    }

    /// Enumerate template files under a resolved root, with platform and
    /// command inferred from filenames, for diagnostic display.
    pub fn list_templates(&self, dir: &TemplateDirectory) -> Vec<TemplateInfo> {
        let Some(ref root) = dir.root else {
            return Vec::new();
        };

        let mut infos = Vec::new();
        walk_templates(root, root, &mut infos);
        infos.sort_by(|a, b| a.file.cmp(&b.file));
        infos
    }
}

impl Default for TemplateResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Try to load a template directory at `root`. Returns `None` unless the
/// root contains a readable index file.
fn load_root(root: &Path) -> Option<TemplateDirectory> {
    let index_path = root.join(INDEX_FILE);
    let text = std::fs::read_to_string(&index_path).ok()?;
    let index = TemplateIndex::parse(&text);
    if index.skipped() > 0 {
        warn!(
            "{}: skipped {} malformed index line(s)",
            index_path.display(),
            index.skipped()
        );
    }
    Some(TemplateDirectory {
        root: Some(root.to_path_buf()),
        index_present: true,
        index,
    })
}

fn walk_templates(root: &Path, dir: &Path, out: &mut Vec<TemplateInfo>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            walk_templates(root, &path, out);
            continue;
        }

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.to_ascii_lowercase().ends_with(".textfsm") {
            continue;
        }

        let (platform, command) = infer_platform_command(name);
        let folder = path
            .parent()
            .and_then(|p| p.strip_prefix(root).ok())
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        out.push(TemplateInfo {
            file: name.to_string(),
            platform,
            command,
            folder,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::{Cursor, Write};

    fn write_root(dir: &Path, index: &str, templates: &[(&str, &str)]) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(INDEX_FILE), index).unwrap();
        for (name, body) in templates {
            fs::write(dir.join(name), body).unwrap();
        }
    }

    #[test]
    fn test_resolve_without_candidates_degrades() {
        let resolver = TemplateResolver::with_providers(vec![]);
        let dir = resolver.resolve();
        assert!(!dir.index_present);
        assert!(dir.index.is_empty());
        assert!(resolver.list_templates(&dir).is_empty());
    }

    #[test]
    fn test_resolve_via_fixed_provider() {
        let tmp = tempfile::tempdir().unwrap();
        write_root(
            tmp.path(),
            "cisco_ios_show_version.textfsm, cisco_ios, show version\n",
            &[("cisco_ios_show_version.textfsm", "Value X (.*)\n\nStart\n")],
        );

        let resolver =
            TemplateResolver::with_providers(vec![Box::new(FixedRoot(tmp.path().into()))]);
        let dir = resolver.resolve();
        assert!(dir.index_present);
        assert_eq!(dir.root.as_deref(), Some(tmp.path()));
        assert!(dir.index.find("cisco_ios", "show version").is_some());
    }

    #[test]
    fn test_override_wins_over_providers() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        write_root(a.path(), "a.textfsm, p, c\n", &[]);
        write_root(b.path(), "b.textfsm, p, c\n", &[]);

        let mut resolver =
            TemplateResolver::with_providers(vec![Box::new(FixedRoot(b.path().into()))]);
        resolver.set_override(a.path());

        let dir = resolver.resolve();
        assert_eq!(dir.root.as_deref(), Some(a.path()));
        assert_eq!(dir.index.find("p", "c").unwrap().template, "a.textfsm");
    }

    #[test]
    fn test_override_without_index_falls_through() {
        let empty = tempfile::tempdir().unwrap();
        let good = tempfile::tempdir().unwrap();
        write_root(good.path(), "t.textfsm, p, c\n", &[]);

        let mut resolver =
            TemplateResolver::with_providers(vec![Box::new(FixedRoot(good.path().into()))]);
        resolver.set_override(empty.path());

        let dir = resolver.resolve();
        assert_eq!(dir.root.as_deref(), Some(good.path()));
    }

    #[test]
    fn test_first_provider_with_index_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write_root(first.path(), "first.textfsm, p, c\n", &[]);
        write_root(second.path(), "second.textfsm, p, c\n", &[]);

        let resolver = TemplateResolver::with_providers(vec![
            Box::new(FixedRoot(first.path().into())),
            Box::new(FixedRoot(second.path().into())),
        ]);
        let dir = resolver.resolve();
        assert_eq!(dir.index.find("p", "c").unwrap().template, "first.textfsm");
    }

    #[test]
    fn test_provider_without_index_skipped() {
        let empty = tempfile::tempdir().unwrap();
        let good = tempfile::tempdir().unwrap();
        write_root(good.path(), "t.textfsm, p, c\n", &[]);

        let resolver = TemplateResolver::with_providers(vec![
            Box::new(FixedRoot(empty.path().into())),
            Box::new(FixedRoot(good.path().into())),
        ]);
        let dir = resolver.resolve();
        assert_eq!(dir.root.as_deref(), Some(good.path()));
    }

    #[test]
    fn test_refresh_picks_up_new_index() {
        let tmp = tempfile::tempdir().unwrap();
        let resolver =
            TemplateResolver::with_providers(vec![Box::new(FixedRoot(tmp.path().into()))]);

        assert!(!resolver.resolve().index_present);

        write_root(tmp.path(), "t.textfsm, p, c\n", &[]);
        assert!(resolver.refresh().index_present);
    }

    #[test]
    fn test_load_archive_with_nested_templates_folder() {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::FileOptions::default();
        zip.start_file("templates/index", options).unwrap();
        zip.write_all(b"cisco_ios_show_version.textfsm, cisco_ios, show version\n")
            .unwrap();
        zip.start_file("templates/cisco_ios_show_version.textfsm", options)
            .unwrap();
        zip.write_all(b"Value VERSION (\\S+)\n\nStart\n  ^Version ${VERSION} -> Record\n")
            .unwrap();
        let cursor = zip.finish().unwrap();

        let mut resolver = TemplateResolver::with_providers(vec![]);
        let root = resolver.load_archive(cursor).unwrap();

        assert!(root.ends_with("templates"));
        assert_eq!(resolver.override_path(), Some(root.as_path()));

        let dir = resolver.resolve();
        assert!(dir.index_present);
        assert!(dir.index.find("cisco_ios", "show version").is_some());
    }

    #[test]
    fn test_load_archive_without_index_fails() {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::FileOptions::default();
        zip.start_file("readme.txt", options).unwrap();
        zip.write_all(b"no templates here").unwrap();
        let cursor = zip.finish().unwrap();

        let mut resolver = TemplateResolver::with_providers(vec![]);
        assert!(resolver.load_archive(cursor).is_err());
        assert!(resolver.override_path().is_none());
    }

    #[test]
    fn test_list_templates_with_inference() {
        let tmp = tempfile::tempdir().unwrap();
        write_root(
            tmp.path(),
            "cisco_ios_show_version.textfsm, cisco_ios, show version\n",
            &[
                ("cisco_ios_show_version.textfsm", ""),
                ("arista_eos_show_lldp_neighbors.textfsm", ""),
            ],
        );
        fs::create_dir(tmp.path().join("extra")).unwrap();
        fs::write(tmp.path().join("extra/linux_uname.textfsm"), "").unwrap();

        let resolver =
            TemplateResolver::with_providers(vec![Box::new(FixedRoot(tmp.path().into()))]);
        let dir = resolver.resolve();
        let infos = resolver.list_templates(&dir);

        assert_eq!(infos.len(), 3);
        let show_version = infos
            .iter()
            .find(|i| i.file == "cisco_ios_show_version.textfsm")
            .unwrap();
        assert_eq!(show_version.platform, "cisco_ios");
        assert_eq!(show_version.command, "show version");
        let nested = infos.iter().find(|i| i.file == "linux_uname.textfsm").unwrap();
        assert_eq!(nested.folder, "extra");
    }
}
