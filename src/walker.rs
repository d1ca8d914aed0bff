//! Directory traversal and parallel per-file scanning
//!
//! Enumerates source files under a root in a stable order, parses each
//! supported file, and feeds the trees to the call-site matcher. Files are
//! processed in parallel with rayon; results are merged centrally after all
//! per-file scans return, so no shared mutable state is needed.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::custom::CustomFunctionSignature;
use crate::error::{Result, TrackScanError};
use crate::events::build_events_map;
use crate::lang::Lang;
use crate::matcher::{scan_tree, CallSite};
use crate::parsing::parse_source;
use crate::providers::ProviderRegistry;
use crate::schema::EventsMap;

/// Directory names never worth scanning
const SKIP_DIRS: &[&str] = &["node_modules", "coverage", "tmp", "temp", "log"];

/// Caller-tunable scan inputs
#[derive(Debug, Default)]
pub struct ScanOptions {
    /// Glob patterns excluded from the walk
    pub ignore: Vec<String>,

    /// Custom tracking function signatures, checked before built-in
    /// providers
    pub custom_functions: Vec<CustomFunctionSignature>,
}

/// Outcome of one scan pass
#[derive(Debug)]
pub struct ScanReport {
    /// Merged events, in first-seen order
    pub events: EventsMap,

    /// Files parsed and matched
    pub files_scanned: usize,

    /// Files skipped because they failed to read or parse
    pub parse_errors: usize,
}

enum FileOutcome {
    Scanned(Vec<CallSite>),
    /// Not source we analyze (binary content, unreadable encoding)
    Skipped,
    /// Read or parse failure, already logged
    Failed,
}

/// Scan a directory tree for tracking calls.
///
/// A file that fails to parse is skipped with a recorded warning and never
/// aborts the scan; files outside the supported language set are skipped
/// silently.
pub fn scan_directory(
    root: &Path,
    registry: &ProviderRegistry,
    options: &ScanOptions,
) -> Result<ScanReport> {
    if !root.exists() {
        return Err(TrackScanError::PathNotFound {
            path: root.display().to_string(),
        });
    }
    if !root.is_dir() {
        return Err(TrackScanError::NotADirectory {
            path: root.display().to_string(),
        });
    }

    let files = collect_files(root, &options.ignore)?;
    debug!(files = files.len(), "collected source files");

    let outcomes: Vec<FileOutcome> = files
        .par_iter()
        .map(|path| scan_file(path, root, registry, &options.custom_functions))
        .collect();

    let mut call_sites: Vec<CallSite> = Vec::new();
    let mut files_scanned = 0;
    let mut parse_errors = 0;
    for outcome in outcomes {
        match outcome {
            FileOutcome::Scanned(sites) => {
                files_scanned += 1;
                call_sites.extend(sites);
            }
            FileOutcome::Skipped => {}
            FileOutcome::Failed => parse_errors += 1,
        }
    }

    debug!(
        files_scanned,
        parse_errors,
        call_sites = call_sites.len(),
        "scan complete"
    );

    Ok(ScanReport {
        events: build_events_map(call_sites),
        files_scanned,
        parse_errors,
    })
}

/// Enumerate supported source files under `root` in a stable order
pub fn collect_files(root: &Path, ignore_globs: &[String]) -> Result<Vec<PathBuf>> {
    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(true)
        .parents(false)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .sort_by_file_path(|a, b| a.cmp(b))
        .filter_entry(|entry| {
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            let name = entry.file_name().to_string_lossy();
            !(is_dir && SKIP_DIRS.contains(&name.as_ref()))
        });

    if !ignore_globs.is_empty() {
        let mut overrides = OverrideBuilder::new(root);
        for glob in ignore_globs {
            // override globs are whitelists; a leading ! excludes instead
            overrides.add(&format!("!{}", glob)).map_err(|e| {
                TrackScanError::InvalidIgnorePattern {
                    message: format!("{}: {}", glob, e),
                }
            })?;
        }
        let overrides = overrides
            .build()
            .map_err(|e| TrackScanError::InvalidIgnorePattern {
                message: e.to_string(),
            })?;
        builder.overrides(overrides);
    }

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("walk error: {}", e);
                continue;
            }
        };
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if is_file && Lang::from_path(entry.path()).is_some() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

fn scan_file(
    path: &Path,
    root: &Path,
    registry: &ProviderRegistry,
    custom_signatures: &[CustomFunctionSignature],
) -> FileOutcome {
    let rel_path = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string();

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) if e.kind() == ErrorKind::InvalidData => {
            // binary content under a source extension
            debug!("skipping non-text file {}", path.display());
            return FileOutcome::Skipped;
        }
        Err(e) => {
            warn!("failed to read {}: {}", path.display(), e);
            return FileOutcome::Failed;
        }
    };

    let Some(lang) = Lang::from_path(path) else {
        return FileOutcome::Skipped;
    };

    match parse_source(path, &source, lang) {
        Ok(tree) => FileOutcome::Scanned(scan_tree(
            &tree.root_node(),
            &source,
            &rel_path,
            registry,
            custom_signatures,
        )),
        Err(e) => {
            warn!("{}", e);
            FileOutcome::Failed
        }
    }
}
