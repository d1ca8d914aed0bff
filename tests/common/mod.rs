//! Shared test infrastructure
//!
//! Tests use tempfile to create temporary directories with specific source
//! structures. This avoids bloating the repo with fixture files while
//! enabling realistic end-to-end scans.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use trackscan::{
    scan_directory, CustomFunctionSignature, ProviderRegistry, ScanOptions, ScanReport,
};

/// Builder for creating test repository structures
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Create a new empty test repository
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Write a file, creating parent directories as needed
    pub fn write(&self, rel_path: &str, content: &str) -> &Self {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(path, content).expect("Failed to write fixture file");
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Scan with default options
    pub fn scan(&self) -> ScanReport {
        self.scan_with(ScanOptions::default())
    }

    /// Scan with string-form custom function signatures
    pub fn scan_with_custom(&self, signatures: &[&str]) -> ScanReport {
        let custom_functions = signatures
            .iter()
            .map(|s| CustomFunctionSignature::parse(s).expect("invalid test signature"))
            .collect();
        self.scan_with(ScanOptions {
            custom_functions,
            ..ScanOptions::default()
        })
    }

    pub fn scan_with(&self, options: ScanOptions) -> ScanReport {
        let registry = ProviderRegistry::builtin().expect("builtin registry must be valid");
        scan_directory(self.dir.path(), &registry, &options).expect("scan failed")
    }
}
