//! Schema document rendering and output
//!
//! Serialization is the only side effect here: the document goes to the
//! given output path or to stdout, nothing else. Output is deterministic
//! for identical input because every map in the model serializes in
//! first-seen order.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::error::{Result, TrackScanError};
use crate::schema::TrackingSchema;

/// Render the document in the requested format
pub fn render(schema: &TrackingSchema, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => {
            serde_yaml::to_string(schema).map_err(|e| TrackScanError::Serialize {
                message: format!("YAML serialization failed: {}", e),
            })
        }
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(schema).map_err(|e| TrackScanError::Serialize {
                    message: format!("JSON serialization failed: {}", e),
                })?;
            Ok(format!("{}\n", json))
        }
    }
}

/// Write the rendered document to a file, or to stdout when `target` is None
pub fn write_output(document: &str, target: Option<&Path>) -> Result<()> {
    match target {
        Some(path) => {
            fs::write(path, document)?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(document.as_bytes())?;
        }
    }
    Ok(())
}
