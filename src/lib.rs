//! trackscan: static analysis detector for analytics tracking calls
//!
//! This library scans a JavaScript/TypeScript codebase, parses each source
//! file with tree-sitter, and identifies calls to analytics tracking
//! libraries (Segment, Mixpanel, Amplitude, PostHog, GA4, GTM, Datadog RUM,
//! mParticle, Snowplow, Heap, Pendo, RudderStack, plus caller-supplied
//! custom functions). Findings merge into a canonical events map serialized
//! to YAML or JSON.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use trackscan::{
//!     collect_repo_details, render, scan_directory, OutputFormat,
//!     ProviderRegistry, ScanOptions, SourceOverrides, TrackingSchema,
//! };
//!
//! let registry = ProviderRegistry::builtin()?;
//! let report = scan_directory(Path::new("./app"), &registry, &ScanOptions::default())?;
//! let source = collect_repo_details(Path::new("./app"), &SourceOverrides::default());
//! let document = render(&TrackingSchema::new(report.events, source), OutputFormat::Yaml)?;
//! println!("{}", document);
//! ```

pub mod ast;
pub mod cli;
pub mod custom;
pub mod emit;
pub mod error;
pub mod events;
pub mod functions;
pub mod lang;
pub mod matcher;
pub mod parsing;
pub mod properties;
pub mod providers;
pub mod repo;
pub mod resolve;
pub mod schema;
pub mod walker;

// Re-export commonly used types
pub use cli::{Cli, OutputFormat};
pub use custom::{parse_signatures, CustomFunctionSignature, CustomParameter};
pub use emit::{render, write_output};
pub use error::{Result, TrackScanError};
pub use events::build_events_map;
pub use lang::Lang;
pub use matcher::{scan_tree, CallSite};
pub use parsing::parse_source;
pub use providers::{ArgumentRule, CallShape, ProviderDescriptor, ProviderRegistry};
pub use repo::{collect_repo_details, SourceOverrides};
pub use resolve::{ConstantResolver, DeclarationLookup, ScopeIndex};
pub use schema::{
    DetectedEvent, EventProperty, EventsMap, Implementation, PropertyMap, RepoDetails,
    TrackingSchema, SCHEMA_VERSION,
};
pub use walker::{collect_files, scan_directory, ScanOptions, ScanReport};
