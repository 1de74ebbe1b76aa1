#![warn(clippy::pedantic)]
// Allowed pedantic lints (too noisy or not applicable)
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)] // Builder pattern doesn't need this
#![allow(clippy::cast_precision_loss)]      // Acceptable for ratio computation
#![allow(clippy::too_many_lines)]           // Some functions are naturally long
#![allow(clippy::struct_excessive_bools)]   // Config structs need bool flags
#![allow(clippy::missing_errors_doc)]       // Will add incrementally
#![allow(clippy::missing_panics_doc)]       // Will add incrementally
#![allow(clippy::doc_markdown)]             // Too many false positives
#![allow(clippy::similar_names)]            // Variable naming is fine
#![allow(clippy::match_same_arms)]          // Intentional for clarity
#![allow(clippy::needless_pass_by_value)]   // Sometimes clearer API
#![allow(clippy::uninlined_format_args)]    // Style preference
#![allow(clippy::redundant_closure_for_method_calls)] // Sometimes clearer
#![allow(clippy::format_push_string)]       // Acceptable in output formatting
#![allow(clippy::single_match_else)]        // Match is sometimes clearer
#![allow(clippy::unnecessary_wraps)]        // Some wraps are for API consistency

//! docdecay - Detects documentation decay in a codebase.
//!
//! docdecay scans a source tree, extracts named code entities (functions,
//! classes, methods, module-level constants) and documentation references
//! (inline code, fenced code blocks, links, headers), matches the two
//! against each other, and reports what fell out of sync: undocumented
//! entities, documentation that references something that no longer
//! exists, and — given a git commit — which documentation a particular
//! change probably invalidated.
//!
//! # Quick Start
//!
//! ```no_run
//! use docdecay::analyzer::DocumentationAnalyzer;
//!
//! let mut analyzer = DocumentationAnalyzer::new();
//! analyzer.analyze_directory("./my-project".as_ref()).unwrap();
//! let coverage = analyzer.coverage();
//! println!("{:.0}% of entities are documented", coverage.coverage_ratio() * 100.0);
//! ```
//!
//! # Modules
//!
//! - [`scanner`] - Directory traversal and file classification
//! - [`models`] - Core data model: entities, references, links
//! - [`extractors`] - Per-language/per-format extraction
//! - [`graph`] - The documentation graph
//! - [`matcher`] - Reference-to-entity matching
//! - [`coverage`] - Coverage statistics
//! - [`scorer`] - Priority scoring for documentation impacts
//! - [`vcs`] - Git-backed commit history and impact analysis
//! - [`serializer`] - JSON output
//! - [`analyzer`] - Top-level orchestration
//! - [`telemetry`] - Logging setup

pub mod analyzer;
pub mod coverage;
pub mod errors;
pub mod extractors;
pub mod graph;
pub mod matcher;
pub mod models;
pub mod scanner;
pub mod scorer;
pub mod serializer;
pub mod telemetry;
pub mod vcs;

pub use analyzer::{AnalysisReport, DocumentationAnalyzer};
pub use errors::{exit_code, AnalyzerError};
pub use models::{CodeDocLink, CodeEntity, CodeFile, DocFile, DocReference, EntityKind, Language, LinkKind, Location, ReferenceKind};
