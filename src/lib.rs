//! @ai:module:intent Free Pascal diagnostics parser and annotator library
//! @ai:module:layer infrastructure
//! @ai:module:public_api classifier, correlator, store, exclusion, annotation, line_count, config, compiler, output
//!
//! # fpc-annotate
//!
//! Turns the plain-text diagnostic stream of the Free Pascal compiler into
//! classified records, pass/fail decisions and CI annotation payloads.
//!
//! ## Example
//!
//! ```rust
//! use fpc_annotate::{Correlator, ExclusionMatcher, Severity};
//!
//! let mut correlator = Correlator::new(ExclusionMatcher::default(), "/src");
//! correlator.feed_line("/src/a.pas(9,1) Error: Wrong number of parameters specified for call to \"foo\"");
//! correlator.feed_line("/src/b.pas(3,10) Error: Found declaration: foo(LongInt):LongInt;");
//!
//! let store = correlator.finish();
//! assert_eq!(store.count(Severity::Error), 1);
//! ```

pub mod annotation;
pub mod classifier;
pub mod compiler;
pub mod config;
pub mod correlator;
pub mod diagnostic;
pub mod error;
pub mod exclusion;
pub mod line_count;
pub mod output;
pub mod paths;
pub mod severity;
pub mod store;

pub use annotation::{shape_annotations, AnnotationPayload, FileMetadata};
pub use classifier::classify_line;
pub use compiler::{feed_reader, CompileOutcome, CompilerInvocation};
pub use config::Config;
pub use correlator::{Correlator, FeedOutcome};
pub use diagnostic::Diagnostic;
pub use error::{Error, Result};
pub use exclusion::{ExcludedPath, ExclusionMatcher};
pub use line_count::count_lines;
pub use output::{format_report, format_workflow_command, OutputFormat, Report, RunSummary};
pub use severity::{Channel, Severity, SeverityMask};
pub use store::DiagnosticStore;
