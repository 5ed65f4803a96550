//! @ai:module:intent Summarize a run, apply the fail-on policy and render reports and workflow commands
//! @ai:module:layer infrastructure
//! @ai:module:public_api OutputFormat, RunSummary, Report, format_report, format_workflow_command
//! @ai:module:depends_on store, annotation, severity, compiler
//! @ai:module:stateless true

use crate::annotation::AnnotationPayload;
use crate::compiler::CompileOutcome;
use crate::paths::display_relative;
use crate::severity::{Severity, SeverityMask};
use crate::store::DiagnosticStore;
use colored::Colorize;
use serde::Serialize;
use std::path::Path;

/// @ai:intent Output format options
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
}

/// @ai:intent Per-bucket counts
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct Counts {
    pub errors: usize,
    pub warnings: usize,
    pub notes: usize,
    pub hints: usize,
}

/// @ai:intent Counts for one file
#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub path: String,
    #[serde(flatten)]
    pub counts: Counts,
}

/// @ai:intent Outcome of one run as seen by the pass/fail policy
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub compiler_succeeded: bool,
    pub exit_code: Option<i32>,
    #[serde(flatten)]
    pub totals: Counts,
    pub files: Vec<FileSummary>,
    pub fail_on: String,
    pub passed: bool,
}

/// @ai:intent Everything a run reports
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub summary: RunSummary,
    pub annotations: Vec<AnnotationPayload>,
}

impl Counts {
    fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Fatal | Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Note => self.notes += 1,
            Severity::Hint => self.hints += 1,
        }
    }

    /// @ai:intent Whether any bucket selected by the mask is non-empty
    /// @ai:effects pure
    pub fn hits(&self, mask: &SeverityMask) -> bool {
        (mask.error && self.errors > 0)
            || (mask.warning && self.warnings > 0)
            || (mask.note && self.notes > 0)
            || (mask.hint && self.hints > 0)
    }
}

impl RunSummary {
    /// @ai:intent Summarize a finished run and decide pass/fail
    /// @ai:post passed == compiler succeeded && no bucket selected by fail_on is non-empty
    /// @ai:effects pure
    pub fn new(
        store: &DiagnosticStore,
        outcome: &CompileOutcome,
        fail_on: SeverityMask,
        base: &Path,
    ) -> Self {
        let totals = Counts {
            errors: store.count(Severity::Error),
            warnings: store.count(Severity::Warning),
            notes: store.count(Severity::Note),
            hints: store.count(Severity::Hint),
        };

        let files = store
            .files()
            .map(|file| {
                let mut counts = Counts::default();
                store.by_file(file).for_each(|d| counts.add(d.severity));
                FileSummary {
                    path: display_relative(file, base),
                    counts,
                }
            })
            .collect();

        Self {
            compiler_succeeded: outcome.success,
            exit_code: outcome.exit_code,
            totals,
            files,
            fail_on: fail_on.chars(),
            passed: outcome.success && !totals.hits(&fail_on),
        }
    }
}

/// @ai:intent Format a report as a string
/// @ai:effects pure
pub fn format_report(report: &Report, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string(report).unwrap_or_default(),
        OutputFormat::JsonPretty => serde_json::to_string_pretty(report).unwrap_or_default(),
        OutputFormat::Text => format_summary_text(&report.summary),
    }
}

/// @ai:intent Format the summary as a human-readable table
/// @ai:effects pure
fn format_summary_text(summary: &RunSummary) -> String {
    let mut output = String::new();

    if !summary.files.is_empty() {
        let width = summary
            .files
            .iter()
            .map(|f| f.path.len())
            .max()
            .unwrap_or(0)
            .max("File".len());

        output.push_str(&format!(
            "{:<width$}  {:>6}  {:>8}  {:>5}  {:>5}\n",
            "File".bold(),
            "Errors",
            "Warnings",
            "Notes",
            "Hints"
        ));
        for file in &summary.files {
            output.push_str(&format!(
                "{:<width$}  {:>6}  {:>8}  {:>5}  {:>5}\n",
                file.path,
                file.counts.errors,
                file.counts.warnings,
                file.counts.notes,
                file.counts.hints
            ));
        }
        output.push('\n');
    }

    let t = &summary.totals;
    output.push_str(&format!(
        "{} errors, {} warnings, {} notes, {} hints\n",
        if t.errors > 0 {
            t.errors.to_string().red().bold().to_string()
        } else {
            "0".to_string()
        },
        if t.warnings > 0 {
            t.warnings.to_string().yellow().to_string()
        } else {
            "0".to_string()
        },
        t.notes,
        t.hints
    ));

    if !summary.compiler_succeeded {
        let code = summary
            .exit_code
            .map_or_else(|| "signal".to_string(), |c| c.to_string());
        output.push_str(&format!("{} compiler exited with {}\n", "FAILED".red().bold(), code));
    } else if summary.passed {
        output.push_str(&format!("{} (fail-on: {:?})\n", "OK".green().bold(), summary.fail_on));
    } else {
        output.push_str(&format!(
            "{} diagnostics matched fail-on {:?}\n",
            "FAILED".red().bold(),
            summary.fail_on
        ));
    }

    output
}

/// @ai:intent Render one payload as a workflow command line
/// @ai:example "::warning file=src/a.pas,line=5,col=12,title=a.pas(5,12): Warning::unused"
/// @ai:effects pure
pub fn format_workflow_command(payload: &AnnotationPayload) -> String {
    format!(
        "::{} file={},line={},col={},title={}::{}",
        payload.channel,
        escape_property(&payload.file_path),
        payload.line,
        payload.column,
        escape_property(&payload.title),
        escape_data(&payload.message)
    )
}

fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlator::Correlator;
    use crate::exclusion::ExclusionMatcher;
    use crate::severity::Channel;
    use pretty_assertions::assert_eq;

    fn store() -> DiagnosticStore {
        let mut c = Correlator::new(ExclusionMatcher::default(), "/w");
        c.feed_line("/w/a.pas(1,1) Warning: w1");
        c.feed_line("/w/a.pas(2,1) Hint: h1");
        c.feed_line("/w/sub/b.pas(3,1) Note: n1");
        c.finish()
    }

    fn ok() -> CompileOutcome {
        CompileOutcome {
            success: true,
            exit_code: Some(0),
            ..Default::default()
        }
    }

    #[test]
    fn test_summary_counts_per_file() {
        let summary = RunSummary::new(&store(), &ok(), "e".parse().unwrap(), Path::new("/w"));
        assert_eq!(
            summary.totals,
            Counts {
                errors: 0,
                warnings: 1,
                notes: 1,
                hints: 1
            }
        );
        assert_eq!(summary.files.len(), 2);
        assert_eq!(summary.files[1].path, "sub/b.pas");
        assert!(summary.passed);
    }

    #[test]
    fn test_fail_on_warning() {
        let summary = RunSummary::new(&store(), &ok(), "ew".parse().unwrap(), Path::new("/w"));
        assert!(!summary.passed);
    }

    #[test]
    fn test_compiler_failure_always_fails() {
        let outcome = CompileOutcome {
            success: false,
            exit_code: Some(1),
            ..Default::default()
        };
        let summary = RunSummary::new(&DiagnosticStore::new(), &outcome, SeverityMask::default(), Path::new("/w"));
        assert!(!summary.passed);
        colored::control::set_override(false);
        assert!(format_summary_text(&summary).contains("compiler exited with 1"));
    }

    #[test]
    fn test_workflow_command_escaping() {
        let payload = AnnotationPayload {
            file_path: "src/a,b.pas".to_string(),
            line: 9,
            column: 1,
            title: "a,b.pas(9,1): Error".to_string(),
            message: "100% wrong\nFound declaration in b.pas(3,10): foo;".to_string(),
            severity: Severity::Error,
            channel: Channel::Error,
        };
        assert_eq!(
            format_workflow_command(&payload),
            "::error file=src/a%2Cb.pas,line=9,col=1,title=a%2Cb.pas(9%2C1)%3A Error::\
             100%25 wrong%0AFound declaration in b.pas(3,10): foo;"
        );
    }

    #[test]
    fn test_json_report_shape() {
        let report = Report {
            summary: RunSummary::new(&store(), &ok(), "e".parse().unwrap(), Path::new("/w")),
            annotations: vec![],
        };
        let value: serde_json::Value =
            serde_json::from_str(&format_report(&report, OutputFormat::Json)).unwrap();
        assert_eq!(value["summary"]["warnings"], 1);
        assert_eq!(value["summary"]["passed"], true);
        assert_eq!(value["summary"]["files"][0]["path"], "a.pas");
    }
}
