//! @ai:module:intent Feed raw compiler output lines through classification, correlation and filtering
//! @ai:module:layer application
//! @ai:module:public_api Correlator, FeedOutcome
//! @ai:module:depends_on classifier, exclusion, store, paths
//! @ai:module:stateless false

use crate::classifier::classify_line;
use crate::diagnostic::Diagnostic;
use crate::exclusion::ExclusionMatcher;
use crate::paths::{display_relative, normalize_path};
use crate::severity::Severity;
use crate::store::{DiagnosticId, DiagnosticStore};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Prefix of a message that only supplies the declaration for the previous diagnostic.
const CONTINUATION_MARKER: &str = "Found declaration: ";

/// Prefix of the only diagnostic kind a declaration continuation may attach to.
const CONTINUABLE_MARKER: &str = "Wrong number of parameters";

static STOP_SUMMARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^There (?:was|were) \d+ errors? compiling module, stopping$")
        .expect("STOP_SUMMARY_RE regex should compile")
});

/// @ai:intent What happened to one fed line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOutcome {
    Unrecognized,
    Stored,
    Merged,
    DroppedContinuation,
    DroppedSummary,
    Excluded,
}

impl FeedOutcome {
    /// @ai:intent Whether the line was a diagnostic at all
    pub fn is_diagnostic(&self) -> bool {
        !matches!(self, FeedOutcome::Unrecognized)
    }
}

/// @ai:intent Stateful one-run parser that owns the store while output is being fed
/// @ai:invariant `previous` always refers to the last record actually stored
pub struct Correlator {
    store: DiagnosticStore,
    exclusions: ExclusionMatcher,
    display_base: PathBuf,
    previous: Option<DiagnosticId>,
}

impl Correlator {
    /// @ai:intent Create a correlator for one compilation run
    /// @ai:pre display_base is the directory continuation paths are shown relative to
    pub fn new(exclusions: ExclusionMatcher, display_base: impl Into<PathBuf>) -> Self {
        Self {
            store: DiagnosticStore::new(),
            exclusions,
            display_base: display_base.into(),
            previous: None,
        }
    }

    /// @ai:intent Feed one line; returns true if it produced, continued or suppressed a diagnostic
    /// @ai:effects mutates self
    pub fn feed_line(&mut self, text: &str) -> bool {
        self.feed(text).is_diagnostic()
    }

    /// @ai:intent Feed one line and report exactly what happened to it
    /// @ai:effects mutates self
    pub fn feed(&mut self, text: &str) -> FeedOutcome {
        let Some(mut candidate) = classify_line(text) else {
            return FeedOutcome::Unrecognized;
        };
        candidate.path = normalize_path(&candidate.path);

        if let Some(remainder) = candidate.message.strip_prefix(CONTINUATION_MARKER) {
            return match self.continuable_previous() {
                Some(previous) => {
                    let note = format!(
                        "Found declaration in {}{}: {}",
                        display_relative(&candidate.path, &self.display_base),
                        candidate.position(),
                        remainder
                    );
                    self.store.append_message(previous, &note);
                    tracing::debug!(path = %candidate.path, "merged declaration into previous diagnostic");
                    FeedOutcome::Merged
                }
                None => {
                    tracing::debug!(path = %candidate.path, "dropped declaration with no eligible predecessor");
                    FeedOutcome::DroppedContinuation
                }
            };
        }

        if candidate.severity == Severity::Fatal && STOP_SUMMARY_RE.is_match(&candidate.message) {
            tracing::debug!(message = %candidate.message, "dropped error summary");
            return FeedOutcome::DroppedSummary;
        }

        if self.exclusions.suppresses(&candidate.path, candidate.severity) {
            tracing::debug!(path = %candidate.path, severity = %candidate.severity, "excluded diagnostic");
            return FeedOutcome::Excluded;
        }

        self.previous = Some(self.store.record(candidate));
        FeedOutcome::Stored
    }

    /// @ai:effects pure
    fn continuable_previous(&self) -> Option<DiagnosticId> {
        let id = self.previous?;
        let previous = self.store.get(id)?;
        starts_with_ignore_ascii_case(&previous.message, CONTINUABLE_MARKER).then_some(id)
    }

    /// @ai:intent Last stored diagnostic, if any
    pub fn previous(&self) -> Option<&Diagnostic> {
        self.previous.and_then(|id| self.store.get(id))
    }

    /// @ai:intent Read view of everything stored so far
    pub fn snapshot(&self) -> &DiagnosticStore {
        &self.store
    }

    pub fn display_base(&self) -> &Path {
        &self.display_base
    }

    /// @ai:intent End the producing phase and hand out the read-only store
    pub fn finish(self) -> DiagnosticStore {
        self.store
    }
}

fn starts_with_ignore_ascii_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn correlator() -> Correlator {
        Correlator::new(ExclusionMatcher::default(), "/project")
    }

    #[test]
    fn test_error_line_lands_in_both_indexes() {
        let mut c = correlator();
        assert!(c.feed_line("/src/a.pas(9,1) Error: Identifier not found \"foo\""));

        let store = c.finish();
        let errors: Vec<_> = store.by_severity(Severity::Error).collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 9);
        assert_eq!(errors[0].column, Some(1));
        assert_eq!(store.by_file("/src/a.pas").count(), 1);
    }

    #[test]
    fn test_unrecognized_lines_are_ignored() {
        let mut c = correlator();
        assert!(!c.feed_line("Target OS: Linux for x86-64"));
        assert!(!c.feed_line("3 lines compiled, 0.1 sec"));
        assert!(c.snapshot().is_empty());
    }

    #[test]
    fn test_end_to_end_declaration_merge() {
        let mut c = correlator();
        assert_eq!(c.feed("/src/a.pas(5,12) Warning: unused variable 'x'"), FeedOutcome::Stored);
        assert_eq!(c.feed("/src/a.pas(9,1) Error: wrong number of parameters"), FeedOutcome::Stored);
        assert_eq!(
            c.feed("/src/b.pas(3,10) Error: Found declaration: foo(Int):Int;"),
            FeedOutcome::Merged
        );

        let store = c.finish();
        assert_eq!(store.count(Severity::Warning), 1);
        assert_eq!(store.count(Severity::Error), 1);
        assert_eq!(store.by_file("/src/b.pas").count(), 0);

        let error = store.by_severity(Severity::Error).next().unwrap();
        assert!(error
            .message
            .ends_with("\nFound declaration in /src/b.pas(3,10): foo(Int):Int;"));
    }

    #[test]
    fn test_declaration_path_is_shown_relative_to_base() {
        let mut c = correlator();
        c.feed_line("/project/main.pas(4,3) Error: Wrong number of parameters specified for call to \"Add\"");
        c.feed_line("/project/units/math.pas(12,10) Error: Found declaration: Add(LongInt;LongInt):LongInt;");

        assert_eq!(
            c.previous().unwrap().message,
            "Wrong number of parameters specified for call to \"Add\"\n\
             Found declaration in units/math.pas(12,10): Add(LongInt;LongInt):LongInt;"
        );
    }

    #[test]
    fn test_multiple_declarations_accumulate() {
        let mut c = correlator();
        c.feed_line("a.pas(1,1) Error: Wrong number of parameters specified for call to \"f\"");
        c.feed_line("a.pas(10,1) Error: Found declaration: f(Byte);");
        c.feed_line("a.pas(11,1) Error: Found declaration: f(Word);");
        assert_eq!(c.previous().unwrap().message.lines().count(), 3);
        assert_eq!(c.snapshot().len(), 1);
    }

    #[test]
    fn test_continuation_without_predecessor_is_dropped() {
        let mut c = correlator();
        assert_eq!(
            c.feed("/src/b.pas(3,10) Error: Found declaration: foo(Int):Int;"),
            FeedOutcome::DroppedContinuation
        );
        assert!(c.snapshot().is_empty());
    }

    #[test]
    fn test_continuation_after_unrelated_diagnostic_is_dropped() {
        let mut c = correlator();
        c.feed_line("a.pas(2,5) Error: Identifier not found \"x\"");
        assert_eq!(
            c.feed("b.pas(3,10) Error: Found declaration: foo(Int):Int;"),
            FeedOutcome::DroppedContinuation
        );
        assert_eq!(c.previous().unwrap().message, "Identifier not found \"x\"");
        assert_eq!(c.snapshot().len(), 1);
    }

    #[test]
    fn test_stop_summary_is_never_stored() {
        let mut c = correlator();
        for line in [
            "a.pas(30) Fatal: There were 1 errors compiling module, stopping",
            "a.pas(30) Fatal: There were 17 errors compiling module, stopping",
            "a.pas(30) Fatal: There was 1 error compiling module, stopping",
        ] {
            assert_eq!(c.feed(line), FeedOutcome::DroppedSummary);
        }
        assert!(c.snapshot().is_empty());
    }

    #[test]
    fn test_other_fatals_are_stored_as_errors() {
        let mut c = correlator();
        c.feed_line("a.pas(1,10) Fatal: Can't find unit Missing used by Program");
        let store = c.finish();
        let errors: Vec<_> = store.by_severity(Severity::Error).collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].severity, Severity::Fatal);
    }

    #[test]
    fn test_exclusion_drops_warnings_but_keeps_errors() {
        let exclusions = ExclusionMatcher::new(&["/project/vendor/"], Path::new("/project"));
        let mut c = Correlator::new(exclusions, "/project");

        assert_eq!(
            c.feed("/project/vendor/lib.pas(3,1) Warning: Symbol \"x\" is deprecated"),
            FeedOutcome::Excluded
        );
        assert_eq!(
            c.feed("/project/vendor/lib.pas(8,2) Error: Illegal expression"),
            FeedOutcome::Stored
        );

        let store = c.finish();
        assert_eq!(store.count(Severity::Warning), 0);
        assert_eq!(store.count(Severity::Error), 1);
    }

    #[test]
    fn test_excluded_line_does_not_become_previous() {
        let exclusions = ExclusionMatcher::new(&["/project/vendor/"], Path::new("/project"));
        let mut c = Correlator::new(exclusions, "/project");
        c.feed_line("/project/a.pas(1,1) Error: Wrong number of parameters specified for call to \"f\"");
        c.feed_line("/project/vendor/x.pas(2,2) Hint: Value parameter \"y\" is assigned but never used");
        assert_eq!(
            c.feed("/project/a.pas(9,1) Error: Found declaration: f;"),
            FeedOutcome::Merged
        );
    }

    #[test]
    fn test_paths_are_normalized_before_storage() {
        let mut c = correlator();
        c.feed_line("/src/./lib/../a.pas(1,1) Hint: Start of reading config file");
        assert_eq!(c.snapshot().files().collect::<Vec<_>>(), vec!["/src/a.pas"]);
    }
}
