//! @ai:module:intent Recognize compiler diagnostic lines and extract their fields
//! @ai:module:layer application
//! @ai:module:public_api classify_line, USER_DEFINED_PREFIX
//! @ai:module:depends_on diagnostic, severity
//! @ai:module:stateless true

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;
use regex::Regex;
use std::sync::LazyLock;

/// `<path>(<line>[,<column>]) <Severity>: <message>`
static DIAGNOSTIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+)\((\d+)(?:,(\d+))?\) (Fatal|Error|Warning|Note|Hint): (.+)$")
        .expect("DIAGNOSTIC_RE regex should compile")
});

/// Message prefix the compiler uses for `{$WARNING ...}`-style directives.
pub const USER_DEFINED_PREFIX: &str = "User defined: ";

/// @ai:intent Parse one raw output line as a diagnostic candidate
/// @ai:post Some(d) implies d.line >= 1 and d.column is None or >= 1
/// @ai:example classify_line("a.pas(5,12) Warning: unused") -> Some(Diagnostic { line: 5, column: Some(12), .. })
/// @ai:edge_cases numeric fields that overflow u32 or a zero line make the line unrecognized
/// @ai:edge_cases a zero column is treated as an omitted column
/// @ai:effects pure
pub fn classify_line(text: &str) -> Option<Diagnostic> {
    let captures = DIAGNOSTIC_RE.captures(text.trim())?;

    let line: u32 = captures[2].parse().ok()?;
    if line == 0 {
        return None;
    }

    let column = match captures.get(3) {
        Some(m) => Some(m.as_str().parse::<u32>().ok()?).filter(|c| *c > 0),
        None => None,
    };

    let severity = Severity::from_label(&captures[4])?;
    let raw_message = &captures[5];

    let (message, user_defined) = match raw_message.strip_prefix(USER_DEFINED_PREFIX) {
        Some(rest) => (rest, true),
        None => (raw_message, false),
    };

    Some(Diagnostic {
        path: captures[1].to_string(),
        line,
        column,
        severity,
        message: message.to_string(),
        user_defined,
    })
}
