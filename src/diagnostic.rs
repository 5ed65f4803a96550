//! @ai:module:intent Define the diagnostic record produced by the classifier
//! @ai:module:layer domain
//! @ai:module:public_api Diagnostic
//! @ai:module:stateless true

use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// @ai:intent One recognized compiler message
/// @ai:invariant line >= 1 and column, when present, >= 1
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    pub path: String,
    pub line: u32,
    pub column: Option<u32>,
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub user_defined: bool,
}

impl Diagnostic {
    /// @ai:intent Create a diagnostic that did not come from a user directive
    pub fn new(
        path: impl Into<String>,
        line: u32,
        column: Option<u32>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            line,
            column,
            severity,
            message: message.into(),
            user_defined: false,
        }
    }

    /// @ai:intent Format the `(line[,column])` location suffix
    /// @ai:example line=3, column=Some(10) -> "(3,10)"
    /// @ai:effects pure
    pub fn position(&self) -> String {
        match self.column {
            Some(column) => format!("({},{})", self.line, column),
            None => format!("({})", self.line),
        }
    }
}
