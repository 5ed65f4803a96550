//! @ai:module:intent Closed severity and channel enumerations with their mapping tables
//! @ai:module:layer domain
//! @ai:module:public_api Severity, Channel, SeverityMask
//! @ai:module:stateless true

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// @ai:intent Severity of a compiler diagnostic as printed by the compiler
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Fatal,
    Error,
    Warning,
    Note,
    Hint,
}

/// @ai:intent External annotation tier a diagnostic is published under
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Error,
    Warning,
    Notice,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Fatal,
        Severity::Error,
        Severity::Warning,
        Severity::Note,
        Severity::Hint,
    ];

    /// @ai:intent Parse the capitalized label used on the compiler's output line
    /// @ai:pre label is case-sensitive, e.g. "Warning" but not "warning"
    /// @ai:effects pure
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Fatal" => Some(Severity::Fatal),
            "Error" => Some(Severity::Error),
            "Warning" => Some(Severity::Warning),
            "Note" => Some(Severity::Note),
            "Hint" => Some(Severity::Hint),
            _ => None,
        }
    }

    /// @ai:intent Lower-case identifier of the severity
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Fatal => "fatal",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Hint => "hint",
        }
    }

    /// @ai:intent Human label used in annotation titles
    /// @ai:effects pure
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Fatal => "Fatal error",
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Note => "Note",
            Severity::Hint => "Hint",
        }
    }

    /// @ai:intent Reporting bucket; fatal shares the error bucket
    /// @ai:post result != Severity::Fatal
    /// @ai:effects pure
    pub fn bucket(&self) -> Severity {
        match self {
            Severity::Fatal | Severity::Error => Severity::Error,
            other => *other,
        }
    }

    /// @ai:intent Whether diagnostics of this severity break the build
    /// @ai:effects pure
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Fatal | Severity::Error)
    }

    /// @ai:intent Annotation channel for this severity
    /// @ai:effects pure
    pub fn channel(&self) -> Channel {
        match self {
            Severity::Fatal | Severity::Error => Channel::Error,
            Severity::Warning => Channel::Warning,
            Severity::Note | Severity::Hint => Channel::Notice,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Channel {
    /// @ai:intent Command name used by the workflow annotation protocol
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Error => "error",
            Channel::Warning => "warning",
            Channel::Notice => "notice",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// @ai:intent Set of reporting buckets selected by an `ewnh`-style character string
/// @ai:invariant fatal is never addressed directly, it follows `error`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityMask {
    pub error: bool,
    pub warning: bool,
    pub note: bool,
    pub hint: bool,
}

impl SeverityMask {
    /// @ai:intent Mask selecting every bucket
    pub fn all() -> Self {
        Self {
            error: true,
            warning: true,
            note: true,
            hint: true,
        }
    }

    /// @ai:intent Check whether a severity's bucket is selected
    /// @ai:effects pure
    pub fn contains(&self, severity: Severity) -> bool {
        match severity {
            Severity::Fatal | Severity::Error => self.error,
            Severity::Warning => self.warning,
            Severity::Note => self.note,
            Severity::Hint => self.hint,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.error || self.warning || self.note || self.hint)
    }

    /// @ai:intent Render the mask back to its canonical character form
    /// @ai:example SeverityMask::all().chars() -> "ewnh"
    /// @ai:effects pure
    pub fn chars(&self) -> String {
        [
            (self.error, 'e'),
            (self.warning, 'w'),
            (self.note, 'n'),
            (self.hint, 'h'),
        ]
        .iter()
        .filter(|(on, _)| *on)
        .map(|(_, c)| *c)
        .collect()
    }
}

impl FromStr for SeverityMask {
    type Err = Error;

    /// @ai:intent Parse an `ewnh` subset; duplicates are tolerated
    /// @ai:edge_cases "" yields an empty mask
    fn from_str(s: &str) -> Result<Self> {
        let mut mask = SeverityMask::default();
        for c in s.chars() {
            match c {
                'e' => mask.error = true,
                'w' => mask.warning = true,
                'n' => mask.note = true,
                'h' => mask.hint = true,
                other => {
                    return Err(Error::Config(format!(
                        "illegal character {other:?} in severity set {s:?} (only 'e', 'w', 'n', 'h' are allowed)"
                    )))
                }
            }
        }
        Ok(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_shares_error_bucket_and_channel() {
        assert_eq!(Severity::Fatal.bucket(), Severity::Error);
        assert_eq!(Severity::Fatal.channel(), Channel::Error);
        assert_eq!(Severity::Fatal.label(), "Fatal error");
        assert_eq!(Severity::Fatal.as_str(), "fatal");
    }

    #[test]
    fn test_notes_and_hints_are_notices() {
        assert_eq!(Severity::Note.channel(), Channel::Notice);
        assert_eq!(Severity::Hint.channel(), Channel::Notice);
        assert_eq!(Severity::Warning.channel(), Channel::Warning);
    }

    #[test]
    fn test_labels_are_case_sensitive() {
        assert_eq!(Severity::from_label("Hint"), Some(Severity::Hint));
        assert_eq!(Severity::from_label("hint"), None);
        assert_eq!(Severity::from_label("Info"), None);
    }

    #[test]
    fn test_mask_parse() {
        let mask: SeverityMask = "ew".parse().unwrap();
        assert!(mask.contains(Severity::Fatal));
        assert!(mask.contains(Severity::Warning));
        assert!(!mask.contains(Severity::Hint));
        assert_eq!(mask.chars(), "ew");
        assert!("".parse::<SeverityMask>().unwrap().is_empty());
    }

    #[test]
    fn test_mask_rejects_unknown_character() {
        let err = "ewx".parse::<SeverityMask>().unwrap_err();
        assert!(err.to_string().contains("'x'"));
    }
}
