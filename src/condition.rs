//! User-facing conditions raised while loading a source.
//!
//! None of these are failures of the pipeline itself: they are carried on the
//! export state as messages and gate what the caller may do next.
use serde::Serialize;
use std::fmt;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// No current compound and nothing cached.
    NoActiveRecord,
    /// History requested without an authenticated principal.
    AuthenticationRequired,
    /// History fetch failed; the caller re-selects the source to retry.
    AuthenticationExpired,
    /// Fetch succeeded but returned nothing.
    EmptyResultSet,
}

impl Condition {
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Condition::EmptyResultSet => Severity::Info,
            Condition::NoActiveRecord
            | Condition::AuthenticationRequired
            | Condition::AuthenticationExpired => Severity::Error,
        }
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Condition::NoActiveRecord => {
                "No active research data. Search for a compound in the Research tab first."
            }
            Condition::AuthenticationRequired => "You must be logged in to export model data.",
            Condition::AuthenticationExpired => {
                "Authentication expired. Select the source again to retry."
            }
            Condition::EmptyResultSet => "No model data found for your account.",
        }
    }

    #[must_use]
    pub const fn blocks_download(self) -> bool {
        matches!(self.severity(), Severity::Error)
    }

    /// Auth conditions hide the preview entirely; a missing compound still
    /// previews (to empty text).
    #[must_use]
    pub const fn blocks_preview(self) -> bool {
        matches!(
            self,
            Condition::AuthenticationRequired | Condition::AuthenticationExpired
        )
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
