use crate::errors::ExportError;
use crate::source::SourceKind;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Field-per-line report, downloaded with a PDF label.
    #[default]
    Report,
    /// Delimited rows with a header line.
    Table,
}

impl ExportFormat {
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Table => "text/csv",
            ExportFormat::Report => "application/pdf",
        }
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            ExportFormat::Table => "csv",
            ExportFormat::Report => "pdf",
        }
    }

    /// Separator between nested list items in a rendered cell.
    #[must_use]
    pub const fn list_separator(self) -> &'static str {
        match self {
            ExportFormat::Table => ";",
            ExportFormat::Report => "; ",
        }
    }

    /// `<slug>_data.csv` or `<slug>_report.pdf`.
    #[must_use]
    pub fn filename_for(self, kind: SourceKind) -> String {
        match self {
            ExportFormat::Table => format!("{}_data.{}", kind.slug(), self.extension()),
            ExportFormat::Report => format!("{}_report.{}", kind.slug(), self.extension()),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Report => "report",
            ExportFormat::Table => "table",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" | "csv" => Ok(ExportFormat::Table),
            "report" | "pdf" => Ok(ExportFormat::Report),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CsvOptions {
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// en-US `toLocaleString` shape, e.g. `3/1/2024, 2:05:09 PM`.
pub const DEFAULT_TIMESTAMP_PATTERN: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// How timestamp fields are rendered. This is the one environment-dependent
/// input to rendering when `utc` is off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampStyle {
    pattern: String,
    pub utc: bool,
}

impl TimestampStyle {
    /// # Errors
    /// Returns `Config` if `pattern` contains an invalid strftime specifier.
    pub fn new(pattern: &str, utc: bool) -> Result<Self, ExportError> {
        if StrftimeItems::new(pattern).any(|i| matches!(i, Item::Error)) {
            return Err(ExportError::Config(format!("invalid timestamp pattern: {pattern}")));
        }
        Ok(Self {
            pattern: pattern.to_string(),
            utc,
        })
    }

    #[must_use]
    pub fn utc() -> Self {
        Self {
            pattern: DEFAULT_TIMESTAMP_PATTERN.to_string(),
            utc: true,
        }
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl Default for TimestampStyle {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_TIMESTAMP_PATTERN.to_string(),
            utc: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub csv: CsvOptions,
    pub timestamps: TimestampStyle,
}

/// Rendered bytes plus the name and type they should be saved under.
///
/// A `Report` payload is the plain report text labeled `application/pdf`;
/// no PDF layout is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime_type: &'static str,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExportReport {
    pub written: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_follow_slug_and_format() {
        assert_eq!(
            ExportFormat::Table.filename_for(SourceKind::Catalog),
            "moleculeBank_data.csv"
        );
        assert_eq!(
            ExportFormat::Report.filename_for(SourceKind::RecordList),
            "model_report.pdf"
        );
        assert_eq!(ExportFormat::Report.mime_type(), "application/pdf");
    }

    #[test]
    fn format_parsing_accepts_aliases() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Table);
        assert_eq!("pdf".parse::<ExportFormat>().unwrap(), ExportFormat::Report);
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn invalid_timestamp_pattern_is_rejected() {
        assert!(TimestampStyle::new("%Y-%m-%d", true).is_ok());
        assert!(TimestampStyle::new("%Q!", true).is_err());
    }
}
