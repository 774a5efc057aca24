use crate::errors::ExportError;
use crate::export::ExportFormat;
use crate::source::{Principal, SessionStatus, SourceKind};

pub fn parse_format_input(s: &Option<String>) -> Option<String> {
    s.as_ref().map(|x| x.to_lowercase())
}

/// `table`/`csv` or `report`/`pdf`; defaults to report.
pub fn parse_export_format(s: &Option<String>) -> Result<ExportFormat, ExportError> {
    match parse_format_input(s) {
        Some(f) => f.parse(),
        None => Ok(ExportFormat::default()),
    }
}

pub fn parse_source(s: &str) -> Result<SourceKind, ExportError> {
    s.trim().parse()
}

/// Comma-separated field keys; blanks are dropped.
pub fn parse_fields(s: &str) -> Vec<String> {
    s.split(',')
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect()
}

pub fn session_for(user: Option<&str>) -> SessionStatus {
    match user.map(str::trim) {
        Some(id) if !id.is_empty() => SessionStatus::Authenticated(Principal::new(id)),
        _ => SessionStatus::Unauthenticated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_format_parsing() {
        assert_eq!(
            parse_export_format(&Some("CSV".into())).unwrap(),
            ExportFormat::Table
        );
        assert_eq!(
            parse_export_format(&Some("report".into())).unwrap(),
            ExportFormat::Report
        );
        assert_eq!(parse_export_format(&None).unwrap(), ExportFormat::Report);
        assert!(parse_export_format(&Some("bson".into())).is_err());
    }

    #[test]
    fn source_parsing_accepts_aliases() {
        assert_eq!(parse_source("moleculeBank").unwrap(), SourceKind::Catalog);
        assert_eq!(parse_source(" model ").unwrap(), SourceKind::RecordList);
        assert!(matches!(
            parse_source("orders"),
            Err(ExportError::UnsupportedSourceKind(_))
        ));
    }

    #[test]
    fn field_list_parsing() {
        assert_eq!(
            parse_fields("smiles, createdAt,,"),
            vec!["smiles".to_string(), "createdAt".to_string()]
        );
        assert!(parse_fields(" ").is_empty());
    }

    #[test]
    fn blank_user_is_unauthenticated() {
        assert_eq!(session_for(Some("  ")), SessionStatus::Unauthenticated);
        assert_eq!(session_for(None), SessionStatus::Unauthenticated);
        assert!(matches!(
            session_for(Some("u1")),
            SessionStatus::Authenticated(_)
        ));
    }
}
