use crate::condition::{Condition, Severity};
use crate::export::{ExportFormat, FieldSelection, all_fields};
use crate::record::RecordSet;
use crate::source::{SourceDescriptor, SourceKind, resolve};
use serde::Serialize;

/// Where an export session is in its lifecycle.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    SourceSelected,
    FieldsConfigured,
    PreviewReady,
}

/// Everything one export session knows about the selected source.
///
/// `preview_text` is a cache of rendering `(records, schema, selected_fields,
/// format)`; every mutation of those inputs clears it.
#[derive(Debug, Clone)]
pub struct ExportState {
    source: &'static SourceDescriptor,
    records: RecordSet,
    selected_fields: FieldSelection,
    format: ExportFormat,
    preview_text: String,
    condition: Option<Condition>,
    info_message: Option<String>,
    from_cache: bool,
}

impl ExportState {
    /// Fresh state for `kind`: no records, all fields selected.
    #[must_use]
    pub fn new(kind: SourceKind, format: ExportFormat) -> Self {
        let source = resolve(kind);
        Self {
            source,
            records: RecordSet::empty(kind),
            selected_fields: all_fields(source),
            format,
            preview_text: String::new(),
            condition: None,
            info_message: None,
            from_cache: false,
        }
    }

    #[must_use]
    pub fn source(&self) -> &'static SourceDescriptor {
        self.source
    }

    #[must_use]
    pub fn kind(&self) -> SourceKind {
        self.source.kind
    }

    #[must_use]
    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    #[must_use]
    pub fn selected_fields(&self) -> &FieldSelection {
        &self.selected_fields
    }

    #[must_use]
    pub fn format(&self) -> ExportFormat {
        self.format
    }

    #[must_use]
    pub fn preview_text(&self) -> &str {
        &self.preview_text
    }

    #[must_use]
    pub fn condition(&self) -> Option<Condition> {
        self.condition
    }

    #[must_use]
    pub fn from_cache(&self) -> bool {
        self.from_cache
    }

    /// Message of a blocking condition, if one is set.
    #[must_use]
    pub fn error_message(&self) -> Option<&'static str> {
        self.condition
            .filter(|c| c.severity() == Severity::Error)
            .map(Condition::message)
    }

    /// Informational text: an explicit note wins over an informational condition.
    #[must_use]
    pub fn info_message(&self) -> Option<&str> {
        self.info_message.as_deref().or_else(|| {
            self.condition
                .filter(|c| c.severity() == Severity::Info)
                .map(Condition::message)
        })
    }

    pub(crate) fn set_records(&mut self, records: RecordSet) {
        self.records = records;
        self.selected_fields = all_fields(self.source);
        self.preview_text.clear();
    }

    pub(crate) fn set_condition(&mut self, condition: Option<Condition>) {
        self.condition = condition;
    }

    pub(crate) fn set_info(&mut self, note: Option<String>) {
        self.info_message = note;
    }

    pub(crate) fn set_from_cache(&mut self, from_cache: bool) {
        self.from_cache = from_cache;
    }

    pub(crate) fn selected_fields_mut(&mut self) -> &mut FieldSelection {
        self.preview_text.clear();
        &mut self.selected_fields
    }

    pub(crate) fn set_format(&mut self, format: ExportFormat) {
        self.format = format;
        self.preview_text.clear();
    }

    pub(crate) fn set_preview(&mut self, text: String) {
        self.preview_text = text;
    }
}
