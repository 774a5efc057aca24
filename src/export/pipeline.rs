use crate::errors::ExportError;
use crate::record::{FieldValue, RecordSet};
use crate::source::{FieldSpec, SourceDescriptor, SourceKind};
use std::collections::BTreeSet;
use std::io::Write;

use super::options::{ExportFormat, ExportReport, Payload, RenderOptions};
use super::sinks::{RecordSink, ReportSink, TableSink};
use super::value::render_value;

/// Selected field keys. Output order always follows the schema, not this set.
pub type FieldSelection = BTreeSet<String>;

/// Every key of `descriptor`'s schema.
#[must_use]
pub fn all_fields(descriptor: &SourceDescriptor) -> FieldSelection {
    descriptor.keys().map(str::to_string).collect()
}

/// Remove `key` if selected, add it otherwise. Keys outside the schema are
/// not checked here; `ExportSession::toggle_field` drops them first.
pub fn toggle_field(selection: &mut FieldSelection, key: &str) {
    if !selection.remove(key) {
        selection.insert(key.to_string());
    }
}

/// Render `records` to text. Pure in its inputs; the only environment input
/// is the local zone when timestamps are not rendered in UTC.
///
/// # Errors
/// Returns `SchemaMismatch` if `records` does not belong to `descriptor`'s kind.
pub fn render(
    records: &RecordSet,
    descriptor: &SourceDescriptor,
    selected: &FieldSelection,
    format: ExportFormat,
    opts: &RenderOptions,
) -> Result<String, ExportError> {
    let mut buf: Vec<u8> = Vec::new();
    render_into(records, descriptor, selected, format, opts, &mut buf)?;
    String::from_utf8(buf)
        .map_err(|e| ExportError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Render into any writer, returning how many records were written.
///
/// # Errors
/// Returns `SchemaMismatch` on a kind mismatch, or any write failure.
pub fn render_into<W: Write>(
    records: &RecordSet,
    descriptor: &SourceDescriptor,
    selected: &FieldSelection,
    format: ExportFormat,
    opts: &RenderOptions,
    writer: W,
) -> Result<ExportReport, ExportError> {
    if records.kind() != descriptor.kind {
        return Err(ExportError::SchemaMismatch {
            expected: descriptor.kind.to_string(),
            found: records.kind().to_string(),
        });
    }
    let fields: Vec<&FieldSpec> = descriptor
        .schema
        .iter()
        .filter(|f| selected.contains(f.key))
        .collect();
    if fields.is_empty() || matches!(records, RecordSet::SingleRecord(None)) {
        return Ok(ExportReport::default());
    }
    let mut sink: Box<dyn RecordSink + '_> = match format {
        ExportFormat::Table => Box::new(TableSink::new(writer, opts.csv.delimiter)),
        ExportFormat::Report => Box::new(ReportSink::new(writer)),
    };
    sink.begin(&fields)?;
    let sink_ref = sink.as_mut();
    let written = match records {
        RecordSet::Catalog(rows) => emit(sink_ref, &fields, rows, |r, k| r.field(k), format, opts)?,
        RecordSet::SingleRecord(rec) => {
            emit(sink_ref, &fields, rec.iter(), |r, k| r.field(k), format, opts)?
        }
        RecordSet::RecordList(rows) => {
            emit(sink_ref, &fields, rows, |r, k| r.field(k), format, opts)?
        }
    };
    sink.finish()?;
    log::debug!(
        "render: kind={} format={} records={}",
        descriptor.kind,
        format,
        written
    );
    Ok(ExportReport { written })
}

fn emit<'r, R: 'r>(
    sink: &mut dyn RecordSink,
    fields: &[&FieldSpec],
    rows: impl IntoIterator<Item = &'r R>,
    get: impl Fn(&'r R, &str) -> FieldValue<'r>,
    format: ExportFormat,
    opts: &RenderOptions,
) -> Result<u64, ExportError> {
    let mut written = 0u64;
    let mut cells = Vec::with_capacity(fields.len());
    for row in rows {
        cells.clear();
        cells.extend(
            fields
                .iter()
                .map(|f| render_value(f, &get(row, f.key), format, &opts.timestamps)),
        );
        sink.write_record(fields, &cells)?;
        written += 1;
    }
    Ok(written)
}

/// [`render`] on the blocking pool, for callers that keep their own task
/// responsive.
///
/// # Errors
/// Same as [`render`], plus `Task` if the blocking task panicked or was cancelled.
pub async fn render_deferred(
    records: RecordSet,
    descriptor: &'static SourceDescriptor,
    selected: FieldSelection,
    format: ExportFormat,
    opts: RenderOptions,
) -> Result<String, ExportError> {
    tokio::task::spawn_blocking(move || render(&records, descriptor, &selected, format, &opts))
        .await
        .map_err(|e| ExportError::Task(e.to_string()))?
}

/// Package rendered text for the file-delivery collaborator.
#[must_use]
pub fn to_payload(kind: SourceKind, format: ExportFormat, text: &str) -> Payload {
    Payload {
        bytes: text.as_bytes().to_vec(),
        filename: format.filename_for(kind),
        mime_type: format.mime_type(),
    }
}
