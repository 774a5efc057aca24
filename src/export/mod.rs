//! Export engine: field selection, value rules, table/report rendering and
//! payload packaging.
mod options;
mod pipeline;
mod sinks;
mod value;

pub use options::{
    CsvOptions, DEFAULT_TIMESTAMP_PATTERN, ExportFormat, ExportReport, Payload, RenderOptions,
    TimestampStyle,
};
pub use pipeline::{
    FieldSelection, all_fields, render, render_deferred, render_into, to_payload, toggle_field,
};
pub use sinks::{RecordSink, ReportSink, TableSink};
pub use value::{format_timestamp, join_items, render_value};
