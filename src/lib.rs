pub mod cache;
pub mod cli;
pub mod condition;
pub mod config;
pub mod delivery;
pub mod errors;
pub mod export;
pub mod exporter;
pub mod logger;
pub mod record;
pub mod session;
pub mod source;
pub mod types;

#[cfg(test)]
mod test_support;

pub use condition::{Condition, Severity};
pub use errors::ExportError;
pub use export::{ExportFormat, FieldSelection, Payload, RenderOptions};
pub use exporter::Exporter;
pub use record::RecordSet;
pub use session::{ExportSession, ExportState, Phase};
pub use source::{LoadContext, SessionStatus, SourceKind, SourceRegistry};

/// Initializes logging from the `NUCLEO_EXPORT_LOG_*` environment variables.
///
/// Call once before other operations when file logging is wanted.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    logger::configure_from_env()
}
