//! Per-session export state and its state machine.
mod core;
mod state;

pub use self::core::{ExportSession, LoadApplied, LoadTicket, PreviewRequest};
pub use state::{ExportState, Phase};
