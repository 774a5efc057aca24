mod command;
mod runner;
mod util;

pub use command::Command;
pub use runner::{CliContext, OutputMode, run, run_with_format};
pub use util::{parse_export_format, parse_fields, parse_source, session_for};
