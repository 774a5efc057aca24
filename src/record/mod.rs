//! Record shapes for the three source kinds.
mod set;
mod types;

pub use set::RecordSet;
pub use types::{CatalogEntry, CompoundData, FieldValue, GeneratedMolecule, GenerationRecord};
