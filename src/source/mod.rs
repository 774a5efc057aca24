//! Source registry: schemas per source kind and record loading.
mod descriptor;
mod providers;
mod registry;

pub use descriptor::{
    CATALOG_FIELDS, Cardinality, FieldRule, FieldSpec, MODEL_FIELDS, RESEARCH_FIELDS,
    SourceDescriptor, SourceKind, resolve,
};
pub use providers::{
    BuiltinCatalog, CatalogSupplier, HistorySupplier, JsonCatalog, JsonHistoryDir, MemoryHistory,
};
pub use registry::{
    LoadContext, LoadOutcome, PREPARING_NOTE, Principal, SessionStatus, SourceRegistry,
};
