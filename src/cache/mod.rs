mod context;
mod metrics;
mod store;

pub use context::ResearchContext;
pub use metrics::{CacheMetrics, CacheMetricsSnapshot};
pub use store::{CURRENT_RECORD_KEY, CacheStore, FileCacheStore, MemoryCacheStore};
