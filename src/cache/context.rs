use crate::cache::store::{CURRENT_RECORD_KEY, CacheStore};
use crate::errors::ExportError;
use crate::record::CompoundData;
use parking_lot::RwLock;
use std::sync::Arc;

/// Holder of the live "current" compound record.
///
/// Setting a record also persists it under [`CURRENT_RECORD_KEY`]; setting
/// `None` clears that entry. The live slot is never filled from the cache, so
/// a load can still tell a live record from a cached one.
pub struct ResearchContext {
    current: RwLock<Option<CompoundData>>,
    cache: Arc<dyn CacheStore>,
}

impl ResearchContext {
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self {
            current: RwLock::new(None),
            cache,
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<CompoundData> {
        self.current.read().clone()
    }

    /// # Errors
    /// Returns an error if the cache write or clear fails; the live slot is
    /// updated regardless.
    pub fn set(&self, record: Option<CompoundData>) -> Result<(), ExportError> {
        let res = match &record {
            Some(r) => {
                log::info!("research: current record set to {}", r.display_identifier());
                self.cache.write(CURRENT_RECORD_KEY, r)
            }
            None => {
                log::info!("research: current record cleared");
                self.cache.clear(CURRENT_RECORD_KEY)
            }
        };
        *self.current.write() = record;
        res
    }

    /// Cached record from an earlier session, if any.
    ///
    /// # Errors
    /// Propagates cache read/decoding failures.
    pub fn last_cached(&self) -> Result<Option<CompoundData>, ExportError> {
        self.cache.read(CURRENT_RECORD_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheStore;
    use crate::test_support::compound;

    #[test]
    fn set_persists_and_clear_removes() {
        let store = Arc::new(MemoryCacheStore::new());
        let ctx = ResearchContext::new(store.clone());
        ctx.set(Some(compound("CCO"))).unwrap();
        assert!(ctx.current().is_some());
        assert!(store.read(CURRENT_RECORD_KEY).unwrap().is_some());

        ctx.set(None).unwrap();
        assert!(ctx.current().is_none());
        assert!(ctx.last_cached().unwrap().is_none());
    }

    #[test]
    fn new_context_does_not_hydrate_live_slot() {
        let store = Arc::new(MemoryCacheStore::new());
        store.write(CURRENT_RECORD_KEY, &compound("CCO")).unwrap();
        let ctx = ResearchContext::new(store);
        assert!(ctx.current().is_none());
        assert!(ctx.last_cached().unwrap().is_some());
    }
}
