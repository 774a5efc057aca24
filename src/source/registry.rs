use crate::cache::{CURRENT_RECORD_KEY, CacheStore};
use crate::condition::Condition;
use crate::record::{CompoundData, RecordSet};
use crate::source::descriptor::{self, SourceDescriptor, SourceKind};
use crate::source::providers::{CatalogSupplier, HistorySupplier};
use crate::types::PrincipalId;
use std::sync::Arc;

pub const PREPARING_NOTE: &str = "Preparing model data...";

/// An authenticated user on whose behalf history is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: PrincipalId,
}

impl Principal {
    pub fn new(id: impl Into<PrincipalId>) -> Self {
        Self { id: id.into() }
    }
}

/// Authentication state as reported by the surrounding application.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// Still being resolved; nothing can be fetched yet.
    Loading,
    #[default]
    Unauthenticated,
    Authenticated(Principal),
}

/// What the caller knows at load time.
#[derive(Debug, Clone, Default)]
pub struct LoadContext {
    pub current: Option<CompoundData>,
    pub session: SessionStatus,
}

impl LoadContext {
    #[must_use]
    pub fn with_current(mut self, record: Option<CompoundData>) -> Self {
        self.current = record;
        self
    }

    #[must_use]
    pub fn with_session(mut self, session: SessionStatus) -> Self {
        self.session = session;
        self
    }

    #[must_use]
    pub fn authenticated(principal_id: &str) -> Self {
        Self::default()
            .with_session(SessionStatus::Authenticated(Principal::new(principal_id)))
    }
}

/// Result of one load, tagged with the kind it was issued for.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    pub kind: SourceKind,
    pub records: RecordSet,
    pub condition: Option<Condition>,
    pub from_cache: bool,
    pub note: Option<String>,
    /// The session was not resolved yet; the caller should load again later.
    pub pending: bool,
}

impl LoadOutcome {
    fn ready(records: RecordSet) -> Self {
        Self {
            kind: records.kind(),
            records,
            condition: None,
            from_cache: false,
            note: None,
            pending: false,
        }
    }

    fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// Maps a source kind to its schema and loads its current records.
///
/// The registry only reads from its collaborators.
#[derive(Clone)]
pub struct SourceRegistry {
    catalog: Arc<dyn CatalogSupplier>,
    cache: Arc<dyn CacheStore>,
    history: Arc<dyn HistorySupplier>,
}

impl SourceRegistry {
    pub fn new(
        catalog: Arc<dyn CatalogSupplier>,
        cache: Arc<dyn CacheStore>,
        history: Arc<dyn HistorySupplier>,
    ) -> Self {
        Self {
            catalog,
            cache,
            history,
        }
    }

    #[must_use]
    pub fn resolve(&self, kind: SourceKind) -> &'static SourceDescriptor {
        descriptor::resolve(kind)
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    pub async fn load(&self, kind: SourceKind, ctx: &LoadContext) -> LoadOutcome {
        log::debug!("registry: load source={kind}");
        match kind {
            SourceKind::Catalog => LoadOutcome::ready(RecordSet::Catalog(self.catalog.entries())),
            SourceKind::SingleRecord => self.load_single(ctx),
            SourceKind::RecordList => self.load_history(ctx).await,
        }
    }

    fn load_single(&self, ctx: &LoadContext) -> LoadOutcome {
        if let Some(current) = &ctx.current {
            return LoadOutcome::ready(RecordSet::SingleRecord(Some(current.clone())));
        }
        let cached = match self.cache.read(CURRENT_RECORD_KEY) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("registry: ignoring unreadable cached record: {e}");
                None
            }
        };
        match cached {
            Some(record) => {
                let note = format!("Exporting last searched data: {}", record.display_identifier());
                let mut out = LoadOutcome::ready(RecordSet::SingleRecord(Some(record)));
                out.from_cache = true;
                out.note = Some(note);
                out
            }
            None => LoadOutcome::ready(RecordSet::SingleRecord(None))
                .with_condition(Condition::NoActiveRecord),
        }
    }

    async fn load_history(&self, ctx: &LoadContext) -> LoadOutcome {
        let empty = || LoadOutcome::ready(RecordSet::RecordList(Vec::new()));
        let principal = match &ctx.session {
            SessionStatus::Loading => {
                let mut out = empty();
                out.pending = true;
                out.note = Some(PREPARING_NOTE.to_string());
                return out;
            }
            SessionStatus::Unauthenticated => {
                return empty().with_condition(Condition::AuthenticationRequired);
            }
            SessionStatus::Authenticated(p) if p.id.is_empty() => {
                return empty().with_condition(Condition::AuthenticationRequired);
            }
            SessionStatus::Authenticated(p) => p,
        };
        match self.history.history_for(&principal.id).await {
            Ok(records) if records.is_empty() => {
                empty().with_condition(Condition::EmptyResultSet)
            }
            Ok(records) => {
                log::info!("registry: fetched {} history records", records.len());
                LoadOutcome::ready(RecordSet::RecordList(records))
            }
            Err(e) => {
                log::warn!("registry: history fetch failed: {e}");
                empty().with_condition(Condition::AuthenticationExpired)
            }
        }
    }
}
