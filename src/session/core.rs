use crate::errors::ExportError;
use crate::export::{self, ExportFormat, FieldSelection, Payload, RenderOptions};
use crate::record::RecordSet;
use crate::session::state::{ExportState, Phase};
use crate::source::{LoadOutcome, SourceDescriptor, SourceKind};

/// Handle for one issued load. Results are committed only while the handle
/// still names the active selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub kind: SourceKind,
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadApplied {
    Applied,
    /// The session is still resolving; load again once it settles.
    Pending,
    /// Superseded by a later source selection; nothing changed.
    Stale,
}

/// Inputs captured for a preview rendered off the session.
#[derive(Debug, Clone)]
pub struct PreviewRequest {
    pub records: RecordSet,
    pub descriptor: &'static SourceDescriptor,
    pub selected: FieldSelection,
    pub format: ExportFormat,
    pub opts: RenderOptions,
    revision: u64,
}

/// Single-threaded driver of one export flow:
/// `Idle -> SourceSelected -> FieldsConfigured -> PreviewReady`.
///
/// Concurrent loads are resolved last-writer-wins by generation; any change to
/// the preview inputs bumps a revision that invalidates in-flight previews.
#[derive(Debug)]
pub struct ExportSession {
    state: Option<ExportState>,
    phase: Phase,
    format: ExportFormat,
    opts: RenderOptions,
    loading: bool,
    generation: u64,
    revision: u64,
}

impl ExportSession {
    pub fn new(opts: RenderOptions) -> Self {
        Self {
            state: None,
            phase: Phase::Idle,
            format: ExportFormat::default(),
            opts,
            loading: false,
            generation: 0,
            revision: 0,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn state(&self) -> Option<&ExportState> {
        self.state.as_ref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn format(&self) -> ExportFormat {
        self.format
    }

    #[must_use]
    pub fn render_options(&self) -> &RenderOptions {
        &self.opts
    }

    /// Start over on `kind`. The returned ticket must accompany the load result.
    pub fn select_source(&mut self, kind: SourceKind) -> LoadTicket {
        self.generation += 1;
        self.revision += 1;
        self.state = Some(ExportState::new(kind, self.format));
        self.phase = Phase::SourceSelected;
        self.loading = true;
        log::debug!("session: source={kind} generation={}", self.generation);
        LoadTicket {
            kind,
            generation: self.generation,
        }
    }

    /// Commit a load result unless a later selection superseded it.
    pub fn apply_load(&mut self, ticket: LoadTicket, outcome: LoadOutcome) -> LoadApplied {
        let Some(state) = self.state.as_mut() else {
            return LoadApplied::Stale;
        };
        if ticket.generation != self.generation
            || ticket.kind != state.kind()
            || outcome.kind != ticket.kind
        {
            log::debug!(
                "session: discarding stale load for {} (generation {})",
                outcome.kind,
                ticket.generation
            );
            return LoadApplied::Stale;
        }
        state.set_info(outcome.note);
        if outcome.pending {
            state.set_condition(None);
            return LoadApplied::Pending;
        }
        self.revision += 1;
        state.set_records(outcome.records);
        state.set_condition(outcome.condition);
        state.set_from_cache(outcome.from_cache);
        self.loading = false;
        self.phase = Phase::FieldsConfigured;
        LoadApplied::Applied
    }

    /// Flip `key` in the selection. Keys outside the active schema are ignored.
    pub fn toggle_field(&mut self, key: &str) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if state.source().field(key).is_none() {
            log::debug!("session: ignoring toggle of unknown field {key}");
            return;
        }
        export::toggle_field(state.selected_fields_mut(), key);
        self.revision += 1;
        self.fall_back_from_preview();
    }

    pub fn set_format(&mut self, format: ExportFormat) {
        self.format = format;
        if let Some(state) = self.state.as_mut() {
            state.set_format(format);
            self.revision += 1;
            self.fall_back_from_preview();
        }
    }

    fn fall_back_from_preview(&mut self) {
        if self.phase == Phase::PreviewReady {
            self.phase = Phase::FieldsConfigured;
        }
    }

    fn previewable(&self) -> Result<&ExportState, ExportError> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| ExportError::PreviewBlocked("no source selected".into()))?;
        if self.loading {
            return Err(ExportError::PreviewBlocked("records are still loading".into()));
        }
        if let Some(c) = state.condition().filter(|c| c.blocks_preview()) {
            return Err(ExportError::PreviewBlocked(c.message().into()));
        }
        Ok(state)
    }

    /// Capture the current inputs for rendering elsewhere.
    ///
    /// # Errors
    /// `PreviewBlocked` when no source is loaded or an auth condition is set.
    pub fn begin_preview(&self) -> Result<PreviewRequest, ExportError> {
        let state = self.previewable()?;
        Ok(PreviewRequest {
            records: state.records().clone(),
            descriptor: state.source(),
            selected: state.selected_fields().clone(),
            format: state.format(),
            opts: self.opts.clone(),
            revision: self.revision,
        })
    }

    /// Store a preview rendered from `request`. Returns `false` if the inputs
    /// changed meanwhile and the text was dropped.
    pub fn complete_preview(&mut self, request: &PreviewRequest, text: String) -> bool {
        if request.revision != self.revision {
            return false;
        }
        match self.state.as_mut() {
            Some(state) => {
                state.set_preview(text);
                self.phase = Phase::PreviewReady;
                true
            }
            None => false,
        }
    }

    /// Render and cache the preview.
    ///
    /// # Errors
    /// `PreviewBlocked` as for [`Self::begin_preview`], or a rendering failure.
    pub fn preview(&mut self) -> Result<&str, ExportError> {
        let req = self.begin_preview()?;
        let text = export::render(
            &req.records,
            req.descriptor,
            &req.selected,
            req.format,
            &req.opts,
        )?;
        self.complete_preview(&req, text);
        Ok(self.state.as_ref().map_or("", ExportState::preview_text))
    }

    /// Why a download is not possible right now, if it is not.
    #[must_use]
    pub fn download_blocker(&self) -> Option<String> {
        let Some(state) = self.state.as_ref() else {
            return Some("no source selected".into());
        };
        if self.loading {
            return Some("records are still loading".into());
        }
        if let Some(msg) = state.error_message() {
            return Some(msg.to_string());
        }
        if self.phase != Phase::PreviewReady || state.preview_text().is_empty() {
            return Some("generate a preview first".into());
        }
        None
    }

    #[must_use]
    pub fn can_download(&self) -> bool {
        self.download_blocker().is_none()
    }

    /// Render the final payload for the file-delivery collaborator.
    ///
    /// # Errors
    /// `DownloadBlocked` unless a non-empty preview is ready and no blocking
    /// condition is set.
    pub fn download(&self) -> Result<Payload, ExportError> {
        if let Some(reason) = self.download_blocker() {
            return Err(ExportError::DownloadBlocked(reason));
        }
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| ExportError::DownloadBlocked("no source selected".into()))?;
        let text = export::render(
            state.records(),
            state.source(),
            state.selected_fields(),
            state.format(),
            &self.opts,
        )?;
        debug_assert_eq!(text, state.preview_text());
        Ok(export::to_payload(state.kind(), state.format(), &text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use crate::export::TimestampStyle;
    use crate::test_support::two_entry_catalog;

    fn session() -> ExportSession {
        ExportSession::new(RenderOptions {
            timestamps: TimestampStyle::utc(),
            ..Default::default()
        })
    }

    fn catalog_outcome() -> LoadOutcome {
        LoadOutcome {
            kind: SourceKind::Catalog,
            records: RecordSet::Catalog(two_entry_catalog()),
            condition: None,
            from_cache: false,
            note: None,
            pending: false,
        }
    }

    #[test]
    fn stale_load_after_switch_is_discarded() {
        let mut s = session();
        let first = s.select_source(SourceKind::Catalog);
        let _second = s.select_source(SourceKind::RecordList);
        assert_eq!(s.apply_load(first, catalog_outcome()), LoadApplied::Stale);
        assert_eq!(s.state().unwrap().kind(), SourceKind::RecordList);
        assert!(s.is_loading());
    }

    #[test]
    fn same_kind_reselected_still_discards_older_ticket() {
        let mut s = session();
        let old = s.select_source(SourceKind::Catalog);
        let new = s.select_source(SourceKind::Catalog);
        assert_eq!(s.apply_load(old, catalog_outcome()), LoadApplied::Stale);
        assert_eq!(s.apply_load(new, catalog_outcome()), LoadApplied::Applied);
    }

    #[test]
    fn phases_follow_the_flow() {
        let mut s = session();
        assert_eq!(s.phase(), Phase::Idle);
        let t = s.select_source(SourceKind::Catalog);
        assert_eq!(s.phase(), Phase::SourceSelected);
        assert!(s.preview().is_err());
        s.apply_load(t, catalog_outcome());
        assert_eq!(s.phase(), Phase::FieldsConfigured);
        assert!(!s.can_download());
        s.preview().unwrap();
        assert_eq!(s.phase(), Phase::PreviewReady);
        assert!(s.can_download());
        s.toggle_field("smilesStructure");
        assert_eq!(s.phase(), Phase::FieldsConfigured);
        assert_eq!(s.state().unwrap().preview_text(), "");
        assert!(matches!(s.download(), Err(ExportError::DownloadBlocked(_))));
    }

    #[test]
    fn toggling_a_key_outside_the_schema_changes_nothing() {
        let mut s = session();
        let t = s.select_source(SourceKind::Catalog);
        s.apply_load(t, catalog_outcome());
        let preview = s.preview().unwrap().to_string();
        let before = s.state().unwrap().selected_fields().clone();
        s.toggle_field("smiles");
        assert_eq!(s.state().unwrap().selected_fields(), &before);
        assert_eq!(s.state().unwrap().preview_text(), preview);
        assert_eq!(s.phase(), Phase::PreviewReady);
        assert!(s.can_download());
    }

    #[test]
    fn preview_rendered_before_a_change_is_dropped() {
        let mut s = session();
        let t = s.select_source(SourceKind::Catalog);
        s.apply_load(t, catalog_outcome());
        let req = s.begin_preview().unwrap();
        s.set_format(ExportFormat::Table);
        assert!(!s.complete_preview(&req, "old".into()));
        assert_eq!(s.phase(), Phase::FieldsConfigured);
    }

    #[test]
    fn pending_load_keeps_session_loading() {
        let mut s = session();
        let t = s.select_source(SourceKind::RecordList);
        let out = LoadOutcome {
            kind: SourceKind::RecordList,
            records: RecordSet::RecordList(vec![]),
            condition: None,
            from_cache: false,
            note: Some("Preparing model data...".into()),
            pending: true,
        };
        assert_eq!(s.apply_load(t, out), LoadApplied::Pending);
        assert!(s.is_loading());
        assert_eq!(s.state().unwrap().info_message(), Some("Preparing model data..."));
        assert!(s.preview().is_err());
    }

    #[test]
    fn auth_condition_blocks_preview() {
        let mut s = session();
        let t = s.select_source(SourceKind::RecordList);
        let mut out = catalog_outcome();
        out.kind = SourceKind::RecordList;
        out.records = RecordSet::RecordList(vec![]);
        out.condition = Some(Condition::AuthenticationRequired);
        s.apply_load(t, out);
        assert!(matches!(s.preview(), Err(ExportError::PreviewBlocked(_))));
        assert!(!s.can_download());
    }
}
