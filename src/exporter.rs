//! Facade wiring the source registry, one export session and file delivery.
use crate::delivery::{DeliveryReport, FileDelivery};
use crate::errors::ExportError;
use crate::export::{self, ExportFormat, RenderOptions};
use crate::session::{ExportSession, ExportState, LoadApplied, Phase};
use crate::source::{LoadContext, SourceKind, SourceRegistry};
use std::sync::Arc;

pub struct Exporter {
    registry: SourceRegistry,
    session: ExportSession,
    delivery: Arc<dyn FileDelivery>,
}

impl Exporter {
    pub fn new(
        registry: SourceRegistry,
        opts: RenderOptions,
        delivery: Arc<dyn FileDelivery>,
    ) -> Self {
        Self {
            registry,
            session: ExportSession::new(opts),
            delivery,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    #[must_use]
    pub fn session(&self) -> &ExportSession {
        &self.session
    }

    #[must_use]
    pub fn state(&self) -> Option<&ExportState> {
        self.session.state()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    /// Switch to `kind` and load its records. A pending outcome leaves the
    /// session loading; call again once the session status settles.
    pub async fn select_source(&mut self, kind: SourceKind, ctx: &LoadContext) -> LoadApplied {
        let ticket = self.session.select_source(kind);
        let outcome = self.registry.load(kind, ctx).await;
        self.session.apply_load(ticket, outcome)
    }

    pub fn toggle_field(&mut self, key: &str) {
        self.session.toggle_field(key);
    }

    /// Select exactly `keys` (in any order); unknown keys are ignored.
    pub fn select_only(&mut self, keys: &[&str]) {
        let Some(state) = self.session.state() else {
            return;
        };
        let toggles: Vec<&'static str> = state
            .source()
            .keys()
            .filter(|k| keys.contains(k) != state.selected_fields().contains(*k))
            .collect();
        for key in toggles {
            self.session.toggle_field(key);
        }
    }

    pub fn set_format(&mut self, format: ExportFormat) {
        self.session.set_format(format);
    }

    /// # Errors
    /// `PreviewBlocked` while loading or under an authentication condition.
    pub fn preview(&mut self) -> Result<&str, ExportError> {
        self.session.preview()
    }

    /// Render the preview on the blocking pool. Returns `Ok(None)` when the
    /// inputs changed while rendering and the result was dropped.
    ///
    /// # Errors
    /// As [`Self::preview`], plus `Task` if the render task failed.
    pub async fn preview_deferred(&mut self) -> Result<Option<String>, ExportError> {
        let req = self.session.begin_preview()?;
        let text = export::render_deferred(
            req.records.clone(),
            req.descriptor,
            req.selected.clone(),
            req.format,
            req.opts.clone(),
        )
        .await?;
        Ok(self.session.complete_preview(&req, text.clone()).then_some(text))
    }

    /// Hand the rendered payload to the delivery collaborator.
    ///
    /// # Errors
    /// `DownloadBlocked` when no preview is ready, or a delivery failure.
    pub fn download(&self) -> Result<DeliveryReport, ExportError> {
        let payload = self.session.download()?;
        let report = self.delivery.deliver(&payload)?;
        log::info!(
            "exporter: delivered {} ({} bytes)",
            payload.filename,
            report.bytes
        );
        Ok(report)
    }
}
