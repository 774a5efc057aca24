use nucleo_export::cache::MemoryCacheStore;
use nucleo_export::export::{ExportFormat, RenderOptions, TimestampStyle, all_fields};
use nucleo_export::session::{ExportSession, LoadApplied, Phase};
use nucleo_export::source::{
    BuiltinCatalog, LoadContext, MemoryHistory, SourceKind, SourceRegistry, resolve,
};
use std::sync::Arc;

fn registry() -> SourceRegistry {
    SourceRegistry::new(
        Arc::new(BuiltinCatalog),
        Arc::new(MemoryCacheStore::new()),
        Arc::new(MemoryHistory::new()),
    )
}

fn session() -> ExportSession {
    ExportSession::new(RenderOptions {
        timestamps: TimestampStyle::utc(),
        ..Default::default()
    })
}

#[tokio::test]
async fn test_switching_source_resets_selection_to_full_schema() {
    let reg = registry();
    let mut s = session();
    let ctx = LoadContext::authenticated("u1");
    for kind in SourceKind::ALL {
        let t = s.select_source(kind);
        s.apply_load(t, reg.load(kind, &ctx).await);
        let first = resolve(kind).schema[0].key;
        s.toggle_field(first);
        assert!(!s.state().unwrap().selected_fields().contains(first));
    }
    for kind in SourceKind::ALL {
        let t = s.select_source(kind);
        assert_eq!(s.state().unwrap().selected_fields(), &all_fields(resolve(kind)));
        s.apply_load(t, reg.load(kind, &ctx).await);
        assert_eq!(s.state().unwrap().selected_fields(), &all_fields(resolve(kind)));
    }
}

#[tokio::test]
async fn test_format_survives_source_switch() {
    let reg = registry();
    let mut s = session();
    s.set_format(ExportFormat::Table);
    let t = s.select_source(SourceKind::Catalog);
    s.apply_load(t, reg.load(SourceKind::Catalog, &LoadContext::default()).await);
    assert_eq!(s.state().unwrap().format(), ExportFormat::Table);
    assert!(s.preview().unwrap().starts_with("Name,"));
}

#[tokio::test]
async fn test_late_result_for_previous_source_is_discarded() {
    let reg = registry();
    let mut s = session();
    let ctx = LoadContext::default();
    let catalog_ticket = s.select_source(SourceKind::Catalog);
    let catalog_load = reg.load(SourceKind::Catalog, &ctx);
    let model_ticket = s.select_source(SourceKind::RecordList);
    let model_out = reg.load(SourceKind::RecordList, &ctx).await;
    assert_eq!(s.apply_load(model_ticket, model_out), LoadApplied::Applied);
    assert_eq!(s.apply_load(catalog_ticket, catalog_load.await), LoadApplied::Stale);
    assert_eq!(s.state().unwrap().kind(), SourceKind::RecordList);
    assert!(s.state().unwrap().records().is_empty());
}

#[tokio::test]
async fn test_preview_is_cached_until_inputs_change() {
    let reg = registry();
    let mut s = session();
    let t = s.select_source(SourceKind::Catalog);
    s.apply_load(t, reg.load(SourceKind::Catalog, &LoadContext::default()).await);
    let first = s.preview().unwrap().to_string();
    assert_eq!(s.phase(), Phase::PreviewReady);
    assert_eq!(s.state().unwrap().preview_text(), first);
    let second = s.preview().unwrap().to_string();
    assert_eq!(first, second);
    s.set_format(ExportFormat::Table);
    assert_eq!(s.state().unwrap().preview_text(), "");
    assert!(!s.can_download());
}

#[tokio::test]
async fn test_download_payload_matches_preview() {
    let reg = registry();
    let mut s = session();
    s.set_format(ExportFormat::Table);
    let t = s.select_source(SourceKind::Catalog);
    s.apply_load(t, reg.load(SourceKind::Catalog, &LoadContext::default()).await);
    let preview = s.preview().unwrap().to_string();
    let payload = s.download().unwrap();
    assert_eq!(payload.bytes, preview.into_bytes());
    assert_eq!(payload.filename, "moleculeBank_data.csv");
}

#[tokio::test]
async fn test_deselecting_every_field_blocks_download() {
    let reg = registry();
    let mut s = session();
    let t = s.select_source(SourceKind::Catalog);
    s.apply_load(t, reg.load(SourceKind::Catalog, &LoadContext::default()).await);
    for f in resolve(SourceKind::Catalog).schema {
        s.toggle_field(f.key);
    }
    assert_eq!(s.preview().unwrap(), "");
    assert!(!s.can_download());
}
