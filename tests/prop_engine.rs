use nucleo_export::export::{
    ExportFormat, FieldSelection, RenderOptions, TimestampStyle, all_fields, render, toggle_field,
};
use nucleo_export::record::{CatalogEntry, RecordSet};
use nucleo_export::source::{SourceKind, resolve};
use proptest::prelude::*;

fn opts() -> RenderOptions {
    RenderOptions {
        timestamps: TimestampStyle::utc(),
        ..Default::default()
    }
}

fn entries() -> impl Strategy<Value = Vec<CatalogEntry>> {
    let row = ("[A-Za-z]{1,12}", "[A-Z]{1,8}", 0.0f64..1000.0, "[a-z]{0,10}");
    proptest::collection::vec(row, 0..20).prop_map(|v| {
        v.into_iter()
            .map(|(n, s, w, u)| CatalogEntry::new(&n, &s, w, &u))
            .collect()
    })
}

fn selection() -> impl Strategy<Value = FieldSelection> {
    let keys: Vec<&'static str> = resolve(SourceKind::Catalog).keys().collect();
    proptest::sample::subsequence(keys, 1..=4)
        .prop_map(|ks| ks.into_iter().map(String::from).collect())
}

proptest! {
    #[test]
    fn prop_toggle_twice_is_identity(idx in 0usize..16, start_full in any::<bool>()) {
        let d = resolve(SourceKind::SingleRecord);
        let key = d.schema[idx].key;
        let mut sel = if start_full { all_fields(d) } else { FieldSelection::new() };
        let before = sel.clone();
        toggle_field(&mut sel, key);
        prop_assert_ne!(&sel, &before);
        toggle_field(&mut sel, key);
        prop_assert_eq!(sel, before);
    }

    #[test]
    fn prop_table_has_header_plus_one_line_per_record(rows in entries(), sel in selection()) {
        let d = resolve(SourceKind::Catalog);
        let n = rows.len();
        let set = RecordSet::Catalog(rows);
        let out = render(&set, d, &sel, ExportFormat::Table, &opts()).unwrap();
        prop_assert_eq!(out.lines().count(), 1 + n);
        prop_assert!(!out.contains('"'));
    }

    #[test]
    fn prop_report_has_one_block_per_record(rows in entries(), sel in selection()) {
        let d = resolve(SourceKind::Catalog);
        let n = rows.len();
        let set = RecordSet::Catalog(rows);
        let out = render(&set, d, &sel, ExportFormat::Report, &opts()).unwrap();
        prop_assert_eq!(out.lines().filter(|l| *l == "---").count(), n);
        prop_assert_eq!(out.lines().count(), n * (sel.len() + 1) + n.saturating_sub(1));
    }

    #[test]
    fn prop_render_is_deterministic(rows in entries(), sel in selection(), table in any::<bool>()) {
        let d = resolve(SourceKind::Catalog);
        let format = if table { ExportFormat::Table } else { ExportFormat::Report };
        let set = RecordSet::Catalog(rows);
        let a = render(&set, d, &sel, format, &opts()).unwrap();
        let b = render(&set, d, &sel, format, &opts()).unwrap();
        prop_assert_eq!(a, b);
    }
}
