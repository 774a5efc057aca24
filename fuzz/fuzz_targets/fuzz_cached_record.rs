#![no_main]
use libfuzzer_sys::fuzz_target;
use nucleo_export::export::{ExportFormat, RenderOptions, TimestampStyle, all_fields, render};
use nucleo_export::record::{CompoundData, RecordSet};
use nucleo_export::source::{SourceKind, resolve};

fuzz_target!(|data: &[u8]| {
    if data.len() > 16384 {
        return;
    }
    let Ok(record) = serde_json::from_slice::<CompoundData>(data) else {
        return;
    };
    let d = resolve(SourceKind::SingleRecord);
    let opts = RenderOptions {
        timestamps: TimestampStyle::utc(),
        ..Default::default()
    };
    let set = RecordSet::SingleRecord(Some(record));
    for format in [ExportFormat::Table, ExportFormat::Report] {
        let _ = render(&set, d, &all_fields(d), format, &opts);
    }
});
