use super::options::{ExportFormat, TimestampStyle};
use crate::record::{FieldValue, GeneratedMolecule};
use crate::source::{FieldRule, FieldSpec};
use chrono::{DateTime, Local, Utc};
use std::fmt::Write;

/// Per-field value rule shared by both formats. Absent values render empty.
pub fn render_value(
    spec: &FieldSpec,
    value: &FieldValue<'_>,
    format: ExportFormat,
    ts: &TimestampStyle,
) -> String {
    debug_assert!(
        matches!(
            (spec.rule, value),
            (_, FieldValue::Missing)
                | (FieldRule::NestedList, FieldValue::Items(_))
                | (FieldRule::Timestamp, FieldValue::Timestamp(_))
                | (
                    FieldRule::Plain,
                    FieldValue::Text(_)
                        | FieldValue::Scalar(_)
                        | FieldValue::Integer(_)
                        | FieldValue::Float(_)
                )
        ),
        "field {} has rule {:?} but value {:?}",
        spec.key,
        spec.rule,
        value
    );
    match value {
        FieldValue::Missing => String::new(),
        FieldValue::Text(s) => (*s).to_string(),
        FieldValue::Scalar(s) => s.to_string(),
        FieldValue::Integer(i) => i.to_string(),
        FieldValue::Float(x) => x.to_string(),
        FieldValue::Timestamp(t) => format_timestamp(*t, ts),
        FieldValue::Items(items) => join_items(items, format.list_separator()),
    }
}

/// `"<structure> (<score>)"` per item.
pub fn join_items(items: &[GeneratedMolecule], separator: &str) -> String {
    items
        .iter()
        .map(|m| format!("{} ({})", m.structure, m.score))
        .collect::<Vec<_>>()
        .join(separator)
}

pub fn format_timestamp(t: DateTime<Utc>, style: &TimestampStyle) -> String {
    let mut out = String::new();
    let res = if style.utc {
        write!(out, "{}", t.format(style.pattern()))
    } else {
        write!(out, "{}", t.with_timezone(&Local).format(style.pattern()))
    };
    if res.is_err() {
        // Patterns are validated on construction; keep something readable anyway
        return t.to_rfc3339();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MODEL_FIELDS;
    use chrono::TimeZone;

    fn spec(key: &str) -> &'static FieldSpec {
        MODEL_FIELDS.iter().find(|f| f.key == key).unwrap()
    }

    #[test]
    fn nested_list_uses_format_separator() {
        let items = vec![
            GeneratedMolecule {
                structure: "CCO".into(),
                score: 0.85,
            },
            GeneratedMolecule {
                structure: "CCN".into(),
                score: 0.82,
            },
        ];
        let v = FieldValue::Items(&items);
        let ts = TimestampStyle::utc();
        let s = spec("generatedMolecules");
        assert_eq!(
            render_value(s, &v, ExportFormat::Table, &ts),
            "CCO (0.85);CCN (0.82)"
        );
        assert_eq!(
            render_value(s, &v, ExportFormat::Report, &ts),
            "CCO (0.85); CCN (0.82)"
        );
        let empty = FieldValue::Items(&[]);
        assert_eq!(render_value(s, &empty, ExportFormat::Table, &ts), "");
    }

    #[test]
    fn timestamp_uses_locale_like_pattern() {
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 14, 5, 9).unwrap();
        assert_eq!(format_timestamp(t, &TimestampStyle::utc()), "3/1/2024, 2:05:09 PM");
        let iso = TimestampStyle::new("%Y-%m-%dT%H:%M", true).unwrap();
        assert_eq!(format_timestamp(t, &iso), "2024-03-01T14:05");
    }

    #[test]
    fn missing_renders_empty() {
        let ts = TimestampStyle::utc();
        let missing = FieldValue::Missing;
        assert_eq!(
            render_value(spec("createdAt"), &missing, ExportFormat::Report, &ts),
            ""
        );
        assert_eq!(
            render_value(spec("smiles"), &missing, ExportFormat::Table, &ts),
            ""
        );
    }
}
