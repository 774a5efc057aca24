use serde::{Deserialize, Serialize};
use std::fmt;

pub type FieldKey = String;
pub type PrincipalId = String;

/// A loosely typed leaf value as it arrives from upstream JSON.
///
/// Compound properties come back from the lookup service as either numbers or
/// numeric strings depending on the property, so the record keeps whatever was
/// sent and renders it verbatim.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Scalar::Text(s) if s.is_empty())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Integer(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}
impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}
impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Integer(i)
    }
}
impl From<f64> for Scalar {
    fn from(x: f64) -> Self {
        Scalar::Float(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_accepts_numbers_and_numeric_strings() {
        let v: Vec<Scalar> = serde_json::from_str(r#"[46.07, "46.07", 3, true]"#).unwrap();
        assert_eq!(v[0], Scalar::Float(46.07));
        assert_eq!(v[1], Scalar::Text("46.07".into()));
        assert_eq!(v[2], Scalar::Integer(3));
        assert_eq!(v[3].to_string(), "true");
    }

    #[test]
    fn scalar_display_matches_source_text() {
        assert_eq!(Scalar::Float(0.85).to_string(), "0.85");
        assert_eq!(Scalar::Integer(-1).to_string(), "-1");
        assert_eq!(Scalar::from("C2H6O").to_string(), "C2H6O");
    }
}
