use super::types::{CatalogEntry, CompoundData, GenerationRecord};
use crate::source::SourceKind;

/// Records loaded for one source, shaped by that source's cardinality.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordSet {
    Catalog(Vec<CatalogEntry>),
    SingleRecord(Option<CompoundData>),
    RecordList(Vec<GenerationRecord>),
}

impl RecordSet {
    /// The empty set for `kind`.
    #[must_use]
    pub fn empty(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Catalog => RecordSet::Catalog(Vec::new()),
            SourceKind::SingleRecord => RecordSet::SingleRecord(None),
            SourceKind::RecordList => RecordSet::RecordList(Vec::new()),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> SourceKind {
        match self {
            RecordSet::Catalog(_) => SourceKind::Catalog,
            RecordSet::SingleRecord(_) => SourceKind::SingleRecord,
            RecordSet::RecordList(_) => SourceKind::RecordList,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            RecordSet::Catalog(v) => v.len(),
            RecordSet::SingleRecord(r) => usize::from(r.is_some()),
            RecordSet::RecordList(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_matches_kind() {
        for kind in SourceKind::ALL {
            let set = RecordSet::empty(kind);
            assert_eq!(set.kind(), kind);
            assert!(set.is_empty());
        }
    }

    #[test]
    fn single_record_counts_zero_or_one() {
        assert_eq!(RecordSet::SingleRecord(None).len(), 0);
        assert_eq!(RecordSet::SingleRecord(Some(CompoundData::default())).len(), 1);
    }
}
