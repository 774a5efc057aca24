use crate::errors::ExportError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of record origins an export can be driven from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Static reference catalog (molecule bank).
    Catalog,
    /// The current, or last cached, compound research record.
    SingleRecord,
    /// Per-principal generation history.
    RecordList,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [
        SourceKind::Catalog,
        SourceKind::SingleRecord,
        SourceKind::RecordList,
    ];

    /// Slug used in filenames and on the command line.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            SourceKind::Catalog => "moleculeBank",
            SourceKind::SingleRecord => "research",
            SourceKind::RecordList => "model",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            SourceKind::Catalog => "Molecules Bank",
            SourceKind::SingleRecord => "Research",
            SourceKind::RecordList => "Model",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for SourceKind {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "moleculebank" | "molecule-bank" | "catalog" => Ok(SourceKind::Catalog),
            "research" | "single" | "compound" => Ok(SourceKind::SingleRecord),
            "model" | "history" | "list" => Ok(SourceKind::RecordList),
            _ => Err(ExportError::UnsupportedSourceKind(s.to_string())),
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Many,
    ZeroOrOne,
}

/// How a field's value is turned into text.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    Plain,
    Timestamp,
    NestedList,
}

/// One exportable attribute. Order within a schema defines output order.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub rule: FieldRule,
}

const fn plain(key: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec {
        key,
        label,
        rule: FieldRule::Plain,
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub kind: SourceKind,
    pub schema: &'static [FieldSpec],
    pub cardinality: Cardinality,
}

impl SourceDescriptor {
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.schema.iter().map(|f| f.key)
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&'static FieldSpec> {
        self.schema.iter().find(|f| f.key == key)
    }
}

pub const CATALOG_FIELDS: &[FieldSpec] = &[
    plain("moleculeName", "Name"),
    plain("smilesStructure", "SMILES"),
    plain("molecularWeight", "Molecular Weight"),
    plain("categoryUsage", "Category Usage"),
];

pub const RESEARCH_FIELDS: &[FieldSpec] = &[
    plain("MolecularFormula", "Molecular Formula"),
    plain("MolecularWeight", "Molecular Weight"),
    plain("InChIKey", "InChIKey"),
    plain("CanonicalSMILES", "Canonical SMILES"),
    plain("IsomericSMILES", "Isomeric SMILES"),
    plain("IUPACName", "IUPAC Name"),
    plain("XLogP", "XLogP"),
    plain("ExactMass", "Exact Mass"),
    plain("MonoisotopicMass", "Monoisotopic Mass"),
    plain("TPSA", "TPSA"),
    plain("Complexity", "Complexity"),
    plain("Charge", "Charge"),
    plain("HBondDonorCount", "H-Bond Donors"),
    plain("HBondAcceptorCount", "H-Bond Acceptors"),
    plain("RotatableBondCount", "Rotatable Bonds"),
    plain("HeavyAtomCount", "Heavy Atom Count"),
];

pub const MODEL_FIELDS: &[FieldSpec] = &[
    plain("smiles", "SMILES"),
    plain("numMolecules", "Num Molecules"),
    plain("minSimilarity", "Min Similarity"),
    plain("particles", "Particles"),
    plain("iterations", "Iterations"),
    FieldSpec {
        key: "createdAt",
        label: "Created At",
        rule: FieldRule::Timestamp,
    },
    FieldSpec {
        key: "generatedMolecules",
        label: "Generated Molecules",
        rule: FieldRule::NestedList,
    },
];

static CATALOG: SourceDescriptor = SourceDescriptor {
    kind: SourceKind::Catalog,
    schema: CATALOG_FIELDS,
    cardinality: Cardinality::Many,
};
static RESEARCH: SourceDescriptor = SourceDescriptor {
    kind: SourceKind::SingleRecord,
    schema: RESEARCH_FIELDS,
    cardinality: Cardinality::ZeroOrOne,
};
static MODEL: SourceDescriptor = SourceDescriptor {
    kind: SourceKind::RecordList,
    schema: MODEL_FIELDS,
    cardinality: Cardinality::Many,
};

/// Pure lookup of the descriptor for `kind`.
#[must_use]
pub fn resolve(kind: SourceKind) -> &'static SourceDescriptor {
    match kind {
        SourceKind::Catalog => &CATALOG,
        SourceKind::SingleRecord => &RESEARCH,
        SourceKind::RecordList => &MODEL,
    }
}
