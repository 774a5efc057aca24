use crate::types::Scalar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One borrowed field value, tagged by how it has to be rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Missing,
    Text(&'a str),
    Scalar(&'a Scalar),
    Integer(i64),
    Float(f64),
    Timestamp(DateTime<Utc>),
    Items(&'a [GeneratedMolecule]),
}

/// Entry of the static reference catalog ("molecule bank").
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub molecule_name: String,
    pub smiles_structure: String,
    pub molecular_weight: f64,
    pub category_usage: String,
}

impl CatalogEntry {
    pub fn new(name: &str, smiles: &str, weight: f64, usage: &str) -> Self {
        Self {
            molecule_name: name.to_string(),
            smiles_structure: smiles.to_string(),
            molecular_weight: weight,
            category_usage: usage.to_string(),
        }
    }

    #[must_use]
    pub fn field(&self, key: &str) -> FieldValue<'_> {
        match key {
            "moleculeName" => FieldValue::Text(&self.molecule_name),
            "smilesStructure" => FieldValue::Text(&self.smiles_structure),
            "molecularWeight" => FieldValue::Float(self.molecular_weight),
            "categoryUsage" => FieldValue::Text(&self.category_usage),
            _ => FieldValue::Missing,
        }
    }
}

/// Property sheet of a single researched compound.
///
/// Every property is optional: the record is usually rehydrated from a cached
/// JSON blob written by an earlier lookup, and older blobs may lack fields.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CompoundData {
    #[serde(rename = "MolecularFormula", default, skip_serializing_if = "Option::is_none")]
    pub molecular_formula: Option<String>,
    #[serde(rename = "MolecularWeight", default, skip_serializing_if = "Option::is_none")]
    pub molecular_weight: Option<Scalar>,
    #[serde(rename = "InChIKey", default, skip_serializing_if = "Option::is_none")]
    pub inchi_key: Option<String>,
    #[serde(rename = "CanonicalSMILES", default, skip_serializing_if = "Option::is_none")]
    pub canonical_smiles: Option<String>,
    #[serde(rename = "IsomericSMILES", default, skip_serializing_if = "Option::is_none")]
    pub isomeric_smiles: Option<String>,
    #[serde(rename = "IUPACName", default, skip_serializing_if = "Option::is_none")]
    pub iupac_name: Option<String>,
    #[serde(rename = "XLogP", default, skip_serializing_if = "Option::is_none")]
    pub xlogp: Option<Scalar>,
    #[serde(rename = "ExactMass", default, skip_serializing_if = "Option::is_none")]
    pub exact_mass: Option<Scalar>,
    #[serde(rename = "MonoisotopicMass", default, skip_serializing_if = "Option::is_none")]
    pub monoisotopic_mass: Option<Scalar>,
    #[serde(rename = "TPSA", default, skip_serializing_if = "Option::is_none")]
    pub tpsa: Option<Scalar>,
    #[serde(rename = "Complexity", default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<Scalar>,
    #[serde(rename = "Charge", default, skip_serializing_if = "Option::is_none")]
    pub charge: Option<Scalar>,
    #[serde(rename = "HBondDonorCount", default, skip_serializing_if = "Option::is_none")]
    pub hbond_donor_count: Option<Scalar>,
    #[serde(rename = "HBondAcceptorCount", default, skip_serializing_if = "Option::is_none")]
    pub hbond_acceptor_count: Option<Scalar>,
    #[serde(rename = "RotatableBondCount", default, skip_serializing_if = "Option::is_none")]
    pub rotatable_bond_count: Option<Scalar>,
    #[serde(rename = "HeavyAtomCount", default, skip_serializing_if = "Option::is_none")]
    pub heavy_atom_count: Option<Scalar>,
}

impl CompoundData {
    #[must_use]
    pub fn field(&self, key: &str) -> FieldValue<'_> {
        fn text(v: &Option<String>) -> FieldValue<'_> {
            v.as_deref().map_or(FieldValue::Missing, FieldValue::Text)
        }
        fn scalar(v: &Option<Scalar>) -> FieldValue<'_> {
            v.as_ref().map_or(FieldValue::Missing, FieldValue::Scalar)
        }
        match key {
            "MolecularFormula" => text(&self.molecular_formula),
            "MolecularWeight" => scalar(&self.molecular_weight),
            "InChIKey" => text(&self.inchi_key),
            "CanonicalSMILES" => text(&self.canonical_smiles),
            "IsomericSMILES" => text(&self.isomeric_smiles),
            "IUPACName" => text(&self.iupac_name),
            "XLogP" => scalar(&self.xlogp),
            "ExactMass" => scalar(&self.exact_mass),
            "MonoisotopicMass" => scalar(&self.monoisotopic_mass),
            "TPSA" => scalar(&self.tpsa),
            "Complexity" => scalar(&self.complexity),
            "Charge" => scalar(&self.charge),
            "HBondDonorCount" => scalar(&self.hbond_donor_count),
            "HBondAcceptorCount" => scalar(&self.hbond_acceptor_count),
            "RotatableBondCount" => scalar(&self.rotatable_bond_count),
            "HeavyAtomCount" => scalar(&self.heavy_atom_count),
            _ => FieldValue::Missing,
        }
    }

    /// Human-readable handle for messages: canonical SMILES, then IUPAC name,
    /// then formula, then `Unknown`.
    #[must_use]
    pub fn display_identifier(&self) -> &str {
        [&self.canonical_smiles, &self.iupac_name, &self.molecular_formula]
            .into_iter()
            .filter_map(|v| v.as_deref())
            .find(|s| !s.is_empty())
            .unwrap_or("Unknown")
    }
}

/// A molecule produced by one generation run, with its similarity score.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GeneratedMolecule {
    pub structure: String,
    pub score: f64,
}

/// One entry of a user's generation history.
///
/// History files come from older clients too, so every field may be absent;
/// an absent field renders as an empty cell.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationRecord {
    pub smiles: Option<String>,
    pub num_molecules: Option<u32>,
    pub min_similarity: Option<f64>,
    pub particles: Option<u32>,
    pub iterations: Option<u32>,
    pub created_at: Option<DateTime<Utc>>,
    pub generated_molecules: Option<Vec<GeneratedMolecule>>,
}

impl GenerationRecord {
    #[must_use]
    pub fn field(&self, key: &str) -> FieldValue<'_> {
        fn count(v: Option<u32>) -> FieldValue<'static> {
            v.map_or(FieldValue::Missing, |n| FieldValue::Integer(i64::from(n)))
        }
        match key {
            "smiles" => self
                .smiles
                .as_deref()
                .map_or(FieldValue::Missing, FieldValue::Text),
            "numMolecules" => count(self.num_molecules),
            "minSimilarity" => self
                .min_similarity
                .map_or(FieldValue::Missing, FieldValue::Float),
            "particles" => count(self.particles),
            "iterations" => count(self.iterations),
            "createdAt" => self
                .created_at
                .map_or(FieldValue::Missing, FieldValue::Timestamp),
            "generatedMolecules" => self
                .generated_molecules
                .as_deref()
                .map_or(FieldValue::Missing, FieldValue::Items),
            _ => FieldValue::Missing,
        }
    }
}
