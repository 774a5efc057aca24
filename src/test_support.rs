#![cfg(test)]

// Tiny test-only fixtures shared by unit tests
use crate::record::{CatalogEntry, CompoundData, GeneratedMolecule, GenerationRecord};
use crate::types::Scalar;
use chrono::{TimeZone, Utc};

pub fn compound(smiles: &str) -> CompoundData {
    CompoundData {
        molecular_formula: Some("C2H6O".into()),
        molecular_weight: Some(Scalar::Text("46.07".into())),
        inchi_key: Some("LFQSCWFLJHTTHZ-UHFFFAOYSA-N".into()),
        canonical_smiles: Some(smiles.into()),
        iupac_name: Some("ethanol".into()),
        xlogp: Some(Scalar::Float(-0.1)),
        charge: Some(Scalar::Integer(0)),
        ..Default::default()
    }
}

pub fn generation_record(smiles: &str) -> GenerationRecord {
    GenerationRecord {
        smiles: Some(smiles.into()),
        num_molecules: Some(5),
        min_similarity: Some(0.7),
        particles: Some(10),
        iterations: Some(20),
        created_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 14, 5, 9).unwrap()),
        generated_molecules: Some(vec![
            GeneratedMolecule {
                structure: "CCO".into(),
                score: 0.85,
            },
            GeneratedMolecule {
                structure: "CCN".into(),
                score: 0.82,
            },
        ]),
    }
}

pub fn two_entry_catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::new("Water", "O", 18.015, "Solvent"),
        CatalogEntry::new("Ethanol", "CCO", 46.07, "Solvent"),
    ]
}
