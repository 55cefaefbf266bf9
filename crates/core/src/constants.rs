//! Constants used throughout the core crate.
//!
//! Code-system names as they appear in C32/CCR documents, and the section names of the default
//! meaningful-use layout.

/// SNOMED Clinical Terms.
pub const SNOMED_CT: &str = "SNOMED-CT";

/// RxNorm normalised drug names.
pub const RXNORM: &str = "RxNorm";

/// Logical Observation Identifiers Names and Codes.
pub const LOINC: &str = "LOINC";

/// ICD-9 Clinical Modification.
pub const ICD_9_CM: &str = "ICD-9-CM";

/// ICD-10 Clinical Modification.
pub const ICD_10_CM: &str = "ICD-10-CM";

/// Current Procedural Terminology.
pub const CPT: &str = "CPT";

/// CDC vaccine codes. No syntax pattern is known for this system.
pub const CVX: &str = "CVX";

/// Allergies and adverse reactions.
pub const ALLERGIES_SECTION: &str = "allergies";

/// Problems and diagnoses.
pub const CONDITIONS_SECTION: &str = "conditions";

/// Encounters and visits.
pub const ENCOUNTERS_SECTION: &str = "encounters";

/// Administered immunizations.
pub const IMMUNIZATIONS_SECTION: &str = "immunizations";

/// Medications.
pub const MEDICATIONS_SECTION: &str = "medications";

/// Procedures performed.
pub const PROCEDURES_SECTION: &str = "procedures";

/// Laboratory results.
pub const RESULTS_SECTION: &str = "results";

/// Vital-sign observations.
pub const VITAL_SIGNS_SECTION: &str = "vital_signs";
