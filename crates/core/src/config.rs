//! Analysis configuration.
//!
//! Section definitions and the unknown-code-system policy are resolved once at startup and then
//! passed into [`crate::Analysis`]. The core never reads configuration from the environment or
//! the file system; callers hand it YAML text or build the config in code.

use crate::constants::{
    ALLERGIES_SECTION, CONDITIONS_SECTION, CPT, CVX, ENCOUNTERS_SECTION, ICD_10_CM, ICD_9_CM,
    IMMUNIZATIONS_SECTION, LOINC, MEDICATIONS_SECTION, PROCEDURES_SECTION, RESULTS_SECTION,
    RXNORM, SNOMED_CT, VITAL_SIGNS_SECTION,
};
use crate::error::from_yaml_with_path;
use crate::validator::{CodeValidator, UnknownSystemPolicy};
use crate::{MuError, MuResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A section name and its meaningful-use code systems.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionDefinition {
    pub name: String,
    pub allow_list: Vec<String>,
}

impl SectionDefinition {
    pub fn new<I, S>(name: impl Into<String>, allow_list: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            allow_list: allow_list.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AnalysisConfigWire {
    sections: Vec<SectionDefinition>,
    #[serde(default)]
    unknown_code_systems: UnknownSystemPolicy,
}

/// Validated configuration for an analysis run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnalysisConfig {
    sections: Vec<SectionDefinition>,
    unknown_code_systems: UnknownSystemPolicy,
}

impl AnalysisConfig {
    /// Create a new `AnalysisConfig`.
    ///
    /// Section names and code-system names are trimmed. Repeated allow-list entries are dropped,
    /// keeping the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`MuError::InvalidInput`] if:
    /// - no section is defined,
    /// - a section name is empty or defined twice,
    /// - an allow-list contains an empty code-system name.
    pub fn new(
        sections: Vec<SectionDefinition>,
        unknown_code_systems: UnknownSystemPolicy,
    ) -> MuResult<Self> {
        if sections.is_empty() {
            return Err(MuError::InvalidInput(
                "at least one section must be configured".into(),
            ));
        }

        let mut seen_names = HashSet::new();
        let mut normalised = Vec::with_capacity(sections.len());

        for definition in sections {
            let name = definition.name.trim().to_string();
            if name.is_empty() {
                return Err(MuError::InvalidInput("section name cannot be empty".into()));
            }
            if !seen_names.insert(name.clone()) {
                return Err(MuError::InvalidInput(format!(
                    "section '{name}' is defined more than once"
                )));
            }

            let mut allow_list: Vec<String> = Vec::with_capacity(definition.allow_list.len());
            for system in &definition.allow_list {
                let system = system.trim();
                if system.is_empty() {
                    return Err(MuError::InvalidInput(format!(
                        "section '{name}' has an empty code system name in its allow-list"
                    )));
                }
                if !allow_list.iter().any(|existing| existing == system) {
                    allow_list.push(system.to_string());
                }
            }

            normalised.push(SectionDefinition { name, allow_list });
        }

        Ok(Self {
            sections: normalised,
            unknown_code_systems,
        })
    }

    /// Parse and validate a configuration from YAML text.
    ///
    /// ```yaml
    /// unknown_code_systems: strict
    /// sections:
    ///   - name: conditions
    ///     allow_list: [ICD-9-CM, SNOMED-CT]
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`MuError::Translation`] when the YAML does not match the schema (including
    /// unknown keys), or any error from [`AnalysisConfig::new`].
    pub fn from_yaml_str(yaml_text: &str) -> MuResult<Self> {
        let wire: AnalysisConfigWire = from_yaml_with_path(yaml_text, "Analysis config")?;
        Self::new(wire.sections, wire.unknown_code_systems)
    }

    pub fn sections(&self) -> &[SectionDefinition] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&SectionDefinition> {
        self.sections.iter().find(|definition| definition.name == name)
    }

    pub fn unknown_code_systems(&self) -> UnknownSystemPolicy {
        self.unknown_code_systems
    }

    pub fn validator(&self) -> CodeValidator {
        CodeValidator::new(self.unknown_code_systems)
    }
}

impl Default for AnalysisConfig {
    /// The C32 meaningful-use section layout with the permissive unknown-system policy.
    fn default() -> Self {
        let sections = vec![
            SectionDefinition::new(ALLERGIES_SECTION, [RXNORM, SNOMED_CT]),
            SectionDefinition::new(CONDITIONS_SECTION, [ICD_9_CM, ICD_10_CM, SNOMED_CT]),
            SectionDefinition::new(ENCOUNTERS_SECTION, [CPT]),
            SectionDefinition::new(IMMUNIZATIONS_SECTION, [CVX]),
            SectionDefinition::new(MEDICATIONS_SECTION, [RXNORM]),
            SectionDefinition::new(PROCEDURES_SECTION, [CPT, ICD_9_CM, SNOMED_CT]),
            SectionDefinition::new(RESULTS_SECTION, [LOINC]),
            SectionDefinition::new(VITAL_SIGNS_SECTION, [LOINC, SNOMED_CT]),
        ];

        Self {
            sections,
            unknown_code_systems: UnknownSystemPolicy::Permissive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_passes_validation() {
        let default = AnalysisConfig::default();
        let revalidated =
            AnalysisConfig::new(default.sections().to_vec(), default.unknown_code_systems())
                .expect("default config is valid");
        assert_eq!(default, revalidated);
        assert_eq!(default.sections().len(), 8);
        assert_eq!(
            default.section(MEDICATIONS_SECTION).expect("medications").allow_list,
            vec![RXNORM.to_string()]
        );
    }

    #[test]
    fn parses_yaml_config() {
        let input = r#"unknown_code_systems: strict
sections:
  - name: " conditions "
    allow_list: [ICD-9-CM, SNOMED-CT, ICD-9-CM]
  - name: results
    allow_list: [LOINC]
"#;

        let config = AnalysisConfig::from_yaml_str(input).expect("parse config");
        assert_eq!(config.unknown_code_systems(), UnknownSystemPolicy::Strict);
        assert_eq!(config.validator().unknown_systems(), UnknownSystemPolicy::Strict);
        assert_eq!(
            config.section("conditions").expect("conditions").allow_list,
            vec![ICD_9_CM.to_string(), SNOMED_CT.to_string()]
        );
    }

    #[test]
    fn policy_defaults_to_permissive() {
        let input = r#"sections:
  - name: results
    allow_list: [LOINC]
"#;

        let config = AnalysisConfig::from_yaml_str(input).expect("parse config");
        assert_eq!(config.unknown_code_systems(), UnknownSystemPolicy::Permissive);
    }

    #[test]
    fn rejects_unknown_keys_with_path() {
        let input = r#"sections:
  - name: results
    allow_list: [LOINC]
    allowlist: [CPT]
"#;

        let err = AnalysisConfig::from_yaml_str(input).expect_err("should reject unknown key");
        match err {
            MuError::Translation(msg) => {
                assert!(msg.contains("sections[0]"), "{msg}");
                assert!(msg.contains("allowlist"), "{msg}");
            }
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_policy() {
        let input = r#"unknown_code_systems: lenient
sections:
  - name: results
    allow_list: [LOINC]
"#;

        let err = AnalysisConfig::from_yaml_str(input).expect_err("should reject policy");
        assert!(matches!(err, MuError::Translation(msg) if msg.contains("unknown_code_systems")));
    }

    #[test]
    fn rejects_empty_section_list() {
        let err = AnalysisConfig::new(Vec::new(), UnknownSystemPolicy::Permissive)
            .expect_err("should reject empty sections");
        assert!(matches!(err, MuError::InvalidInput(msg) if msg.contains("at least one section")));
    }

    #[test]
    fn rejects_blank_section_name() {
        let err = AnalysisConfig::new(
            vec![SectionDefinition::new("   ", [LOINC])],
            UnknownSystemPolicy::Permissive,
        )
        .expect_err("should reject blank name");
        assert!(matches!(err, MuError::InvalidInput(msg) if msg.contains("cannot be empty")));
    }

    #[test]
    fn rejects_duplicate_section_names() {
        let err = AnalysisConfig::new(
            vec![
                SectionDefinition::new("results", [LOINC]),
                SectionDefinition::new("results ", [CPT]),
            ],
            UnknownSystemPolicy::Permissive,
        )
        .expect_err("should reject duplicate");
        assert!(matches!(err, MuError::InvalidInput(msg) if msg.contains("more than once")));
    }

    #[test]
    fn rejects_blank_code_system_name() {
        let err = AnalysisConfig::new(
            vec![SectionDefinition::new("results", [LOINC, " "])],
            UnknownSystemPolicy::Permissive,
        )
        .expect_err("should reject blank system");
        assert!(matches!(err, MuError::InvalidInput(msg) if msg.contains("empty code system")));
    }
}
