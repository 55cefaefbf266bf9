//! Syntactic validation of code values.
//!
//! Each known code system has a pattern that is matched from the first character of the value.
//! Patterns for SNOMED-CT, RxNorm and LOINC only require a leading run of digits; the ICD and CPT
//! patterns are anchored at both ends.

use crate::constants::{CPT, ICD_10_CM, ICD_9_CM, LOINC, RXNORM, SNOMED_CT};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static CODE_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    let digits = r"^[0-9]+";
    [
        (SNOMED_CT, digits),
        (RXNORM, digits),
        (LOINC, digits),
        (ICD_9_CM, r"^[EV]?[0-9]{2,3}(\.[0-9]{1,2})?$"),
        (ICD_10_CM, r"^[A-Z][0-9]{2}(\.[0-9])?$"),
        (CPT, r"^[0-9]{4}[A-Za-z0-9]$"),
    ]
    .into_iter()
    .map(|(system, pattern)| {
        let regex = Regex::new(pattern).expect("static code pattern must compile");
        (system, regex)
    })
    .collect()
});

/// How values are judged for code systems that have no known pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownSystemPolicy {
    /// Every value of an unknown system is valid, so novel vocabularies are never dropped.
    #[default]
    Permissive,
    /// Every value of an unknown system is invalid.
    Strict,
}

/// Decides whether a literal code value looks valid for its code system.
///
/// Stateless apart from the policy for unknown systems; the pattern table is fixed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CodeValidator {
    unknown_systems: UnknownSystemPolicy,
}

impl CodeValidator {
    pub fn new(unknown_systems: UnknownSystemPolicy) -> Self {
        Self { unknown_systems }
    }

    pub fn unknown_systems(&self) -> UnknownSystemPolicy {
        self.unknown_systems
    }

    /// Returns `true` when `code_system` has a pattern.
    pub fn knows(code_system: &str) -> bool {
        pattern_for(code_system).is_some()
    }

    /// Returns whether `value` is syntactically valid under `code_system`.
    ///
    /// Systems without a pattern follow the validator's [`UnknownSystemPolicy`].
    pub fn is_valid(&self, code_system: &str, value: &str) -> bool {
        match pattern_for(code_system) {
            Some(pattern) => pattern.is_match(value),
            None => self.unknown_systems == UnknownSystemPolicy::Permissive,
        }
    }

    /// Returns whether any of `values` is valid under `code_system`.
    pub fn any_valid<S: AsRef<str>>(&self, code_system: &str, values: &[S]) -> bool {
        values
            .iter()
            .any(|value| self.is_valid(code_system, value.as_ref()))
    }
}

/// Validates with the permissive default: unknown systems are always valid.
pub fn is_valid(code_system: &str, value: &str) -> bool {
    CodeValidator::default().is_valid(code_system, value)
}

fn pattern_for(code_system: &str) -> Option<&'static Regex> {
    CODE_PATTERNS
        .iter()
        .find(|(system, _)| *system == code_system)
        .map(|(_, pattern)| pattern)
}
