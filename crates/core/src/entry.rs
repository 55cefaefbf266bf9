//! Entry records handed over by the document parser.
//!
//! Entries are produced outside this crate (from C32/CCR XML) and are read-only here: the core
//! copies values out of an entry but never changes one.

use crate::error::{from_yaml_with_path, MuResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One clinical observation extracted from a document section.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Entry {
    /// Human-readable clinical concept, for example "Hypertension". Entries merge on this key.
    pub description: String,

    /// Code values recorded for this entry, keyed by code-system name.
    #[serde(default)]
    pub codes: BTreeMap<String, Vec<String>>,
}

impl Entry {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            codes: BTreeMap::new(),
        }
    }

    /// Builder-style helper that appends `values` under `code_system`.
    pub fn with_codes<I, S>(mut self, code_system: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.codes
            .entry(code_system.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }
}

/// The entries of one parsed source document, grouped by section name.
///
/// Entry order within a section is document order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pub sections: BTreeMap<String, Vec<Entry>>,
}

impl Document {
    /// Parse a document from YAML text. JSON input is accepted as well.
    ///
    /// # Errors
    ///
    /// Returns [`crate::MuError::Translation`] naming the failing field path when the text does
    /// not describe a mapping of section names to entry lists.
    pub fn from_yaml_str(yaml_text: &str) -> MuResult<Self> {
        from_yaml_with_path(yaml_text, "Document")
    }

    pub fn entry_count(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }
}
