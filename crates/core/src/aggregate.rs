//! Merging of entries that share a clinical description.

use crate::entry::Entry;
use crate::validator::CodeValidator;
use crate::{MuError, MuResult};
use std::collections::btree_map::Entry as MapEntry;
use std::collections::{BTreeMap, BTreeSet};

/// One or more raw entries folded together under a shared description.
///
/// Code values are held as sets, so merging is commutative and associative over both the count
/// and the codes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregatedEntry {
    description: String,
    count: usize,
    codes: BTreeMap<String, BTreeSet<String>>,
}

impl AggregatedEntry {
    /// Snapshot of a single entry: description and every recorded code, count 1.
    pub fn from_entry(entry: &Entry) -> Self {
        let codes = entry
            .codes
            .iter()
            .map(|(system, values)| (system.clone(), values.iter().cloned().collect()))
            .collect();

        Self {
            description: entry.description.clone(),
            count: 1,
            codes,
        }
    }

    /// Snapshot of a single entry keeping only the systems with a value `validator` accepts.
    ///
    /// A kept system keeps all of its values. An entry with no valid code at all yields an
    /// aggregate without codes.
    pub fn from_valid_codes(entry: &Entry, validator: &CodeValidator) -> Self {
        let codes = entry
            .codes
            .iter()
            .filter(|(system, values)| validator.any_valid(system, values.as_slice()))
            .map(|(system, values)| (system.clone(), values.iter().cloned().collect()))
            .collect();

        Self {
            description: entry.description.clone(),
            count: 1,
            codes,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Number of raw entries merged into this aggregate.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn codes(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.codes
    }

    pub fn has_codes(&self) -> bool {
        !self.codes.is_empty()
    }

    /// Codes as sorted value lists, keyed by code system.
    pub fn code_lists(&self) -> BTreeMap<String, Vec<String>> {
        self.codes
            .iter()
            .map(|(system, values)| (system.clone(), values.iter().cloned().collect()))
            .collect()
    }

    /// Merge `source` into `self`, summing counts and unioning codes per system.
    ///
    /// # Errors
    ///
    /// Returns [`MuError::DescriptionMismatch`] if the descriptions differ. `self` is left
    /// untouched in that case.
    pub fn merge(&mut self, source: &AggregatedEntry) -> MuResult<()> {
        if self.description != source.description {
            return Err(MuError::DescriptionMismatch {
                expected: self.description.clone(),
                found: source.description.clone(),
            });
        }

        self.absorb(source);
        Ok(())
    }

    fn absorb(&mut self, source: &AggregatedEntry) {
        self.count += source.count;
        for (system, values) in &source.codes {
            let union = match self.codes.get(system) {
                Some(existing) => existing.union(values).cloned().collect(),
                None => values.clone(),
            };
            self.codes.insert(system.clone(), union);
        }
    }
}

/// Fold aggregates into a mapping from description to merged aggregate.
///
/// The first aggregate seen for a description is inserted as is; later ones merge into it.
pub fn aggregate_by_description<I>(aggregates: I) -> BTreeMap<String, AggregatedEntry>
where
    I: IntoIterator<Item = AggregatedEntry>,
{
    let mut by_description = BTreeMap::new();

    for aggregate in aggregates {
        match by_description.entry(aggregate.description.clone()) {
            MapEntry::Vacant(slot) => {
                slot.insert(aggregate);
            }
            // Keyed by description, so the merge precondition holds.
            MapEntry::Occupied(mut slot) => slot.get_mut().absorb(&aggregate),
        }
    }

    by_description
}
