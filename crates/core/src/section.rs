//! Patient summary sections: classification of entries and per-section reporting.
//!
//! A [`Section`] owns an allow-list of meaningful-use code systems. Every entry added to it is
//! placed in exactly one bucket:
//!
//! - **unusable** when no code system carries a valid value,
//! - **meaningful use** when an allow-listed system carries a valid value (alien codes on the
//!   same entry do not change this),
//! - **alien** otherwise.
//!
//! Buckets are append-only and keep arrival order. Report operations take `&self` and can be
//! called any number of times between or after ingests.

use crate::aggregate::{aggregate_by_description, AggregatedEntry};
use crate::entry::Entry;
use crate::report::{ListedEntry, ListingRecord, SectionListing, SectionSummary, SummaryRecord};
use crate::validator::CodeValidator;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// The bucket an entry is classified into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Classification {
    Unusable,
    MeaningfulUse,
    Alien,
}

impl Classification {
    /// Resolve the bucket from the two accumulated flags.
    ///
    /// Meaningful-use codes take priority over alien codes.
    pub fn from_flags(had_any_valid_code: bool, had_mu_code: bool) -> Self {
        match (had_any_valid_code, had_mu_code) {
            (false, _) => Classification::Unusable,
            (true, true) => Classification::MeaningfulUse,
            (true, false) => Classification::Alien,
        }
    }
}

/// Outcome of classifying one entry against a section's allow-list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryClassification {
    pub classification: Classification,

    /// Allow-listed systems that carried a valid value.
    pub mu_systems: BTreeSet<String>,

    /// Systems outside the allow-list that carried a valid value.
    pub alien_systems: BTreeSet<String>,
}

/// Classifier and aggregator for one logical document section.
#[derive(Clone, Debug)]
pub struct Section {
    name: String,
    allow_list: Vec<String>,
    validator: CodeValidator,
    all_entries: Vec<Arc<Entry>>,
    unusable_entries: Vec<Arc<Entry>>,
    mu_entries: Vec<Arc<Entry>>,
    alien_entries: Vec<Arc<Entry>>,
    mu_systems_seen: BTreeSet<String>,
    alien_systems_seen: BTreeSet<String>,
}

impl Section {
    /// Create an empty section validating with the permissive default.
    ///
    /// Repeated allow-list names are dropped, keeping the first occurrence.
    pub fn new<I, S>(name: impl Into<String>, allow_list: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_validator(name, allow_list, CodeValidator::default())
    }

    pub fn with_validator<I, S>(
        name: impl Into<String>,
        allow_list: I,
        validator: CodeValidator,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut deduped: Vec<String> = Vec::new();
        for system in allow_list.into_iter().map(Into::into) {
            if !deduped.contains(&system) {
                deduped.push(system);
            }
        }

        Self {
            name: name.into(),
            allow_list: deduped,
            validator,
            all_entries: Vec::new(),
            unusable_entries: Vec::new(),
            mu_entries: Vec::new(),
            alien_entries: Vec::new(),
            mu_systems_seen: BTreeSet::new(),
            alien_systems_seen: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn allow_list(&self) -> &[String] {
        &self.allow_list
    }

    pub fn validator(&self) -> CodeValidator {
        self.validator
    }

    pub fn is_allow_listed(&self, code_system: &str) -> bool {
        self.allow_list.iter().any(|system| system == code_system)
    }

    pub fn all_entries(&self) -> &[Arc<Entry>] {
        &self.all_entries
    }

    pub fn unusable_entries(&self) -> &[Arc<Entry>] {
        &self.unusable_entries
    }

    pub fn mu_entries(&self) -> &[Arc<Entry>] {
        &self.mu_entries
    }

    pub fn alien_entries(&self) -> &[Arc<Entry>] {
        &self.alien_entries
    }

    pub fn mu_systems_seen(&self) -> &BTreeSet<String> {
        &self.mu_systems_seen
    }

    pub fn alien_systems_seen(&self) -> &BTreeSet<String> {
        &self.alien_systems_seen
    }

    pub fn len(&self) -> usize {
        self.all_entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_entries.is_empty()
    }

    /// Classify `entry` without recording it.
    ///
    /// A code system counts when any one of its values is valid. Invalid values are ignored
    /// rather than rejected, so other systems on the same entry can still qualify it.
    pub fn classify(&self, entry: &Entry) -> EntryClassification {
        let mut had_any_valid_code = false;
        let mut had_mu_code = false;
        let mut mu_systems = BTreeSet::new();
        let mut alien_systems = BTreeSet::new();

        for (code_system, values) in &entry.codes {
            if !self.validator.any_valid(code_system, values.as_slice()) {
                tracing::debug!(
                    section = %self.name,
                    description = %entry.description,
                    code_system = %code_system,
                    "no valid code for system"
                );
                continue;
            }

            had_any_valid_code = true;
            if self.is_allow_listed(code_system) {
                had_mu_code = true;
                mu_systems.insert(code_system.clone());
            } else {
                alien_systems.insert(code_system.clone());
            }
        }

        EntryClassification {
            classification: Classification::from_flags(had_any_valid_code, had_mu_code),
            mu_systems,
            alien_systems,
        }
    }

    /// Classify and record `entry`, returning the bucket it was placed in.
    pub fn add_entry(&mut self, entry: impl Into<Arc<Entry>>) -> Classification {
        let entry = entry.into();
        let EntryClassification {
            classification,
            mu_systems,
            alien_systems,
        } = self.classify(&entry);

        self.mu_systems_seen.extend(mu_systems);
        self.alien_systems_seen.extend(alien_systems);

        let bucket = match classification {
            Classification::Unusable => &mut self.unusable_entries,
            Classification::MeaningfulUse => &mut self.mu_entries,
            Classification::Alien => &mut self.alien_entries,
        };
        bucket.push(Arc::clone(&entry));

        tracing::debug!(
            section = %self.name,
            description = %entry.description,
            ?classification,
            "classified entry"
        );

        self.all_entries.push(entry);
        classification
    }

    /// Entry counts and code systems in use, keyed by section name.
    pub fn summary(&self) -> SummaryRecord {
        let mu_coded_entries = self.mu_entries.len();
        let non_mu_coded_entries = self.alien_entries.len();

        let summary = SectionSummary {
            entries: self.unusable_entries.len() + mu_coded_entries + non_mu_coded_entries,
            mu_code_systems: self.allow_list.clone(),
            coded_entries: mu_coded_entries + non_mu_coded_entries,
            mu_coded_entries,
            mu_code_systems_in_use: self.mu_systems_seen.iter().cloned().collect(),
            non_mu_coded_entries,
            non_mu_code_systems_in_use: self.alien_systems_seen.iter().cloned().collect(),
        };

        SummaryRecord {
            sections: BTreeMap::from([(self.name.clone(), summary)]),
        }
    }

    /// Meaningful-use entries deduplicated by description.
    ///
    /// Returns an empty record when no meaningful-use entry has been added.
    pub fn unique_mu_entries(&self) -> ListingRecord {
        self.listing(self.mu_entries.iter())
    }

    /// Unusable then alien entries, deduplicated by description.
    ///
    /// An unusable and an alien entry with the same description fold into one aggregate whose
    /// codes come from the alien entry alone.
    pub fn unique_non_mu_entries(&self) -> ListingRecord {
        self.listing(self.unusable_entries.iter().chain(&self.alien_entries))
    }

    fn listing<'a, I>(&self, entries: I) -> ListingRecord
    where
        I: Iterator<Item = &'a Arc<Entry>>,
    {
        let aggregates = aggregate_by_description(
            entries.map(|entry| AggregatedEntry::from_valid_codes(entry, &self.validator)),
        );
        if aggregates.is_empty() {
            return ListingRecord::default();
        }

        let entries = aggregates
            .iter()
            .map(|(description, aggregate)| (description.clone(), ListedEntry::from(aggregate)))
            .collect();

        ListingRecord {
            sections: BTreeMap::from([(
                self.name.clone(),
                SectionListing {
                    mu_code_systems: self.allow_list.clone(),
                    entries,
                },
            )]),
        }
    }

    /// Append `other`'s buckets after this section's and union the seen code systems.
    ///
    /// Entries are not reclassified; `other` is assumed to have used an equivalent allow-list.
    pub fn merge(&mut self, other: &Section) {
        if self.allow_list != other.allow_list {
            tracing::warn!(
                section = %self.name,
                other = %other.name,
                "merging sections with different allow-lists"
            );
        }

        self.all_entries.extend(other.all_entries.iter().cloned());
        self.unusable_entries
            .extend(other.unusable_entries.iter().cloned());
        self.mu_entries.extend(other.mu_entries.iter().cloned());
        self.alien_entries.extend(other.alien_entries.iter().cloned());
        self.mu_systems_seen
            .extend(other.mu_systems_seen.iter().cloned());
        self.alien_systems_seen
            .extend(other.alien_systems_seen.iter().cloned());
    }
}
