//! Report shapes produced by sections and analyses.
//!
//! These are plain data meant for serialisation by a presentation layer. Field names on the wire
//! follow the established reporting format, for example `"mu coded entries"`.

use crate::aggregate::AggregatedEntry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Entry counts and code-system usage for one section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSummary {
    /// Total entries (unusable + meaningful-use + alien).
    pub entries: usize,

    /// The section's allow-list, in configured order.
    #[serde(rename = "mu code systems")]
    pub mu_code_systems: Vec<String>,

    /// Entries with at least one valid code (meaningful-use + alien).
    #[serde(rename = "coded entries")]
    pub coded_entries: usize,

    #[serde(rename = "mu coded entries")]
    pub mu_coded_entries: usize,

    #[serde(rename = "mu code systems in use")]
    pub mu_code_systems_in_use: Vec<String>,

    #[serde(rename = "non-mu coded entries")]
    pub non_mu_coded_entries: usize,

    #[serde(rename = "non-mu code systems in use")]
    pub non_mu_code_systems_in_use: Vec<String>,
}

/// Summaries keyed by section name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SummaryRecord {
    pub sections: BTreeMap<String, SectionSummary>,
}

impl SummaryRecord {
    pub fn get(&self, section_name: &str) -> Option<&SectionSummary> {
        self.sections.get(section_name)
    }

    pub(crate) fn extend(&mut self, other: SummaryRecord) {
        self.sections.extend(other.sections);
    }
}

/// One deduplicated description in a listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedEntry {
    /// Number of raw entries sharing the description.
    pub count: usize,

    /// Union of codes across those entries; absent when none was collected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codes: Option<BTreeMap<String, Vec<String>>>,
}

impl From<&AggregatedEntry> for ListedEntry {
    fn from(aggregate: &AggregatedEntry) -> Self {
        Self {
            count: aggregate.count(),
            codes: aggregate.has_codes().then(|| aggregate.code_lists()),
        }
    }
}

/// Deduplicated entries of one section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionListing {
    #[serde(rename = "mucodesystems")]
    pub mu_code_systems: Vec<String>,

    pub entries: BTreeMap<String, ListedEntry>,
}

/// Listings keyed by section name. Empty when the listed bucket had no entries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingRecord {
    pub sections: BTreeMap<String, SectionListing>,
}

impl ListingRecord {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn get(&self, section_name: &str) -> Option<&SectionListing> {
        self.sections.get(section_name)
    }

    pub(crate) fn extend(&mut self, other: ListingRecord) {
        self.sections.extend(other.sections);
    }
}
