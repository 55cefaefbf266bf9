//! Multi-section analysis over one or more documents.
//!
//! An [`Analysis`] holds one [`Section`] per configured definition. Documents are ingested one
//! at a time; per-document analyses can be merged afterwards on a single thread.

use crate::config::AnalysisConfig;
use crate::entry::Document;
use crate::report::{ListingRecord, SummaryRecord};
use crate::section::{Classification, Section};

/// What happened while ingesting one document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub unusable: usize,
    pub meaningful_use: usize,
    pub alien: usize,

    /// Section names present in the document but not configured; their entries were skipped.
    pub skipped_sections: Vec<String>,
}

impl IngestReport {
    pub fn classified(&self) -> usize {
        self.unusable + self.meaningful_use + self.alien
    }

    fn record(&mut self, classification: Classification) {
        match classification {
            Classification::Unusable => self.unusable += 1,
            Classification::MeaningfulUse => self.meaningful_use += 1,
            Classification::Alien => self.alien += 1,
        }
    }
}

/// Sections of a patient summary, in configured order.
#[derive(Clone, Debug)]
pub struct Analysis {
    sections: Vec<Section>,
}

impl Analysis {
    pub fn new(config: &AnalysisConfig) -> Self {
        let validator = config.validator();
        let sections = config
            .sections()
            .iter()
            .map(|definition| {
                Section::with_validator(&definition.name, &definition.allow_list, validator)
            })
            .collect();

        Self { sections }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.name() == name)
    }

    fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections
            .iter_mut()
            .find(|section| section.name() == name)
    }

    /// Feed every entry of `document` to its section, in document order.
    pub fn ingest(&mut self, document: &Document) -> IngestReport {
        let mut report = IngestReport::default();

        for (name, entries) in &document.sections {
            let Some(section) = self.section_mut(name) else {
                tracing::warn!(
                    section = %name,
                    entries = entries.len(),
                    "skipping entries for unconfigured section"
                );
                report.skipped_sections.push(name.clone());
                continue;
            };

            for entry in entries {
                report.record(section.add_entry(entry.clone()));
            }
        }

        tracing::debug!(
            classified = report.classified(),
            unusable = report.unusable,
            meaningful_use = report.meaningful_use,
            alien = report.alien,
            "ingested document"
        );
        report
    }

    /// Merge `other` into this analysis section by section.
    ///
    /// Sections only `other` has are appended, keeping their order.
    pub fn merge(&mut self, other: &Analysis) {
        for other_section in &other.sections {
            match self.section_mut(other_section.name()) {
                Some(section) => section.merge(other_section),
                None => self.sections.push(other_section.clone()),
            }
        }
    }

    /// Summaries of every section, keyed by section name.
    pub fn summary(&self) -> SummaryRecord {
        let mut record = SummaryRecord::default();
        for section in &self.sections {
            record.extend(section.summary());
        }
        record
    }

    /// Meaningful-use listings of every section that has meaningful-use entries.
    pub fn unique_mu_entries(&self) -> ListingRecord {
        let mut record = ListingRecord::default();
        for section in &self.sections {
            record.extend(section.unique_mu_entries());
        }
        record
    }

    /// Non-meaningful-use listings of every section that has unusable or alien entries.
    pub fn unique_non_mu_entries(&self) -> ListingRecord {
        let mut record = ListingRecord::default();
        for section in &self.sections {
            record.extend(section.unique_non_mu_entries());
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SectionDefinition;
    use crate::constants::{ICD_10_CM, ICD_9_CM, LOINC, RXNORM};
    use crate::entry::Entry;
    use crate::validator::UnknownSystemPolicy;
    use std::collections::BTreeMap;

    fn config() -> AnalysisConfig {
        AnalysisConfig::new(
            vec![
                SectionDefinition::new("conditions", [ICD_10_CM]),
                SectionDefinition::new("medications", [RXNORM]),
            ],
            UnknownSystemPolicy::Permissive,
        )
        .expect("valid config")
    }

    fn document(sections: Vec<(&str, Vec<Entry>)>) -> Document {
        Document {
            sections: sections
                .into_iter()
                .map(|(name, entries)| (name.to_string(), entries))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn new_creates_a_section_per_definition() {
        let analysis = Analysis::new(&config());
        let names: Vec<&str> = analysis.sections().iter().map(Section::name).collect();
        assert_eq!(names, vec!["conditions", "medications"]);
        assert!(analysis.sections().iter().all(Section::is_empty));
    }

    #[test]
    fn strict_config_reaches_every_section() {
        let config = AnalysisConfig::new(
            vec![SectionDefinition::new("conditions", [ICD_10_CM])],
            UnknownSystemPolicy::Strict,
        )
        .expect("valid config");
        let mut analysis = Analysis::new(&config);

        let report = analysis.ingest(&document(vec![(
            "conditions",
            vec![Entry::new("Mystery").with_codes("FAKE-SYS", ["xyz"])],
        )]));
        assert_eq!(report.unusable, 1);
    }

    #[test]
    fn ingest_routes_entries_and_reports_counts() {
        let mut analysis = Analysis::new(&config());
        let report = analysis.ingest(&document(vec![
            (
                "conditions",
                vec![
                    Entry::new("Cholera").with_codes(ICD_10_CM, ["A12"]),
                    Entry::new("Fever").with_codes(ICD_9_CM, ["780"]),
                ],
            ),
            (
                "medications",
                vec![Entry::new("Lisinopril").with_codes(RXNORM, ["29046"])],
            ),
            ("results", vec![Entry::new("HbA1c").with_codes(LOINC, ["4548-4"])]),
        ]));

        assert_eq!(report.meaningful_use, 2);
        assert_eq!(report.alien, 1);
        assert_eq!(report.unusable, 0);
        assert_eq!(report.classified(), 3);
        assert_eq!(report.skipped_sections, vec!["results".to_string()]);

        let conditions = analysis.section("conditions").expect("conditions");
        assert_eq!(conditions.len(), 2);
        assert!(analysis.section("results").is_none());
    }

    #[test]
    fn summary_covers_every_section() {
        let mut analysis = Analysis::new(&config());
        analysis.ingest(&document(vec![(
            "conditions",
            vec![Entry::new("Cholera").with_codes(ICD_10_CM, ["A12"])],
        )]));

        let summary = analysis.summary();
        assert_eq!(summary.sections.len(), 2);
        assert_eq!(summary.get("conditions").expect("conditions").mu_coded_entries, 1);
        assert_eq!(summary.get("medications").expect("medications").entries, 0);
    }

    #[test]
    fn listings_skip_sections_without_entries() {
        let mut analysis = Analysis::new(&config());
        analysis.ingest(&document(vec![(
            "conditions",
            vec![
                Entry::new("Cholera").with_codes(ICD_10_CM, ["A12"]),
                Entry::new("Rash"),
            ],
        )]));

        let mu = analysis.unique_mu_entries();
        assert_eq!(mu.sections.len(), 1);
        assert!(mu.get("conditions").is_some());

        let non_mu = analysis.unique_non_mu_entries();
        let rash = &non_mu.get("conditions").expect("conditions").entries["Rash"];
        assert_eq!(rash.count, 1);
        assert!(rash.codes.is_none());
        assert!(non_mu.get("medications").is_none());
    }

    #[test]
    fn merge_combines_documents() {
        let mut first = Analysis::new(&config());
        first.ingest(&document(vec![(
            "conditions",
            vec![Entry::new("Fever").with_codes(ICD_9_CM, ["780"])],
        )]));

        let mut second = Analysis::new(&config());
        second.ingest(&document(vec![(
            "conditions",
            vec![Entry::new("Fever").with_codes(ICD_9_CM, ["781"])],
        )]));

        first.merge(&second);

        let listing = first.unique_non_mu_entries();
        let fever = &listing.get("conditions").expect("conditions").entries["Fever"];
        assert_eq!(fever.count, 2);
        assert_eq!(
            fever.codes.as_ref().expect("codes")[ICD_9_CM],
            vec!["780", "781"]
        );
    }

    #[test]
    fn merge_adopts_sections_missing_from_receiver() {
        let mut narrow = Analysis::new(
            &AnalysisConfig::new(
                vec![SectionDefinition::new("conditions", [ICD_10_CM])],
                UnknownSystemPolicy::Permissive,
            )
            .expect("valid config"),
        );
        let mut wide = Analysis::new(&config());
        wide.ingest(&document(vec![(
            "medications",
            vec![Entry::new("Lisinopril").with_codes(RXNORM, ["29046"])],
        )]));

        narrow.merge(&wide);

        let names: Vec<&str> = narrow.sections().iter().map(Section::name).collect();
        assert_eq!(names, vec!["conditions", "medications"]);
        assert_eq!(narrow.section("medications").expect("medications").len(), 1);
    }
}
