//! # MU Core
//!
//! Meaningful-use coding analysis for C32/CCR patient summary sections.
//!
//! This crate contains the pure classification and aggregation engine:
//! - syntactic validation of code values per code system ([`CodeValidator`])
//! - three-way classification of section entries into unusable, meaningful-use and alien
//!   buckets ([`Section`])
//! - merging of same-description entries into deduplicated listings ([`AggregatedEntry`])
//! - per-section summaries and listings shaped for reporting ([`report`])
//!
//! **No I/O**: documents arrive as already-extracted [`Entry`] records. XML parsing, directory
//! scanning and output rendering belong to callers such as `mu-cli`.

pub mod aggregate;
pub mod analysis;
pub mod config;
pub mod constants;
pub mod entry;
pub mod error;
pub mod report;
pub mod section;
pub mod validator;

pub use aggregate::{aggregate_by_description, AggregatedEntry};
pub use analysis::{Analysis, IngestReport};
pub use config::{AnalysisConfig, SectionDefinition};
pub use entry::{Document, Entry};
pub use error::{MuError, MuResult};
pub use report::{ListedEntry, ListingRecord, SectionListing, SectionSummary, SummaryRecord};
pub use section::{Classification, EntryClassification, Section};
pub use validator::{is_valid, CodeValidator, UnknownSystemPolicy};
