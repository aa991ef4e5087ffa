//! Record filtering: decides which pairs make it into the table.
//!
//! All checks are AND-ed, in a fixed order. The reference checks succeed as
//! soon as one reference passes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::FilterConfig;
use crate::types::{Record, Segment};

/// The first check a record failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    SourceLength,
    TranslationLength,
    NoMatchingReference,
    SourcePattern,
    ReferencePattern,
    TranslationPattern,
}

/// Counters over the records examined while building a table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStats {
    pub examined: usize,
    pub accepted: usize,
    pub rejected_by_source_length: usize,
    pub rejected_by_translation_length: usize,
    pub rejected_by_references: usize,
    pub rejected_by_source_pattern: usize,
    pub rejected_by_reference_pattern: usize,
    pub rejected_by_translation_pattern: usize,
}

impl FilterStats {
    /// Tally one outcome; returns whether the record was accepted
    pub fn record(&mut self, outcome: Option<Rejection>) -> bool {
        self.examined += 1;
        let Some(rejection) = outcome else {
            self.accepted += 1;
            return true;
        };

        let counter = match rejection {
            Rejection::SourceLength => &mut self.rejected_by_source_length,
            Rejection::TranslationLength => &mut self.rejected_by_translation_length,
            Rejection::NoMatchingReference => &mut self.rejected_by_references,
            Rejection::SourcePattern => &mut self.rejected_by_source_pattern,
            Rejection::ReferencePattern => &mut self.rejected_by_reference_pattern,
            Rejection::TranslationPattern => &mut self.rejected_by_translation_pattern,
        };
        *counter += 1;
        false
    }

    pub fn rejected(&self) -> usize {
        self.examined - self.accepted
    }
}

/// Whether the record passes every configured check
pub fn accepts(record: &Record, config: &FilterConfig) -> bool {
    rejection(record, config).is_none()
}

/// The first failed check, or `None` when the record is accepted
pub fn rejection(record: &Record, config: &FilterConfig) -> Option<Rejection> {
    let mode = config.mode();

    if !config.source_len.admits(record.source.count(mode)) {
        return Some(Rejection::SourceLength);
    }
    if !config.translation_len.admits(record.translation.count(mode)) {
        return Some(Rejection::TranslationLength);
    }

    if !record.references.iter().any(|r| reference_in_range(r, config)) {
        return Some(Rejection::NoMatchingReference);
    }

    if let Some(pattern) = &config.source_pattern {
        if !pattern.matches(&record.source.plain_text(config.tokenised)) {
            return Some(Rejection::SourcePattern);
        }
    }

    if let Some(pattern) = &config.reference_pattern {
        let found = record
            .references
            .iter()
            .any(|r| pattern.matches(&r.plain_text(config.tokenised)));
        if !found {
            return Some(Rejection::ReferencePattern);
        }
    }

    if let Some(pattern) = &config.translation_pattern {
        if !pattern.matches(&record.translation.plain_text(config.tokenised)) {
            return Some(Rejection::TranslationPattern);
        }
    }

    None
}

/// Length and WER of one reference against the configured bounds.
/// References missing either value for the active mode never qualify.
fn reference_in_range(reference: &Segment, config: &FilterConfig) -> bool {
    let mode = config.mode();
    let (Some(length), Some(wer)) = (reference.count(mode), reference.wer(mode)) else {
        debug!("Skipping reference without {:?} count or WER", mode);
        return false;
    };
    config.reference_len.contains(length) && config.wer.contains(wer)
}
