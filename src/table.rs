//! Builds the inspection table from the accepted records.
//!
//! Each row links back to the row before it, so the reader can see the
//! context a sentence was translated in.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::FilterConfig;
use crate::error::Result;
use crate::filter::{FilterStats, accepts, rejection};
use crate::types::Record;

/// A reference as shown in the reference tooltip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedReference {
    /// Highlighted text when the reference carries edit codes, plain text otherwise
    pub text: String,
    /// Detokenized text without markup
    pub plain: String,
    pub wer: Option<f64>,
    /// Whether the hypothesis was scored against this reference
    pub scored: bool,
}

/// What the previous row showed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousRow {
    pub source: String,
    pub reference: String,
    pub translation: String,
}

/// One rendered table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// 1-based position in the table
    pub index: usize,
    pub source: String,
    pub translation: String,
    pub translation_highlighted: String,
    pub references: Vec<RenderedReference>,
    pub previous: Option<PreviousRow>,
}

impl Row {
    /// The context this row hands to the next one
    fn snapshot(&self) -> PreviousRow {
        let reference = self
            .references
            .iter()
            .rev()
            .find(|r| r.scored)
            .or_else(|| self.references.first())
            .map(|r| r.plain.clone())
            .unwrap_or_default();

        PreviousRow {
            source: self.source.clone(),
            reference,
            translation: self.translation.clone(),
        }
    }
}

/// The accepted rows plus bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<Row>,
    /// Number of accepted rows
    pub total: usize,
    pub stats: FilterStats,
}

/// Accepted records in corpus order, capped at the table size.
///
/// Lazy: nothing past the last needed record is examined. Calling it again
/// restarts from the beginning of the corpus.
pub fn accepted<'a>(
    records: &'a [Record],
    config: &'a FilterConfig,
) -> impl Iterator<Item = &'a Record> + 'a {
    records
        .iter()
        .filter(move |record| accepts(record, config))
        .take(config.table_size)
}

/// Render a single accepted record
pub fn render_record(
    index: usize,
    record: &Record,
    config: &FilterConfig,
    previous: Option<PreviousRow>,
) -> Result<Row> {
    let mode = config.mode();
    let tokenised = config.tokenised;

    let references = record
        .references
        .iter()
        .map(|reference| {
            Ok(RenderedReference {
                text: reference.highlighted_text(mode, tokenised)?,
                plain: reference.plain_text(tokenised),
                wer: reference.wer(mode),
                scored: reference.edits(mode).is_some(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Row {
        index,
        source: record.source.plain_text(tokenised),
        translation: record.translation.plain_text(tokenised),
        translation_highlighted: record.translation.highlighted_text(mode, tokenised)?,
        references,
        previous,
    })
}

/// Filter the corpus and render up to `table_size` rows.
///
/// Fails on the first accepted record whose edit codes do not line up with
/// its tokens.
pub fn build_table(records: &[Record], config: &FilterConfig) -> Result<Table> {
    let mut stats = FilterStats::default();

    let screened = records
        .iter()
        .filter(|record| stats.record(rejection(record, config)))
        .take(config.table_size);

    let (rows, _) = screened.enumerate().try_fold(
        (Vec::new(), None::<PreviousRow>),
        |(mut rows, previous), (i, record)| -> Result<_> {
            let row = render_record(i + 1, record, config, previous)?;
            let next = row.snapshot();
            rows.push(row);
            Ok((rows, Some(next)))
        },
    )?;

    debug!(
        "Examined {} records, rejected {}",
        stats.examined,
        stats.rejected()
    );
    info!("Built table with {} rows in {:?} mode", rows.len(), config.mode());

    Ok(Table {
        total: rows.len(),
        rows,
        stats,
    })
}
