//! Loading the translation corpus from JSON

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::types::Record;

/// An ordered set of records
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Corpus {
    pub records: Vec<Record>,
}

/// Either a bare array of records or `{ "pairs": [...] }`
#[derive(Deserialize)]
#[serde(untagged)]
enum CorpusRepr {
    Records(Vec<Record>),
    Pairs { pairs: Vec<Record> },
}

impl From<CorpusRepr> for Corpus {
    fn from(repr: CorpusRepr) -> Self {
        let records = match repr {
            CorpusRepr::Records(records) | CorpusRepr::Pairs { pairs: records } => records,
        };
        Self { records }
    }
}

impl Corpus {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let repr: CorpusRepr = serde_json::from_str(json)?;
        Ok(Self::loaded(repr.into()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let repr: CorpusRepr = serde_json::from_reader(reader)?;
        Ok(Self::loaded(repr.into()))
    }

    /// Load a corpus file
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    fn loaded(corpus: Self) -> Self {
        info!("Loaded corpus with {} records", corpus.records.len());
        corpus
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Check that every set of edit codes lines up with its tokens.
    /// Reports the first offending record (1-based) and side.
    pub fn validate(&self) -> Result<()> {
        for (i, record) in self.records.iter().enumerate() {
            for (side, segment) in record.segments() {
                for edits in [&segment.edits, &segment.edits_punct].into_iter().flatten() {
                    if edits.len() != segment.tokens.len() {
                        warn!("Record {} has misaligned edit codes on {}", i + 1, side);
                        return Err(Error::InconsistentRecord {
                            record: i + 1,
                            side,
                            tokens: segment.tokens.len(),
                            edits: edits.len(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
