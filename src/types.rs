//! Corpus types: records, segments and their per-token annotations

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::text;

/// Whitespace-split words of one side of a record
pub type TokenSequence = Vec<String>;

/// Which flavour of counts, WER and edit codes to read off a segment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Word-level: punctuation tokens are not counted or scored
    #[default]
    Words,
    /// Punctuation-inclusive: every token counts
    Punctuation,
}

impl Mode {
    pub fn from_punctuation(punctuation: bool) -> Self {
        if punctuation {
            Self::Punctuation
        } else {
            Self::Words
        }
    }
}

/// 1-based token positions that are glued to the previous token (no space before)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AttachmentRepr", into = "Vec<usize>")]
pub struct AttachmentSet(BTreeSet<usize>);

impl AttachmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the token at 1-based `position` attaches to its predecessor
    pub fn contains(&self, position: usize) -> bool {
        self.0.contains(&position)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<usize> for AttachmentSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<AttachmentSet> for Vec<usize> {
    fn from(set: AttachmentSet) -> Self {
        set.0.into_iter().collect()
    }
}

/// The corpus stores attachment positions either as a list or as "2,5"
#[derive(Deserialize)]
#[serde(untagged)]
enum AttachmentRepr {
    List(Vec<usize>),
    Text(String),
}

impl TryFrom<AttachmentRepr> for AttachmentSet {
    type Error = String;

    fn try_from(repr: AttachmentRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            AttachmentRepr::List(positions) => Ok(positions.into_iter().collect()),
            AttachmentRepr::Text(text) => text
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| {
                    part.parse::<usize>()
                        .map_err(|_| format!("invalid attachment position {part:?}"))
                })
                .collect(),
        }
    }
}

/// Per-token edit classification, one code per token ('p' = unchanged)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct EditCodes(Vec<char>);

impl EditCodes {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.0.iter().copied()
    }
}

impl From<&str> for EditCodes {
    fn from(codes: &str) -> Self {
        Self(codes.chars().collect())
    }
}

impl From<String> for EditCodes {
    fn from(codes: String) -> Self {
        Self::from(codes.as_str())
    }
}

impl From<EditCodes> for String {
    fn from(codes: EditCodes) -> Self {
        codes.0.into_iter().collect()
    }
}

/// One side of a record: the source, the hypothesis or a reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(rename = "text", with = "token_text")]
    pub tokens: TokenSequence,
    #[serde(rename = "contiguous", default)]
    pub attach: AttachmentSet,
    #[serde(rename = "nbwords", default, skip_serializing_if = "Option::is_none")]
    pub nb_words: Option<u32>,
    #[serde(rename = "nbtokens", default, skip_serializing_if = "Option::is_none")]
    pub nb_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edits: Option<EditCodes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edits_punct: Option<EditCodes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wer: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wer_punct: Option<f64>,
}

impl Segment {
    /// Build a segment from a space-separated token string
    pub fn from_text(text: &str) -> Self {
        Self {
            tokens: token_text::split(text),
            ..Self::default()
        }
    }

    pub fn with_attach(mut self, attach: impl IntoIterator<Item = usize>) -> Self {
        self.attach = attach.into_iter().collect();
        self
    }

    pub fn with_counts(mut self, nb_words: u32, nb_tokens: u32) -> Self {
        self.nb_words = Some(nb_words);
        self.nb_tokens = Some(nb_tokens);
        self
    }

    pub fn with_edits(mut self, edits: &str, edits_punct: &str) -> Self {
        self.edits = Some(EditCodes::from(edits));
        self.edits_punct = Some(EditCodes::from(edits_punct));
        self
    }

    pub fn with_wer(mut self, wer: f64, wer_punct: f64) -> Self {
        self.wer = Some(wer);
        self.wer_punct = Some(wer_punct);
        self
    }

    /// Length of the segment for the given mode (words or tokens)
    pub fn count(&self, mode: Mode) -> Option<u32> {
        match mode {
            Mode::Words => self.nb_words,
            Mode::Punctuation => self.nb_tokens,
        }
    }

    pub fn wer(&self, mode: Mode) -> Option<f64> {
        match mode {
            Mode::Words => self.wer,
            Mode::Punctuation => self.wer_punct,
        }
    }

    pub fn edits(&self, mode: Mode) -> Option<&EditCodes> {
        match mode {
            Mode::Words => self.edits.as_ref(),
            Mode::Punctuation => self.edits_punct.as_ref(),
        }
    }

    /// Detokenized text (or the raw token stream when `tokenised`)
    pub fn plain_text(&self, tokenised: bool) -> String {
        text::reconstruct(&self.tokens, &self.attach, tokenised)
    }

    /// Text with edited tokens marked, using the edit codes of `mode`
    pub fn highlighted_text(&self, mode: Mode, tokenised: bool) -> Result<String> {
        text::highlight(&self.tokens, self.edits(mode), &self.attach, tokenised)
    }
}

/// A source sentence with its machine translation and the human references
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub source: Segment,
    pub translation: Segment,
    #[serde(default, alias = "reference")]
    pub references: Vec<Segment>,
}

impl Record {
    pub fn new(source: Segment, translation: Segment, references: Vec<Segment>) -> Self {
        Self {
            source,
            translation,
            references,
        }
    }

    /// Every segment with a label naming its side
    pub fn segments(&self) -> impl Iterator<Item = (String, &Segment)> + '_ {
        [
            ("source".to_string(), &self.source),
            ("translation".to_string(), &self.translation),
        ]
        .into_iter()
        .chain(
            self.references
                .iter()
                .enumerate()
                .map(|(i, r)| (format!("reference {}", i + 1), r)),
        )
    }
}

/// Serde adapter storing a token sequence as its space-joined text
mod token_text {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn split(text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        text.split(' ').map(str::to_string).collect()
    }

    pub fn serialize<S: Serializer>(tokens: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&tokens.join(" "))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(split(&text))
    }
}
