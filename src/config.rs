//! Filter configuration and its query-string form
//!
//! The inspection page encodes its filter in the URL query, e.g.
//! `?minwer=10&punct=yes&refsub=house&tablesize=50`. Every field is optional;
//! an empty or missing value means "no restriction".

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::Mode;

/// Number of rows shown when the query does not say otherwise
pub const DEFAULT_TABLE_SIZE: usize = 100;

/// Query value that switches a checkbox option on
const CHECKED: &str = "yes";

const KNOWN_KEYS: &[&str] = &[
    "minsource",
    "maxsource",
    "minref",
    "maxref",
    "mintrans",
    "maxtrans",
    "minwer",
    "maxwer",
    "punct",
    "sourcesub",
    "refsub",
    "transsub",
    "tokenised",
    "tablesize",
    "regex",
];

/// Inclusive range with optional ends
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    pub fn new(min: Option<T>, max: Option<T>) -> Self {
        Self { min, max }
    }

    pub fn unbounded() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Rejects only when strictly below `min` or strictly above `max`
    pub fn contains(&self, value: T) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }

    /// Like `contains`, for a value the record may not carry.
    /// A missing value only passes when there is nothing to check.
    pub fn admits(&self, value: Option<T>) -> bool {
        match value {
            Some(value) => self.contains(value),
            None => self.is_unbounded(),
        }
    }
}

/// How substring patterns are matched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PatternMode {
    /// Plain substring containment
    #[default]
    Literal,
    /// Patterns are regular expressions
    Regex,
}

/// A text filter over the rendered text of a segment
#[derive(Debug, Clone)]
pub enum Pattern {
    Literal(String),
    Regex(Regex),
}

impl Pattern {
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// Compile a pattern for the given mode, `name` is used in errors
    pub fn compile(name: &'static str, text: &str, mode: PatternMode) -> Result<Self> {
        match mode {
            PatternMode::Literal => Ok(Self::literal(text)),
            PatternMode::Regex => Regex::new(text)
                .map(Self::Regex)
                .map_err(|e| Error::InvalidPattern {
                    name,
                    message: e.to_string(),
                }),
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        match self {
            Self::Literal(needle) => text.contains(needle.as_str()),
            Self::Regex(re) => re.is_match(text),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(needle) => write!(f, "{needle:?}"),
            Self::Regex(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

/// Everything that decides which records are shown and how
#[derive(Debug, Clone)]
pub struct FilterConfig {
    pub source_len: Bounds<u32>,
    pub translation_len: Bounds<u32>,
    pub reference_len: Bounds<u32>,
    pub wer: Bounds<f64>,
    pub source_pattern: Option<Pattern>,
    pub reference_pattern: Option<Pattern>,
    pub translation_pattern: Option<Pattern>,
    /// Count punctuation tokens and use the punctuation-inclusive scores
    pub punctuation: bool,
    /// Show the raw token stream instead of detokenized text
    pub tokenised: bool,
    /// Maximum number of rows in the result
    pub table_size: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            source_len: Bounds::unbounded(),
            translation_len: Bounds::unbounded(),
            reference_len: Bounds::unbounded(),
            wer: Bounds::unbounded(),
            source_pattern: None,
            reference_pattern: None,
            translation_pattern: None,
            punctuation: false,
            tokenised: false,
            table_size: DEFAULT_TABLE_SIZE,
        }
    }
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mode selecting counts, WER and edit codes
    pub fn mode(&self) -> Mode {
        Mode::from_punctuation(self.punctuation)
    }

    pub fn with_source_len(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.source_len = Bounds::new(min, max);
        self
    }

    pub fn with_translation_len(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.translation_len = Bounds::new(min, max);
        self
    }

    pub fn with_reference_len(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.reference_len = Bounds::new(min, max);
        self
    }

    pub fn with_wer(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.wer = Bounds::new(min, max);
        self
    }

    pub fn with_source_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.source_pattern = Some(Pattern::literal(pattern));
        self
    }

    pub fn with_reference_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.reference_pattern = Some(Pattern::literal(pattern));
        self
    }

    pub fn with_translation_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.translation_pattern = Some(Pattern::literal(pattern));
        self
    }

    pub fn with_punctuation(mut self, punctuation: bool) -> Self {
        self.punctuation = punctuation;
        self
    }

    pub fn with_tokenised(mut self, tokenised: bool) -> Self {
        self.tokenised = tokenised;
        self
    }

    pub fn with_table_size(mut self, table_size: usize) -> Self {
        self.table_size = table_size;
        self
    }

    /// Parse the page's query string (leading `?` optional).
    ///
    /// Numbers that are present but malformed are errors rather than being
    /// read as "no bound". Unknown keys are ignored and, for repeated keys,
    /// the first occurrence wins.
    pub fn from_query(query: &str) -> Result<Self> {
        let params = QueryParams::parse(query)?;
        let pattern_mode = if params.flag("regex") {
            PatternMode::Regex
        } else {
            PatternMode::Literal
        };

        let config = Self {
            source_len: Bounds::new(params.count("minsource")?, params.count("maxsource")?),
            translation_len: Bounds::new(params.count("mintrans")?, params.count("maxtrans")?),
            reference_len: Bounds::new(params.count("minref")?, params.count("maxref")?),
            wer: Bounds::new(params.wer("minwer")?, params.wer("maxwer")?),
            source_pattern: params.pattern("sourcesub", pattern_mode)?,
            reference_pattern: params.pattern("refsub", pattern_mode)?,
            translation_pattern: params.pattern("transsub", pattern_mode)?,
            punctuation: params.flag("punct"),
            tokenised: params.flag("tokenised"),
            table_size: params.count("tablesize")?.unwrap_or(DEFAULT_TABLE_SIZE),
        };

        debug!("Parsed filter configuration: {:?}", config);
        Ok(config)
    }
}

impl FromStr for FilterConfig {
    type Err = Error;

    fn from_str(query: &str) -> Result<Self> {
        Self::from_query(query)
    }
}

/// Decoded query parameters, empty values dropped
struct QueryParams {
    values: HashMap<String, String>,
}

impl QueryParams {
    fn parse(query: &str) -> Result<Self> {
        let mut values = HashMap::new();
        let query = query.strip_prefix('?').unwrap_or(query);

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode_component(key)?;
            let value = decode_component(value)?;

            if !KNOWN_KEYS.contains(&key.as_str()) {
                debug!("Ignoring unknown query parameter {}", key);
                continue;
            }
            values.entry(key).or_insert(value);
        }

        values.retain(|_, v| !v.is_empty());
        Ok(Self { values })
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    fn flag(&self, name: &str) -> bool {
        self.get(name) == Some(CHECKED)
    }

    fn invalid(&self, name: &'static str, value: &str, expected: &'static str) -> Error {
        Error::InvalidBound {
            name,
            value: value.to_string(),
            expected,
        }
    }

    /// Lengths and the table size
    fn count<T: FromStr>(&self, name: &'static str) -> Result<Option<T>> {
        self.get(name)
            .map(|value| {
                value
                    .trim()
                    .parse::<T>()
                    .map_err(|_| self.invalid(name, value, "a non-negative integer"))
            })
            .transpose()
    }

    /// WER percentages; `NaN` and infinities parse as floats but bound nothing
    fn wer(&self, name: &'static str) -> Result<Option<f64>> {
        self.get(name)
            .map(|value| match value.trim().parse::<f64>() {
                Ok(wer) if wer.is_finite() => Ok(wer),
                _ => Err(self.invalid(name, value, "a finite number")),
            })
            .transpose()
    }

    fn pattern(&self, name: &'static str, mode: PatternMode) -> Result<Option<Pattern>> {
        self.get(name)
            .map(|text| Pattern::compile(name, text, mode))
            .transpose()
    }
}

/// Form-style decoding: `+` is a space, then percent escapes
fn decode_component(raw: &str) -> Result<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| Error::Config(format!("query is not valid UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_is_unconstrained() {
        let config = FilterConfig::from_query("").unwrap();

        assert!(config.source_len.is_unbounded());
        assert!(config.translation_len.is_unbounded());
        assert!(config.reference_len.is_unbounded());
        assert!(config.wer.is_unbounded());
        assert!(config.source_pattern.is_none());
        assert!(!config.punctuation);
        assert!(!config.tokenised);
        assert_eq!(config.table_size, DEFAULT_TABLE_SIZE);
    }

    #[test]
    fn test_full_query() {
        let config = FilterConfig::from_query(
            "?minsource=3&maxsource=20&minref=2&maxref=30&mintrans=1&maxtrans=25\
             &minwer=10&maxwer=50.5&punct=yes&sourcesub=hus&refsub=house&transsub=home\
             &tokenised=yes&tablesize=5",
        )
        .unwrap();

        assert_eq!(config.source_len, Bounds::new(Some(3), Some(20)));
        assert_eq!(config.reference_len, Bounds::new(Some(2), Some(30)));
        assert_eq!(config.translation_len, Bounds::new(Some(1), Some(25)));
        assert_eq!(config.wer, Bounds::new(Some(10.0), Some(50.5)));
        assert!(config.punctuation);
        assert!(config.tokenised);
        assert_eq!(config.mode(), Mode::Punctuation);
        assert_eq!(config.table_size, 5);
        assert!(config.source_pattern.unwrap().matches("et hus"));
        assert!(config.reference_pattern.unwrap().matches("a house"));
        assert!(config.translation_pattern.unwrap().matches("at home"));
    }

    #[test]
    fn test_empty_values_are_absent() {
        let config = FilterConfig::from_query("minwer=10&maxwer=&punct=no&tablesize=5").unwrap();

        assert_eq!(config.wer, Bounds::new(Some(10.0), None));
        assert!(!config.punctuation);
        assert_eq!(config.table_size, 5);
    }

    #[test]
    fn test_malformed_bound_fails() {
        let err = FilterConfig::from_query("minsource=ten").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidBound { name: "minsource", ref value, .. } if value == "ten"
        ));

        assert!(FilterConfig::from_query("tablesize=-1").is_err());
        assert!(FilterConfig::from_query("maxwer=abc").is_err());
    }

    #[test]
    fn test_non_finite_wer_fails() {
        for query in ["minwer=NaN", "maxwer=inf", "maxwer=-infinity"] {
            let err = FilterConfig::from_query(query).unwrap_err();
            assert!(
                matches!(err, Error::InvalidBound { expected: "a finite number", .. }),
                "{query}"
            );
        }
    }

    #[test]
    fn test_fractional_length_names_integer() {
        let err = FilterConfig::from_query("minsource=2.5").unwrap_err();
        assert!(matches!(err, Error::InvalidBound { name: "minsource", .. }));
        assert_eq!(
            err.to_string(),
            "Invalid value for minsource: \"2.5\" is not a non-negative integer"
        );

        let err = FilterConfig::from_query("maxref=-1").unwrap_err();
        assert!(err.to_string().ends_with("is not a non-negative integer"));
    }

    #[test]
    fn test_percent_and_plus_decoding() {
        let config = FilterConfig::from_query("refsub=New+York%2C&transsub=%C3%A6").unwrap();

        assert!(config.reference_pattern.unwrap().matches("in New York, today"));
        assert!(config.translation_pattern.unwrap().matches("blåbær"));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let config = FilterConfig::from_query("tablesize=3&tablesize=7").unwrap();
        assert_eq!(config.table_size, 3);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config = FilterConfig::from_query("full=false&minref=2").unwrap();
        assert_eq!(config.reference_len.min, Some(2));
    }

    #[test]
    fn test_literal_patterns_are_not_regexes() {
        let config = FilterConfig::from_query("sourcesub=a.c").unwrap();
        let pattern = config.source_pattern.unwrap();

        assert!(pattern.matches("xa.cx"));
        assert!(!pattern.matches("abc"));
    }

    #[test]
    fn test_regex_mode() {
        let config = FilterConfig::from_query("regex=yes&sourcesub=%5Ea.c").unwrap();
        let pattern = config.source_pattern.unwrap();

        assert!(pattern.matches("abc"));
        assert!(!pattern.matches("xabc"));

        let err = FilterConfig::from_query("regex=yes&refsub=(").unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { name: "refsub", .. }));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let bounds = Bounds::new(Some(2), Some(4));

        assert!(!bounds.contains(1));
        assert!(bounds.contains(2));
        assert!(bounds.contains(4));
        assert!(!bounds.contains(5));
        assert!(!bounds.admits(None));
        assert!(Bounds::<u32>::unbounded().admits(None));
    }

    #[test]
    fn test_from_str() {
        let config: FilterConfig = "punct=yes".parse().unwrap();
        assert!(config.punctuation);
    }

    #[test]
    fn test_builder_methods() {
        let config = FilterConfig::new()
            .with_wer(Some(5.0), None)
            .with_reference_pattern("cat")
            .with_table_size(2);

        assert_eq!(config.wer.min, Some(5.0));
        assert!(config.reference_pattern.is_some());
        assert_eq!(config.table_size, 2);
    }
}
