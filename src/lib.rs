//! mtinspect - Filter and render machine-translation outputs for inspection
//!
//! Takes a corpus of source sentences with their machine translation and
//! human references, selects the pairs matching a filter, and renders
//! detokenized text with the edited tokens highlighted.

pub mod config;
pub mod corpus;
pub mod error;
pub mod filter;
pub mod render;
pub mod table;
pub mod text;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

pub use config::{Bounds, FilterConfig, Pattern, PatternMode};
pub use corpus::Corpus;
pub use filter::{FilterStats, Rejection, accepts};
pub use table::{PreviousRow, RenderedReference, Row, Table, accepted, build_table};
pub use text::{highlight, reconstruct};
