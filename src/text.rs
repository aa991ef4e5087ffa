//! Detokenization and edit highlighting
//!
//! Both renderings share one joining rule so that the plain and highlighted
//! versions of a segment always have identical spacing.

use std::borrow::Cow;

use crate::error::{Error, Result};
use crate::types::{AttachmentSet, EditCodes};

/// Edit code for a token that needs no correction
pub const MATCH_CODE: char = 'p';

/// Join tokens with a space, except before tokens whose 1-based position is
/// in `attach` (ignored when `tokenised`).
fn join_tokens<I, S>(tokens: I, attach: &AttachmentSet, tokenised: bool) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for (i, token) in tokens.into_iter().enumerate() {
        if i > 0 && (tokenised || !attach.contains(i + 1)) {
            joined.push(' ');
        }
        joined.push_str(token.as_ref());
    }
    joined
}

/// Rebuild readable text from a token sequence.
///
/// With `tokenised` the tokens are simply space-joined. Otherwise each token
/// is preceded by a space unless its 1-based position is in `attach`;
/// positions past the end of the sequence are ignored.
///
/// # Examples
/// ```
/// use mtinspect::text::reconstruct;
/// use mtinspect::types::AttachmentSet;
///
/// let tokens = vec!["Hello".to_string(), ",".to_string(), "world".to_string()];
/// let attach: AttachmentSet = [2].into_iter().collect();
///
/// assert_eq!(reconstruct(&tokens, &attach, false), "Hello, world");
/// assert_eq!(reconstruct(&tokens, &attach, true), "Hello , world");
/// ```
pub fn reconstruct(tokens: &[String], attach: &AttachmentSet, tokenised: bool) -> String {
    join_tokens(tokens, attach, tokenised)
}

/// Wrap a token in the marker for its edit class, or leave it bare for a match
pub fn mark_token(token: &str, code: char) -> Cow<'_, str> {
    if code == MATCH_CODE {
        Cow::Borrowed(token)
    } else {
        Cow::Owned(format!("<span class='{code}-colour'>{token}</span>"))
    }
}

/// Rebuild text with every edited token wrapped in its class marker.
///
/// Without edit codes the segment was not scored and the plain
/// reconstruction is returned. Edit codes must line up one-to-one with the
/// tokens; a length mismatch is reported rather than silently misaligned.
pub fn highlight(
    tokens: &[String],
    edits: Option<&EditCodes>,
    attach: &AttachmentSet,
    tokenised: bool,
) -> Result<String> {
    let Some(edits) = edits else {
        return Ok(reconstruct(tokens, attach, tokenised));
    };

    if edits.len() != tokens.len() {
        return Err(Error::EditLengthMismatch {
            tokens: tokens.len(),
            edits: edits.len(),
        });
    }

    let marked = tokens
        .iter()
        .zip(edits.iter())
        .map(|(token, code)| mark_token(token, code));

    Ok(join_tokens(marked, attach, tokenised))
}
