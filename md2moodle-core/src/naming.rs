//! Stable question names
//!
//! Moodle matches re-imported questions by name, so names must not change between runs
//! on unchanged input. A name is the zero-padded ordinal followed by a 128-bit content
//! digest: `0001` + 32 lowercase hex digits.

use sha2::{Digest, Sha256};
use std::fmt::Write;

/// Number of digest bytes kept in the name.
const DIGEST_BYTES: usize = 16;

/// Build the name of a question from its ordinal and rendered content.
///
/// `answers` yields `(is_correct, rendered_markup)` in source order.
pub fn question_name<'a>(
    ordinal: usize,
    statement_markup: &str,
    answers: impl IntoIterator<Item = (bool, &'a str)>,
) -> String {
    format!("{ordinal:04}{}", content_digest(statement_markup, answers))
}

/// Hex-encoded 128-bit digest of a statement and its answers.
pub fn content_digest<'a>(
    statement_markup: &str,
    answers: impl IntoIterator<Item = (bool, &'a str)>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(statement_markup.as_bytes());
    for (is_correct, markup) in answers {
        hasher.update([0u8]);
        hasher.update(if is_correct { b"!" } else { b" " });
        hasher.update(markup.as_bytes());
    }
    let digest = hasher.finalize();

    let mut hex = String::with_capacity(DIGEST_BYTES * 2);
    for byte in &digest[..DIGEST_BYTES] {
        // Writing to a String cannot fail
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}
