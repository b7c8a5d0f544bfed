//! Content normalization for tree comparison.
//!
//! Two subtrees count as the same content when their serializations agree
//! after normalization: decorative break tags are removed first, then every
//! whitespace character. Layout churn (reindentation, reflowed line breaks,
//! added `<br>`s) therefore never shows up as an edit.

use memchr::memchr;

/// Normalized form of `text`: break tags removed, then all whitespace.
pub fn normalize(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'<' {
            if let Some(end) = match_br_tag(bytes, i) {
                i = end;
                continue;
            }
        }
        let next = match memchr(b'<', &bytes[i + 1..]) {
            Some(offset) => i + 1 + offset,
            None => bytes.len(),
        };
        out.extend(text[i..next].chars().filter(|ch| !ch.is_whitespace()));
        i = next;
    }
    out
}

/// Matches one break tag starting at the `<` at `start` and returns the index
/// one past its `>`. Accepted forms are `<br>`, `<br/>` and `</br>`, with
/// spaces allowed around the name and slashes.
fn match_br_tag(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = skip_spaces(bytes, start + 1);
    let closing = bytes.get(i) == Some(&b'/');
    if closing {
        i = skip_spaces(bytes, i + 1);
    }
    if !bytes[i..].starts_with(b"br") {
        return None;
    }
    i = skip_spaces(bytes, i + 2);
    if !closing && bytes.get(i) == Some(&b'/') {
        i = skip_spaces(bytes, i + 1);
    }
    match bytes.get(i) {
        Some(&b'>') => Some(i + 1),
        _ => None,
    }
}

fn skip_spaces(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i) == Some(&b' ') {
        i += 1;
    }
    i
}
