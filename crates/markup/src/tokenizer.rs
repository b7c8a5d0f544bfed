//! Tolerant tag-soup tokenizer with a constrained, practical tag-name character set.
//!
//! Supported tag-name characters (ASCII only): `[A-Za-z0-9:_-]`. Attribute
//! names use the same ASCII character class. Tag and attribute names are
//! lowercased; text and attribute values are carried verbatim (entities are
//! not decoded), so a tree serialized from the output reparses to the same
//! shape.
//!
//! Known limitations (intentional):
//! - Comments, doctypes/declarations and processing instructions are consumed
//!   and dropped; they never reach the tree.
//! - Rawtext close-tag scanning accepts only ASCII whitespace before `>` (see
//!   `find_rawtext_close_tag`).
//! - A `<` that opens no recognizable construct is literal text.
use crate::types::{MarkupMode, Token};
use memchr::memchr;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

fn starts_with_ignore_ascii_case_at(haystack: &[u8], start: usize, needle: &[u8]) -> bool {
    haystack.len() >= start + needle.len()
        && haystack[start..start + needle.len()].eq_ignore_ascii_case(needle)
}

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'_' || c == b':'
}

// Only consulted in html mode; xml has no void elements.
fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn is_rawtext_element(name: &str) -> bool {
    name == "script" || name == "style"
}

/// Finds `</name`, optional ASCII whitespace, `>` in `haystack`, case
/// insensitively. Returns the byte range start (at `<`) and the position one
/// past `>`. `close_tag` must be the ASCII `</name` prefix.
fn find_rawtext_close_tag(haystack: &str, close_tag: &[u8]) -> Option<(usize, usize)> {
    let hay_bytes = haystack.as_bytes();
    let len = hay_bytes.len();
    let n = close_tag.len();
    debug_assert!(n >= 2);
    debug_assert!(close_tag[0] == b'<' && close_tag[1] == b'/');
    debug_assert!(close_tag.is_ascii());
    if len < n {
        return None;
    }
    let mut i = 0;
    while i + n <= len {
        let rel = memchr(b'<', &hay_bytes[i..])?;
        i += rel;
        if i + n > len {
            return None;
        }
        if hay_bytes[i + 1] == b'/' && starts_with_ignore_ascii_case_at(hay_bytes, i, close_tag) {
            let mut k = i + n;
            while k < len && hay_bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < len && hay_bytes[k] == b'>' {
                return Some((i, k + 1));
            }
        }
        i += 1;
    }
    None
}

/// Tokenizes markup into a flat token list. Never fails: every malformed
/// construct either degrades to text or is skipped, and scanning resumes
/// after it.
pub fn tokenize(input: &str, mode: MarkupMode) -> Vec<Token> {
    let mut out = Vec::new();
    let mut i = 0;
    let bytes = input.as_bytes();
    let len = bytes.len();
    // Invariant: we scan by byte, but any slice endpoints must be UTF-8 char
    // boundaries. Slices are cut only at ASCII structural bytes or at
    // positions reached by scanning ASCII-only names, so endpoints stay on
    // boundaries.
    while i < len {
        if bytes[i] != b'<' {
            let start = i;
            while i < len && bytes[i] != b'<' {
                i += 1;
            }
            debug_assert!(input.is_char_boundary(start));
            debug_assert!(input.is_char_boundary(i));
            out.push(Token::Text(input[start..i].to_string()));
            continue;
        }
        // now bytes[i] == b'<'
        if input[i..].starts_with(COMMENT_START) {
            let body_start = i + COMMENT_START.len();
            debug_assert!(input.is_char_boundary(body_start));
            match input[body_start..].find(COMMENT_END) {
                Some(end) => {
                    i = body_start + end + COMMENT_END.len();
                    continue;
                }
                None => break,
            }
        }
        if i + 1 < len && (bytes[i + 1] == b'!' || bytes[i + 1] == b'?') {
            // Doctype, declaration or processing instruction: skip to `>`.
            match memchr(b'>', &bytes[i..]) {
                Some(rel) => {
                    i += rel + 1;
                    continue;
                }
                None => break,
            }
        }
        if i + 1 < len && bytes[i + 1] == b'/' {
            let start = i + 2;
            let mut j = start;
            while j < len && is_name_char(bytes[j]) {
                j += 1;
            }
            debug_assert!(input.is_char_boundary(start));
            debug_assert!(input.is_char_boundary(j));
            let name = input[start..j].to_ascii_lowercase();
            // skip to '>'
            while j < len && bytes[j] != b'>' {
                j += 1;
            }
            if j < len {
                j += 1;
            }
            out.push(Token::EndTag(name));
            i = j;
            continue;
        }
        let start = i + 1;
        let mut j = start;
        while j < len && is_name_char(bytes[j]) {
            j += 1;
        }
        if j == start {
            // No tag name: the '<' is literal text up to the next '<'.
            let text_start = i;
            i += 1;
            while i < len && bytes[i] != b'<' {
                i += 1;
            }
            debug_assert!(input.is_char_boundary(i));
            out.push(Token::Text(input[text_start..i].to_string()));
            continue;
        }
        debug_assert!(input.is_char_boundary(j));
        let name = input[start..j].to_ascii_lowercase();
        let mut k = j;
        let mut attributes: Vec<(String, Option<String>)> = Vec::new();
        let mut self_closing = false;

        let skip_whitespace = |k: &mut usize| {
            while *k < len && bytes[*k].is_ascii_whitespace() {
                *k += 1;
            }
        };

        loop {
            skip_whitespace(&mut k);
            if k >= len {
                break;
            }
            if bytes[k] == b'>' {
                k += 1;
                break;
            }
            if bytes[k] == b'/' {
                if k + 1 < len && bytes[k + 1] == b'>' {
                    self_closing = true;
                    k += 2;
                    break;
                }
                k += 1;
                continue;
            }
            let name_start = k;
            while k < len && is_name_char(bytes[k]) {
                k += 1;
            }
            if name_start == k {
                k += 1;
                continue;
            }
            debug_assert!(input.is_char_boundary(name_start));
            debug_assert!(input.is_char_boundary(k));
            let attribute_name = input[name_start..k].to_ascii_lowercase();

            skip_whitespace(&mut k);
            let value: Option<String>;

            if k < len && bytes[k] == b'=' {
                k += 1;
                skip_whitespace(&mut k);
                if k < len && (bytes[k] == b'"' || bytes[k] == b'\'') {
                    let quote = bytes[k];
                    k += 1;
                    let vstart = k;
                    while k < len && bytes[k] != quote {
                        k += 1;
                    }
                    debug_assert!(input.is_char_boundary(vstart));
                    debug_assert!(input.is_char_boundary(k));
                    value = Some(input[vstart..k].to_string());
                    if k < len {
                        k += 1;
                    }
                } else {
                    let vstart = k;
                    while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                        if bytes[k] == b'/' && k + 1 < len && bytes[k + 1] == b'>' {
                            break;
                        }
                        k += 1;
                    }
                    debug_assert!(input.is_char_boundary(vstart));
                    debug_assert!(input.is_char_boundary(k));
                    value = Some(input[vstart..k].to_string());
                }
            } else {
                value = None;
            }
            attributes.push((attribute_name, value));
        }
        if mode == MarkupMode::Html && is_void_element(&name) {
            self_closing = true;
        }
        let content_start = k;

        let rawtext = mode == MarkupMode::Html && is_rawtext_element(&name) && !self_closing;
        out.push(Token::StartTag {
            name: name.clone(),
            attributes,
            self_closing,
        });

        if rawtext {
            let close_tag = if name == "script" {
                &b"</script"[..]
            } else {
                &b"</style"[..]
            };
            debug_assert!(input.is_char_boundary(content_start));
            match find_rawtext_close_tag(&input[content_start..], close_tag) {
                Some((rel_start, rel_end)) => {
                    let raw = &input[content_start..content_start + rel_start];
                    if !raw.is_empty() {
                        out.push(Token::Text(raw.to_string()));
                    }
                    out.push(Token::EndTag(name));
                    i = content_start + rel_end;
                    continue;
                }
                None => {
                    // Missing close tag: the remainder is rawtext content and
                    // the element is closed implicitly.
                    let raw = &input[content_start..];
                    if !raw.is_empty() {
                        out.push(Token::Text(raw.to_string()));
                    }
                    out.push(Token::EndTag(name));
                    break;
                }
            }
        }

        i = content_start;
    }
    out
}
