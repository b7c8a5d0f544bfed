//! Parsed pages.
//!
//! The engine works on two views of every document: the full tree, which
//! supplies the content that gets grafted, and an attribute-stripped sibling
//! used for all matching, so churn in `class` and `id` soup never counts as
//! a content change. Both views are structurally isomorphic and share paths.

use std::path::Path;

use markup::{MarkupMode, Tree};

/// One parsed document and its attribute-stripped view.
#[derive(Clone, Debug)]
pub struct Page {
    mode: MarkupMode,
    full: Tree,
    stripped: Tree,
}

impl Page {
    /// Parses `text` as HTML or XML markup.
    pub fn parse(text: &str, mode: MarkupMode) -> Page {
        let full = markup::parse(text, mode);
        let stripped = full.strip_attributes();
        Page { mode, full, stripped }
    }

    /// Reads and parses a file. An unreadable file is logged and treated as
    /// empty content rather than failing the caller.
    pub fn from_file(path: impl AsRef<Path>, mode: MarkupMode) -> Page {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                log::warn!(
                    target: "repair.page",
                    "reading {} failed ({err}), treating as empty",
                    path.display()
                );
                String::new()
            }
        };
        Page::parse(&text, mode)
    }

    pub fn mode(&self) -> MarkupMode {
        self.mode
    }

    pub fn full(&self) -> &Tree {
        &self.full
    }

    pub fn stripped(&self) -> &Tree {
        &self.stripped
    }
}
