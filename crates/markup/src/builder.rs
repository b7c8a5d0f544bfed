//! Token stream -> element tree.
//!
//! The builder keeps an open-element stack over the tree's arena. Recovery
//! rules: an end tag with no matching open element is dropped; an end tag
//! matching a non-topmost open element closes everything above it. Character
//! data never becomes a node of its own; it attaches to the enclosing
//! element's `text` (before any child) or to the preceding sibling's `tail`,
//! so child indices count elements exactly.
use crate::tokenizer::tokenize;
use crate::tree::{Element, NodeId, Tree};
use crate::types::{MarkupMode, Token};

/// Parses markup into a tree. Never fails; malformed input produces a
/// best-effort structure.
///
/// The builder opens a synthetic document root (`html` in html mode,
/// `document` in xml mode) and unwraps it when it ends up with exactly one
/// child element and no leading text, so a single-rooted document keeps its
/// natural root while fragment soup still parses. Empty input yields the bare
/// synthetic root.
pub fn parse(input: &str, mode: MarkupMode) -> Tree {
    build_tree(tokenize(input, mode), mode)
}

pub fn build_tree(tokens: Vec<Token>, mode: MarkupMode) -> Tree {
    let root_tag = match mode {
        MarkupMode::Html => "html",
        MarkupMode::Xml => "document",
    };
    let mut tree = Tree::with_root(Element::new(root_tag.to_string(), Vec::new()));
    let root = tree.root();
    let mut open_elements: Vec<NodeId> = vec![root];

    for token in tokens {
        match token {
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let parent = *open_elements.last().unwrap_or(&root);
                let new_id = tree.push_child(parent, Element::new(name, attributes));
                if !self_closing {
                    open_elements.push(new_id);
                }
            }
            Token::EndTag(name) => {
                // Index 0 is the synthetic root; it never closes.
                match open_elements[1..]
                    .iter()
                    .rposition(|&id| tree.get(id).tag == name)
                {
                    Some(pos) => {
                        open_elements.truncate(pos + 1);
                    }
                    None => {
                        log::trace!(target: "markup.builder", "dropping stray end tag </{name}>");
                    }
                }
            }
            Token::Text(text) => {
                let parent = *open_elements.last().unwrap_or(&root);
                attach_text(&mut tree, parent, &text);
            }
        }
    }

    // Unwrap the synthetic root when the document supplied its own single
    // root element. Leading stray text keeps the wrapper, since text cannot
    // attach above a root.
    if tree.children(root).len() == 1 && tree.get(root).text.is_empty() {
        let real_root = tree.children(root)[0];
        tree.set_root(real_root);
    }
    tree
}

fn attach_text(tree: &mut Tree, parent: NodeId, text: &str) {
    match tree.children(parent).last().copied() {
        Some(last_child) => tree.node_mut(last_child).tail.push_str(text),
        None => tree.node_mut(parent).text.push_str(text),
    }
}
