//! Element tree over a contiguous arena.
//!
//! Children are elements only; character data lives on the elements
//! themselves (`text` before the first child, `tail` after the close tag), so
//! index paths, leaf checks and child counts all operate on element structure
//! alone. Nodes are addressed by `NodeId`, an index into the owning tree's
//! arena; ids are meaningless across trees.

pub type NodeIndex = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub NodeIndex);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Child-index path from a tree's root down to a node. Only valid for the
/// exact tree snapshot it was produced from.
pub type TreePath = Vec<usize>;

#[derive(Clone, Debug)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, Option<String>)>,
    /// Character data between the start tag and the first child.
    pub text: String,
    /// Character data between this element's close tag and the next sibling.
    pub tail: String,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
}

impl Element {
    /// Element with no text, tail, children or parent. Link it into a tree
    /// with [`Tree::with_root`] or [`Tree::push_child`].
    pub fn new(tag: String, attributes: Vec<(String, Option<String>)>) -> Element {
        Element {
            tag,
            attributes,
            text: String::new(),
            tail: String::new(),
            children: Vec::new(),
            parent: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Tree {
    nodes: Vec<Element>,
    root: NodeId,
}

impl Tree {
    pub fn with_root(root: Element) -> Tree {
        Tree {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> &Element {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Element {
        &mut self.nodes[id.index()]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id.index()].children.is_empty()
    }

    /// Whether `id` addresses a node of this tree's arena. Detached nodes
    /// (displaced by `replace_at`) still count; callers that need
    /// reachability should resolve a path instead.
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Number of nodes reachable from the root.
    pub fn node_count(&self) -> usize {
        fn count(tree: &Tree, id: NodeId, n: &mut usize) {
            *n += 1;
            for &child in tree.children(id) {
                count(tree, child, n);
            }
        }
        let mut n = 0;
        count(self, self.root, &mut n);
        n
    }

    /// Appends `element` as the last child of `parent` and returns its id.
    pub fn push_child(&mut self, parent: NodeId, mut element: Element) -> NodeId {
        let id = NodeId(self.nodes.len() as NodeIndex);
        element.parent = Some(parent);
        self.nodes.push(element);
        self.nodes[parent.index()].children.push(id);
        id
    }

    pub(crate) fn set_root(&mut self, id: NodeId) {
        self.nodes[id.index()].parent = None;
        self.root = id;
    }

    /// Path from the root to `id`, recovered by walking parent links upward.
    pub fn path_of(&self, id: NodeId) -> TreePath {
        let mut path = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            let index = match self.children(parent).iter().position(|&c| c == current) {
                Some(index) => index,
                None => unreachable!("child link missing from parent"),
            };
            path.push(index);
            current = parent;
        }
        path.reverse();
        path
    }

    /// Resolves a child-index path from the root. `None` when any index is
    /// out of range.
    pub fn node_at(&self, path: &[usize]) -> Option<NodeId> {
        let mut current = self.root;
        for &index in path {
            current = *self.children(current).get(index)?;
        }
        Some(current)
    }

    /// Renders `id` and its subtree back to markup text. The rendering is
    /// deterministic: attributes keep parse order, `"` in attribute values is
    /// written as `&quot;`, an element with no text and no children renders
    /// self-closed, and the node's own tail text follows its close tag.
    pub fn serialize(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(id, &mut out);
        out
    }

    fn write_markup(&self, id: NodeId, out: &mut String) {
        let element = self.get(id);
        out.push('<');
        out.push_str(&element.tag);
        for (name, value) in &element.attributes {
            out.push(' ');
            out.push_str(name);
            if let Some(value) = value {
                out.push_str("=\"");
                for ch in value.chars() {
                    if ch == '"' {
                        out.push_str("&quot;");
                    } else {
                        out.push(ch);
                    }
                }
                out.push('"');
            }
        }
        if element.text.is_empty() && element.children.is_empty() {
            out.push_str("/>");
        } else {
            out.push('>');
            out.push_str(&element.text);
            for &child in &element.children {
                self.write_markup(child, out);
            }
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
        out.push_str(&element.tail);
    }

    /// Deep-copies the subtree at `id` into a fresh standalone tree.
    pub fn extract(&self, id: NodeId) -> Tree {
        let mut nodes = Vec::new();
        let root = copy_subtree(&mut nodes, self, id, None);
        Tree { nodes, root }
    }

    /// Copy of this tree with every attribute list cleared. The result is
    /// structurally isomorphic to `self`, so paths resolve identically in
    /// both.
    pub fn strip_attributes(&self) -> Tree {
        let mut stripped = self.clone();
        for element in &mut stripped.nodes {
            element.attributes.clear();
        }
        stripped
    }

    /// Replaces the node at `path` with a deep copy of `donor_node` from
    /// `donor`, tail included. An empty path replaces the root. Returns the
    /// id of the grafted copy, or `None` when `path` does not resolve. The
    /// displaced subtree stays in the arena; reachability from the root is
    /// what defines the document.
    pub fn replace_at(&mut self, path: &[usize], donor: &Tree, donor_node: NodeId) -> Option<NodeId> {
        if path.is_empty() {
            let grafted = copy_subtree(&mut self.nodes, donor, donor_node, None);
            self.root = grafted;
            return Some(grafted);
        }
        let (last, prefix) = path.split_last()?;
        let parent = self.node_at(prefix)?;
        if *last >= self.children(parent).len() {
            return None;
        }
        let grafted = copy_subtree(&mut self.nodes, donor, donor_node, Some(parent));
        self.nodes[parent.index()].children[*last] = grafted;
        Some(grafted)
    }

    /// Indented tag outline for logs and test failure messages, capped at
    /// `max_nodes` entries.
    pub fn outline(&self, max_nodes: usize) -> String {
        fn walk(tree: &Tree, id: NodeId, depth: usize, cap: usize, seen: &mut usize, out: &mut String) {
            if *seen >= cap {
                return;
            }
            *seen += 1;
            for _ in 0..depth {
                out.push_str("  ");
            }
            let element = tree.get(id);
            out.push_str(&element.tag);
            let text = element.text.trim();
            if !text.is_empty() {
                out.push_str(" \"");
                for (n, ch) in text.chars().enumerate() {
                    if n == 24 {
                        out.push_str("..");
                        break;
                    }
                    out.push(ch);
                }
                out.push('"');
            }
            out.push('\n');
            for &child in tree.children(id) {
                walk(tree, child, depth + 1, cap, seen, out);
            }
        }
        let mut out = String::new();
        let mut seen = 0;
        walk(self, self.root, 0, max_nodes, &mut seen, &mut out);
        if seen >= max_nodes {
            out.push_str("..\n");
        }
        out
    }
}

fn copy_subtree(
    into: &mut Vec<Element>,
    source: &Tree,
    id: NodeId,
    parent: Option<NodeId>,
) -> NodeId {
    let slot = NodeId(into.len() as NodeIndex);
    let mut element = source.get(id).clone();
    element.parent = parent;
    element.children = Vec::new();
    into.push(element);
    for &child in source.children(id) {
        let copied = copy_subtree(into, source, child, Some(slot));
        into[slot.index()].children.push(copied);
    }
    slot
}
