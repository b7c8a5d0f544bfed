//! Tree compression.
//!
//! Rebuilds a tree bottom-up, splicing out every node that would be left
//! with exactly one child, so chains of lone wrappers collapse into their
//! terminal node. Occurrence matching runs on compressed trees to keep
//! wrapper churn out of the comparison; the kept correspondence maps
//! translate matches back to the original tree.

use markup::{Element, NodeId, Tree};

/// A compressed tree plus the correspondence to the tree it came from.
///
/// Only terminal nodes of the original (leaves and nodes with two or more
/// children) survive compression, so only they have an image. Resolve
/// chain-interior nodes with [`resolve_terminal`] first.
#[derive(Clone, Debug)]
pub struct Compressed {
    pub tree: Tree,
    image: Vec<Option<NodeId>>,
    source: Vec<NodeId>,
}

impl Compressed {
    /// Compressed counterpart of an original terminal node.
    pub fn image_of(&self, original: NodeId) -> Option<NodeId> {
        self.image.get(original.index()).copied().flatten()
    }

    /// Original node a compressed node was built from.
    pub fn source_of(&self, compressed: NodeId) -> NodeId {
        self.source[compressed.index()]
    }
}

/// Compresses `tree`. The result contains no node with exactly one child;
/// a root that starts a sole-child chain hands the root over to the chain's
/// terminal node.
pub fn compress(tree: &Tree) -> Compressed {
    let plan = plan_node(tree, tree.root());
    let mut compressed = Compressed {
        tree: Tree::with_root(bare_copy(tree, plan.source)),
        image: Vec::new(),
        source: Vec::new(),
    };
    let root = compressed.tree.root();
    record(&mut compressed, plan.source, root);
    for child in &plan.children {
        materialize(tree, child, &mut compressed, root);
    }
    log::trace!(
        target: "repair.compress",
        "{} nodes compressed to {}",
        tree.node_count(),
        compressed.tree.node_count()
    );
    compressed
}

/// Follows sole-child links from `id` down to the first node that is either
/// a leaf or has several children. Identity for terminal nodes.
pub fn resolve_terminal(tree: &Tree, id: NodeId) -> NodeId {
    let mut current = id;
    while let [only] = tree.children(current) {
        current = *only;
    }
    current
}

struct Plan {
    source: NodeId,
    children: Vec<Plan>,
}

fn plan_node(tree: &Tree, id: NodeId) -> Plan {
    let mut children: Vec<Plan> = tree
        .children(id)
        .iter()
        .map(|&child| plan_node(tree, child))
        .collect();
    if children.len() == 1 {
        return children.remove(0);
    }
    Plan { source: id, children }
}

fn materialize(tree: &Tree, plan: &Plan, compressed: &mut Compressed, parent: NodeId) {
    let id = compressed.tree.push_child(parent, bare_copy(tree, plan.source));
    record(compressed, plan.source, id);
    for child in &plan.children {
        materialize(tree, child, compressed, id);
    }
}

fn record(compressed: &mut Compressed, original: NodeId, image: NodeId) {
    let index = original.index();
    if compressed.image.len() <= index {
        compressed.image.resize(index + 1, None);
    }
    compressed.image[index] = Some(image);
    debug_assert_eq!(compressed.source.len(), image.index());
    compressed.source.push(original);
}

/// Clone of a node's own content without its links.
fn bare_copy(tree: &Tree, id: NodeId) -> Element {
    let original = tree.get(id);
    let mut element = Element::new(original.tag.clone(), original.attributes.clone());
    element.text = original.text.clone();
    element.tail = original.tail.clone();
    element
}
