//! Extraction rules and their generation.
//!
//! A rule pairs a path inside the extracted fragment with a path in the new
//! page; replaying it grafts the new page's subtree over the fragment piece.
//! Rule sets serialize to JSON as nested index arrays, so a set learned once
//! can be stored and replayed against later pages with the same layout.

use crate::locate::locate;
use markup::{NodeId, Tree, TreePath};
use serde::{Deserialize, Serialize};

/// One correspondence: the fragment piece at `.0` is found at `.1` in the
/// other tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule(pub TreePath, pub TreePath);

impl Rule {
    pub fn fragment_path(&self) -> &[usize] {
        &self.0
    }

    pub fn source_path(&self) -> &[usize] {
        &self.1
    }
}

/// Ordered set of rules for one extracted fragment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> RuleSet {
        RuleSet::default()
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<RuleSet, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> RuleSet {
        RuleSet {
            rules: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// What the recursive carve of a fragment produced: pieces with an exact
/// counterpart in the reference tree, and leaves without one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Partition {
    pub rules: Vec<Rule>,
    pub unmatched: Vec<TreePath>,
}

/// Carves the subtree at `fragment` into maximal pieces that occur exactly in
/// `reference`.
///
/// Each piece whose normalized serialization occurs in `reference` emits one
/// rule (fragment-relative path, reference path) and is not descended into.
/// A piece that only fuzzily matches is split into its children and carved
/// again; leaves that never match exactly are reported in
/// [`Partition::unmatched`].
pub fn generate_rules(tree: &Tree, fragment: NodeId, reference: &Tree) -> Partition {
    let mut partition = Partition::default();
    let mut local = TreePath::new();
    carve(tree, fragment, reference, &mut local, &mut partition);
    log::debug!(
        target: "repair.rules",
        "fragment carved into {} matched pieces, {} unmatched leaves",
        partition.rules.len(),
        partition.unmatched.len()
    );
    partition
}

fn carve(
    tree: &Tree,
    id: NodeId,
    reference: &Tree,
    local: &mut TreePath,
    out: &mut Partition,
) {
    let (path, distance) = locate(&tree.serialize(id), reference);
    if distance == 0 {
        out.rules.push(Rule(local.clone(), path));
        return;
    }
    if tree.is_leaf(id) {
        log::trace!(target: "repair.rules", "leaf at {local:?} has no exact match");
        out.unmatched.push(local.clone());
        return;
    }
    for (index, &child) in tree.children(id).iter().enumerate() {
        local.push(index);
        carve(tree, child, reference, local, out);
        local.pop();
    }
}
