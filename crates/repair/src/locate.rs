//! Fuzzy subtree location.
//!
//! Serializes every subtree of the searched tree, normalizes it, and keeps
//! the one closest to the normalized target by edit distance. The walk is
//! exhaustive and pre-order; only a strictly smaller distance displaces the
//! current best, so ties resolve to the first subtree found.

use crate::normalize::normalize;
use markup::{NodeId, Tree, TreePath};

/// Levenshtein distance between the normalized forms of `a` and `b`.
pub fn edit_distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(&normalize(a), &normalize(b))
}

/// Finds the subtree of `tree` whose serialization is nearest to `target`.
/// Returns its path and the winning distance; distance 0 means an exact
/// match up to normalization.
pub fn locate(target: &str, tree: &Tree) -> (TreePath, usize) {
    let goal = normalize(target);
    let mut best_path = TreePath::new();
    let mut best = usize::MAX;
    let mut path = TreePath::new();
    search(tree, tree.root(), &goal, &mut path, &mut best_path, &mut best);
    log::trace!(target: "repair.locate", "nearest subtree at {best_path:?}, distance {best}");
    (best_path, best)
}

fn search(
    tree: &Tree,
    id: NodeId,
    goal: &str,
    path: &mut TreePath,
    best_path: &mut TreePath,
    best: &mut usize,
) {
    let rendered = normalize(&tree.serialize(id));
    let distance = strsim::levenshtein(goal, &rendered);
    if distance < *best {
        *best = distance;
        best_path.clone_from(path);
    }
    for (index, &child) in tree.children(id).iter().enumerate() {
        path.push(index);
        search(tree, child, goal, path, best_path, best);
        path.pop();
    }
}
