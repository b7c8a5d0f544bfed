//! Occurrence disambiguation.
//!
//! A piece of content can occur many times in a page (labels, menu entries,
//! boilerplate). To decide which new-page occurrence corresponds to a given
//! old-page node, every occurrence on both sides is fingerprinted by its k
//! nearest leaves and the two occurrence sets are matched one-to-one by
//! minimum-cost assignment, cost being negated cosine similarity of the
//! fingerprints. Both trees are compressed first so wrapper chains cannot
//! skew the leaf distances; the winning match is mapped back to the
//! uncompressed new tree at the end.

use std::collections::{BTreeSet, HashSet, VecDeque};

use pathfinding::kuhn_munkres::{kuhn_munkres_min, Weights};

use crate::compress::{compress, resolve_terminal, Compressed};
use crate::error::RepairError;
use crate::normalize::normalize;
use markup::{NodeId, Tree, TreePath};

/// Structural surroundings of a node: its nearest leaves and their
/// normalized serializations.
#[derive(Clone, Debug)]
pub struct Fingerprint {
    leaves: Vec<(NodeId, usize)>,
    keys: BTreeSet<String>,
}

impl Fingerprint {
    /// Fingerprint of `node` in `tree`, built from its `k` nearest leaves.
    pub fn of(tree: &Tree, node: NodeId, k: usize) -> Fingerprint {
        let leaves = nearest_leaves(tree, node, k);
        let keys = leaves
            .iter()
            .map(|&(leaf, _)| normalize(&tree.serialize(leaf)))
            .collect();
        Fingerprint { leaves, keys }
    }

    pub fn leaves(&self) -> &[(NodeId, usize)] {
        &self.leaves
    }

    pub fn keys(&self) -> &BTreeSet<String> {
        &self.keys
    }
}

/// Breadth-first search outward from `node` over parent and child edges,
/// collecting the first `k` leaves encountered with their distances. The
/// node itself is excluded even when it is a leaf.
pub fn nearest_leaves(tree: &Tree, node: NodeId, k: usize) -> Vec<(NodeId, usize)> {
    let mut found = Vec::new();
    if k == 0 {
        return found;
    }
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    seen.insert(node);
    queue.push_back((node, 0usize));
    while let Some((current, distance)) = queue.pop_front() {
        let parent = tree.parent(current);
        for neighbor in parent.into_iter().chain(tree.children(current).iter().copied()) {
            if !seen.insert(neighbor) {
                continue;
            }
            if tree.is_leaf(neighbor) {
                found.push((neighbor, distance + 1));
                if found.len() == k {
                    return found;
                }
            }
            queue.push_back((neighbor, distance + 1));
        }
    }
    found
}

/// Pairing cost for two fingerprints: negated cosine similarity of their 0/1
/// leaf-content indicator vectors. Identical surroundings cost -1, disjoint
/// or empty surroundings cost 0.
pub fn cosine_cost(a: &Fingerprint, b: &Fingerprint) -> f64 {
    let mut dot: f64 = 0.0;
    let mut norm_a: f64 = 0.0;
    let mut norm_b: f64 = 0.0;
    for key in a.keys.union(&b.keys) {
        let in_a = if a.keys.contains(key) { 1.0 } else { 0.0 };
        let in_b = if b.keys.contains(key) { 1.0 } else { 0.0 };
        dot += in_a * in_b;
        norm_a += in_a * in_a;
        norm_b += in_b * in_b;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    -(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

struct CostGrid {
    size: usize,
    cells: Vec<i64>,
}

impl Weights<i64> for CostGrid {
    fn rows(&self) -> usize {
        self.size
    }

    fn columns(&self) -> usize {
        self.size
    }

    fn at(&self, row: usize, col: usize) -> i64 {
        self.cells[row * self.size + col]
    }

    fn neg(&self) -> Self {
        CostGrid {
            size: self.size,
            cells: self.cells.iter().map(|&cell| -cell).collect(),
        }
    }
}

/// Minimum-cost one-to-one assignment of rows to columns.
///
/// Costs are expected non-positive (negated similarities). The matrix is
/// padded square in fixed-point millis; padding cells cost 1, strictly worse
/// than any real pair, so a row only comes back `None` when the real columns
/// are outnumbered. Rows may be ragged; absent cells count as padding.
pub fn min_cost_assignment(costs: &[Vec<f64>]) -> Vec<Option<usize>> {
    let rows = costs.len();
    let cols = costs.iter().map(Vec::len).max().unwrap_or(0);
    if rows == 0 {
        return Vec::new();
    }
    if cols == 0 {
        return vec![None; rows];
    }
    let size = rows.max(cols);
    let mut cells = vec![1i64; size * size];
    for (row, row_costs) in costs.iter().enumerate() {
        for (col, &cost) in row_costs.iter().enumerate() {
            cells[row * size + col] = (cost * 1000.0).round() as i64;
        }
    }
    let grid = CostGrid { size, cells };
    let (_, assignment) = kuhn_munkres_min(&grid);
    assignment
        .into_iter()
        .take(rows)
        .enumerate()
        .map(|(row, col)| (col < costs[row].len()).then_some(col))
        .collect()
}

/// All nodes of `tree` whose normalized serialization equals that of
/// `content`, in document order.
pub fn occurrences(tree: &Tree, content: &str) -> Vec<NodeId> {
    fn walk(tree: &Tree, id: NodeId, key: &str, found: &mut Vec<NodeId>) {
        if normalize(&tree.serialize(id)) == key {
            found.push(id);
        }
        for &child in tree.children(id) {
            walk(tree, child, key, found);
        }
    }
    let key = normalize(content);
    let mut found = Vec::new();
    walk(tree, tree.root(), &key, &mut found);
    found
}

/// Picks the occurrence of `target`'s content in `new_tree` whose
/// surroundings best match `target`'s surroundings in `old_tree`.
pub fn match_occurrence(
    old_tree: &Tree,
    target: NodeId,
    new_tree: &Tree,
    k: usize,
) -> Result<NodeId, RepairError> {
    let key = normalize(&old_tree.serialize(target));
    let old_occurrences = occurrences(old_tree, &key);
    let new_occurrences = occurrences(new_tree, &key);
    if new_occurrences.is_empty() {
        return Err(RepairError::VanishedContent {
            path: old_tree.path_of(target),
        });
    }
    let row = match old_occurrences.iter().position(|&id| id == target) {
        Some(row) => row,
        None => unreachable!("a node always matches its own serialization"),
    };
    let old_prints: Vec<Fingerprint> = old_occurrences
        .iter()
        .map(|&id| Fingerprint::of(old_tree, id, k))
        .collect();
    let new_prints: Vec<Fingerprint> = new_occurrences
        .iter()
        .map(|&id| Fingerprint::of(new_tree, id, k))
        .collect();
    let costs: Vec<Vec<f64>> = old_prints
        .iter()
        .map(|a| new_prints.iter().map(|b| cosine_cost(a, b)).collect())
        .collect();
    log::debug!(
        target: "repair.assign",
        "assigning {} old occurrences to {} new ones",
        old_occurrences.len(),
        new_occurrences.len()
    );
    match min_cost_assignment(&costs).get(row).copied().flatten() {
        Some(column) => Ok(new_occurrences[column]),
        None => Err(RepairError::Unassigned {
            path: old_tree.path_of(target),
        }),
    }
}

/// Finds where the content of `target`, a node of `old_tree`, now lives in
/// `new_tree` and returns its path there.
///
/// The matching itself runs on compressed trees; `target` is first resolved
/// down its sole-child chain to the terminal node that survives compression,
/// and the winning compressed occurrence is mapped back out through the
/// compression correspondence of the new tree.
pub fn disambiguate(
    old_tree: &Tree,
    target: NodeId,
    new_tree: &Tree,
    k: usize,
) -> Result<TreePath, RepairError> {
    let old_compressed = compress(old_tree);
    let new_compressed = compress(new_tree);
    disambiguate_compressed(old_tree, &old_compressed, target, new_tree, &new_compressed, k)
}

/// [`disambiguate`] against compressions the caller already holds, so a
/// batch of targets shares the compression work.
pub(crate) fn disambiguate_compressed(
    old_tree: &Tree,
    old_compressed: &Compressed,
    target: NodeId,
    new_tree: &Tree,
    new_compressed: &Compressed,
    k: usize,
) -> Result<TreePath, RepairError> {
    let terminal = resolve_terminal(old_tree, target);
    let image = match old_compressed.image_of(terminal) {
        Some(image) => image,
        None => unreachable!("terminal nodes keep an image through compression"),
    };
    match match_occurrence(&old_compressed.tree, image, &new_compressed.tree, k) {
        Ok(matched) => Ok(new_tree.path_of(new_compressed.source_of(matched))),
        Err(RepairError::VanishedContent { .. }) => Err(RepairError::VanishedContent {
            path: old_tree.path_of(terminal),
        }),
        Err(RepairError::Unassigned { .. }) => Err(RepairError::Unassigned {
            path: old_tree.path_of(terminal),
        }),
        Err(other) => Err(other),
    }
}
