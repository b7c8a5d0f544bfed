//! Two-phase repair engine.
//!
//! Learning derives a rule set for an extracted fragment: the fragment is
//! carved into exactly-matching pieces, each piece's true occurrence in the
//! new page is disambiguated, and the resulting paths are recorded. Replay
//! applies a rule set, freshly learned or stored from an earlier run, by
//! grafting the new page's subtrees over the fragment pieces.
//!
//! Failures are scoped to pieces: a piece that cannot be resolved is
//! reported in [`Repair::unresolved`] and keeps its old content, while the
//! rest of the fragment is still repaired.

use crate::compress::{compress, Compressed};
use crate::disambiguate::disambiguate_compressed;
use crate::error::RepairError;
use crate::page::Page;
use crate::rules::{generate_rules, Rule, RuleSet};
use markup::{NodeId, Tree, TreePath};

/// Tunables for the learning phase.
#[derive(Clone, Copy, Debug)]
pub struct RepairOptions {
    /// Leaves per fingerprint during occurrence disambiguation.
    pub nearest_leaves: usize,
}

impl Default for RepairOptions {
    fn default() -> RepairOptions {
        RepairOptions { nearest_leaves: 2 }
    }
}

/// A fragment piece the engine could not resolve, and why.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unresolved {
    pub fragment_path: TreePath,
    pub error: RepairError,
}

/// Outcome of one repair: the rules that were learned or applied, the
/// reconstructed fragment, and the pieces left unresolved.
#[derive(Clone, Debug)]
pub struct Repair {
    pub rules: RuleSet,
    pub fragment: Tree,
    pub unresolved: Vec<Unresolved>,
}

/// Repairs the extraction of `fragment`, a node of `old`'s tree.
///
/// With `rules` given they are replayed against `new` as-is, which is the
/// cheap path for pages sharing a layout already learned from. Without,
/// a fresh rule set is learned from the page pair and then replayed.
pub fn repair(
    old: &Page,
    new: &Page,
    fragment: NodeId,
    rules: Option<&RuleSet>,
    options: &RepairOptions,
) -> Result<Repair, RepairError> {
    match rules {
        Some(rules) => replay(old, new, fragment, rules.clone()),
        None => {
            let old_compressed = compress(old.full());
            let new_compressed = compress(new.full());
            learn(old, new, &old_compressed, &new_compressed, fragment, options)
        }
    }
}

/// Learns and replays rules for several fragments of the same page pair,
/// sharing the page compressions across them.
pub fn repair_many(
    old: &Page,
    new: &Page,
    fragments: &[NodeId],
    options: &RepairOptions,
) -> Vec<Result<Repair, RepairError>> {
    let old_compressed = compress(old.full());
    let new_compressed = compress(new.full());
    fragments
        .iter()
        .map(|&fragment| learn(old, new, &old_compressed, &new_compressed, fragment, options))
        .collect()
}

fn learn(
    old: &Page,
    new: &Page,
    old_compressed: &Compressed,
    new_compressed: &Compressed,
    fragment: NodeId,
    options: &RepairOptions,
) -> Result<Repair, RepairError> {
    if !old.full().contains(fragment) {
        return Err(RepairError::FragmentDetached);
    }
    let prefix = old.full().path_of(fragment);
    let stripped_fragment = match old.stripped().node_at(&prefix) {
        Some(id) => id,
        None => unreachable!("stripped view is isomorphic to the full tree"),
    };
    let partition = generate_rules(old.stripped(), stripped_fragment, new.stripped());
    let mut unresolved: Vec<Unresolved> = partition
        .unmatched
        .into_iter()
        .map(|path| Unresolved {
            fragment_path: path.clone(),
            error: RepairError::NoExactMatch { path },
        })
        .collect();
    let mut resolved = RuleSet::new();
    for Rule(local, _) in partition.rules {
        let absolute: TreePath = prefix.iter().chain(local.iter()).copied().collect();
        let piece = match old.full().node_at(&absolute) {
            Some(piece) => piece,
            None => unreachable!("carved paths stay inside the fragment"),
        };
        match disambiguate_compressed(
            old.full(),
            old_compressed,
            piece,
            new.full(),
            new_compressed,
            options.nearest_leaves,
        ) {
            Ok(source) => resolved.push(Rule(local, source)),
            Err(error) => {
                log::warn!(target: "repair.engine", "piece at {local:?} unresolved: {error}");
                unresolved.push(Unresolved { fragment_path: local, error });
            }
        }
    }
    log::debug!(
        target: "repair.engine",
        "fragment at {prefix:?}: {} rules learned, {} pieces unresolved",
        resolved.len(),
        unresolved.len()
    );
    let mut outcome = replay(old, new, fragment, resolved)?;
    unresolved.append(&mut outcome.unresolved);
    outcome.unresolved = unresolved;
    Ok(outcome)
}

fn replay(old: &Page, new: &Page, fragment: NodeId, rules: RuleSet) -> Result<Repair, RepairError> {
    if !old.full().contains(fragment) {
        return Err(RepairError::FragmentDetached);
    }
    let mut reconstructed = old.full().extract(fragment);
    let mut unresolved = Vec::new();
    for Rule(local, source) in &rules {
        match new.full().node_at(source) {
            Some(donor) => {
                if reconstructed.replace_at(local, new.full(), donor).is_none() {
                    log::warn!(
                        target: "repair.engine",
                        "rule path {local:?} does not resolve in the fragment"
                    );
                    unresolved.push(Unresolved {
                        fragment_path: local.clone(),
                        error: RepairError::DanglingRule { path: local.clone() },
                    });
                }
            }
            None => {
                log::warn!(
                    target: "repair.engine",
                    "rule target {source:?} missing from the new page"
                );
                unresolved.push(Unresolved {
                    fragment_path: local.clone(),
                    error: RepairError::MissingTarget { path: source.clone() },
                });
            }
        }
    }
    Ok(Repair {
        rules,
        fragment: reconstructed,
        unresolved,
    })
}
