//! Extraction repair for markup page pairs.
//!
//! When a page's layout shifts, index paths recorded against the old layout
//! stop extracting the right content. This crate learns where a fragment's
//! pieces moved: the fragment is carved into exactly-matching pieces
//! ([`rules`]), ambiguous pieces are pinned to their true occurrence by
//! neighborhood fingerprints and a minimum-cost assignment
//! ([`disambiguate`]), and the resulting rule set is replayed by grafting
//! the new page's subtrees over the fragment ([`engine`]). Content equality
//! throughout is taken over whitespace-free serializations ([`normalize`]),
//! and occurrence matching runs on layout-compressed trees ([`compress`]).
pub mod compress;
pub mod disambiguate;
pub mod engine;
pub mod error;
pub mod locate;
pub mod normalize;
pub mod page;
pub mod rules;

pub use compress::{compress, resolve_terminal, Compressed};
pub use disambiguate::{
    cosine_cost, disambiguate, match_occurrence, min_cost_assignment, nearest_leaves, occurrences,
    Fingerprint,
};
pub use engine::{repair, repair_many, Repair, RepairOptions, Unresolved};
pub use error::RepairError;
pub use locate::{edit_distance, locate};
pub use normalize::normalize;
pub use page::Page;
pub use rules::{generate_rules, Partition, Rule, RuleSet};
