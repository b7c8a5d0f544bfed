//! End-to-end repairs over whole page pairs: learning, replay from stored
//! rules, ambiguity resolution and partial failures.

use markup::MarkupMode;
use repair::{
    generate_rules, repair, repair_many, Page, Repair, RepairError, RepairOptions, Rule, RuleSet,
    Unresolved,
};

const OLD_PAGE: &str = concat!(
    "<html>\n",
    "    <body>\n",
    "        <div>\n",
    "            <p>This should not be extracted</p>\n",
    "        </div>\n",
    "        <div>\n",
    "            <div>\n",
    "                <div>\n",
    "                    <div>\n",
    "                        <p>Username</p>\n",
    "                        <p>email</p>\n",
    "                        <p>Captcha1</p>\n",
    "                        <p>Captcha2</p>\n",
    "                    </div>\n",
    "                </div>\n",
    "            </div>\n",
    "        </div>\n",
    "    </body>\n",
    "</html>",
);

// The form kept its content but moved up: the old page buried it four
// levels deep, the new page hosts it directly under the body, and the
// captcha rows are gone.
const NEW_PAGE: &str = concat!(
    "<html>\n",
    "    <body>\n",
    "        <div>\n",
    "            <p>Username</p>\n",
    "            <p>email</p>\n",
    "        </div>\n",
    "    </body>\n",
    "</html>",
);

const OLD_FRAGMENT: &str = concat!(
    "<div>\n",
    "                    <div>\n",
    "                        <p>Username</p>\n",
    "                        <p>email</p>\n",
    "                        <p>Captcha1</p>\n",
    "                        <p>Captcha2</p>\n",
    "                    </div>\n",
    "                </div>\n",
    "            ",
);

// Grafted rows carry the new page's indentation, kept rows the old one's.
const REPAIRED_FRAGMENT: &str = concat!(
    "<div>\n",
    "                    <div>\n",
    "                        <p>Username</p>\n",
    "            <p>email</p>\n",
    "        <p>Captcha1</p>\n",
    "                        <p>Captcha2</p>\n",
    "                    </div>\n",
    "                </div>\n",
    "            ",
);

const STORED_RULES: &str = "[[[0,0],[0,0,0]],[[0,1],[0,0,1]]]";

fn page(src: &str) -> Page {
    Page::parse(src, MarkupMode::Html)
}

fn rendered(outcome: &Repair) -> String {
    outcome.fragment.serialize(outcome.fragment.root())
}

#[test]
fn extraction_preserves_source_formatting() {
    let old = page(OLD_PAGE);
    let fragment = old.full().node_at(&[0, 1, 0, 0]).unwrap();
    let extracted = old.full().extract(fragment);
    assert_eq!(extracted.serialize(extracted.root()), OLD_FRAGMENT);
}

// A fragment that is literally a subtree of the searched tree carves into a
// single root rule, and replaying that rule with the same page as source
// hands the fragment back byte for byte.
#[test]
fn rules_from_a_literal_subtree_replay_byte_for_byte() {
    let old = page(OLD_PAGE);
    let fragment = old.full().node_at(&[0, 1, 0, 0]).unwrap();
    let partition = generate_rules(old.full(), fragment, old.full());
    assert_eq!(partition.rules, vec![Rule(vec![], vec![0, 1, 0, 0])]);
    assert!(partition.unmatched.is_empty());
    let rules: RuleSet = partition.rules.into_iter().collect();
    let outcome = repair(&old, &old, fragment, Some(&rules), &RepairOptions::default()).unwrap();
    assert!(outcome.unresolved.is_empty());
    assert_eq!(rendered(&outcome), OLD_FRAGMENT);
}

// Learning on a fragment whose root starts a wrapper chain pins the piece to
// the chain's terminal node, so the graft drops the wrapper even against an
// unchanged page. Occurrence matching runs on compressed trees and only the
// terminal survives compression.
#[test]
fn learning_on_a_chain_rooted_fragment_grafts_the_chain_terminal() {
    let old = page(OLD_PAGE);
    let fragment = old.full().node_at(&[0, 1, 0, 0]).unwrap();
    let outcome = repair(&old, &old, fragment, None, &RepairOptions::default()).unwrap();
    let rules: Vec<Rule> = outcome.rules.iter().cloned().collect();
    assert_eq!(rules, vec![Rule(vec![], vec![0, 1, 0, 0, 0])]);
    assert!(outcome.unresolved.is_empty());
    assert_eq!(
        rendered(&outcome),
        concat!(
            "<div>\n",
            "                        <p>Username</p>\n",
            "                        <p>email</p>\n",
            "                        <p>Captcha1</p>\n",
            "                        <p>Captcha2</p>\n",
            "                    </div>\n",
            "                ",
        )
    );
}

#[test]
fn learning_repairs_the_relocated_fragment() {
    let old = page(OLD_PAGE);
    let new = page(NEW_PAGE);
    let fragment = old.full().node_at(&[0, 1, 0, 0]).unwrap();
    let outcome = repair(&old, &new, fragment, None, &RepairOptions::default()).unwrap();
    let rules: Vec<Rule> = outcome.rules.iter().cloned().collect();
    assert_eq!(
        rules,
        vec![Rule(vec![0, 0], vec![0, 0, 0]), Rule(vec![0, 1], vec![0, 0, 1])]
    );
    assert_eq!(
        outcome.unresolved,
        vec![
            Unresolved {
                fragment_path: vec![0, 2],
                error: RepairError::NoExactMatch { path: vec![0, 2] },
            },
            Unresolved {
                fragment_path: vec![0, 3],
                error: RepairError::NoExactMatch { path: vec![0, 3] },
            },
        ]
    );
    assert_eq!(rendered(&outcome), REPAIRED_FRAGMENT);
}

#[test]
fn stored_rules_replay_without_relearning() {
    let old = page(OLD_PAGE);
    let new = page(NEW_PAGE);
    let fragment = old.full().node_at(&[0, 1, 0, 0]).unwrap();
    let learned = repair(&old, &new, fragment, None, &RepairOptions::default()).unwrap();
    assert_eq!(learned.rules.to_json().unwrap(), STORED_RULES);

    let stored = RuleSet::from_json(STORED_RULES).unwrap();
    let replayed = repair(&old, &new, fragment, Some(&stored), &RepairOptions::default()).unwrap();
    assert_eq!(rendered(&replayed), REPAIRED_FRAGMENT);
    assert!(replayed.unresolved.is_empty());
}

#[test]
fn replay_is_deterministic() {
    let old = page(OLD_PAGE);
    let new = page(NEW_PAGE);
    let fragment = old.full().node_at(&[0, 1, 0, 0]).unwrap();
    let rules = RuleSet::from_json(STORED_RULES).unwrap();
    let options = RepairOptions::default();
    let first = repair(&old, &new, fragment, Some(&rules), &options).unwrap();
    let second = repair(&old, &new, fragment, Some(&rules), &options).unwrap();
    assert_eq!(rendered(&first), rendered(&second));
}

#[test]
fn stale_rules_leave_their_pieces_untouched() {
    let old = page(OLD_PAGE);
    let new = page(NEW_PAGE);
    let fragment = old.full().node_at(&[0, 1, 0, 0]).unwrap();
    let stale: RuleSet = [Rule(vec![0, 0], vec![9, 9])].into_iter().collect();
    let outcome = repair(&old, &new, fragment, Some(&stale), &RepairOptions::default()).unwrap();
    assert_eq!(
        outcome.unresolved,
        vec![Unresolved {
            fragment_path: vec![0, 0],
            error: RepairError::MissingTarget { path: vec![9, 9] },
        }]
    );
    assert_eq!(rendered(&outcome), OLD_FRAGMENT);
}

#[test]
fn repair_many_mirrors_the_single_fragment_repair() {
    let old = page(OLD_PAGE);
    let new = page(NEW_PAGE);
    let fragment = old.full().node_at(&[0, 1, 0, 0]).unwrap();
    let outcomes = repair_many(&old, &new, &[fragment], &RepairOptions::default());
    assert_eq!(outcomes.len(), 1);
    let outcome = outcomes[0].as_ref().unwrap();
    assert_eq!(outcome.rules.to_json().unwrap(), STORED_RULES);
    assert_eq!(rendered(outcome), REPAIRED_FRAGMENT);
}

// Both pages carry two structurally identical Username rows; the right
// occurrence is the one whose neighborhood still looks like the old form.
#[test]
fn ambiguous_piece_is_pinned_by_its_neighborhood() {
    let old = page(
        "<html><body>\
         <div><p>Username</p><p>Password</p><div>Submit</div></div>\
         <div><div><div><div><p>Username</p><p>Captcha1</p><p>Captcha2</p></div></div></div></div>\
         <p>This should not be extracted</p>\
         </body></html>",
    );
    let new = page(
        "<html><body>\
         <div><p>Username</p><p>email</p></div>\
         <p>This should not be extracted</p>\
         <div><p>Hello World</p><div><p>Username</p><p>Password</p></div></div>\
         </body></html>",
    );
    let fragment = old.full().node_at(&[0, 0]).unwrap();
    let outcome = repair(&old, &new, fragment, None, &RepairOptions::default()).unwrap();
    let rules: Vec<Rule> = outcome.rules.iter().cloned().collect();
    assert_eq!(
        rules,
        vec![Rule(vec![0], vec![0, 2, 1, 0]), Rule(vec![1], vec![0, 2, 1, 1])]
    );
    assert_eq!(
        outcome.unresolved,
        vec![Unresolved {
            fragment_path: vec![2],
            error: RepairError::NoExactMatch { path: vec![2] },
        }]
    );
    assert_eq!(
        rendered(&outcome),
        "<div><p>Username</p><p>Password</p><div>Submit</div></div>"
    );
}

// An attribute change makes the piece's content vanish from the new page
// even though its attribute-free shape still matches: the piece is
// reported and kept, the rest of the fragment is still repaired.
#[test]
fn changed_attributes_surface_as_vanished_content() {
    let old = page("<main><section><p class=\"a\">Username</p><p>keep</p></section></main>");
    let new = page("<main><p class=\"b\">Username</p><p>keep</p></main>");
    let fragment = old.full().node_at(&[0]).unwrap();
    let outcome = repair(&old, &new, fragment, None, &RepairOptions::default()).unwrap();
    let rules: Vec<Rule> = outcome.rules.iter().cloned().collect();
    assert_eq!(rules, vec![Rule(vec![1], vec![1])]);
    assert_eq!(
        outcome.unresolved,
        vec![Unresolved {
            fragment_path: vec![0],
            error: RepairError::VanishedContent { path: vec![0, 0] },
        }]
    );
    assert_eq!(
        rendered(&outcome),
        "<section><p class=\"a\">Username</p><p>keep</p></section>"
    );
}
