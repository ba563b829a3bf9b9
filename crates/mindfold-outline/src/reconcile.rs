//! Identity reconciliation: mapping freshly parsed nodes back onto a
//! previous tree's stable ids.
//!
//! The user edits the display form, which carries no identity. To keep
//! manual diagram arrangement alive across edits, both trees are flattened
//! to preorder sequences of `(text, depth, parent text, sibling index)` and
//! matched with three greedy passes, each only considering new nodes not yet
//! matched against old nodes still unconsumed:
//!
//! 1. text + parent text + sibling index (nothing moved),
//! 2. text + parent text (reordered among siblings),
//! 3. text + depth (reparented at the same level).
//!
//! Each pass walks new nodes in preorder and ties break to the first
//! unconsumed old candidate, also in preorder. Reconciliation is total:
//! anything left unmatched gets a fresh id.

use crate::annotation;
use crate::parse::{build_forest, match_list_line, parse_ensuring_ids, tokenize};
use mindfold_core::{NodeId, OutlineNode, Tree};

/// Result of [`reconcile`].
#[derive(Debug, Clone)]
pub struct Reconciled {
    /// The parsed tree with stabilized identities.
    pub tree: Tree,
    /// The input text with every list line annotated (internal form).
    pub internal_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FlatEntry {
    text: String,
    depth: usize,
    parent_text: Option<String>,
    sibling_index: usize,
}

/// Reconcile freshly edited outline text against the previous tree.
///
/// Input that already carries id annotations skips matching entirely: the
/// annotated ids are taken as-is and any unannotated line gets a fresh id
/// (mixed mode). Otherwise the three-pass matcher runs against `previous`.
#[must_use]
pub fn reconcile(text: &str, previous: Option<&Tree>) -> Reconciled {
    if annotation::extract_id(text).is_some() {
        return ensured(text);
    }
    let Some(prev) = previous.filter(|t| !t.is_empty()) else {
        return ensured(text);
    };

    let mut tree = build_forest(tokenize(text));

    let mut old_entries = Vec::with_capacity(prev.node_count());
    flatten(prev.roots(), None, &mut old_entries);
    let mut new_entries = Vec::with_capacity(tree.node_count());
    flatten(tree.roots(), None, &mut new_entries);

    let assigned = match_entries(&old_entries, &new_entries);
    let matched = assigned.iter().filter(|a| a.is_some()).count();
    tracing::debug!(
        new_nodes = new_entries.len(),
        old_nodes = old_entries.len(),
        matched,
        fresh = new_entries.len() - matched,
        "reconciled outline identities"
    );

    let mut index = 0;
    apply_ids(tree.roots_mut(), &assigned, &mut index);

    let ids = tree.collect_ids();
    let internal_text = embed_ids_in_source(text, &ids);
    Reconciled {
        tree,
        internal_text,
    }
}

fn ensured(text: &str) -> Reconciled {
    let ensured = parse_ensuring_ids(text);
    Reconciled {
        tree: ensured.tree,
        internal_text: ensured.internal_text,
    }
}

fn flatten(nodes: &[OutlineNode], parent_text: Option<&str>, out: &mut Vec<(FlatEntry, NodeId)>) {
    for (index, node) in nodes.iter().enumerate() {
        out.push((
            FlatEntry {
                text: node.text.clone(),
                depth: node.depth,
                parent_text: parent_text.map(str::to_owned),
                sibling_index: index,
            },
            node.id.clone(),
        ));
        flatten(&node.children, Some(&node.text), out);
    }
}

/// Three greedy passes; returns the old id assigned to each new preorder
/// index, `None` where the node is genuinely new.
fn match_entries(old: &[(FlatEntry, NodeId)], new: &[(FlatEntry, NodeId)]) -> Vec<Option<NodeId>> {
    let mut consumed = vec![false; old.len()];
    let mut assigned: Vec<Option<NodeId>> = vec![None; new.len()];

    // Pass 1: nothing moved.
    run_pass(old, new, &mut consumed, &mut assigned, |o, n| {
        o.text == n.text && o.parent_text == n.parent_text && o.sibling_index == n.sibling_index
    });
    // Pass 2: reordered among the same parent's children.
    run_pass(old, new, &mut consumed, &mut assigned, |o, n| {
        o.text == n.text && o.parent_text == n.parent_text
    });
    // Pass 3: reparented at the same depth.
    run_pass(old, new, &mut consumed, &mut assigned, |o, n| {
        o.text == n.text && o.depth == n.depth
    });

    assigned
}

fn run_pass(
    old: &[(FlatEntry, NodeId)],
    new: &[(FlatEntry, NodeId)],
    consumed: &mut [bool],
    assigned: &mut [Option<NodeId>],
    matches: impl Fn(&FlatEntry, &FlatEntry) -> bool,
) {
    for (new_index, (entry, _)) in new.iter().enumerate() {
        if assigned[new_index].is_some() {
            continue;
        }
        // first unconsumed candidate in old preorder wins
        for (old_index, (candidate, id)) in old.iter().enumerate() {
            if consumed[old_index] {
                continue;
            }
            if matches(candidate, entry) {
                consumed[old_index] = true;
                assigned[new_index] = Some(id.clone());
                break;
            }
        }
    }
}

fn apply_ids(nodes: &mut [OutlineNode], assigned: &[Option<NodeId>], index: &mut usize) {
    for node in nodes {
        if let Some(Some(id)) = assigned.get(*index) {
            node.id = id.clone();
        }
        *index += 1;
        apply_ids(&mut node.children, assigned, index);
    }
}

/// Annotate the source's list lines with ids in preorder, preserving every
/// other line byte-for-byte.
fn embed_ids_in_source(text: &str, ids: &[NodeId]) -> String {
    let mut index = 0;
    text.split('\n')
        .map(|line| {
            if let Some(raw) = match_list_line(line) {
                if let Some(id) = ids.get(index) {
                    index += 1;
                    let clean = annotation::strip_annotation(raw.content);
                    return format!(
                        "{}{} {}",
                        raw.indent,
                        raw.marker,
                        annotation::embed_id(&clean, id.as_str())
                    );
                }
            }
            line.to_owned()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;
    use crate::serialize::{IdAnnotations, serialize};

    fn id_of<'t>(tree: &'t Tree, text: &str) -> &'t str {
        tree.preorder()
            .find(|n| n.text == text)
            .map(|n| n.id.as_str())
            .expect("node present")
    }

    #[test]
    fn unchanged_nodes_keep_their_ids() {
        let previous = parse("- Root\n  - Child1\n  - Child2");
        let reconciled = reconcile("- Root\n  - Child1\n  - Child2", Some(&previous));

        assert_eq!(id_of(&reconciled.tree, "Root"), id_of(&previous, "Root"));
        assert_eq!(id_of(&reconciled.tree, "Child1"), id_of(&previous, "Child1"));
        assert_eq!(id_of(&reconciled.tree, "Child2"), id_of(&previous, "Child2"));
    }

    #[test]
    fn reordered_siblings_match_in_pass_two() {
        let previous = parse("- Root\n  - Child1\n  - Child2");
        let reconciled = reconcile("- Root\n  - Child2\n  - Child1", Some(&previous));

        assert_eq!(id_of(&reconciled.tree, "Child1"), id_of(&previous, "Child1"));
        assert_eq!(id_of(&reconciled.tree, "Child2"), id_of(&previous, "Child2"));
    }

    #[test]
    fn reparented_node_matches_in_pass_three() {
        let previous = parse("- Root1\n  - Shared\n- Root2");
        let reconciled = reconcile("- Root1\n- Root2\n  - Shared", Some(&previous));

        assert_eq!(id_of(&reconciled.tree, "Shared"), id_of(&previous, "Shared"));
        assert_eq!(id_of(&reconciled.tree, "Root1"), id_of(&previous, "Root1"));
        assert_eq!(id_of(&reconciled.tree, "Root2"), id_of(&previous, "Root2"));
    }

    #[test]
    fn new_nodes_get_fresh_ids() {
        let previous = parse("- Root");
        let reconciled = reconcile("- Root\n- Brand new", Some(&previous));

        assert_eq!(id_of(&reconciled.tree, "Root"), id_of(&previous, "Root"));
        let fresh = id_of(&reconciled.tree, "Brand new");
        assert!(previous.get(fresh).is_none());
    }

    #[test]
    fn removed_nodes_do_not_donate_ids_to_different_text() {
        let previous = parse("- Root\n  - Gone");
        let reconciled = reconcile("- Root\n  - Different", Some(&previous));
        assert_ne!(
            id_of(&reconciled.tree, "Different"),
            id_of(&previous, "Gone")
        );
    }

    #[test]
    fn each_old_id_is_assigned_at_most_once() {
        let previous = parse("- Root\n  - Twin");
        let reconciled = reconcile("- Root\n  - Twin\n  - Twin", Some(&previous));

        let ids: Vec<&str> = reconciled
            .tree
            .preorder()
            .filter(|n| n.text == "Twin")
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], id_of(&previous, "Twin"));
        assert_ne!(ids[1], ids[0]);
    }

    #[test]
    fn identical_twins_resolve_in_old_preorder_order() {
        // Both old twins are eligible in pass 1 for the first new twin;
        // the first unconsumed old-preorder candidate must win.
        let previous = parse("- Root\n  - Twin\n  - Twin");
        let old_ids: Vec<&str> = previous
            .preorder()
            .filter(|n| n.text == "Twin")
            .map(|n| n.id.as_str())
            .collect();

        let reconciled = reconcile("- Root\n  - Twin\n  - Twin", Some(&previous));
        let new_ids: Vec<&str> = reconciled
            .tree
            .preorder()
            .filter(|n| n.text == "Twin")
            .map(|n| n.id.as_str())
            .collect();

        assert_eq!(new_ids, old_ids);
    }

    #[test]
    fn annotated_input_skips_matching() {
        let previous = parse("- Root");
        let text = "- Root <!-- id:fixed000 -->\n- Bare";
        let reconciled = reconcile(text, Some(&previous));

        // the annotation wins over any previous-tree match
        assert_eq!(id_of(&reconciled.tree, "Root"), "fixed000");
        // unannotated lines get fresh ids, not reconciled ones
        assert_ne!(id_of(&reconciled.tree, "Bare"), id_of(&previous, "Root"));
    }

    #[test]
    fn without_previous_tree_every_line_is_annotated_fresh() {
        let reconciled = reconcile("- A\n- B", None);
        assert!(reconciled.internal_text.contains("<!-- id:"));
        assert_eq!(reconciled.tree.roots().len(), 2);
    }

    #[test]
    fn internal_text_round_trips_to_the_same_identities() {
        let previous = parse("- Root\n  - Child");
        let reconciled = reconcile("- Root\n  - Child\n  - New", Some(&previous));

        let reparsed = parse(&reconciled.internal_text);
        assert_eq!(
            serialize(&reparsed, IdAnnotations::Embed),
            serialize(&reconciled.tree, IdAnnotations::Embed)
        );
    }

    #[test]
    fn non_list_lines_survive_in_internal_text() {
        let previous = parse("- Root");
        let reconciled = reconcile("# heading\n- Root\n\ntrailing", Some(&previous));
        let lines: Vec<&str> = reconciled.internal_text.split('\n').collect();
        assert_eq!(lines[0], "# heading");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "trailing");
    }
}
