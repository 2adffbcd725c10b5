use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::model::record::RecordId;
use crate::model::tree::{FilterResult, TreeNode};

/// Filter a tree by a case-sensitive name prefix.
///
/// A blank query returns the tree unchanged with nothing to expand. Otherwise
/// the result is a pruned copy holding:
/// - every node whose name starts with the trimmed query,
/// - the immediate children of each match (grandchildren only if they
///   themselves qualify),
/// - every ancestor of a match, each of which also lands in `expand_ids`.
///
/// The synthetic root is always kept and never matches.
pub fn filter_tree(tree: &TreeNode, query: &str) -> FilterResult {
    let query = query.trim();
    if query.is_empty() {
        return FilterResult {
            tree: tree.clone(),
            expand_ids: BTreeSet::new(),
        };
    }

    let mut keep = HashSet::new();
    let mut expand_ids = BTreeSet::new();
    mark_matches(tree, query, &mut keep, &mut expand_ids);

    let mut pruned = tree.clone();
    prune(&mut pruned, &keep);

    debug!(
        query,
        kept = keep.len(),
        expanded = expand_ids.len(),
        "filtered tree"
    );
    FilterResult {
        tree: pruned,
        expand_ids,
    }
}

/// Walk the tree below the root, recording kept and expanded ids.
///
/// Depth-first with an explicit stack; `path` holds the ids from the root
/// down to the parent of the node being visited.
fn mark_matches(
    root: &TreeNode,
    query: &str,
    keep: &mut HashSet<RecordId>,
    expand_ids: &mut BTreeSet<RecordId>,
) {
    let mut path = vec![root.id()];
    let mut stack: Vec<(&TreeNode, usize)> = root.children.iter().rev().map(|c| (c, 1)).collect();
    while let Some((node, depth)) = stack.pop() {
        path.truncate(depth);
        if node.name().starts_with(query) {
            keep.insert(node.id());
            keep.extend(node.children.iter().map(TreeNode::id));
            // An ancestor already marked has its own ancestors marked too
            for &ancestor in path.iter().rev() {
                if !expand_ids.insert(ancestor) {
                    break;
                }
                keep.insert(ancestor);
            }
        }
        path.push(node.id());
        stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
    }
}

fn prune(root: &mut TreeNode, keep: &HashSet<RecordId>) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        node.children.retain(|c| keep.contains(&c.id()));
        stack.extend(node.children.iter_mut());
    }
}
