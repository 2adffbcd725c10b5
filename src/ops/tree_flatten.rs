use std::collections::HashSet;

use serde::Serialize;

use crate::model::record::{Record, RecordId};
use crate::model::tree::TreeNode;

/// Every descendant of `node` (not `node` itself), parent before children.
pub fn flatten(node: &TreeNode) -> Vec<Record> {
    node.iter().skip(1).map(|n| n.data.clone()).collect()
}

/// `node` followed by every descendant.
pub fn flatten_with_root(node: &TreeNode) -> Vec<Record> {
    node.iter().map(|n| n.data.clone()).collect()
}

/// Ids of `node` and all its descendants: the id list a bulk operation
/// ("hide this code and everything under it") acts on.
pub fn subtree_ids(node: &TreeNode) -> Vec<RecordId> {
    node.iter().map(TreeNode::id).collect()
}

/// Checkbox state of a node given a set of selected ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    /// The node and all its descendants are selected
    Checked,
    /// Neither the node nor any descendant is selected
    Unchecked,
    /// Some but not all
    Indeterminate,
}

pub fn check_state(node: &TreeNode, selected: &HashSet<RecordId>) -> CheckState {
    let ids = subtree_ids(node);
    let hits = ids.iter().filter(|id| selected.contains(id)).count();
    if hits == 0 {
        CheckState::Unchecked
    } else if hits == ids.len() {
        CheckState::Checked
    } else {
        CheckState::Indeterminate
    }
}

/// Cascade a toggle from `node` to its whole subtree.
///
/// A fully checked node is removed from `set` together with every descendant;
/// an unchecked or indeterminate one is added together with every descendant.
/// Returns the affected ids.
pub fn toggle_subtree(node: &TreeNode, set: &mut HashSet<RecordId>) -> Vec<RecordId> {
    let ids = subtree_ids(node);
    if check_state(node, set) == CheckState::Checked {
        for id in &ids {
            set.remove(id);
        }
    } else {
        set.extend(ids.iter().copied());
    }
    ids
}
