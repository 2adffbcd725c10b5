use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::record::{Record, RecordId};

/// A record plus its ordered children.
///
/// Trees are snapshots: they are rebuilt whenever the underlying record set
/// changes and never mutated in place by consumers.
///
/// Parent chains can be thousands of levels deep, so nothing on this type
/// recurses: walks use [`TreeNode::iter`], and `Clone`, `PartialEq` and
/// `Drop` are implemented with explicit stacks.
#[derive(Debug, Serialize, Deserialize)]
pub struct TreeNode {
    pub data: Record,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// A node with no children
    pub fn new(data: Record) -> Self {
        TreeNode {
            data,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> RecordId {
        self.data.id
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Self and every descendant, parent before children.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    /// Find a node anywhere in this subtree (including self)
    pub fn find(&self, id: RecordId) -> Option<&TreeNode> {
        self.iter().find(|n| n.id() == id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.find(id).is_some()
    }

    /// Number of nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Depth of the deepest node below self (a leaf has height 0)
    pub fn height(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 0)];
        while let Some((node, depth)) = stack.pop() {
            max = max.max(depth);
            stack.extend(node.children.iter().map(|c| (c, depth + 1)));
        }
        max
    }
}

/// Pre-order walk over a subtree, see [`TreeNode::iter`].
pub struct PreOrder<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<&'a TreeNode> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Put a tree back together from a flat node list.
///
/// `nodes[i]` is position `i + 1`; the root is position 0. Each entry names the
/// position of its parent, which must come earlier in the list. Siblings keep
/// their list order.
pub(crate) fn assemble(root: Record, nodes: Vec<(Record, usize)>) -> TreeNode {
    let mut root = TreeNode::new(root);
    let mut parents = Vec::with_capacity(nodes.len());
    let mut slots = Vec::with_capacity(nodes.len());
    for (data, parent) in nodes {
        parents.push(parent);
        slots.push(Some(TreeNode::new(data)));
    }

    // Back to front: every child is complete before it moves into its parent.
    for i in (0..slots.len()).rev() {
        let Some(mut node) = slots[i].take() else {
            continue;
        };
        node.children.reverse();
        match parents[i] {
            0 => root.children.push(node),
            p if p <= i => {
                if let Some(parent) = slots[p - 1].as_mut() {
                    parent.children.push(node);
                }
            }
            _ => {}
        }
    }
    root.children.reverse();
    root
}

impl Clone for TreeNode {
    fn clone(&self) -> Self {
        let mut nodes = Vec::new();
        let mut stack: Vec<(&TreeNode, usize)> =
            self.children.iter().rev().map(|c| (c, 0)).collect();
        while let Some((node, parent)) = stack.pop() {
            nodes.push((node.data.clone(), parent));
            let pos = nodes.len();
            stack.extend(node.children.iter().rev().map(|c| (c, pos)));
        }
        assemble(self.data.clone(), nodes)
    }
}

impl PartialEq for TreeNode {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            if a.data != b.data || a.children.len() != b.children.len() {
                return false;
            }
            stack.extend(a.children.iter().zip(&b.children));
        }
        true
    }
}

impl Eq for TreeNode {}

impl Drop for TreeNode {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

/// Output of a tree filter pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterResult {
    /// Pruned deep copy of the input tree
    pub tree: TreeNode,
    /// Nodes that must be expanded to reveal every match
    pub expand_ids: BTreeSet<RecordId>,
}

impl FilterResult {
    /// True when a non-empty query matched nothing (root only remains)
    pub fn is_empty(&self) -> bool {
        self.tree.is_leaf()
    }
}
