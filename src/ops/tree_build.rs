use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, warn};

use crate::model::config::CyclePolicy;
use crate::model::record::{ROOT_ID, Record, RecordId};
use crate::model::tree::{TreeNode, assemble};

/// Error type for tree construction
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("duplicate record id: {0}")]
    DuplicateId(RecordId),
    #[error("record id {0} is reserved for the root node")]
    ReservedId(RecordId),
    #[error("parent cycle detected, records never reach the root: {ids:?}")]
    CycleDetected { ids: Vec<RecordId> },
}

/// Build a tree from flat records, rejecting parent cycles.
///
/// See [`build_tree_with`].
pub fn build_tree(records: &[Record], root_label: &Record) -> Result<TreeNode, TreeError> {
    build_tree_with(records, root_label, CyclePolicy::Reject)
}

/// Build a tree under a synthetic root wrapping `root_label`.
///
/// Records without a parent, or whose parent id doesn't resolve inside
/// `records`, become children of the root. Every other record hangs under
/// its parent. Sibling order always follows input order.
///
/// Records whose parent chain never reaches the root (a record naming itself
/// as parent, or a ring of records naming each other) are handled according
/// to `policy`.
pub fn build_tree_with(
    records: &[Record],
    root_label: &Record,
    policy: CyclePolicy,
) -> Result<TreeNode, TreeError> {
    let mut known = HashSet::with_capacity(records.len());
    for rec in records {
        if rec.id == ROOT_ID {
            return Err(TreeError::ReservedId(rec.id));
        }
        if !known.insert(rec.id) {
            return Err(TreeError::DuplicateId(rec.id));
        }
    }

    // Parent id → record indices, in input order. One pass instead of
    // rescanning the remaining pool for every placed node.
    let mut buckets: HashMap<RecordId, Vec<usize>> = HashMap::new();
    for (i, rec) in records.iter().enumerate() {
        let parent = match rec.parent_id {
            Some(p) if known.contains(&p) => p,
            Some(p) => {
                warn!(id = rec.id, parent = p, "parent not in record set, placing at root");
                ROOT_ID
            }
            None => ROOT_ID,
        };
        buckets.entry(parent).or_default().push(i);
    }

    // Breadth-first over the buckets. Each entry records its parent's
    // position, so the nested tree is put together without recursion.
    let mut nodes: Vec<(Record, usize)> = Vec::with_capacity(records.len());
    let mut placed = HashSet::with_capacity(records.len());
    let mut queue = VecDeque::from([(ROOT_ID, 0)]);
    while let Some((parent, pos)) = queue.pop_front() {
        let Some(indices) = buckets.get(&parent) else {
            continue;
        };
        for &i in indices {
            let rec = &records[i];
            placed.insert(rec.id);
            nodes.push((rec.clone(), pos));
            queue.push_back((rec.id, nodes.len()));
        }
    }

    if placed.len() < records.len() {
        let unreachable: Vec<RecordId> = records
            .iter()
            .map(|r| r.id)
            .filter(|id| !placed.contains(id))
            .collect();
        match policy {
            CyclePolicy::Reject => return Err(TreeError::CycleDetected { ids: unreachable }),
            CyclePolicy::Drop => {
                warn!(ids = ?unreachable, "dropping records caught in a parent cycle");
            }
        }
    }

    debug!(records = records.len(), placed = placed.len(), "built tree");
    Ok(assemble(root_label.clone(), nodes))
}
