use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::model::record::{Record, RecordId};

/// Structured result from `annotree check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// A problem that prevents the record set from being built into a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    /// The same id is used by more than one record
    #[serde(rename = "duplicate_id")]
    DuplicateId { id: RecordId, count: usize },
    /// A record names itself as its parent
    #[serde(rename = "self_parent")]
    SelfParent { id: RecordId, name: String },
    /// Records whose parents form a ring, in parent-chain order
    #[serde(rename = "cycle")]
    Cycle { ids: Vec<RecordId> },
    /// A record whose ancestry runs into a cycle
    #[serde(rename = "unreachable")]
    Unreachable { id: RecordId, name: String },
}

/// Something odd that the tree builder tolerates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckWarning {
    /// Declared parent is not in the set; the record is shown at the top level
    #[serde(rename = "orphan_parent")]
    OrphanParent { id: RecordId, parent_id: RecordId },
    /// Blank name (only whitespace, or nothing)
    #[serde(rename = "empty_name")]
    EmptyName { id: RecordId },
}

/// Validate a record set before building a tree from it.
pub fn check_records(records: &[Record]) -> CheckResult {
    let mut result = CheckResult::default();

    // Duplicates, counted in first-seen order
    let mut counts: HashMap<RecordId, usize> = HashMap::new();
    let mut order = Vec::new();
    for rec in records {
        let count = counts.entry(rec.id).or_insert(0);
        if *count == 0 {
            order.push(rec.id);
        }
        *count += 1;
    }
    for id in order {
        if counts[&id] > 1 {
            result.errors.push(CheckError::DuplicateId {
                id,
                count: counts[&id],
            });
        }
    }

    let known: HashSet<RecordId> = records.iter().map(|r| r.id).collect();
    for rec in records {
        if rec.name.trim().is_empty() {
            result.warnings.push(CheckWarning::EmptyName { id: rec.id });
        }
        if let Some(parent_id) = rec.parent_id
            && !known.contains(&parent_id)
        {
            result
                .warnings
                .push(CheckWarning::OrphanParent { id: rec.id, parent_id });
        }
    }

    let (stuck, cycles) = find_cycles(records, &known);
    let mut in_cycle = HashSet::new();
    for cycle in cycles {
        in_cycle.extend(cycle.iter().copied());
        if let &[id] = cycle.as_slice() {
            let name = records
                .iter()
                .find(|r| r.id == id)
                .map(|r| r.name.clone())
                .unwrap_or_default();
            result.errors.push(CheckError::SelfParent { id, name });
        } else {
            result.errors.push(CheckError::Cycle { ids: cycle });
        }
    }
    for rec in records {
        if stuck.contains(&rec.id) && !in_cycle.contains(&rec.id) {
            result.errors.push(CheckError::Unreachable {
                id: rec.id,
                name: rec.name.clone(),
            });
        }
    }

    result.valid = result.errors.is_empty();
    result
}

/// Follow every record's parent chain. Returns the ids that never reach the
/// top level, plus each distinct ring found along the way.
fn find_cycles(
    records: &[Record],
    known: &HashSet<RecordId>,
) -> (HashSet<RecordId>, Vec<Vec<RecordId>>) {
    let mut parent_of: HashMap<RecordId, Option<RecordId>> = HashMap::new();
    for rec in records {
        let parent = rec.parent_id.filter(|p| known.contains(p));
        parent_of.entry(rec.id).or_insert(parent);
    }

    // true = reaches the top level
    let mut reaches_top: HashMap<RecordId, bool> = HashMap::new();
    let mut cycles = Vec::new();

    for rec in records {
        let mut walk: Vec<RecordId> = Vec::new();
        let mut cur = rec.id;
        let outcome = loop {
            if let Some(&known_outcome) = reaches_top.get(&cur) {
                break known_outcome;
            }
            if let Some(pos) = walk.iter().position(|&w| w == cur) {
                cycles.push(walk[pos..].to_vec());
                break false;
            }
            walk.push(cur);
            match parent_of.get(&cur).copied().flatten() {
                Some(parent) => cur = parent,
                None => break true,
            }
        };
        for id in walk {
            reaches_top.insert(id, outcome);
        }
    }

    let stuck = reaches_top
        .into_iter()
        .filter_map(|(id, ok)| (!ok).then_some(id))
        .collect();
    (stuck, cycles)
}
