//! Whole-engine properties checked through the public API, over hand-written
//! cases and a batch of generated record sets.

use std::collections::{BTreeSet, HashMap, HashSet};

use annotree::model::{CharOffset, ROOT_ID, RangeAnnotation, Record, RecordId, TreeNode};
use annotree::ops::{
    build_index, build_tokens, build_tree, filter_tree, flatten, flatten_with_root, subtree_ids,
    toggle_subtree,
};
use pretty_assertions::assert_eq;

/// Small deterministic generator so failures are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

const NAMES: &[&str] = &["Alpha", "Alps", "Beta", "Bet", "Gamma", "Delta", "Del", "Echo"];

/// Random forest: each record points at an earlier record, at nothing, or at
/// an id that doesn't exist. Ids are shuffled so parents can come after children.
fn random_records(seed: u64, count: usize) -> Vec<Record> {
    let mut rng = Lcg(seed);
    let mut records: Vec<Record> = Vec::with_capacity(count);
    for i in 0..count {
        let id = (i + 1) as RecordId;
        let name = format!("{}{}", NAMES[rng.below(NAMES.len() as u64) as usize], i);
        let mut rec = Record::new(id, name);
        match rng.below(5) {
            0 => {}
            1 => rec.parent_id = Some(10_000 + id),
            _ if i > 0 => rec.parent_id = Some(rng.below(i as u64) as RecordId + 1),
            _ => {}
        }
        records.push(rec);
    }
    for i in (1..records.len()).rev() {
        let j = rng.below(i as u64 + 1) as usize;
        records.swap(i, j);
    }
    records
}

/// Straightforward pool-scanning construction: place roots, then repeatedly
/// pull each node's children out of the remaining pool.
fn pool_build(records: &[Record], root_label: &Record) -> TreeNode {
    let ids: HashSet<RecordId> = records.iter().map(|r| r.id).collect();
    let mut root = TreeNode::new(root_label.clone());
    let mut pool = Vec::new();
    for rec in records {
        match rec.parent_id {
            Some(p) if ids.contains(&p) => pool.push(rec.clone()),
            _ => root.children.push(TreeNode::new(rec.clone())),
        }
    }
    for child in &mut root.children {
        pool_attach(child, &mut pool);
    }
    root
}

fn pool_attach(node: &mut TreeNode, pool: &mut Vec<Record>) {
    let (mine, rest): (Vec<Record>, Vec<Record>) = pool
        .drain(..)
        .partition(|r| r.parent_id == Some(node.id()));
    *pool = rest;
    node.children = mine.into_iter().map(TreeNode::new).collect();
    for child in &mut node.children {
        pool_attach(child, pool);
    }
}

fn parent_map(tree: &TreeNode, out: &mut HashMap<RecordId, RecordId>) {
    for child in &tree.children {
        out.insert(child.id(), tree.id());
        parent_map(child, out);
    }
}

fn ancestors(id: RecordId, parents: &HashMap<RecordId, RecordId>) -> Vec<RecordId> {
    let mut out = Vec::new();
    let mut cur = id;
    while let Some(&p) = parents.get(&cur) {
        out.push(p);
        cur = p;
    }
    out
}

// ---------------------------------------------------------------------------
// Tree building
// ---------------------------------------------------------------------------

#[test]
fn tree_is_complete_permutation() {
    for seed in 0..40 {
        let records = random_records(seed, 60);
        let tree = build_tree(&records, &Record::root("Codes")).unwrap();
        let mut flat = flatten_with_root(&tree);
        assert_eq!(flat.remove(0).id, ROOT_ID);

        let mut got: Vec<RecordId> = flat.iter().map(|r| r.id).collect();
        let mut want: Vec<RecordId> = records.iter().map(|r| r.id).collect();
        got.sort();
        want.sort();
        assert_eq!(got, want, "seed {}", seed);
    }
}

#[test]
fn bucket_build_matches_pool_build() {
    for seed in 0..40 {
        let records = random_records(seed, 80);
        let label = Record::root("Folders");
        let fast = build_tree(&records, &label).unwrap();
        let slow = pool_build(&records, &label);
        assert_eq!(fast, slow, "seed {}", seed);
    }
}

#[test]
fn rebuild_is_deep_equal() {
    let records = random_records(7, 100);
    let label = Record::root("Tags");
    assert_eq!(
        build_tree(&records, &label).unwrap(),
        build_tree(&records, &label).unwrap()
    );
}

#[test]
fn deep_chain_builds_filters_and_flattens() {
    let depth = 10_000;
    let mut records = vec![Record::new(1, "L1")];
    for i in 2..=depth {
        records.push(Record::new(i, format!("L{}", i)).with_parent(i - 1));
    }
    let tree = build_tree(&records, &Record::root("Codes")).unwrap();
    assert_eq!(tree.height(), depth as usize);
    assert_eq!(tree, tree.clone());

    // "L1" matches L1, L10-L19, L100-L199, ... so every level survives
    let result = filter_tree(&tree, "L1");
    assert_eq!(result.tree.node_count(), depth as usize + 1);
    assert!(result.expand_ids.contains(&ROOT_ID));

    let flat = flatten(tree.find(1).unwrap());
    assert_eq!(flat.len(), depth as usize - 1);
    assert_eq!(flat.last().map(|r| r.id), Some(depth));
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

#[test]
fn empty_query_keeps_every_id() {
    let records = random_records(3, 50);
    let tree = build_tree(&records, &Record::root("Codes")).unwrap();
    let result = filter_tree(&tree, "");
    assert_eq!(subtree_ids(&result.tree), subtree_ids(&tree));
    assert!(result.expand_ids.is_empty());
}

#[test]
fn filtered_ids_are_matches_ancestors_or_children_of_matches() {
    for seed in 0..40 {
        let records = random_records(seed, 60);
        let tree = build_tree(&records, &Record::root("Codes")).unwrap();
        let mut parents = HashMap::new();
        parent_map(&tree, &mut parents);

        for query in ["Al", "Bet", "Del", "Echo1", "Zulu"] {
            let result = filter_tree(&tree, query);
            let matches: Vec<RecordId> = records
                .iter()
                .filter(|r| r.name.starts_with(query))
                .map(|r| r.id)
                .collect();
            let match_set: HashSet<RecordId> = matches.iter().copied().collect();

            let mut want_expand = BTreeSet::new();
            for &m in &matches {
                want_expand.extend(ancestors(m, &parents));
            }
            assert_eq!(result.expand_ids, want_expand, "seed {} query {}", seed, query);

            for id in subtree_ids(&result.tree) {
                if id == ROOT_ID {
                    continue;
                }
                let is_match = match_set.contains(&id);
                let is_ancestor = want_expand.contains(&id);
                let is_child_of_match = parents.get(&id).is_some_and(|p| match_set.contains(p));
                assert!(
                    is_match || is_ancestor || is_child_of_match,
                    "seed {} query {} kept {}",
                    seed,
                    query,
                    id
                );
            }
            for &m in &matches {
                assert!(result.tree.contains(m), "seed {} query {} lost {}", seed, query, m);
            }
        }
    }
}

#[test]
fn grandchild_of_match_is_pruned() {
    let records = vec![
        Record::new(1, "A"),
        Record::new(2, "B").with_parent(1),
        Record::new(3, "C").with_parent(2),
    ];
    let tree = build_tree(&records, &Record::root("Codes")).unwrap();
    let result = filter_tree(&tree, "A");
    assert!(result.tree.contains(1));
    assert!(result.tree.contains(2));
    assert!(!result.tree.contains(3));
}

// ---------------------------------------------------------------------------
// Flatten / cascade
// ---------------------------------------------------------------------------

#[test]
fn flatten_visits_each_descendant_once() {
    for seed in 0..20 {
        let records = random_records(seed, 60);
        let tree = build_tree(&records, &Record::root("Codes")).unwrap();
        for node in &tree.children {
            let flat = flatten(node);
            let unique: HashSet<RecordId> = flat.iter().map(|r| r.id).collect();
            assert_eq!(unique.len(), flat.len());
            assert_eq!(flat.len() + 1, node.node_count());
            assert!(!unique.contains(&node.id()));
        }
    }
}

#[test]
fn hide_node_with_two_children_and_grandchild() {
    let records = vec![
        Record::new(1, "Node"),
        Record::new(2, "Child 1").with_parent(1),
        Record::new(3, "Child 2").with_parent(1),
        Record::new(4, "Grandchild").with_parent(3),
        Record::new(5, "Bystander"),
    ];
    let tree = build_tree(&records, &Record::root("Codes")).unwrap();
    let mut hidden = HashSet::new();
    let affected = toggle_subtree(tree.find(1).unwrap(), &mut hidden);
    assert_eq!(affected.len(), 4);
    assert_eq!(flatten(tree.find(1).unwrap()).len() + 1, affected.len());
    assert!(!hidden.contains(&5));
}

// ---------------------------------------------------------------------------
// Tokens / annotations
// ---------------------------------------------------------------------------

#[test]
fn half_open_coverage() {
    let texts = ["The", "cat", "sat", "on", "mat"];
    let offs: Vec<CharOffset> = [(0, 3), (4, 7), (8, 11), (12, 14), (15, 18)]
        .into_iter()
        .map(|(b, e)| CharOffset(b, e))
        .collect();
    let tokens = build_tokens(&texts, Some(offs.as_slice())).unwrap().unwrap();
    assert_eq!(tokens.len(), 5);

    let index = build_index(tokens.len(), &[RangeAnnotation::new(1, 1, 4)]).unwrap();
    let covered: Vec<&str> = tokens
        .iter()
        .filter(|t| index.ids_at(t.index).contains(&1))
        .map(|t| t.text.as_str())
        .collect();
    assert_eq!(covered, vec!["cat", "sat", "on"]);
}

#[test]
fn coverage_matches_ranges_for_random_annotations() {
    let mut rng = Lcg(99);
    let anns: Vec<RangeAnnotation> = (0..50)
        .map(|i| {
            let begin = rng.below(40) as usize;
            let len = rng.below(6) as usize;
            RangeAnnotation::new(i, begin, begin + len).with_groups(vec![rng.below(5) as i64 * 100])
        })
        .collect();
    let index = build_index(50, &anns).unwrap();

    for token in 0..50 {
        let want: Vec<i64> = anns
            .iter()
            .filter(|a| a.begin_token <= token && token < a.end_token)
            .map(|a| a.id)
            .collect();
        assert_eq!(index.ids_at(token), want.as_slice(), "token {}", token);
    }

    // Labels are dense 1..=n in first-seen order
    let mut labels: Vec<u32> = index.group_labels.values().copied().collect();
    labels.sort();
    let dense: Vec<u32> = (1..=labels.len() as u32).collect();
    assert_eq!(labels, dense);
    for ann in &anns {
        let label = index.get(ann.id).unwrap().group_ids[0];
        assert_eq!(index.raw_group_id(label as u32), Some(ann.group_ids[0]));
    }
}

#[test]
fn group_remap_example() {
    let anns: Vec<RangeAnnotation> = [57, 57, 12, 57]
        .into_iter()
        .enumerate()
        .map(|(i, g)| RangeAnnotation::new(i as i64, i, i + 1).with_groups(vec![g]))
        .collect();
    let index = build_index(4, &anns).unwrap();
    let labels: Vec<i64> = anns
        .iter()
        .map(|a| index.get(a.id).unwrap().group_ids[0])
        .collect();
    assert_eq!(labels, vec![1, 1, 2, 1]);
}

#[test]
fn index_rebuild_is_deep_equal() {
    let anns = vec![
        RangeAnnotation::new(1, 0, 4).with_groups(vec![3, 9]),
        RangeAnnotation::new(2, 2, 6).with_groups(vec![9]),
        RangeAnnotation::new(3, 5, 5),
    ];
    assert_eq!(build_index(6, &anns).unwrap(), build_index(6, &anns).unwrap());
}
