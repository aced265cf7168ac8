//! Hierarchy algorithms over flat, parent-referencing block lists.
//!
//! Blocks name their parent by id. These functions turn such a list into a
//! forest and answer ancestry questions without ever requiring the list to
//! be complete: a parent id that resolves to nothing makes the block a root.
//!
//! Parent chains come from user data, so every walk carries a visited set
//! and stops on a cycle. Walks are iterative; nesting depth is unbounded.

use std::collections::{HashMap, HashSet};

use tessera_types::{BlockId, BlockRecord};

/// Build a forest from a flat list, preserving input order among siblings
/// and among roots.
///
/// Each node's `children` is rebuilt from the `parent` references; whatever
/// the input records carried in `children` is discarded. A block whose parent
/// is not in the list becomes a root. Blocks caught in a parent cycle are
/// promoted to roots (first in input order wins) so every input record
/// appears in the output exactly once. With duplicate ids, parent lookups
/// resolve to the first occurrence.
pub fn build_block_hierarchy(blocks: &[BlockRecord]) -> Vec<BlockRecord> {
    // Pass 1: id → index.
    let mut index: HashMap<&BlockId, usize> = HashMap::with_capacity(blocks.len());
    for (i, block) in blocks.iter().enumerate() {
        index.entry(&block.id).or_insert(i);
    }

    // Pass 2: attach each node to its parent, or make it a root.
    let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); blocks.len()];
    let mut roots = Vec::new();
    for (i, block) in blocks.iter().enumerate() {
        match block.parent.as_ref().and_then(|p| index.get(p)) {
            Some(&parent) if parent != i => children_of[parent].push(i),
            _ => roots.push(i),
        }
    }

    let mut placed = vec![false; blocks.len()];
    let mut forest: Vec<(usize, BlockRecord)> = Vec::with_capacity(roots.len());
    for &root in &roots {
        let node = assemble(root, blocks, &children_of, &mut placed);
        forest.push((root, node));
    }

    // Anything not placed hangs off a parent cycle.
    for i in 0..blocks.len() {
        if !placed[i] {
            tracing::warn!(block = %blocks[i].id, "parent cycle detected, promoting block to root");
            let node = assemble(i, blocks, &children_of, &mut placed);
            forest.push((i, node));
        }
    }

    // Promoted cycle members slot back into input order among the roots.
    forest.sort_by_key(|(i, _)| *i);
    forest.into_iter().map(|(_, node)| node).collect()
}

/// Subtree under `root`, skipping nodes already placed elsewhere.
///
/// Pre-order walk on an explicit stack, then records are assembled in
/// reverse visit order so every child is finished before its parent.
fn assemble(
    root: usize,
    blocks: &[BlockRecord],
    children_of: &[Vec<usize>],
    placed: &mut [bool],
) -> BlockRecord {
    placed[root] = true;
    let mut visit_order = Vec::new();
    let mut kept: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut stack = vec![root];

    while let Some(i) = stack.pop() {
        visit_order.push(i);
        let kids: Vec<usize> = children_of[i].iter().copied().filter(|&c| !placed[c]).collect();
        for &child in &kids {
            placed[child] = true;
            stack.push(child);
        }
        kept.insert(i, kids);
    }

    let mut built: HashMap<usize, BlockRecord> = HashMap::with_capacity(visit_order.len());
    for &i in visit_order.iter().rev() {
        let mut node = blocks[i].clone();
        node.children = kept
            .remove(&i)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|c| built.remove(&c))
            .collect();
        built.insert(i, node);
    }
    built.remove(&root).unwrap_or_else(|| blocks[root].clone())
}

/// Every descendant of `block` in `all` (children, grandchildren, ...),
/// in depth-first pre-order with siblings in input order.
/// Never includes `block` itself.
pub fn get_all_children<'a>(block: &BlockRecord, all: &'a [BlockRecord]) -> Vec<&'a BlockRecord> {
    let mut children_by_parent: HashMap<&BlockId, Vec<&'a BlockRecord>> = HashMap::new();
    for record in all {
        if let Some(parent) = record.parent.as_ref() {
            children_by_parent.entry(parent).or_default().push(record);
        }
    }

    let mut result = Vec::new();
    let mut visited: HashSet<&BlockId> = HashSet::new();
    visited.insert(&block.id);
    let mut stack: Vec<&'a BlockRecord> = Vec::new();
    push_unvisited(children_by_parent.get(&block.id), &mut visited, &mut stack);

    while let Some(child) = stack.pop() {
        result.push(child);
        push_unvisited(children_by_parent.get(&child.id), &mut visited, &mut stack);
    }
    result
}

/// Push `children` so the first in input order pops first.
fn push_unvisited<'a: 'v, 'v>(
    children: Option<&Vec<&'a BlockRecord>>,
    visited: &mut HashSet<&'v BlockId>,
    stack: &mut Vec<&'a BlockRecord>,
) {
    let Some(children) = children else {
        return;
    };
    for &child in children.iter().rev() {
        if visited.insert(&child.id) {
            stack.push(child);
        }
    }
}

/// Whether `ancestor` appears on `candidate`'s parent chain within `all`.
///
/// A block is never its own ancestor. The walk stops with `false` at the
/// first parent id that does not resolve.
pub fn is_child_of(candidate: &BlockRecord, ancestor: &BlockRecord, all: &[BlockRecord]) -> bool {
    if candidate.id == ancestor.id {
        return false;
    }
    get_ancestors(candidate, all)
        .iter()
        .any(|b| b.id == ancestor.id)
}

/// Parent chain of `block`, nearest first. Stops at the first unresolvable
/// parent or on a cycle.
pub fn get_ancestors<'a>(block: &BlockRecord, all: &'a [BlockRecord]) -> Vec<&'a BlockRecord> {
    let by_id: HashMap<&BlockId, &BlockRecord> = all.iter().rev().map(|b| (&b.id, b)).collect();

    let mut result: Vec<&BlockRecord> = Vec::new();
    let mut seen: HashSet<&BlockId> = HashSet::new();
    seen.insert(&block.id);
    let mut next = block.parent.as_ref();

    while let Some(parent_id) = next {
        let Some(&parent) = by_id.get(parent_id) else {
            break;
        };
        if !seen.insert(&parent.id) {
            break;
        }
        result.push(parent);
        next = parent.parent.as_ref();
    }
    result
}

/// Depth of `block` (0 for a root, or for a block whose parent is missing).
pub fn block_depth(block: &BlockRecord, all: &[BlockRecord]) -> usize {
    get_ancestors(block, all).len()
}

/// Inverse of [`build_block_hierarchy`]: depth-first flat list where each
/// node's `parent` is its tree parent and `children` is empty. Roots keep
/// whatever `parent` they carried (a dangling reference stays dangling).
pub fn flatten_hierarchy(forest: &[BlockRecord]) -> Vec<BlockRecord> {
    let mut out = Vec::new();
    let mut stack: Vec<(&BlockRecord, Option<&BlockId>)> =
        forest.iter().rev().map(|root| (root, None)).collect();
    while let Some((node, parent)) = stack.pop() {
        let mut flat = node.clone();
        flat.children = Vec::new();
        if let Some(parent) = parent {
            flat.parent = Some(parent.clone());
        }
        out.push(flat);
        let id = &node.id;
        stack.extend(node.children.iter().rev().map(|child| (child, Some(id))));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_types::BlockRecordBuilder;

    fn block(id: &str, parent: Option<&str>) -> BlockRecord {
        let builder = BlockRecordBuilder::new(id, "text");
        match parent {
            Some(p) => builder.parent(p).build(),
            None => builder.build(),
        }
    }

    fn ids(records: &[&BlockRecord]) -> Vec<String> {
        records.iter().map(|b| b.id.to_string()).collect()
    }

    fn count_nodes(forest: &[BlockRecord]) -> usize {
        forest.iter().map(|n| 1 + count_nodes(&n.children)).sum()
    }

    // ── build_block_hierarchy ───────────────────────────────────────────

    #[test]
    fn test_build_preserves_sibling_order() {
        let flat = vec![
            block("root", None),
            block("a", Some("root")),
            block("b", Some("root")),
            block("a1", Some("a")),
            block("c", Some("root")),
        ];
        let forest = build_block_hierarchy(&flat);

        assert_eq!(forest.len(), 1);
        let root = &forest[0];
        let child_ids: Vec<_> = root.children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(child_ids, vec!["a", "b", "c"]);
        assert_eq!(root.children[0].children[0].id.as_str(), "a1");
        assert_eq!(count_nodes(&forest), flat.len());
    }

    #[test]
    fn test_child_before_parent_in_input() {
        let flat = vec![block("child", Some("parent")), block("parent", None)];
        let forest = build_block_hierarchy(&flat);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id.as_str(), "parent");
        assert_eq!(forest[0].children[0].id.as_str(), "child");
    }

    #[test]
    fn test_dangling_parent_becomes_root() {
        let flat = vec![block("a", None), block("orphan", Some("gone")), block("b", None)];
        let forest = build_block_hierarchy(&flat);
        let root_ids: Vec<_> = forest.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(root_ids, vec!["a", "orphan", "b"]);
        // The dangling reference is preserved, not rewritten.
        assert_eq!(forest[1].parent, Some(BlockId::new("gone")));
    }

    #[test]
    fn test_input_children_are_replaced() {
        let stale = BlockRecordBuilder::new("p", "section")
            .child(BlockRecord::new("stale", "text"))
            .build();
        let forest = build_block_hierarchy(&[stale, block("fresh", Some("p"))]);
        assert_eq!(forest[0].children.len(), 1);
        assert_eq!(forest[0].children[0].id.as_str(), "fresh");
    }

    #[test]
    fn test_cycle_is_total_and_terminates() {
        let flat = vec![block("x", None), block("a", Some("b")), block("b", Some("a"))];
        let forest = build_block_hierarchy(&flat);
        assert_eq!(count_nodes(&forest), 3);
        let root_ids: Vec<_> = forest.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(root_ids, vec!["x", "a"]);
        assert_eq!(forest[1].children[0].id.as_str(), "b");
    }

    #[test]
    fn test_self_parent_is_root() {
        let forest = build_block_hierarchy(&[block("me", Some("me"))]);
        assert_eq!(forest.len(), 1);
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(build_block_hierarchy(&[]).is_empty());
    }

    // ── get_all_children ────────────────────────────────────────────────

    #[test]
    fn test_get_all_children_includes_grandchildren() {
        let flat = vec![
            block("root", None),
            block("a", Some("root")),
            block("b", Some("root")),
            block("a1", Some("a")),
            block("a1x", Some("a1")),
            block("other", None),
        ];
        let all = get_all_children(&flat[0], &flat);
        assert_eq!(ids(&all), vec!["a", "a1", "a1x", "b"]);
        assert!(get_all_children(&flat[4], &flat).is_empty());
    }

    #[test]
    fn test_get_all_children_excludes_self_on_cycle() {
        let flat = vec![block("a", Some("b")), block("b", Some("a"))];
        let all = get_all_children(&flat[0], &flat);
        assert_eq!(ids(&all), vec!["b"]);
    }

    // ── is_child_of / ancestors ─────────────────────────────────────────

    #[test]
    fn test_is_child_of_walks_up() {
        let flat = vec![
            block("root", None),
            block("mid", Some("root")),
            block("leaf", Some("mid")),
            block("stray", None),
        ];
        assert!(is_child_of(&flat[2], &flat[0], &flat));
        assert!(is_child_of(&flat[2], &flat[1], &flat));
        assert!(!is_child_of(&flat[0], &flat[2], &flat));
        assert!(!is_child_of(&flat[2], &flat[3], &flat));
    }

    #[test]
    fn test_block_is_never_its_own_ancestor() {
        let flat = vec![block("a", Some("b")), block("b", Some("a"))];
        assert!(!is_child_of(&flat[0], &flat[0], &flat));
        assert!(is_child_of(&flat[0], &flat[1], &flat));
    }

    #[test]
    fn test_is_child_of_stops_at_missing_parent() {
        let flat = vec![block("leaf", Some("gone")), block("root", None)];
        assert!(!is_child_of(&flat[0], &flat[1], &flat));
    }

    #[test]
    fn test_ancestors_and_depth() {
        let flat = vec![
            block("root", None),
            block("mid", Some("root")),
            block("leaf", Some("mid")),
        ];
        assert_eq!(ids(&get_ancestors(&flat[2], &flat)), vec!["mid", "root"]);
        assert_eq!(block_depth(&flat[2], &flat), 2);
        assert_eq!(block_depth(&flat[0], &flat), 0);
    }

    // ── Deep chains ─────────────────────────────────────────────────────

    fn chain(len: usize) -> Vec<BlockRecord> {
        (0..len)
            .map(|i| {
                let id = format!("b{i}");
                let parent = (i > 0).then(|| format!("b{}", i - 1));
                block(&id, parent.as_deref())
            })
            .collect()
    }

    #[test]
    fn test_deep_chain_is_not_truncated() {
        let flat = chain(300);

        let forest = build_block_hierarchy(&flat);
        assert_eq!(forest.len(), 1);
        let mut depth = 0;
        let mut node = &forest[0];
        while let Some(child) = node.children.first() {
            depth += 1;
            node = child;
        }
        assert_eq!(depth, 299);
        assert_eq!(node.id.as_str(), "b299");

        assert_eq!(get_all_children(&flat[0], &flat).len(), 299);
        assert!(is_child_of(&flat[299], &flat[0], &flat));
        assert_eq!(block_depth(&flat[299], &flat), 299);
        assert_eq!(flatten_hierarchy(&forest).len(), 300);
    }

    #[test]
    fn test_very_deep_chain_does_not_overflow() {
        let flat = chain(20_000);
        assert_eq!(get_all_children(&flat[0], &flat).len(), 19_999);
        assert_eq!(get_ancestors(&flat[19_999], &flat).len(), 19_999);
        let forest = build_block_hierarchy(&flat);
        assert_eq!(forest.len(), 1);
        assert_eq!(flatten_hierarchy(&forest).len(), 20_000);
        // Nested records drop recursively; unwind them by hand.
        let mut pending = forest;
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }

    // ── flatten_hierarchy ───────────────────────────────────────────────

    #[test]
    fn test_flatten_inverts_build() {
        let flat = vec![
            block("root", None),
            block("a", Some("root")),
            block("a1", Some("a")),
            block("b", Some("root")),
        ];
        let forest = build_block_hierarchy(&flat);
        let back = flatten_hierarchy(&forest);

        let back_ids: Vec<_> = back.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(back_ids, vec!["root", "a", "a1", "b"]);
        assert!(back.iter().all(|b| b.children.is_empty()));
        assert_eq!(back[2].parent, Some(BlockId::new("a")));
        assert_eq!(build_block_hierarchy(&back), forest);
    }
}
