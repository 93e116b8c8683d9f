extern crate std;

use core::{borrow::Borrow, cmp::Ordering, fmt, ops::Range};
use std::{format, prelude::v1::*};

use proptest::prelude::*;

use crate::model;

use super::*;

fn insert_find_all(keys: &[u32]) {
    let mut tree: AvlTree<u32> = AvlTree::new();

    for &key in keys {
        tree.insert(key);
        tree.assert_invariants();
    }

    for key in keys {
        assert_eq!(tree.find(key), Some(key), "item not found");
    }
}

#[test]
fn zero_elems_find() {
    insert_find_all(&[]);
}

#[test]
fn single_elem_find() {
    insert_find_all(&[0]);
}

#[test]
fn two_elems_find() {
    insert_find_all(&[0, 1]);
    insert_find_all(&[1, 0]);
    insert_find_all(&[0, 0]);
}

#[test]
fn three_elems_find() {
    insert_find_all(&[0, 1, 2]);
    insert_find_all(&[0, 2, 1]);
    insert_find_all(&[1, 0, 2]);
    insert_find_all(&[1, 2, 0]);
    insert_find_all(&[2, 0, 1]);
    insert_find_all(&[2, 1, 0]);

    insert_find_all(&[1, 1, 1]);
    insert_find_all(&[0, 1, 0]);
    insert_find_all(&[1, 0, 1]);
}

// Calls `f` with every permutation of `keys`, in lexicographic order of positions.
fn for_each_permutation(keys: &[u32], f: &mut dyn FnMut(&[u32])) {
    fn go(prefix: &mut Vec<u32>, rest: &mut Vec<u32>, f: &mut dyn FnMut(&[u32])) {
        if rest.is_empty() {
            f(prefix);
            return;
        }

        for i in 0..rest.len() {
            let key = rest.remove(i);
            prefix.push(key);
            go(prefix, rest, f);
            prefix.pop();
            rest.insert(i, key);
        }
    }

    go(&mut Vec::new(), &mut keys.to_vec(), f);
}

#[test]
fn four_elems_find() {
    for_each_permutation(&[0, 1, 2, 3], &mut |keys| insert_find_all(keys));
}

fn insert_remove_all(keys: &[u32]) {
    let mut tree: AvlTree<u32> = AvlTree::new();

    for &key in keys {
        tree.insert(key);
        tree.assert_invariants();
    }

    for key in keys {
        assert_eq!(tree.remove(key), Some(*key), "item not found");
        tree.assert_invariants();
    }
    assert!(tree.is_empty());

    for &key in keys {
        tree.insert(key);
        tree.assert_invariants();
    }

    for key in keys.iter().rev() {
        assert_eq!(tree.remove(key), Some(*key), "item not found");
        tree.assert_invariants();
    }
    assert!(tree.is_empty());
}

#[test]
fn remove_one() {
    insert_remove_all(&[0]);
}

#[test]
fn remove_two() {
    insert_remove_all(&[0, 1]);
    insert_remove_all(&[1, 0]);
    insert_remove_all(&[1, 1]);
}

#[test]
fn remove_three() {
    insert_remove_all(&[0, 1, 2]);
    insert_remove_all(&[0, 2, 1]);
    insert_remove_all(&[1, 0, 2]);
    insert_remove_all(&[1, 2, 0]);
    insert_remove_all(&[2, 0, 1]);
    insert_remove_all(&[2, 1, 0]);
}

#[test]
fn remove_four() {
    for_each_permutation(&[0, 1, 2, 3], &mut |keys| insert_remove_all(keys));
}

#[test]
fn remove_six_with_duplicates() {
    for_each_permutation(&[0, 1, 1, 2, 3, 3], &mut |keys| insert_remove_all(keys));
}

fn dump(tree: &AvlTree<impl fmt::Debug>) -> String {
    let mut out = String::new();
    tree.dump(&mut out).unwrap();
    out
}

#[test]
fn empty_tree() {
    let mut tree: AvlTree<u32> = AvlTree::default();

    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.height(), 0);
    assert_eq!(tree.find(&1), None);
    assert_eq!(tree.first(), None);
    assert_eq!(tree.last(), None);
    assert_eq!(tree.remove(&1), None);
    assert_eq!(tree.iter().next(), None);
    assert_eq!(dump(&tree), "nil\n");

    tree.assert_invariants();
}

#[test]
fn duplicates_scenario() {
    let mut tree: AvlTree<u32> = AvlTree::new();
    for key in [3, 1, 4, 1, 5] {
        tree.insert(key);
        tree.assert_invariants();
    }

    assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 1, 3, 4, 5]);
    assert_eq!(
        dump(&tree),
        "3 (+0)\n  1 (+1)\n    nil\n    1 (+0)\n  4 (+1)\n    nil\n    5 (+0)\n"
    );

    assert_eq!(tree.find(&3), Some(&3));
    assert_eq!(tree.find(&1), Some(&1));
    assert_eq!(tree.find(&4), Some(&4));
    assert_eq!(tree.find(&5), Some(&5));
    assert_eq!(tree.find(&2), None);

    assert_eq!(tree.remove(&3), Some(3));
    tree.assert_invariants();
    assert_eq!(tree.remove(&1), Some(1));
    tree.assert_invariants();

    assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 4, 5]);
    assert_eq!(tree.len(), 3);
    assert_eq!(dump(&tree), "4 (+0)\n  1 (+0)\n  5 (+0)\n");
}

#[test]
fn increasing_keys_stay_balanced() {
    let tree: AvlTree<u32> = (1..=7).collect();
    tree.assert_invariants();

    assert_eq!(tree.height(), 3);
    assert_eq!(
        dump(&tree),
        "4 (+0)\n  2 (+0)\n    1 (+0)\n    3 (+0)\n  6 (+0)\n    5 (+0)\n    7 (+0)\n"
    );

    let tree: AvlTree<u32> = (0..1000).collect();
    tree.assert_invariants();
    assert!(tree.height() <= 14, "height {} too large", tree.height());
}

#[test]
fn decreasing_keys_stay_balanced() {
    let tree: AvlTree<u32> = (1..=7).rev().collect();
    tree.assert_invariants();

    assert_eq!(tree.height(), 3);
    assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn equal_keys_descend_right() {
    let mut tree: AvlTree<u32> = AvlTree::new();
    tree.insert(2);
    tree.insert(2);

    assert_eq!(dump(&tree), "2 (+1)\n  nil\n  2 (+0)\n");
}

#[test]
fn absent_removal_is_noop() {
    let mut tree: AvlTree<u32> = [8, 4, 12, 2, 6, 10, 14, 1, 3].into_iter().collect();
    let before = dump(&tree);

    for key in [0, 5, 7, 9, 11, 13, 15] {
        assert_eq!(tree.remove(&key), None);
        assert_eq!(dump(&tree), before);
    }

    assert_eq!(tree.len(), 9);
    tree.assert_invariants();
}

#[test]
fn round_trip() {
    let mut tree: AvlTree<u32> = (0..32).map(|k| k * 2).collect();

    tree.insert(17);
    assert_eq!(tree.find(&17), Some(&17));
    assert!(tree.contains(&17));

    assert_eq!(tree.remove(&17), Some(17));
    assert_eq!(tree.find(&17), None);
    assert!(!tree.contains(&17));
    tree.assert_invariants();
}

#[test]
fn remove_keeps_count() {
    let mut tree = AvlTree::new();
    for key in 0..100u32 {
        tree.insert(key % 10);
    }
    assert_eq!(tree.len(), 100);

    for key in 0..40u32 {
        assert_eq!(tree.remove(&(key % 10)), Some(key % 10));
        tree.assert_invariants();
    }
    assert_eq!(tree.len(), 60);

    // Six copies of each key remain.
    for key in 0..10u32 {
        assert_eq!(tree.iter().filter(|&&k| k == key).count(), 6);
    }
}

#[test]
fn removal_rotation_keeping_height() {
    // Removing 1 leaves 2 right-heavy by two over a perfectly balanced 4, the one case where a
    // rotation does not shrink the subtree.
    let mut tree: AvlTree<u32> = [2, 1, 4, 3, 5].into_iter().collect();
    assert_eq!(tree.remove(&1), Some(1));
    tree.assert_invariants();

    assert_eq!(dump(&tree), "4 (-1)\n  2 (+1)\n    nil\n    3 (+0)\n  5 (+0)\n");
}

#[test]
fn removal_double_rotation() {
    let mut tree: AvlTree<u32> = [2, 1, 4, 3].into_iter().collect();
    assert_eq!(tree.remove(&1), Some(1));
    tree.assert_invariants();

    assert_eq!(dump(&tree), "3 (+0)\n  2 (+0)\n  4 (+0)\n");
}

#[test]
fn first_and_last() {
    let tree: AvlTree<i32> = [5, -3, 9, 0, 9, -3].into_iter().collect();

    assert_eq!(tree.first(), Some(&-3));
    assert_eq!(tree.last(), Some(&9));
}

#[test]
fn iterators() {
    let tree: AvlTree<u32> = [5, 3, 8, 3, 1].into_iter().collect();

    let mut iter = tree.iter();
    assert_eq!(iter.len(), 5);
    assert_eq!(iter.next(), Some(&1));
    assert_eq!(iter.len(), 4);

    let borrowed: Vec<u32> = (&tree).into_iter().copied().collect();
    assert_eq!(borrowed, [1, 3, 3, 5, 8]);

    let copy = tree.clone();
    let owned: Vec<u32> = tree.into_iter().collect();
    assert_eq!(owned, [1, 3, 3, 5, 8]);

    let mut into_iter = copy.into_iter();
    assert_eq!(into_iter.len(), 5);
    assert_eq!(into_iter.next(), Some(1));
    assert_eq!(into_iter.len(), 4);
}

#[test]
fn clone_is_independent() {
    let mut a: AvlTree<u32> = (0..10).collect();
    let b = a.clone();

    a.remove(&3);
    a.insert(42);

    assert!(b.contains(&3));
    assert!(!b.contains(&42));
    b.assert_invariants();
    a.assert_invariants();
}

#[test]
fn clear_and_extend() {
    let mut tree: AvlTree<u32> = (0..10).collect();
    tree.clear();
    assert!(tree.is_empty());
    tree.assert_invariants();

    tree.extend([3, 2, 1]);
    assert_eq!(format!("{tree:?}"), "{1, 2, 3}");
}

#[test]
fn dotgraph() {
    let mut out = String::new();
    AvlTree::<u32>::new().dotgraph("empty", &mut out).unwrap();
    assert_eq!(out, "digraph \"graph-empty\" {}");

    let tree: AvlTree<u32> = [2, 2].into_iter().collect();
    let mut out = String::new();
    tree.dotgraph("dup", &mut out).unwrap();

    assert!(out.contains("\"graphdup-0\" [label=\"2:+1\"];"));
    assert!(out.contains("\"graphdup-2\" [label=\"2:+0\"];"));
    assert!(out.contains("\"graphdup-1\" [shape=point];"));
    assert!(out.contains("\"graphdup-0\" -> \"graphdup-2\";"));
    assert!(out.ends_with(" }\n}"));
}

/// A keyed record compared only by its key, with lookups by the bare key.
#[derive(Debug, Clone)]
struct Entry {
    key: u32,
    name: &'static str,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Entry {}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Borrow<u32> for Entry {
    fn borrow(&self) -> &u32 {
        &self.key
    }
}

#[test]
fn keyed_entries() {
    let mut tree = AvlTree::new();
    tree.insert(Entry { key: 3, name: "three" });
    tree.insert(Entry { key: 1, name: "one" });
    tree.insert(Entry { key: 4, name: "four" });
    tree.insert(Entry { key: 1, name: "uno" });
    tree.insert(Entry { key: 5, name: "five" });

    assert_eq!(tree.find(&3u32).map(|e| e.name), Some("three"));
    assert!(matches!(tree.find(&1u32).map(|e| e.name), Some("one" | "uno")));
    assert_eq!(tree.find(&2u32), None);

    // 3 has two children, so its in-order predecessor "uno" moves into its place.
    assert_eq!(tree.remove(&3u32).map(|e| e.name), Some("three"));
    tree.assert_invariants();
    assert_eq!(
        tree.iter().map(|e| e.name).collect::<Vec<_>>(),
        ["one", "uno", "four", "five"]
    );

    assert_eq!(tree.remove(&1u32).map(|e| e.name), Some("uno"));
    tree.assert_invariants();
    assert_eq!(
        tree.iter().map(|e| e.name).collect::<Vec<_>>(),
        ["one", "four", "five"]
    );
}

#[test]
fn drain_with_duplicates() {
    model::run_drain(
        vec![5, 1, 5, 9, 1, 1, 7, 3, 5, 0],
        vec![4, 0, 7, 2, 2, 1, 3, 0, 1, 0],
    );
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn multiset_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_multiset_equivalence(ops);
    }

    #[test]
    fn drain_in_any_order(
        values in proptest::collection::vec(0u32..64, 0..200),
        removals in proptest::collection::vec(any::<usize>(), 200),
    ) {
        model::run_drain(values, removals);
    }
}
