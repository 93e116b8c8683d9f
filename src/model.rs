//! Randomized equivalence testing of [`AvlTree`] against a `BTreeMap`-backed multiset.
//!
//! Shared by the property tests and the fuzz targets.

extern crate std;

use std::{collections::BTreeMap, prelude::v1::*};

use arbitrary::Arbitrary;
use proptest::strategy::{Just, Strategy};

use crate::AvlTree;

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    /// Index into the distinct keys currently stored, so operations hit existing keys.
    Index(usize),
    Random(u32),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in 0u32..1000,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue),
    Find(ItemValue),
    Remove(ItemValue),
    First,
    Last,
    Clear,
}

impl Op {
    fn finalize(self, distinct: &[u32]) -> FinalOp {
        fn get_value(v: &[u32], i: ItemValue) -> u32 {
            match i {
                ItemValue::Index(idx) => {
                    if v.is_empty() {
                        idx as u32
                    } else {
                        v[idx % v.len()]
                    }
                }
                ItemValue::Random(v) => v,
            }
        }

        match self {
            Op::Insert(item) => FinalOp::Insert(get_value(distinct, item)),
            Op::Find(item) => FinalOp::Find(get_value(distinct, item)),
            Op::Remove(item) => FinalOp::Remove(get_value(distinct, item)),
            Op::First => FinalOp::First,
            Op::Last => FinalOp::Last,
            Op::Clear => FinalOp::Clear,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(u32),
    Find(u32),
    Remove(u32),
    First,
    Last,
    Clear,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    // `Clear` is left to the fuzzer so that trees get a chance to grow.
    proptest::prop_oneof![
        4 => value_strategy().prop_map(Op::Insert),
        2 => value_strategy().prop_map(Op::Find),
        3 => value_strategy().prop_map(Op::Remove),
        1 => Just(Op::First),
        1 => Just(Op::Last),
    ]
}

/// A sorted multiset: each key maps to the number of copies stored.
#[derive(Default)]
struct Multiset {
    counts: BTreeMap<u32, usize>,
    len: usize,
}

impl Multiset {
    fn insert(&mut self, key: u32) {
        *self.counts.entry(key).or_insert(0) += 1;
        self.len += 1;
    }

    fn remove(&mut self, key: u32) -> Option<u32> {
        let count = self.counts.get_mut(&key)?;
        *count -= 1;
        if *count == 0 {
            self.counts.remove(&key);
        }
        self.len -= 1;
        Some(key)
    }

    fn distinct(&self) -> Vec<u32> {
        self.counts.keys().copied().collect()
    }

    fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.counts
            .iter()
            .flat_map(|(&key, &count)| core::iter::repeat(key).take(count))
    }
}

pub fn run_multiset_equivalence(ops: Vec<Op>) {
    let mut multiset = Multiset::default();
    let mut avl: AvlTree<u32> = AvlTree::new();

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&multiset.distinct());

        match final_op {
            FinalOp::Insert(value) => {
                multiset.insert(value);
                avl.insert(value);
            }

            FinalOp::Find(value) => {
                let from_multiset = multiset.counts.contains_key(&value).then_some(value);
                let from_avl = avl.find(&value).copied();

                assert_eq!(from_multiset, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Remove(value) => {
                let from_multiset = multiset.remove(value);
                let from_avl = avl.remove(&value);

                assert_eq!(from_multiset, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::First => {
                let from_multiset = multiset.counts.keys().next();
                let from_avl = avl.first();

                assert_eq!(from_multiset, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Last => {
                let from_multiset = multiset.counts.keys().next_back();
                let from_avl = avl.last();

                assert_eq!(from_multiset, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Clear => {
                multiset = Multiset::default();
                avl.clear();
            }
        }

        avl.assert_invariants();
        assert_eq!(multiset.len, avl.len());
        assert!(multiset.iter().eq(avl.iter().copied()));
    }
}

/// Input for removing keys that were bulk-loaded into a tree, in an arbitrary order.
#[derive(Clone, Debug)]
pub struct DrainInput {
    pub values: Vec<u32>,
    pub removals: Vec<usize>,
}

impl<'a> arbitrary::Arbitrary<'a> for DrainInput {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        fn value(u: &mut arbitrary::Unstructured<'_>) -> u32 {
            // Keep the key space small so duplicates are common.
            u8::arbitrary(u).map(u32::from).unwrap_or(0)
        }

        let num_values = u8::arbitrary(u)? % 100;

        let values: Vec<u32> = core::iter::repeat_with(|| value(u))
            .take(num_values.into())
            .collect();

        let removals = core::iter::repeat_with(|| usize::arbitrary(u).unwrap_or(0))
            .take(values.len())
            .collect();

        Ok(DrainInput { values, removals })
    }
}

/// Loads `values`, then removes every one of them, choosing each victim by indexing the
/// remaining keys with the next entry of `removals`.
pub fn run_drain(values: Vec<u32>, removals: Vec<usize>) {
    let mut avl: AvlTree<u32> = values.iter().copied().collect();
    avl.assert_invariants();

    let mut remaining = values;
    remaining.sort_unstable();

    for pick in removals {
        if remaining.is_empty() {
            break;
        }

        let victim = remaining.remove(pick % remaining.len());
        assert_eq!(avl.remove(&victim), Some(victim));

        avl.assert_invariants();
        assert_eq!(remaining.len(), avl.len());
        assert!(remaining.iter().eq(avl.iter()));
    }
}
