//! An AVL tree: a height-balanced binary search tree with duplicate keys.
//!
//! The recursive insertion and removal follow Julienne Walker's bounded recursive AVL
//! presentation: every step returns the (possibly rotated) subtree root together with a flag
//! saying whether the height change has been absorbed, and balance factors are patched on the
//! way back up.
//
// Conventions used in comments:
// - The balance factor of a node `x` is `b(x) = h(right(x)) - h(left(x))`.
// - A direction `dir` is `Left` (0) or `Right` (1); `!dir` is the other side. The sign of a
//   direction is -1 for `Left` and +1 for `Right`.
// - A subtree is `done` once the height change caused by an insertion or removal has been
//   absorbed somewhere below the current node.
//
// Invariants, holding whenever no operation is in flight:
// 1. The in-order sequence of keys is non-decreasing.
// 2. `b(x)` is stored exactly in `x.balance`.
// 3. `b(x)` is in {-1, 0, 1}.
//
// Corollary:
// 4. A tree of height `h` has at least `F(h + 2) - 1` nodes, so `h < 1.45 * log2(n + 2)`.

use core::{borrow::Borrow, cmp::Ordering, fmt, mem, ops::Not};

use log::trace;

mod debug;
mod iter;

#[cfg(any(test, feature = "model"))]
pub mod model;

#[cfg(test)]
mod tests;

pub use iter::{IntoIter, Iter};

/// An ordered multiset of keys stored in an AVL tree.
///
/// Keys are compared with their [`Ord`] implementation, which must be a total order
/// consistent with [`Eq`]. An inconsistent implementation does not cause undefined behavior,
/// but lookups and removals may then miss keys that are present.
///
/// Equal keys are all kept: inserting a key never replaces an existing one.
#[derive(Clone)]
pub struct AvlTree<K> {
    root: Link<K>,
    len: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

impl Dir {
    /// The change in balance factor caused by growing the subtree on this side.
    #[inline]
    fn sign(self) -> i8 {
        match self {
            Dir::Left => -1,
            Dir::Right => 1,
        }
    }
}

#[derive(Clone)]
struct Node<K> {
    key: K,
    links: [Link<K>; 2],
    balance: i8,
}

type Link<K> = Option<Box<Node<K>>>;

// Result of one recursive step: the new root of the subtree and whether the height change
// has already been absorbed below.
struct Retrace<K> {
    root: Link<K>,
    done: bool,
}

impl<K> Retrace<K> {
    #[inline]
    fn done(root: Link<K>) -> Retrace<K> {
        Retrace { root, done: true }
    }

    #[inline]
    fn pending(root: Link<K>) -> Retrace<K> {
        Retrace { root, done: false }
    }
}

impl<K> AvlTree<K> {
    /// Returns a new empty tree.
    pub const fn new() -> AvlTree<K> {
        AvlTree { root: None, len: 0 }
    }

    /// Returns `true` if the tree contains no keys.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of keys in the tree, counting duplicates.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Removes every key from the tree.
    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// Returns the number of levels in the tree; `0` for an empty tree.
    ///
    /// This follows the taller side at each node, so it runs in _O(log(n))_ time.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut opt_cur = self.root.as_deref();

        while let Some(cur) = opt_cur {
            height += 1;
            let taller = if cur.balance > 0 { Dir::Right } else { Dir::Left };
            opt_cur = cur.child(taller);
        }

        height
    }

    /// Returns the minimum key of the tree.
    pub fn first(&self) -> Option<&K> {
        self.extreme(Dir::Left)
    }

    /// Returns the maximum key of the tree.
    pub fn last(&self) -> Option<&K> {
        self.extreme(Dir::Right)
    }

    fn extreme(&self, dir: Dir) -> Option<&K> {
        let mut cur = self.root.as_deref()?;

        while let Some(next) = cur.child(dir) {
            cur = next;
        }

        Some(&cur.key)
    }

    /// Returns an iterator over the keys in ascending order.
    ///
    /// Equal keys are yielded in tree order, which is not necessarily insertion order.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(self)
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self)
    where
        K: Ord,
    {
        let (count, _height) = Self::assert_invariants_at(self.root.as_deref());
        assert_eq!(count, self.len, "length counter out of sync");

        let mut keys = self.iter();
        if let Some(mut prev) = keys.next() {
            for key in keys {
                assert!(prev <= key, "in-order sequence is not sorted");
                prev = key;
            }
        }
    }

    // Returns the number of nodes and the height of the subtree.
    fn assert_invariants_at(node: Option<&Node<K>>) -> (usize, i32) {
        let Some(node) = node else {
            return (0, 0);
        };

        let (left_count, left_height) = Self::assert_invariants_at(node.child(Dir::Left));
        let (right_count, right_height) = Self::assert_invariants_at(node.child(Dir::Right));

        let diff = right_height - left_height;
        assert_eq!(
            i32::from(node.balance),
            diff,
            "stored balance factor does not match subtree heights"
        );
        assert!((-1..=1).contains(&diff), "subtree out of balance: {diff}");

        (
            left_count + right_count + 1,
            left_height.max(right_height) + 1,
        )
    }
}

impl<K: Ord> AvlTree<K> {
    /// Inserts `key` into the tree.
    ///
    /// The key is inserted even if equal keys are already present; it is placed after them in
    /// the descent, so equal keys always go to the right of the node they meet.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, key: K) {
        let step = Node::insert(self.root.take(), key);
        self.root = step.root;
        self.len += 1;
    }

    /// Removes one key equal to `key` from the tree and returns it.
    ///
    /// If several equal keys are present, which one is removed is unspecified. If no key
    /// matches, the tree is left untouched and `None` is returned.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut removed = None;
        let step = Node::remove(self.root.take(), key, &mut removed);
        self.root = step.root;

        if removed.is_some() {
            self.len -= 1;
        }

        removed
    }

    /// Returns a reference to a stored key equal to `key`.
    ///
    /// If several equal keys are present, any one of them may be returned.
    pub fn find<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut opt_cur = self.root.as_deref();

        while let Some(cur) = opt_cur {
            match key.cmp(cur.key.borrow()) {
                Ordering::Less => opt_cur = cur.child(Dir::Left),
                Ordering::Equal => return Some(&cur.key),
                Ordering::Greater => opt_cur = cur.child(Dir::Right),
            }
        }

        None
    }

    /// Returns `true` if the tree contains a key equal to `key`.
    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }
}

impl<K> Default for AvlTree<K> {
    fn default() -> Self {
        AvlTree::new()
    }
}

impl<K: fmt::Debug> fmt::Debug for AvlTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: Ord> FromIterator<K> for AvlTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = AvlTree::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord> Extend<K> for AvlTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K> Node<K> {
    fn leaf(key: K) -> Box<Node<K>> {
        Box::new(Node {
            key,
            links: [None, None],
            balance: 0,
        })
    }

    #[inline]
    fn child(&self, dir: Dir) -> Option<&Node<K>> {
        self.links[dir as usize].as_deref()
    }

    #[inline]
    fn child_mut(&mut self, dir: Dir) -> &mut Node<K> {
        self.links[dir as usize]
            .as_deref_mut()
            .expect("rebalanced node must have a child on its heavy side")
    }

    #[inline]
    fn take_child(&mut self, dir: Dir) -> Link<K> {
        self.links[dir as usize].take()
    }

    #[inline]
    fn set_child(&mut self, dir: Dir, child: Link<K>) {
        self.links[dir as usize] = child;
    }

    // Promotes the `!dir` child to subtree root, moving `self` down on the `dir` side.
    //
    // Balance factors are not updated.
    fn rotate_single(mut self: Box<Self>, dir: Dir) -> Box<Self> {
        let mut up = self
            .take_child(!dir)
            .expect("rotated node must have a child on the promoted side");

        self.set_child(!dir, up.take_child(dir));
        up.set_child(dir, Some(self));
        up
    }

    // Promotes the `dir` child of the `!dir` child (the zig-zag grandchild) to subtree root.
    //
    // Balance factors are not updated.
    fn rotate_double(mut self: Box<Self>, dir: Dir) -> Box<Self> {
        let child = self
            .take_child(!dir)
            .expect("rotated node must have a child on the promoted side");

        self.set_child(!dir, Some(child.rotate_single(!dir)));
        self.rotate_single(dir)
    }

    // Sets the balance factors of `self`, its `dir` child `n`, and `n`'s `!dir` child `nn`
    // to their values after `nn` is promoted by a double rotation.
    //
    // `bal` is the sign of the side that was heavy on `self` before the rotation.
    fn adjust_balance(&mut self, dir: Dir, bal: i8) {
        let n = self.child_mut(dir);
        let nn = n.child_mut(!dir);

        let promoted = mem::replace(&mut nn.balance, 0);
        let (root_bal, n_bal) = if promoted == 0 {
            (0, 0)
        } else if promoted == bal {
            (-bal, 0)
        } else {
            (0, bal)
        };

        n.balance = n_bal;
        self.balance = root_bal;
    }

    // Fixes a node whose `dir` side became two levels taller after an insertion.
    //
    // The resulting subtree has the height it had before the insertion.
    fn insert_balance(mut self: Box<Self>, dir: Dir) -> Box<Self> {
        let bal = dir.sign();
        let n = self.child_mut(dir);

        if n.balance == bal {
            trace!("insert: single rotation toward {:?}", !dir);
            n.balance = 0;
            self.balance = 0;
            self.rotate_single(!dir)
        } else {
            trace!("insert: double rotation toward {:?}", !dir);
            self.adjust_balance(dir, bal);
            self.rotate_double(!dir)
        }
    }

    // Fixes a node whose `dir` side became two levels shorter after a removal.
    fn remove_balance(mut self: Box<Self>, dir: Dir) -> Retrace<K> {
        let bal = dir.sign();
        let n = self.child_mut(!dir);

        if n.balance == -bal {
            trace!("remove: single rotation toward {dir:?}");
            n.balance = 0;
            self.balance = 0;
            Retrace::pending(Some(self.rotate_single(dir)))
        } else if n.balance == bal {
            trace!("remove: double rotation toward {dir:?}");
            self.adjust_balance(!dir, -bal);
            Retrace::pending(Some(self.rotate_double(dir)))
        } else {
            // The sibling is perfectly balanced, so the rotation keeps the subtree height.
            trace!("remove: single rotation toward {dir:?}, height kept");
            n.balance = bal;
            self.balance = -bal;
            Retrace::done(Some(self.rotate_single(dir)))
        }
    }

    // Updates `self` after its `dir` subtree lost one level of height.
    fn retrace_removal(mut self: Box<Self>, dir: Dir) -> Retrace<K> {
        self.balance -= dir.sign();

        match self.balance {
            -1 | 1 => Retrace::done(Some(self)),
            0 => Retrace::pending(Some(self)),
            _ => self.remove_balance(dir),
        }
    }

    // Detaches the rightmost node of the subtree, returning the rebalanced remainder and the
    // detached node's key.
    fn remove_max(mut self: Box<Self>) -> (Retrace<K>, K) {
        let Some(right) = self.take_child(Dir::Right) else {
            let Node {
                key,
                links: [left, _],
                ..
            } = *self;
            return (Retrace::pending(left), key);
        };

        let (step, key) = right.remove_max();
        self.set_child(Dir::Right, step.root);

        if step.done {
            (Retrace::done(Some(self)), key)
        } else {
            (self.retrace_removal(Dir::Right), key)
        }
    }
}

impl<K: Ord> Node<K> {
    fn insert(link: Link<K>, key: K) -> Retrace<K> {
        let Some(mut root) = link else {
            return Retrace::pending(Some(Node::leaf(key)));
        };

        let dir = if root.key > key {
            Dir::Left
        } else {
            Dir::Right
        };

        let step = Node::insert(root.take_child(dir), key);
        root.set_child(dir, step.root);

        if step.done {
            return Retrace::done(Some(root));
        }

        root.balance += dir.sign();

        match root.balance {
            0 => Retrace::done(Some(root)),
            -1 | 1 => Retrace::pending(Some(root)),
            _ => Retrace::done(Some(root.insert_balance(dir))),
        }
    }

    fn remove<Q>(link: Link<K>, key: &Q, removed: &mut Option<K>) -> Retrace<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(mut root) = link else {
            return Retrace::done(None);
        };

        let dir = match key.cmp(root.key.borrow()) {
            Ordering::Less => Dir::Left,
            Ordering::Greater => Dir::Right,
            Ordering::Equal => {
                if root.child(Dir::Left).is_none() || root.child(Dir::Right).is_none() {
                    let Node {
                        key,
                        links: [left, right],
                        ..
                    } = *root;
                    *removed = Some(key);
                    return Retrace::pending(left.or(right));
                }

                // Two children: the in-order predecessor's node is released and its key takes
                // the place of the matched one.
                let (step, heir) = root
                    .take_child(Dir::Left)
                    .expect("node has two children")
                    .remove_max();
                root.set_child(Dir::Left, step.root);
                *removed = Some(mem::replace(&mut root.key, heir));

                if step.done {
                    return Retrace::done(Some(root));
                }
                return root.retrace_removal(Dir::Left);
            }
        };

        let step = Node::remove(root.take_child(dir), key, removed);
        root.set_child(dir, step.root);

        if step.done {
            Retrace::done(Some(root))
        } else {
            root.retrace_removal(dir)
        }
    }
}
