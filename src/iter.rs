extern crate alloc;

use alloc::vec::Vec;
use core::iter::FusedIterator;

use crate::{AvlTree, Dir, Link, Node};

/// An in-order iterator over the keys of an [`AvlTree`].
///
/// Created by [`AvlTree::iter`].
pub struct Iter<'tree, K> {
    // Nodes whose left subtree has been exhausted but which have not been yielded yet. The
    // top of the stack is the next key.
    stack: Vec<&'tree Node<K>>,
    len: usize,
}

impl<'tree, K> Iter<'tree, K> {
    pub(crate) fn new(tree: &'tree AvlTree<K>) -> Self {
        let mut iter = Iter {
            stack: Vec::with_capacity(tree.height()),
            len: tree.len(),
        };
        iter.descend_left(tree.root.as_deref());
        iter
    }

    // Upon entering a new subtree, stack the path down to its minimum element.
    fn descend_left(&mut self, mut opt_cur: Option<&'tree Node<K>>) {
        while let Some(cur) = opt_cur {
            self.stack.push(cur);
            opt_cur = cur.child(Dir::Left);
        }
    }
}

impl<'tree, K> Iterator for Iter<'tree, K> {
    type Item = &'tree K;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.stack.pop()?;
        self.descend_left(cur.child(Dir::Right));
        self.len -= 1;

        Some(&cur.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}

impl<K> Clone for Iter<'_, K> {
    fn clone(&self) -> Self {
        Iter {
            stack: self.stack.clone(),
            len: self.len,
        }
    }
}

/// An owning in-order iterator over the keys of an [`AvlTree`].
///
/// Created by the [`IntoIterator`] implementation of [`AvlTree`].
pub struct IntoIter<K> {
    stack: Vec<Box<Node<K>>>,
    len: usize,
}

impl<K> IntoIter<K> {
    fn descend_left(&mut self, mut link: Link<K>) {
        while let Some(mut cur) = link {
            link = cur.take_child(Dir::Left);
            self.stack.push(cur);
        }
    }
}

impl<K> Iterator for IntoIter<K> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.stack.pop()?;

        // The left link was already detached by `descend_left`.
        let Node {
            key,
            links: [_, right],
            ..
        } = *cur;
        self.descend_left(right);
        self.len -= 1;

        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<K> ExactSizeIterator for IntoIter<K> {}

impl<K> FusedIterator for IntoIter<K> {}

impl<K> IntoIterator for AvlTree<K> {
    type Item = K;
    type IntoIter = IntoIter<K>;

    fn into_iter(mut self) -> Self::IntoIter {
        let mut iter = IntoIter {
            stack: Vec::with_capacity(self.height()),
            len: self.len,
        };
        iter.descend_left(self.root.take());
        iter
    }
}

impl<'tree, K> IntoIterator for &'tree AvlTree<K> {
    type Item = &'tree K;
    type IntoIter = Iter<'tree, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
