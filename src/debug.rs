extern crate alloc;

use alloc::{collections::VecDeque, string::String};
use core::fmt;

use crate::{AvlTree, Dir, Node};

impl<K: fmt::Debug> AvlTree<K> {
    /// Writes the tree in pre-order, one node per line, indenting each level by two spaces.
    ///
    /// Each line holds the key and its balance factor; missing children are written as `nil`.
    pub fn dump<W: fmt::Write>(&self, mut w: W) -> fmt::Result {
        Self::dump_at(self.root.as_deref(), "", &mut w)
    }

    fn dump_at<W: fmt::Write>(node: Option<&Node<K>>, indent: &str, w: &mut W) -> fmt::Result {
        let Some(node) = node else {
            return writeln!(w, "{indent}nil");
        };

        writeln!(w, "{indent}{:?} ({:+})", node.key, node.balance)?;

        if node.links.iter().all(Option::is_none) {
            return Ok(());
        }

        let mut indent = String::from(indent);
        indent.push_str("  ");
        Self::dump_at(node.child(Dir::Left), &indent, w)?;
        Self::dump_at(node.child(Dir::Right), &indent, w)
    }

    /// Writes the tree as a Graphviz digraph named `name`, one rank per tree level.
    pub fn dotgraph<W: fmt::Write>(&self, name: &str, mut w: W) -> fmt::Result {
        let root = match self.root.as_deref() {
            Some(r) => r,
            None => return write!(w, "digraph \"graph-{name}\" {{}}"),
        };

        enum Item<'tree, K> {
            Node(&'tree Node<K>, u32),
            Missing(u32),
        }

        // Keys may repeat, so vertices are named by visit order instead.
        let mut next_id = 0;
        let mut queue = VecDeque::new();
        queue.push_back(Item::Node(root, next_id));
        next_id += 1;

        write!(
            w,
            "digraph \"graph-{name}\" {{\n subgraph \"subgraph-{name}\" {{"
        )?;

        let mut links = String::new();

        loop {
            use fmt::Write;
            let remaining = queue.len();
            if remaining == 0 {
                break;
            }

            write!(w, "{{rank=same; ")?;

            for _rank_node in 0..remaining {
                let (node, id) = match queue.pop_front().unwrap() {
                    Item::Node(node, id) => (node, id),
                    Item::Missing(id) => {
                        write!(w, "\"graph{name}-{id}\" [shape=point]; ")?;
                        continue;
                    }
                };

                write!(
                    w,
                    "\"graph{name}-{id}\" [label=\"{:?}:{:+}\"]; ",
                    node.key, node.balance
                )?;

                for dir in [Dir::Left, Dir::Right] {
                    let child_id = next_id;
                    next_id += 1;

                    match node.child(dir) {
                        Some(child) => queue.push_back(Item::Node(child, child_id)),
                        None => queue.push_back(Item::Missing(child_id)),
                    }

                    writeln!(links, "\"graph{name}-{id}\" -> \"graph{name}-{child_id}\";")?;
                }
            }

            writeln!(w, "}}")?;
        }

        w.write_str(&links)?;

        w.write_str(" }\n}")
    }
}
