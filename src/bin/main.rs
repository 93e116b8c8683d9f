use std::{borrow::Borrow, cmp::Ordering, env, fmt, str::FromStr};

use avl_tree::AvlTree;
use log::{info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

// A record ordered by `key` alone, so equal keys can carry different names.
#[derive(Debug)]
struct Named {
    key: i32,
    name: &'static str,
}

impl Named {
    fn new(key: i32, name: &'static str) -> Named {
        Named { key, name }
    }
}

impl PartialEq for Named {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Named {}

impl Ord for Named {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl PartialOrd for Named {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Borrow<i32> for Named {
    fn borrow(&self) -> &i32 {
        &self.key
    }
}

fn print_tree<K: fmt::Debug>(tree: &AvlTree<K>) {
    let mut out = String::new();
    tree.dump(&mut out).expect("writing to a String cannot fail");
    print!("{out}");
}

fn main() {
    // Pass `trace` to watch every rotation.
    let level = env::args()
        .nth(1)
        .and_then(|arg| LevelFilter::from_str(&arg).ok())
        .unwrap_or(LevelFilter::Info);

    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .expect("logger already initialized");

    let mut tree: AvlTree<Named> = AvlTree::new();
    println!("Empty tree:");
    print_tree(&tree);

    println!("\nInsert test:");
    for (key, name) in [(3, "three"), (1, "one"), (4, "four"), (1, "uno"), (5, "five")] {
        info!("inserting {key} ({name})");
        tree.insert(Named::new(key, name));
        tree.assert_invariants();
    }
    print_tree(&tree);

    println!("\nFind test:");
    for key in [3i32, 1, 4, 5, 2] {
        println!("{key}: {:?}", tree.find(&key).map(|named| named.name));
    }

    println!("\nRemove test:");
    for key in [3i32, 1] {
        let removed = tree.remove(&key);
        info!("removed {removed:?}");
        tree.assert_invariants();
    }
    print_tree(&tree);

    info!("{} keys left, height {}", tree.len(), tree.height());
}
