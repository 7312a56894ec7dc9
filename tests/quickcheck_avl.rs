use quickcheck::{Arbitrary, Gen, TestResult};
use quickcheck_macros::*;

use baltree::avl::AvlTree;
use baltree::config::CheckedConfig;

// CheckedConfig re-validates heights, balance, and ordering after every
// mutation, so any structural break fails the run even if the content still
// matches the model.
type Tree = AvlTree<u16, CheckedConfig>;

const KEYSPACE: u16 = 64;

#[derive(Clone, Debug)]
enum TreeOp {
    Insert(u16),
    Remove(u16),
    Search(u16),
}

impl Arbitrary for TreeOp {
    fn arbitrary(g: &mut Gen) -> Self {
        let op = usize::arbitrary(g) % 100;
        // Small keyspace so removes hit and duplicates occur.
        let key = u16::arbitrary(g) % KEYSPACE;
        match op {
            0..45 => TreeOp::Insert(key),
            45..80 => TreeOp::Remove(key),
            80..100 => TreeOp::Search(key),
            _ => unreachable!(),
        }
    }
}

#[derive(Clone, Debug)]
struct Ops {
    ops: Vec<TreeOp>,
}

impl Arbitrary for Ops {
    fn arbitrary(g: &mut Gen) -> Self {
        let ops = Vec::<TreeOp>::arbitrary(g);
        Ops { ops }
    }
}

/// Sorted-`Vec` multiset used as the reference.
struct Naive {
    keys: Vec<u16>,
}

impl Naive {
    fn new() -> Self {
        Naive { keys: Vec::new() }
    }

    fn insert(&mut self, key: u16) {
        let pos = self.keys.partition_point(|&x| x <= key);
        self.keys.insert(pos, key);
    }

    fn remove(&mut self, key: u16) -> bool {
        match self.keys.binary_search(&key) {
            Ok(pos) => {
                self.keys.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    fn contains(&self, key: u16) -> bool {
        self.keys.binary_search(&key).is_ok()
    }
}

fn fib(n: usize) -> usize {
    let (mut a, mut b) = (0usize, 1usize);
    for _ in 0..n {
        let next = a + b;
        a = b;
        b = next;
    }
    a
}

/// The sparsest tree of height h has fib(h + 2) - 1 nodes; more height than
/// that for the live node count means the balance discipline broke.
fn height_is_plausible(tree: &Tree) -> bool {
    fib(tree.height() + 2) - 1 <= tree.len()
}

#[quickcheck]
fn qc_avl_matches_naive(initial: Vec<u16>, ops: Ops) -> TestResult {
    let mut tree = Tree::new();
    let mut naive = Naive::new();
    for &k in &initial {
        tree.insert(k % KEYSPACE);
        naive.insert(k % KEYSPACE);
    }

    for op in &ops.ops {
        match op {
            TreeOp::Insert(k) => {
                tree.insert(*k);
                naive.insert(*k);
            }
            TreeOp::Remove(k) => {
                let got = tree.remove(k);
                let want = naive.remove(*k);
                if got != want {
                    println!("remove({}) diverged: tree {} naive {}", k, got, want);
                    return TestResult::failed();
                }
            }
            TreeOp::Search(k) => {
                let got = tree.search(k).is_some();
                let want = naive.contains(*k);
                if got != want {
                    println!("search({}) diverged: tree {} naive {}", k, got, want);
                    return TestResult::failed();
                }
            }
        }

        let inorder: Vec<u16> = tree.inorder().copied().collect();
        if inorder != naive.keys {
            println!(
                "content diverged after {:?}:\ntree  {:?}\nnaive {:?}",
                op, inorder, naive.keys
            );
            return TestResult::failed();
        }
        if !height_is_plausible(&tree) {
            println!(
                "height {} too large for {} nodes",
                tree.height(),
                tree.len()
            );
            return TestResult::failed();
        }
    }

    TestResult::passed()
}

#[quickcheck]
fn qc_avl_absent_search_is_idempotent(keys: Vec<u16>, probe: u16) -> TestResult {
    let mut tree = Tree::new();
    for &k in &keys {
        tree.insert(k % KEYSPACE);
    }
    // Forced outside the populated keyspace, so the probe is always absent.
    let probe = KEYSPACE + probe % KEYSPACE;

    let before: Vec<u16> = tree.preorder().copied().collect();
    if tree.search(&probe).is_some() || tree.search(&probe).is_some() {
        return TestResult::failed();
    }
    if tree.preorder().copied().collect::<Vec<_>>() != before {
        println!("absent search reshaped the tree");
        return TestResult::failed();
    }
    TestResult::passed()
}

#[quickcheck]
fn qc_avl_remove_all_duplicates(key: u16, copies: u8) -> TestResult {
    let copies = usize::from(copies % 8) + 1;
    let mut tree = Tree::new();
    for _ in 0..copies {
        tree.insert(key);
    }
    for left in (0..copies).rev() {
        if !tree.remove(&key) {
            println!("copy {} missing", left);
            return TestResult::failed();
        }
        if tree.len() != left {
            return TestResult::failed();
        }
    }
    TestResult::from_bool(tree.is_empty() && !tree.remove(&key))
}
