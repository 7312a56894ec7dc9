use std::cmp::max;
use std::marker::PhantomData;

use itertools::Itertools;

use crate::arena::Arena;
use crate::config::{ConfigT, DebugWriter, StandardConfig};
use crate::debug;
use crate::traverse::TreeNav;

struct Node<K> {
    key: K,
    height: usize,
    left: Option<usize>,
    right: Option<usize>,
}

impl<K> Node<K> {
    fn new(key: K) -> Self {
        Node {
            key,
            height: 1,
            left: None,
            right: None,
        }
    }
}

/// Lets the deletion walk re-descend either by key (the caller's request) or
/// by node index (the successor slot, which may share its key with other
/// nodes and must not be found by key comparison alone).
enum KeyOrIdx<K> {
    Key(K),
    Index(usize),
}

/// Height-balanced search tree over ordered keys. Every node's two subtree
/// heights differ by at most one; each insert or remove restores that bound
/// on its way back up with at most one single or double rotation per level.
/// Duplicate keys are accepted and routed to the right subtree.
pub struct AvlTree<K: Ord + Clone, Config: ConfigT = StandardConfig> {
    nodes: Arena<Node<K>>,
    root: Option<usize>,
    debug_writer: DebugWriter,
    _config: PhantomData<Config>,
}

impl<K: Ord + Clone, Config: ConfigT> AvlTree<K, Config> {
    pub fn new() -> Self {
        Self::new_with_debug_writer::<String>(None)
    }

    pub fn new_with_debug_writer<Writer: std::fmt::Write + 'static>(
        debug_writer: Option<Writer>,
    ) -> Self {
        let debug_writer: DebugWriter = match debug_writer {
            Some(w) => Some(std::cell::RefCell::new(Box::new(w))),
            None => None,
        };
        AvlTree {
            nodes: Arena::new(),
            root: None,
            debug_writer,
            _config: PhantomData,
        }
    }

    fn height_of(&self, idx: Option<usize>) -> usize {
        idx.map_or(0, |i| self.nodes[i].height)
    }

    fn update_height(&mut self, idx: usize) {
        let lh = self.height_of(self.nodes[idx].left);
        let rh = self.height_of(self.nodes[idx].right);
        self.nodes[idx].height = max(lh, rh) + 1;
    }

    /// Right subtree height minus left subtree height.
    fn balance_factor(&self, idx: usize) -> isize {
        let lh = self.height_of(self.nodes[idx].left) as isize;
        let rh = self.height_of(self.nodes[idx].right) as isize;
        rh - lh
    }

    /// Promote `x`'s right child; heights recomputed demoted node first.
    fn rotate_left(&mut self, x: usize) -> usize {
        debug!(self.debug_writer, "rotate-left {}", x);
        let y = self.nodes[x].right.expect("rotate-left with no right child");
        let mid = self.nodes[y].left;
        self.nodes[y].left = Some(x);
        self.nodes[x].right = mid;
        self.update_height(x);
        self.update_height(y);
        y
    }

    /// Promote `y`'s left child; mirror of `rotate_left`.
    fn rotate_right(&mut self, y: usize) -> usize {
        debug!(self.debug_writer, "rotate-right {}", y);
        let x = self.nodes[y].left.expect("rotate-right with no left child");
        let mid = self.nodes[x].right;
        self.nodes[x].right = Some(y);
        self.nodes[y].left = mid;
        self.update_height(y);
        self.update_height(x);
        x
    }

    /// After an insertion the freshly placed key tells us which grandchild
    /// subtree grew, so the single/double choice compares against it.
    fn rebalance_after_insert(&mut self, idx: usize, key: &K) -> usize {
        self.update_height(idx);
        let bf = self.balance_factor(idx);
        if bf > 1 {
            let r = self.nodes[idx].right.unwrap();
            if *key < self.nodes[r].key {
                self.nodes[idx].right = Some(self.rotate_right(r));
            }
            return self.rotate_left(idx);
        }
        if bf < -1 {
            let l = self.nodes[idx].left.unwrap();
            if *key >= self.nodes[l].key {
                self.nodes[idx].left = Some(self.rotate_left(l));
            }
            return self.rotate_right(idx);
        }
        idx
    }

    /// After a deletion there is no inserted key to compare against; the
    /// heavy child's own balance factor decides single vs double.
    fn rebalance_after_remove(&mut self, idx: usize) -> usize {
        self.update_height(idx);
        let bf = self.balance_factor(idx);
        if bf > 1 {
            let r = self.nodes[idx].right.unwrap();
            if self.balance_factor(r) < 0 {
                self.nodes[idx].right = Some(self.rotate_right(r));
            }
            return self.rotate_left(idx);
        }
        if bf < -1 {
            let l = self.nodes[idx].left.unwrap();
            if self.balance_factor(l) > 0 {
                self.nodes[idx].left = Some(self.rotate_left(l));
            }
            return self.rotate_right(idx);
        }
        idx
    }

    fn insert_at(&mut self, idx: Option<usize>, key: &K) -> usize {
        if let Some(i) = idx {
            if *key < self.nodes[i].key {
                let l = self.insert_at(self.nodes[i].left, key);
                self.nodes[i].left = Some(l);
            } else {
                // Ties go right.
                let r = self.insert_at(self.nodes[i].right, key);
                self.nodes[i].right = Some(r);
            }
            self.rebalance_after_insert(i, key)
        } else {
            self.nodes.alloc(Node::new(key.clone()))
        }
    }

    pub fn insert(&mut self, key: K) {
        let r = self.insert_at(self.root, &key);
        self.root = Some(r);
        if Config::CHECK_INVARIANTS {
            self.check_invariants();
        }
    }

    pub fn search(&self, key: &K) -> Option<&K> {
        let mut cur = self.root;
        while let Some(i) = cur {
            if *key < self.nodes[i].key {
                cur = self.nodes[i].left;
            } else if *key > self.nodes[i].key {
                cur = self.nodes[i].right;
            } else {
                return Some(&self.nodes[i].key);
            }
        }
        None
    }

    fn min_node(&self, mut idx: usize) -> usize {
        while let Some(l) = self.nodes[idx].left {
            idx = l;
        }
        idx
    }

    fn remove_at(
        &mut self,
        idx: Option<usize>,
        target: KeyOrIdx<&K>,
        removed: &mut bool,
    ) -> Option<usize> {
        let i = idx?;
        let cmp = match target {
            KeyOrIdx::Key(k) => k.cmp(&self.nodes[i].key),
            KeyOrIdx::Index(t) => self.nodes[t].key.cmp(&self.nodes[i].key),
        };
        match cmp {
            std::cmp::Ordering::Less => {
                let l = self.remove_at(self.nodes[i].left, target, removed);
                self.nodes[i].left = l;
            }
            std::cmp::Ordering::Greater => {
                let r = self.remove_at(self.nodes[i].right, target, removed);
                self.nodes[i].right = r;
            }
            std::cmp::Ordering::Equal => {
                if self.nodes[i].left.is_none() {
                    let r = self.nodes[i].right;
                    self.nodes.free(i);
                    *removed = true;
                    return r;
                } else if self.nodes[i].right.is_none() {
                    let l = self.nodes[i].left;
                    self.nodes.free(i);
                    *removed = true;
                    return l;
                } else {
                    // Exchange keys with the in-order successor, then delete
                    // the successor's slot (at most one child) by index.
                    let succ = self.min_node(self.nodes[i].right.unwrap());
                    let (a, b) = self.nodes.pair_mut(i, succ);
                    std::mem::swap(&mut a.key, &mut b.key);
                    let r = self.remove_at(self.nodes[i].right, KeyOrIdx::Index(succ), removed);
                    self.nodes[i].right = r;
                }
            }
        }
        Some(self.rebalance_after_remove(i))
    }

    /// Remove one node carrying `key`; `false` if no such node.
    pub fn remove(&mut self, key: &K) -> bool {
        let mut removed = false;
        self.root = self.remove_at(self.root, KeyOrIdx::Key(key), &mut removed);
        if Config::CHECK_INVARIANTS {
            self.check_invariants();
        }
        removed
    }

    /// Height of the whole tree; 0 when empty.
    pub fn height(&self) -> usize {
        self.height_of(self.root)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    pub fn preorder(&self) -> impl Iterator<Item = &K> + '_ {
        self.preorder_ids().map(|i| &self.nodes[i].key)
    }

    pub fn inorder(&self) -> impl Iterator<Item = &K> + '_ {
        self.inorder_ids().map(|i| &self.nodes[i].key)
    }

    pub fn postorder(&self) -> impl Iterator<Item = &K> + '_ {
        self.postorder_ids().map(|i| &self.nodes[i].key)
    }

    pub fn levelorder(&self) -> impl Iterator<Item = &K> + '_ {
        self.levelorder_ids().map(|i| &self.nodes[i].key)
    }

    fn check_subtree(&self, idx: Option<usize>) -> usize {
        let Some(i) = idx else {
            return 0;
        };
        let lh = self.check_subtree(self.nodes[i].left);
        let rh = self.check_subtree(self.nodes[i].right);
        assert_eq!(
            self.nodes[i].height,
            max(lh, rh) + 1,
            "stale cached height at slot {}",
            i
        );
        assert!(
            (rh as isize - lh as isize).abs() <= 1,
            "balance bound violated at slot {}",
            i
        );
        max(lh, rh) + 1
    }

    fn check_invariants(&self) {
        self.check_subtree(self.root);
        assert!(
            self.inorder().tuple_windows().all(|(a, b)| a <= b),
            "inorder sequence not sorted"
        );
    }
}

impl<K: Ord + Clone, Config: ConfigT> Default for AvlTree<K, Config> {
    fn default() -> Self {
        AvlTree::new()
    }
}

impl<K: Ord + Clone, Config: ConfigT> TreeNav for AvlTree<K, Config> {
    fn root_id(&self) -> Option<usize> {
        self.root
    }

    fn left_of(&self, id: usize) -> Option<usize> {
        self.nodes[id].left
    }

    fn right_of(&self, id: usize) -> Option<usize> {
        self.nodes[id].right
    }
}
