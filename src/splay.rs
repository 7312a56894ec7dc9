use std::marker::PhantomData;

use itertools::Itertools;

use crate::arena::Arena;
use crate::config::{ConfigT, DebugWriter, StandardConfig};
use crate::debug;
use crate::traverse::TreeNav;

struct Node<K> {
    key: K,
    left: Option<usize>,
    right: Option<usize>,
    parent: Option<usize>,
}

impl<K> Node<K> {
    fn new(key: K, parent: Option<usize>) -> Self {
        Node {
            key,
            left: None,
            right: None,
            parent,
        }
    }
}

/// Access-balanced search tree over ordered keys. No balance bound is
/// maintained; instead every insert, search, or remove finishes by splaying
/// the touched node (or the last node on the failed search path) to the root,
/// which keeps the amortized cost of a sequence logarithmic. Duplicate keys
/// are accepted and routed to the right subtree.
pub struct SplayTree<K: Ord + Clone, Config: ConfigT = StandardConfig> {
    nodes: Arena<Node<K>>,
    root: Option<usize>,
    debug_writer: DebugWriter,
    _config: PhantomData<Config>,
}

impl<K: Ord + Clone, Config: ConfigT> SplayTree<K, Config> {
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
        SplayTree {
            nodes: Arena::new(),
            root: None,
            debug_writer,
            _config: PhantomData,
        }
    }

    /// Promote `p`'s right child into `p`'s position, fixing the parent link
    /// of the promoted node, of the transplanted middle subtree, and of the
    /// grandparent's child slot. Does not touch `self.root`; `splay` owns
    /// that.
    fn rotate_left(&mut self, p: usize) {
        let top = self.nodes[p].right.expect("rotate-left with no right child");
        let parent = self.nodes[p].parent;
        self.nodes[top].parent = parent;
        if let Some(g) = parent {
            if self.nodes[g].left == Some(p) {
                self.nodes[g].left = Some(top);
            } else {
                self.nodes[g].right = Some(top);
            }
        }
        let mid = self.nodes[top].left;
        self.nodes[p].right = mid;
        if let Some(m) = mid {
            self.nodes[m].parent = Some(p);
        }
        self.nodes[top].left = Some(p);
        self.nodes[p].parent = Some(top);
    }

    fn rotate_right(&mut self, p: usize) {
        let top = self.nodes[p].left.expect("rotate-right with no left child");
        let parent = self.nodes[p].parent;
        self.nodes[top].parent = parent;
        if let Some(g) = parent {
            if self.nodes[g].left == Some(p) {
                self.nodes[g].left = Some(top);
            } else {
                self.nodes[g].right = Some(top);
            }
        }
        let mid = self.nodes[top].right;
        self.nodes[p].left = mid;
        if let Some(m) = mid {
            self.nodes[m].parent = Some(p);
        }
        self.nodes[top].right = Some(p);
        self.nodes[p].parent = Some(top);
    }

    /// Rotate `x` up until it is the root. Three cases per step, decided by
    /// `x`'s side under its parent and the parent's side under the
    /// grandparent.
    fn splay(&mut self, x: usize) {
        while let Some(p) = self.nodes[x].parent {
            match self.nodes[p].parent {
                None => {
                    debug!(self.debug_writer, "zig {}", x);
                    if self.nodes[p].left == Some(x) {
                        self.rotate_right(p);
                    } else {
                        self.rotate_left(p);
                    }
                }
                Some(g) => {
                    let x_is_left = self.nodes[p].left == Some(x);
                    let p_is_left = self.nodes[g].left == Some(p);
                    match (x_is_left, p_is_left) {
                        (true, true) => {
                            debug!(self.debug_writer, "zig-zig {}", x);
                            // Grandparent before parent; the other order
                            // loses the amortized bound.
                            self.rotate_right(g);
                            self.rotate_right(p);
                        }
                        (false, false) => {
                            debug!(self.debug_writer, "zig-zig {}", x);
                            self.rotate_left(g);
                            self.rotate_left(p);
                        }
                        (true, false) => {
                            debug!(self.debug_writer, "zig-zag {}", x);
                            self.rotate_right(p);
                            self.rotate_left(g);
                        }
                        (false, true) => {
                            debug!(self.debug_writer, "zig-zag {}", x);
                            self.rotate_left(p);
                            self.rotate_right(g);
                        }
                    }
                }
            }
        }
        self.root = Some(x);
    }

    /// Walk toward `key`, stopping at the match or at the last node before a
    /// missing child. `None` only on an empty tree. Iterative on purpose: the
    /// pre-splay tree can be a spine as deep as the node count.
    fn descend(&self, key: &K) -> Option<usize> {
        let mut p = self.root?;
        loop {
            if *key < self.nodes[p].key {
                match self.nodes[p].left {
                    Some(l) => p = l,
                    None => break,
                }
            } else if *key > self.nodes[p].key {
                match self.nodes[p].right {
                    Some(r) => p = r,
                    None => break,
                }
            } else {
                break;
            }
        }
        Some(p)
    }

    pub fn insert(&mut self, key: K) {
        let Some(mut p) = self.root else {
            let id = self.nodes.alloc(Node::new(key, None));
            self.root = Some(id);
            if Config::CHECK_INVARIANTS {
                self.check_invariants();
            }
            return;
        };
        let id = loop {
            if key < self.nodes[p].key {
                match self.nodes[p].left {
                    Some(l) => p = l,
                    None => {
                        let id = self.nodes.alloc(Node::new(key, Some(p)));
                        self.nodes[p].left = Some(id);
                        break id;
                    }
                }
            } else {
                // Ties go right.
                match self.nodes[p].right {
                    Some(r) => p = r,
                    None => {
                        let id = self.nodes.alloc(Node::new(key, Some(p)));
                        self.nodes[p].right = Some(id);
                        break id;
                    }
                }
            }
        };
        self.splay(id);
        if Config::CHECK_INVARIANTS {
            self.check_invariants();
        }
    }

    /// Look for `key`. The last node visited is splayed to the root whether
    /// or not the key was found, so even a miss reshapes the tree; the new
    /// root is then `key`'s in-order neighbor.
    pub fn search(&mut self, key: &K) -> bool {
        let Some(p) = self.descend(key) else {
            return false;
        };
        self.splay(p);
        if Config::CHECK_INVARIANTS {
            self.check_invariants();
        }
        self.nodes[p].key == *key
    }

    /// Remove one node carrying `key`; `false` if no such node. A miss still
    /// splays the nearest node, exactly like `search`.
    pub fn remove(&mut self, key: &K) -> bool {
        let Some(p) = self.descend(key) else {
            return false;
        };
        self.splay(p);
        if self.nodes[p].key != *key {
            if Config::CHECK_INVARIANTS {
                self.check_invariants();
            }
            return false;
        }
        let left = self.nodes[p].left;
        let right = self.nodes[p].right;
        self.nodes.free(p);
        match (left, right) {
            (None, None) => {
                self.root = None;
            }
            (Some(l), None) => {
                self.nodes[l].parent = None;
                self.root = Some(l);
            }
            (None, Some(r)) => {
                self.nodes[r].parent = None;
                self.root = Some(r);
            }
            (Some(l), Some(r)) => {
                // Splay the right subtree's minimum to its root, then hang
                // the detached left subtree off it. The minimum has no left
                // child, so the slot is always free.
                self.nodes[r].parent = None;
                self.root = Some(r);
                let min = self.min_node(r);
                self.splay(min);
                self.nodes[min].left = Some(l);
                self.nodes[l].parent = Some(min);
            }
        }
        if Config::CHECK_INVARIANTS {
            self.check_invariants();
        }
        true
    }

    fn min_node(&self, mut idx: usize) -> usize {
        while let Some(l) = self.nodes[idx].left {
            idx = l;
        }
        idx
    }

    /// Key at the root, i.e. whatever the last access left on top.
    pub fn root_key(&self) -> Option<&K> {
        self.root.map(|i| &self.nodes[i].key)
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

    fn check_links(&self, i: usize, parent: Option<usize>) {
        assert_eq!(
            self.nodes[i].parent, parent,
            "parent link mismatch at slot {}",
            i
        );
        if let Some(l) = self.nodes[i].left {
            self.check_links(l, Some(i));
        }
        if let Some(r) = self.nodes[i].right {
            self.check_links(r, Some(i));
        }
    }

    fn check_invariants(&self) {
        if let Some(r) = self.root {
            self.check_links(r, None);
        }
        assert!(
            self.inorder().tuple_windows().all(|(a, b)| a <= b),
            "inorder sequence not sorted"
        );
    }
}

impl<K: Ord + Clone, Config: ConfigT> Default for SplayTree<K, Config> {
    fn default() -> Self {
        SplayTree::new()
    }
}

impl<K: Ord + Clone, Config: ConfigT> TreeNav for SplayTree<K, Config> {
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
