use std::collections::VecDeque;
use std::iter;

/// Navigation seam shared by the tree variants: anything that can name its
/// root and walk child links by index gets the four traversal orders for
/// free. The iterators are lazy and hold only their own stack or queue, so a
/// caller can restart a traversal at any time by asking for a fresh one.
pub trait TreeNav {
    fn root_id(&self) -> Option<usize>;
    fn left_of(&self, id: usize) -> Option<usize>;
    fn right_of(&self, id: usize) -> Option<usize>;

    /// Parent, left subtree, right subtree.
    fn preorder_ids(&self) -> impl Iterator<Item = usize> + '_ {
        let mut stack: Vec<usize> = self.root_id().into_iter().collect();
        iter::from_fn(move || {
            let id = stack.pop()?;
            if let Some(r) = self.right_of(id) {
                stack.push(r);
            }
            if let Some(l) = self.left_of(id) {
                stack.push(l);
            }
            Some(id)
        })
    }

    /// Left subtree, parent, right subtree; keys come out sorted.
    fn inorder_ids(&self) -> impl Iterator<Item = usize> + '_ {
        let mut stack: Vec<usize> = Vec::new();
        let mut cur = self.root_id();
        iter::from_fn(move || {
            while let Some(c) = cur {
                stack.push(c);
                cur = self.left_of(c);
            }
            let id = stack.pop()?;
            cur = self.right_of(id);
            Some(id)
        })
    }

    /// Left subtree, right subtree, parent.
    fn postorder_ids(&self) -> impl Iterator<Item = usize> + '_ {
        // Each node is pushed unexpanded, then re-pushed expanded beneath its
        // children so it surfaces only after both subtrees are done.
        let mut stack: Vec<(usize, bool)> =
            self.root_id().map(|r| (r, false)).into_iter().collect();
        iter::from_fn(move || {
            while let Some((id, expanded)) = stack.pop() {
                if expanded {
                    return Some(id);
                }
                stack.push((id, true));
                if let Some(r) = self.right_of(id) {
                    stack.push((r, false));
                }
                if let Some(l) = self.left_of(id) {
                    stack.push((l, false));
                }
            }
            None
        })
    }

    /// Breadth-first, top level down, left to right within a level.
    fn levelorder_ids(&self) -> impl Iterator<Item = usize> + '_ {
        let mut queue: VecDeque<usize> = self.root_id().into_iter().collect();
        iter::from_fn(move || {
            let id = queue.pop_front()?;
            if let Some(l) = self.left_of(id) {
                queue.push_back(l);
            }
            if let Some(r) = self.right_of(id) {
                queue.push_back(r);
            }
            Some(id)
        })
    }
}
