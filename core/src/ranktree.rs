//! Weight-augmented, priority-heap-ordered binary tree over insertion order ("rank tree").
//!
//! The tree is an *implicit* treap: there is no search key, only a positional invariant (the
//! in-order position of a node is its rank) combined with a max-heap on a random priority for
//! expected-logarithmic balance. `insert` always creates the new leftmost element (position 0);
//! `remove` detaches an arbitrary node by rotating it down to a leaf first.
//!
//! Nodes live in a generation-tagged arena so a stale `NodeId` from a removed node can never be
//! silently reinterpreted as a different live node.

use rand::{rngs::SmallRng, Rng, SeedableRng};

/// A stable handle into a [`RankTree`]'s arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

struct Node<T> {
    payload: T,
    weight: u32,
    priority: u32,
    parent: Option<u32>,
    left: Option<u32>,
    right: Option<u32>,
}

enum Slot<T> {
    Occupied(Node<T>),
    Free(Option<u32>),
}

pub struct RankTree<T> {
    slots: Vec<Slot<T>>,
    generations: Vec<u32>,
    free_head: Option<u32>,
    root: Option<u32>,
    rng: SmallRng,
}

impl<T> RankTree<T> {
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }

    /// Construct with a deterministic RNG, for reproducible tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_head: None,
            root: None,
            rng,
        }
    }

    /// Number of live nodes; equals `weight(root)`.
    pub fn len(&self) -> usize {
        self.weight_idx(self.root) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    fn node(&self, idx: u32) -> &Node<T> {
        match &self.slots[idx as usize] {
            Slot::Occupied(n) => n,
            Slot::Free(_) => panic!("rank tree: slot {idx} is not occupied"),
        }
    }

    fn node_mut(&mut self, idx: u32) -> &mut Node<T> {
        match &mut self.slots[idx as usize] {
            Slot::Occupied(n) => n,
            Slot::Free(_) => panic!("rank tree: slot {idx} is not occupied"),
        }
    }

    fn weight_idx(&self, idx: Option<u32>) -> u32 {
        idx.map(|i| self.node(i).weight).unwrap_or(0)
    }

    fn recompute_weight(&mut self, idx: u32) {
        let (l, r) = {
            let n = self.node(idx);
            (n.left, n.right)
        };
        let w = 1 + self.weight_idx(l) + self.weight_idx(r);
        self.node_mut(idx).weight = w;
    }

    /// Resolves a handle to its slot index, asserting the generation still matches: a
    /// contract violation (stale or foreign handle) aborts rather than silently aliasing.
    fn resolve(&self, id: NodeId) -> u32 {
        let current = self.generations.get(id.index as usize).copied();
        assert_eq!(
            current,
            Some(id.generation),
            "rank tree: node {id:?} is not a member of this tree"
        );
        id.index
    }

    fn make_id(&self, idx: u32) -> NodeId {
        NodeId {
            index: idx,
            generation: self.generations[idx as usize],
        }
    }

    fn alloc(&mut self, payload: T) -> u32 {
        let node = Node {
            payload,
            weight: 1,
            priority: self.rng.gen::<u32>(),
            parent: None,
            left: None,
            right: None,
        };
        if let Some(free) = self.free_head {
            self.free_head = match self.slots[free as usize] {
                Slot::Free(next) => next,
                Slot::Occupied(_) => unreachable!(),
            };
            self.slots[free as usize] = Slot::Occupied(node);
            free
        } else {
            self.slots.push(Slot::Occupied(node));
            self.generations.push(0);
            (self.slots.len() - 1) as u32
        }
    }

    fn free(&mut self, idx: u32) {
        self.generations[idx as usize] = self.generations[idx as usize].wrapping_add(1);
        self.slots[idx as usize] = Slot::Free(self.free_head);
        self.free_head = Some(idx);
    }

    /// Rotates `parent`'s right child up to replace it; `parent` becomes the new root's left
    /// child. Updates weights and the tree root pointer as needed.
    fn rotate_left(&mut self, parent: u32) {
        let child = self.node(parent).right.expect("rotate_left: no right child");
        let child_left = self.node(child).left;
        let grandparent = self.node(parent).parent;

        self.node_mut(parent).right = child_left;
        if let Some(cl) = child_left {
            self.node_mut(cl).parent = Some(parent);
        }
        self.node_mut(child).left = Some(parent);
        self.node_mut(parent).parent = Some(child);
        self.node_mut(child).parent = grandparent;
        self.reattach(grandparent, parent, child);

        self.recompute_weight(parent);
        self.recompute_weight(child);
    }

    /// Mirror of [`Self::rotate_left`].
    fn rotate_right(&mut self, parent: u32) {
        let child = self.node(parent).left.expect("rotate_right: no left child");
        let child_right = self.node(child).right;
        let grandparent = self.node(parent).parent;

        self.node_mut(parent).left = child_right;
        if let Some(cr) = child_right {
            self.node_mut(cr).parent = Some(parent);
        }
        self.node_mut(child).right = Some(parent);
        self.node_mut(parent).parent = Some(child);
        self.node_mut(child).parent = grandparent;
        self.reattach(grandparent, parent, child);

        self.recompute_weight(parent);
        self.recompute_weight(child);
    }

    /// Points `grandparent`'s child slot that used to hold `old` at `new`; if there is no
    /// grandparent, `new` becomes the tree root.
    fn reattach(&mut self, grandparent: Option<u32>, old: u32, new: u32) {
        match grandparent {
            None => self.root = Some(new),
            Some(g) => {
                if self.node(g).left == Some(old) {
                    self.node_mut(g).left = Some(new);
                } else {
                    self.node_mut(g).right = Some(new);
                }
            }
        }
    }

    /// Creates a new node holding `payload` and inserts it at position 0 (the new leftmost
    /// element). Returns a handle to the freshly created node.
    pub fn insert(&mut self, payload: T) -> NodeId {
        let new_idx = self.alloc(payload);
        match self.root {
            None => self.root = Some(new_idx),
            Some(root) => {
                let mut leaf = root;
                while let Some(l) = self.node(leaf).left {
                    leaf = l;
                }
                self.node_mut(leaf).left = Some(new_idx);
                self.node_mut(new_idx).parent = Some(leaf);
                let mut cur = leaf;
                loop {
                    self.recompute_weight(cur);
                    match self.node(cur).parent {
                        Some(p) => cur = p,
                        None => break,
                    }
                }
                self.promote(new_idx);
            }
        }
        self.make_id(new_idx)
    }

    /// Rotates `idx` upward while it violates heap order against its parent.
    fn promote(&mut self, idx: u32) {
        loop {
            let parent = match self.node(idx).parent {
                Some(p) => p,
                None => break,
            };
            if self.node(idx).priority <= self.node(parent).priority {
                break;
            }
            if self.node(parent).left == Some(idx) {
                self.rotate_right(parent);
            } else {
                self.rotate_left(parent);
            }
        }
    }

    /// Removes `node` from the tree. Panics (contract violation) if `node` does not belong to
    /// this tree.
    pub fn remove(&mut self, node: NodeId) {
        let idx = self.resolve(node);
        self.demote_to_leaf(idx);

        let parent = self.node(idx).parent;
        match parent {
            Some(p) => {
                if self.node(p).left == Some(idx) {
                    self.node_mut(p).left = None;
                } else {
                    self.node_mut(p).right = None;
                }
                let mut cur = p;
                loop {
                    self.recompute_weight(cur);
                    match self.node(cur).parent {
                        Some(pp) => cur = pp,
                        None => break,
                    }
                }
            }
            None => self.root = None,
        }
        self.free(idx);
    }

    /// Rotates the higher-priority child of `idx` into `idx`'s place, repeatedly, until `idx`
    /// has no children (is a leaf).
    fn demote_to_leaf(&mut self, idx: u32) {
        loop {
            let (left, right) = {
                let n = self.node(idx);
                (n.left, n.right)
            };
            match (left, right) {
                (None, None) => break,
                (Some(_), None) => self.rotate_right(idx),
                (None, Some(_)) => self.rotate_left(idx),
                (Some(l), Some(r)) => {
                    if self.node(l).priority >= self.node(r).priority {
                        self.rotate_right(idx);
                    } else {
                        self.rotate_left(idx);
                    }
                }
            }
        }
    }

    /// Returns the 0-based in-order position of `node`. Panics if `node` is not a member.
    pub fn rank(&self, node: NodeId) -> usize {
        let idx = self.resolve(node);
        let mut rank = self.weight_idx(self.node(idx).left);
        let mut cur = idx;
        while let Some(p) = self.node(cur).parent {
            if self.node(p).right == Some(cur) {
                rank += 1 + self.weight_idx(self.node(p).left);
            }
            cur = p;
        }
        rank as usize
    }

    pub fn first(&self) -> Option<NodeId> {
        let mut cur = self.root?;
        while let Some(l) = self.node(cur).left {
            cur = l;
        }
        Some(self.make_id(cur))
    }

    pub fn last(&self) -> Option<NodeId> {
        let mut cur = self.root?;
        while let Some(r) = self.node(cur).right {
            cur = r;
        }
        Some(self.make_id(cur))
    }

    pub fn payload(&self, node: NodeId) -> &T {
        &self.node(self.resolve(node)).payload
    }
}

impl<T> Default for RankTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_builds_positions_front_to_back() {
        let mut tree = RankTree::with_seed(1);
        let a = tree.insert('a');
        let b = tree.insert('b');
        let c = tree.insert('c');
        // insertion order is always at position 0, so the most recently inserted is first
        assert_eq!(tree.rank(c), 0);
        assert_eq!(tree.rank(b), 1);
        assert_eq!(tree.rank(a), 2);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn remove_then_reinsert_moves_to_front() {
        let mut tree = RankTree::with_seed(2);
        let a = tree.insert("a");
        let b = tree.insert("b");
        let c = tree.insert("c");
        assert_eq!(tree.rank(a), 2);
        tree.remove(a);
        assert_eq!(tree.len(), 2);
        let a2 = tree.insert("a");
        assert_eq!(tree.rank(a2), 0);
        assert_eq!(tree.rank(c), 1);
        assert_eq!(tree.rank(b), 2);
    }

    #[test]
    #[should_panic(expected = "not a member")]
    fn remove_foreign_node_panics() {
        let mut t1 = RankTree::with_seed(3);
        let mut t2 = RankTree::<i32>::with_seed(4);
        let id = t1.insert(1);
        t2.remove(id);
    }

    #[test]
    fn stress_front_churn_preserves_invariants() {
        let mut tree = RankTree::with_seed(42);
        let mut ids = Vec::new();
        for i in 0..10_000i64 {
            ids.push(tree.insert(i));
        }
        assert_eq!(tree.len(), 10_000);
        for _ in 0..2_000 {
            let first = tree.first().unwrap();
            assert_eq!(tree.rank(first), 0);
            let payload = *tree.payload(first);
            tree.remove(first);
            let new_id = tree.insert(payload);
            assert_eq!(tree.rank(new_id), 0);
            assert_eq!(tree.len(), 10_000);
        }
        let last = tree.last().unwrap();
        assert_eq!(tree.rank(last), tree.len() - 1);
    }
}
