//! B-tree core implementation.
//!
//! This module provides the main BTree struct with operations for:
//! - search/contains: point lookups
//! - insert: insertion with split propagation toward the root
//! - remove: deletion with borrow/merge rebalancing
//!
//! All operations descend from the root by key comparison. Inserting
//! into a full leaf splits it and pushes the median key upward, growing
//! the tree by one level when the split reaches the root. Removing from
//! a leaf below minimum occupancy borrows from or merges with a sibling,
//! shrinking the tree by one level when a merge empties the root. Both
//! ascents are written as loops over the parent chain, bounded by the
//! tree height.

use crate::error::{IndexError, Result};
use crate::node::{Node, NodeArena};
use crate::types::{NodeId, MIN_ORDER};
use std::mem;

/// An in-memory B-tree
///
/// The order parameter bounds node occupancy: every non-root node holds
/// between `order` and `2 * order` keys. The root is exempt from the
/// lower bound; a root with no keys and no children is the empty tree.
///
/// Keys form a multiset: inserting an equal key again stores a second
/// instance, and each `remove` takes out exactly one instance.
#[derive(Debug)]
pub struct BTree<K> {
    /// Slot storage for all nodes
    arena: NodeArena<K>,
    /// Root node id; replaced when the tree grows or shrinks a level
    root: NodeId,
    /// Minimum key count per non-root node
    order: usize,
    /// Number of live keys
    len: usize,
}

impl<K: Ord> BTree<K> {
    /// Create an empty tree with the given order.
    ///
    /// Returns [`IndexError::InvalidOrder`] if `order` is below
    /// [`MIN_ORDER`].
    pub fn new(order: usize) -> Result<Self> {
        if order < MIN_ORDER {
            return Err(IndexError::InvalidOrder { got: order });
        }

        let mut arena = NodeArena::new();
        let root = arena.alloc(Node::new());

        Ok(Self {
            arena,
            root,
            order,
            len: 0,
        })
    }

    /// Get the tree's order
    pub fn order(&self) -> usize {
        self.order
    }

    /// Get the number of keys in the tree (counting duplicates)
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the tree holds no keys
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the number of live nodes backing the tree
    pub fn node_count(&self) -> usize {
        self.arena.node_count()
    }

    /// Get the root node id
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// Get a node by id, for read-only structural inspection.
    ///
    /// Panics if `id` names a node that has since been destroyed by a
    /// merge or root collapse.
    pub fn node(&self, id: NodeId) -> &Node<K> {
        self.arena.get(id)
    }

    /// Get the height of the tree.
    ///
    /// Measured by following the leftmost child from the root; an empty
    /// or single-node tree has height 1.
    pub fn height(&self) -> usize {
        let mut depth = 1;
        let mut id = self.root;
        while let Some(&child) = self.arena.get(id).children.first() {
            depth += 1;
            id = child;
        }
        depth
    }

    /// Check if a key is present
    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Find the first node containing `key`, searching from the root
    pub fn search(&self, key: &K) -> Option<NodeId> {
        self.find(key).map(|(id, _)| id)
    }

    /// Insert a key, splitting overfull nodes as needed.
    ///
    /// Duplicates are permitted: the descent ignores equality and the
    /// new instance lands adjacent to existing equal keys.
    pub fn insert(&mut self, key: K) {
        let leaf = self.leaf_for(&key);
        let was_full = self.arena.get(leaf).is_full(self.order);
        self.arena.get_mut(leaf).insert_key_sorted(key);
        self.len += 1;

        if was_full {
            self.split(leaf);
        }
    }

    /// Remove one instance of `key` from the tree.
    ///
    /// Returns `true` if the key was found and removed; an absent key
    /// leaves the tree structurally unchanged.
    pub fn remove(&mut self, key: &K) -> bool {
        let Some((id, pos)) = self.find(key) else {
            return false;
        };

        if self.arena.get(id).is_leaf() {
            self.remove_from_leaf(id, pos);
        } else {
            self.remove_from_internal(id, pos);
        }
        self.len -= 1;
        true
    }

    /// Descend from the root to the node holding `key`.
    ///
    /// Returns the node and the leftmost position of the key within it.
    fn find(&self, key: &K) -> Option<(NodeId, usize)> {
        let mut id = self.root;
        loop {
            let node = self.arena.get(id);

            // Only the root can be empty, and only when the tree is
            if node.keys.is_empty() {
                return None;
            }

            if let Some(pos) = node.find_key(key) {
                return Some((id, pos));
            }
            if node.is_leaf() {
                return None;
            }
            id = node.children[node.upper_bound(key)];
        }
    }

    /// Descend to the leaf where `key` should be inserted, ignoring
    /// equality along the way
    fn leaf_for(&self, key: &K) -> NodeId {
        let mut id = self.root;
        loop {
            let node = self.arena.get(id);
            if node.is_leaf() {
                return id;
            }
            id = node.children[node.upper_bound(key)];
        }
    }

    /// Split an overfull node and propagate upward while the parent
    /// overflows in turn.
    ///
    /// Each round moves the median key into the parent and the keys and
    /// children right of the median into a freshly allocated sibling.
    /// Splitting the root synthesizes a new root, growing the height.
    fn split(&mut self, mut id: NodeId) {
        let order = self.order;
        loop {
            debug_assert_eq!(self.arena.get(id).keys.len(), 2 * order + 1);

            // Carve off the median and the right half
            let (median, right_keys, right_children) = {
                let node = self.arena.get_mut(id);
                let mut tail = node.keys.split_off(order);
                let right_keys = tail.split_off(1);
                let median = tail.remove(0);
                let right_children = if node.children.is_empty() {
                    Vec::new()
                } else {
                    node.children.split_off(order + 1)
                };
                (median, right_keys, right_children)
            };

            let right = self.arena.alloc(Node::new());
            for &child in &right_children {
                self.arena.get_mut(child).parent = Some(right);
            }
            {
                let right_node = self.arena.get_mut(right);
                right_node.keys = right_keys;
                right_node.children = right_children;
            }

            // The median goes to the existing parent, or to a fresh root
            // when the split has reached the top of the tree
            let (parent, created) = match self.arena.get(id).parent {
                Some(parent) => (parent, false),
                None => (self.arena.alloc(Node::new()), true),
            };
            let parent_was_full = self.arena.get(parent).is_full(order);
            self.arena.get_mut(parent).insert_key_sorted(median);
            if created {
                self.arena.add_child(parent, id);
                self.root = parent;
            }
            self.arena.add_child(parent, right);

            if !parent_was_full {
                return;
            }
            id = parent;
        }
    }

    /// Remove the key at `pos` from an internal node.
    ///
    /// The key is replaced by its in-order predecessor: the maximum key
    /// of the rightmost leaf in the subtree to its left. The predecessor
    /// is then removed from that leaf, which may trigger rebalancing.
    fn remove_from_internal(&mut self, id: NodeId, pos: usize) {
        let mut leaf = self.arena.get(id).children[pos];
        loop {
            match self.arena.get(leaf).children.last() {
                Some(&child) => leaf = child,
                None => break,
            }
        }

        self.arena.get_mut(id).keys.remove(pos);
        let pred = {
            let leaf_node = self.arena.get_mut(leaf);
            let last = leaf_node.keys.len() - 1;
            leaf_node.keys.remove(last)
        };
        self.arena.get_mut(id).insert_key_sorted(pred);

        self.maybe_rebalance(leaf);
    }

    /// Remove the key at `pos` from a leaf, rebalancing on underflow
    fn remove_from_leaf(&mut self, id: NodeId, pos: usize) {
        self.arena.get_mut(id).keys.remove(pos);
        self.maybe_rebalance(id);
    }

    /// Enter underflow repair if a non-root node dropped below minimum
    /// occupancy
    fn maybe_rebalance(&mut self, id: NodeId) {
        let node = self.arena.get(id);
        if node.parent.is_some() && node.keys.len() < self.order {
            self.handle_underflow(id);
        }
    }

    /// Repair an underflowing node, walking up the parent chain.
    ///
    /// Precedence per round: borrow from the left sibling, borrow from
    /// the right sibling, merge into the left sibling, merge into the
    /// right sibling. Borrowing always ends the repair; a merge removes
    /// a separator from the parent, which may underflow in turn. A merge
    /// that empties the root promotes the surviving child and shrinks
    /// the height. The root itself is never repaired.
    fn handle_underflow(&mut self, mut id: NodeId) {
        loop {
            let parent = match self.arena.get(id).parent {
                Some(parent) => parent,
                None => return, // root is exempt from minimum occupancy
            };
            let pos = self.arena.child_index(parent, id);
            let left = self.arena.left_sibling(id);
            let right = self.arena.right_sibling(id);

            if let Some(left) = left {
                if self.arena.get(left).keys.len() > self.order {
                    self.borrow_from_left(id, left, parent, pos);
                    return;
                }
            }
            if let Some(right) = right {
                if self.arena.get(right).keys.len() > self.order {
                    self.borrow_from_right(id, right, parent, pos);
                    return;
                }
            }
            if let Some(left) = left {
                self.merge_into_left(id, left, parent, pos);
            } else if let Some(right) = right {
                self.merge_into_right(id, right, parent, pos);
            } else {
                // a non-root node always has a sibling
                debug_assert!(false, "underflowing node {id} has no siblings");
                return;
            }

            // The merge consumed a separator from the parent; check it
            let (parent_is_root, parent_keys) = {
                let parent_node = self.arena.get(parent);
                (parent_node.parent.is_none(), parent_node.keys.len())
            };
            if parent_is_root {
                if parent_keys == 0 {
                    // The root emptied out: its sole remaining child
                    // takes over and the tree loses one level
                    let new_root = self.arena.get(parent).children[0];
                    self.arena.get_mut(new_root).parent = None;
                    self.arena.free(parent);
                    self.root = new_root;
                }
                return;
            }
            if parent_keys < self.order {
                id = parent;
                continue;
            }
            return;
        }
    }

    /// Rotate a key in from the left sibling: the separator moves down
    /// into `id` and the sibling's maximum replaces it in the parent.
    /// An internal sibling hands over its rightmost subtree with the key.
    fn borrow_from_left(&mut self, id: NodeId, left: NodeId, parent: NodeId, pos: usize) {
        let donor = {
            let sibling = self.arena.get_mut(left);
            let last = sibling.keys.len() - 1;
            sibling.keys.remove(last)
        };
        let separator = mem::replace(&mut self.arena.get_mut(parent).keys[pos - 1], donor);
        self.arena.get_mut(id).insert_key_sorted(separator);

        if let Some(child) = self.arena.get_mut(left).children.pop() {
            self.arena.get_mut(child).parent = Some(id);
            self.arena.get_mut(id).children.insert(0, child);
        }
    }

    /// Rotate a key in from the right sibling: the separator moves down
    /// into `id` and the sibling's minimum replaces it in the parent.
    fn borrow_from_right(&mut self, id: NodeId, right: NodeId, parent: NodeId, pos: usize) {
        let donor = self.arena.get_mut(right).keys.remove(0);
        let separator = mem::replace(&mut self.arena.get_mut(parent).keys[pos], donor);
        self.arena.get_mut(id).insert_key_sorted(separator);

        if !self.arena.get(right).children.is_empty() {
            let child = self.arena.get_mut(right).children.remove(0);
            self.arena.get_mut(child).parent = Some(id);
            self.arena.get_mut(id).children.push(child);
        }
    }

    /// Fold `id` and its separator into the left sibling and destroy
    /// `id`. The sibling absorbs the separator, `id`'s keys, and `id`'s
    /// children (reparented).
    fn merge_into_left(&mut self, id: NodeId, left: NodeId, parent: NodeId, pos: usize) {
        let separator = self.arena.get_mut(parent).keys.remove(pos - 1);
        let mut keys = mem::take(&mut self.arena.get_mut(id).keys);
        let children = mem::take(&mut self.arena.get_mut(id).children);

        for &child in &children {
            self.arena.get_mut(child).parent = Some(left);
        }
        {
            let sibling = self.arena.get_mut(left);
            sibling.keys.push(separator);
            sibling.keys.append(&mut keys);
            sibling.children.extend(children);
        }
        self.arena.get_mut(parent).children.remove(pos);
        self.arena.free(id);
    }

    /// Fold `id` and its separator into the right sibling and destroy
    /// `id`. Mirror of [`Self::merge_into_left`]; the absorbed keys and
    /// children go in front of the sibling's own.
    fn merge_into_right(&mut self, id: NodeId, right: NodeId, parent: NodeId, pos: usize) {
        let separator = self.arena.get_mut(parent).keys.remove(pos);
        let mut keys = mem::take(&mut self.arena.get_mut(id).keys);
        keys.push(separator);
        let mut children = mem::take(&mut self.arena.get_mut(id).children);

        for &child in &children {
            self.arena.get_mut(child).parent = Some(right);
        }
        {
            let sibling = self.arena.get_mut(right);
            let mut rest = mem::take(&mut sibling.keys);
            keys.append(&mut rest);
            sibling.keys = keys;

            let mut rest = mem::take(&mut sibling.children);
            children.append(&mut rest);
            sibling.children = children;
        }
        self.arena.get_mut(parent).children.remove(pos);
        self.arena.free(id);
    }
}
