//! # BTree Index
//!
//! A generic, in-memory, order-parameterized B-tree for embedding as an
//! ordered-key index inside a larger program.
//!
//! ## Architecture
//!
//! The index is composed of three layers:
//!
//! - **Types** (`types`): stable node identifiers and shared constants
//! - **Node Layer** (`node`): the node representation and the arena that
//!   owns every node, with free-slot reuse on node destruction
//! - **B-Tree Layer** (`btree`): search descent, insertion with split
//!   propagation, and deletion with borrow/merge rebalancing
//!
//! The tree is single-threaded and fully synchronous: no operation
//! blocks, and concurrent mutation must be serialized by the caller.
//!
//! ## Usage
//!
//! ```rust
//! use btree_index::BTree;
//!
//! let mut tree = BTree::new(2)?;
//!
//! // Insert some keys (duplicates are permitted)
//! tree.insert(42);
//! tree.insert(7);
//! tree.insert(42);
//!
//! assert!(tree.contains(&42));
//! assert_eq!(tree.len(), 3);
//!
//! // Each remove takes out one instance
//! tree.remove(&42);
//! assert!(tree.contains(&42));
//!
//! assert_eq!(tree.height(), 1);
//! # Ok::<(), btree_index::IndexError>(())
//! ```

pub mod btree;
pub mod error;
pub mod node;
pub mod types;

pub use error::{IndexError, Result};
pub use types::{NodeId, MIN_ORDER};

// Re-export main public API
pub use btree::BTree;
pub use node::{Node, NodeArena};

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Node snapshot for visualization
///
/// A recursive, serialization-friendly copy of the tree's shape with
/// keys rendered as strings. Produced by [`BTree::export_tree`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeSnapshot {
    /// Arena id of the node
    pub node_id: u32,
    /// Whether this is a leaf node
    pub is_leaf: bool,
    /// Keys in this node
    pub keys: Vec<String>,
    /// Child snapshots (empty for leaf nodes)
    pub children: Vec<TreeSnapshot>,
}

/// Index statistics
#[derive(Debug, Clone)]
pub struct TreeStats {
    /// Number of keys in the tree, counting duplicates
    pub key_count: usize,
    /// Number of live nodes backing the tree
    pub node_count: usize,
    /// Height of the tree
    pub height: usize,
}

impl<K: Ord> BTree<K> {
    /// Get statistics about the index
    pub fn stats(&self) -> TreeStats {
        TreeStats {
            key_count: self.len(),
            node_count: self.node_count(),
            height: self.height(),
        }
    }
}

impl<K: Ord + Display> BTree<K> {
    /// Export the tree structure for visualization
    pub fn export_tree(&self) -> TreeSnapshot {
        self.export_node(self.root_id())
    }

    fn export_node(&self, id: NodeId) -> TreeSnapshot {
        let node = self.node(id);

        TreeSnapshot {
            node_id: id.value(),
            is_leaf: node.is_leaf(),
            keys: node.keys().iter().map(|k| k.to_string()).collect(),
            children: node
                .children()
                .iter()
                .map(|&child| self.export_node(child))
                .collect(),
        }
    }
}
