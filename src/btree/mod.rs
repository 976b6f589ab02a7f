//! B-tree implementation.
//!
//! This module provides an in-memory B-tree that supports:
//! - Point lookups (search, contains)
//! - Insertions with split propagation (insert)
//! - Deletions with borrow/merge rebalancing (remove)
//! - Height and occupancy queries

mod tree;

pub use tree::BTree;
