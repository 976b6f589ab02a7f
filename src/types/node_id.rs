//! Node identifier type.

use std::fmt;

/// Unique identifier for a node in the tree's arena.
///
/// Node IDs are stable for the lifetime of the node: they name an arena
/// slot, so parent and child references stay valid while the tree is
/// restructured around them. A slot is recycled only after its node has
/// been destroyed by a merge or root collapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new node ID
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw node ID value
    pub const fn value(self) -> u32 {
        self.0
    }

    /// The arena slot index this ID names
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_basics() {
        let id = NodeId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.index(), 42);
        assert_eq!(NodeId::from(7u32), NodeId(7));
        assert_eq!(u32::from(NodeId(7)), 7);
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(format!("{}", NodeId::new(42)), "42");
    }
}
