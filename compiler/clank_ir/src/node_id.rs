//! AST node identifiers.
//!
//! Every AST node carries a unique `NodeId` assigned by the parser. The
//! repair generator references nodes only by id (never by pointer), so ids
//! must stay unique within one program.

use std::fmt;

use serde::Serialize;

/// Unique identifier of an AST node within one program.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Id used by synthesized nodes that are not part of the source program.
    pub const SYNTHETIC: NodeId = NodeId(u32::MAX);

    /// Create from a raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        NodeId(raw)
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sequential node-id allocator.
///
/// The parser owns one per parse; tests use it to build programs by hand.
#[derive(Debug, Default)]
pub struct NodeIdGen {
    next: u32,
}

impl NodeIdGen {
    /// Create a generator starting at zero.
    pub fn new() -> Self {
        NodeIdGen::default()
    }

    /// Allocate the next id.
    pub fn fresh(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }
}
