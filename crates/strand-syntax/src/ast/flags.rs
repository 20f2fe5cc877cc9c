//! Per-node marks computed by the wait/defer annotator.
//!
//! Marks live in a [`FlagTable`] keyed by [`NodeId`] rather than on the nodes
//! themselves, so a tree can be rebuilt by value while its marks stay
//! attached to the ids the rebuilt nodes keep.

use super::NodeId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Mark bits for a single node (bitflags)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NodeFlags(u8);

impl NodeFlags {
    /// Unmarked
    pub const NONE: Self = Self(0x00);
    /// Is, or contains, a wait-block
    pub const AWAIT: Self = Self(0x01);
    /// Loop whose body contains a wait-block
    pub const LOOP: Self = Self(0x02);
    /// On the path from a break/continue to its marked target loop
    pub const PROPAGATE: Self = Self(0x04);

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Check if all bits of `other` are set
    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any bit of `other` is set
    pub const fn intersects(&self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    pub const fn union(&self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl BitOr for NodeFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for NodeFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl fmt::Display for NodeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        let names = [
            (Self::AWAIT, "AWAIT"),
            (Self::LOOP, "LOOP"),
            (Self::PROPAGATE, "PROPAGATE"),
        ];
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for NodeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeFlags({})", self)
    }
}

/// Side table of node marks. Marks only accumulate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlagTable {
    flags: FxHashMap<NodeId, NodeFlags>,
}

impl FlagTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks of `id`, [`NodeFlags::NONE`] when unmarked.
    #[inline]
    pub fn get(&self, id: NodeId) -> NodeFlags {
        self.flags.get(&id).copied().unwrap_or(NodeFlags::NONE)
    }

    /// Union `flags` into the marks of `id`. Returns whether anything changed.
    pub fn mark(&mut self, id: NodeId, flags: NodeFlags) -> bool {
        if flags.is_empty() {
            return false;
        }
        let entry = self.flags.entry(id).or_default();
        let before = *entry;
        *entry |= flags;
        before != *entry
    }

    #[inline]
    pub fn has(&self, id: NodeId, flags: NodeFlags) -> bool {
        self.get(id).contains(flags)
    }

    #[inline]
    pub fn has_any(&self, id: NodeId, flags: NodeFlags) -> bool {
        self.get(id).intersects(flags)
    }

    /// Number of marked ids
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Ids carrying all of `flags`, in ascending id order.
    pub fn ids_with(&self, flags: NodeFlags) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .flags
            .iter()
            .filter(|(_, f)| f.contains(flags))
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }
}
