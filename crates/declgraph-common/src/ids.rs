//! Arena handles.
//!
//! Declarations and aliases live in arenas owned by the model crate. Every
//! cross reference (parent scope, nested children, resolved type annotations,
//! relationship maps) is one of these handles, never an owning pointer, so the
//! declaration graph has no strong cycles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle of a declaration in the declaration arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclId(pub u32);

impl DeclId {
    /// Sentinel for "no declaration".
    pub const NONE: DeclId = DeclId(u32::MAX);

    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn from_index(index: usize) -> Self {
        DeclId(index as u32)
    }
}

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "decl#{}", self.0)
    }
}

/// Handle of a type alias in the alias arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasId(pub u32);

impl AliasId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn from_index(index: usize) -> Self {
        AliasId(index as u32)
    }
}

impl fmt::Display for AliasId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "alias#{}", self.0)
    }
}
