//! Type-safe slot identifiers
//!
//! Indices into the coverage model, assigned when the model is built from a
//! [`Document`](crate::Document). Paths and operations never move after
//! that, and responses are only ever appended, so an id stays valid for the
//! lifetime of the session that handed it out.
//!
//! These types are intentionally NOT interchangeable.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one declared path template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathId(u32);

impl PathId {
    /// Create a new path ID
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the inner value
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifies one method under a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OperationId {
    path: PathId,
    method: u32,
}

impl OperationId {
    /// Create a new operation ID
    #[inline]
    #[must_use]
    pub const fn new(path: PathId, method: u32) -> Self {
        Self { path, method }
    }

    /// The path this operation belongs to
    #[inline]
    #[must_use]
    pub const fn path(self) -> PathId {
        self.path
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.method as usize
    }
}

/// Identifies one response slot under an operation
///
/// Declared slots get their ids at load time; unexpected slots get the next
/// free index when first observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResponseId {
    operation: OperationId,
    response: u32,
}

impl ResponseId {
    /// Create a new response ID
    #[inline]
    #[must_use]
    pub const fn new(operation: OperationId, response: u32) -> Self {
        Self {
            operation,
            response,
        }
    }

    /// The operation this response belongs to
    #[inline]
    #[must_use]
    pub const fn operation(self) -> OperationId {
        self.operation
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.response as usize
    }
}

impl fmt::Display for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.m{}", self.path, self.method)
    }
}

impl fmt::Display for ResponseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.r{}", self.operation, self.response)
    }
}
