// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression tree types for the CEL expression language.
//!
//! This crate defines the checked-in shape of a parsed expression as it is
//! exchanged between the parser, the checker and the rewriting passes.
//! Sub-expressions are linked through `Arc` so that passes can hand back
//! untouched subtrees without copying them.

pub mod constant;
pub mod expr;

use std::fmt;

pub use constant::Constant;
pub use expr::{Comprehension, Entry, EntryKey, Expr, ExprKind};

/// Identifier of an expression node.
///
/// Assigned by the parser, unique within one tree. Passes that rebuild a
/// tree carry the id over unchanged so that checker and source-position
/// side tables stay valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ExprId(pub i64);

impl fmt::Display for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
