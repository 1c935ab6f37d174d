// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! # Operations on a Linear Document
//!
//! An [`Operation`] is the unit of change exchanged between replicas. There are only three of
//! them, and only [`Operation::Insert`] carries data:
//!
//! | Operation          | Valid when          | Effect                               |
//! |--------------------|---------------------|--------------------------------------|
//! | `NoOp`             | always              | none                                 |
//! | `Delete { index }` | `index < len`       | removes the element at `index`       |
//! | `Insert { index }` | `index <= len`      | inserts `data` before `index`        |
//!
//! Operations are plain values. [`transform`](transform::transform) consumes two of them and
//! builds two new ones; nothing is ever shared or mutated.
use std::fmt;

pub mod transform;

/// A single edit to a [`Document`](crate::Document).
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Operation<T> {
    /// The identity. Emitted when two operations cancel each other out.
    NoOp,
    /// Removes the element at `index`.
    Delete { index: usize },
    /// Inserts `data` immediately before position `index`.
    Insert { index: usize, data: T },
}

impl<T> Operation<T> {
    pub fn delete(index: usize) -> Self {
        Self::Delete { index }
    }

    pub fn insert(index: usize, data: T) -> Self {
        Self::Insert { index, data }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }

    /// The index this operation targets, if any.
    pub fn index(&self) -> Option<usize> {
        match *self {
            Self::NoOp => None,
            Self::Delete { index } | Self::Insert { index, .. } => Some(index),
        }
    }

    /// The kind of this operation, or `None` for [`Operation::NoOp`].
    pub fn kind(&self) -> Option<OperationKind> {
        match self {
            Self::NoOp => None,
            Self::Delete { .. } => Some(OperationKind::Delete),
            Self::Insert { .. } => Some(OperationKind::Insert),
        }
    }
}

impl<T> Default for Operation<T> {
    fn default() -> Self {
        Self::NoOp
    }
}

impl<T: fmt::Debug> fmt::Debug for Operation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoOp => f.write_str("NoOp"),
            Self::Delete { index } => f.debug_tuple("Delete").field(index).finish(),
            Self::Insert { index, data } => {
                f.debug_tuple("Insert").field(index).field(data).finish()
            }
        }
    }
}

/// The compact form used in logs: `nop`, `del(1)`, `ins(2, A)`.
impl<T: fmt::Display> fmt::Display for Operation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoOp => f.write_str("nop"),
            Self::Delete { index } => write!(f, "del({index})"),
            Self::Insert { index, data } => write!(f, "ins({index}, {data})"),
        }
    }
}

/// Represents the kind of a non-trivial [`Operation`] without holding any data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Delete,
    Insert,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperationKind::Delete => "deletion",
            OperationKind::Insert => "insertion",
        })
    }
}

/// Error returned when an operation does not fit the document it is applied to.
///
/// Under normal protocol operation this never happens: it means an operation was built against
/// the wrong document, or a transformed operation was applied out of turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    /// The index is past the end of the document (for deletions, at or past the end).
    IndexOutOfRange {
        kind: OperationKind,
        index: usize,
        len: usize,
    },
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplyError::IndexOutOfRange { kind, index, len } => write!(
                f,
                "{kind} index {index} is out of range for document of length {len}"
            ),
        }
    }
}

impl std::error::Error for ApplyError {}
