// (c) Copyright 2025 Helsing GmbH. All rights reserved.
use crate::operation::{ApplyError, Operation, OperationKind};
use std::fmt;

/// An ordered sequence of atomic elements that is edited collaboratively.
///
/// A `Document` is a value: [`Document::apply`] never modifies the receiver, it returns the
/// edited document instead. Replicas own their document exclusively, which is what makes the
/// in-place variant used by [`Client`](crate::Client) and [`Server`](crate::Server)
/// indistinguishable from the pure one.
///
/// ```rust
/// # use otseq::{Document, Operation};
/// let doc = Document::from("123");
/// let edited = doc.apply(&Operation::insert(3, '4')).unwrap();
/// assert_eq!(edited, Document::from("1234"));
/// assert_eq!(doc.len(), 3);
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Document<T>(Vec<T>);

impl<T> Document<T> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<T> {
        self.0
    }

    /// Checks that `operation` can be applied to this document.
    ///
    /// Deletions need `index < len`, insertions need `index <= len`. No-ops are always valid.
    pub fn check(&self, operation: &Operation<T>) -> Result<(), ApplyError> {
        let len = self.len();
        match *operation {
            Operation::NoOp => Ok(()),
            Operation::Delete { index } if index >= len => Err(ApplyError::IndexOutOfRange {
                kind: OperationKind::Delete,
                index,
                len,
            }),
            Operation::Insert { index, .. } if index > len => Err(ApplyError::IndexOutOfRange {
                kind: OperationKind::Insert,
                index,
                len,
            }),
            Operation::Delete { .. } | Operation::Insert { .. } => Ok(()),
        }
    }

    /// Applies `operation` to this document in place.
    ///
    /// The operation is validated before anything is touched, so on error the document is left
    /// exactly as it was.
    pub fn apply_in_place(&mut self, operation: &Operation<T>) -> Result<(), ApplyError>
    where
        T: Clone,
    {
        self.check(operation)?;
        match operation {
            Operation::NoOp => {}
            Operation::Delete { index } => {
                self.0.remove(*index);
            }
            Operation::Insert { index, data } => self.0.insert(*index, data.clone()),
        }
        Ok(())
    }

    /// Returns the document that results from applying `operation` to `self`.
    pub fn apply(&self, operation: &Operation<T>) -> Result<Self, ApplyError>
    where
        T: Clone,
    {
        self.check(operation)?;
        let mut next = self.clone();
        next.apply_in_place(operation)?;
        Ok(next)
    }
}

impl<T> From<Vec<T>> for Document<T> {
    fn from(elements: Vec<T>) -> Self {
        Self(elements)
    }
}

impl From<&str> for Document<char> {
    fn from(s: &str) -> Self {
        s.chars().collect()
    }
}

impl<T> FromIterator<T> for Document<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a, T> IntoIterator for &'a Document<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> std::ops::Index<usize> for Document<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.0[index]
    }
}

impl<T: fmt::Debug> fmt::Debug for Document<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Document").field(&self.0).finish()
    }
}

/// Renders the elements back to back, quoted, so `['1', '2', '3']` reads as `"123"`.
impl<T: fmt::Display> fmt::Display for Document<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: String = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{joined:?}")
    }
}
