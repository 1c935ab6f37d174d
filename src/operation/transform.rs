// (c) Copyright 2025 Helsing GmbH. All rights reserved.
use super::Operation;
use std::cmp::Ordering;

/// Resolves two concurrently issued operations into an order-independent pair.
///
/// Both `a` and `b` must have been issued against the same document `D`. The result `(a', b')`
/// satisfies
///
/// ```text
/// apply(apply(D, a), b') == apply(apply(D, b), a')
/// ```
///
/// That is, `b'` is `b` rewritten to apply after `a`, and `a'` is `a` rewritten to apply after
/// `b`.
///
/// Two inserts at the same index are ordered by their data so that every replica picks the same
/// order no matter which one it saw first: the greater element keeps its index and the other one
/// is shifted right. Identical inserts, like identical deletes, collapse into a pair of no-ops.
///
/// ```rust
/// # use otseq::{Operation, transform};
/// let (a, b) = transform(Operation::insert(1, 'x'), Operation::insert(1, 'y'));
/// assert_eq!(a, Operation::insert(2, 'x'));
/// assert_eq!(b, Operation::insert(1, 'y'));
///
/// let (a, b) = transform(Operation::<char>::delete(0), Operation::delete(0));
/// assert!(a.is_noop() && b.is_noop());
/// ```
pub fn transform<T>(a: Operation<T>, b: Operation<T>) -> (Operation<T>, Operation<T>)
where
    T: Ord,
{
    use Operation::{Delete, Insert, NoOp};

    // NOTE: no wildcard arms. every combination of kinds is spelled out so that adding an
    // operation kind is a compile error here rather than a silently unhandled case.
    match (a, b) {
        (NoOp, NoOp) => (NoOp, NoOp),
        (NoOp, b @ Delete { .. }) => (NoOp, b),
        (NoOp, b @ Insert { .. }) => (NoOp, b),
        (a @ Delete { .. }, NoOp) => (a, NoOp),
        (a @ Insert { .. }, NoOp) => (a, NoOp),

        (Delete { index: i }, Delete { index: j }) => match i.cmp(&j) {
            Ordering::Less => (Delete { index: i }, Delete { index: j - 1 }),
            Ordering::Greater => (Delete { index: i - 1 }, Delete { index: j }),
            // both sides removed the same element
            Ordering::Equal => (NoOp, NoOp),
        },

        (Delete { index: i }, Insert { index: j, data }) => {
            if i < j {
                (Delete { index: i }, Insert { index: j - 1, data })
            } else {
                (Delete { index: i + 1 }, Insert { index: j, data })
            }
        }

        (Insert { index: i, data }, Delete { index: j }) => {
            if i > j {
                (Insert { index: i - 1, data }, Delete { index: j })
            } else {
                (Insert { index: i, data }, Delete { index: j + 1 })
            }
        }

        (
            Insert {
                index: i,
                data: data_a,
            },
            Insert {
                index: j,
                data: data_b,
            },
        ) => match i.cmp(&j).then_with(|| data_b.cmp(&data_a)) {
            // `a` has priority: lower index, or same index and greater data
            Ordering::Less => (
                Insert {
                    index: i,
                    data: data_a,
                },
                Insert {
                    index: j + 1,
                    data: data_b,
                },
            ),
            Ordering::Greater => (
                Insert {
                    index: i + 1,
                    data: data_a,
                },
                Insert {
                    index: j,
                    data: data_b,
                },
            ),
            // the same element inserted at the same place by both sides
            Ordering::Equal => (NoOp, NoOp),
        },
    }
}
