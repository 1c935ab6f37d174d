// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Implementation of the quickcheck::Arbitrary trait for operations and documents, plus
//! helpers for driving randomized sessions.

use crate::{
    ClientId, Document, Operation,
    observer::{ClientObserver, ServerObserver},
    simulation::{Session, SessionError},
};
use quickcheck::{Arbitrary, Gen};
use rand::{Rng, SeedableRng, rngs::SmallRng};

// Small documents and indices make collisions (same index, same data) likely, which is where
// the interesting transform cases are.
const MAX_LEN: usize = 8;

impl<T: Arbitrary> Arbitrary for Document<T> {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = usize::arbitrary(g) % (MAX_LEN + 1);
        (0..len).map(|_| T::arbitrary(g)).collect()
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.as_slice().to_vec().shrink().map(Document::from))
    }
}

impl<T: Arbitrary> Arbitrary for Operation<T> {
    fn arbitrary(g: &mut Gen) -> Self {
        let index = usize::arbitrary(g) % (MAX_LEN + 1);
        match *g.choose(&["nop", "del", "ins", "ins"]).unwrap() {
            "nop" => Operation::NoOp,
            "del" => Operation::delete(index),
            _ => Operation::insert(index, T::arbitrary(g)),
        }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        match self {
            Operation::NoOp => quickcheck::empty_shrinker(),
            Operation::Delete { index } => {
                let index = *index;
                Box::new(
                    std::iter::once(Operation::NoOp)
                        .chain(index.shrink().map(Operation::delete)),
                )
            }
            Operation::Insert { index, data } => {
                let (index, data) = (*index, data.clone());
                Box::new(
                    std::iter::once(Operation::NoOp)
                        .chain(index.shrink().map(move |i| Operation::insert(i, data.clone()))),
                )
            }
        }
    }
}

impl Arbitrary for ClientId {
    fn arbitrary(g: &mut Gen) -> Self {
        // Skew towards a handful of ids; most interesting behavior needs the same client to
        // show up more than once.
        Self::new(u32::arbitrary(g) % 4)
    }
}

/// Picks an operation that is valid on a document of length `len`.
///
/// Insert data is drawn from `pool` so that equal elements show up often.
pub(crate) fn valid_operation<T: Clone>(g: &mut Gen, len: usize, pool: &[T]) -> Operation<T> {
    let kinds: &[&str] = if len == 0 {
        &["nop", "ins", "ins", "ins"]
    } else {
        &["nop", "del", "del", "ins", "ins", "ins"]
    };
    match *g.choose(kinds).unwrap() {
        "nop" => Operation::NoOp,
        "del" => Operation::delete(usize::arbitrary(g) % len),
        _ => Operation::insert(
            usize::arbitrary(g) % (len + 1),
            g.choose(pool).unwrap().clone(),
        ),
    }
}

/// A document together with two operations that are both valid on it, as if issued
/// concurrently by two replicas.
#[derive(Debug, Clone)]
pub struct ConcurrentPair<T> {
    pub document: Document<T>,
    pub a: Operation<T>,
    pub b: Operation<T>,
}

impl<T: Arbitrary> Arbitrary for ConcurrentPair<T> {
    fn arbitrary(g: &mut Gen) -> Self {
        let document = Document::<T>::arbitrary(g);
        let pool = [T::arbitrary(g), T::arbitrary(g)];
        let a = valid_operation(g, document.len(), &pool);
        // identical operations from both sides are a case of their own
        let b = if *g.choose(&[true, false, false, false]).unwrap() {
            a.clone()
        } else {
            valid_operation(g, document.len(), &pool)
        };
        Self { document, a, b }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let Self { document, a, b } = self.clone();
        let keep_b = {
            let (document, a) = (document.clone(), a.clone());
            b.shrink().map(move |b| Self {
                document: document.clone(),
                a: a.clone(),
                b,
            })
        };
        let keep_a = a.shrink().map(move |a| Self {
            document: document.clone(),
            a,
            b: b.clone(),
        });
        // shrinking may produce out-of-range operations; only keep valid pairs
        Box::new(keep_a.chain(keep_b).filter(|pair| {
            pair.document.check(&pair.a).is_ok() && pair.document.check(&pair.b).is_ok()
        }))
    }
}

/// Runs a session of `clients` clients on `"123"`, making `edits` random edits interleaved
/// with random uploads and downloads, and then settles it.
#[cfg_attr(feature = "arbitrary", allow(dead_code))]
pub(crate) fn random_session<O>(
    seed: u64,
    clients: u32,
    edits: usize,
    observer: &mut O,
) -> Result<Session<char>, SessionError>
where
    O: ServerObserver<char> + ClientObserver<char>,
{
    let clients = clients.max(1);
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut session = Session::new(Document::from("123"), clients);

    let mut made = 0;
    while made < edits {
        let id = ClientId::new(rng.random_range(0..clients));
        match rng.random_range(0..4) {
            0 | 1 => {
                let len = session
                    .client(id)
                    .ok_or(SessionError::UnknownClient(id))?
                    .document()
                    .len();
                let operation = if len == 0 || rng.random_bool(0.6) {
                    Operation::insert(
                        rng.random_range(0..=len),
                        char::from(b'A' + rng.random_range(0..3)),
                    )
                } else {
                    Operation::delete(rng.random_range(0..len))
                };
                session.edit(id, operation, observer)?;
                made += 1;
            }
            2 => {
                session.upload(id, observer)?;
            }
            _ => {
                session.download(id, observer)?;
            }
        }
    }
    session.settle(observer)?;
    Ok(session)
}
