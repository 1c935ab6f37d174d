// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! # otseq: Operational Transformation for Linear Documents
//!
//! This crate lets several replicas of a shared, linearly-ordered document converge to the same
//! content after each replica has applied edits independently and concurrently, without a
//! central lock. It provides two things:
//!
//! 1. An **operation model** ([`Operation`], [`Document`]) together with the [`transform`]
//!    function, which resolves two operations issued against the same document state into a
//!    pair that can be applied in either order with an identical result.
//! 2. The **client and server state machines** ([`Client`], [`Server`]) of a small
//!    synchronization protocol that uses [`transform`] to reconcile concurrent edits and
//!    guarantees that every replica ends up with the server's document.
//!
//! ## Operations
//!
//! A document is a sequence of atomic elements (characters, tokens, anything that is
//! [`Ord`] + [`Clone`]). There are exactly three kinds of [`Operation`]:
//!
//! - [`Operation::NoOp`]: the identity.
//! - [`Operation::Delete`]: remove the element at `index`.
//! - [`Operation::Insert`]: insert one element before position `index`.
//!
//! ## Transformation
//!
//! Given two operations `a` and `b` that were both issued against the same document `D`,
//! `transform(a, b)` returns `(a', b')` such that
//!
//! ```text
//! apply(apply(D, a), b') == apply(apply(D, b), a')
//! ```
//!
//! Two inserts at the same index are ordered by their data: the greater element keeps its index
//! and ends up first. Two identical inserts cancel each other out.
//!
//! ```rust
//! use otseq::{Document, Operation, transform};
//!
//! let doc = Document::from("123");
//! let a = Operation::delete(1);
//! let b = Operation::insert(2, 'A');
//!
//! let (a2, b2) = transform(a.clone(), b.clone());
//! let left = doc.apply(&a).unwrap().apply(&b2).unwrap();
//! let right = doc.apply(&b).unwrap().apply(&a2).unwrap();
//! assert_eq!(left, right);
//! assert_eq!(left, Document::from("1A3"));
//! ```
//!
//! ## The Synchronization Protocol
//!
//! The [`Server`] owns the authoritative document and a monotonic sequence counter. Each
//! [`Client`] applies its edits optimistically to a local copy, keeps them as *pending* and sends
//! them up tagged with the number of broadcasts it has received so far.
//!
//! The server accepts a packet only if its sequence matches the server's own; everything else is
//! stale and silently discarded. Accepted operations are broadcast to every client, including the
//! one that sent it. When a client receives a broadcast it transforms it against all of its
//! pending operations, which either acknowledges a pending operation (it transforms into a no-op)
//! or rewrites it against the newer server state and resends it.
//!
//! A client that issues several operations before hearing back from the server does not need a
//! round trip per operation: the server keeps a per-client offset so that a whole run of packets
//! sent at the same sequence number is accepted in one go.
//!
//! ```rust
//! use otseq::{ClientId, Document, Operation, observer::DummyObserver, simulation::Session};
//!
//! let mut session = Session::new(Document::from("123"), 2);
//! let (x, y) = (ClientId::new(0), ClientId::new(1));
//!
//! session.edit(x, Operation::delete(1), &mut DummyObserver).unwrap();
//! session.edit(y, Operation::insert(2, 'A'), &mut DummyObserver).unwrap();
//! session.upload(y, &mut DummyObserver).unwrap();
//! session.upload(x, &mut DummyObserver).unwrap();
//! session.settle(&mut DummyObserver).unwrap();
//!
//! assert!(session.is_converged());
//! assert_eq!(*session.server().document(), Document::from("1A3"));
//! ```
//!
//! ## Scope of this Crate
//!
//! **It does not include any networking.** [`Client`] and [`Server`] are plain state machines
//! that hand out and consume [`Packet`]s and [`Operation`]s. The transport that moves them must
//! deliver every message exactly once and in the order it was sent on each link; there is no
//! ordering requirement across different links. [`simulation`] contains an in-memory transport
//! that is useful for tests and experiments.
//!
//! All replicas must start from the same document. Clients cannot join or leave in the middle of
//! a session.
//!
//! ## Observing the Protocol
//!
//! Every state transition can be reported to an [`observer`]. Observers cannot influence the
//! protocol; they exist for logging and debugging. Use [`observer::DummyObserver`] if you do not
//! care, [`observer::RecordingObserver`] to collect a human-readable log, or `TracingObserver`
//! (feature `tracing`) to forward events to [`tracing`](https://docs.rs/tracing).
//!
//! ## Features
//!
//! - `tracing`: Enables `observer::TracingObserver`. This feature is enabled by default.
//! - `serde`: Provides `serde` support for operations, documents and packets.
//! - `arbitrary`: Implements `quickcheck::Arbitrary` for operations, documents and client ids,
//!   useful for property-based testing.
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

mod document;
pub use document::Document;
pub mod operation;
pub use operation::{ApplyError, Operation, OperationKind, transform::transform};
mod packet;
pub use packet::{ClientId, Packet};
pub mod server;
pub use server::{ConnectionState, Server, ServerError};
mod client;
pub use client::Client;
pub mod observer;
pub mod simulation;
/// Macros usable for tests and initialization
pub mod macros;

#[cfg(any(test, feature = "arbitrary"))]
mod test_util;
#[cfg(feature = "arbitrary")]
pub use test_util::ConcurrentPair;
