// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Observe the synchronization protocol as it runs.
//!
//! Observers are handed to every [`Server`](crate::Server) and [`Client`](crate::Client) method
//! that changes state, and are told about each transition: packets accepted or rejected by the
//! server, local edits, broadcasts received, transform steps, resends and acknowledgements.
//! They are useful for logging, metrics or debugging.
//!
//! Unlike a validator, an observer cannot stop or alter anything: every method returns `()`.
//! Swapping one observer for another never changes the outcome of a session.
//!
//! The server and client sides are split into [`ServerObserver`] and [`ClientObserver`], and
//! every method has a no-op default, so implementors only need to override what they care about.
//!
//! For a testing-oriented example, see [`RecordingObserver`].

use crate::{ClientId, Operation, Packet};

mod recording;
pub use recording::RecordingObserver;
#[cfg(feature = "tracing")]
mod traced;
#[cfg(feature = "tracing")]
pub use traced::TracingObserver;

/// Observes the server accepting or discarding packets.
#[expect(unused_variables)]
pub trait ServerObserver<T> {
    /// A packet matched the server's sequence and was applied and broadcast.
    ///
    /// `effective_sequence` is the packet's sequence after the per-client batch offset was added.
    fn accepted(&mut self, client: ClientId, packet: &Packet<T>, effective_sequence: u64) {}

    /// A packet was stale or out of order and was discarded.
    ///
    /// `expected` is the server sequence the packet failed to match.
    fn rejected(
        &mut self,
        client: ClientId,
        packet: &Packet<T>,
        effective_sequence: u64,
        expected: u64,
    ) {
    }
}

// NOTE: four operations of the same type -- big nope to have them be regular fn args.
/// A single step of reconciling an incoming operation against one pending local operation.
#[derive(Debug)]
pub struct Transformed<'a, T> {
    /// The pending local operation before the step.
    pub local: &'a Operation<T>,
    /// The incoming operation before the step.
    pub incoming: &'a Operation<T>,
    /// The pending local operation rewritten to apply after `incoming`.
    pub local_after: &'a Operation<T>,
    /// The incoming operation rewritten to apply after `local`.
    pub incoming_after: &'a Operation<T>,
}

impl<T> Clone for Transformed<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Transformed<'_, T> {}

/// Observes a client editing its document and reconciling broadcasts.
#[expect(unused_variables)]
pub trait ClientObserver<T> {
    /// A local edit was applied optimistically.
    fn applied(&mut self, client: ClientId, operation: &Operation<T>) {}

    /// A broadcast arrived from the server.
    fn received(&mut self, client: ClientId, operation: &Operation<T>) {}

    /// An incoming operation was transformed against a pending local operation.
    fn transformed(&mut self, client: ClientId, step: Transformed<'_, T>) {}

    /// A pending operation was queued for (re)submission.
    fn sent(&mut self, client: ClientId, packet: &Packet<T>) {}

    /// A pending operation turned out to be incorporated by the server and was dropped.
    fn acknowledged(&mut self, client: ClientId, operation: &Operation<T>) {}

    /// The fully transformed incoming operation was applied to the local document.
    fn settled(&mut self, client: ClientId, operation: &Operation<T>) {}
}

/// An observer that does nothing.
///
/// This is useful when the protocol doesn't need any introspection. Using it helps the compiler
/// optimise some code away.
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyObserver;

impl<T> ServerObserver<T> for DummyObserver {}

impl<T> ClientObserver<T> for DummyObserver {}
