// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! This module contains an observer that simply records all calls in a human readable form.
//! This is mostly useful for tests.

use super::{ClientObserver, ServerObserver, Transformed};
use crate::{ClientId, Operation, Packet};
use std::fmt::Display;

/// An observer that records all calls.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    /// A string-representation of each call that the observer has received.
    pub changes_seen: Vec<String>,
}

impl RecordingObserver {
    /// Create a new RecordingObserver
    pub fn new() -> RecordingObserver {
        RecordingObserver {
            changes_seen: vec![],
        }
    }

    /// All recorded lines, newline separated.
    pub fn log(&self) -> String {
        self.changes_seen.join("\n")
    }
}

impl<T: Display> ServerObserver<T> for RecordingObserver {
    fn accepted(&mut self, client: ClientId, packet: &Packet<T>, effective_sequence: u64) {
        self.changes_seen.push(format!(
            "server got {} with sequence {} (adjusted to {effective_sequence}) from client {client}, used",
            packet.operation, packet.sequence
        ));
    }

    fn rejected(
        &mut self,
        client: ClientId,
        packet: &Packet<T>,
        effective_sequence: u64,
        expected: u64,
    ) {
        self.changes_seen.push(format!(
            "server got {} with sequence {} (adjusted to {effective_sequence}, expected {expected}) from client {client}, ignored",
            packet.operation, packet.sequence
        ));
    }
}

impl<T: Display> ClientObserver<T> for RecordingObserver {
    fn applied(&mut self, client: ClientId, operation: &Operation<T>) {
        self.changes_seen
            .push(format!("client {client} applied {operation}"));
    }

    fn received(&mut self, client: ClientId, operation: &Operation<T>) {
        self.changes_seen
            .push(format!("client {client} got {operation}"));
    }

    fn transformed(&mut self, client: ClientId, step: Transformed<'_, T>) {
        self.changes_seen.push(format!(
            "client {client} ran transform on [{}, {}], got [{}, {}]",
            step.local, step.incoming, step.local_after, step.incoming_after
        ));
    }

    fn sent(&mut self, client: ClientId, packet: &Packet<T>) {
        self.changes_seen
            .push(format!("client {client} sent {packet}"));
    }

    fn acknowledged(&mut self, client: ClientId, operation: &Operation<T>) {
        self.changes_seen
            .push(format!("client {client} acknowledged {operation}"));
    }

    fn settled(&mut self, client: ClientId, operation: &Operation<T>) {
        self.changes_seen
            .push(format!("client {client} applied incoming {operation}"));
    }
}
