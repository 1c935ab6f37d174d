// (c) Copyright 2025 Helsing GmbH. All rights reserved.
use super::{ClientObserver, ServerObserver, Transformed};
use crate::{ClientId, Operation, Packet};
use std::fmt::Display;
use tracing::{debug, trace};

/// An observer that forwards every protocol event to [`tracing`].
///
/// Accepted and rejected packets, local edits and incoming broadcasts are logged at `DEBUG`;
/// individual transform steps, resends and acknowledgements at `TRACE`. Which of them end up
/// anywhere is up to the subscriber installed by the application.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl<T: Display> ServerObserver<T> for TracingObserver {
    fn accepted(&mut self, client: ClientId, packet: &Packet<T>, effective_sequence: u64) {
        debug!(
            client = %client,
            operation = %packet.operation,
            sequence = packet.sequence,
            effective_sequence,
            "accepted packet"
        );
    }

    fn rejected(
        &mut self,
        client: ClientId,
        packet: &Packet<T>,
        effective_sequence: u64,
        expected: u64,
    ) {
        debug!(
            client = %client,
            operation = %packet.operation,
            sequence = packet.sequence,
            effective_sequence,
            expected,
            "discarded stale packet"
        );
    }
}

impl<T: Display> ClientObserver<T> for TracingObserver {
    fn applied(&mut self, client: ClientId, operation: &Operation<T>) {
        debug!(client = %client, operation = %operation, "applied local edit");
    }

    fn received(&mut self, client: ClientId, operation: &Operation<T>) {
        debug!(client = %client, operation = %operation, "received broadcast");
    }

    fn transformed(&mut self, client: ClientId, step: Transformed<'_, T>) {
        trace!(
            client = %client,
            local = %step.local,
            incoming = %step.incoming,
            local_after = %step.local_after,
            incoming_after = %step.incoming_after,
            "transformed incoming operation"
        );
    }

    fn sent(&mut self, client: ClientId, packet: &Packet<T>) {
        trace!(
            client = %client,
            operation = %packet.operation,
            sequence = packet.sequence,
            "queued pending operation"
        );
    }

    fn acknowledged(&mut self, client: ClientId, operation: &Operation<T>) {
        trace!(client = %client, operation = %operation, "pending operation acknowledged");
    }

    fn settled(&mut self, client: ClientId, operation: &Operation<T>) {
        debug!(client = %client, operation = %operation, "applied incoming operation");
    }
}
