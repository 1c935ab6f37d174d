// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! The authoritative side of the synchronization protocol.
//!
//! A [`Server`] owns the canonical [`Document`] and a global sequence number counting the
//! operations it has accepted. Each connected client has a [`ConnectionState`] and a queue of
//! broadcasts waiting to be delivered to it.
//!
//! Packets are accepted only if they were written against the server's current version;
//! anything else lost a race against another client and is dropped without further ado. The
//! client notices when the winning operation is broadcast to it, transforms its own operation
//! past it and sends it again.
use crate::{ApplyError, ClientId, Document, Operation, Packet, observer::ServerObserver};
use ahash::RandomState;
use std::{
    collections::{HashMap, VecDeque, vec_deque},
    fmt,
};

/// Per-client bookkeeping kept by the server.
///
/// `sequence` is the client-assigned sequence of the last accepted packet, and `sequence_offset`
/// counts how many packets carrying that same sequence have been accepted. Together they let a
/// client send a run of operations at one version without waiting for a round trip each.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionState {
    pub sequence: u64,
    pub sequence_offset: u64,
}

impl ConnectionState {
    /// The version a packet with `sequence` is actually written against.
    ///
    /// Packets continuing the current run are treated as following the last accepted one.
    pub fn effective_sequence(&self, sequence: u64) -> u64 {
        if self.sequence == sequence {
            sequence + self.sequence_offset
        } else {
            sequence
        }
    }

    /// Records that a packet with `sequence` was accepted.
    fn accept(&mut self, sequence: u64) {
        if self.sequence != sequence {
            self.sequence_offset = 0;
        }
        self.sequence = sequence;
        self.sequence_offset += 1;
    }
}

#[derive(Debug, Clone)]
struct Connection<T> {
    outgoing: VecDeque<Operation<T>>,
    state: ConnectionState,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self {
            outgoing: VecDeque::new(),
            state: ConnectionState::default(),
        }
    }
}

/// Error returned by [`Server`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerError {
    /// The client was never connected.
    UnknownClient(ClientId),
    /// The client is already connected.
    AlreadyConnected(ClientId),
    /// An accepted packet did not fit the server document.
    Apply(ApplyError),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::UnknownClient(client) => write!(f, "client {client} is not connected"),
            ServerError::AlreadyConnected(client) => {
                write!(f, "client {client} is already connected")
            }
            ServerError::Apply(_) => f.write_str("accepted operation could not be applied"),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::Apply(e) => Some(e),
            ServerError::UnknownClient(_) | ServerError::AlreadyConnected(_) => None,
        }
    }
}

impl From<ApplyError> for ServerError {
    fn from(e: ApplyError) -> Self {
        ServerError::Apply(e)
    }
}

/// The server of the synchronization protocol.
///
/// ```rust
/// # use otseq::{ClientId, Document, Operation, Packet, Server, observer::DummyObserver};
/// let mut server = Server::new(Document::from("abc"));
/// let alice = ClientId::new(0);
/// server.connect(alice).unwrap();
///
/// let packet = Packet { sequence: 0, operation: Operation::delete(0) };
/// let accepted = server.receive_from(alice, [packet], &mut DummyObserver).unwrap();
/// assert_eq!(accepted, 1);
/// assert_eq!(*server.document(), Document::from("bc"));
///
/// // the operation is echoed back to its author
/// let echoed: Vec<_> = server.drain_outgoing(alice).unwrap().collect();
/// assert_eq!(echoed, [Operation::delete(0)]);
/// ```
#[derive(Debug, Clone)]
pub struct Server<T> {
    document: Document<T>,
    sequence: u64,
    connections: HashMap<ClientId, Connection<T>, RandomState>,
}

impl<T> Server<T>
where
    T: Clone,
{
    pub fn new(document: Document<T>) -> Self {
        Self {
            document,
            sequence: 0,
            connections: HashMap::default(),
        }
    }

    /// The canonical document.
    pub fn document(&self) -> &Document<T> {
        &self.document
    }

    /// The number of operations accepted so far, i.e. the current version of the document.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn connection(&self, client: ClientId) -> Option<&ConnectionState> {
        self.connections.get(&client).map(|c| &c.state)
    }

    /// The connected clients, in no particular order.
    pub fn clients(&self) -> impl Iterator<Item = ClientId> + '_ {
        self.connections.keys().copied()
    }

    /// Whether broadcasts are waiting to be delivered to `client`.
    pub fn has_outgoing(&self, client: ClientId) -> bool {
        self.connections
            .get(&client)
            .is_some_and(|c| !c.outgoing.is_empty())
    }

    /// Registers a new client.
    ///
    /// All clients must start out with the document the server was created with, and must
    /// connect before the first operation is accepted.
    pub fn connect(&mut self, client: ClientId) -> Result<(), ServerError> {
        if self.connections.contains_key(&client) {
            return Err(ServerError::AlreadyConnected(client));
        }
        self.connections.insert(client, Connection::default());
        Ok(())
    }

    /// Processes packets sent by `client`, in order, and returns how many were accepted.
    ///
    /// A packet is accepted if its effective sequence (see
    /// [`ConnectionState::effective_sequence`]) equals the server's sequence. It is then applied
    /// to the document and broadcast to every client, including `client`. Other packets are
    /// discarded.
    ///
    /// If an accepted packet does not fit the document, processing stops with
    /// [`ServerError::Apply`]; that packet leaves no trace and the remaining packets are dropped.
    pub fn receive_from<I, O>(
        &mut self,
        client: ClientId,
        packets: I,
        observer: &mut O,
    ) -> Result<usize, ServerError>
    where
        I: IntoIterator<Item = Packet<T>>,
        O: ServerObserver<T> + ?Sized,
    {
        let mut state = self
            .connections
            .get(&client)
            .ok_or(ServerError::UnknownClient(client))?
            .state;

        let mut accepted = 0;
        for packet in packets {
            let effective_sequence = state.effective_sequence(packet.sequence);
            if effective_sequence != self.sequence {
                observer.rejected(client, &packet, effective_sequence, self.sequence);
                continue;
            }

            self.document.apply_in_place(&packet.operation)?;
            self.sequence += 1;
            state.accept(packet.sequence);
            observer.accepted(client, &packet, effective_sequence);

            // broadcast, echoing back to the author as well
            for (&id, connection) in &mut self.connections {
                if id == client {
                    connection.state = state;
                }
                connection.outgoing.push_back(packet.operation.clone());
            }
            accepted += 1;
        }
        Ok(accepted)
    }

    /// Takes the broadcasts waiting for `client`, oldest first.
    pub fn drain_outgoing(
        &mut self,
        client: ClientId,
    ) -> Result<vec_deque::Drain<'_, Operation<T>>, ServerError> {
        let connection = self
            .connections
            .get_mut(&client)
            .ok_or(ServerError::UnknownClient(client))?;
        Ok(connection.outgoing.drain(..))
    }
}

impl<T: fmt::Display> fmt::Display for Server<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[server, document {}, sequence {}]",
            self.document, self.sequence
        )
    }
}
