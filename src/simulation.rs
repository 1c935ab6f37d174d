// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! An in-memory transport for running whole sessions in a single thread.
//!
//! A [`Session`] owns one [`Server`] and a fixed set of [`Client`]s that all start from the same
//! document. Nothing moves on its own: packets travel from a client to the server only on
//! [`Session::upload`], and broadcasts travel from the server to a client only on
//! [`Session::download`]. Each link delivers in FIFO order and never loses or duplicates a
//! message, which is exactly what the protocol asks of a real transport. Choosing the order of
//! uploads and downloads across clients is how tests explore different network interleavings.
//!
//! ```rust
//! use otseq::{
//!     ClientId, Document, Operation,
//!     observer::DummyObserver,
//!     simulation::{Session, Step},
//! };
//!
//! let mut session = Session::new(Document::from("123"), 2);
//! let (x, y) = (ClientId::new(0), ClientId::new(1));
//! session
//!     .run(
//!         [
//!             Step::Edit(x, Operation::insert(0, 'X')),
//!             Step::Edit(y, Operation::insert(0, 'Y')),
//!             Step::Upload(x),
//!             Step::Upload(y),
//!             Step::Download(y),
//!         ],
//!         &mut DummyObserver,
//!     )
//!     .unwrap();
//! session.settle(&mut DummyObserver).unwrap();
//! assert!(session.is_converged());
//! assert_eq!(*session.server().document(), Document::from("YX123"));
//! ```
use crate::{
    ApplyError, Client, ClientId, Document, Operation, Server, ServerError,
    observer::{ClientObserver, ServerObserver},
};
use std::fmt;

/// How many upload/download rounds [`Session::settle`] runs before giving up.
pub const MAX_SETTLE_ROUNDS: usize = 1_000;

/// One thing that can happen in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<T> {
    /// The client applies a local edit.
    Edit(ClientId, Operation<T>),
    /// Everything the client has queued is delivered to the server.
    Upload(ClientId),
    /// Everything the server has queued for the client is delivered to it.
    Download(ClientId),
}

/// Error returned by [`Session`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No client with this id takes part in the session.
    UnknownClient(ClientId),
    /// The server failed to process an upload.
    Server(ServerError),
    /// A client failed to apply an edit or a broadcast.
    Client { client: ClientId, error: ApplyError },
    /// Messages were still in flight after this many rounds.
    Unsettled { rounds: usize },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::UnknownClient(client) => {
                write!(f, "client {client} is not part of the session")
            }
            SessionError::Server(_) => f.write_str("server failed to process upload"),
            SessionError::Client { client, .. } => write!(f, "client {client} failed to apply"),
            SessionError::Unsettled { rounds } => {
                write!(f, "session did not settle within {rounds} rounds")
            }
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Server(e) => Some(e),
            SessionError::Client { error, .. } => Some(error),
            SessionError::UnknownClient(_) | SessionError::Unsettled { .. } => None,
        }
    }
}

impl From<ServerError> for SessionError {
    fn from(e: ServerError) -> Self {
        SessionError::Server(e)
    }
}

/// A server and its clients, connected by in-memory FIFO links.
#[derive(Debug, Clone)]
pub struct Session<T> {
    server: Server<T>,
    clients: Vec<Client<T>>,
}

impl<T> Session<T>
where
    T: Clone + Ord,
{
    /// Creates a session with `clients` clients, numbered from zero, all holding `document`.
    pub fn new(document: Document<T>, clients: u32) -> Self {
        let mut server = Server::new(document.clone());
        let clients = (0..clients)
            .map(|id| {
                let id = ClientId::new(id);
                let connected = server.connect(id);
                debug_assert!(connected.is_ok(), "client ids are unique");
                Client::new(id, document.clone())
            })
            .collect();
        Self { server, clients }
    }

    pub fn server(&self) -> &Server<T> {
        &self.server
    }

    pub fn clients(&self) -> &[Client<T>] {
        &self.clients
    }

    pub fn client(&self, id: ClientId) -> Option<&Client<T>> {
        self.clients.get(id.get() as usize)
    }

    fn client_mut(&mut self, id: ClientId) -> Result<&mut Client<T>, SessionError> {
        self.clients
            .get_mut(id.get() as usize)
            .ok_or(SessionError::UnknownClient(id))
    }

    /// Lets client `id` apply a local edit.
    pub fn edit<O>(
        &mut self,
        id: ClientId,
        operation: Operation<T>,
        observer: &mut O,
    ) -> Result<(), SessionError>
    where
        O: ClientObserver<T> + ?Sized,
    {
        self.client_mut(id)?
            .apply(operation, observer)
            .map_err(|error| SessionError::Client { client: id, error })
    }

    /// Delivers everything client `id` has queued to the server and returns how many packets
    /// were accepted.
    pub fn upload<O>(&mut self, id: ClientId, observer: &mut O) -> Result<usize, SessionError>
    where
        O: ServerObserver<T> + ?Sized,
    {
        let client = self
            .clients
            .get_mut(id.get() as usize)
            .ok_or(SessionError::UnknownClient(id))?;
        Ok(self
            .server
            .receive_from(id, client.drain_outgoing(), observer)?)
    }

    /// Delivers everything the server has queued for client `id` and returns how many
    /// broadcasts were delivered.
    pub fn download<O>(&mut self, id: ClientId, observer: &mut O) -> Result<usize, SessionError>
    where
        O: ClientObserver<T> + ?Sized,
    {
        let client = self
            .clients
            .get_mut(id.get() as usize)
            .ok_or(SessionError::UnknownClient(id))?;
        let mut delivered = 0;
        for operation in self.server.drain_outgoing(id)? {
            client
                .receive(operation, observer)
                .map_err(|error| SessionError::Client { client: id, error })?;
            delivered += 1;
        }
        Ok(delivered)
    }

    /// Performs `steps` in order.
    pub fn run<I, O>(&mut self, steps: I, observer: &mut O) -> Result<(), SessionError>
    where
        I: IntoIterator<Item = Step<T>>,
        O: ServerObserver<T> + ClientObserver<T> + ?Sized,
    {
        for step in steps {
            match step {
                Step::Edit(id, operation) => self.edit(id, operation, observer)?,
                Step::Upload(id) => {
                    self.upload(id, observer)?;
                }
                Step::Download(id) => {
                    self.download(id, observer)?;
                }
            }
        }
        Ok(())
    }

    /// Uploads and downloads for every client, round after round, until nothing is in flight.
    ///
    /// Returns the number of rounds it took.
    pub fn settle<O>(&mut self, observer: &mut O) -> Result<usize, SessionError>
    where
        O: ServerObserver<T> + ClientObserver<T> + ?Sized,
    {
        for round in 0..MAX_SETTLE_ROUNDS {
            if self.is_quiescent() {
                return Ok(round);
            }
            for id in self.ids() {
                self.upload(id, observer)?;
            }
            for id in self.ids() {
                self.download(id, observer)?;
            }
        }
        if self.is_quiescent() {
            Ok(MAX_SETTLE_ROUNDS)
        } else {
            Err(SessionError::Unsettled {
                rounds: MAX_SETTLE_ROUNDS,
            })
        }
    }

    fn ids(&self) -> Vec<ClientId> {
        self.clients.iter().map(Client::id).collect()
    }

    /// Whether no packet and no broadcast is waiting to be delivered.
    pub fn is_quiescent(&self) -> bool {
        self.clients
            .iter()
            .all(|c| !c.has_outgoing() && !self.server.has_outgoing(c.id()))
    }

    /// Whether every client holds the server's document and has nothing left to submit.
    pub fn is_converged(&self) -> bool {
        self.is_quiescent()
            && self.clients.iter().all(|c| {
                c.document() == self.server.document()
                    && c.pending().iter().all(Operation::is_noop)
            })
    }
}
