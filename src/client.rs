// (c) Copyright 2025 Helsing GmbH. All rights reserved.
use crate::{
    ApplyError, ClientId, Document, Operation, Packet,
    observer::{ClientObserver, Transformed},
    transform,
};
use smallvec::SmallVec;
use std::{
    collections::{VecDeque, vec_deque},
    fmt,
};

/// A replica of the document that edits optimistically and reconciles with a [`Server`].
///
/// Local edits are applied right away, remembered as *pending* and queued for the server. Every
/// operation the server broadcasts (including the client's own, once accepted) is passed to
/// [`Client::receive`], which transforms it past the pending operations before applying it.
///
/// A pending operation that transforms into a no-op has been incorporated by the server and is
/// dropped; that is the only form of acknowledgement in the protocol. Any other pending operation
/// is rewritten against the newer server state and queued again, because the server may have
/// discarded its previous submission as stale.
///
/// ```rust
/// # use otseq::{Client, ClientId, Document, Operation, observer::DummyObserver};
/// let mut client = Client::new(ClientId::new(0), Document::from("123"));
/// client.apply(Operation::delete(1), &mut DummyObserver).unwrap();
/// assert_eq!(*client.document(), Document::from("13"));
/// assert_eq!(client.pending(), [Operation::delete(1)]);
///
/// // someone else's insert arrives first and our delete moves along with it
/// client.receive(Operation::insert(0, 'A'), &mut DummyObserver).unwrap();
/// assert_eq!(*client.document(), Document::from("A13"));
/// assert_eq!(client.pending(), [Operation::delete(2)]);
///
/// // then our own delete comes back, which acknowledges it
/// client.receive(Operation::delete(2), &mut DummyObserver).unwrap();
/// assert!(client.pending().is_empty());
/// assert_eq!(*client.document(), Document::from("A13"));
/// ```
///
/// [`Server`]: crate::Server
#[derive(Debug, Clone)]
pub struct Client<T> {
    id: ClientId,
    document: Document<T>,
    received: u64,
    pending: SmallVec<[Operation<T>; 4]>,
    outgoing: VecDeque<Packet<T>>,
}

impl<T> Client<T>
where
    T: Clone + Ord,
{
    /// Creates a client whose document must match the server's initial document.
    pub fn new(id: ClientId, document: Document<T>) -> Self {
        Self {
            id,
            document,
            received: 0,
            pending: SmallVec::new(),
            outgoing: VecDeque::new(),
        }
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    /// The local, optimistic document.
    pub fn document(&self) -> &Document<T> {
        &self.document
    }

    /// The number of broadcasts received so far.
    pub fn received(&self) -> u64 {
        self.received
    }

    /// Local operations not yet incorporated by the server, oldest first.
    pub fn pending(&self) -> &[Operation<T>] {
        &self.pending
    }

    /// Whether packets are waiting to be sent to the server.
    pub fn has_outgoing(&self) -> bool {
        !self.outgoing.is_empty()
    }

    /// Takes the packets waiting for the server, oldest first.
    pub fn drain_outgoing(&mut self) -> vec_deque::Drain<'_, Packet<T>> {
        self.outgoing.drain(..)
    }

    /// Applies a local edit to the document and queues it for the server.
    ///
    /// No-ops are remembered as pending but never sent.
    pub fn apply<O>(&mut self, operation: Operation<T>, observer: &mut O) -> Result<(), ApplyError>
    where
        O: ClientObserver<T> + ?Sized,
    {
        self.document.apply_in_place(&operation)?;
        observer.applied(self.id, &operation);
        self.send(operation.clone(), observer);
        self.pending.push(operation);
        Ok(())
    }

    /// Reconciles an operation broadcast by the server and applies it to the document.
    ///
    /// The operation is transformed past every pending local operation in the order they were
    /// issued. Once it has been reduced to a no-op, the remaining pending operations are sent
    /// again unchanged instead of being transformed.
    ///
    /// If the final operation does not fit the document, the error is returned and the client is
    /// left exactly as it was: same document, received count, pending operations and outgoing
    /// queue. Such an error means the client and server have diverged and the session is broken.
    pub fn receive<O>(
        &mut self,
        operation: Operation<T>,
        observer: &mut O,
    ) -> Result<(), ApplyError>
    where
        O: ClientObserver<T> + ?Sized,
    {
        observer.received(self.id, &operation);

        let mut incoming = operation;
        let mut pending = SmallVec::<[Operation<T>; 4]>::new();
        for local in &self.pending {
            if incoming.is_noop() {
                // nothing left to transform against, but the server may still have discarded
                // this one, so it goes up again
                pending.push(local.clone());
                continue;
            }

            let (local_after, incoming_after) = transform(local.clone(), incoming.clone());
            observer.transformed(
                self.id,
                Transformed {
                    local,
                    incoming: &incoming,
                    local_after: &local_after,
                    incoming_after: &incoming_after,
                },
            );
            incoming = incoming_after;

            if local_after.is_noop() {
                observer.acknowledged(self.id, local);
            } else {
                pending.push(local_after);
            }
        }

        // nothing is committed until the incoming operation fits
        self.document.apply_in_place(&incoming)?;
        self.received += 1;
        for operation in &pending {
            self.send(operation.clone(), observer);
        }
        self.pending = pending;
        observer.settled(self.id, &incoming);
        Ok(())
    }

    fn send<O>(&mut self, operation: Operation<T>, observer: &mut O)
    where
        O: ClientObserver<T> + ?Sized,
    {
        if operation.is_noop() {
            return;
        }
        let packet = Packet {
            sequence: self.received,
            operation,
        };
        observer.sent(self.id, &packet);
        self.outgoing.push_back(packet);
    }
}

impl<T: fmt::Display> fmt::Display for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[client {}, document {}, sequence {}]",
            self.id, self.document, self.received
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{DummyObserver, RecordingObserver, test::CountingObserver};

    fn client(doc: &str) -> Client<char> {
        Client::new(ClientId::new(0), Document::from(doc))
    }

    #[test]
    fn apply_is_optimistic_and_queued() {
        let mut c = client("123");
        c.apply(Operation::insert(3, '4'), &mut DummyObserver)
            .unwrap();
        assert_eq!(*c.document(), Document::from("1234"));
        assert_eq!(c.pending(), [Operation::insert(3, '4')]);
        let sent: Vec<_> = c.drain_outgoing().collect();
        assert_eq!(
            sent,
            [Packet {
                sequence: 0,
                operation: Operation::insert(3, '4')
            }]
        );
        assert!(!c.has_outgoing());
    }

    #[test]
    fn burst_shares_a_sequence() {
        let mut c = client("123");
        for op in [
            Operation::delete(0),
            Operation::delete(0),
            Operation::insert(0, 'x'),
        ] {
            c.apply(op, &mut DummyObserver).unwrap();
        }
        let sequences: Vec<_> = c.drain_outgoing().map(|p| p.sequence).collect();
        assert_eq!(sequences, [0, 0, 0]);
        assert_eq!(*c.document(), Document::from("x3"));
    }

    #[test]
    fn noop_is_pending_but_never_sent() {
        let mut c = client("123");
        c.apply(Operation::NoOp, &mut DummyObserver).unwrap();
        assert_eq!(c.pending(), [Operation::NoOp]);
        assert!(!c.has_outgoing());
    }

    #[test]
    fn invalid_local_edit_is_refused() {
        let mut c = client("123");
        assert!(c.apply(Operation::delete(3), &mut DummyObserver).is_err());
        assert!(c.pending().is_empty());
        assert!(!c.has_outgoing());
        assert_eq!(*c.document(), Document::from("123"));
    }

    #[test]
    fn remote_operation_without_pending() {
        let mut c = client("123");
        c.receive(Operation::insert(0, 'A'), &mut DummyObserver)
            .unwrap();
        assert_eq!(c.received(), 1);
        assert_eq!(*c.document(), Document::from("A123"));
        assert!(!c.has_outgoing());
    }

    #[test]
    fn own_operation_echo_acknowledges() {
        let mut c = client("123");
        c.apply(Operation::delete(1), &mut DummyObserver).unwrap();
        c.drain_outgoing().for_each(drop);

        let mut observer = CountingObserver::default();
        c.receive(Operation::delete(1), &mut observer).unwrap();
        assert_eq!(observer.acknowledged, 1);
        assert_eq!(observer.sent, 0);
        assert!(c.pending().is_empty());
        assert_eq!(*c.document(), Document::from("13"));
    }

    #[test]
    fn concurrent_operation_rewrites_and_resends_pending() {
        let mut c = client("123");
        c.apply(Operation::insert(2, 'A'), &mut DummyObserver)
            .unwrap();
        c.drain_outgoing().for_each(drop);

        // another client's delete won the race
        c.receive(Operation::delete(1), &mut DummyObserver).unwrap();
        assert_eq!(*c.document(), Document::from("1A3"));
        assert_eq!(c.pending(), [Operation::insert(1, 'A')]);
        let resent: Vec<_> = c.drain_outgoing().collect();
        assert_eq!(
            resent,
            [Packet {
                sequence: 1,
                operation: Operation::insert(1, 'A')
            }]
        );
    }

    #[test]
    fn noop_broadcast_resends_pending_unchanged() {
        let mut c = client("123");
        c.apply(Operation::delete(0), &mut DummyObserver).unwrap();
        c.drain_outgoing().for_each(drop);

        c.receive(Operation::NoOp, &mut DummyObserver).unwrap();
        assert_eq!(c.received(), 1);
        assert_eq!(c.pending(), [Operation::delete(0)]);
        assert_eq!(*c.document(), Document::from("23"));
        let resent: Vec<_> = c.drain_outgoing().collect();
        assert_eq!(
            resent,
            [Packet {
                sequence: 1,
                operation: Operation::delete(0)
            }]
        );
    }

    #[test]
    fn failed_receive_leaves_client_untouched() {
        let mut c = client("123");
        c.apply(Operation::delete(0), &mut DummyObserver).unwrap();
        c.drain_outgoing().for_each(drop);

        // shifted down to del(4), which "23" cannot take
        let err = c
            .receive(Operation::delete(5), &mut DummyObserver)
            .unwrap_err();
        assert_eq!(
            err,
            ApplyError::IndexOutOfRange {
                kind: crate::OperationKind::Delete,
                index: 4,
                len: 2,
            }
        );
        assert_eq!(c.received(), 0);
        assert_eq!(c.pending(), [Operation::delete(0)]);
        assert_eq!(c.drain_outgoing().count(), 0);
        assert_eq!(*c.document(), Document::from("23"));
    }

    #[test]
    fn cancelled_incoming_stops_transforming() {
        let mut c = client("123");
        c.apply(Operation::insert(0, 'A'), &mut DummyObserver)
            .unwrap();
        c.apply(Operation::delete(3), &mut DummyObserver).unwrap();
        c.drain_outgoing().for_each(drop);
        assert_eq!(*c.document(), Document::from("A12"));

        // the first pending op is echoed back; the second must survive untouched
        let mut observer = RecordingObserver::new();
        c.receive(Operation::insert(0, 'A'), &mut observer).unwrap();
        assert_eq!(c.pending(), [Operation::delete(3)]);
        assert_eq!(*c.document(), Document::from("A12"));
        insta::assert_snapshot!(observer.log(), @r"
        client 0 got ins(0, A)
        client 0 ran transform on [ins(0, A), ins(0, A)], got [nop, nop]
        client 0 acknowledged ins(0, A)
        client 0 sent del(3) @ 1
        client 0 applied incoming nop
        ");
    }

    #[test]
    fn pending_walk_keeps_issue_order() {
        let mut c = client("abc");
        c.apply(Operation::insert(0, 'x'), &mut DummyObserver)
            .unwrap();
        c.apply(Operation::insert(0, 'y'), &mut DummyObserver)
            .unwrap();
        c.drain_outgoing().for_each(drop);
        assert_eq!(*c.document(), Document::from("yxabc"));

        // a remote delete of 'c' must move past both inserts
        c.receive(Operation::delete(2), &mut DummyObserver).unwrap();
        assert_eq!(*c.document(), Document::from("yxab"));
        assert_eq!(
            c.pending(),
            [Operation::insert(0, 'x'), Operation::insert(0, 'y')]
        );
        let resent: Vec<_> = c.drain_outgoing().map(|p| p.sequence).collect();
        assert_eq!(resent, [1, 1]);
    }

    #[test]
    fn display() {
        let c = client("123");
        assert_eq!(c.to_string(), r#"[client 0, document "123", sequence 0]"#);
    }
}
