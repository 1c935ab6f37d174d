use otseq::{
    ClientId, ConnectionState, Document, Operation, Packet, Server, ServerError,
    observer::{DummyObserver, RecordingObserver},
    simulation::{Session, SessionError, Step},
    steps,
};

const X: ClientId = ClientId::new(0);
const Y: ClientId = ClientId::new(1);
const Z: ClientId = ClientId::new(2);

#[test]
fn burst_is_accepted_without_round_trip() {
    let mut session = Session::new(Document::from("123"), 2);
    session
        .run(
            [
                Step::Edit(X, Operation::delete(0)),
                Step::Edit(X, Operation::delete(0)),
                Step::Edit(X, Operation::insert(0, 'x')),
            ],
            &mut DummyObserver,
        )
        .unwrap();

    assert_eq!(session.upload(X, &mut DummyObserver).unwrap(), 3);
    assert_eq!(*session.server().document(), Document::from("x3"));
    assert_eq!(session.server().sequence(), 3);
    assert_eq!(
        session.server().connection(X),
        Some(&ConnectionState {
            sequence: 0,
            sequence_offset: 3,
        })
    );

    // the echoes acknowledge all three, one at a time
    assert_eq!(session.download(X, &mut DummyObserver).unwrap(), 3);
    let x = session.client(X).unwrap();
    assert!(x.pending().is_empty());
    assert_eq!(*x.document(), Document::from("x3"));

    // what was resent while the echoes trickled in is stale by now
    assert_eq!(session.upload(X, &mut DummyObserver).unwrap(), 0);
    assert_eq!(session.server().sequence(), 3);

    session.settle(&mut DummyObserver).unwrap();
    assert!(session.is_converged());
}

#[test]
fn concurrent_edit_behind_a_burst_is_retried() {
    let mut session = Session::new(Document::from("123"), 2);
    session
        .run(
            steps![
                edit 0, del 0;
                edit 0, del 0;
                edit 0, ins 0, 'x';
                edit 1, ins 3, '!';
                up 0;
            ],
            &mut DummyObserver,
        )
        .unwrap();

    assert_eq!(session.upload(Y, &mut DummyObserver).unwrap(), 0);
    session.download(Y, &mut DummyObserver).unwrap();
    assert_eq!(
        session.client(Y).unwrap().pending(),
        [Operation::insert(2, '!')]
    );
    // only the resend written after the last broadcast is current
    assert_eq!(session.upload(Y, &mut DummyObserver).unwrap(), 1);
    assert_eq!(*session.server().document(), Document::from("x3!"));

    session.settle(&mut DummyObserver).unwrap();
    assert!(session.is_converged());
}

#[test]
fn stale_packet_is_discarded_until_reconciled() {
    let mut session = Session::new(Document::from("123"), 2);
    let mut observer = RecordingObserver::new();
    session
        .run(
            [
                Step::Edit(X, Operation::delete(1)),
                Step::Edit(Y, Operation::insert(2, 'A')),
                Step::Upload(X),
                Step::Upload(Y),
            ],
            &mut observer,
        )
        .unwrap();

    // the server applied only X's delete
    assert_eq!(*session.server().document(), Document::from("13"));
    assert_eq!(session.server().sequence(), 1);
    assert!(
        observer
            .changes_seen
            .last()
            .unwrap()
            .ends_with("from client 1, ignored")
    );

    // nothing about Y changes until it hears from the server
    let y = session.client(Y).unwrap();
    assert_eq!(*y.document(), Document::from("12A3"));
    assert_eq!(y.pending(), [Operation::insert(2, 'A')]);

    session.download(Y, &mut DummyObserver).unwrap();
    assert_eq!(session.upload(Y, &mut DummyObserver).unwrap(), 1);
    assert_eq!(*session.server().document(), Document::from("1A3"));

    session.settle(&mut DummyObserver).unwrap();
    assert!(session.is_converged());
}

#[test]
fn equal_index_inserts_order_the_same_either_way() {
    for first in [X, Y] {
        let mut session = Session::new(Document::from("123"), 2);
        session
            .run(
                [
                    Step::Edit(X, Operation::insert(0, 'X')),
                    Step::Edit(Y, Operation::insert(0, 'Y')),
                    Step::Upload(first),
                ],
                &mut DummyObserver,
            )
            .unwrap();
        session.settle(&mut DummyObserver).unwrap();
        assert!(session.is_converged());
        assert_eq!(*session.server().document(), Document::from("YX123"));
    }
}

#[test]
fn identical_inserts_collapse() {
    let mut session = Session::new(Document::from("123"), 2);
    session
        .run(
            [
                Step::Edit(X, Operation::insert(1, 'A')),
                Step::Edit(Y, Operation::insert(1, 'A')),
            ],
            &mut DummyObserver,
        )
        .unwrap();
    session.settle(&mut DummyObserver).unwrap();
    assert!(session.is_converged());
    assert_eq!(*session.server().document(), Document::from("1A23"));
    assert_eq!(session.server().sequence(), 1);
}

#[test]
fn three_way() {
    let mut session = Session::new(Document::from("123"), 3);
    session
        .run(
            [
                Step::Edit(X, Operation::delete(0)),
                Step::Edit(Y, Operation::insert(3, 'B')),
                Step::Edit(Z, Operation::delete(2)),
                Step::Upload(Z),
                Step::Upload(Y),
                Step::Upload(X),
            ],
            &mut DummyObserver,
        )
        .unwrap();
    assert_eq!(*session.server().document(), Document::from("12"));
    session.settle(&mut DummyObserver).unwrap();
    assert!(session.is_converged());
    assert_eq!(*session.server().document(), Document::from("2B"));
}

#[test]
fn out_of_range_edit_is_refused() {
    let mut session = Session::new(Document::from("123"), 1);
    let err = session
        .edit(X, Operation::delete(3), &mut DummyObserver)
        .unwrap_err();
    assert!(matches!(err, SessionError::Client { client, .. } if client == X));
    assert_eq!(err.to_string(), "client 0 failed to apply");
    assert!(session.is_converged());
}

#[test]
fn server_rejects_strangers() {
    let mut server = Server::new(Document::from("123"));
    assert_eq!(
        server.receive_from(X, Vec::<Packet<char>>::new(), &mut DummyObserver),
        Err(ServerError::UnknownClient(X))
    );
    server.connect(X).unwrap();
    assert_eq!(server.connect(X), Err(ServerError::AlreadyConnected(X)));
}
