// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! The example simulates two clients editing the same document at the same time. Both edit
//! before hearing from each other, the server only accepts the edit that arrives first, and the
//! losing client rewrites and resends its edit until everyone holds the same document.
//!
//! Run with `RUST_LOG=otseq=trace` to see every step of the protocol.

use otseq::{
    ClientId, Document, Operation,
    observer::TracingObserver,
    simulation::{Session, Step},
};
use std::error::Error;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let alice = ClientId::new(0);
    let bob = ClientId::new(1);

    // Both clients start from the same document as the server.
    let mut session = Session::new(Document::from("123"), 2);
    let mut observer = TracingObserver;

    session.run(
        [
            // Alice deletes the '2' while Bob inserts an 'A' in front of the '3'. Neither has
            // seen the other's edit.
            Step::Edit(alice, Operation::delete(1)),
            Step::Edit(bob, Operation::insert(2, 'A')),
            // Alice's packet reaches the server first and is accepted. Bob's packet was written
            // against the same version and is discarded as stale.
            Step::Upload(alice),
            Step::Upload(bob),
        ],
        &mut observer,
    )?;
    println!("server after first round: {}", session.server());

    // Bob learns about Alice's delete. His insert is transformed past it, becoming an insert at
    // index 1, and is queued for the server again.
    session.download(bob, &mut observer)?;
    println!("bob after catching up:    {}", session.client(bob).ok_or("bob is missing")?);

    // Deliver everything that is still in flight.
    let rounds = session.settle(&mut observer)?;
    println!("settled after {rounds} more round(s)");

    for client in session.clients() {
        println!("{client}");
    }
    println!("{}", session.server());
    assert!(session.is_converged());
    assert_eq!(*session.server().document(), Document::from("1A3"));

    Ok(())
}
