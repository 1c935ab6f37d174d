// (c) Copyright 2025 Helsing GmbH. All rights reserved.
/// Convenience macro for creating operations in the compact log notation.
///
/// ```rust
/// # use otseq::{op, Operation};
/// assert_eq!(op!(nop), Operation::<char>::NoOp);
/// assert_eq!(op!(del 1), Operation::<char>::delete(1));
/// assert_eq!(op!(ins 2, 'A'), Operation::insert(2, 'A'));
/// ```
#[macro_export]
macro_rules! op {
    (nop) => {
        $crate::Operation::NoOp
    };
    (del $index:expr) => {
        $crate::Operation::Delete { index: $index }
    };
    (ins $index:expr, $data:expr) => {
        $crate::Operation::Insert {
            index: $index,
            data: $data,
        }
    };
}

/// Convenience macro for writing down a [`Session`](crate::simulation::Session) script.
///
/// Clients are referred to by their number.
///
/// ```rust
/// # use otseq::{steps, Document, observer::DummyObserver, simulation::Session};
/// let mut session = Session::new(Document::from("123"), 2);
/// session
///     .run(
///         steps![
///             edit 0, del 1;
///             edit 1, ins 2, 'A';
///             up 0;
///             up 1;
///         ],
///         &mut DummyObserver,
///     )
///     .unwrap();
/// assert_eq!(*session.server().document(), Document::from("13"));
/// ```
///
/// NOTE! Every step, including the last one, must be terminated by `;`.
#[macro_export]
macro_rules! steps {
    (@munch [$($out:expr),*]) => {
        vec![$($out),*]
    };
    (@munch [$($out:expr),*] edit $client:literal, nop; $($rest:tt)*) => {
        $crate::steps!(@munch [$($out,)* $crate::simulation::Step::Edit(
            $crate::ClientId::new($client),
            $crate::op!(nop),
        )] $($rest)*)
    };
    (@munch [$($out:expr),*] edit $client:literal, del $index:expr; $($rest:tt)*) => {
        $crate::steps!(@munch [$($out,)* $crate::simulation::Step::Edit(
            $crate::ClientId::new($client),
            $crate::op!(del $index),
        )] $($rest)*)
    };
    (@munch [$($out:expr),*] edit $client:literal, ins $index:expr, $data:expr; $($rest:tt)*) => {
        $crate::steps!(@munch [$($out,)* $crate::simulation::Step::Edit(
            $crate::ClientId::new($client),
            $crate::op!(ins $index, $data),
        )] $($rest)*)
    };
    (@munch [$($out:expr),*] up $client:literal; $($rest:tt)*) => {
        $crate::steps!(@munch [$($out,)* $crate::simulation::Step::Upload(
            $crate::ClientId::new($client),
        )] $($rest)*)
    };
    (@munch [$($out:expr),*] down $client:literal; $($rest:tt)*) => {
        $crate::steps!(@munch [$($out,)* $crate::simulation::Step::Download(
            $crate::ClientId::new($client),
        )] $($rest)*)
    };
    ($($tokens:tt)*) => {
        $crate::steps!(@munch [] $($tokens)*)
    };
}
