//! Server startup helpers.

mod listener;

pub use listener::{
    start_listening, AttemptOutcome, ListenAttempt, ListenError, ListenerHandle, PortBinder,
    RetryPolicy, TcpBinder,
};
