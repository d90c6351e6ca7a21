use std::future::Future;
use std::io;
use std::net::{IpAddr, SocketAddr};

use tokio::net::TcpListener;
use tracing::{info, warn};

const DEFAULT_MAX_RETRIES: u16 = 10;

/// Abstraction over "bind and listen on an address" so the retry loop can run
/// against real sockets or a scripted binder.
pub trait PortBinder {
    type Listener;

    fn bind(&self, addr: SocketAddr) -> impl Future<Output = io::Result<Self::Listener>> + Send;

    /// Port actually held by the listener. Differs from the requested one when binding port 0.
    fn local_port(&self, _listener: &Self::Listener) -> Option<u16> {
        None
    }
}

/// Binds Tokio TCP listeners.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpBinder;

impl PortBinder for TcpBinder {
    type Listener = TcpListener;

    fn bind(&self, addr: SocketAddr) -> impl Future<Output = io::Result<TcpListener>> + Send {
        TcpListener::bind(addr)
    }

    fn local_port(&self, listener: &TcpListener) -> Option<u16> {
        listener.local_addr().ok().map(|addr| addr.port())
    }
}

/// Upper bound on how far the bootstrap walks past the preferred port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. `max_retries = 5` tries `P..=P+5`.
    pub max_retries: u16,
}

impl RetryPolicy {
    pub fn new(max_retries: u16) -> Self {
        Self { max_retries }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Bound,
    AddressInUse,
    Rejected(io::ErrorKind),
}

/// One candidate port and what happened when binding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenAttempt {
    pub port: u16,
    pub outcome: AttemptOutcome,
}

#[derive(Debug, thiserror::Error)]
pub enum ListenError {
    #[error("failed to bind port {port}: {source}")]
    BindFailure {
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("ports {first_port}..={last_port} are all in use ({attempts} attempts)")]
    RetryExhausted {
        first_port: u16,
        last_port: u16,
        attempts: usize,
    },
}

/// A bound listener together with the port it ended up on.
#[derive(Debug)]
pub struct ListenerHandle<L> {
    listener: L,
    port: u16,
    attempts: Vec<ListenAttempt>,
}

impl<L> ListenerHandle<L> {
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn attempts(&self) -> &[ListenAttempt] {
        &self.attempts
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn into_listener(self) -> L {
        self.listener
    }
}

enum ListenState<L> {
    Attempting(u16),
    Bound { port: u16, listener: L },
    Failed(ListenError),
}

/// Binds `host:preferred_port`, moving one port up on every "address in use"
/// until a bind succeeds or the retry budget runs out. Any other bind error
/// fails immediately. Attempts are strictly sequential.
pub async fn start_listening<B>(
    binder: &B,
    host: IpAddr,
    preferred_port: u16,
    policy: RetryPolicy,
) -> Result<ListenerHandle<B::Listener>, ListenError>
where
    B: PortBinder,
{
    let mut attempts = Vec::new();
    let mut state = ListenState::Attempting(preferred_port);

    loop {
        state = match state {
            ListenState::Attempting(port) => {
                match binder.bind(SocketAddr::new(host, port)).await {
                    Ok(listener) => {
                        attempts.push(ListenAttempt {
                            port,
                            outcome: AttemptOutcome::Bound,
                        });
                        let port = binder.local_port(&listener).unwrap_or(port);
                        ListenState::Bound { port, listener }
                    }
                    Err(err) if err.kind() == io::ErrorKind::AddrInUse => {
                        attempts.push(ListenAttempt {
                            port,
                            outcome: AttemptOutcome::AddressInUse,
                        });
                        let next = port
                            .checked_add(1)
                            .filter(|_| port - preferred_port < policy.max_retries);
                        match next {
                            Some(next) => {
                                warn!(port, next, "port is busy, trying the next one");
                                ListenState::Attempting(next)
                            }
                            None => ListenState::Failed(ListenError::RetryExhausted {
                                first_port: preferred_port,
                                last_port: port,
                                attempts: attempts.len(),
                            }),
                        }
                    }
                    Err(source) => {
                        attempts.push(ListenAttempt {
                            port,
                            outcome: AttemptOutcome::Rejected(source.kind()),
                        });
                        ListenState::Failed(ListenError::BindFailure { port, source })
                    }
                }
            }
            ListenState::Bound { port, listener } => {
                info!(port, attempts = attempts.len(), "listener bound");
                return Ok(ListenerHandle {
                    listener,
                    port,
                    attempts,
                });
            }
            ListenState::Failed(err) => return Err(err),
        };
    }
}
