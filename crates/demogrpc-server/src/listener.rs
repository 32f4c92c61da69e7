//! TCP accept loop that turns raw connections into authenticated TLS
//! streams.
//!
//! Each accepted socket gets its own handshake task, so a slow or silent
//! peer never delays the next `accept()`. Only streams that complete the
//! handshake are forwarded to tonic; everything else is dropped here.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_rustls::TlsAcceptor;
use tokio_rustls::server::TlsStream;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use crate::error::{HandshakeError, ServerError};

/// Authenticated connections ready for HTTP/2.
pub type TlsIncoming = ReceiverStream<io::Result<TlsStream<TcpStream>>>;

/// Pending authenticated connections not yet picked up by the server.
const INCOMING_BACKLOG: usize = 128;

/// Pause after a failed `accept()` (e.g. file descriptor exhaustion).
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Bind the listening socket.
pub async fn bind(addr: &str) -> Result<TcpListener, ServerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;
    info!(addr, "Listener bound");
    Ok(listener)
}

/// Owner of the running accept loop and, through it, of the listener.
pub struct AcceptLoop {
    task: JoinHandle<()>,
    local_addr: SocketAddr,
}

impl AcceptLoop {
    /// Start accepting on `listener`, handshaking each connection with
    /// `acceptor`.
    pub fn spawn(
        listener: TcpListener,
        acceptor: TlsAcceptor,
        handshake_timeout: Duration,
    ) -> Result<(Self, TlsIncoming), ServerError> {
        let local_addr = listener.local_addr().map_err(ServerError::LocalAddr)?;
        let (tx, rx) = mpsc::channel(INCOMING_BACKLOG);
        let task = tokio::spawn(accept_loop(listener, acceptor, handshake_timeout, tx));

        Ok((Self { task, local_addr }, ReceiverStream::new(rx)))
    }

    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting and release the socket.
    ///
    /// Handshakes already in flight finish on their own and their streams are
    /// discarded.
    pub async fn close(self) -> Result<(), ServerError> {
        self.task.abort();
        match self.task.await {
            Ok(()) => Ok(()),
            Err(e) if e.is_cancelled() => Ok(()),
            Err(e) => Err(ServerError::ListenerClose(e.to_string())),
        }
    }
}

async fn accept_loop(
    listener: TcpListener,
    acceptor: TlsAcceptor,
    handshake_timeout: Duration,
    tx: mpsc::Sender<io::Result<TlsStream<TcpStream>>>,
) {
    loop {
        let accepted = tokio::select! {
            () = tx.closed() => {
                debug!("Server stopped consuming connections, leaving accept loop");
                return;
            }
            accepted = listener.accept() => accepted,
        };

        let (stream, peer) = match accepted {
            Ok(conn) => conn,
            Err(e) => {
                warn!(error = %e, "Failed to accept TCP connection");
                tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                continue;
            }
        };

        let acceptor = acceptor.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            match handshake(&acceptor, stream, handshake_timeout).await {
                Ok(tls) => {
                    let (_, session) = tls.get_ref();
                    debug!(
                        %peer,
                        version = ?session.protocol_version(),
                        client_certs = session.peer_certificates().map_or(0, <[_]>::len),
                        "TLS handshake complete"
                    );
                    if tx.send(Ok(tls)).await.is_err() {
                        debug!(%peer, "Server stopped before connection was served");
                    }
                }
                Err(HandshakeError::Timeout(after)) => {
                    debug!(%peer, ?after, "Dropping connection: handshake timed out");
                }
                Err(e) => {
                    warn!(%peer, error = %e, "Dropping connection");
                }
            }
        });
    }
}

/// Run one server-side handshake under `limit`.
pub async fn handshake(
    acceptor: &TlsAcceptor,
    stream: TcpStream,
    limit: Duration,
) -> Result<TlsStream<TcpStream>, HandshakeError> {
    tokio::time::timeout(limit, acceptor.accept(stream))
        .await
        .map_err(|_| HandshakeError::Timeout(limit))?
        .map_err(HandshakeError::Rejected)
}
