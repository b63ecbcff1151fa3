use std::{net::SocketAddr, sync::Arc};

use async_trait::async_trait;
use essentials::{debug, error, info, warn};
use http::{header, StatusCode};
use tokio::{
    io::{self, AsyncWriteExt, BufReader},
    net::TcpStream,
};

use crate::{
    http::{server::ConnectionHandler, HeaderMapExt, Incoming, ReadIncoming, Reply, WriteReply},
    Error, Router,
};

/// Serves one request per connection through a shared [`Router`].
pub struct RouterService {
    router: Arc<Router>,
}

impl RouterService {
    pub fn new(router: Router) -> Self {
        Self {
            router: Arc::new(router),
        }
    }

    async fn dispatch(&self, incoming: Incoming) -> Reply {
        let router = self.router.clone();
        let method = incoming.method.clone();
        let uri = incoming.uri.clone();
        match tokio::task::spawn_blocking(move || router.route(&incoming, None)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e @ (Error::InvalidPath | Error::QueryMismatch(_)))) => {
                info!(method = %method, uri = %uri, "{e}");
                Reply::new(StatusCode::NOT_FOUND)
            }
            Ok(Err(e)) => {
                error!(method = %method, uri = %uri, "{e}");
                Reply::error()
            }
            Err(e) => {
                error!(method = %method, uri = %uri, "Handler panicked: {e}");
                Reply::error()
            }
        }
    }

    async fn serve(&self, ip: Option<SocketAddr>, stream: &mut TcpStream) -> io::Result<()> {
        let (rx, mut tx) = stream.split();
        let mut reader = BufReader::new(rx);
        let mut reply = match reader.read_incoming().await {
            Ok(incoming) => {
                debug!(ip = ?ip, request = ?incoming, "Parsed request");
                self.dispatch(incoming.with_remote_addr(ip)).await
            }
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                warn!(ip = ?ip, "Malformed request: {e}");
                Reply::new(StatusCode::BAD_REQUEST)
            }
            Err(e) => return Err(e),
        };
        if let Err(e) = reply.insert_header(header::CONNECTION, "close") {
            warn!("Failed to set connection header: {e}");
        }
        tx.write_reply(&reply).await?;
        debug!(ip = ?ip, status = reply.status.as_u16(), "Wrote response");
        tx.shutdown().await
    }
}

#[async_trait]
impl ConnectionHandler for RouterService {
    async fn handle(&self, mut stream: TcpStream) {
        let ip = stream.peer_addr().ok();
        info!(ip = ?ip, "Connection received");
        match self.serve(ip, &mut stream).await {
            Ok(()) => debug!(ip = ?ip, "Connection closed"),
            Err(e) => warn!(ip = ?ip, "Connection failed: {e}"),
        }
    }
}
