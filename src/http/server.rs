use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use async_trait::async_trait;
use essentials::{debug, info, warn};
use tokio::net::{TcpListener, TcpStream};

/// Serves one accepted connection.
#[async_trait]
pub trait ConnectionHandler {
    async fn handle(&self, stream: TcpStream);
}

/// Accept loop spawning a task per connection.
pub struct Server<H: ConnectionHandler + Send + Sync + 'static> {
    addr: SocketAddr,
    handler: Arc<H>,
}

impl<H: ConnectionHandler + Send + Sync + 'static> Server<H> {
    pub fn new(addr: SocketAddr, handler: H) -> Self {
        Self {
            addr,
            handler: Arc::new(handler),
        }
    }

    /// Only a failing bind ends the loop; accept errors are logged and skipped.
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.addr)
            .await
            .with_context(|| format!("Failed to bind to address: {}", self.addr))?;
        info!(addr = %self.addr, "Listening");
        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(addr = %self.addr, "Failed to accept connection: {e}");
                    continue;
                }
            };
            debug!(peer = %peer, "Accepted connection");
            let handler = self.handler.clone();
            tokio::spawn(async move {
                handler.handle(stream).await;
            });
        }
    }
}
