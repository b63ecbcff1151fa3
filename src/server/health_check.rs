use async_trait::async_trait;
use essentials::error;
use tokio::{io::AsyncWriteExt, net::TcpStream};

use crate::http::server::ConnectionHandler;

/// Answers every connection with an empty `200 OK`.
pub struct HealthCheck;

#[async_trait]
impl ConnectionHandler for HealthCheck {
    async fn handle(&self, mut stream: TcpStream) {
        if let Err(e) = stream
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
            .await
        {
            error!("Failed to write to stream: {:?}", e);
        }
    }
}
