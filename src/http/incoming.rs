use std::net::SocketAddr;

use async_trait::async_trait;
use http::{header, header::IntoHeaderName, HeaderMap, HeaderValue, Method, Uri};
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use super::{HeaderMapExt, ReadHeaders};
use crate::io::error::{error, Body, RequestStatusLine};

/// Largest request body [`ReadIncoming`] accepts.
pub const MAX_BODY: usize = 1 << 20;

/// The live request as handed over by the transport.
#[derive(Debug, Clone)]
pub struct Incoming {
    pub method: Method,
    /// Request target as received, query string included.
    pub uri: String,
    pub version: String,
    pub remote_addr: Option<SocketAddr>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Incoming {
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            version: "HTTP/1.1".to_string(),
            remote_addr: None,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header<K: IntoHeaderName>(mut self, key: K, value: HeaderValue) -> Self {
        self.headers.append(key, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_remote_addr(mut self, addr: Option<SocketAddr>) -> Self {
        self.remote_addr = addr;
        self
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Path component of the request target.
    pub fn path(&self) -> String {
        match self.uri.parse::<Uri>() {
            Ok(uri) => uri.path().to_string(),
            Err(_) => self
                .uri
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }

    pub fn query_string(&self) -> String {
        match self.uri.parse::<Uri>() {
            Ok(uri) => uri.query().unwrap_or_default().to_string(),
            Err(_) => self
                .uri
                .split_once('?')
                .map(|(_, query)| query.split('#').next().unwrap_or_default())
                .unwrap_or_default()
                .to_string(),
        }
    }
}

impl HeaderMapExt for Incoming {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }
}

#[async_trait]
pub trait ReadIncoming {
    /// Reads the request line, headers and a `Content-Length` delimited body.
    async fn read_incoming(&mut self) -> io::Result<Incoming>;
}

#[async_trait]
impl<R> ReadIncoming for R
where
    R: AsyncBufRead + ?Sized + Unpin + Send,
{
    async fn read_incoming(&mut self) -> io::Result<Incoming> {
        let mut status_line = String::new();
        if self.read_line(&mut status_line).await? == 0 {
            return Err(error(RequestStatusLine::MissingStatusLine));
        }
        let (method, uri, version) = {
            let mut parts = status_line.split_whitespace();
            (
                parts
                    .next()
                    .ok_or(error(RequestStatusLine::MissingMethod))?
                    .parse::<Method>()
                    .map_err(|_| error(RequestStatusLine::InvalidMethod))?,
                parts
                    .next()
                    .ok_or(error(RequestStatusLine::MissingPath))?
                    .to_string(),
                parts
                    .next()
                    .ok_or(error(RequestStatusLine::MissingVersion))?
                    .to_string(),
            )
        };
        let headers = self.read_headers().await?;
        let length = match headers.get(header::CONTENT_LENGTH) {
            Some(value) => value
                .to_str()
                .ok()
                .and_then(|value| value.trim().parse::<usize>().ok())
                .ok_or(error(Body::InvalidContentLength))?,
            None => 0,
        };
        if length > MAX_BODY {
            return Err(error(Body::TooLarge(length)));
        }
        let mut body = vec![0; length];
        self.read_exact(&mut body).await?;
        Ok(Incoming {
            method,
            uri,
            version,
            remote_addr: None,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tokio::io::BufReader;

    use super::*;

    #[test]
    fn splits_path_and_query() {
        let incoming = Incoming::new(Method::GET, "/pages/42?format=json&x=1");
        assert_eq!(incoming.path(), "/pages/42");
        assert_eq!(incoming.query_string(), "format=json&x=1");
        let absolute = Incoming::new(Method::GET, "http://example.com/a/b?c=d");
        assert_eq!(absolute.path(), "/a/b");
        assert_eq!(absolute.query_string(), "c=d");
    }

    #[tokio::test]
    async fn reads_a_request_with_body() {
        let mut reader = BufReader::new(
            &b"POST /pages/1 HTTP/1.0\r\nContent-Length: 7\r\nUser-Agent: test\r\n\r\nname=ab"[..],
        );
        let incoming = reader.read_incoming().await.unwrap();
        assert_eq!(incoming.method, Method::POST);
        assert_eq!(incoming.uri, "/pages/1");
        assert_eq!(incoming.version, "HTTP/1.0");
        assert_eq!(incoming.header_str(header::USER_AGENT), Some("test"));
        assert_eq!(incoming.body(), b"name=ab");
    }

    #[tokio::test]
    async fn rejects_a_bad_request_line() {
        let mut reader = BufReader::new(&b"GET\r\n\r\n"[..]);
        assert!(reader.read_incoming().await.is_err());
        let mut reader = BufReader::new(&b""[..]);
        assert!(reader.read_incoming().await.is_err());
    }
}
