use async_trait::async_trait;
use essentials::warn;
use http::{header, HeaderMap, HeaderValue, StatusCode};
use tokio::io::{self, AsyncWrite, AsyncWriteExt};

use super::{HeaderMapExt, Request, WriteHeaders};
use crate::{Error, Result};

const REASONS: &[(u16, &str)] = &[
    (100, "Continue"),
    (101, "Switching Protocols"),
    (200, "OK"),
    (201, "Created"),
    (202, "Accepted"),
    (203, "Non-Authoritative Information"),
    (204, "No Content"),
    (205, "Reset Content"),
    (206, "Partial Content"),
    (300, "Multiple Choices"),
    (301, "Moved Permanently"),
    (302, "Found"),
    (303, "See Other"),
    (304, "Not Modified"),
    (305, "Use Proxy"),
    (307, "Temporary Redirect"),
    (400, "Bad Request"),
    (401, "Unauthorized"),
    (402, "Payment Required"),
    (403, "Forbidden"),
    (404, "Not Found"),
    (405, "Method Not Allowed"),
    (406, "Not Acceptable"),
    (407, "Proxy Authentication Required"),
    (408, "Request Timeout"),
    (409, "Conflict"),
    (410, "Gone"),
    (411, "Length Required"),
    (412, "Precondition Failed"),
    (413, "Request Entity Too Large"),
    (414, "Request-URI Too Long"),
    (415, "Unsupported Media Type"),
    (416, "Requested Range Not Satisfiable"),
    (417, "Expectation Failed"),
    (500, "Internal Server Error"),
    (501, "Not Implemented"),
    (502, "Bad Gateway"),
    (503, "Service Unavailable"),
    (504, "Gateway Timeout"),
    (505, "HTTP Version Not Supported"),
];

/// Reason phrase for `code`, if the status table lists it.
pub fn reason(code: u16) -> Option<&'static str> {
    REASONS
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, reason)| *reason)
}

/// Output buffer of one request. Chunks are only appended; [`Response::send`]
/// consumes the buffer so nothing can be written after it.
#[derive(Debug)]
pub struct Response {
    protocol: String,
    format: Option<String>,
    chunks: Vec<String>,
}

impl Response {
    pub fn new(request: &Request) -> Self {
        Self {
            protocol: request.protocol.clone(),
            format: request.format.clone(),
            chunks: Vec::new(),
        }
    }

    pub fn add(&mut self, chunk: impl Into<String>) -> &mut Self {
        self.chunks.push(chunk.into());
        self
    }

    /// Ends the request cycle with `code`, yielding the message to flush.
    pub fn send(self, code: u16) -> Result<Reply> {
        let reason = reason(code).ok_or(Error::InvalidResponseCode(code))?;
        let status = StatusCode::from_u16(code).map_err(|_| Error::InvalidResponseCode(code))?;
        let mut reply = Reply::new(status)
            .with_version(self.protocol)
            .with_reason(reason)
            .with_body(self.chunks.concat());
        if let Some(format) = self.format {
            if let Err(e) = reply.insert_header(header::CONTENT_TYPE, format.as_str()) {
                warn!(format = %format, "Skipping content type: {e}");
            }
        }
        Ok(reply)
    }
}

/// A finished response, ready to be written to the client.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub version: String,
    pub status: StatusCode,
    pub reason: &'static str,
    headers: HeaderMap,
    body: String,
}

impl Reply {
    pub fn new(status: StatusCode) -> Self {
        Self {
            version: "HTTP/1.1".to_string(),
            status,
            reason: status.canonical_reason().unwrap_or_default(),
            headers: vec![(header::CONTENT_LENGTH, HeaderValue::from_static("0"))]
                .into_iter()
                .collect(),
            body: String::new(),
        }
    }

    pub fn error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_reason(mut self, reason: &'static str) -> Self {
        self.reason = reason;
        self
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.headers
            .insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
        self.body = body;
        self
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

impl HeaderMapExt for Reply {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }
}

#[async_trait]
pub trait WriteReply {
    async fn write_reply(&mut self, reply: &Reply) -> io::Result<()>;
}

#[async_trait]
impl<W> WriteReply for W
where
    W: AsyncWrite + ?Sized + Unpin + Send,
{
    async fn write_reply(&mut self, reply: &Reply) -> io::Result<()> {
        self.write_all(reply.version.as_bytes()).await?;
        self.write_all(b" ").await?;
        self.write_all(reply.status.as_str().as_bytes()).await?;
        self.write_all(b" ").await?;
        self.write_all(reply.reason.as_bytes()).await?;
        self.write_all(b"\r\n").await?;
        self.write_headers(&reply.headers).await?;
        self.write_all(b"\r\n").await?;
        self.write_all(reply.body.as_bytes()).await?;
        self.flush().await
    }
}
