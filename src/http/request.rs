//! The request value handed to route handlers.

use essentials::warn;
use http::{header, Method};

use super::{HeaderMapExt, Incoming};
use crate::template::{Data, Params};

/// Reserved data key overriding the negotiated response format.
pub const FORMAT_KEY: &str = "format";

const FORMAT_ALIASES: [(&str, &str); 4] = [
    ("html", "text/html"),
    ("txt", "text/plain"),
    ("xml", "application/xml"),
    ("json", "application/json"),
];

const DEFAULT_ENCODINGS: &[&str] = &["identity"];
const DEFAULT_CHARSETS: &[&str] = &["utf-8"];
const DEFAULT_LANGUAGES: &[&str] = &["en"];

#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub client_ip: String,
    pub user_agent: String,
    pub protocol: String,
    /// Response content type: explicit `format` data key first, then the
    /// first accepted format.
    pub format: Option<String>,
    pub formats: Vec<String>,
    pub encodings: Vec<String>,
    pub charsets: Vec<String>,
    pub languages: Vec<String>,
    /// Method dependent payload: the query for GET, the form-encoded body otherwise.
    pub data: Data,
    /// Query string, including defaults injected by declared query parameters.
    pub query: Data,
    pub params: Params,
}

impl Request {
    pub fn new(incoming: &Incoming, path: impl Into<String>, params: Params, query: Data) -> Self {
        let mut data = if incoming.method == Method::GET {
            query.clone()
        } else {
            parse_form(incoming.body())
        };
        let formats = accept_list(incoming, header::ACCEPT, &[]);
        let format = data
            .remove(FORMAT_KEY)
            .filter(|format| !format.is_empty())
            .map(|format| resolve_format(&format))
            .or_else(|| formats.first().cloned());
        Self {
            method: incoming.method.clone(),
            path: path.into(),
            client_ip: client_ip(incoming),
            user_agent: incoming
                .header_str(header::USER_AGENT)
                .unwrap_or_default()
                .to_string(),
            protocol: incoming.version.clone(),
            format,
            formats,
            encodings: accept_list(incoming, header::ACCEPT_ENCODING, DEFAULT_ENCODINGS),
            charsets: accept_list(incoming, header::ACCEPT_CHARSET, DEFAULT_CHARSETS),
            languages: accept_list(incoming, header::ACCEPT_LANGUAGE, DEFAULT_LANGUAGES),
            data,
            query,
            params,
        }
    }
}

/// Parses an `application/x-www-form-urlencoded` payload; later keys win.
pub fn parse_form(payload: impl AsRef<[u8]>) -> Data {
    match serde_urlencoded::from_bytes::<Vec<(String, String)>>(payload.as_ref()) {
        Ok(pairs) => pairs.into_iter().collect(),
        Err(e) => {
            warn!("Failed to parse form payload: {e}");
            Data::new()
        }
    }
}

fn resolve_format(format: &str) -> String {
    FORMAT_ALIASES
        .iter()
        .find(|(alias, _)| *alias == format)
        .map_or(format, |(_, mime)| *mime)
        .to_string()
}

fn client_ip(incoming: &Incoming) -> String {
    incoming
        .header_str("x-forwarded-for")
        .and_then(|forwarded| forwarded.split(',').map(str::trim).find(|ip| !ip.is_empty()))
        .map(str::to_string)
        .or_else(|| incoming.remote_addr.map(|addr| addr.ip().to_string()))
        .unwrap_or_default()
}

/// Takes the header up to its first `;` and splits it on commas.
fn accept_list(incoming: &Incoming, name: header::HeaderName, default: &[&str]) -> Vec<String> {
    match incoming.header_str(name) {
        Some(value) => value
            .split(';')
            .next()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        None => default.iter().map(|item| item.to_string()).collect(),
    }
}
