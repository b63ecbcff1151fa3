use std::fmt::Display;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No registered route matches the request method and path.
    InvalidPath,
    /// A route names a handler module that was never loaded.
    CallbackSourceMissing(String),
    /// A callback reference does not resolve to a registered, public handler.
    InvalidCallback(String),
    /// A token transform rejected its captured value.
    InvalidUriParameter(String),
    /// `send()` was called with a code absent from the status table.
    InvalidResponseCode(u16),
    /// A declared query parameter is missing or malformed and has no default.
    QueryMismatch(String),
    /// The template could not be compiled into a matching expression.
    InvalidTemplate { template: String, reason: String },
}

impl Error {
    pub fn callback<S: AsRef<str>>(reference: S) -> Self {
        Self::InvalidCallback(reference.as_ref().to_string())
    }

    pub fn template<T: AsRef<str>, R: Display>(template: T, reason: R) -> Self {
        Self::InvalidTemplate {
            template: template.as_ref().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Failures local to one route; the router moves on to the next candidate.
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::InvalidUriParameter(_) | Self::QueryMismatch(_))
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPath => "Invalid path".fmt(f),
            Self::CallbackSourceMissing(module) => {
                write!(f, "Handler module not loaded: {module}")
            }
            Self::InvalidCallback(reference) => write!(f, "Invalid callback: {reference}"),
            Self::InvalidUriParameter(token) => {
                write!(f, "Invalid parameter detected for token {token}")
            }
            Self::InvalidResponseCode(code) => write!(f, "Invalid response code {code}"),
            Self::QueryMismatch(name) => write!(f, "Request does not match query parameter {name}"),
            Self::InvalidTemplate { template, reason } => {
                write!(f, "Invalid template {template}: {reason}")
            }
        }
    }
}

impl std::error::Error for Error {}
