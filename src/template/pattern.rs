//! Reusable matching rules for template tokens.
//!
//! A [`Pattern`] renders to a regex fragment holding exactly one named
//! capture group for the token it is bound to. Transforms capture with the
//! [`Pattern::Any`] fragment and then validate or convert the raw value.

use std::{fmt::Debug, fmt::Display, str::FromStr, sync::Arc};

use super::Param;

pub type TransformFn = dyn Fn(&str) -> Option<Param> + Send + Sync + 'static;

/// Callback run on a captured token value. Returning `None`, an empty
/// value or the text `"0"` rejects the whole route match.
#[derive(Clone)]
pub struct Transform(Arc<TransformFn>);

impl Transform {
    pub fn new<F>(transform: F) -> Self
    where
        F: Fn(&str) -> Option<Param> + Send + Sync + 'static,
    {
        Self(Arc::new(transform))
    }

    pub fn apply(&self, raw: &str) -> Option<Param> {
        (self.0)(raw).filter(|value| !value.is_empty() && value.as_str() != Some("0"))
    }
}

impl Debug for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Transform")
    }
}

#[derive(Debug, Clone, Default)]
pub enum Pattern {
    /// Any text without separators, optionally preceded by one `/`.
    #[default]
    Any,
    /// Word characters and hyphens, optionally preceded by one `/`.
    Alpha,
    Num,
    Digit,
    Year,
    Month,
    Day,
    /// 32 lowercase hex characters.
    Md5,
    /// One or more `/segment` groups; the separator before the token becomes optional.
    Args,
    /// [`Pattern::Args`] restricted to word characters and hyphens.
    ArgsAlpha,
    /// Everything, separators included.
    WildCard,
    /// Custom regex body wrapped in the token's capture group.
    Regex(String),
    Transform(Transform),
}

impl Pattern {
    pub fn regex(body: impl Into<String>) -> Self {
        Self::Regex(body.into())
    }

    pub fn transform<F>(transform: F) -> Self
    where
        F: Fn(&str) -> Option<Param> + Send + Sync + 'static,
    {
        Self::Transform(Transform::new(transform))
    }

    pub fn as_transform(&self) -> Option<&Transform> {
        match self {
            Self::Transform(transform) => Some(transform),
            _ => None,
        }
    }

    /// Renders the regex fragment capturing `token`.
    pub fn fragment(&self, token: &str) -> String {
        match self {
            Self::Any | Self::Transform(_) => format!(r"(?P<{token}>(?:/?[^/]*))"),
            Self::Alpha => format!(r"(?P<{token}>(?:/?[-\w]+))"),
            Self::Num | Self::Digit => format!(r"(?P<{token}>\d+)"),
            Self::Year => format!(r"(?P<{token}>\d{{4}})"),
            Self::Month | Self::Day => format!(r"(?P<{token}>\d{{1,2}})"),
            Self::Md5 => format!(r"(?P<{token}>[0-9a-f]{{32}})"),
            Self::Args => format!(r"?(?P<{token}>(?:/.+)+)"),
            Self::ArgsAlpha => format!(r"?(?P<{token}>(?:/[-\w]+)+)"),
            Self::WildCard => format!(r"(?P<{token}>.*)"),
            Self::Regex(body) => format!(r"(?P<{token}>{body})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPattern(pub String);

impl Display for UnknownPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown pattern name: {}", self.0)
    }
}

impl std::error::Error for UnknownPattern {}

impl FromStr for Pattern {
    type Err = UnknownPattern;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let upper = name.to_ascii_uppercase();
        let upper = upper.strip_prefix("PATTERN_").unwrap_or(&upper);
        Ok(match upper {
            "ANY" => Self::Any,
            "ALPHA" => Self::Alpha,
            "NUM" => Self::Num,
            "DIGIT" => Self::Digit,
            "YEAR" => Self::Year,
            "MONTH" => Self::Month,
            "DAY" => Self::Day,
            "MD5" => Self::Md5,
            "ARGS" => Self::Args,
            "ARGS_ALPHA" => Self::ArgsAlpha,
            "WILD_CARD" | "WILDCARD" => Self::WildCard,
            _ => return Err(UnknownPattern(name.to_string())),
        })
    }
}
