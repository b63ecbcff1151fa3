use std::collections::{btree_map, BTreeMap};

/// A single matched path parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Text(String),
    /// A capture spanning several path components, split on `/`.
    Segments(Vec<String>),
    /// Structured value produced by a transform.
    Map(BTreeMap<String, String>),
}

impl Param {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_segments(&self) -> Option<&[String]> {
        match self {
            Self::Segments(segments) => Some(segments),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Empty values count as a rejection when returned from a transform.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Segments(segments) => segments.is_empty(),
            Self::Map(map) => map.is_empty(),
        }
    }

    pub(crate) fn from_capture(raw: &str) -> Self {
        if raw.contains('/') {
            Self::Segments(
                raw.split('/')
                    .filter(|segment| !segment.is_empty())
                    .map(str::to_string)
                    .collect(),
            )
        } else {
            Self::Text(raw.to_string())
        }
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for Param {
    fn from(value: Vec<String>) -> Self {
        Self::Segments(value)
    }
}

impl From<BTreeMap<String, String>> for Param {
    fn from(value: BTreeMap<String, String>) -> Self {
        Self::Map(value)
    }
}

/// Named captures of a successful template match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, Param>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, token: &str) -> Option<&Param> {
        self.0.get(token)
    }

    pub fn text(&self, token: &str) -> Option<&str> {
        self.get(token).and_then(Param::as_str)
    }

    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<Param>) {
        self.0.insert(token.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Param> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Param>> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a String, &'a Param);
    type IntoIter = btree_map::Iter<'a, String, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
