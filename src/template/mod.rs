//! Path templates: compilation of `{token}` placeholders into an anchored
//! regular expression and matching of request paths against it.

mod params;
mod pattern;
mod query;
mod registry;

use std::{collections::HashMap, sync::OnceLock};

use regex::Regex;

use crate::{Error, Result};

pub use params::{Param, Params};
pub use pattern::{Pattern, Transform, TransformFn, UnknownPattern};
pub use query::{Data, QueryParam, QueryRules};
pub use registry::{PatternRegistry, Scope};

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{(?P<name>.+?)\}").expect("static regex"))
}

fn trim_separators(path: &str) -> &str {
    path.trim_end_matches(['/', '\\'])
}

/// Leading `/` enforced, trailing separators dropped.
pub fn normalize(path: &str) -> String {
    let path = trim_separators(path);
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

#[derive(Debug)]
pub struct PathTemplate {
    template: String,
    expression: Regex,
    transforms: HashMap<String, Transform>,
    query: QueryRules,
}

impl PathTemplate {
    /// Compiles `path` against a single registry.
    pub fn new(path: &str, patterns: &PatternRegistry) -> Result<Self> {
        Self::compile(path, Scope::new(patterns, &PatternRegistry::new()))
    }

    /// Compiles `path`, resolving every placeholder through `scope`.
    /// Tokens bound to a transform capture with the [`Pattern::Any`] fragment.
    pub fn compile(path: &str, scope: Scope<'_>) -> Result<Self> {
        let template = trim_separators(&normalize(path)).to_string();
        let mut transforms = HashMap::new();
        let mut expression = String::with_capacity(template.len() * 2);
        expression.push('^');
        let mut last = 0;
        for captures in placeholder().captures_iter(&template) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.name("name")) else {
                continue;
            };
            let token = name.as_str();
            let pattern = scope.resolve(token);
            if let Some(transform) = pattern.as_transform() {
                transforms.insert(token.to_string(), transform.clone());
            }
            expression.push_str(&regex::escape(&template[last..whole.start()]));
            expression.push_str(&pattern.fragment(token));
            last = whole.end();
        }
        expression.push_str(&regex::escape(&template[last..]));
        expression.push('$');
        let expression = Regex::new(&expression).map_err(|e| Error::template(&template, e))?;
        Ok(Self {
            template,
            expression,
            transforms,
            query: QueryRules::default(),
        })
    }

    pub(crate) fn with_query(mut self, query: QueryRules) -> Self {
        self.query = query;
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn expression(&self) -> &str {
        self.expression.as_str()
    }

    /// Matches `path` (trailing separators ignored).
    ///
    /// Returns `Ok(None)` when the path does not fit the template layout and
    /// [`Error::InvalidUriParameter`] when a token transform rejects its value.
    pub fn matches(&self, path: &str) -> Result<Option<Params>> {
        let Some(captures) = self.expression.captures(trim_separators(path)) else {
            return Ok(None);
        };
        let mut params = Params::new();
        for token in self.expression.capture_names().flatten() {
            let raw = captures.name(token).map_or("", |m| m.as_str());
            let value = match self.transforms.get(token) {
                Some(transform) => transform
                    .apply(raw)
                    .ok_or_else(|| Error::InvalidUriParameter(token.to_string()))?,
                None => Param::from_capture(raw),
            };
            params.insert(token, value);
        }
        Ok(Some(params))
    }

    /// Applies the declared query parameters to `query`, injecting defaults.
    pub fn validate_query(&self, query: &mut Data) -> Result<()> {
        self.query.validate(query)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn template(path: &str, patterns: &[(&str, Pattern)]) -> PathTemplate {
        let mut registry = PatternRegistry::new();
        for (token, pattern) in patterns {
            registry.set(*token, pattern.clone());
        }
        PathTemplate::new(path, &registry).unwrap()
    }

    #[test]
    fn normalizes_the_template() {
        assert_eq!(template("pages/{id}/", &[]).template(), "/pages/{id}");
        assert_eq!(template("/", &[]).template(), "");
    }

    #[test]
    fn compiles_an_anchored_expression() {
        let template = template("/pages/{id}", &[("id", Pattern::Num)]);
        assert_eq!(template.expression(), r"^/pages/(?P<id>\d+)$");
    }

    #[test]
    fn matches_numeric_token() {
        let template = template("/pages/{id}", &[("id", Pattern::Num)]);
        assert_eq!(
            template.matches("/pages/42").unwrap(),
            Some(Params::from_iter([("id", "42")]))
        );
        assert_eq!(template.matches("/pages/abc").unwrap(), None);
        assert_eq!(template.matches("/pages/42/more").unwrap(), None);
    }

    #[test]
    fn trailing_slash_is_ignored() {
        let template = template("/a/{b}/", &[]);
        assert_eq!(
            template.matches("/a/b/").unwrap(),
            template.matches("/a/b").unwrap()
        );
        assert!(template.matches("/a/b").unwrap().is_some());
    }

    #[test]
    fn root_template_matches_root_path() {
        let template = template("/", &[]);
        assert_eq!(template.matches("/").unwrap(), Some(Params::new()));
        assert_eq!(template.matches("").unwrap(), Some(Params::new()));
        assert_eq!(template.matches("/x").unwrap(), None);
    }

    #[test]
    fn rest_of_path_becomes_segments() {
        let template = template("/files/{rest}", &[("rest", Pattern::Args)]);
        let params = template.matches("/files/a/b/c").unwrap().unwrap();
        assert_eq!(
            params.get("rest"),
            Some(&Param::Segments(vec!["a".into(), "b".into(), "c".into()]))
        );
        assert_eq!(template.matches("/files").unwrap(), None);
    }

    #[test]
    fn args_alpha_rejects_non_word_segments() {
        let template = template("/b/{rest}", &[("rest", Pattern::ArgsAlpha)]);
        assert_eq!(
            template.matches("/b/x/y-z").unwrap(),
            Some(Params::from_iter([(
                "rest",
                Param::Segments(vec!["x".into(), "y-z".into()])
            )]))
        );
        assert_eq!(template.matches("/b/x/y.z").unwrap(), None);
    }

    #[test]
    fn leading_separator_is_part_of_the_capture() {
        let any = template("/a/{x}", &[]);
        assert_eq!(
            any.matches("/a//x").unwrap(),
            Some(Params::from_iter([("x", Param::Segments(vec!["x".into()]))]))
        );
        assert_eq!(any.matches("/a/x").unwrap(), Some(Params::from_iter([("x", "x")])));
        assert_eq!(any.matches("/a/x/y").unwrap(), None);
        let alpha = template("/a/{x}", &[("x", Pattern::Alpha)]);
        assert_eq!(
            alpha.matches("/a//x-y").unwrap(),
            Some(Params::from_iter([("x", Param::Segments(vec!["x-y".into()]))]))
        );
        assert_eq!(alpha.matches("/a/x.y").unwrap(), None);
    }

    #[test]
    fn wildcard_spans_separators() {
        let template = template("/static/{path}", &[("path", Pattern::WildCard)]);
        let params = template.matches("/static/css/site.css").unwrap().unwrap();
        assert_eq!(
            params.get("path"),
            Some(&Param::Segments(vec!["css".into(), "site.css".into()]))
        );
    }

    #[test]
    fn literal_segments_are_escaped() {
        let template = template("/feed.json", &[]);
        assert!(template.matches("/feed.json").unwrap().is_some());
        assert!(template.matches("/feedxjson").unwrap().is_none());
    }

    #[test]
    fn transform_replaces_the_value() {
        let year = Pattern::transform(|raw| {
            (raw.len() == 4 && raw.chars().all(|c| c.is_ascii_digit())).then(|| {
                Param::Map(BTreeMap::from([("year".to_string(), raw.to_string())]))
            })
        });
        let template = template("/archive/{year}", &[("year", year)]);
        let params = template.matches("/archive/2024").unwrap().unwrap();
        assert_eq!(
            params.get("year").and_then(Param::as_map).and_then(|m| m.get("year")),
            Some(&"2024".to_string())
        );
        assert_eq!(
            template.matches("/archive/199"),
            Err(Error::InvalidUriParameter("year".to_string()))
        );
    }

    #[test]
    fn scoped_resolution_prefers_local_patterns() {
        let mut local = PatternRegistry::new();
        let mut global = PatternRegistry::new();
        local.set("id", Pattern::Md5);
        global.set("id", Pattern::Num);
        global.set("page", Pattern::Num);
        let template = PathTemplate::compile("/doc/{id}/{page}", Scope::new(&local, &global)).unwrap();
        assert!(template
            .matches("/doc/d41d8cd98f00b204e9800998ecf8427e/3")
            .unwrap()
            .is_some());
        assert!(template.matches("/doc/42/3").unwrap().is_none());
        assert!(template.matches("/doc/d41d8cd98f00b204e9800998ecf8427e/x").unwrap().is_none());
    }

    #[test]
    fn invalid_token_name_fails_to_compile() {
        let error = PathTemplate::new("/a/{bad-name}", &PatternRegistry::new()).unwrap_err();
        assert!(matches!(error, Error::InvalidTemplate { .. }));
    }
}
