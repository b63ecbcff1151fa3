use std::collections::HashMap;

use regex::Regex;

use super::{Pattern, Transform};
use crate::{Error, Result};

pub type Data = HashMap<String, String>;

/// Declared query-string parameter a route requires.
#[derive(Debug, Clone)]
pub struct QueryParam {
    pub name: String,
    pub pattern: Pattern,
    pub default: Option<String>,
}

impl QueryParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: Pattern::Any,
            default: None,
        }
    }

    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into()).filter(|value: &String| !value.is_empty());
        self
    }
}

#[derive(Debug)]
struct QueryRule {
    name: String,
    expression: Regex,
    transform: Option<Transform>,
    default: Option<String>,
}

impl QueryRule {
    fn compile(param: &QueryParam, template: &str) -> Result<Self> {
        let expression = format!("^{}$", param.pattern.fragment("value"));
        Ok(Self {
            name: param.name.clone(),
            expression: Regex::new(&expression).map_err(|e| Error::template(template, e))?,
            transform: param.pattern.as_transform().cloned(),
            default: param.default.clone(),
        })
    }

    /// A transform only validates; the raw value stays in the query.
    fn accepts(&self, value: &str) -> bool {
        self.expression.is_match(value)
            && self
                .transform
                .as_ref()
                .map_or(true, |transform| transform.apply(value).is_some())
    }

    fn validate(&self, query: &mut Data) -> Result<()> {
        if query.get(&self.name).is_some_and(|value| self.accepts(value)) {
            return Ok(());
        }
        match &self.default {
            Some(default) => {
                query.insert(self.name.clone(), default.clone());
                Ok(())
            }
            None => Err(Error::QueryMismatch(self.name.clone())),
        }
    }
}

/// Compiled query parameter declarations of one route, in validation order.
#[derive(Debug, Default)]
pub struct QueryRules(Vec<QueryRule>);

impl QueryRules {
    /// Globals come first; a local declaration replaces a global one with the same name in place.
    pub(crate) fn compile(global: &[QueryParam], local: &[QueryParam], template: &str) -> Result<Self> {
        let mut merged: Vec<&QueryParam> = Vec::with_capacity(global.len() + local.len());
        for param in global.iter().chain(local) {
            match merged.iter_mut().find(|known| known.name == param.name) {
                Some(known) => *known = param,
                None => merged.push(param),
            }
        }
        merged
            .into_iter()
            .map(|param| QueryRule::compile(param, template))
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks every rule in order, injecting defaults into `query`.
    /// The first failing parameter aborts validation.
    pub fn validate(&self, query: &mut Data) -> Result<()> {
        self.0.iter().try_for_each(|rule| rule.validate(query))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::template::Param;

    fn data(pairs: &[(&str, &str)]) -> Data {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_are_injected_for_missing_parameters() {
        let rules = QueryRules::compile(
            &[],
            &[QueryParam::new("page").with_pattern(Pattern::Num).with_default("1")],
            "/list",
        )
        .unwrap();
        let mut query = Data::new();
        rules.validate(&mut query).unwrap();
        assert_eq!(query, data(&[("page", "1")]));
    }

    #[test]
    fn malformed_values_fall_back_to_the_default() {
        let rules = QueryRules::compile(
            &[],
            &[QueryParam::new("page").with_pattern(Pattern::Num).with_default("1")],
            "/list",
        )
        .unwrap();
        let mut query = data(&[("page", "two")]);
        rules.validate(&mut query).unwrap();
        assert_eq!(query, data(&[("page", "1")]));
    }

    #[test]
    fn missing_parameter_without_default_fails() {
        let rules = QueryRules::compile(
            &[QueryParam::new("token")],
            &[QueryParam::new("page").with_pattern(Pattern::Num)],
            "/list",
        )
        .unwrap();
        let mut query = data(&[("page", "3")]);
        assert_eq!(
            rules.validate(&mut query),
            Err(Error::QueryMismatch("token".to_string()))
        );
        let mut query = data(&[("token", "abc"), ("page", "x")]);
        assert_eq!(
            rules.validate(&mut query),
            Err(Error::QueryMismatch("page".to_string()))
        );
    }

    #[test]
    fn local_declarations_override_globals_in_place() {
        let rules = QueryRules::compile(
            &[QueryParam::new("lang").with_pattern(Pattern::Alpha), QueryParam::new("v")],
            &[QueryParam::new("lang").with_default("en")],
            "/",
        )
        .unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.0[0].name, "lang");
        assert_eq!(rules.0[0].default.as_deref(), Some("en"));
    }

    #[test]
    fn transform_patterns_validate_values() {
        let year = Pattern::transform(|raw| (raw.len() == 4).then(|| Param::from(raw)));
        let rules = QueryRules::compile(&[], &[QueryParam::new("year").with_pattern(year.clone())], "/")
            .unwrap();
        let mut query = data(&[("year", "1999")]);
        rules.validate(&mut query).unwrap();
        assert_eq!(query, data(&[("year", "1999")]));
        assert_eq!(
            rules.validate(&mut data(&[("year", "99")])),
            Err(Error::QueryMismatch("year".to_string()))
        );
        let rules = QueryRules::compile(
            &[],
            &[QueryParam::new("year").with_pattern(year).with_default("2000")],
            "/",
        )
        .unwrap();
        let mut query = data(&[("year", "99")]);
        rules.validate(&mut query).unwrap();
        assert_eq!(query, data(&[("year", "2000")]));
    }

    #[test]
    fn empty_default_counts_as_none() {
        assert_eq!(QueryParam::new("q").with_default("").default, None);
    }
}
