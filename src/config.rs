//! Declarative route definitions loaded from JSON.

use std::{collections::BTreeMap, path::Path};

use anyhow::Context;
use essentials::debug;
use http::Method;
use serde::Deserialize;

use crate::{
    router::{Handlers, RouteSpec, RouterBuilder},
    template::{Pattern, QueryParam},
    Error, Result,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Global token patterns.
    pub patterns: BTreeMap<String, PatternConfig>,
    /// Query parameters every route declares.
    pub query: Vec<QueryParamConfig>,
    pub routes: Vec<RouteConfig>,
}

/// A vocabulary name such as `"NUM"`, a custom regex body or a named transform.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PatternConfig {
    Named(String),
    Regex { regex: String },
    Transform { transform: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteConfig {
    pub path: String,
    #[serde(default)]
    pub handlers: BTreeMap<String, PatternConfig>,
    pub get: Option<String>,
    pub post: Option<String>,
    pub put: Option<String>,
    pub delete: Option<String>,
    pub head: Option<String>,
    pub options: Option<String>,
    pub file: Option<String>,
    #[serde(default)]
    pub query: Vec<QueryParamConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryParamConfig {
    pub name: String,
    pub pattern: Option<PatternConfig>,
    pub default: Option<String>,
}

impl RoutesConfig {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Failed to parse routes")
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read routes from {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Invalid routes file {}", path.display()))
    }
}

impl PatternConfig {
    /// Vocabulary names first, then transforms registered under that name.
    pub fn resolve(&self, handlers: &Handlers) -> Result<Pattern> {
        match self {
            Self::Named(name) => name.parse::<Pattern>().or_else(|_| {
                handlers
                    .find_transform(name)
                    .cloned()
                    .map(Pattern::Transform)
                    .ok_or_else(|| Error::callback(name))
            }),
            Self::Regex { regex } => Ok(Pattern::regex(regex.as_str())),
            Self::Transform { transform } => handlers
                .find_transform(transform)
                .cloned()
                .map(Pattern::Transform)
                .ok_or_else(|| Error::callback(transform)),
        }
    }
}

impl QueryParamConfig {
    fn resolve(&self, handlers: &Handlers) -> Result<QueryParam> {
        let mut param = QueryParam::new(self.name.as_str());
        if let Some(pattern) = &self.pattern {
            param = param.with_pattern(pattern.resolve(handlers)?);
        }
        if let Some(default) = &self.default {
            param = param.with_default(default.as_str());
        }
        Ok(param)
    }
}

impl RouteConfig {
    pub fn resolve(&self, handlers: &Handlers) -> Result<RouteSpec> {
        let mut spec = RouteSpec::new(self.path.as_str());
        for (token, pattern) in &self.handlers {
            spec = spec.pattern(token.as_str(), pattern.resolve(handlers)?);
        }
        let callbacks = [
            (Method::GET, &self.get),
            (Method::POST, &self.post),
            (Method::PUT, &self.put),
            (Method::DELETE, &self.delete),
            (Method::HEAD, &self.head),
            (Method::OPTIONS, &self.options),
        ];
        for (method, callback) in callbacks {
            if let Some(callback) = callback {
                spec = spec.on(method, callback.as_str());
            }
        }
        if let Some(file) = &self.file {
            spec = spec.file(file.as_str());
        }
        for param in &self.query {
            spec = spec.query_param(param.resolve(handlers)?);
        }
        Ok(spec)
    }
}

impl RouterBuilder {
    /// Adds everything `config` declares. Named transforms must already be
    /// registered in the builder's handlers.
    pub fn configure(mut self, config: &RoutesConfig) -> Result<Self> {
        for (token, pattern) in &config.patterns {
            let pattern = pattern.resolve(self.registered_handlers())?;
            self = self.pattern(token.as_str(), pattern);
        }
        for param in &config.query {
            let param = param.resolve(self.registered_handlers())?;
            self = self.query_param(param);
        }
        for route in &config.routes {
            let spec = route.resolve(self.registered_handlers())?;
            debug!(path = %route.path, "Configured route");
            self = self.add_route(spec);
        }
        Ok(self)
    }
}
