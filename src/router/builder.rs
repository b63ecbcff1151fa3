use std::sync::Arc;

use essentials::{debug, warn};

use super::{Handlers, Route, RouteSpec, RouteTable, Router};
use crate::{
    template::{PathTemplate, Pattern, PatternRegistry, QueryParam, QueryRules, Scope},
    Result,
};

/// Collects patterns, handlers and routes; [`RouterBuilder::build`] freezes
/// them into an immutable [`Router`].
#[derive(Debug, Default)]
pub struct RouterBuilder {
    patterns: PatternRegistry,
    query: Vec<QueryParam>,
    handlers: Handlers,
    routes: Vec<RouteSpec>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Global default for `token`, used by templates that do not bind it themselves.
    pub fn pattern(mut self, token: impl Into<String>, pattern: Pattern) -> Self {
        let token = token.into();
        if !self.patterns.set(token.clone(), pattern) {
            debug!(token = %token, "Global pattern already registered, keeping the first one");
        }
        self
    }

    /// Query parameter declared for every route.
    pub fn query_param(mut self, param: QueryParam) -> Self {
        self.query.push(param);
        self
    }

    pub fn handlers(mut self, handlers: Handlers) -> Self {
        self.handlers = handlers;
        self
    }

    pub(crate) fn registered_handlers(&self) -> &Handlers {
        &self.handlers
    }

    pub fn add_route(mut self, spec: RouteSpec) -> Self {
        if spec.path.is_empty() {
            warn!("Ignoring route without a path");
            return self;
        }
        self.routes.push(spec);
        self
    }

    /// Compiles every template against the final pattern registries and
    /// fills the route table in registration order.
    pub fn build(self) -> Result<Router> {
        let mut table = RouteTable::default();
        for spec in self.routes {
            let mut local = PatternRegistry::new();
            for (token, pattern) in spec.patterns {
                local.set(token, pattern);
            }
            let query = QueryRules::compile(&self.query, &spec.query, &spec.path)?;
            let template = Arc::new(
                PathTemplate::compile(&spec.path, Scope::new(&local, &self.patterns))?
                    .with_query(query),
            );
            debug!(
                path = %spec.path,
                expression = template.expression(),
                "Compiled route template"
            );
            for (method, callback) in spec.callbacks {
                debug!(method = %method, path = %spec.path, callback = %callback, "Registering route");
                table.insert(
                    method,
                    Route {
                        path: spec.path.clone(),
                        template: template.clone(),
                        callback,
                        file: spec.file.clone(),
                    },
                );
            }
        }
        Ok(Router::new(table, self.handlers))
    }
}
