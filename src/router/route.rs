use std::{collections::HashMap, sync::Arc};

use http::Method;

use super::Callback;
use crate::{
    template::{Data, Params, PathTemplate, Pattern, QueryParam},
    Result,
};

/// Declaration of one path with its per-token patterns and a callback per method.
#[derive(Debug, Clone)]
pub struct RouteSpec {
    pub(crate) path: String,
    pub(crate) patterns: Vec<(String, Pattern)>,
    pub(crate) callbacks: Vec<(Method, Callback)>,
    pub(crate) file: Option<String>,
    pub(crate) query: Vec<QueryParam>,
}

impl RouteSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            patterns: Vec::new(),
            callbacks: Vec::new(),
            file: None,
            query: Vec::new(),
        }
    }

    /// Binds `token` to `pattern` for this route only.
    pub fn pattern(mut self, token: impl Into<String>, pattern: Pattern) -> Self {
        self.patterns.push((token.into(), pattern));
        self
    }

    pub fn on(mut self, method: Method, callback: impl Into<Callback>) -> Self {
        self.callbacks.push((method, callback.into()));
        self
    }

    pub fn get(self, callback: impl Into<Callback>) -> Self {
        self.on(Method::GET, callback)
    }

    pub fn post(self, callback: impl Into<Callback>) -> Self {
        self.on(Method::POST, callback)
    }

    pub fn put(self, callback: impl Into<Callback>) -> Self {
        self.on(Method::PUT, callback)
    }

    pub fn delete(self, callback: impl Into<Callback>) -> Self {
        self.on(Method::DELETE, callback)
    }

    pub fn head(self, callback: impl Into<Callback>) -> Self {
        self.on(Method::HEAD, callback)
    }

    pub fn options(self, callback: impl Into<Callback>) -> Self {
        self.on(Method::OPTIONS, callback)
    }

    /// Handler module the callbacks are defined in.
    pub fn file(mut self, module: impl Into<String>) -> Self {
        self.file = Some(module.into());
        self
    }

    pub fn query_param(mut self, param: QueryParam) -> Self {
        self.query.push(param);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Captures and query of a route that matched.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub params: Params,
    pub query: Data,
}

#[derive(Debug, Clone)]
pub struct Route {
    pub(crate) path: String,
    pub(crate) template: Arc<PathTemplate>,
    pub(crate) callback: Callback,
    pub(crate) file: Option<String>,
}

impl Route {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    pub fn callback(&self) -> &Callback {
        &self.callback
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// Structural match first, then the declared query parameters on a copy of `query`.
    pub fn matches(&self, path: &str, query: &Data) -> Result<Option<Match>> {
        let Some(params) = self.template.matches(path)? else {
            return Ok(None);
        };
        let mut query = query.clone();
        self.template.validate_query(&mut query)?;
        Ok(Some(Match { params, query }))
    }
}

/// Routes per method in registration order, keyed by the declared path.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: HashMap<Method, Vec<Route>>,
}

impl RouteTable {
    /// A route for an already registered method and path replaces the old one in place.
    pub fn insert(&mut self, method: Method, route: Route) {
        let bucket = self.routes.entry(method).or_default();
        match bucket.iter_mut().find(|known| known.path == route.path) {
            Some(known) => *known = route,
            None => bucket.push(route),
        }
    }

    pub fn routes(&self, method: &Method) -> &[Route] {
        self.routes
            .get(method)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{template::PatternRegistry, Error};

    fn route(path: &str, callback: &str) -> Route {
        Route {
            path: path.to_string(),
            template: Arc::new(PathTemplate::new(path, &PatternRegistry::new()).unwrap()),
            callback: callback.into(),
            file: None,
        }
    }

    #[test]
    fn same_key_replaces_in_place() {
        let mut table = RouteTable::default();
        table.insert(Method::GET, route("/a", "first"));
        table.insert(Method::GET, route("/b", "second"));
        table.insert(Method::GET, route("/a", "third"));
        table.insert(Method::POST, route("/a", "fourth"));
        let routes = table.routes(&Method::GET);
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].callback().to_string(), "third");
        assert_eq!(routes[1].path(), "/b");
        assert_eq!(table.len(), 3);
        assert!(table.routes(&Method::PUT).is_empty());
    }

    #[test]
    fn query_rules_run_after_structural_match() {
        let template = PathTemplate::new("/list", &PatternRegistry::new())
            .unwrap()
            .with_query(
                crate::template::QueryRules::compile(&[], &[QueryParam::new("page")], "/list")
                    .unwrap(),
            );
        let route = Route {
            path: "/list".to_string(),
            template: Arc::new(template),
            callback: "list".into(),
            file: None,
        };
        assert_eq!(route.matches("/other", &Data::new()).unwrap(), None);
        assert_eq!(
            route.matches("/list", &Data::new()),
            Err(Error::QueryMismatch("page".to_string()))
        );
        let query = Data::from([("page".to_string(), "2".to_string())]);
        assert_eq!(
            route.matches("/list", &query).unwrap().map(|found| found.query),
            Some(query)
        );
    }
}
