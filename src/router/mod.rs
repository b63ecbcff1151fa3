//! Route table and dispatch.
//!
//! Routes are tried per request method in registration order and the first
//! template that matches wins. There is no scoring by specificity and no
//! catch-all route.

mod builder;
mod callback;
mod route;

use essentials::debug;
use http::Method;

use crate::{
    http::{parse_form, Incoming, Reply, Request, Response},
    template::Data,
    Error, Result,
};

pub use builder::RouterBuilder;
pub use callback::{Callback, Handler, HandlerFn, Handlers, Module, TargetBuilder};
pub use route::{Match, Route, RouteSpec, RouteTable};

/// Immutable after [`RouterBuilder::build`]; share it across workers behind an `Arc`.
#[derive(Debug)]
pub struct Router {
    table: RouteTable,
    handlers: Handlers,
}

impl Router {
    pub(crate) fn new(table: RouteTable, handlers: Handlers) -> Self {
        Self { table, handlers }
    }

    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Selects the first route for `method` matching `path` and `query`.
    ///
    /// Routes failing a transform or a query parameter are skipped. When no
    /// route matches, the query failure of the last candidate is reported if
    /// there was one, [`Error::InvalidPath`] otherwise.
    pub fn find(&self, method: &Method, path: &str, query: &Data) -> Result<(&Route, Match)> {
        let mut last = Error::InvalidPath;
        for route in self.table.routes(method) {
            match route.matches(path, query) {
                Ok(Some(found)) => return Ok((route, found)),
                Ok(None) => last = Error::InvalidPath,
                Err(e) if e.is_mismatch() => {
                    debug!(route = route.path(), path = path, reason = %e, "Route skipped");
                    last = e;
                }
                Err(e) => return Err(e),
            }
        }
        debug!(method = %method, path = path, "No route matched");
        Err(match last {
            Error::QueryMismatch(_) => last,
            _ => Error::InvalidPath,
        })
    }

    /// Routes the live request. Without an explicit `path`, the path
    /// component of the request target is used.
    pub fn route(&self, incoming: &Incoming, path: Option<&str>) -> Result<Reply> {
        let path = match path {
            Some(path) if !path.is_empty() => path.to_string(),
            _ => incoming.path(),
        };
        let query = parse_form(incoming.query_string());
        let (route, found) = self.find(&incoming.method, &path, &query)?;
        let handler = self.handlers.resolve(route.callback(), route.file())?;
        debug!(
            method = %incoming.method,
            route = route.path(),
            callback = %route.callback(),
            "Dispatching"
        );
        let request = Request::new(incoming, path, found.params, found.query);
        let response = Response::new(&request);
        handler.call(&request, response)
    }
}
