//! Path-template request routing.
//!
//! Routes are declared as path templates with `{token}` placeholders. Each
//! token is bound to a [`Pattern`] which decides what the token may match.
//! Templates compile into anchored regular expressions when the router is
//! built, and requests are dispatched to the first route of their method
//! whose template matches.
//!
//! # Example usage
//!
//! ```
//! use http::Method;
//! use pathway::{http::Incoming, Handlers, Pattern, RouteSpec, Router};
//!
//! let mut handlers = Handlers::new();
//! handlers.function("show", |request, mut response| {
//!     response.add(request.params.text("id").unwrap_or_default());
//!     response.send(200)
//! });
//! let router = Router::builder()
//!     .handlers(handlers)
//!     .add_route(RouteSpec::new("/pages/{id}").pattern("id", Pattern::Num).get("show"))
//!     .build()
//!     .unwrap();
//! let reply = router.route(&Incoming::new(Method::GET, "/pages/42"), None).unwrap();
//! assert_eq!(reply.body(), "42");
//! ```
#[cfg(feature = "config")]
pub mod config;
mod error;
pub mod http;
pub(crate) mod io;
pub mod router;
pub mod server;
pub mod template;

pub use error::{Error, Result};
pub use router::{Callback, Handler, Handlers, Module, RouteSpec, Router, RouterBuilder};
pub use server::builder;
pub use template::{Param, Params, PathTemplate, Pattern, PatternRegistry, QueryParam};
