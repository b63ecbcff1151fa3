pub mod app;
mod health_check;
mod service;

pub use app::{builder, Server, ServerBuilder};
pub use health_check::HealthCheck;
pub use service::RouterService;
