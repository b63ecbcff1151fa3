pub mod headers;
pub mod incoming;
pub mod request;
pub mod response;
pub mod server;

pub use headers::{HeaderMapExt, ReadHeaders, WriteHeaders};
pub use incoming::{Incoming, ReadIncoming};
pub use request::{parse_form, Request};
pub use response::{Reply, Response, WriteReply};
