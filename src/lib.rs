//! An XML-RPC client in Rust.
//!
//! The `xmlrpc_client` crate implements the client side of the [XML-RPC spec][spec]: native
//! arguments are converted into [`Value`]s, written out as a `<methodCall>`, sent through a
//! [`Transport`], and the `<methodResponse>` is decoded back into a [`Value`] or a [`Fault`].
//!
//! ```no_run
//! use xmlrpc_client::{Client, Kind};
//!
//! let client = Client::new("http://127.0.0.1:8000").unwrap();
//! let result = client.call("pow", &[&2, &8]).unwrap();
//! assert_eq!(result.kind(), Kind::Int);
//! assert_eq!(result.int(), 256);
//! ```
//!
//! Values are an ordinary enum and can be inspected with the `try_*` accessors, which return a
//! [`TypeMismatch`] instead of coercing, or with the unchecked accessors, which panic with it.
//!
//! [spec]: http://xmlrpc.scripting.com/spec.html

mod client;
mod encode;
mod error;
mod fault;
mod parser;
mod request;
mod transport;
mod utils;
mod value;

pub use client::Client;
pub use encode::ToValue;
pub use error::{BoxError, EncodeError, Error, ParseError, TransportError, TypeMismatch};
pub use fault::Fault;
pub use parser::{parse_response, Response};
pub use request::Request;
pub use transport::{Reply, Transport};
pub use value::{Kind, Member, Value};

#[cfg(feature = "http")]
pub use transport::http;
