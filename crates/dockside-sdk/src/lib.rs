//! Client for a container engine's remote API.
//!
//! Every operation is a single request/response exchange: the identifier is
//! validated, options are serialized into the path and query, the request is
//! sent through a [`Transport`] and the response is either decoded or mapped
//! to a typed [`Error`].

mod client;
mod container;
mod context;
mod error;
mod query;
mod service;
mod system;
mod transport;

pub use client::Client;
pub use container::{ContainerJson, ContainerState, RemoveOptions};
pub use context::Context;
pub use error::{Error, ErrorKind, TransportError};
pub use service::{Service, ServiceInspectOptions, ServiceSpec, Version};
pub use system::Ping;
pub use transport::{HttpTransport, Request, Response, Transport};

pub use reqwest::Method;
