//! maps-gateway - Gateway dispatcher for the mapping provider
//!
//! Turns one operation invocation into exactly one upstream HTTP GET:
//! validate the caller's parameters against the [`OperationSpec`](maps_core::OperationSpec),
//! assemble the query with the server-held credential, send it through an
//! [`UpstreamTransport`], and relay the JSON body or a structured error.
//!
//! # Example
//!
//! ```ignore
//! use maps_core::{RequestParams, GEOCODE};
//! use maps_gateway::{Dispatcher, UpstreamConfig};
//!
//! let config = UpstreamConfig::default();
//! let dispatcher = Dispatcher::from_config(&config, config.api_key(Some("..."))?)?;
//! let params = RequestParams::new().with("address", "1600 Amphitheatre Pkwy");
//! let body = dispatcher.execute(&GEOCODE, &params).await?;
//! ```

pub mod config;
pub mod dispatcher;
pub mod transport;

pub use config::{ConfigError, UpstreamConfig, DEFAULT_BASE_URL};
pub use dispatcher::{Dispatcher, DispatcherError};
pub use transport::{
    HttpTransport, MockReply, MockTransport, TransportError, UpstreamResponse, UpstreamTransport,
};
