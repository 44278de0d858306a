//! maps-core - Operation table and request assembly for the maps gateway
//!
//! This crate holds everything about a gateway invocation that does not touch
//! the network: the static [`OperationSpec`] table, validation of raw
//! [`RequestParams`] against it, and assembly of the [`UpstreamCall`] with the
//! server-held [`ApiKey`] appended.

pub mod call;
pub mod error;
pub mod operation;
pub mod params;

pub use call::{resolve_url, ApiKey, UpstreamCall, CREDENTIAL_QUERY_KEY};
pub use error::{ErrorKind, FieldError, GatewayError, GatewayResult, ValidationError};
pub use operation::{
    find_operation, CombineRule, OperationSpec, ParamSpec, ValidatedParams, DIRECTIONS, GEOCODE,
    OPERATIONS, PLACE_DETAILS, PLACE_SEARCH, REVERSE_GEOCODE,
};
pub use params::{FieldValue, ParamType, RequestParams, TypeMismatch};
