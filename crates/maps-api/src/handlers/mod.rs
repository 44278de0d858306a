//! HTTP request handlers for the maps API

pub mod forward;
pub mod operations;
