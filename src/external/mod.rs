//! Collaborators outside the process: the paginated list endpoint.

pub mod client;
pub mod endpoint;

pub use client::build_http_client;
pub use endpoint::{HttpListEndpoint, ListEndpoint};
