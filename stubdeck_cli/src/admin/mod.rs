//! Client for the mock server's admin REST API

mod client;
mod error;

pub use client::{AdminClient, RequestScope};
pub use error::AdminError;
