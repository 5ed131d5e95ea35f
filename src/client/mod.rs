//! Remote data fetching over HTTP

pub mod config;
pub mod http;

pub use config::*;
pub use http::*;
