//! Utilities shared across engine drivers.

pub mod tls;

pub use tls::{SslMode, TlsBuilder};
