//! Codacy API v3 access: the blocking transport and the typed endpoints
//! layered on top of it.
mod client;
pub(crate) mod error;
#[cfg(test)]
pub(crate) mod fake;
pub(crate) mod transport;
pub(crate) mod types;

pub(crate) use client::CodacyClient;
pub(crate) use transport::{HttpTransport, Transport, DEFAULT_BASE_URL};
