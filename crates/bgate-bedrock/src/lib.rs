//! Bedrock runtime invocation client.
//!
//! Everything transport-shaped lives here: SigV4 signing, the
//! `vnd.amazon.eventstream` frame decoder, bounded retry, and the
//! per-region client pool. The rest of the gateway only sees the
//! `ModelInvoker` trait and opaque payload bytes.

pub mod client;
pub mod eventstream;
pub mod pool;
pub mod sign;

pub use client::BedrockClient;
pub use pool::{ClientPool, PooledInvoker};
pub use sign::Credentials;
