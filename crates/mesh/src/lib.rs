#![deny(unused)]
//! Mesh relay client.
//!
//! Forwards utterances to a remote peer over a relay and correlates the
//! asynchronous reply. Delivery is best-effort and bounded by a timeout;
//! nothing here retries or queues.

pub mod client;

pub use client::{MeshClient, PENDING_REPLY_PLACEHOLDER};
