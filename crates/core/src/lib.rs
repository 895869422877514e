#![deny(unused)]
//! Core types, traits, and error definitions for MirrorBrain.
//!
//! This crate provides the foundational building blocks shared across the
//! layers of the assistant engine: the intent and session data model, the
//! consumed-capability traits (language generation, device tools, knowledge
//! retrieval), the structured event channel used for progress reporting, the
//! typed configuration, and mock implementations for testing.

pub mod config;
pub mod error;
pub mod events;
pub mod mocks;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use events::*;
pub use traits::*;
pub use types::*;
