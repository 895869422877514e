//! Core type definitions for MirrorBrain.
//!
//! Broken down into submodules for better maintainability.

pub mod intent;
pub mod mesh;
pub mod session;
pub mod tool;

pub use intent::*;
pub use mesh::*;
pub use session::*;
pub use tool::*;
