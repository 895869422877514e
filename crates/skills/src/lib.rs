#![deny(unused)]
//! Tool registry and built-in device tools.
//!
//! This crate provides:
//! - A concurrent tool registry keyed by tool name
//! - Built-in device stubs (toast, haptics, battery, apps, notes, weather)

pub mod builtin;
pub mod registry;

pub use builtin::*;
pub use registry::ToolRegistry;
