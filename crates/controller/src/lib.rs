#![deny(unused)]
//! Decision and execution core for MirrorBrain.
//!
//! This crate provides the action executor (fast path), the reasoning loop
//! (slow path), and the orchestrator that routes each utterance between
//! them and the mesh relay.

pub mod executor;
pub mod history;
pub mod orchestrator;
pub mod parser;
pub mod react;

pub use executor::ActionExecutor;
pub use orchestrator::Orchestrator;
pub use parser::{ActionParser, ParsedStep};
pub use react::{LoopRun, LoopState, ReasoningLoop};
