#![deny(unused)]
//! Rule-based intent classification.
//!
//! `classify` is a pure function: no I/O, no side effects, same utterance in,
//! same [`Intent`] out. That determinism is what makes the fast path
//! testable without a model runtime.

mod classifier;
mod rules;

pub use classifier::IntentClassifier;
pub use mirrorbrain_core::types::FAST_PATH_THRESHOLD;
