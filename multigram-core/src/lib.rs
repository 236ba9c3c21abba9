//! N-gram language model estimation library.
//!
//! This crate provides the building blocks for statistical language models:
//! - A cutoff-filtered vocabulary with unknown-token substitution
//! - A multi-order n-gram counting engine
//! - Conditional probability models with generation and entropy scoring
//! - A pluggable estimation seam (distribution factories) and an opt-in
//!   sampling seam for stochastic generation
//!
//! Corpus loading, tokenization and persistence stay outside: the library
//! consumes token sequences and hands back queryable in-memory models.
//! All model types carry serde derives so callers can persist them with
//! the format of their choice.

/// Vocabulary, counting, and probability model types.
pub mod model;

/// Error type shared by every fallible operation in the crate.
pub mod error;
