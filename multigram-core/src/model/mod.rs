//! Top-level module for the n-gram estimation system.
//!
//! This module provides the full modeling pipeline, leaf-first:
//! - Flat and conditional frequency tables (`FreqDist`, `ConditionalFreqDist`)
//! - A cutoff-filtered vocabulary (`Vocabulary`)
//! - A multi-order counting engine (`NGramCounter`)
//! - Probability estimation over counts (`ProbabilityDistribution`, `MleDistribution`)
//! - A conditional model with generation and entropy (`NGramModel`)
//! - Stochastic generation support (`Sampler`, `WeightedSampler`)

/// A single token. Models treat tokens as opaque strings; producing them
/// from raw text is the caller's responsibility.
pub type Token = String;

/// An n-gram as consumed by the counter: the last element is the word,
/// everything before it is the context it was observed in.
pub type NGram = Vec<Token>;

/// Multi-order n-gram counting engine.
///
/// Counts every order from unigrams up to a configured maximum in a
/// single pass, and supports merging independently trained counters.
pub mod counter;

/// Probability estimation over frequency tallies.
///
/// Defines the pluggable distribution seam and the plain
/// maximum-likelihood implementation.
pub mod distribution;

/// Flat and conditional frequency tables.
///
/// The counting substrate everything else is built on.
pub mod frequency;

/// Conditional probability model over sliding-window contexts.
///
/// Handles probability lookup, greedy and sampled generation, and
/// entropy scoring.
pub mod ngram_model;

/// Token sampling for stochastic generation.
///
/// Weighted random draws as the alternative to the model's arg-max.
pub mod sampler;

/// Token multiset with a membership cutoff and an unknown-token label.
pub mod vocabulary;
