use ahash::AHashMap;

use serde::{Deserialize, Serialize};

use super::{NGram, Token};

/// A flat frequency distribution: how many times each token was observed.
///
/// Conceptually this is one node of the counting engine: every context in
/// a [`ConditionalFreqDist`] owns one `FreqDist` over the tokens seen
/// after it, and the counter's unigram table is a single free-standing
/// `FreqDist` with no context at all.
///
/// ## Responsibilities
/// - Accumulate occurrence counts during training
/// - Keep the running total in step with every increment
/// - Report the most frequent token deterministically
/// - Merge with another distribution (parallel training support)
///
/// ## Invariants
/// - `total` always equals the sum of all counts
/// - Every recorded count is strictly positive
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct FreqDist {
	/// Observed tokens indexed by token; the value is the occurrence count.
	/// Example: { "the" => 42, "a" => 3 }
	counts: AHashMap<Token, usize>,
	/// Sum of all occurrence counts, updated on every increment.
	total: usize,
}

impl FreqDist {
	/// Creates an empty distribution.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records one occurrence of `token`.
	pub fn increment(&mut self, token: &str) {
		self.increment_by(token, 1);
	}

	/// Records `amount` occurrences of `token` at once.
	pub fn increment_by(&mut self, token: &str, amount: usize) {
		*self.counts.entry(token.to_owned()).or_insert(0) += amount;
		self.total += amount;
	}

	/// Returns how many times `token` was observed (0 when never seen).
	pub fn count(&self, token: &str) -> usize {
		self.counts.get(token).copied().unwrap_or(0)
	}

	/// Returns the total number of observations across all tokens.
	pub fn total(&self) -> usize {
		self.total
	}

	/// Returns the number of distinct tokens observed.
	pub fn len(&self) -> usize {
		self.counts.len()
	}

	/// Returns `true` if nothing was observed yet.
	pub fn is_empty(&self) -> bool {
		self.counts.is_empty()
	}

	/// Iterates over every observed token with its count, in no
	/// particular order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
		self.counts.iter().map(|(token, count)| (token.as_str(), *count))
	}

	/// Returns the most frequent token, or `None` when empty.
	///
	/// Ties are broken toward the lexicographically smallest token, so
	/// repeated calls on the same distribution always agree.
	pub fn max(&self) -> Option<&str> {
		self.counts
			.iter()
			.max_by(|(token_a, count_a), (token_b, count_b)| {
				count_a.cmp(count_b).then_with(|| token_b.cmp(token_a))
			})
			.map(|(token, _)| token.as_str())
	}

	/// Merges another distribution into this one.
	///
	/// Occurrence counts of matching tokens are summed. Intended for
	/// combining partial counts built in parallel.
	pub fn merge(&mut self, other: &Self) {
		for (token, count) in &other.counts {
			*self.counts.entry(token.clone()).or_insert(0) += *count;
		}
		self.total += other.total;
	}
}

/// A conditional frequency distribution: one [`FreqDist`] per context.
///
/// The key is the tuple of tokens that preceded the observation. The
/// empty context is an ordinary key, so order-1 style counts can live
/// here too when a caller wants them keyed uniformly.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ConditionalFreqDist {
	/// Distributions indexed by the context they were observed under.
	conditions: AHashMap<NGram, FreqDist>,
}

impl ConditionalFreqDist {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records one occurrence of `token` after `context`.
	pub fn increment(&mut self, context: &[Token], token: &str) {
		self.conditions.entry(context.to_vec()).or_default().increment(token);
	}

	/// Returns the distribution observed under `context`, if any.
	pub fn get(&self, context: &[Token]) -> Option<&FreqDist> {
		self.conditions.get(context)
	}

	/// Returns how many times `token` was observed after `context`.
	pub fn count(&self, context: &[Token], token: &str) -> usize {
		self.get(context).map_or(0, |freqs| freqs.count(token))
	}

	/// Returns the number of distinct contexts observed.
	pub fn len(&self) -> usize {
		self.conditions.len()
	}

	/// Returns `true` if no context was observed yet.
	pub fn is_empty(&self) -> bool {
		self.conditions.is_empty()
	}

	/// Iterates over every context with its distribution, in no
	/// particular order.
	pub fn iter(&self) -> impl Iterator<Item = (&[Token], &FreqDist)> {
		self.conditions.iter().map(|(context, freqs)| (context.as_slice(), freqs))
	}

	/// Merges another table into this one.
	///
	/// Existing contexts are merged in place; missing ones are cloned.
	pub fn merge(&mut self, other: &Self) {
		for (context, freqs) in &other.conditions {
			if let Some(existing) = self.conditions.get_mut(context) {
				existing.merge(freqs);
			} else {
				self.conditions.insert(context.clone(), freqs.clone());
			}
		}
	}
}
