use serde::{Deserialize, Serialize};

use super::frequency::FreqDist;

/// A probability distribution over the tokens following one context.
///
/// This is the estimation seam of the crate: a model turns each context's
/// frequency tally into a distribution through a factory closure, so the
/// smoothing math lives entirely behind this trait. Implementations own
/// whatever summary of the tally they need and are never mutated after
/// construction.
pub trait ProbabilityDistribution {
	/// Returns the probability of `token`, in `[0, 1]`.
	fn prob(&self, token: &str) -> f64;

	/// Returns the base-2 logarithm of [`prob`](Self::prob), so scores
	/// are in bits. Negative infinity when the probability is 0.
	fn log_prob(&self, token: &str) -> f64 {
		let prob = self.prob(token);
		if prob > 0.0 { prob.log2() } else { f64::NEG_INFINITY }
	}

	/// Returns the highest-probability token, or `None` when the
	/// distribution has no support.
	///
	/// Ties must resolve deterministically; the in-crate implementation
	/// picks the lexicographically smallest token.
	fn max(&self) -> Option<&str>;

	/// Iterates over every supported token with its probability.
	fn samples(&self) -> impl Iterator<Item = (&str, f64)>;
}

/// Plain maximum-likelihood estimation: each token's probability is its
/// observed count divided by the context's total.
///
/// An empty tally gives probability 0 everywhere, which is exactly the
/// policy handed to unseen contexts; smoothing strategies replace this
/// type behind [`ProbabilityDistribution`] rather than changing it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MleDistribution {
	/// The frequency tally this estimate is derived from.
	freqs: FreqDist,
}

impl MleDistribution {
	/// Builds the estimate from one context's tally.
	///
	/// The signature doubles as a distribution factory, so it can be
	/// passed directly when training a model.
	pub fn new(freqs: &FreqDist) -> Self {
		Self { freqs: freqs.clone() }
	}
}

impl ProbabilityDistribution for MleDistribution {
	fn prob(&self, token: &str) -> f64 {
		let total = self.freqs.total();
		if total == 0 {
			return 0.0;
		}
		self.freqs.count(token) as f64 / total as f64
	}

	fn max(&self) -> Option<&str> {
		self.freqs.max()
	}

	fn samples(&self) -> impl Iterator<Item = (&str, f64)> {
		let total = self.freqs.total();
		self.freqs.iter().map(move |(token, count)| {
			let prob = if total == 0 { 0.0 } else { count as f64 / total as f64 };
			(token, prob)
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn tally(pairs: &[(&str, usize)]) -> FreqDist {
		let mut freqs = FreqDist::new();
		for (token, count) in pairs {
			freqs.increment_by(token, *count);
		}
		freqs
	}

	#[test]
	fn probabilities_are_counts_over_total() {
		let dist = MleDistribution::new(&tally(&[("a", 3), ("b", 1)]));
		assert_eq!(dist.prob("a"), 0.75);
		assert_eq!(dist.prob("b"), 0.25);
		assert_eq!(dist.prob("missing"), 0.0);
	}

	#[test]
	fn observed_probabilities_sum_to_one() {
		let dist = MleDistribution::new(&tally(&[("a", 2), ("b", 1), ("c", 1)]));
		let sum: f64 = dist.samples().map(|(_, prob)| prob).sum();
		assert!((sum - 1.0).abs() < 1e-12);
	}

	#[test]
	fn log_prob_is_in_bits() {
		let dist = MleDistribution::new(&tally(&[("a", 1), ("b", 1)]));
		assert_eq!(dist.log_prob("a"), -1.0);
	}

	#[test]
	fn impossible_tokens_have_infinitely_negative_log_prob() {
		let empty = MleDistribution::new(&FreqDist::new());
		assert_eq!(empty.prob("a"), 0.0);
		assert_eq!(empty.log_prob("a"), f64::NEG_INFINITY);
		assert_eq!(empty.max(), None);
	}

	#[test]
	fn max_is_deterministic_under_ties() {
		let dist = MleDistribution::new(&tally(&[("b", 2), ("a", 2), ("c", 1)]));
		assert_eq!(dist.max(), Some("a"));
	}
}
