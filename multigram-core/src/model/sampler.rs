use rand::Rng;
use rand::rngs::ThreadRng;

use super::Token;
use super::distribution::ProbabilityDistribution;

/// Draws the next token from a distribution.
///
/// The stochastic counterpart of the model's deterministic arg-max:
/// generation takes a sampler only when the caller opts in.
pub trait Sampler {
	/// Picks a token from `distribution`, or `None` when it has no
	/// support.
	fn sample<D: ProbabilityDistribution>(&mut self, distribution: &D) -> Option<Token>;
}

/// Samples tokens proportionally to their probability.
///
/// Each draw performs:
/// - an O(n) scan over the supported tokens
/// - a cumulative subtraction to select a bucket
pub struct WeightedSampler<R: Rng = ThreadRng> {
	rng: R,
}

impl WeightedSampler {
	/// Creates a sampler backed by the thread-local generator.
	pub fn new() -> Self {
		Self { rng: rand::rng() }
	}
}

impl Default for WeightedSampler {
	fn default() -> Self {
		Self::new()
	}
}

impl<R: Rng> WeightedSampler<R> {
	/// Creates a sampler backed by the given generator.
	///
	/// A seeded generator makes the draws reproducible.
	pub fn with_rng(rng: R) -> Self {
		Self { rng }
	}
}

impl<R: Rng> Sampler for WeightedSampler<R> {
	fn sample<D: ProbabilityDistribution>(&mut self, distribution: &D) -> Option<Token> {
		// Total mass of the support; zero mass means nothing to draw
		let total: f64 = distribution.samples().map(|(_, prob)| prob).sum();
		if total <= 0.0 {
			return None;
		}

		let mut r = self.rng.random_range(0.0..total);

		let mut fallback: Option<&str> = None;
		for (token, prob) in distribution.samples() {
			if r < prob {
				return Some(token.to_owned());
			}
			r -= prob;
			fallback = Some(token);
		}

		// Rounding can exhaust the scan; keep the last bucket
		fallback.map(str::to_owned)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::distribution::MleDistribution;
	use crate::model::frequency::FreqDist;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn dist(pairs: &[(&str, usize)]) -> MleDistribution {
		let mut freqs = FreqDist::new();
		for (token, count) in pairs {
			freqs.increment_by(token, *count);
		}
		MleDistribution::new(&freqs)
	}

	#[test]
	fn empty_distributions_yield_nothing() {
		let mut sampler = WeightedSampler::new();
		assert_eq!(sampler.sample(&dist(&[])), None);
	}

	#[test]
	fn single_support_is_always_drawn() {
		let mut sampler = WeightedSampler::new();
		for _ in 0..20 {
			assert_eq!(sampler.sample(&dist(&[("a", 3)])), Some("a".to_owned()));
		}
	}

	#[test]
	fn draws_stay_inside_the_support() {
		let mut sampler = WeightedSampler::with_rng(StdRng::seed_from_u64(42));
		let distribution = dist(&[("a", 1), ("b", 3)]);

		for _ in 0..50 {
			let drawn = sampler.sample(&distribution).unwrap();
			assert!(drawn == "a" || drawn == "b");
		}
	}

	#[test]
	fn seeded_draws_are_reproducible() {
		let distribution = dist(&[("a", 1), ("b", 2), ("c", 5)]);

		let mut first = WeightedSampler::with_rng(StdRng::seed_from_u64(7));
		let mut second = WeightedSampler::with_rng(StdRng::seed_from_u64(7));

		let left: Vec<_> = (0..10).map(|_| first.sample(&distribution)).collect();
		let right: Vec<_> = (0..10).map(|_| second.sample(&distribution)).collect();
		assert_eq!(left, right);
	}
}
