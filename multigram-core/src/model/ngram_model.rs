use ahash::AHashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use super::Token;
use super::distribution::ProbabilityDistribution;
use super::frequency::{ConditionalFreqDist, FreqDist};
use super::sampler::Sampler;

/// A conditional language model over fixed-length contexts.
///
/// Trained by sliding a window over raw token sequences: the token at
/// each position is tallied under the up-to-`n` tokens preceding it,
/// clipped at the sentence start and never padded. Each context's tally
/// is then turned into a probability distribution through a factory, and
/// the table is never mutated afterward.
///
/// The factory also supplies the distribution used for contexts that
/// were never observed, by being applied to an empty tally: that is the
/// whole unseen-context policy, owned by the estimation strategy instead
/// of the model (plain maximum likelihood answers probability 0).
///
/// # Responsibilities
/// - Build one distribution per observed context
/// - Answer probability and log-probability queries
/// - Generate sequences, greedily or through a [`Sampler`]
/// - Score sequences by entropy
///
/// # Invariants
/// - Context keys never exceed `n` tokens
/// - For every observed context, the distribution covers exactly the
///   tokens observed after it
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NGramModel<D> {
	/// Number of context tokens conditioning each prediction.
	n: usize,

	/// One distribution per context observed during training.
	model: AHashMap<Vec<Token>, D>,

	/// Factory image of an empty tally, served for unseen contexts.
	unseen: D,
}

impl<D: ProbabilityDistribution> NGramModel<D> {
	/// Trains a model with `context_len` tokens of context over raw token
	/// sequences, estimating each context's distribution through
	/// `distribution_factory`.
	///
	/// A `context_len` of 0 is legal and yields a bag-of-words model with
	/// a single empty context.
	pub fn train<I, S, F>(context_len: usize, corpus: I, distribution_factory: F) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<[Token]>,
		F: Fn(&FreqDist) -> D,
	{
		let mut tallies = ConditionalFreqDist::new();
		for sentence in corpus {
			let sentence = sentence.as_ref();
			for index in 0..sentence.len() {
				let context = &sentence[index.saturating_sub(context_len)..index];
				tallies.increment(context, &sentence[index]);
			}
		}
		debug!("estimating distributions for {} contexts", tallies.len());

		let model = tallies
			.iter()
			.map(|(context, freqs)| (context.to_vec(), distribution_factory(freqs)))
			.collect();

		Self { n: context_len, model, unseen: distribution_factory(&FreqDist::new()) }
	}

	/// Returns the number of context tokens used for conditioning.
	pub fn context_len(&self) -> usize {
		self.n
	}

	/// Returns the number of contexts observed during training.
	pub fn len(&self) -> usize {
		self.model.len()
	}

	/// Returns `true` if no context was observed during training.
	pub fn is_empty(&self) -> bool {
		self.model.is_empty()
	}

	/// Returns the up-to-`n` tokens immediately preceding `index`.
	///
	/// Clipped at the start of the sequence; never padded.
	///
	/// # Panics
	/// Panics if `index > tokens.len()`.
	pub fn context<'a>(&self, tokens: &'a [Token], index: usize) -> &'a [Token] {
		&tokens[index.saturating_sub(self.n)..index]
	}

	/// Returns the probability of `word` following `context`, in `[0, 1]`.
	///
	/// Contexts never observed during training answer through the
	/// factory's empty-tally distribution.
	pub fn prob(&self, word: &str, context: &[Token]) -> f64 {
		self.distribution(context).prob(word)
	}

	/// Returns the base-2 log of [`prob`](Self::prob), in bits; negative
	/// infinity when the probability is 0.
	pub fn log_prob(&self, word: &str, context: &[Token]) -> f64 {
		self.distribution(context).log_prob(word)
	}

	/// Returns the most likely word following `context`, or `None` when
	/// nothing was ever observed after it.
	///
	/// Deterministic arg-max; for stochastic draws go through
	/// [`generate_with`](Self::generate_with).
	pub fn generate_greedy(&self, context: &[Token]) -> Option<&str> {
		self.distribution(context).max()
	}

	/// Builds a sequence of up to `length` words by repeatedly appending
	/// the arg-max continuation of the rolling context.
	///
	/// Stops early when a context has no observed continuation, so the
	/// result can be shorter than `length`.
	pub fn generate(&self, length: usize) -> Vec<Token> {
		let mut sequence: Vec<Token> = Vec::with_capacity(length);
		for _ in 0..length {
			let next = match self.generate_greedy(self.context(&sequence, sequence.len())) {
				Some(word) => word.to_owned(),
				// Dead end, nothing was ever observed here
				None => break,
			};
			sequence.push(next);
		}
		sequence
	}

	/// Like [`generate`](Self::generate), but draws each continuation
	/// from the context's distribution through `sampler` instead of
	/// taking the arg-max.
	pub fn generate_with<S: Sampler>(&self, length: usize, sampler: &mut S) -> Vec<Token> {
		let mut sequence: Vec<Token> = Vec::with_capacity(length);
		for _ in 0..length {
			let distribution = self.distribution(self.context(&sequence, sequence.len()));
			let next = match sampler.sample(distribution) {
				Some(word) => word,
				None => break,
			};
			sequence.push(next);
		}
		sequence
	}

	/// Returns the total negative log-likelihood of `sequence`, in bits:
	/// the sum over every position of `-log_prob` of its token under the
	/// rolling context.
	///
	/// Positive infinity as soon as any position has probability 0.
	pub fn entropy(&self, sequence: &[Token]) -> f64 {
		let mut total = 0.0;
		for index in 0..sequence.len() {
			let context = self.context(sequence, index);
			total -= self.log_prob(&sequence[index], context);
		}
		total
	}

	/// The distribution conditioned on `context`, falling back to the
	/// unseen-context policy.
	fn distribution(&self, context: &[Token]) -> &D {
		self.model.get(context).unwrap_or(&self.unseen)
	}
}
