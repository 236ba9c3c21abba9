use ahash::AHashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

use super::NGram;
use super::Token;
use super::frequency::{ConditionalFreqDist, FreqDist};
use super::vocabulary::Vocabulary;

/// Combines several token streams into one vocabulary with the given
/// cutoff.
///
/// # Errors
/// Returns an error if `cutoff < 1`.
pub fn build_vocabulary<I, S>(cutoff: usize, corpora: I) -> Result<Vocabulary>
where
	I: IntoIterator,
	I::Item: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut vocabulary = Vocabulary::new(cutoff)?;
	for corpus in corpora {
		vocabulary.update(corpus);
	}
	Ok(vocabulary)
}

/// Creates a counter of the given order and trains it over several texts
/// in sequence.
///
/// # Errors
/// Returns an error if the order is 0, the vocabulary is effectively
/// empty, or any supplied n-gram exceeds the order.
pub fn count_ngrams<I, S>(order: usize, vocabulary: &Vocabulary, texts: I) -> Result<NGramCounter>
where
	I: IntoIterator,
	I::Item: IntoIterator<Item = S>,
	S: AsRef<[NGram]>,
{
	let mut counter = NGramCounter::new(order, vocabulary)?;
	for text in texts {
		counter.train(text)?;
	}
	Ok(counter)
}

/// Multi-order n-gram counting engine.
///
/// A counter of order `k` maintains one frequency table per order from 1
/// (a flat unigram table) up to `k` (context tuple -> next-token counts),
/// and fills all of them in a single pass over pre-built n-gram tuples.
///
/// The counter owns a private copy of the vocabulary it was built with,
/// so nothing it does can alias the caller's instance. It does not mask
/// tokens itself: supplying correctly sized, already masked n-gram tuples
/// is the caller's job (sliding-window generation stays outside).
///
/// # Responsibilities
/// - Count every order from a single pass over each sentence
/// - Bootstrap sentence-initial context tokens into the unigram table
/// - Expose per-order count tables behind a range-checked lookup
/// - Merge with another counter of the same shape
///
/// # Invariants
/// - `order` is always >= 1
/// - Counts accumulate across `train` calls and never reset
/// - For any context at order k, its distribution's total equals the
///   number of times that context was observed at order k
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NGramCounter {
	/// Highest n-gram length tracked.
	order: usize,

	/// Private vocabulary copy; only its emptiness gates training.
	vocabulary: Vocabulary,

	/// Order-1 counts (no context).
	unigrams: FreqDist,

	/// Context-keyed counts for each order in `2..=order`.
	ngram_orders: AHashMap<usize, ConditionalFreqDist>,
}

impl NGramCounter {
	/// Creates a counter of the given order over a private copy of
	/// `vocabulary`.
	///
	/// # Errors
	/// Returns an error if `order` is 0.
	pub fn new(order: usize, vocabulary: &Vocabulary) -> Result<Self> {
		if order < 1 {
			return Err(ModelError::InvalidOrder { order });
		}

		let mut ngram_orders = AHashMap::new();
		for ngram_order in 2..=order {
			ngram_orders.insert(ngram_order, ConditionalFreqDist::new());
		}

		Ok(Self {
			order,
			vocabulary: vocabulary.clone(),
			unigrams: FreqDist::new(),
			ngram_orders,
		})
	}

	/// Replaces the cutoff of the internal vocabulary copy.
	///
	/// The caller's original vocabulary is never touched.
	///
	/// # Errors
	/// Returns an error if `cutoff < 1`.
	pub fn with_cutoff(mut self, cutoff: usize) -> Result<Self> {
		self.vocabulary.set_cutoff(cutoff)?;
		Ok(self)
	}

	/// Replaces the unknown label of the internal vocabulary copy.
	pub fn with_unk_label(mut self, unk_label: &str) -> Self {
		self.vocabulary = self.vocabulary.with_unk_label(unk_label);
		self
	}

	/// Returns the highest order this counter tracks.
	pub fn order(&self) -> usize {
		self.order
	}

	/// Returns the internal vocabulary copy.
	pub fn vocabulary(&self) -> &Vocabulary {
		&self.vocabulary
	}

	/// Returns the flat unigram table.
	pub fn unigrams(&self) -> &FreqDist {
		&self.unigrams
	}

	/// Counts every sentence of pre-built n-gram tuples, at every order.
	///
	/// Each n-gram's last element is the word, the prefix its context.
	/// Per sentence:
	/// 1. At the first n-gram only, every token of its context gets a
	///    unigram count: sentence-initial tokens would otherwise never be
	///    counted as targets.
	/// 2. The word is counted under its context at the highest order, and
	///    under front-truncated copies of that context at every order
	///    down to 2. Truncating by `order - level` positions (clipped at
	///    the context length) yields the context relevant at each level.
	/// 3. The word gets a unigram count.
	///
	/// Empty tuples carry no counts and are skipped.
	///
	/// # Errors
	/// Returns an error without recording anything if the vocabulary is
	/// effectively empty. Returns an error if an n-gram is longer than
	/// the counter's order; sentences processed earlier in the same call
	/// stay counted.
	pub fn train<I, S>(&mut self, sentences: I) -> Result<()>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<[NGram]>,
	{
		// Size 1 means nothing beyond the unknown label
		if self.vocabulary.is_empty() {
			return Err(ModelError::EmptyVocabulary);
		}

		let mut seen = 0usize;
		for sentence in sentences {
			let mut sentence_start = true;
			for ngram in sentence.as_ref() {
				if ngram.len() > self.order {
					return Err(ModelError::OversizedNgram {
						len: ngram.len(),
						order: self.order,
					});
				}
				let (word, context) = match ngram.split_last() {
					Some(split) => split,
					// An empty tuple carries no counts
					None => continue,
				};

				if sentence_start {
					for context_word in context {
						self.unigrams.increment(context_word);
					}
					sentence_start = false;
				}

				// One increment per order, under the front-truncated context
				for (trunc_index, ngram_order) in (2..=self.order).rev().enumerate() {
					let start = trunc_index.min(context.len());
					self.ngram_orders
						.entry(ngram_order)
						.or_default()
						.increment(&context[start..], word);
				}
				self.unigrams.increment(word);
				seen += 1;
			}
		}
		debug!("counted {} ngrams at orders 1..={}", seen, self.order);

		Ok(())
	}

	/// Returns the count table for one order.
	///
	/// Order 1 is the flat unigram table; higher orders are keyed by
	/// context.
	///
	/// # Errors
	/// Returns an error if `order_number` is outside `1..=order`.
	pub fn lookup(&self, order_number: usize) -> Result<OrderCounts<'_>> {
		if order_number < 1 || order_number > self.order {
			return Err(ModelError::OrderOutOfRange {
				requested: order_number,
				max: self.order,
			});
		}
		if order_number == 1 {
			return Ok(OrderCounts::Unigrams(&self.unigrams));
		}
		self.ngram_orders
			.get(&order_number)
			.map(OrderCounts::Contexts)
			.ok_or(ModelError::OrderOutOfRange { requested: order_number, max: self.order })
	}

	/// Merges another counter into this one by summing all counts.
	///
	/// Intended for combining counters trained independently, for
	/// example one per thread over chunks of a corpus.
	///
	/// # Errors
	/// Returns an error if the orders differ or the vocabularies are not
	/// equal.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.order != other.order || self.vocabulary != other.vocabulary {
			return Err(ModelError::MergeConflict);
		}

		self.unigrams.merge(&other.unigrams);
		for (ngram_order, counts) in &other.ngram_orders {
			if let Some(existing) = self.ngram_orders.get_mut(ngram_order) {
				existing.merge(counts);
			} else {
				self.ngram_orders.insert(*ngram_order, counts.clone());
			}
		}

		Ok(())
	}
}

/// Read-only view over one order's counts.
#[derive(Debug)]
pub enum OrderCounts<'a> {
	/// Order 1: flat token frequencies, no context.
	Unigrams(&'a FreqDist),
	/// Orders 2 and up: counts keyed by context tuple.
	Contexts(&'a ConditionalFreqDist),
}

impl OrderCounts<'_> {
	/// Returns the count of `word` after `context`.
	///
	/// The unigram view has no contexts and ignores the argument.
	pub fn count(&self, context: &[Token], word: &str) -> usize {
		match self {
			Self::Unigrams(unigrams) => unigrams.count(word),
			Self::Contexts(contexts) => contexts.count(context, word),
		}
	}
}
