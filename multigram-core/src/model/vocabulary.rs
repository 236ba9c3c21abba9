use ahash::AHashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

use super::Token;

/// Label substituted for out-of-vocabulary tokens unless overridden.
pub const DEFAULT_UNK_LABEL: &str = "<UNK>";

/// A token multiset with a membership cutoff and an unknown-token label.
///
/// The raw counts stay private; everything downstream sees only the
/// filtered view: a token is a member iff it was observed at least
/// `cutoff` times. The unknown label is always considered present, so
/// masking is total and the vocabulary is never truly empty.
///
/// # Responsibilities
/// - Accumulate raw occurrence counts from token streams
/// - Answer membership under the cutoff
/// - Substitute the unknown label for out-of-vocabulary tokens
/// - Report size and iterate members plus the unknown label
///
/// # Invariants
/// - `cutoff` is always >= 1
/// - `len()` is always >= 1 (the unknown label counts as one entry)
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Vocabulary {
	/// Raw occurrence counts, unfiltered.
	counts: AHashMap<Token, usize>,

	/// Minimum raw count for membership.
	cutoff: usize,

	/// Token substituted for non-members.
	unk_label: Token,
}

impl Vocabulary {
	/// Creates an empty vocabulary with the given cutoff and the default
	/// unknown label.
	///
	/// # Errors
	/// Returns an error if `cutoff < 1`: such a cutoff would make every
	/// token a member and the filter meaningless.
	pub fn new(cutoff: usize) -> Result<Self> {
		if cutoff < 1 {
			return Err(ModelError::InvalidCutoff { cutoff });
		}
		Ok(Self {
			counts: AHashMap::new(),
			cutoff,
			unk_label: DEFAULT_UNK_LABEL.to_owned(),
		})
	}

	/// Creates a vocabulary from a token stream with the given cutoff.
	///
	/// # Errors
	/// Returns an error if `cutoff < 1`.
	pub fn from_tokens<I, S>(tokens: I, cutoff: usize) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut vocabulary = Self::new(cutoff)?;
		vocabulary.update(tokens);
		Ok(vocabulary)
	}

	/// Replaces the unknown label.
	pub fn with_unk_label(mut self, unk_label: &str) -> Self {
		self.unk_label = unk_label.to_owned();
		self
	}

	/// Accumulates further raw counts from a token stream.
	///
	/// Tokens below the cutoff stay recorded, so later observations can
	/// still promote them to members.
	pub fn update<I, S>(&mut self, tokens: I)
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		for token in tokens {
			*self.counts.entry(token.as_ref().to_owned()).or_insert(0) += 1;
		}
	}

	/// Returns the raw occurrence count of `token`, ignoring the cutoff.
	pub fn count(&self, token: &str) -> usize {
		self.counts.get(token).copied().unwrap_or(0)
	}

	/// Returns `true` if `token` is in the vocabulary.
	///
	/// Membership means the raw count reached the cutoff. The unknown
	/// label is always a member, whatever its raw count.
	pub fn contains(&self, token: &str) -> bool {
		token == self.unk_label || self.count(token) >= self.cutoff
	}

	/// Returns `token` unchanged if it is a member, the unknown label
	/// otherwise. Side-effect-free.
	pub fn mask<'a>(&'a self, token: &'a str) -> &'a str {
		if self.contains(token) { token } else { &self.unk_label }
	}

	/// Returns the vocabulary size: the number of members plus one for
	/// the unknown label.
	///
	/// A fresh vocabulary therefore reports 1, not 0.
	pub fn len(&self) -> usize {
		self.members().count() + 1
	}

	/// Returns `true` when nothing beyond the unknown label is usable.
	///
	/// Counting n-grams against such a vocabulary is rejected.
	pub fn is_empty(&self) -> bool {
		self.len() <= 1
	}

	/// Iterates over every member, followed by the unknown label exactly
	/// once.
	///
	/// The label is excluded from the member pass even when it was also
	/// observed as a real token, so it is never yielded twice.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.members().chain(std::iter::once(self.unk_label.as_str()))
	}

	/// Returns the configured cutoff.
	pub fn cutoff(&self) -> usize {
		self.cutoff
	}

	/// Returns the unknown label.
	pub fn unk_label(&self) -> &str {
		&self.unk_label
	}

	/// Members only: tokens at or above the cutoff, minus the label.
	fn members(&self) -> impl Iterator<Item = &str> {
		self.counts
			.iter()
			.filter(|&(token, &count)| count >= self.cutoff && *token != self.unk_label)
			.map(|(token, _)| token.as_str())
	}

	/// Replaces the cutoff, keeping the raw counts.
	///
	/// Only the counting engine uses this, on its own private copy; the
	/// public lifecycle keeps a vocabulary's cutoff fixed.
	///
	/// # Errors
	/// Returns an error if `cutoff < 1`.
	pub(crate) fn set_cutoff(&mut self, cutoff: usize) -> Result<()> {
		if cutoff < 1 {
			return Err(ModelError::InvalidCutoff { cutoff });
		}
		self.cutoff = cutoff;
		Ok(())
	}
}

/// Two vocabularies are equal when their raw counts and cutoffs match.
/// The unknown label is deliberately left out, so instances substituting
/// different sentinels over the same data still compare equal.
impl PartialEq for Vocabulary {
	fn eq(&self, other: &Self) -> bool {
		self.cutoff == other.cutoff && self.counts == other.counts
	}
}

impl Eq for Vocabulary {}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn rejects_cutoff_below_one() {
		assert_eq!(Vocabulary::new(0).unwrap_err(), ModelError::InvalidCutoff { cutoff: 0 });
		assert!(Vocabulary::from_tokens(["a"], 0).is_err());
	}

	#[test]
	fn cutoff_filters_membership() {
		let vocabulary = Vocabulary::from_tokens(["a", "a", "a", "b", "b", "c"], 2).unwrap();

		assert!(vocabulary.contains("a"));
		assert!(vocabulary.contains("b"));
		assert!(!vocabulary.contains("c"));
		// a, b and the unknown label
		assert_eq!(vocabulary.len(), 3);
	}

	#[test]
	fn raw_counts_survive_below_the_cutoff() {
		let mut vocabulary = Vocabulary::from_tokens(["a"], 2).unwrap();
		assert_eq!(vocabulary.count("a"), 1);
		assert!(!vocabulary.contains("a"));

		// A later update can still promote the token
		vocabulary.update(["a"]);
		assert!(vocabulary.contains("a"));
	}

	#[test]
	fn unknown_label_is_always_present() {
		let vocabulary = Vocabulary::new(1).unwrap();
		assert!(vocabulary.contains(DEFAULT_UNK_LABEL));
		assert_eq!(vocabulary.mask("never-seen"), DEFAULT_UNK_LABEL);

		let relabeled = Vocabulary::new(1).unwrap().with_unk_label("<oov>");
		assert!(relabeled.contains("<oov>"));
		assert!(!relabeled.contains(DEFAULT_UNK_LABEL));
		assert_eq!(relabeled.mask("never-seen"), "<oov>");
	}

	#[test]
	fn masking_members_is_identity() {
		let vocabulary = Vocabulary::from_tokens(["a", "a", "b"], 2).unwrap();
		assert_eq!(vocabulary.mask("a"), "a");
		assert_eq!(vocabulary.mask("b"), DEFAULT_UNK_LABEL);
	}

	#[test]
	fn fresh_vocabulary_has_size_one() {
		let vocabulary = Vocabulary::new(3).unwrap();
		assert_eq!(vocabulary.len(), 1);
		assert!(vocabulary.is_empty());
	}

	#[test]
	fn iteration_never_yields_the_label_twice() {
		// The label itself shows up in the data, above the cutoff
		let vocabulary =
			Vocabulary::from_tokens(["a", "a", DEFAULT_UNK_LABEL, DEFAULT_UNK_LABEL], 2).unwrap();

		let seen: Vec<&str> = vocabulary.iter().collect();
		assert_eq!(seen.iter().filter(|t| **t == DEFAULT_UNK_LABEL).count(), 1);
		assert_eq!(seen.len(), vocabulary.len());
		assert_eq!(seen.last().copied(), Some(DEFAULT_UNK_LABEL));
		assert!(seen.contains(&"a"));
	}

	#[test]
	fn clones_are_equal_but_independent() {
		let original = Vocabulary::from_tokens(["a", "a", "b"], 2).unwrap();
		let mut copied = original.clone();
		assert_eq!(original, copied);

		copied.update(["b"]);
		assert_ne!(original, copied);
		assert_eq!(original.count("b"), 1);
		assert_eq!(copied.count("b"), 2);
	}

	#[test]
	fn equality_ignores_the_unknown_label() {
		let left = Vocabulary::from_tokens(["a", "a"], 2).unwrap();
		let right = Vocabulary::from_tokens(["a", "a"], 2).unwrap().with_unk_label("<oov>");
		assert_eq!(left, right);

		let different_cutoff = Vocabulary::from_tokens(["a", "a"], 1).unwrap();
		assert_ne!(left, different_cutoff);
	}

	proptest! {
		#[test]
		fn size_is_filtered_distinct_plus_one(
			tokens in proptest::collection::vec("[a-e]", 0..40),
			cutoff in 1usize..4,
		) {
			let vocabulary = Vocabulary::from_tokens(tokens.iter(), cutoff).unwrap();

			let distinct_over_cutoff = ["a", "b", "c", "d", "e"]
				.into_iter()
				.filter(|letter| {
					tokens.iter().filter(|token| token.as_str() == *letter).count() >= cutoff
				})
				.count();
			prop_assert_eq!(vocabulary.len(), distinct_over_cutoff + 1);
		}

		#[test]
		fn mask_agrees_with_membership(
			tokens in proptest::collection::vec("[a-e]", 0..40),
			probe in "[a-g]",
		) {
			let vocabulary = Vocabulary::from_tokens(tokens.iter(), 2).unwrap();
			prop_assert_eq!(vocabulary.contains(&probe), vocabulary.mask(&probe) == probe);
		}
	}
}
