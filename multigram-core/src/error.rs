/// Errors reported by vocabulary construction, counting and lookups.
///
/// Every failure stems from caller-supplied configuration or data, never
/// from transient resource issues, so all variants are detected eagerly
/// at the offending call and none is retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
	/// A vocabulary cutoff below 1 would make every token a member.
	#[error("cutoff cannot be less than 1, got {cutoff}")]
	InvalidCutoff { cutoff: usize },

	/// N-gram orders start at 1 (unigrams).
	#[error("ngram order must be at least 1, got {order}")]
	InvalidOrder { order: usize },

	/// A lookup asked for an order the counter does not track.
	#[error("order {requested} is outside the counted range 1..={max}")]
	OrderOutOfRange { requested: usize, max: usize },

	/// Counting against a vocabulary holding nothing beyond the unknown
	/// label is meaningless.
	#[error("vocabulary contains nothing beyond the unknown label")]
	EmptyVocabulary,

	/// A supplied n-gram was longer than the counter's highest order.
	#[error("ngram of length {len} exceeds the highest order {order}")]
	OversizedNgram { len: usize, order: usize },

	/// Counters can only merge when trained with the same shape.
	#[error("cannot merge counters with different orders or vocabularies")]
	MergeConflict,
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ModelError>;
