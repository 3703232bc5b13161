//! Input eligibility check

/// Minimum document length, in characters, worth sending to the service
pub const MIN_DOCUMENT_CHARS: usize = 5;

/// Whether `text` is long enough to classify.
///
/// Length is counted in `char`s with no trimming, so whitespace counts.
pub fn is_eligible(text: &str) -> bool {
    // Avoid a full scan for long documents
    text.chars().nth(MIN_DOCUMENT_CHARS - 1).is_some()
}
