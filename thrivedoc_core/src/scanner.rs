use std::collections::HashSet;

use logos::Logos;
use serde::Deserialize;
use serde::Serialize;

/// Namespace of fee placeholders. Tokens under it follow a relaxed validity
/// rule: structural validity is checked here, schedule membership only at
/// save time.
pub const FEES_NAMESPACE: &str = "fees";

/// Raw tokens produced by logos for flat tokenization of document text.
/// Everything outside a `{{ … }}` pair is irrelevant to the scanner and
/// surfaces as lex errors that the walker skips.
#[derive(Logos, Debug, PartialEq)]
enum RawToken {
	#[token("{{")]
	OpenDelim,
	#[token("}}")]
	CloseDelim,
	#[token(".")]
	Dot,
	#[regex(r"[a-z][a-z0-9_]*")]
	Ident,
	#[regex(r"[ \t\r\n]+")]
	Whitespace,
}

/// A `namespace.key` token found in document content. Ephemeral: recomputed
/// from content on every change, never persisted.
///
/// `well_formed` is false only for `fees.`-prefixed tokens that fail the
/// structural pattern — those are surfaced so validation can flag them,
/// while any other malformed token is left to the editor's own rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
	/// The trimmed inner text of the token, e.g. `thrive.company_name`.
	pub raw: String,
	pub namespace: String,
	pub key: String,
	pub well_formed: bool,
}

impl Placeholder {
	/// The fully qualified key used for registry lookups.
	pub fn full_key(&self) -> &str {
		&self.raw
	}

	pub fn is_fee(&self) -> bool {
		self.namespace == FEES_NAMESPACE
	}
}

/// Extract the deduplicated, order-preserving placeholder sequence from raw
/// document text. Total and idempotent: malformed or partial tokens never
/// error, they are either ignored or surfaced as not well formed.
pub fn scan(content: &str) -> Vec<Placeholder> {
	let mut placeholders = Vec::new();
	let mut seen: HashSet<String> = HashSet::new();
	// Byte offset just past the most recent `{{`, while a token candidate is
	// open. A second `{{` abandons the previous candidate.
	let mut open_end: Option<usize> = None;

	for (token, span) in RawToken::lexer(content).spanned() {
		match token {
			Ok(RawToken::OpenDelim) => {
				open_end = Some(span.end);
			}
			Ok(RawToken::CloseDelim) => {
				let Some(start) = open_end.take() else {
					continue;
				};
				let Some(placeholder) = classify(&content[start..span.start]) else {
					continue;
				};
				if seen.insert(placeholder.raw.clone()) {
					placeholders.push(placeholder);
				}
			}
			// Inner tokens and unlexable text are only interesting through
			// the raw slice captured between the delimiters.
			Ok(_) | Err(()) => {}
		}
	}

	placeholders
}

/// The ordered bare keys of well-formed `fees.*` placeholders, the input to
/// the save-time compatibility check. First-occurrence order, already
/// deduplicated by `scan`.
pub fn required_fee_keys(placeholders: &[Placeholder]) -> Vec<String> {
	placeholders
		.iter()
		.filter(|placeholder| placeholder.is_fee() && placeholder.well_formed)
		.map(|placeholder| placeholder.key.clone())
		.collect()
}

/// Decide what the inner text of a `{{ … }}` pair refers to. Recognized iff
/// it matches `[a-z][a-z0-9_]*\.[a-z][a-z0-9_]*` after trimming; a
/// `fees.`-prefixed mismatch is still surfaced (not well formed) so it can
/// be reported as invalid instead of silently dropped.
fn classify(inner: &str) -> Option<Placeholder> {
	let trimmed = inner.trim();

	if let Some((namespace, key)) = trimmed.split_once('.') {
		if is_segment(namespace) && is_segment(key) {
			return Some(Placeholder {
				raw: trimmed.to_string(),
				namespace: namespace.to_string(),
				key: key.to_string(),
				well_formed: true,
			});
		}
	}

	if let Some(rest) = trimmed.strip_prefix("fees.") {
		return Some(Placeholder {
			raw: trimmed.to_string(),
			namespace: FEES_NAMESPACE.to_string(),
			key: rest.to_string(),
			well_formed: false,
		});
	}

	None
}

/// `[a-z][a-z0-9_]*` over a single segment. Rejects empty input, uppercase,
/// and embedded dots.
fn is_segment(segment: &str) -> bool {
	let mut bytes = segment.bytes();
	let Some(first) = bytes.next() else {
		return false;
	};
	first.is_ascii_lowercase()
		&& bytes.all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'_')
}
