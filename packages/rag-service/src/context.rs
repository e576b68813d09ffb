use crate::UniqueDocument;

pub const CHUNK_SEPARATOR: &str = "\n\n";

/// `[[Sumber: <title>]]` followed by the passage.
pub fn format_chunk(doc: &UniqueDocument) -> String {
	format!("[[Sumber: {}]]\n{}", doc.display_title(), doc.hit.text.trim())
}

/// Concatenates chunks in rank order until the next one would not fit in `max_chars`.
///
/// Accumulation stops at the first chunk that overflows; later, shorter chunks are not
/// considered and no chunk is ever cut. Lengths are counted in characters.
pub fn compile_context(docs: &[UniqueDocument], max_chars: usize) -> String {
	let separator_chars = CHUNK_SEPARATOR.chars().count();
	let mut out = String::new();
	let mut used = 0_usize;

	for (rank, doc) in docs.iter().enumerate() {
		let chunk = format_chunk(doc);
		let separator = if out.is_empty() { 0 } else { separator_chars };
		let needed = separator + chunk.chars().count();

		if used + needed > max_chars {
			tracing::debug!(
				included = rank,
				skipped = docs.len() - rank,
				max_chars,
				"Context budget reached."
			);

			break;
		}
		if separator > 0 {
			out.push_str(CHUNK_SEPARATOR);
		}

		out.push_str(&chunk);

		used += needed;
	}

	out
}
