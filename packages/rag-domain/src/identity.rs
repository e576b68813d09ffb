/// Lowercases, drops punctuation, collapses whitespace, and keeps the first `prefix_chars`
/// characters.
pub fn normalize_for_identity(text: &str, prefix_chars: usize) -> String {
	let mut out = String::with_capacity(text.len().min(prefix_chars * 4));
	let mut count = 0_usize;
	let mut pending_space = false;

	for ch in text.chars().flat_map(char::to_lowercase) {
		if ch.is_whitespace() {
			pending_space = !out.is_empty();

			continue;
		}
		if !ch.is_alphanumeric() {
			continue;
		}
		if pending_space {
			if count >= prefix_chars {
				break;
			}

			out.push(' ');

			count += 1;
			pending_space = false;
		}
		if count >= prefix_chars {
			break;
		}

		out.push(ch);

		count += 1;
	}

	out
}

/// Stable digest of the normalized prefix. Hits sharing it are the same document.
pub fn content_identity(text: &str, prefix_chars: usize) -> String {
	let normalized = normalize_for_identity(text, prefix_chars);

	blake3::hash(normalized.as_bytes()).to_hex().to_string()
}
