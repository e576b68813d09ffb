use std::collections::HashSet;

pub fn word_count(query: &str) -> usize {
	query.split_whitespace().count()
}

/// Lowercased alphanumeric words, with every other character treated as a separator.
pub fn tokenize_words(text: &str) -> Vec<String> {
	let mut normalized = String::with_capacity(text.len());

	for ch in text.chars() {
		if ch.is_alphanumeric() {
			normalized.extend(ch.to_lowercase());
		} else {
			normalized.push(' ');
		}
	}

	normalized.split_whitespace().map(str::to_string).collect()
}

/// Whether the query uses a word whose meaning depends on earlier turns.
///
/// `terms` are expected to be lowercased already, which config loading guarantees.
pub fn contains_referential_term(query: &str, terms: &[String]) -> bool {
	if terms.is_empty() {
		return false;
	}

	let terms: HashSet<&str> = terms.iter().map(String::as_str).collect();

	tokenize_words(query).iter().any(|word| terms.contains(word.as_str()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn referential_terms_match_whole_words_only() {
		let terms = vec!["itu".to_string(), "it".to_string()];

		assert!(contains_referential_term("Berapa biaya itu?", &terms));
		assert!(contains_referential_term("is IT open", &terms));
		assert!(!contains_referential_term("situs kampus", &terms));
		assert!(!contains_referential_term("item list", &terms));
	}

	#[test]
	fn word_count_ignores_extra_whitespace() {
		assert_eq!(word_count("  dimana   lokasi kampus "), 3);
		assert_eq!(word_count(""), 0);
	}
}
