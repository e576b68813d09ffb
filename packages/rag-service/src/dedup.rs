use std::{cmp::Ordering, collections::HashMap};

use serde::{Deserialize, Serialize};

use crate::SearchHit;
use rag_domain::identity;

/// A hit that won its identity slot. `identity` is the content key shared by all duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniqueDocument {
	pub identity: String,
	pub hit: SearchHit,
}
impl UniqueDocument {
	/// Label shown to readers. Untitled passages fall back to their source, then `Dokumen`.
	pub fn display_title(&self) -> &str {
		match (self.hit.title.trim(), self.hit.source.trim()) {
			("", "") => "Dokumen",
			("", source) => source,
			(title, _) => title,
		}
	}
}

/// Collapses hits that share normalized content, keeping the best score, then ranks them.
///
/// A later duplicate replaces the earlier one only when it scores strictly higher, and it
/// takes over the earlier one's position so ties in the final sort stay first-seen.
pub fn deduplicate(
	hits: Vec<SearchHit>,
	prefix_chars: usize,
	max_docs: usize,
) -> Vec<UniqueDocument> {
	let mut out: Vec<UniqueDocument> = Vec::with_capacity(hits.len());
	let mut by_identity: HashMap<String, usize> = HashMap::new();

	for hit in hits {
		let key = identity::content_identity(&hit.text, prefix_chars);

		match by_identity.get(&key) {
			Some(&idx) =>
				if hit.score > out[idx].hit.score {
					out[idx].hit = hit;
				},
			None => {
				by_identity.insert(key.clone(), out.len());
				out.push(UniqueDocument { identity: key, hit });
			},
		}
	}

	// `sort_by` is stable.
	out.sort_by(|left, right| cmp_f32_desc(left.hit.score, right.hit.score));
	out.truncate(max_docs);

	out
}

pub fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn hit(id: &str, text: &str, score: f32, origin: &str) -> SearchHit {
		SearchHit {
			document_id: id.to_string(),
			text: text.to_string(),
			title: format!("Doc {id}"),
			source: format!("{id}.pdf"),
			category: "umum".to_string(),
			score,
			origin_query: origin.to_string(),
		}
	}

	#[test]
	fn colliding_hits_keep_the_higher_score() {
		let docs = deduplicate(
			vec![
				hit("a", "Kampus STMIK Tazkia di Bogor.", 0.76, "q1"),
				hit("b", "kampus stmik tazkia di bogor", 0.81, "q2"),
			],
			200,
			5,
		);

		assert_eq!(docs.len(), 1);
		assert_eq!(docs[0].hit.score, 0.81);
		assert_eq!(docs[0].hit.origin_query, "q2");
	}

	#[test]
	fn ties_keep_the_first_seen_hit() {
		let docs = deduplicate(
			vec![hit("a", "same text", 0.5, "q1"), hit("b", "Same text!", 0.5, "q2")],
			200,
			5,
		);

		assert_eq!(docs.len(), 1);
		assert_eq!(docs[0].hit.document_id, "a");
	}

	#[test]
	fn resubmitting_the_same_set_is_stable() {
		let hits = vec![hit("a", "alpha", 0.4, "q1"), hit("b", "beta", 0.9, "q1")];
		let mut doubled = hits.clone();

		doubled.extend(hits.clone());

		assert_eq!(deduplicate(hits, 200, 5), deduplicate(doubled, 200, 5));
	}

	#[test]
	fn sorts_by_score_and_caps() {
		let hits = (0..8)
			.map(|i| hit(&i.to_string(), &format!("passage {i}"), 0.3 + i as f32 * 0.05, "q"))
			.collect();
		let docs = deduplicate(hits, 200, 5);
		let ids: Vec<&str> = docs.iter().map(|doc| doc.hit.document_id.as_str()).collect();

		assert_eq!(ids, vec!["7", "6", "5", "4", "3"]);
	}

	#[test]
	fn equal_scores_keep_input_order() {
		let docs = deduplicate(
			vec![hit("x", "one", 0.6, "q"), hit("y", "two", 0.6, "q"), hit("z", "three", 0.7, "q")],
			200,
			5,
		);
		let ids: Vec<&str> = docs.iter().map(|doc| doc.hit.document_id.as_str()).collect();

		assert_eq!(ids, vec!["z", "x", "y"]);
	}

	#[test]
	fn nan_scores_sort_last() {
		let docs =
			deduplicate(vec![hit("n", "nan", f32::NAN, "q"), hit("r", "real", 0.1, "q")], 200, 5);

		assert_eq!(docs[0].hit.document_id, "r");
	}

	#[test]
	fn display_title_falls_back_to_source_then_placeholder() {
		let mut doc = UniqueDocument {
			identity: "k".to_string(),
			hit: hit("a", "isi", 0.5, "q"),
		};

		assert_eq!(doc.display_title(), "Doc a");

		doc.hit.title = "  ".to_string();
		assert_eq!(doc.display_title(), "a.pdf");

		doc.hit.source = String::new();
		assert_eq!(doc.display_title(), "Dokumen");
	}
}
