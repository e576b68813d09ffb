use std::{collections::HashSet, time::Duration};

use serde::{Deserialize, Serialize};

use crate::RagService;
use rag_config::Planner;
use rag_domain::{
	conversation::{self, ConversationTurn},
	intent,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryOrigin {
	Original,
	RuleExpanded,
	Refined,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateQuery {
	pub text: String,
	pub origin: QueryOrigin,
}

impl RagService {
	/// Expands `user_query` into search queries. The original always comes first.
	pub async fn generate_search_queries(
		&self,
		user_query: &str,
		history: &[ConversationTurn],
	) -> Vec<CandidateQuery> {
		let planner = &self.cfg.planner;
		let max_queries = planner.max_queries.max(1) as usize;
		let mut out = Vec::with_capacity(max_queries);
		let mut seen = HashSet::new();

		seen.insert(user_query.to_string());
		out.push(CandidateQuery { text: user_query.to_string(), origin: QueryOrigin::Original });

		for rule in self.rules().matching(user_query) {
			let origin = QueryOrigin::RuleExpanded;

			if push_candidate(&mut out, &mut seen, &rule.expansion, origin, max_queries) {
				tracing::debug!(rule = %rule.name, "Expansion rule matched.");
			}
		}

		if !should_refine(user_query, history, planner) {
			return out;
		}
		if out.len() >= max_queries {
			tracing::debug!("Candidate list already full; skipping query refinement.");

			return out;
		}

		for refined in self.refine_queries(user_query, history).await {
			push_candidate(&mut out, &mut seen, &refined, QueryOrigin::Refined, max_queries);
		}

		out
	}

	/// Refined queries, or nothing when the refiner fails or misses its deadline.
	async fn refine_queries(&self, query: &str, history: &[ConversationTurn]) -> Vec<String> {
		let planner = &self.cfg.planner;
		let recent = conversation::recent_turns(history, planner.refine_history_turns as usize);
		let refine = self.providers.refiner.refine(
			&self.cfg.providers.query_refiner,
			query,
			recent,
			planner.max_queries,
		);

		// The refiner future is dropped on timeout; a late answer is discarded with it.
		match tokio::time::timeout(Duration::from_millis(planner.refine_timeout_ms), refine).await {
			Ok(Ok(queries)) => queries,
			Ok(Err(err)) => {
				tracing::warn!(error = %err, "Query refinement failed; using existing candidates.");

				Vec::new()
			},
			Err(_) => {
				tracing::warn!(
					timeout_ms = planner.refine_timeout_ms,
					"Query refinement timed out; using existing candidates."
				);

				Vec::new()
			},
		}
	}
}

/// Whether a query is worth the refiner round trip.
pub fn should_refine(query: &str, history: &[ConversationTurn], planner: &Planner) -> bool {
	if !planner.refine_enabled {
		return false;
	}

	intent::word_count(query) > planner.refine_min_words as usize
		|| !history.is_empty()
		|| intent::contains_referential_term(query, &planner.referential_terms)
}

fn push_candidate(
	out: &mut Vec<CandidateQuery>,
	seen: &mut HashSet<String>,
	value: &str,
	origin: QueryOrigin,
	max_queries: usize,
) -> bool {
	if out.len() >= max_queries {
		return false;
	}

	let trimmed = value.trim();

	if trimmed.is_empty() || !seen.insert(trimmed.to_string()) {
		return false;
	}

	out.push(CandidateQuery { text: trimmed.to_string(), origin });

	true
}
