use futures::future;
use serde::{Deserialize, Serialize};

use crate::{Error, RagService, Result, ScoredDocument, UniqueDocument, dedup};
use rag_domain::conversation::ConversationTurn;

/// One store match, tagged with the candidate query that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
	pub document_id: String,
	pub text: String,
	pub title: String,
	pub source: String,
	pub category: String,
	pub score: f32,
	pub origin_query: String,
}
impl SearchHit {
	pub fn from_scored(doc: ScoredDocument, origin_query: &str) -> Self {
		Self {
			document_id: doc.id,
			text: doc.payload.text,
			title: doc.payload.title,
			source: doc.payload.source,
			category: doc.payload.category,
			score: doc.score,
			origin_query: origin_query.to_string(),
		}
	}
}

impl RagService {
	/// Searches every candidate query concurrently and merges the survivors.
	///
	/// Failed sub-searches are logged and skipped. When all of them fail the result is empty.
	pub async fn search_relevant_docs(
		&self,
		user_query: &str,
		history: &[ConversationTurn],
	) -> Vec<UniqueDocument> {
		self.ensure_collection_ready().await;

		let candidates = self.generate_search_queries(user_query, history).await;
		let sub_searches = candidates.iter().map(|candidate| self.run_sub_search(&candidate.text));
		let settled = future::join_all(sub_searches).await;
		let mut hits = Vec::new();
		let mut failed = 0_usize;

		for (candidate, result) in candidates.iter().zip(settled) {
			match result {
				Ok(mut found) => {
					tracing::debug!(
						query = %candidate.text,
						origin = ?candidate.origin,
						hits = found.len(),
						"Sub-search finished."
					);

					hits.append(&mut found);
				},
				Err(err) => {
					failed += 1;

					tracing::warn!(
						error = %err,
						query = %candidate.text,
						origin = ?candidate.origin,
						"Sub-search failed; continuing with remaining queries."
					);
				},
			}
		}

		if failed == candidates.len() {
			tracing::warn!(
				queries = candidates.len(),
				"Every sub-search failed; no documents found."
			);

			return Vec::new();
		}

		let retrieval = &self.cfg.retrieval;
		let docs = dedup::deduplicate(
			hits,
			retrieval.identity_prefix_chars as usize,
			retrieval.max_unique_docs as usize,
		);

		tracing::info!(
			queries = candidates.len(),
			failed,
			unique_docs = docs.len(),
			"Retrieval finished."
		);

		docs
	}

	async fn run_sub_search(&self, query: &str) -> Result<Vec<SearchHit>> {
		let vector = self.embed_single_query(query).await?;
		let retrieval = &self.cfg.retrieval;
		let docs =
			self.index.search(vector, retrieval.top_k.into(), retrieval.score_threshold).await?;

		Ok(docs.into_iter().map(|doc| SearchHit::from_scored(doc, query)).collect())
	}

	async fn embed_single_query(&self, query: &str) -> Result<Vec<f32>> {
		let embeddings = self
			.providers
			.embedding
			.embed(&self.cfg.providers.embedding, std::slice::from_ref(&query.to_string()))
			.await?;
		let query_vec = embeddings.into_iter().next().ok_or_else(|| Error::Provider {
			message: "Embedding provider returned no vectors.".to_string(),
		})?;

		if query_vec.len() != self.cfg.storage.qdrant.vector_dim as usize {
			return Err(Error::Provider {
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}

		Ok(query_vec)
	}
}
