use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serde::{Deserialize, Serialize};

use crate::{GenerationRequest, RagService, Result, context};
use rag_domain::{conversation::ConversationTurn, usage::Usage};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRequest {
	pub message: String,
	#[serde(default)]
	pub history: Vec<ConversationTurn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocDetail {
	pub title: String,
	pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResponse {
	pub answer: String,
	pub usage: Usage,
	pub docs_found: usize,
	pub docs_detail: Vec<DocDetail>,
}
impl AnswerResponse {
	fn canned(answer: &str) -> Self {
		Self {
			answer: answer.to_string(),
			usage: Usage::default(),
			docs_found: 0,
			docs_detail: Vec::new(),
		}
	}
}

impl RagService {
	pub async fn answer(&self, req: AnswerRequest) -> AnswerResponse {
		self.answer_question(&req.message, &req.history).await
	}

	/// Answers one user message. Never fails: any error or panic past the fast path becomes
	/// the configured apology with zero usage.
	pub async fn answer_question(
		&self,
		message: &str,
		history: &[ConversationTurn],
	) -> AnswerResponse {
		let answer_cfg = &self.cfg.answer;

		if is_trivial_message(message, history, answer_cfg.fast_path_max_chars as usize) {
			tracing::info!("Trivial message; answering with the greeting.");

			return AnswerResponse::canned(&answer_cfg.greeting);
		}

		let outcome =
			AssertUnwindSafe(self.retrieve_and_generate(message, history)).catch_unwind().await;

		match outcome {
			Ok(Ok(response)) => response,
			Ok(Err(err)) => {
				tracing::error!(error = %err, "Answer pipeline failed; returning apology.");

				AnswerResponse::canned(&answer_cfg.apology)
			},
			Err(_) => {
				tracing::error!("Answer pipeline panicked; returning apology.");

				AnswerResponse::canned(&answer_cfg.apology)
			},
		}
	}

	async fn retrieve_and_generate(
		&self,
		message: &str,
		history: &[ConversationTurn],
	) -> Result<AnswerResponse> {
		let docs = self.search_relevant_docs(message, history).await;
		let context =
			context::compile_context(&docs, self.cfg.retrieval.max_context_chars as usize);
		let request = GenerationRequest {
			message,
			history,
			context: &context,
			force_context_usage: !context.is_empty(),
		};
		let generation = self
			.providers
			.generator
			.generate(&self.cfg.providers.generator, &self.cfg.answer, &request)
			.await?;

		tracing::info!(
			docs_found = docs.len(),
			context_chars = context.chars().count(),
			total_tokens = generation.usage.total_tokens,
			"Answer generated."
		);

		Ok(AnswerResponse {
			answer: generation.content,
			usage: generation.usage,
			docs_found: docs.len(),
			docs_detail: docs
				.iter()
				.map(|doc| DocDetail {
					title: doc.display_title().to_string(),
					score: doc.hit.score,
				})
				.collect(),
		})
	}
}

/// Very short openers with no prior conversation skip retrieval entirely.
pub fn is_trivial_message(message: &str, history: &[ConversationTurn], max_chars: usize) -> bool {
	history.is_empty() && message.trim().chars().count() < max_chars
}
