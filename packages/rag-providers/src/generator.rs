use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};
use rag_config::{Answer, LlmProviderConfig};
use rag_domain::{conversation::ConversationTurn, usage::Usage};

#[derive(Debug, Clone)]
pub struct GenerationRequest<'a> {
	pub message: &'a str,
	pub history: &'a [ConversationTurn],
	pub context: &'a str,
	/// Set when `context` carries evidence the answer must be grounded in.
	pub force_context_usage: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
	pub content: String,
	pub usage: Usage,
}

pub async fn generate(
	client: &Client,
	cfg: &LlmProviderConfig,
	prompts: &Answer,
	request: &GenerationRequest<'_>,
) -> Result<Generation> {
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let mut body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": build_generation_messages(prompts, request),
	});

	if let Some(max_tokens) = cfg.max_tokens {
		body["max_tokens"] = Value::from(max_tokens);
	}

	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_generation_response(&json)
}

pub fn build_generation_messages(prompts: &Answer, request: &GenerationRequest<'_>) -> Vec<Value> {
	let system = if request.force_context_usage {
		format!("{}\n\nKonteks:\n{}", prompts.system_prompt.trim(), request.context)
	} else {
		prompts.no_context_prompt.trim().to_string()
	};
	let mut messages = Vec::with_capacity(request.history.len() + 2);

	messages.push(serde_json::json!({ "role": "system", "content": system }));

	for turn in request.history {
		messages.push(serde_json::json!({ "role": turn.role.as_str(), "content": turn.content }));
	}

	messages.push(serde_json::json!({ "role": "user", "content": request.message }));

	messages
}

fn parse_generation_response(json: &Value) -> Result<Generation> {
	let content = crate::first_choice_content(json).ok_or_else(|| Error::InvalidResponse {
		message: "Generator response is missing message content.".to_string(),
	})?;
	let usage = json.get("usage").map(parse_usage).unwrap_or_default();

	Ok(Generation { content: content.trim().to_string(), usage })
}

fn parse_usage(value: &Value) -> Usage {
	let field = |key: &str| value.get(key).and_then(|v| v.as_u64()).unwrap_or(0);
	let prompt_tokens = field("prompt_tokens");
	let completion_tokens = field("completion_tokens");
	let total_tokens = match field("total_tokens") {
		0 => prompt_tokens + completion_tokens,
		total => total,
	};

	Usage { prompt_tokens, completion_tokens, total_tokens }
}
