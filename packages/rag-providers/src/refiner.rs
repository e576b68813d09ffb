use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};
use rag_config::LlmProviderConfig;
use rag_domain::conversation::ConversationTurn;

const SYSTEM_PROMPT: &str = "You rewrite questions for a campus knowledge-base search engine. \
Output must be valid JSON only and must match the provided schema exactly. \
Resolve pronouns and ellipsis using the recent conversation so every query stands on its own. \
Keep the user's language. Do not add explanations or extra fields.";

/// Asks the model for standalone search queries. The caller decides how long to wait.
pub async fn refine(
	client: &Client,
	cfg: &LlmProviderConfig,
	query: &str,
	recent_history: &[ConversationTurn],
	max_queries: u32,
) -> Result<Vec<String>> {
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"response_format": { "type": "json_object" },
		"messages": build_refine_messages(query, recent_history, max_queries),
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_refine_response(&json)
}

pub fn build_refine_messages(
	query: &str,
	recent_history: &[ConversationTurn],
	max_queries: u32,
) -> Vec<Value> {
	let mut transcript = String::new();

	for turn in recent_history {
		transcript.push_str(turn.role.as_str());
		transcript.push_str(": ");
		transcript.push_str(turn.content.trim());
		transcript.push('\n');
	}

	if transcript.is_empty() {
		transcript.push_str("(none)\n");
	}

	let user_prompt = format!(
		"Return JSON matching this exact schema:\n{{\"queries\": [\"string\"]}}\n\
Constraints:\n- MAX_QUERIES = {max_queries}\n\
Recent conversation:\n{transcript}\
Question:\n{query}"
	);

	vec![
		serde_json::json!({ "role": "system", "content": SYSTEM_PROMPT }),
		serde_json::json!({ "role": "user", "content": user_prompt }),
	]
}

fn parse_refine_response(json: &Value) -> Result<Vec<String>> {
	let content = crate::first_choice_content(json).ok_or_else(|| Error::InvalidResponse {
		message: "Refiner response is missing message content.".to_string(),
	})?;
	let parsed: Value = serde_json::from_str(content.trim()).map_err(|_| {
		Error::InvalidResponse { message: "Refiner content is not valid JSON.".to_string() }
	})?;
	let items = parsed
		.get("queries")
		.and_then(|v| v.as_array())
		.or_else(|| parsed.as_array())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Refiner content is missing a queries array.".to_string(),
		})?;

	Ok(items.iter().filter_map(|item| item.as_str()).map(str::to_string).collect())
}
