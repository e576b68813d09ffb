use axum::{
	Json, Router,
	extract::State,
	http::{HeaderMap, StatusCode},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use crate::state::AppState;
use rag_service::{AnswerRequest, AnswerResponse};

pub const USER_HEADER: &str = "x-user-id";
pub const ANONYMOUS_USER: &str = "anonymous";

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/answer", post(answer))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn answer(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
	let user = quota_key(&headers);

	if !state.quota.check(&user).await {
		tracing::info!(user = %user, "Quota exhausted.");

		return Err(ApiError::new(
			StatusCode::TOO_MANY_REQUESTS,
			"quota_exhausted",
			"Request quota exhausted. Please try again later.",
		));
	}

	let response = state.service.answer(payload).await;

	state.quota.consume(&user, &response.usage).await;

	Ok(Json(response))
}

fn quota_key(headers: &HeaderMap) -> String {
	headers
		.get(USER_HEADER)
		.and_then(|value| value.to_str().ok())
		.map(str::trim)
		.filter(|value| !value.is_empty())
		.unwrap_or(ANONYMOUS_USER)
		.to_string()
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
