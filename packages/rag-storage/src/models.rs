use serde::{Deserialize, Serialize};

/// Fields stored alongside every indexed passage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentPayload {
	pub text: String,
	pub title: String,
	pub source: String,
	pub category: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
	pub id: String,
	pub score: f32,
	pub payload: DocumentPayload,
}

#[derive(Debug, Clone)]
pub struct DocumentPoint {
	/// UUID string or unsigned integer, as Qdrant accepts.
	pub id: String,
	pub vector: Vec<f32>,
	pub payload: DocumentPayload,
}
