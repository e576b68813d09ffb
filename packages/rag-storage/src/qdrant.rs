use std::collections::HashMap;

use qdrant_client::{
	Payload, Qdrant,
	qdrant::{
		CreateCollectionBuilder, Distance, PointId, PointStruct, ScoredPoint, SearchPointsBuilder,
		UpsertPointsBuilder, Value, VectorParamsBuilder, point_id::PointIdOptions, value::Kind,
	},
};

use crate::{
	Error, Result,
	models::{DocumentPayload, DocumentPoint, ScoredDocument},
};

pub const PAYLOAD_TEXT: &str = "text";
pub const PAYLOAD_TITLE: &str = "title";
pub const PAYLOAD_SOURCE: &str = "source";
pub const PAYLOAD_CATEGORY: &str = "category";

pub struct QdrantStore {
	pub client: Qdrant,
	pub collection: String,
	pub vector_dim: u32,
	pub distance: Distance,
}
impl QdrantStore {
	pub fn new(cfg: &rag_config::Qdrant) -> Result<Self> {
		let mut builder = Qdrant::from_url(&cfg.url);

		if let Some(api_key) = cfg.api_key.as_deref() {
			builder = builder.api_key(api_key);
		}

		let client = builder.build()?;

		Ok(Self {
			client,
			collection: cfg.collection.clone(),
			vector_dim: cfg.vector_dim,
			distance: parse_distance(&cfg.distance)?,
		})
	}

	/// Creates the collection when it is missing. Returns whether this call created it.
	pub async fn ensure_collection(&self) -> Result<bool> {
		if self.client.collection_exists(self.collection.clone()).await? {
			return Ok(false);
		}

		let builder = CreateCollectionBuilder::new(self.collection.clone())
			.vectors_config(VectorParamsBuilder::new(self.vector_dim.into(), self.distance));

		match self.client.create_collection(builder).await {
			Ok(_) => {
				tracing::info!(collection = %self.collection, "Created Qdrant collection.");

				Ok(true)
			},
			// Another process may have created it between the check and the create.
			Err(err) =>
				if self.client.collection_exists(self.collection.clone()).await? {
					Ok(false)
				} else {
					Err(err.into())
				},
		}
	}

	pub async fn search(
		&self,
		vector: Vec<f32>,
		limit: u64,
		score_threshold: f32,
	) -> Result<Vec<ScoredDocument>> {
		if vector.len() != self.vector_dim as usize {
			return Err(Error::InvalidArgument(format!(
				"Query vector has {} dimensions; collection expects {}.",
				vector.len(),
				self.vector_dim
			)));
		}

		let search = SearchPointsBuilder::new(self.collection.clone(), vector, limit)
			.score_threshold(score_threshold)
			.with_payload(true);
		let response = self.client.search_points(search).await?;

		Ok(response.result.into_iter().filter_map(scored_document).collect())
	}

	pub async fn upsert(&self, points: Vec<DocumentPoint>) -> Result<()> {
		if points.is_empty() {
			return Ok(());
		}

		let mut structs = Vec::with_capacity(points.len());

		for point in points {
			if point.vector.len() != self.vector_dim as usize {
				return Err(Error::InvalidArgument(format!(
					"Point {} has {} dimensions; collection expects {}.",
					point.id,
					point.vector.len(),
					self.vector_dim
				)));
			}

			let mut payload = Payload::new();

			payload.insert(PAYLOAD_TEXT, point.payload.text);
			payload.insert(PAYLOAD_TITLE, point.payload.title);
			payload.insert(PAYLOAD_SOURCE, point.payload.source);
			payload.insert(PAYLOAD_CATEGORY, point.payload.category);

			structs.push(PointStruct::new(parse_point_id(point.id), point.vector, payload));
		}

		self.client
			.upsert_points(UpsertPointsBuilder::new(self.collection.clone(), structs).wait(true))
			.await?;

		Ok(())
	}
}

pub fn parse_distance(raw: &str) -> Result<Distance> {
	match raw {
		"cosine" => Ok(Distance::Cosine),
		"dot" => Ok(Distance::Dot),
		"euclid" => Ok(Distance::Euclid),
		"manhattan" => Ok(Distance::Manhattan),
		other => Err(Error::InvalidArgument(format!("Unsupported distance metric {other:?}."))),
	}
}

fn parse_point_id(id: String) -> PointId {
	match id.parse::<u64>() {
		Ok(num) => PointId::from(num),
		Err(_) => PointId::from(id),
	}
}

fn scored_document(point: ScoredPoint) -> Option<ScoredDocument> {
	let id = point.id.as_ref().and_then(point_id_to_string);
	let Some(id) = id else {
		tracing::warn!("Scored point missing id.");

		return None;
	};
	let Some(text) = payload_string(&point.payload, PAYLOAD_TEXT) else {
		tracing::warn!(point_id = %id, "Scored point missing text payload.");

		return None;
	};
	let payload = DocumentPayload {
		text,
		title: payload_string(&point.payload, PAYLOAD_TITLE).unwrap_or_default(),
		source: payload_string(&point.payload, PAYLOAD_SOURCE).unwrap_or_default(),
		category: payload_string(&point.payload, PAYLOAD_CATEGORY).unwrap_or_default(),
	};

	Some(ScoredDocument { id, score: point.score, payload })
}

fn point_id_to_string(point_id: &PointId) -> Option<String> {
	match &point_id.point_id_options {
		Some(PointIdOptions::Uuid(id)) => Some(id.clone()),
		Some(PointIdOptions::Num(num)) => Some(num.to_string()),
		None => None,
	}
}

fn payload_string(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::StringValue(text)) => Some(text.to_string()),
		_ => None,
	}
}
