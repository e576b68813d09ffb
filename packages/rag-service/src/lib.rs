pub mod answer;
pub mod context;
pub mod dedup;
pub mod planner;
pub mod search;

mod error;

pub use answer::{AnswerRequest, AnswerResponse, DocDetail};
pub use dedup::UniqueDocument;
pub use error::{Error, Result};
pub use planner::{CandidateQuery, QueryOrigin};
pub use rag_domain::{conversation::ConversationTurn, usage::Usage};
pub use rag_providers::generator::{Generation, GenerationRequest};
pub use rag_storage::models::{DocumentPayload, DocumentPoint, ScoredDocument};
pub use search::SearchHit;

use std::{future::Future, pin::Pin, sync::Arc};

use tokio::sync::OnceCell;

use rag_config::{Answer, Config, EmbeddingProviderConfig, LlmProviderConfig};
use rag_domain::rules::ExpansionRules;
use rag_providers::{embedding, generator, refiner};
use rag_storage::qdrant::QdrantStore;
use reqwest::Client;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;
}

pub trait QueryRefiner
where
	Self: Send + Sync,
{
	fn refine<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		query: &'a str,
		recent_history: &'a [ConversationTurn],
		max_queries: u32,
	) -> BoxFuture<'a, Result<Vec<String>>>;
}

pub trait AnswerGenerator
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		prompts: &'a Answer,
		request: &'a GenerationRequest<'a>,
	) -> BoxFuture<'a, Result<Generation>>;
}

/// The nearest-neighbor store the pipeline searches.
pub trait VectorIndex
where
	Self: Send + Sync,
{
	/// Idempotent. Resolves to `true` when this call created the collection.
	fn ensure_collection(&self) -> BoxFuture<'_, Result<bool>>;

	fn search(
		&self,
		vector: Vec<f32>,
		limit: u64,
		score_threshold: f32,
	) -> BoxFuture<'_, Result<Vec<ScoredDocument>>>;

	fn upsert(&self, points: Vec<DocumentPoint>) -> BoxFuture<'_, Result<()>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub refiner: Arc<dyn QueryRefiner>,
	pub generator: Arc<dyn AnswerGenerator>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		refiner: Arc<dyn QueryRefiner>,
		generator: Arc<dyn AnswerGenerator>,
	) -> Self {
		Self { embedding, refiner, generator }
	}

	/// HTTP-backed providers with one pooled client per configured endpoint.
	pub fn from_config(cfg: &rag_config::Providers) -> Result<Self> {
		let provider = Arc::new(DefaultProviders::new(cfg)?);

		Ok(Self { embedding: provider.clone(), refiner: provider.clone(), generator: provider })
	}
}

pub struct RagService {
	pub cfg: Config,
	pub index: Arc<dyn VectorIndex>,
	pub providers: Providers,
	rules: ExpansionRules,
	collection_ready: OnceCell<()>,
}
impl RagService {
	pub fn new(cfg: Config, qdrant: QdrantStore) -> Result<Self> {
		let providers = Providers::from_config(&cfg.providers)?;

		Ok(Self::with_providers(cfg, Arc::new(qdrant), providers))
	}

	pub fn with_providers(cfg: Config, index: Arc<dyn VectorIndex>, providers: Providers) -> Self {
		let rules = ExpansionRules::compile(&cfg.planner.rules);

		tracing::debug!(rules = rules.len(), "Compiled query expansion rules.");

		Self { cfg, index, providers, rules, collection_ready: OnceCell::new() }
	}

	pub fn rules(&self) -> &ExpansionRules {
		&self.rules
	}

	/// Makes sure the collection exists before the first request arrives.
	pub async fn bootstrap(&self) -> bool {
		self.ensure_collection_ready().await
	}

	/// Runs `ensure_collection` until it succeeds once. Failures are logged and retried on the
	/// next call.
	pub(crate) async fn ensure_collection_ready(&self) -> bool {
		let result = self
			.collection_ready
			.get_or_try_init(|| async {
				let created = self.index.ensure_collection().await?;

				tracing::info!(
					collection = %self.cfg.storage.qdrant.collection,
					created,
					"Vector collection is ready."
				);

				Ok::<(), Error>(())
			})
			.await;

		match result {
			Ok(_) => true,
			Err(err) => {
				tracing::warn!(
					error = %err,
					collection = %self.cfg.storage.qdrant.collection,
					"Vector collection bootstrap failed; searching anyway."
				);

				false
			},
		}
	}
}

struct DefaultProviders {
	embedding: Client,
	refiner: Client,
	generator: Client,
}
impl DefaultProviders {
	fn new(cfg: &rag_config::Providers) -> Result<Self> {
		Ok(Self {
			embedding: rag_providers::http_client(cfg.embedding.timeout_ms)?,
			refiner: rag_providers::http_client(cfg.query_refiner.timeout_ms)?,
			generator: rag_providers::http_client(cfg.generator.timeout_ms)?,
		})
	}
}
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(embedding::embed(&self.embedding, cfg, texts).await?) })
	}
}
impl QueryRefiner for DefaultProviders {
	fn refine<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		query: &'a str,
		recent_history: &'a [ConversationTurn],
		max_queries: u32,
	) -> BoxFuture<'a, Result<Vec<String>>> {
		Box::pin(async move {
			Ok(refiner::refine(&self.refiner, cfg, query, recent_history, max_queries).await?)
		})
	}
}
impl AnswerGenerator for DefaultProviders {
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		prompts: &'a Answer,
		request: &'a GenerationRequest<'a>,
	) -> BoxFuture<'a, Result<Generation>> {
		Box::pin(async move {
			Ok(generator::generate(&self.generator, cfg, prompts, request).await?)
		})
	}
}

impl VectorIndex for QdrantStore {
	fn ensure_collection(&self) -> BoxFuture<'_, Result<bool>> {
		Box::pin(async move { Ok(QdrantStore::ensure_collection(self).await?) })
	}

	fn search(
		&self,
		vector: Vec<f32>,
		limit: u64,
		score_threshold: f32,
	) -> BoxFuture<'_, Result<Vec<ScoredDocument>>> {
		Box::pin(async move {
			Ok(QdrantStore::search(self, vector, limit, score_threshold).await?)
		})
	}

	fn upsert(&self, points: Vec<DocumentPoint>) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move { Ok(QdrantStore::upsert(self, points).await?) })
	}
}
