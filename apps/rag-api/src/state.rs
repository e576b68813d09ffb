use std::sync::Arc;

use crate::quota::{self, QuotaGate};
use rag_service::RagService;
use rag_storage::qdrant::QdrantStore;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<RagService>,
	pub quota: Arc<dyn QuotaGate>,
}
impl AppState {
	pub async fn new(config: rag_config::Config) -> color_eyre::Result<Self> {
		let qdrant = QdrantStore::new(&config.storage.qdrant)?;
		let quota = quota::from_config(&config.quota);
		let service = RagService::new(config, qdrant)?;

		// A failed bootstrap is retried on the first request.
		service.bootstrap().await;

		Ok(Self::from_parts(Arc::new(service), quota))
	}

	pub fn from_parts(service: Arc<RagService>, quota: Arc<dyn QuotaGate>) -> Self {
		Self { service, quota }
	}
}
