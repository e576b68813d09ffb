pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Qdrant error: {message}")]
	Qdrant { message: String },
}
impl From<rag_providers::Error> for Error {
	fn from(err: rag_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<rag_storage::Error> for Error {
	fn from(err: rag_storage::Error) -> Self {
		match err {
			rag_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			rag_storage::Error::Qdrant(inner) => Self::Qdrant { message: inner.to_string() },
		}
	}
}
