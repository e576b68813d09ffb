mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Answer, Config, EmbeddingProviderConfig, ExpansionRule, LlmProviderConfig, Planner, Providers,
	Qdrant, Quota, Retrieval, Service, Storage, default_rules,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.collection.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.collection must be non-empty.".to_string(),
		});
	}
	if !matches!(cfg.storage.qdrant.distance.as_str(), "cosine" | "dot" | "euclid" | "manhattan")
	{
		return Err(Error::Validation {
			message: "storage.qdrant.distance must be one of cosine, dot, euclid, or manhattan."
				.to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}

	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("query_refiner", &cfg.providers.query_refiner.api_key),
		("generator", &cfg.providers.generator.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	validate_retrieval(cfg)?;
	validate_planner(cfg)?;

	if cfg.answer.greeting.trim().is_empty() {
		return Err(Error::Validation { message: "answer.greeting must be non-empty.".to_string() });
	}
	if cfg.answer.apology.trim().is_empty() {
		return Err(Error::Validation { message: "answer.apology must be non-empty.".to_string() });
	}
	if cfg.quota.enabled {
		if cfg.quota.max_requests == 0 {
			return Err(Error::Validation {
				message: "quota.max_requests must be greater than zero when enabled.".to_string(),
			});
		}
		if cfg.quota.window_secs == 0 {
			return Err(Error::Validation {
				message: "quota.window_secs must be greater than zero when enabled.".to_string(),
			});
		}
	}

	Ok(())
}

fn validate_retrieval(cfg: &Config) -> Result<()> {
	let retrieval = &cfg.retrieval;

	if retrieval.top_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.top_k must be greater than zero.".to_string(),
		});
	}
	if !retrieval.score_threshold.is_finite() {
		return Err(Error::Validation {
			message: "retrieval.score_threshold must be a finite number.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&retrieval.score_threshold) {
		return Err(Error::Validation {
			message: "retrieval.score_threshold must be in the range 0.0-1.0.".to_string(),
		});
	}
	if retrieval.max_unique_docs == 0 {
		return Err(Error::Validation {
			message: "retrieval.max_unique_docs must be greater than zero.".to_string(),
		});
	}
	if retrieval.max_context_chars == 0 {
		return Err(Error::Validation {
			message: "retrieval.max_context_chars must be greater than zero.".to_string(),
		});
	}
	if retrieval.identity_prefix_chars == 0 {
		return Err(Error::Validation {
			message: "retrieval.identity_prefix_chars must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn validate_planner(cfg: &Config) -> Result<()> {
	let planner = &cfg.planner;

	if planner.max_queries == 0 {
		return Err(Error::Validation {
			message: "planner.max_queries must be greater than zero.".to_string(),
		});
	}
	if planner.refine_enabled && planner.refine_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "planner.refine_timeout_ms must be greater than zero.".to_string(),
		});
	}

	for rule in &planner.rules {
		if rule.name.trim().is_empty() {
			return Err(Error::Validation {
				message: "planner.rules.name must be non-empty.".to_string(),
			});
		}
		if rule.expansion.trim().is_empty() {
			return Err(Error::Validation {
				message: format!(
					"planner.rules.expansion must be non-empty for rule {}.",
					rule.name
				),
			});
		}
		if rule.any.is_empty() && rule.all.is_empty() {
			return Err(Error::Validation {
				message: format!(
					"planner.rules must define any or all keywords for rule {}.",
					rule.name
				),
			});
		}
		if rule.any.iter().chain(rule.all.iter()).any(|keyword| keyword.is_empty()) {
			return Err(Error::Validation {
				message: format!(
					"planner.rules keywords must be non-empty for rule {}.",
					rule.name
				),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.storage.qdrant.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
		cfg.storage.qdrant.api_key = None;
	}

	cfg.storage.qdrant.distance = cfg.storage.qdrant.distance.trim().to_lowercase();

	for term in &mut cfg.planner.referential_terms {
		*term = term.trim().to_lowercase();
	}

	cfg.planner.referential_terms.retain(|term| !term.is_empty());

	for rule in &mut cfg.planner.rules {
		for keyword in rule.any.iter_mut().chain(rule.all.iter_mut()) {
			*keyword = keyword.trim().to_lowercase();
		}
	}
}
