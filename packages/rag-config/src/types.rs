use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub retrieval: Retrieval,
	#[serde(default)]
	pub planner: Planner,
	#[serde(default)]
	pub answer: Answer,
	#[serde(default)]
	pub quota: Quota,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub qdrant: Qdrant,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
	/// One of cosine, dot, euclid, or manhattan.
	#[serde(default = "default_distance")]
	pub distance: String,
	#[serde(default)]
	pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub query_refiner: LlmProviderConfig,
	pub generator: LlmProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	#[serde(default)]
	pub max_tokens: Option<u32>,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Retrieval {
	/// Nearest neighbors requested per candidate query.
	pub top_k: u32,
	/// Minimum similarity a hit must reach to be returned by the store.
	pub score_threshold: f32,
	pub max_unique_docs: u32,
	pub max_context_chars: u32,
	/// Normalized characters hashed into a document's identity key.
	pub identity_prefix_chars: u32,
}
impl Default for Retrieval {
	fn default() -> Self {
		Self {
			top_k: 3,
			score_threshold: 0.30,
			max_unique_docs: 5,
			max_context_chars: 2_500,
			identity_prefix_chars: 200,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Planner {
	pub max_queries: u32,
	pub refine_enabled: bool,
	/// Queries with more words than this are sent to the refiner.
	pub refine_min_words: u32,
	pub refine_timeout_ms: u64,
	pub refine_history_turns: u32,
	pub referential_terms: Vec<String>,
	pub rules: Vec<ExpansionRule>,
}
impl Default for Planner {
	fn default() -> Self {
		Self {
			max_queries: 4,
			refine_enabled: true,
			refine_min_words: 5,
			refine_timeout_ms: 3_000,
			refine_history_turns: 2,
			referential_terms: [
				"itu", "tersebut", "ini", "dia", "mereka", "nya", "it", "that", "this", "they",
				"those", "them",
			]
			.into_iter()
			.map(str::to_string)
			.collect(),
			rules: default_rules(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExpansionRule {
	pub name: String,
	/// The rule fires when at least one of these keywords occurs in the query.
	#[serde(default)]
	pub any: Vec<String>,
	/// Every keyword here must also occur in the query.
	#[serde(default)]
	pub all: Vec<String>,
	pub expansion: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Answer {
	/// Messages shorter than this, sent without history, get the greeting.
	pub fast_path_max_chars: u32,
	pub greeting: String,
	pub apology: String,
	pub system_prompt: String,
	pub no_context_prompt: String,
}
impl Default for Answer {
	fn default() -> Self {
		Self {
			fast_path_max_chars: 5,
			greeting: "Halo! Saya asisten akademik STMIK Tazkia. Ada yang bisa saya bantu?"
				.to_string(),
			apology: "Maaf, layanan sedang tidak tersedia untuk sementara. Silakan coba lagi nanti."
				.to_string(),
			system_prompt: "Kamu adalah asisten akademik STMIK Tazkia. Jawab pertanyaan pengguna \
hanya berdasarkan konteks yang diberikan. Sebutkan sumbernya bila relevan dan jangan menambahkan \
informasi yang tidak ada di konteks."
				.to_string(),
			no_context_prompt: "Kamu adalah asisten akademik STMIK Tazkia. Tidak ada dokumen yang \
relevan untuk pertanyaan ini. Sampaikan dengan sopan bahwa informasinya belum tersedia dan \
jangan mengarang jawaban."
				.to_string(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Quota {
	pub enabled: bool,
	pub max_requests: u32,
	pub window_secs: u64,
}
impl Default for Quota {
	fn default() -> Self {
		Self { enabled: false, max_requests: 30, window_secs: 3_600 }
	}
}

pub fn default_rules() -> Vec<ExpansionRule> {
	fn rule(name: &str, any: &[&str], all: &[&str], expansion: &str) -> ExpansionRule {
		ExpansionRule {
			name: name.to_string(),
			any: any.iter().map(|s| s.to_string()).collect(),
			all: all.iter().map(|s| s.to_string()).collect(),
			expansion: expansion.to_string(),
		}
	}

	vec![
		rule(
			"location",
			&["lokasi", "alamat", "dimana", "di mana", "letak"],
			&[],
			"alamat dan lokasi kampus STMIK Tazkia",
		),
		rule(
			"program",
			&["jurusan", "prodi", "program studi"],
			&[],
			"daftar program studi dan jurusan di STMIK Tazkia",
		),
		rule(
			"admission",
			&["pendaftaran", "pmb", "mendaftar"],
			&[],
			"jadwal dan syarat pendaftaran mahasiswa baru STMIK Tazkia",
		),
		rule("tuition", &["biaya", "ukt", "spp"], &[], "rincian biaya kuliah STMIK Tazkia"),
		rule("scholarship", &[], &["beasiswa", "syarat"], "persyaratan beasiswa STMIK Tazkia"),
	]
}

fn default_distance() -> String {
	"cosine".to_string()
}
