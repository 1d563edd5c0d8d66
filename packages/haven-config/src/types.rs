use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub ranking: Ranking,
	#[serde(default)]
	pub ingest: Ingest,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub llm_extractor: LlmProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

/// Cascade tuning. The thresholds are deliberately ordinary config fields so
/// deployments can loosen or tighten the cascade without a rebuild.
#[derive(Debug, Deserialize)]
pub struct Search {
	#[serde(default = "default_limit")]
	pub default_limit: u32,
	#[serde(default = "default_max_limit")]
	pub max_limit: u32,
	/// Accumulated-result count below which the relaxed full-text stage runs.
	#[serde(default = "default_min_strong_matches")]
	pub min_strong_matches: u32,
	#[serde(default = "default_oversample_factor")]
	pub oversample_factor: u32,
	#[serde(default = "default_oversample_cap")]
	pub oversample_cap: u32,
	/// pg_trgm similarity floor for the fuzzy stage.
	#[serde(default = "default_fuzzy_similarity_threshold")]
	pub fuzzy_similarity_threshold: f32,
}

/// Scorer weights. The defaults are carried over from the reference
/// deployment as-is; compatibility matters more than their derivation.
#[derive(Debug, Deserialize)]
pub struct Ranking {
	#[serde(default = "default_text_rank_weight")]
	pub text_rank_weight: f32,
	#[serde(default = "default_similarity_weight")]
	pub similarity_weight: f32,
	#[serde(default = "default_recency_ceiling")]
	pub recency_ceiling: f32,
	#[serde(default = "default_recency_decay_days")]
	pub recency_decay_days: f32,
	#[serde(default = "default_city_bonus")]
	pub city_bonus: f32,
	#[serde(default = "default_county_bonus")]
	pub county_bonus: f32,
	#[serde(default = "default_state_bonus")]
	pub state_bonus: f32,
	#[serde(default = "default_population_bonus")]
	pub population_bonus: f32,
	#[serde(default = "default_need_text_bonus")]
	pub need_text_bonus: f32,
	#[serde(default = "default_need_requirement_bonus")]
	pub need_requirement_bonus: f32,
	#[serde(default = "default_localized_stage_bonus")]
	pub localized_stage_bonus: f32,
	#[serde(default = "default_relaxed_stage_bonus")]
	pub relaxed_stage_bonus: f32,
}

#[derive(Debug, Deserialize)]
pub struct Ingest {
	#[serde(default = "default_max_pdf_chars")]
	pub max_pdf_chars: u32,
	#[serde(default = "default_max_web_chars")]
	pub max_web_chars: u32,
}

impl Default for Search {
	fn default() -> Self {
		Self {
			default_limit: default_limit(),
			max_limit: default_max_limit(),
			min_strong_matches: default_min_strong_matches(),
			oversample_factor: default_oversample_factor(),
			oversample_cap: default_oversample_cap(),
			fuzzy_similarity_threshold: default_fuzzy_similarity_threshold(),
		}
	}
}

impl Default for Ranking {
	fn default() -> Self {
		Self {
			text_rank_weight: default_text_rank_weight(),
			similarity_weight: default_similarity_weight(),
			recency_ceiling: default_recency_ceiling(),
			recency_decay_days: default_recency_decay_days(),
			city_bonus: default_city_bonus(),
			county_bonus: default_county_bonus(),
			state_bonus: default_state_bonus(),
			population_bonus: default_population_bonus(),
			need_text_bonus: default_need_text_bonus(),
			need_requirement_bonus: default_need_requirement_bonus(),
			localized_stage_bonus: default_localized_stage_bonus(),
			relaxed_stage_bonus: default_relaxed_stage_bonus(),
		}
	}
}

impl Default for Ingest {
	fn default() -> Self {
		Self { max_pdf_chars: default_max_pdf_chars(), max_web_chars: default_max_web_chars() }
	}
}

fn default_limit() -> u32 {
	20
}

fn default_max_limit() -> u32 {
	50
}

fn default_min_strong_matches() -> u32 {
	5
}

fn default_oversample_factor() -> u32 {
	3
}

fn default_oversample_cap() -> u32 {
	60
}

fn default_fuzzy_similarity_threshold() -> f32 {
	0.2
}

fn default_text_rank_weight() -> f32 {
	2.0
}

fn default_similarity_weight() -> f32 {
	1.0
}

fn default_recency_ceiling() -> f32 {
	6.0
}

fn default_recency_decay_days() -> f32 {
	30.0
}

fn default_city_bonus() -> f32 {
	1.5
}

fn default_county_bonus() -> f32 {
	1.0
}

fn default_state_bonus() -> f32 {
	0.75
}

fn default_population_bonus() -> f32 {
	1.2
}

fn default_need_text_bonus() -> f32 {
	0.8
}

fn default_need_requirement_bonus() -> f32 {
	0.6
}

fn default_localized_stage_bonus() -> f32 {
	1.5
}

fn default_relaxed_stage_bonus() -> f32 {
	0.5
}

fn default_max_pdf_chars() -> u32 {
	50_000
}

fn default_max_web_chars() -> u32 {
	20_000
}
