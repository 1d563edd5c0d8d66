mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Ingest, LlmProviderConfig, Postgres, Providers, Ranking, Search, Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.llm_extractor.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.llm_extractor.api_key must be non-empty.".to_string(),
		});
	}
	if cfg.providers.llm_extractor.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.llm_extractor.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_limit == 0 || cfg.search.max_limit > 50 {
		return Err(Error::Validation {
			message: "search.max_limit must be in the range 1-50.".to_string(),
		});
	}
	if cfg.search.default_limit == 0 || cfg.search.default_limit > cfg.search.max_limit {
		return Err(Error::Validation {
			message: "search.default_limit must be in the range 1-search.max_limit.".to_string(),
		});
	}
	if cfg.search.oversample_factor == 0 {
		return Err(Error::Validation {
			message: "search.oversample_factor must be greater than zero.".to_string(),
		});
	}
	if cfg.search.oversample_cap == 0 {
		return Err(Error::Validation {
			message: "search.oversample_cap must be greater than zero.".to_string(),
		});
	}
	if !cfg.search.fuzzy_similarity_threshold.is_finite()
		|| !(0.0..=1.0).contains(&cfg.search.fuzzy_similarity_threshold)
	{
		return Err(Error::Validation {
			message: "search.fuzzy_similarity_threshold must be in the range 0.0-1.0.".to_string(),
		});
	}
	if cfg.ranking.recency_decay_days <= 0.0 || !cfg.ranking.recency_decay_days.is_finite() {
		return Err(Error::Validation {
			message: "ranking.recency_decay_days must be a positive finite number.".to_string(),
		});
	}

	for (label, value) in [
		("ranking.text_rank_weight", cfg.ranking.text_rank_weight),
		("ranking.similarity_weight", cfg.ranking.similarity_weight),
		("ranking.recency_ceiling", cfg.ranking.recency_ceiling),
		("ranking.city_bonus", cfg.ranking.city_bonus),
		("ranking.county_bonus", cfg.ranking.county_bonus),
		("ranking.state_bonus", cfg.ranking.state_bonus),
		("ranking.population_bonus", cfg.ranking.population_bonus),
		("ranking.need_text_bonus", cfg.ranking.need_text_bonus),
		("ranking.need_requirement_bonus", cfg.ranking.need_requirement_bonus),
		("ranking.localized_stage_bonus", cfg.ranking.localized_stage_bonus),
		("ranking.relaxed_stage_bonus", cfg.ranking.relaxed_stage_bonus),
	] {
		if !value.is_finite() || value < 0.0 {
			return Err(Error::Validation {
				message: format!("{label} must be zero or greater and finite."),
			});
		}
	}

	if cfg.ingest.max_pdf_chars == 0 {
		return Err(Error::Validation {
			message: "ingest.max_pdf_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.ingest.max_web_chars == 0 {
		return Err(Error::Validation {
			message: "ingest.max_web_chars must be greater than zero.".to_string(),
		});
	}

	Ok(())
}
