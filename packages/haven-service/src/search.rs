pub mod pipeline;
pub mod reasons;
pub mod score;

use tracing::{debug, warn};

use haven_domain::interpret::{ExplicitFilters, QueryHints};
use haven_storage::stages::{self, StageParams};

use crate::{HavenService, ServiceError, ServiceResult};
use pipeline::{CascadeTriggers, MergeState, Stage};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SearchRequest {
	pub query: String,
	pub limit: Option<u32>,
	#[serde(default)]
	pub filters: Option<ExplicitFilters>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ServiceSummary {
	pub record_id: uuid::Uuid,
	pub program_name: Option<String>,
	pub source_type: String,
	pub source_url: Option<String>,
	pub page_title: Option<String>,
	#[serde(with = "crate::time_serde")]
	pub created_at: time::OffsetDateTime,
	pub preview_eligibility_text: String,
	pub location_city: Option<String>,
	pub location_county: Option<String>,
	pub location_state: Option<String>,
	pub populations: Vec<String>,
	pub requirements: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
	Direct,
	Broader,
	Fuzzy,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SearchResult {
	pub service: ServiceSummary,
	pub match_reason: Vec<String>,
	pub match_tier: MatchTier,
}

/// What the interpreter made of the query, echoed back so callers can see
/// why the results look the way they do.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct InterpretedFilters {
	pub query: String,
	pub location_city: Option<String>,
	pub location_county: Option<String>,
	pub state: Option<String>,
	pub populations: Vec<String>,
	pub need_types: Vec<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SearchResponse {
	pub query: String,
	pub interpreted_filters: InterpretedFilters,
	pub results: Vec<SearchResult>,
}

impl InterpretedFilters {
	fn from_hints(hints: &QueryHints) -> Self {
		Self {
			query: hints.query.clone(),
			location_city: hints.city.clone(),
			location_county: hints.county.clone(),
			state: hints.state.clone(),
			populations: hints.populations.clone(),
			need_types: hints.need_types.clone(),
		}
	}
}

impl HavenService {
	pub async fn search(&self, req: SearchRequest) -> ServiceResult<SearchResponse> {
		let query = req.query.trim();
		if query.is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: "query is required and must not be empty.".to_string(),
			});
		}

		let limit = req.limit.unwrap_or(self.cfg.search.default_limit);
		if limit < 1 || limit > self.cfg.search.max_limit {
			return Err(ServiceError::InvalidRequest {
				message: format!("limit must be between 1 and {}.", self.cfg.search.max_limit),
			});
		}

		let filters = req.filters.unwrap_or_default();
		let hints = self.interpreter.interpret(query, &filters);
		let oversample = limit
			.saturating_mul(self.cfg.search.oversample_factor)
			.min(self.cfg.search.oversample_cap) as i64;
		let params = StageParams {
			query: &hints.normalized,
			city: hints.city.as_deref(),
			county: hints.county.as_deref(),
			state: hints.state.as_deref(),
			similarity_threshold: self.cfg.search.fuzzy_similarity_threshold,
			limit: oversample,
		};
		let triggers = CascadeTriggers {
			min_strong_matches: self.cfg.search.min_strong_matches as usize,
			limit: limit as usize,
		};
		let mut state = MergeState::default();

		if triggers.localized(hints.has_locality()) {
			let rows = stages::localized_full_text(&self.db.pool, params)
				.await
				.map_err(stage_failure)?;

			state.fold(Stage::Localized, rows);
		}
		if triggers.relaxed(state.len()) {
			let rows =
				stages::relaxed_full_text(&self.db.pool, params).await.map_err(stage_failure)?;

			state.fold(Stage::Relaxed, rows);
		}
		if triggers.backfill(state.len()) {
			let rows =
				stages::fuzzy_similarity(&self.db.pool, params).await.map_err(stage_failure)?;

			state.fold(Stage::Fuzzy, rows);
		}
		if triggers.backfill(state.len()) {
			let rows =
				stages::fallback_recency(&self.db.pool, params).await.map_err(stage_failure)?;

			state.fold(Stage::Fallback, rows);
		}

		debug!(
			stages = ?state.stages_fired(),
			candidates = state.len(),
			"Search cascade complete."
		);

		let now = time::OffsetDateTime::now_utc();
		let scored = score::score_candidates(state.into_items(), &hints, &self.cfg.ranking, now);
		let results = scored
			.into_iter()
			.take(limit as usize)
			.map(|candidate| reasons::to_result(candidate, &hints))
			.collect();

		Ok(SearchResponse {
			query: query.to_string(),
			interpreted_filters: InterpretedFilters::from_hints(&hints),
			results,
		})
	}
}

// Raw storage errors stay in the logs; callers get a generic failure so
// schema details never leak through the API.
fn stage_failure(err: haven_storage::Error) -> ServiceError {
	warn!(error = %err, "Search stage query failed.");

	ServiceError::Storage { message: "Search failed.".to_string() }
}
