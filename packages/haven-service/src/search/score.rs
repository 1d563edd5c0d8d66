//! Pure scoring over merged candidates. Deterministic: identical inputs
//! (including `now`) produce identical ordered output.

use std::cmp::Ordering;

use serde_json::Value;
use time::OffsetDateTime;

use haven_config::Ranking;
use haven_domain::interpret::QueryHints;

use super::pipeline::{Stage, StagedCandidate};

const SECONDS_PER_DAY: f32 = 86_400.0;

#[derive(Debug, Clone)]
pub struct ScoredCandidate {
	pub stage: Stage,
	pub row: haven_storage::models::CandidateRow,
	pub score: f32,
}

/// Scores and sorts candidates, best first. Ties break toward the newer
/// record so fixture-based tests stay deterministic.
pub fn score_candidates(
	items: Vec<StagedCandidate>,
	hints: &QueryHints,
	weights: &Ranking,
	now: OffsetDateTime,
) -> Vec<ScoredCandidate> {
	let mut scored: Vec<ScoredCandidate> = items
		.into_iter()
		.map(|candidate| {
			let score = score_one(&candidate, hints, weights, now);

			ScoredCandidate { stage: candidate.stage, row: candidate.row, score }
		})
		.collect();

	scored.sort_by(|a, b| {
		b.score
			.partial_cmp(&a.score)
			.unwrap_or(Ordering::Equal)
			.then_with(|| b.row.created_at.cmp(&a.row.created_at))
	});

	scored
}

fn score_one(
	candidate: &StagedCandidate,
	hints: &QueryHints,
	weights: &Ranking,
	now: OffsetDateTime,
) -> f32 {
	let row = &candidate.row;
	let mut score = row.rank.unwrap_or(0.0) * weights.text_rank_weight;

	score += row.similarity.unwrap_or(0.0) * weights.similarity_weight;

	let age_days = ((now - row.created_at).whole_seconds() as f32) / SECONDS_PER_DAY;

	score += (weights.recency_ceiling - age_days / weights.recency_decay_days).max(0.0);

	if let Some(city) = hints.city.as_deref()
		&& city_matches(row.location_city.as_deref(), city)
	{
		score += weights.city_bonus;
	}
	if let Some(county) = hints.county.as_deref()
		&& prefix_matches(row.location_county.as_deref(), county)
	{
		score += weights.county_bonus;
	}
	if let Some(state) = hints.state.as_deref()
		&& prefix_matches(row.location_state.as_deref(), state)
	{
		score += weights.state_bonus;
	}

	let record_populations = json_tags(&row.eligibility_json, "population");

	for population in &hints.populations {
		if record_populations.iter().any(|tag| tag.eq_ignore_ascii_case(population)) {
			score += weights.population_bonus;
		}
	}

	let search_text = row.search_text.to_lowercase();
	let record_requirements = json_tags(&row.eligibility_json, "requirements");

	for need in &hints.need_types {
		// Text match wins; the requirements-list match only applies when the
		// need term is absent from the search text.
		if search_text.contains(need.as_str()) {
			score += weights.need_text_bonus;
		} else if record_requirements.iter().any(|tag| tag.contains(need.as_str())) {
			score += weights.need_requirement_bonus;
		}
	}

	score += match candidate.stage {
		Stage::Localized => weights.localized_stage_bonus,
		Stage::Relaxed => weights.relaxed_stage_bonus,
		Stage::Fuzzy | Stage::Fallback => 0.0,
	};

	score
}

pub(crate) fn city_matches(actual: Option<&str>, hinted: &str) -> bool {
	actual.is_some_and(|actual| actual.eq_ignore_ascii_case(hinted))
}

fn prefix_matches(actual: Option<&str>, hinted: &str) -> bool {
	actual.is_some_and(|actual| actual.to_lowercase().starts_with(&hinted.to_lowercase()))
}

/// Extracts a lowercased string array from the stored eligibility JSON.
/// Malformed or missing entries read as empty rather than failing.
pub(crate) fn json_tags(json: &Value, key: &str) -> Vec<String> {
	json.get(key)
		.and_then(Value::as_array)
		.map(|tags| {
			tags.iter()
				.filter_map(Value::as_str)
				.map(|tag| tag.to_lowercase())
				.collect::<Vec<_>>()
		})
		.unwrap_or_default()
}
