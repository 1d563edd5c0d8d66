//! Turns scored candidates into response items with human-readable match
//! reasons and a coarse tier.

use haven_domain::interpret::QueryHints;

use super::{
	MatchTier, SearchResult, ServiceSummary,
	pipeline::Stage,
	score::{ScoredCandidate, city_matches, json_tags},
};
use crate::snippet;

const PREVIEW_CHARS: usize = 220;
const MAX_KEYWORD_REASONS: usize = 5;

pub fn to_result(candidate: ScoredCandidate, hints: &QueryHints) -> SearchResult {
	let match_reason = build_reasons(&candidate, hints);
	let match_tier = tier_for(candidate.stage);
	let row = candidate.row;
	let service = ServiceSummary {
		record_id: row.record_id,
		program_name: row.program_name,
		source_type: row.source_type,
		source_url: row.source_url,
		page_title: row.page_title,
		created_at: row.created_at,
		preview_eligibility_text: snippet(&row.raw_eligibility_text, PREVIEW_CHARS),
		location_city: row.location_city,
		location_county: row.location_county,
		location_state: row.location_state,
		populations: json_tags(&row.eligibility_json, "population"),
		requirements: json_tags(&row.eligibility_json, "requirements"),
	};

	SearchResult { service, match_reason, match_tier }
}

pub fn tier_for(stage: Stage) -> MatchTier {
	match stage {
		Stage::Localized => MatchTier::Direct,
		Stage::Relaxed | Stage::Fallback => MatchTier::Broader,
		Stage::Fuzzy => MatchTier::Fuzzy,
	}
}

fn build_reasons(candidate: &ScoredCandidate, hints: &QueryHints) -> Vec<String> {
	let row = &candidate.row;
	let search_text = row.search_text.to_lowercase();
	let mut reasons = Vec::new();
	let matched_keywords: Vec<&str> = hints
		.keywords
		.iter()
		.filter(|keyword| search_text.contains(keyword.as_str()))
		.take(MAX_KEYWORD_REASONS)
		.map(String::as_str)
		.collect();

	if !matched_keywords.is_empty() {
		reasons.push(format!("Matches: {}", matched_keywords.join(", ")));
	}

	if let Some(city) = hints.city.as_deref() {
		if city_matches(row.location_city.as_deref(), city) {
			reasons.push(format!("Located in {city}"));
		} else {
			reasons.push(format!("Serving areas near {city}"));
		}
	}

	let record_populations = json_tags(&row.eligibility_json, "population");
	let served: Vec<String> = hints
		.populations
		.iter()
		.filter(|population| {
			record_populations.iter().any(|tag| tag.eq_ignore_ascii_case(population))
		})
		.map(|population| population.replace('_', " "))
		.collect();

	if !served.is_empty() {
		reasons.push(format!("Serves: {}", served.join(", ")));
	}

	let record_requirements = json_tags(&row.eligibility_json, "requirements");
	let needs: Vec<&str> = hints
		.need_types
		.iter()
		.filter(|need| {
			search_text.contains(need.as_str())
				|| record_requirements.iter().any(|tag| tag.contains(need.as_str()))
		})
		.map(String::as_str)
		.collect();

	if !needs.is_empty() {
		reasons.push(format!("Matches need: {}", needs.join(", ")));
	}

	match candidate.stage {
		Stage::Fuzzy => reasons.push("Fuzzy match on similar wording".to_string()),
		Stage::Fallback => reasons.push("Showing broader options in the region".to_string()),
		Stage::Localized | Stage::Relaxed => {},
	}

	if reasons.is_empty() {
		reasons.push("Recently added to your library".to_string());
	}

	reasons
}
