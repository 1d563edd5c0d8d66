//! The four retrieval stage queries. Each issues exactly one read-only query
//! and returns up to `limit` rows ordered best-first; the service layer owns
//! the cascade, merging, and scoring.

use sqlx::PgExecutor;

use crate::{Result, models::CandidateRow};

const CANDIDATE_COLUMNS: &str = "\
	record_id,
	program_name,
	source_type,
	source_url,
	page_title,
	created_at,
	raw_eligibility_text,
	search_text,
	location_city,
	location_county,
	location_state,
	eligibility_json";

/// Query parameters shared by all stages. Optional fields act as no-op
/// filters when absent.
#[derive(Clone, Copy, Debug)]
pub struct StageParams<'a> {
	pub query: &'a str,
	pub city: Option<&'a str>,
	pub county: Option<&'a str>,
	pub state: Option<&'a str>,
	/// pg_trgm floor for the fuzzy stage.
	pub similarity_threshold: f32,
	pub limit: i64,
}

/// Location hints are data, not pattern syntax; `%`/`_` in a hint must not
/// widen the ILIKE prefix match.
pub fn escape_like(value: &str) -> String {
	value.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// Full-text match constrained to the hinted city/county (prefix match), and
/// to the hinted state when present. Only meaningful when a locality hint
/// exists; the caller skips it otherwise.
pub async fn localized_full_text<'e, E>(
	executor: E,
	params: StageParams<'_>,
) -> Result<Vec<CandidateRow>>
where
	E: PgExecutor<'e>,
{
	let sql = format!(
		"\
SELECT
{CANDIDATE_COLUMNS},
	ts_rank(search_tsv, plainto_tsquery('english', $1))::real AS rank,
	NULL::real AS similarity
FROM eligibility_records
WHERE search_tsv @@ plainto_tsquery('english', $1)
	AND ($2::text IS NULL OR location_city ILIKE $2 || '%')
	AND ($3::text IS NULL OR location_county ILIKE $3 || '%')
	AND ($4::text IS NULL OR location_state ILIKE $4 || '%')
ORDER BY rank DESC, created_at DESC
LIMIT $5"
	);
	let rows = sqlx::query_as::<_, CandidateRow>(&sql)
		.bind(params.query)
		.bind(params.city.map(escape_like))
		.bind(params.county.map(escape_like))
		.bind(params.state.map(escape_like))
		.bind(params.limit)
		.fetch_all(executor)
		.await?;

	Ok(rows)
}

/// Same full-text match without the city/county constraint; the state filter
/// still applies when hinted.
pub async fn relaxed_full_text<'e, E>(
	executor: E,
	params: StageParams<'_>,
) -> Result<Vec<CandidateRow>>
where
	E: PgExecutor<'e>,
{
	let sql = format!(
		"\
SELECT
{CANDIDATE_COLUMNS},
	ts_rank(search_tsv, plainto_tsquery('english', $1))::real AS rank,
	NULL::real AS similarity
FROM eligibility_records
WHERE search_tsv @@ plainto_tsquery('english', $1)
	AND ($2::text IS NULL OR location_state ILIKE $2 || '%')
ORDER BY rank DESC, created_at DESC
LIMIT $3"
	);
	let rows = sqlx::query_as::<_, CandidateRow>(&sql)
		.bind(params.query)
		.bind(params.state.map(escape_like))
		.bind(params.limit)
		.fetch_all(executor)
		.await?;

	Ok(rows)
}

/// Substring containment or trigram similarity above the configured floor.
pub async fn fuzzy_similarity<'e, E>(
	executor: E,
	params: StageParams<'_>,
) -> Result<Vec<CandidateRow>>
where
	E: PgExecutor<'e>,
{
	let sql = format!(
		"\
SELECT
{CANDIDATE_COLUMNS},
	NULL::real AS rank,
	similarity(search_text, $1)::real AS similarity
FROM eligibility_records
WHERE (search_text ILIKE '%' || $1 || '%' OR similarity(search_text, $1) > $2)
	AND ($3::text IS NULL OR location_state ILIKE $3 || '%')
ORDER BY similarity DESC, created_at DESC
LIMIT $4"
	);
	let rows = sqlx::query_as::<_, CandidateRow>(&sql)
		.bind(params.query)
		.bind(params.similarity_threshold)
		.bind(params.state.map(escape_like))
		.bind(params.limit)
		.fetch_all(executor)
		.await?;

	Ok(rows)
}

/// No text condition at all: the most recent records, region-filtered when a
/// state hint exists. Last resort so a thin query still returns something.
pub async fn fallback_recency<'e, E>(
	executor: E,
	params: StageParams<'_>,
) -> Result<Vec<CandidateRow>>
where
	E: PgExecutor<'e>,
{
	let sql = format!(
		"\
SELECT
{CANDIDATE_COLUMNS},
	NULL::real AS rank,
	NULL::real AS similarity
FROM eligibility_records
WHERE ($1::text IS NULL OR location_state ILIKE $1 || '%')
ORDER BY created_at DESC
LIMIT $2"
	);
	let rows = sqlx::query_as::<_, CandidateRow>(&sql)
		.bind(params.state.map(escape_like))
		.bind(params.limit)
		.fetch_all(executor)
		.await?;

	Ok(rows)
}
