use sqlx::PgExecutor;
use uuid::Uuid;

use crate::{
	Result,
	models::{EligibilityRecord, NewEligibilityRecord, RecordSummaryRow},
};

pub async fn insert_record<'e, E>(executor: E, record: &NewEligibilityRecord) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO eligibility_records (
	record_id,
	source_type,
	source_url,
	page_title,
	file_name,
	file_size,
	mime_type,
	program_name,
	raw_text,
	raw_eligibility_text,
	eligibility_json,
	location_city,
	location_county,
	location_state,
	content_hash,
	search_text
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
	)
	.bind(record.record_id)
	.bind(record.source_type.as_str())
	.bind(record.source_url.as_deref())
	.bind(record.page_title.as_deref())
	.bind(record.file_name.as_deref())
	.bind(record.file_size)
	.bind(record.mime_type.as_deref())
	.bind(record.program_name.as_deref())
	.bind(record.raw_text.as_str())
	.bind(record.raw_eligibility_text.as_str())
	.bind(&record.eligibility_json)
	.bind(record.location_city.as_deref())
	.bind(record.location_county.as_deref())
	.bind(record.location_state.as_deref())
	.bind(record.content_hash.as_deref())
	.bind(record.search_text.as_str())
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn fetch_record<'e, E>(executor: E, record_id: Uuid) -> Result<Option<EligibilityRecord>>
where
	E: PgExecutor<'e>,
{
	let row = sqlx::query_as::<_, EligibilityRecord>(
		"\
SELECT
	record_id,
	created_at,
	updated_at,
	source_type,
	source_url,
	page_title,
	file_name,
	file_size,
	mime_type,
	program_name,
	raw_text,
	raw_eligibility_text,
	eligibility_json,
	location_city,
	location_county,
	location_state,
	content_hash,
	search_text
FROM eligibility_records
WHERE record_id = $1",
	)
	.bind(record_id)
	.fetch_optional(executor)
	.await?;

	Ok(row)
}

/// Returns whether a row was actually deleted.
pub async fn delete_record<'e, E>(executor: E, record_id: Uuid) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query("DELETE FROM eligibility_records WHERE record_id = $1")
		.bind(record_id)
		.execute(executor)
		.await?;

	Ok(result.rows_affected() > 0)
}

pub async fn find_by_content_hash<'e, E>(executor: E, content_hash: &str) -> Result<Option<Uuid>>
where
	E: PgExecutor<'e>,
{
	let row = sqlx::query_scalar::<_, Uuid>(
		"SELECT record_id FROM eligibility_records WHERE content_hash = $1 LIMIT 1",
	)
	.bind(content_hash)
	.fetch_optional(executor)
	.await?;

	Ok(row)
}

/// Recency-ordered listing with optional source-type and substring filters.
pub async fn list_records<'e, E>(
	executor: E,
	source_type: Option<&str>,
	needle: Option<&str>,
	limit: i64,
) -> Result<Vec<RecordSummaryRow>>
where
	E: PgExecutor<'e>,
{
	let pattern = needle.map(|value| format!("%{value}%"));
	let rows = sqlx::query_as::<_, RecordSummaryRow>(
		"\
SELECT
	record_id,
	program_name,
	source_type,
	source_url,
	page_title,
	created_at,
	raw_eligibility_text
FROM eligibility_records
WHERE ($1::text IS NULL OR source_type = $1)
	AND (
		$2::text IS NULL
		OR program_name ILIKE $2
		OR page_title ILIKE $2
		OR source_url ILIKE $2
	)
ORDER BY created_at DESC
LIMIT $3",
	)
	.bind(source_type)
	.bind(pattern.as_deref())
	.bind(limit)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}
