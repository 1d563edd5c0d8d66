use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

/// One persisted document plus its extracted eligibility data.
#[derive(Debug, sqlx::FromRow)]
pub struct EligibilityRecord {
	pub record_id: Uuid,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
	pub source_type: String,
	pub source_url: Option<String>,
	pub page_title: Option<String>,
	pub file_name: Option<String>,
	pub file_size: Option<i64>,
	pub mime_type: Option<String>,
	pub program_name: Option<String>,
	pub raw_text: String,
	pub raw_eligibility_text: String,
	pub eligibility_json: Value,
	pub location_city: Option<String>,
	pub location_county: Option<String>,
	pub location_state: Option<String>,
	pub content_hash: Option<String>,
	pub search_text: String,
}

/// Insert payload. `search_tsv` is generated by the database from
/// `search_text` and is never written directly.
#[derive(Debug)]
pub struct NewEligibilityRecord {
	pub record_id: Uuid,
	pub source_type: String,
	pub source_url: Option<String>,
	pub page_title: Option<String>,
	pub file_name: Option<String>,
	pub file_size: Option<i64>,
	pub mime_type: Option<String>,
	pub program_name: Option<String>,
	pub raw_text: String,
	pub raw_eligibility_text: String,
	pub eligibility_json: Value,
	pub location_city: Option<String>,
	pub location_county: Option<String>,
	pub location_state: Option<String>,
	pub content_hash: Option<String>,
	pub search_text: String,
}

/// Row shape shared by all four retrieval stages. `rank` is populated by the
/// full-text stages, `similarity` by the fuzzy stage; the fallback stage
/// carries neither.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct CandidateRow {
	pub record_id: Uuid,
	pub program_name: Option<String>,
	pub source_type: String,
	pub source_url: Option<String>,
	pub page_title: Option<String>,
	pub created_at: OffsetDateTime,
	pub raw_eligibility_text: String,
	pub search_text: String,
	pub location_city: Option<String>,
	pub location_county: Option<String>,
	pub location_state: Option<String>,
	pub eligibility_json: Value,
	pub rank: Option<f32>,
	pub similarity: Option<f32>,
}

/// Listing row for the record-browsing endpoints.
#[derive(Debug, sqlx::FromRow)]
pub struct RecordSummaryRow {
	pub record_id: Uuid,
	pub program_name: Option<String>,
	pub source_type: String,
	pub source_url: Option<String>,
	pub page_title: Option<String>,
	pub created_at: OffsetDateTime,
	pub raw_eligibility_text: String,
}
