use tracing::warn;
use uuid::Uuid;

use haven_domain::eligibility::Eligibility;
use haven_storage::records;

use crate::{HavenService, ServiceError, ServiceResult, snippet};

const DEFAULT_LIST_LIMIT: u32 = 20;
const MAX_LIST_LIMIT: u32 = 100;
const LIST_PREVIEW_CHARS: usize = 160;
const RAW_TEXT_SNIPPET_CHARS: usize = 2_000;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ListRecordsRequest {
	pub limit: Option<u32>,
	pub source_type: Option<String>,
	pub q: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RecordSummary {
	pub record_id: Uuid,
	pub program_name: Option<String>,
	pub source_type: String,
	pub source_url: Option<String>,
	pub page_title: Option<String>,
	#[serde(with = "crate::time_serde")]
	pub created_at: time::OffsetDateTime,
	pub preview_eligibility_text: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ListRecordsResponse {
	pub items: Vec<RecordSummary>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RecordDetail {
	pub record_id: Uuid,
	pub program_name: Option<String>,
	pub source_type: String,
	pub source_url: Option<String>,
	pub page_title: Option<String>,
	#[serde(with = "crate::time_serde")]
	pub created_at: time::OffsetDateTime,
	pub raw_eligibility_text: String,
	pub raw_text_snippet: String,
	pub eligibility: Eligibility,
	pub location_city: Option<String>,
	pub location_county: Option<String>,
	pub location_state: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DeleteRecordResponse {
	pub record_id: Uuid,
}

impl HavenService {
	pub async fn list_records(&self, req: ListRecordsRequest) -> ServiceResult<ListRecordsResponse> {
		let limit = match req.limit {
			Some(limit) if limit > 0 => limit.min(MAX_LIST_LIMIT),
			_ => DEFAULT_LIST_LIMIT,
		};
		// Unknown source types act as no filter, matching the lenient query
		// parameter handling of the record browser.
		let source_type = req
			.source_type
			.as_deref()
			.filter(|value| *value == "pdf" || *value == "web");
		let needle = req.q.as_deref().map(str::trim).filter(|value| !value.is_empty());
		let rows =
			records::list_records(&self.db.pool, source_type, needle, limit as i64).await?;
		let items = rows
			.into_iter()
			.map(|row| RecordSummary {
				record_id: row.record_id,
				program_name: row.program_name,
				source_type: row.source_type,
				source_url: row.source_url,
				page_title: row.page_title,
				created_at: row.created_at,
				preview_eligibility_text: snippet(&row.raw_eligibility_text, LIST_PREVIEW_CHARS),
			})
			.collect();

		Ok(ListRecordsResponse { items })
	}

	pub async fn get_record(&self, record_id: Uuid) -> ServiceResult<RecordDetail> {
		let record = records::fetch_record(&self.db.pool, record_id).await?.ok_or_else(|| {
			ServiceError::NotFound { message: format!("Record {record_id} does not exist.") }
		})?;
		let eligibility: Eligibility = serde_json::from_value(record.eligibility_json)
			.map_err(|err| {
				warn!(record_id = %record_id, error = %err, "Stored eligibility JSON is invalid.");

				ServiceError::Storage { message: "Stored eligibility data is invalid.".to_string() }
			})?;

		Ok(RecordDetail {
			record_id: record.record_id,
			program_name: record.program_name,
			source_type: record.source_type,
			source_url: record.source_url,
			page_title: record.page_title,
			created_at: record.created_at,
			raw_eligibility_text: record.raw_eligibility_text,
			raw_text_snippet: snippet(&record.raw_text, RAW_TEXT_SNIPPET_CHARS),
			eligibility,
			location_city: record.location_city,
			location_county: record.location_county,
			location_state: record.location_state,
		})
	}

	pub async fn delete_record(&self, record_id: Uuid) -> ServiceResult<DeleteRecordResponse> {
		let deleted = records::delete_record(&self.db.pool, record_id).await?;

		if !deleted {
			return Err(ServiceError::NotFound {
				message: format!("Record {record_id} does not exist."),
			});
		}

		Ok(DeleteRecordResponse { record_id })
	}
}
