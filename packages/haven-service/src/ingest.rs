use tracing::info;
use uuid::Uuid;

use haven_domain::{
	eligibility::{Eligibility, SourceType},
	location::derive_location,
	search_text::{SearchTextInput, build_search_text},
};
use haven_providers::extractor::ExtractionInput;
use haven_storage::{models::NewEligibilityRecord, records};

use crate::{HavenService, RecordSummary, ServiceError, ServiceResult, snippet};

const SUMMARY_PREVIEW_CHARS: usize = 220;
const TRUNCATION_MARKER: &str = "\n...[truncated]";

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IngestRequest {
	pub source_type: SourceType,
	/// Already-extracted plain text; PDF/HTML parsing happens upstream.
	pub text: String,
	pub source_url: Option<String>,
	pub page_title: Option<String>,
	pub file_name: Option<String>,
	pub file_size: Option<i64>,
	pub mime_type: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IngestResponse {
	pub service: RecordSummary,
	pub eligibility: Eligibility,
}

impl HavenService {
	/// Extracts eligibility from the text and persists a searchable record.
	/// Documents without any stated eligibility are never persisted.
	pub async fn ingest(&self, req: IngestRequest) -> ServiceResult<IngestResponse> {
		let text = req.text.trim();
		if text.is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: "text is required and must not be empty.".to_string(),
			});
		}
		if req.source_type == SourceType::Web && req.source_url.is_none() {
			return Err(ServiceError::InvalidRequest {
				message: "source_url is required for web records.".to_string(),
			});
		}

		let cap = match req.source_type {
			SourceType::Pdf => self.cfg.ingest.max_pdf_chars,
			SourceType::Web => self.cfg.ingest.max_web_chars,
		} as usize;
		let truncated = text.chars().count() > cap;
		let capped: String = text.chars().take(cap).collect();
		let content_hash = blake3::hash(capped.as_bytes()).to_hex().to_string();

		if let Some(existing) =
			records::find_by_content_hash(&self.db.pool, &content_hash).await?
		{
			return Err(ServiceError::InvalidRequest {
				message: format!("A record with identical content already exists: {existing}."),
			});
		}

		let input = ExtractionInput {
			text: &capped,
			source_type: req.source_type,
			file_name: req.file_name.as_deref(),
			title: req.page_title.as_deref(),
			url: req.source_url.as_deref(),
		};
		let eligibility =
			self.providers.extractor.extract(&self.cfg.providers.llm_extractor, input).await?;

		if eligibility.raw_eligibility_text.trim().is_empty() {
			return Err(ServiceError::NoEligibility {
				message: "The document does not state who the service helps or how to qualify."
					.to_string(),
			});
		}

		let location = derive_location(&eligibility);
		let search_text = build_search_text(&SearchTextInput {
			program_name: None,
			page_title: req.page_title.as_deref(),
			eligibility: &eligibility,
			raw_eligibility_text: &eligibility.raw_eligibility_text,
			location: &location,
		});
		let eligibility_json = serde_json::to_value(&eligibility)
			.map_err(|err| ServiceError::Storage { message: err.to_string() })?;
		let raw_text = if truncated { format!("{capped}{TRUNCATION_MARKER}") } else { capped };
		let mime_type = match req.source_type {
			SourceType::Pdf =>
				Some(req.mime_type.unwrap_or_else(|| "application/pdf".to_string())),
			SourceType::Web => req.mime_type,
		};
		let record = NewEligibilityRecord {
			record_id: Uuid::new_v4(),
			source_type: req.source_type.as_str().to_string(),
			source_url: req.source_url,
			page_title: req.page_title,
			file_name: req.file_name,
			file_size: req.file_size,
			mime_type,
			program_name: eligibility.program_name.clone(),
			raw_text,
			raw_eligibility_text: eligibility.raw_eligibility_text.clone(),
			eligibility_json,
			location_city: location.city,
			location_county: location.county,
			location_state: location.state,
			content_hash: Some(content_hash),
			search_text,
		};

		records::insert_record(&self.db.pool, &record).await?;

		info!(
			record_id = %record.record_id,
			source_type = record.source_type,
			"Ingested eligibility record."
		);

		// Re-read so the summary carries the database-assigned timestamp.
		let stored = records::fetch_record(&self.db.pool, record.record_id)
			.await?
			.ok_or_else(|| ServiceError::Storage {
				message: "Inserted record could not be read back.".to_string(),
			})?;
		let service = RecordSummary {
			record_id: stored.record_id,
			program_name: stored.program_name,
			source_type: stored.source_type,
			source_url: stored.source_url,
			page_title: stored.page_title,
			created_at: stored.created_at,
			preview_eligibility_text: snippet(
				&stored.raw_eligibility_text,
				SUMMARY_PREVIEW_CHARS,
			),
		};

		Ok(IngestResponse { service, eligibility })
	}
}
