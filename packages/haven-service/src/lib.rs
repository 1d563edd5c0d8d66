pub mod ingest;
pub mod records;
pub mod search;
pub mod time_serde;

use std::{future::Future, pin::Pin, sync::Arc};

pub use ingest::{IngestRequest, IngestResponse};
pub use records::{
	DeleteRecordResponse, ListRecordsRequest, ListRecordsResponse, RecordDetail, RecordSummary,
};
pub use search::{
	InterpretedFilters, MatchTier, SearchRequest, SearchResponse, SearchResult, ServiceSummary,
};

use haven_config::{Config, LlmProviderConfig};
use haven_domain::{eligibility::Eligibility, interpret::Interpreter};
use haven_providers::extractor::{self, ExtractionInput};
use haven_storage::db::Db;

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait ExtractorProvider
where
	Self: Send + Sync,
{
	fn extract<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		input: ExtractionInput<'a>,
	) -> BoxFuture<'a, color_eyre::Result<Eligibility>>;
}

#[derive(Debug)]
pub enum ServiceError {
	InvalidRequest { message: String },
	NotFound { message: String },
	NoEligibility { message: String },
	Provider { message: String },
	Storage { message: String },
}

#[derive(Clone)]
pub struct Providers {
	pub extractor: Arc<dyn ExtractorProvider>,
}

pub struct HavenService {
	pub cfg: Config,
	pub db: Db,
	pub interpreter: Interpreter,
	pub providers: Providers,
}

struct DefaultProviders;

impl std::fmt::Display for ServiceError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::InvalidRequest { message } => write!(f, "Invalid request: {message}"),
			Self::NotFound { message } => write!(f, "Not found: {message}"),
			Self::NoEligibility { message } => write!(f, "No eligibility found: {message}"),
			Self::Provider { message } => write!(f, "Provider error: {message}"),
			Self::Storage { message } => write!(f, "Storage error: {message}"),
		}
	}
}

impl std::error::Error for ServiceError {}

impl From<sqlx::Error> for ServiceError {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<haven_storage::Error> for ServiceError {
	fn from(err: haven_storage::Error) -> Self {
		match err {
			haven_storage::Error::NotFound(message) => Self::NotFound { message },
			haven_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			haven_storage::Error::Sqlx(err) => Self::Storage { message: err.to_string() },
		}
	}
}

impl From<color_eyre::Report> for ServiceError {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl ExtractorProvider for DefaultProviders {
	fn extract<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		input: ExtractionInput<'a>,
	) -> BoxFuture<'a, color_eyre::Result<Eligibility>> {
		Box::pin(extractor::extract_eligibility(cfg, input))
	}
}

impl Providers {
	pub fn new(extractor: Arc<dyn ExtractorProvider>) -> Self {
		Self { extractor }
	}
}

impl Default for Providers {
	fn default() -> Self {
		Self { extractor: Arc::new(DefaultProviders) }
	}
}

impl HavenService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, db, interpreter: Interpreter::new(), providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, db: Db, providers: Providers) -> Self {
		Self { cfg, db, interpreter: Interpreter::new(), providers }
	}
}

/// Whitespace-collapsed preview, truncated to `max_chars` characters with an
/// ellipsis marker when anything was cut.
pub(crate) fn snippet(text: &str, max_chars: usize) -> String {
	let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");

	if cleaned.chars().count() <= max_chars {
		return cleaned;
	}

	let mut truncated: String = cleaned.chars().take(max_chars).collect();

	truncated.push('…');

	truncated
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn snippet_collapses_whitespace() {
		assert_eq!(snippet("Families  with\n\tchildren.", 220), "Families with children.");
	}

	#[test]
	fn snippet_truncates_on_char_boundaries() {
		let text = "é".repeat(10);

		assert_eq!(snippet(&text, 4), format!("{}…", "é".repeat(4)));
	}

	#[test]
	fn snippet_leaves_short_text_unmarked() {
		assert_eq!(snippet("Veterans only.", 220), "Veterans only.");
	}
}
