use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use uuid::Uuid;

use haven_service::{
	DeleteRecordResponse, IngestRequest, IngestResponse, ListRecordsRequest, ListRecordsResponse,
	RecordDetail, SearchRequest, SearchResponse, ServiceError,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/search", post(search))
		.route("/v1/records", post(ingest).get(list_records))
		.route("/v1/records/{id}", get(get_record).delete(delete_record))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let response = state.service.search(payload).await?;
	Ok(Json(response))
}

async fn ingest(
	State(state): State<AppState>,
	Json(payload): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, ApiError> {
	let response = state.service.ingest(payload).await?;
	Ok(Json(response))
}

async fn list_records(
	State(state): State<AppState>,
	Query(params): Query<ListRecordsRequest>,
) -> Result<Json<ListRecordsResponse>, ApiError> {
	let response = state.service.list_records(params).await?;
	Ok(Json(response))
}

async fn get_record(
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
) -> Result<Json<RecordDetail>, ApiError> {
	let response = state.service.get_record(id).await?;
	Ok(Json(response))
}

async fn delete_record(
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
) -> Result<Json<DeleteRecordResponse>, ApiError> {
	let response = state.service.delete_record(id).await?;
	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}

impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				Self::new(StatusCode::BAD_REQUEST, "invalid_request", message),
			ServiceError::NotFound { message } =>
				Self::new(StatusCode::NOT_FOUND, "not_found", message),
			ServiceError::NoEligibility { message } =>
				Self::new(StatusCode::UNPROCESSABLE_ENTITY, "no_eligibility", message),
			ServiceError::Provider { message } =>
				Self::new(StatusCode::BAD_GATEWAY, "extraction_failed", message),
			ServiceError::Storage { message } =>
				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "storage_failed", message),
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };
		(self.status, Json(body)).into_response()
	}
}
