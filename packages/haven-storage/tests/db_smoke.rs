use tokio::runtime::Runtime;
use uuid::Uuid;

use haven_config::Postgres;
use haven_storage::{
	db::Db,
	models::NewEligibilityRecord,
	records, stages,
	stages::StageParams,
};
use haven_testkit::TestDatabase;

fn sample_record(program_name: &str, city: &str, state: &str, text: &str) -> NewEligibilityRecord {
	NewEligibilityRecord {
		record_id: Uuid::new_v4(),
		source_type: "web".to_string(),
		source_url: Some(format!("https://example.org/{}", Uuid::new_v4().simple())),
		page_title: Some(program_name.to_string()),
		file_name: None,
		file_size: None,
		mime_type: None,
		program_name: Some(program_name.to_string()),
		raw_text: text.to_string(),
		raw_eligibility_text: text.to_string(),
		eligibility_json: serde_json::json!({
			"program_name": program_name,
			"raw_eligibility_text": text,
		}),
		location_city: Some(city.to_string()),
		location_county: None,
		location_state: Some(state.to_string()),
		content_hash: None,
		search_text: format!("{program_name} {city} {state} {text}"),
	}
}

#[test]
#[ignore = "Requires external Postgres. Set HAVEN_PG_DSN to run."]
fn record_table_exists_after_bootstrap() {
	let Some(dsn) = haven_testkit::env_dsn() else {
		eprintln!("Skipping record_table_exists_after_bootstrap; set HAVEN_PG_DSN to run.");

		return;
	};
	let rt = Runtime::new().expect("Failed to build runtime.");

	rt.block_on(async {
		let cfg = Postgres { dsn: dsn.clone(), pool_max_conns: 1 };
		let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

		db.ensure_schema().await.expect("Failed to ensure schema.");

		let count: i64 = sqlx::query_scalar(
			"SELECT count(*) FROM information_schema.tables WHERE table_name = 'eligibility_records'",
		)
		.fetch_one(&db.pool)
		.await
		.expect("Failed to query schema tables.");

		assert_eq!(count, 1);
	});
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set HAVEN_PG_DSN to run."]
async fn insert_fetch_delete_roundtrip() {
	let Some(base_dsn) = haven_testkit::env_dsn() else {
		eprintln!("Skipping insert_fetch_delete_roundtrip; set HAVEN_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let record = sample_record(
		"Family Gateway",
		"Dallas",
		"TX",
		"Serves families with children experiencing homelessness.",
	);
	let record_id = record.record_id;

	records::insert_record(&db.pool, &record).await.expect("Failed to insert record.");

	let fetched = records::fetch_record(&db.pool, record_id)
		.await
		.expect("Failed to fetch record.")
		.expect("Record should exist after insert.");

	assert_eq!(fetched.program_name.as_deref(), Some("Family Gateway"));
	assert_eq!(fetched.location_city.as_deref(), Some("Dallas"));

	assert!(records::delete_record(&db.pool, record_id).await.expect("Failed to delete record."));
	assert!(!records::delete_record(&db.pool, record_id).await.expect("Failed to delete record."));
	assert!(
		records::fetch_record(&db.pool, record_id)
			.await
			.expect("Failed to fetch record.")
			.is_none()
	);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set HAVEN_PG_DSN to run."]
async fn empty_eligibility_text_is_rejected() {
	let Some(base_dsn) = haven_testkit::env_dsn() else {
		eprintln!("Skipping empty_eligibility_text_is_rejected; set HAVEN_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let mut record = sample_record("Blank", "Austin", "TX", "placeholder");
	record.raw_eligibility_text = "   ".to_string();

	assert!(records::insert_record(&db.pool, &record).await.is_err());

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set HAVEN_PG_DSN to run."]
async fn localized_stage_filters_by_city() {
	let Some(base_dsn) = haven_testkit::env_dsn() else {
		eprintln!("Skipping localized_stage_filters_by_city; set HAVEN_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let dallas = sample_record(
		"Dallas Family Shelter",
		"Dallas",
		"TX",
		"Emergency shelter for families with children.",
	);
	let austin = sample_record(
		"Austin Family Shelter",
		"Austin",
		"TX",
		"Emergency shelter for families with children.",
	);

	records::insert_record(&db.pool, &dallas).await.expect("Failed to insert record.");
	records::insert_record(&db.pool, &austin).await.expect("Failed to insert record.");

	let params = StageParams {
		query: "family shelter",
		city: Some("Dallas"),
		county: None,
		state: Some("TX"),
		similarity_threshold: 0.2,
		limit: 10,
	};
	let localized = stages::localized_full_text(&db.pool, params)
		.await
		.expect("Failed to run localized stage.");

	assert_eq!(localized.len(), 1);
	assert_eq!(localized[0].record_id, dallas.record_id);

	let relaxed =
		stages::relaxed_full_text(&db.pool, params).await.expect("Failed to run relaxed stage.");

	assert_eq!(relaxed.len(), 2);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set HAVEN_PG_DSN to run."]
async fn fuzzy_stage_tolerates_typos() {
	let Some(base_dsn) = haven_testkit::env_dsn() else {
		eprintln!("Skipping fuzzy_stage_tolerates_typos; set HAVEN_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let record = sample_record(
		"Hope Housing Vouchers",
		"Houston",
		"TX",
		"Housing vouchers for veterans and seniors.",
	);

	records::insert_record(&db.pool, &record).await.expect("Failed to insert record.");

	let params = StageParams {
		query: "hope housing vouchrs houston",
		city: None,
		county: None,
		state: None,
		similarity_threshold: 0.2,
		limit: 10,
	};
	let fuzzy =
		stages::fuzzy_similarity(&db.pool, params).await.expect("Failed to run fuzzy stage.");

	assert_eq!(fuzzy.len(), 1);
	assert_eq!(fuzzy[0].record_id, record.record_id);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set HAVEN_PG_DSN to run."]
async fn listing_filters_by_source_type_and_needle() {
	let Some(base_dsn) = haven_testkit::env_dsn() else {
		eprintln!("Skipping listing_filters_by_source_type_and_needle; set HAVEN_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let mut pdf = sample_record("City Food Pantry", "Plano", "TX", "Weekly food boxes.");

	pdf.source_type = "pdf".to_string();
	pdf.source_url = None;
	pdf.file_name = Some("pantry.pdf".to_string());

	let web = sample_record("Shelter Network", "Plano", "TX", "Shelter beds for single adults.");

	records::insert_record(&db.pool, &pdf).await.expect("Failed to insert record.");
	records::insert_record(&db.pool, &web).await.expect("Failed to insert record.");

	let all = records::list_records(&db.pool, None, None, 50).await.expect("Failed to list.");

	assert_eq!(all.len(), 2);

	let pdfs =
		records::list_records(&db.pool, Some("pdf"), None, 50).await.expect("Failed to list.");

	assert_eq!(pdfs.len(), 1);
	assert_eq!(pdfs[0].record_id, pdf.record_id);

	let by_name =
		records::list_records(&db.pool, None, Some("network"), 50).await.expect("Failed to list.");

	assert_eq!(by_name.len(), 1);
	assert_eq!(by_name[0].record_id, web.record_id);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set HAVEN_PG_DSN to run."]
async fn underscore_in_city_hint_is_not_a_wildcard() {
	let Some(base_dsn) = haven_testkit::env_dsn() else {
		eprintln!("Skipping underscore_in_city_hint_is_not_a_wildcard; set HAVEN_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let record = sample_record(
		"Dallas Family Shelter",
		"Dallas",
		"TX",
		"Emergency shelter for families with children.",
	);

	records::insert_record(&db.pool, &record).await.expect("Failed to insert record.");

	let mut params = StageParams {
		query: "family shelter",
		city: Some("D_llas"),
		county: None,
		state: None,
		similarity_threshold: 0.2,
		limit: 10,
	};
	let widened = stages::localized_full_text(&db.pool, params)
		.await
		.expect("Failed to run localized stage.");

	assert!(widened.is_empty());

	params.city = Some("Dallas");

	let exact = stages::localized_full_text(&db.pool, params)
		.await
		.expect("Failed to run localized stage.");

	assert_eq!(exact.len(), 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
