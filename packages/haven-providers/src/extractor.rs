use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

use haven_domain::eligibility::{Eligibility, SourceType};

const SYSTEM_PROMPT: &str = "You are an expert case manager who extracts structured eligibility \
	rules from program documents related to homeless-services and housing assistance. Given the \
	raw document text, identify only directly-stated eligibility information. If a field is not \
	explicitly mentioned, return null for single values or [] for arrays. For gender_restriction, \
	use \"any\" when no restriction is stated. Do not infer details beyond what is present in the \
	text. Provide the exact excerpt that states eligibility in raw_eligibility_text.";

/// Extraction input. `text` must already be capped to the per-source-type
/// character limit by the caller.
#[derive(Clone, Debug)]
pub struct ExtractionInput<'a> {
	pub text: &'a str,
	pub source_type: SourceType,
	pub file_name: Option<&'a str>,
	pub title: Option<&'a str>,
	pub url: Option<&'a str>,
}

pub async fn extract_eligibility(
	cfg: &haven_config::LlmProviderConfig,
	input: ExtractionInput<'_>,
) -> Result<Eligibility> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let user_prompt = build_user_prompt(&input);

	for _ in 0..3 {
		let body = serde_json::json!({
			"model": cfg.model,
			"temperature": cfg.temperature,
			"response_format": { "type": "json_object" },
			"messages": [
				{ "role": "system", "content": SYSTEM_PROMPT },
				{ "role": "user", "content": user_prompt },
			],
		});
		let res = client
			.post(&url)
			.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
			.json(&body)
			.send()
			.await?;
		let json: Value = res.error_for_status()?.json().await?;
		if let Ok(parsed) = parse_extractor_json(json) {
			return Ok(parsed);
		}
	}

	Err(eyre::eyre!("Extractor response is not valid eligibility JSON."))
}

fn build_user_prompt(input: &ExtractionInput<'_>) -> String {
	let source_label = match input.source_type {
		SourceType::Pdf => "a PDF document",
		SourceType::Web => "a website page",
	};
	let mut meta = vec![format!(
		"Source type: {}.",
		match input.source_type {
			SourceType::Pdf => "PDF",
			SourceType::Web => "Web page",
		}
	)];

	if let Some(file_name) = input.file_name {
		meta.push(format!("File name: {file_name}"));
	}
	if let Some(title) = input.title {
		meta.push(format!("Title: {title}"));
	}
	if let Some(url) = input.url {
		meta.push(format!("URL: {url}"));
	}

	format!(
		"You are given text extracted from {source_label} describing a program for \
homeless-services or housing support.

Metadata:
{meta}

Return a JSON object with the keys program_name, raw_eligibility_text, population, \
gender_restriction, requirements, location_constraints, max_stay_days, age_range and notes. If a \
field is missing from the document, set it to null (for single values) or [] (for arrays). The \
raw_eligibility_text should be the exact excerpt from the material that contains the eligibility \
rules.

SOURCE_TEXT:
\"\"\"
{text}
\"\"\"",
		meta = meta.join("\n"),
		text = input.text,
	)
}

fn parse_extractor_json(json: Value) -> Result<Eligibility> {
	if let Some(content) = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
	{
		let parsed: Eligibility = serde_json::from_str(strip_code_fences(content))
			.map_err(|_| eyre::eyre!("Extractor content is not valid eligibility JSON."))?;

		return Ok(parsed);
	}

	if json.is_object() {
		return serde_json::from_value(json)
			.map_err(|_| eyre::eyre!("Extractor response is not valid eligibility JSON."));
	}

	Err(eyre::eyre!("Extractor response is missing JSON content."))
}

// Some models wrap JSON output in a Markdown code fence despite the prompt.
fn strip_code_fences(content: &str) -> &str {
	let trimmed = content.trim();
	let Some(inner) = trimmed.strip_prefix("```") else {
		return trimmed;
	};
	let inner = inner.strip_prefix("json").unwrap_or(inner);
	let inner = inner.strip_suffix("```").unwrap_or(inner);

	inner.trim()
}

#[cfg(test)]
mod tests {
	use haven_domain::eligibility::{GenderRestriction, Population};

	use super::*;

	#[test]
	fn parses_choice_content_json() {
		let json = serde_json::json!({
			"choices": [
				{
					"message": {
						"content": "{\"program_name\": \"Hope House\", \
							\"raw_eligibility_text\": \"Women and children only.\", \
							\"population\": [\"families\"], \
							\"gender_restriction\": \"women_only\"}"
					}
				}
			]
		});
		let parsed = parse_extractor_json(json).expect("parse failed");
		assert_eq!(parsed.program_name.as_deref(), Some("Hope House"));
		assert_eq!(parsed.population, vec![Population::Families]);
		assert_eq!(parsed.gender_restriction, GenderRestriction::WomenOnly);
	}

	#[test]
	fn parses_fenced_content() {
		let json = serde_json::json!({
			"choices": [
				{
					"message": {
						"content": "```json\n{\"raw_eligibility_text\": \"Veterans only.\"}\n```"
					}
				}
			]
		});
		let parsed = parse_extractor_json(json).expect("parse failed");
		assert_eq!(parsed.raw_eligibility_text, "Veterans only.");
	}

	#[test]
	fn parses_bare_object() {
		let json = serde_json::json!({
			"raw_eligibility_text": "Adults 18 and older.",
			"gender_restriction": null,
			"age_range": { "min": 18, "max": null },
		});
		let parsed = parse_extractor_json(json).expect("parse failed");
		assert_eq!(parsed.age_range.min, Some(18));
		assert_eq!(parsed.gender_restriction, GenderRestriction::Any);
	}

	#[test]
	fn rejects_non_json_content() {
		let json = serde_json::json!({
			"choices": [ { "message": { "content": "I could not find any rules." } } ]
		});
		assert!(parse_extractor_json(json).is_err());
	}

	#[test]
	fn user_prompt_carries_metadata() {
		let input = ExtractionInput {
			text: "Shelter beds for veterans.",
			source_type: SourceType::Web,
			file_name: None,
			title: Some("Veterans Shelter"),
			url: Some("https://example.org/shelter"),
		};
		let prompt = build_user_prompt(&input);
		assert!(prompt.contains("a website page"));
		assert!(prompt.contains("Title: Veterans Shelter"));
		assert!(prompt.contains("URL: https://example.org/shelter"));
		assert!(prompt.contains("Shelter beds for veterans."));
	}
}
