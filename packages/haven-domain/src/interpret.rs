//! Query interpretation: turns a free-text query plus optional explicit
//! filters into structured [`QueryHints`] for the retrieval cascade.
//!
//! The vocabularies and prepositional patterns here are data, not control
//! flow. They are deliberately simple substring heuristics; the cascade is
//! designed to degrade gracefully when they misfire.

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::location::{self, COUNTY_SUFFIXES, STATE_NAMES, title_case};

/// Prepositional patterns tried in order against the lowercase query to guess
/// a city. The capture is the city candidate.
const CITY_PATTERNS: &[&str] = &[
	r"\bin ([a-z][a-z .'-]*?),",
	r"\bin ([a-z][a-z .'-]*?)$",
	r"\bnear ([a-z][a-z .'-]*?),",
	r"\bnear ([a-z][a-z .'-]*?)$",
	r"\baround ([a-z][a-z .'-]*?)$",
	r"\bfor ([a-z][a-z .'-]*?),",
];

// One or two tokens followed by a county-style suffix. A leading preposition
// caught by the two-token form is stripped after matching.
const COUNTY_PATTERN: &str = r"\b([a-z][a-z'.-]*(?: [a-z][a-z'.-]*)?\s(?:county|parish|borough))\b";

/// Population vocabulary: (query term, canonical tag). Several surface terms
/// collapse onto one tag so hints line up with the structured enum values.
const POPULATION_TERMS: &[(&str, &str)] = &[
	("youth", "youth"),
	("teen boys", "youth"),
	("teen girls", "youth"),
	("teens", "youth"),
	("teen", "youth"),
	("children", "youth"),
	("kids", "youth"),
	("families", "families"),
	("family", "families"),
	("women", "women"),
	("men", "men"),
	("lgbtq", "lgbtq"),
	("veterans", "veterans"),
	("veteran", "veterans"),
	("seniors", "seniors"),
];

const NEED_TERMS: &[&str] = &[
	"rapid rehousing",
	"shelter",
	"housing",
	"voucher",
	"bed",
	"food",
	"meal",
	"clothing",
	"rent",
	"utility",
];

const STOPWORDS: &[&str] = &[
	"a", "about", "an", "and", "any", "are", "around", "assistance", "at", "be", "but", "by",
	"can", "do", "does", "for", "from", "get", "has", "have", "help", "how", "i", "in", "is",
	"it", "its", "looking", "me", "my", "near", "need", "needs", "no", "of", "on", "or", "our",
	"program", "programs", "services", "so", "some", "that", "the", "their", "them", "there",
	"they", "this", "to", "want", "was", "we", "what", "when", "where", "which", "who", "will",
	"with", "you", "your",
];

/// Structured interpretation of a free-text query.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct QueryHints {
	/// Original query, trimmed but case-preserved for full-text matching.
	pub query: String,
	#[serde(skip)]
	pub normalized: String,
	pub keywords: Vec<String>,
	pub city: Option<String>,
	pub county: Option<String>,
	pub state: Option<String>,
	pub populations: Vec<String>,
	pub need_types: Vec<String>,
}
impl QueryHints {
	pub fn has_locality(&self) -> bool {
		self.city.is_some() || self.county.is_some()
	}
}

/// Caller-supplied filter overrides. Explicit values always beat inferred
/// ones per field.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ExplicitFilters {
	#[serde(default)]
	pub location_city: Option<String>,
	#[serde(default)]
	pub location_county: Option<String>,
	#[serde(default)]
	pub state: Option<String>,
	#[serde(default)]
	pub populations: Vec<String>,
	#[serde(default)]
	pub need_types: Vec<String>,
}

pub struct Interpreter {
	city_patterns: Vec<Regex>,
	county_pattern: Regex,
	stopwords: HashSet<&'static str>,
	vocabulary_tokens: HashSet<&'static str>,
}

impl Default for Interpreter {
	fn default() -> Self {
		Self::new()
	}
}

impl Interpreter {
	pub fn new() -> Self {
		let city_patterns = CITY_PATTERNS
			.iter()
			.map(|pattern| Regex::new(pattern).expect("City pattern must compile."))
			.collect();
		let county_pattern = Regex::new(COUNTY_PATTERN).expect("County pattern must compile.");
		let stopwords = STOPWORDS.iter().copied().collect();
		let mut vocabulary_tokens = HashSet::new();

		for (term, _) in POPULATION_TERMS {
			vocabulary_tokens.extend(term.split_whitespace());
		}
		for term in NEED_TERMS {
			vocabulary_tokens.extend(term.split_whitespace());
		}

		Self { city_patterns, county_pattern, stopwords, vocabulary_tokens }
	}

	/// Total function: interpretation never fails. Missing signals degrade to
	/// `None`/empty, which pushes the cascade toward the broader stages.
	pub fn interpret(&self, query: &str, filters: &ExplicitFilters) -> QueryHints {
		let query = query.trim().to_string();
		let normalized = query.to_lowercase();
		let county = self.guess_county(&normalized);
		let city = self.guess_city(&normalized, county.as_deref());
		let state = self.guess_state(&normalized);
		let populations = matched_population_tags(&normalized);
		let need_types = matched_need_tags(&normalized);
		let keywords = self.extract_keywords(&normalized);
		let mut hints = QueryHints {
			query,
			normalized,
			keywords,
			city,
			county,
			state,
			populations,
			need_types,
		};

		apply_explicit_filters(&mut hints, filters);

		hints
	}

	fn guess_city(&self, normalized: &str, county: Option<&str>) -> Option<String> {
		for pattern in &self.city_patterns {
			let Some(captures) = pattern.captures(normalized) else { continue };
			let mut tokens: Vec<&str> = captures
				.get(1)
				.map(|m| m.as_str().trim())
				.unwrap_or_default()
				.split_whitespace()
				.collect();

			// "in plano tx" captures the state token too; peel it off.
			while let Some(last) = tokens.last().copied()
				&& (last.len() == 2 && location::state_abbreviation(last).is_some()
					|| STATE_NAMES.iter().any(|(name, _)| *name == last))
			{
				tokens.pop();
			}

			let candidate = tokens.join(" ");

			if candidate.is_empty() {
				continue;
			}
			// A captured county or state name is not a city.
			if COUNTY_SUFFIXES.iter().any(|suffix| candidate.ends_with(suffix)) {
				continue;
			}
			if STATE_NAMES.iter().any(|(name, _)| *name == candidate) {
				continue;
			}
			if let Some(county) = county
				&& county.to_lowercase().contains(candidate.as_str())
			{
				continue;
			}

			return Some(title_case(&candidate));
		}

		None
	}

	fn guess_county(&self, normalized: &str) -> Option<String> {
		let captures = self.county_pattern.captures(normalized)?;
		let candidate = captures.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
		// The two-token form can swallow the word before the county name
		// ("in dallas county", "shelter collin county"); drop leading tokens
		// that are clearly not part of it.
		let tokens: Vec<&str> = candidate
			.split_whitespace()
			.skip_while(|token| {
				self.stopwords.contains(token) || self.vocabulary_tokens.contains(token)
			})
			.collect();

		if tokens.len() < 2 {
			return None;
		}

		Some(title_case(&tokens.join(" ")))
	}

	fn guess_state(&self, normalized: &str) -> Option<String> {
		for (name, abbreviation) in STATE_NAMES {
			if normalized.contains(name) {
				return Some((*abbreviation).to_string());
			}
		}

		// Bare two-letter fallback. Stopwords are excluded so ordinary words
		// like "in" or "or" do not read as Indiana or Oregon.
		for token in normalized.split(|ch: char| !ch.is_ascii_alphanumeric()) {
			if token.len() != 2 || self.stopwords.contains(token) {
				continue;
			}
			if let Some(abbreviation) = location::state_abbreviation(token) {
				return Some(abbreviation.to_string());
			}
		}

		None
	}

	fn extract_keywords(&self, normalized: &str) -> Vec<String> {
		let mut out = Vec::new();
		let mut seen = HashSet::new();

		for token in normalized.split(|ch: char| !ch.is_ascii_alphanumeric()) {
			if token.len() <= 2
				|| self.stopwords.contains(token)
				|| self.vocabulary_tokens.contains(token)
			{
				continue;
			}
			if seen.insert(token.to_string()) {
				out.push(token.to_string());
			}
		}

		out
	}
}

fn matched_population_tags(normalized: &str) -> Vec<String> {
	let mut out = Vec::new();

	for (term, tag) in POPULATION_TERMS {
		if normalized.contains(term) && !out.iter().any(|existing| existing == tag) {
			out.push((*tag).to_string());
		}
	}

	out
}

fn matched_need_tags(normalized: &str) -> Vec<String> {
	let mut out = Vec::new();

	for term in NEED_TERMS {
		if normalized.contains(term) && !out.iter().any(|existing| existing == term) {
			out.push((*term).to_string());
		}
	}

	out
}

fn apply_explicit_filters(hints: &mut QueryHints, filters: &ExplicitFilters) {
	if let Some(city) = non_empty(filters.location_city.as_deref()) {
		hints.city = Some(city);
	}
	if let Some(county) = non_empty(filters.location_county.as_deref()) {
		hints.county = Some(county);
	}
	if let Some(state) = non_empty(filters.state.as_deref()) {
		hints.state = Some(state.to_ascii_uppercase());
	}

	hints.populations = union_case_insensitive(&filters.populations, &hints.populations);
	hints.need_types = union_case_insensitive(&filters.need_types, &hints.need_types);
}

/// Explicit values lead, inferred ones follow; duplicates are dropped
/// case-insensitively while the first-seen casing is preserved.
fn union_case_insensitive(explicit: &[String], inferred: &[String]) -> Vec<String> {
	let mut out = Vec::new();
	let mut seen = HashSet::new();

	for value in explicit.iter().chain(inferred) {
		let trimmed = value.trim();

		if trimmed.is_empty() {
			continue;
		}
		if seen.insert(trimmed.to_lowercase()) {
			out.push(trimmed.to_string());
		}
	}

	out
}

fn non_empty(raw: Option<&str>) -> Option<String> {
	raw.map(str::trim).filter(|value| !value.is_empty()).map(str::to_string)
}
