use crate::eligibility::Eligibility;

/// US state names and their postal abbreviations, used both when deriving a
/// record's location from its constraints and when interpreting queries.
pub const STATE_NAMES: &[(&str, &str)] = &[
	("alabama", "AL"),
	("alaska", "AK"),
	("arizona", "AZ"),
	("arkansas", "AR"),
	("california", "CA"),
	("colorado", "CO"),
	("connecticut", "CT"),
	("delaware", "DE"),
	("district of columbia", "DC"),
	("florida", "FL"),
	("georgia", "GA"),
	("hawaii", "HI"),
	("idaho", "ID"),
	("illinois", "IL"),
	("indiana", "IN"),
	("iowa", "IA"),
	("kansas", "KS"),
	("kentucky", "KY"),
	("louisiana", "LA"),
	("maine", "ME"),
	("maryland", "MD"),
	("massachusetts", "MA"),
	("michigan", "MI"),
	("minnesota", "MN"),
	("mississippi", "MS"),
	("missouri", "MO"),
	("montana", "MT"),
	("nebraska", "NE"),
	("nevada", "NV"),
	("new hampshire", "NH"),
	("new jersey", "NJ"),
	("new mexico", "NM"),
	("new york", "NY"),
	("north carolina", "NC"),
	("north dakota", "ND"),
	("ohio", "OH"),
	("oklahoma", "OK"),
	("oregon", "OR"),
	("pennsylvania", "PA"),
	("rhode island", "RI"),
	("south carolina", "SC"),
	("south dakota", "SD"),
	("tennessee", "TN"),
	("texas", "TX"),
	("utah", "UT"),
	("vermont", "VT"),
	("virginia", "VA"),
	("washington", "WA"),
	("west virginia", "WV"),
	("wisconsin", "WI"),
	("wyoming", "WY"),
];

pub const KNOWN_CITIES: &[&str] = &[
	"atlanta",
	"austin",
	"baltimore",
	"boston",
	"charlotte",
	"chicago",
	"cleveland",
	"columbus",
	"dallas",
	"denver",
	"detroit",
	"fort worth",
	"houston",
	"indianapolis",
	"jacksonville",
	"kansas city",
	"las vegas",
	"los angeles",
	"miami",
	"milwaukee",
	"minneapolis",
	"nashville",
	"new orleans",
	"new york",
	"oakland",
	"oklahoma city",
	"orlando",
	"philadelphia",
	"phoenix",
	"pittsburgh",
	"plano",
	"portland",
	"sacramento",
	"san antonio",
	"san diego",
	"san francisco",
	"san jose",
	"seattle",
	"st louis",
	"tampa",
	"tucson",
	"washington",
];

pub const COUNTY_SUFFIXES: &[&str] = &["county", "parish", "borough"];

/// Best-effort split of a free-text location constraint into city/county/state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DerivedLocation {
	pub city: Option<String>,
	pub county: Option<String>,
	pub state: Option<String>,
}

/// Walks the structured record's location constraints and keeps the first one
/// that yields any signal.
pub fn derive_location(eligibility: &Eligibility) -> DerivedLocation {
	for hint in &eligibility.location_constraints {
		let parsed = parse_location_hint(hint);

		if parsed.city.is_some() || parsed.county.is_some() || parsed.state.is_some() {
			return parsed;
		}
	}

	DerivedLocation::default()
}

pub fn parse_location_hint(raw: &str) -> DerivedLocation {
	let cleaned = raw.trim();

	if cleaned.is_empty() {
		return DerivedLocation::default();
	}

	let lower = cleaned.to_lowercase();
	let normalized = normalize_spaces(cleaned);
	let state = find_state(&lower);

	if state.is_some() {
		let mut city = None;
		let mut county = None;
		let parts: Vec<&str> =
			normalized.split(['-', ',']).map(str::trim).filter(|part| !part.is_empty()).collect();

		if let Some(leading) = parts.first() {
			if is_county_string(leading) {
				county = Some(title_case(leading));
			} else {
				city = Some(title_case(leading));
			}
		}
		if city.is_none()
			&& county.is_none()
			&& let Some(second) = parts.get(1)
		{
			county = Some(title_case(second));
		}

		return DerivedLocation { city, county, state };
	}

	let mut county = None;

	if let Some(suffix) = COUNTY_SUFFIXES.iter().copied().find(|suffix| lower.contains(suffix)) {
		let before = normalized
			.to_lowercase()
			.split(suffix)
			.next()
			.map(str::trim)
			.unwrap_or_default()
			.to_string();

		if !before.is_empty() {
			county = Some(title_case(&format!("{before} {suffix}")));
		}
	}

	let city = KNOWN_CITIES
		.iter()
		.copied()
		.find(|candidate| lower.contains(candidate))
		.map(title_case);

	DerivedLocation { city, county, state: None }
}

/// Full state name first, then a bare two-letter token that is itself a valid
/// postal abbreviation.
pub fn find_state(lower: &str) -> Option<String> {
	for (name, abbreviation) in STATE_NAMES {
		if lower.contains(name) {
			return Some((*abbreviation).to_string());
		}
	}

	for token in lower.split(|ch: char| !ch.is_ascii_alphanumeric()) {
		if token.len() != 2 {
			continue;
		}

		let candidate = token.to_ascii_uppercase();

		if STATE_NAMES.iter().any(|(_, abbreviation)| *abbreviation == candidate) {
			return Some(candidate);
		}
	}

	None
}

pub fn state_abbreviation(candidate: &str) -> Option<&'static str> {
	let upper = candidate.to_ascii_uppercase();

	STATE_NAMES
		.iter()
		.find(|(_, abbreviation)| *abbreviation == upper)
		.map(|(_, abbreviation)| *abbreviation)
}

pub fn is_county_string(value: &str) -> bool {
	let lower = value.to_lowercase();

	COUNTY_SUFFIXES.iter().any(|suffix| lower.contains(suffix))
}

pub fn title_case(value: &str) -> String {
	value
		.to_lowercase()
		.split_whitespace()
		.map(|part| {
			let mut chars = part.chars();

			match chars.next() {
				Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
				None => String::new(),
			}
		})
		.collect::<Vec<_>>()
		.join(" ")
}

pub(crate) fn normalize_spaces(raw: &str) -> String {
	raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
