use serde::{Deserialize, Serialize};

/// Structured eligibility rules extracted from one ingested document.
///
/// Every field mirrors what the document states explicitly; the extractor is
/// instructed never to infer beyond the text, so absent information stays
/// `None`/empty rather than being guessed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Eligibility {
	#[serde(default)]
	pub program_name: Option<String>,
	/// Verbatim excerpt that states the eligibility rules. Must be non-empty
	/// for a document to be persisted at all.
	pub raw_eligibility_text: String,
	#[serde(default)]
	pub population: Vec<Population>,
	/// `null` from the extractor means "no stated restriction", not an error.
	#[serde(default, deserialize_with = "gender_or_default")]
	pub gender_restriction: GenderRestriction,
	#[serde(default)]
	pub requirements: Vec<Requirement>,
	/// Free-text location constraints, e.g. "Dallas County, TX".
	#[serde(default)]
	pub location_constraints: Vec<String>,
	#[serde(default)]
	pub max_stay_days: Option<u32>,
	#[serde(default)]
	pub age_range: AgeRange,
	#[serde(default)]
	pub notes: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
	pub min: Option<u32>,
	pub max: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Population {
	SingleAdults,
	Families,
	Youth,
	Veterans,
	Seniors,
	Any,
}
impl Population {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::SingleAdults => "single_adults",
			Self::Families => "families",
			Self::Youth => "youth",
			Self::Veterans => "veterans",
			Self::Seniors => "seniors",
			Self::Any => "any",
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenderRestriction {
	#[default]
	Any,
	WomenOnly,
	MenOnly,
	NonMale,
	NonFemale,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
	Sober,
	IdRequired,
	BackgroundCheck,
	IncomeLimit,
	MustBeResident,
	MustBeVeteran,
	MustHaveChild,
}
impl Requirement {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Sober => "sober",
			Self::IdRequired => "id_required",
			Self::BackgroundCheck => "background_check",
			Self::IncomeLimit => "income_limit",
			Self::MustBeResident => "must_be_resident",
			Self::MustBeVeteran => "must_be_veteran",
			Self::MustHaveChild => "must_have_child",
		}
	}
}

fn gender_or_default<'de, D>(deserializer: D) -> Result<GenderRestriction, D::Error>
where
	D: serde::Deserializer<'de>,
{
	let raw = Option::<GenderRestriction>::deserialize(deserializer)?;

	Ok(raw.unwrap_or_default())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
	Pdf,
	Web,
}
impl SourceType {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Pdf => "pdf",
			Self::Web => "web",
		}
	}
}
impl std::str::FromStr for SourceType {
	type Err = String;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw {
			"pdf" => Ok(Self::Pdf),
			"web" => Ok(Self::Web),
			other => Err(format!("Unknown source type: {other}.")),
		}
	}
}
