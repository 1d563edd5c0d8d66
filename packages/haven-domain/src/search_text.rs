use crate::{
	eligibility::Eligibility,
	location::{DerivedLocation, normalize_spaces},
};

/// Inputs for the search surrogate; one per ingested record.
pub struct SearchTextInput<'a> {
	pub program_name: Option<&'a str>,
	pub page_title: Option<&'a str>,
	pub eligibility: &'a Eligibility,
	pub raw_eligibility_text: &'a str,
	pub location: &'a DerivedLocation,
}

/// Concatenates every searchable facet of a record into one
/// whitespace-normalized string. The database derives its full-text index
/// from this value alone, so anything that should be findable must be here.
pub fn build_search_text(input: &SearchTextInput<'_>) -> String {
	let population: Vec<&str> =
		input.eligibility.population.iter().map(|tag| tag.as_str()).collect();
	let requirements: Vec<&str> =
		input.eligibility.requirements.iter().map(|tag| tag.as_str()).collect();
	let population = population.join(" ");
	let requirements = requirements.join(" ");
	let constraints = input.eligibility.location_constraints.join(" ");
	let pieces: [Option<&str>; 11] = [
		input.program_name,
		input.eligibility.program_name.as_deref(),
		input.page_title,
		input.location.city.as_deref(),
		input.location.county.as_deref(),
		input.location.state.as_deref(),
		Some(population.as_str()),
		Some(requirements.as_str()),
		Some(constraints.as_str()),
		Some(input.eligibility.notes.as_str()),
		Some(input.raw_eligibility_text),
	];

	pieces
		.into_iter()
		.flatten()
		.map(normalize_spaces)
		.filter(|piece| !piece.is_empty())
		.collect::<Vec<_>>()
		.join(" ")
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		eligibility::{Eligibility, Population, Requirement},
		location::DerivedLocation,
	};

	#[test]
	fn joins_pieces_and_collapses_whitespace() {
		let eligibility = Eligibility {
			program_name: Some("Family   Gateway".to_string()),
			raw_eligibility_text: "Families  with children\nonly.".to_string(),
			population: vec![Population::Families],
			requirements: vec![Requirement::MustHaveChild],
			location_constraints: vec!["Dallas County, TX".to_string()],
			notes: "Call ahead.".to_string(),
			..Eligibility::default()
		};
		let location = DerivedLocation {
			city: None,
			county: Some("Dallas County".to_string()),
			state: Some("TX".to_string()),
		};
		let text = build_search_text(&SearchTextInput {
			program_name: None,
			page_title: Some("Family Gateway Intake"),
			eligibility: &eligibility,
			raw_eligibility_text: &eligibility.raw_eligibility_text,
			location: &location,
		});

		assert_eq!(
			text,
			"Family Gateway Family Gateway Intake Dallas County TX families must_have_child \
			 Dallas County, TX Call ahead. Families with children only."
		);
	}

	#[test]
	fn empty_pieces_are_dropped() {
		let eligibility =
			Eligibility { raw_eligibility_text: "Veterans only.".to_string(), ..Default::default() };
		let text = build_search_text(&SearchTextInput {
			program_name: None,
			page_title: None,
			eligibility: &eligibility,
			raw_eligibility_text: &eligibility.raw_eligibility_text,
			location: &DerivedLocation::default(),
		});

		assert_eq!(text, "Veterans only.");
	}
}
