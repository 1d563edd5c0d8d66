//! Cascade accumulation. Stage outputs are folded into an ordered,
//! first-write-wins collection keyed by record id, so a record always keeps
//! the stage that found it first.

use std::collections::HashSet;

use uuid::Uuid;

use haven_storage::models::CandidateRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
	Localized,
	Relaxed,
	Fuzzy,
	Fallback,
}
impl Stage {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Localized => "localized",
			Self::Relaxed => "relaxed",
			Self::Fuzzy => "fuzzy",
			Self::Fallback => "fallback",
		}
	}
}

/// Decides which stages run, from how much the earlier ones accumulated.
/// Localized needs a locality hint; relaxed runs while strong matches are
/// scarce; fuzzy and fallback each run only while the page is still short.
#[derive(Clone, Copy, Debug)]
pub struct CascadeTriggers {
	pub min_strong_matches: usize,
	pub limit: usize,
}
impl CascadeTriggers {
	pub fn localized(&self, has_locality: bool) -> bool {
		has_locality
	}

	pub fn relaxed(&self, accumulated: usize) -> bool {
		accumulated < self.min_strong_matches
	}

	pub fn backfill(&self, accumulated: usize) -> bool {
		accumulated < self.limit
	}
}

/// One candidate along with the stage that first produced it.
#[derive(Debug, Clone)]
pub struct StagedCandidate {
	pub stage: Stage,
	pub row: CandidateRow,
}

#[derive(Default)]
pub struct MergeState {
	items: Vec<StagedCandidate>,
	seen: HashSet<Uuid>,
	stages_fired: Vec<Stage>,
}
impl MergeState {
	/// Folds one stage's rows in. Rows whose record id was already seen are
	/// dropped; the stage is recorded as fired when it yielded any rows.
	pub fn fold(&mut self, stage: Stage, rows: Vec<CandidateRow>) {
		if !rows.is_empty() {
			self.stages_fired.push(stage);
		}

		for row in rows {
			if self.seen.insert(row.record_id) {
				self.items.push(StagedCandidate { stage, row });
			}
		}
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn stages_fired(&self) -> Vec<&'static str> {
		self.stages_fired.iter().map(|stage| stage.as_str()).collect()
	}

	pub fn into_items(self) -> Vec<StagedCandidate> {
		self.items
	}
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	fn row(record_id: Uuid) -> CandidateRow {
		CandidateRow {
			record_id,
			program_name: Some("Test Program".to_string()),
			source_type: "web".to_string(),
			source_url: None,
			page_title: None,
			created_at: datetime!(2026-01-01 00:00 UTC),
			raw_eligibility_text: "Open to all.".to_string(),
			search_text: "test program open to all".to_string(),
			location_city: None,
			location_county: None,
			location_state: None,
			eligibility_json: serde_json::json!({}),
			rank: None,
			similarity: None,
		}
	}

	#[test]
	fn localized_requires_a_locality_hint() {
		let triggers = CascadeTriggers { min_strong_matches: 5, limit: 20 };

		assert!(triggers.localized(true));
		assert!(!triggers.localized(false));
	}

	#[test]
	fn relaxed_stops_once_strong_matches_accumulate() {
		let triggers = CascadeTriggers { min_strong_matches: 5, limit: 20 };

		assert!(triggers.relaxed(0));
		assert!(triggers.relaxed(4));
		assert!(!triggers.relaxed(5));
		assert!(!triggers.relaxed(6));
	}

	#[test]
	fn backfill_stages_are_skipped_once_the_page_is_full() {
		let triggers = CascadeTriggers { min_strong_matches: 5, limit: 3 };

		assert!(triggers.backfill(0));
		assert!(triggers.backfill(2));
		assert!(!triggers.backfill(3));
		assert!(!triggers.backfill(4));
	}

	#[test]
	fn fallback_does_not_fire_when_earlier_stages_fill_the_page() {
		let triggers = CascadeTriggers { min_strong_matches: 2, limit: 2 };
		let mut state = MergeState::default();

		state.fold(Stage::Localized, vec![row(Uuid::new_v4()), row(Uuid::new_v4())]);

		assert!(!triggers.relaxed(state.len()));
		assert!(!triggers.backfill(state.len()));
		assert_eq!(state.stages_fired(), vec!["localized"]);
	}

	#[test]
	fn first_stage_wins_on_duplicate_ids() {
		let id = Uuid::new_v4();
		let mut state = MergeState::default();

		state.fold(Stage::Localized, vec![row(id)]);
		state.fold(Stage::Fuzzy, vec![row(id)]);

		assert_eq!(state.len(), 1);
		assert_eq!(state.into_items()[0].stage, Stage::Localized);
	}

	#[test]
	fn accumulation_is_monotonic() {
		let first = Uuid::new_v4();
		let second = Uuid::new_v4();
		let mut state = MergeState::default();

		state.fold(Stage::Relaxed, vec![row(first)]);

		let after_first = state.len();

		state.fold(Stage::Fallback, vec![row(first), row(second)]);

		assert!(state.len() >= after_first);
		assert_eq!(state.len(), 2);
	}

	#[test]
	fn empty_stage_is_not_recorded_as_fired() {
		let mut state = MergeState::default();

		state.fold(Stage::Localized, Vec::new());
		state.fold(Stage::Relaxed, vec![row(Uuid::new_v4())]);

		assert_eq!(state.stages_fired(), vec!["relaxed"]);
	}

	#[test]
	fn preserves_stage_order_across_folds() {
		let mut state = MergeState::default();

		state.fold(Stage::Localized, vec![row(Uuid::new_v4())]);
		state.fold(Stage::Relaxed, vec![row(Uuid::new_v4())]);
		state.fold(Stage::Fuzzy, vec![row(Uuid::new_v4())]);

		assert_eq!(state.stages_fired(), vec!["localized", "relaxed", "fuzzy"]);

		let stages: Vec<Stage> = state.into_items().into_iter().map(|item| item.stage).collect();

		assert_eq!(stages, vec![Stage::Localized, Stage::Relaxed, Stage::Fuzzy]);
	}
}
