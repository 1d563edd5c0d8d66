pub mod eligibility;
pub mod interpret;
pub mod location;
pub mod search_text;
