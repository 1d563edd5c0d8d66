/// The schema is applied statement-by-statement by [`crate::db::Db::ensure_schema`];
/// keep every statement free of embedded semicolons.
pub fn render_schema() -> &'static str {
	include_str!("../sql/init.sql")
}
