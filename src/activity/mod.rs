pub mod exec;
pub mod insights;
pub mod languages;
pub mod monthly;
pub mod overview;

pub use exec::{exec_activity, exec_languages, exec_repos};
pub use insights::{repository_insights, INSIGHTS_LIMIT};
pub use languages::{language_bytes, language_evolution, language_stats, top_language};
pub use monthly::{labelled_months, monthly_code_activity, monthly_contributions};
pub use overview::overview;
