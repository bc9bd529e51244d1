pub mod aggregate;
pub mod calendar;
pub mod exec;
pub mod output;
pub mod streak;

pub use aggregate::build_contribution_map;
pub use calendar::{build_calendar_grid, heat_cells, level_of, month_labels};
pub use exec::{exec, exec_streaks};
pub use streak::compute_streaks;
