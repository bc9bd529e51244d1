use crate::model::{ContributionMap, Repository, YearFilter};
use crate::util::day_key;

/// Sums per-day commit counts across all repositories.
///
/// Records without a date, or whose date does not start with a valid
/// `YYYY-MM-DD`, are skipped. With a specific year only days of that year are
/// kept.
pub fn build_contribution_map(repositories: &[Repository], year_filter: YearFilter) -> ContributionMap {
    let mut map = ContributionMap::new();

    for record in repositories.iter().flat_map(|repo| repo.commits.records()) {
        let Some(day) = record.date.as_deref().and_then(day_key) else {
            continue;
        };
        if !year_filter.matches(day) {
            continue;
        }
        map.add(day, record.count);
    }

    map
}
