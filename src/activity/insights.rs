use crate::model::{InsightMetric, RepoInsight, Repository};
use std::cmp::Reverse;

pub const INSIGHTS_LIMIT: usize = 10;

/// Top repositories by `metric`, largest first unless `ascending`.
///
/// `filter` keeps repositories whose name contains it, ignoring case. Ties
/// keep the input order.
pub fn repository_insights(
    repositories: &[Repository],
    metric: InsightMetric,
    filter: Option<&str>,
    ascending: bool,
) -> Vec<RepoInsight> {
    let needle = filter.map(str::to_lowercase).unwrap_or_default();

    let mut insights: Vec<RepoInsight> = repositories
        .iter()
        .filter(|repo| repo.name.to_lowercase().contains(&needle))
        .map(|repo| RepoInsight {
            name: repo.name.clone(),
            size: repo.size,
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            loc: InsightMetric::Loc.value_of(repo),
            value: metric.value_of(repo),
        })
        .collect();

    if ascending {
        insights.sort_by_key(|insight| insight.value);
    } else {
        insights.sort_by_key(|insight| Reverse(insight.value));
    }
    insights.truncate(INSIGHTS_LIMIT);
    insights
}
