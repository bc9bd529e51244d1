use super::languages::language_bytes;
use crate::model::{Overview, Repository};
use crate::util::saturating_sum;

pub fn overview(repositories: &[Repository]) -> Overview {
    let languages = language_bytes(repositories);
    let total_bytes = saturating_sum(languages.values().copied());
    let repos_count = repositories.len();

    Overview {
        repos_count,
        languages_count: languages.len(),
        total_stars: saturating_sum(repositories.iter().map(|r| r.stargazers_count)),
        total_forks: saturating_sum(repositories.iter().map(|r| r.forks_count)),
        total_prs: saturating_sum(repositories.iter().map(|r| r.pulls)),
        total_commits: saturating_sum(repositories.iter().map(|r| r.commits.total())),
        total_bytes,
        average_bytes: if repos_count > 0 {
            total_bytes / repos_count as u64
        } else {
            0
        },
    }
}
