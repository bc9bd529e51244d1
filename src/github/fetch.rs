use super::client::GitHubClient;
use crate::error::Result;
use crate::model::{RepoDetails, RepoFetch, Repository, YearFilter};
use futures::stream::{self, StreamExt};

/// Languages, commit activity and pull count for one repository, requested
/// concurrently. Any failure fails the whole detail set.
pub async fn fetch_details(
    client: &GitHubClient,
    login: &str,
    repo: &Repository,
    year: YearFilter,
) -> Result<RepoDetails> {
    let owner = repo.owner_login().unwrap_or(login);
    let name = repo.name.as_str();

    let (languages, commits, pulls) = tokio::try_join!(
        client.languages(owner, name),
        client.commit_activity(owner, name, year),
        client.pull_count(owner, name),
    )?;

    Ok(RepoDetails {
        languages,
        commits,
        pulls,
    })
}

/// Fetches details for every repository with bounded concurrency. The result
/// has one entry per input repository, in input order; failures are recorded
/// per entry and never abort the batch.
pub async fn fetch_all_details(
    client: &GitHubClient,
    login: &str,
    repositories: Vec<Repository>,
    year: YearFilter,
) -> Vec<RepoFetch> {
    let concurrency = client.config().concurrency.max(1);

    stream::iter(repositories)
        .map(|repo| async move {
            match fetch_details(client, login, &repo, year).await {
                Ok(details) => RepoFetch::fetched(repo, details),
                Err(err) => {
                    tracing::warn!(repo = %repo.name, error = %err, "failed to fetch repository details");
                    RepoFetch::failed(repo, err.to_string())
                }
            }
        })
        .buffered(concurrency)
        .collect()
        .await
}
