use crate::cli::CommonArgs;
use crate::github::{fetch_all_details, GitHubClient};
use crate::model::{ExportOutput, RepoFetch, Repository, UserProfile, YearFilter};
use anyhow::{anyhow, Context};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Repositories with their fetch outcomes, from the API or a snapshot file.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub login: Option<String>,
    pub profile: Option<UserProfile>,
    pub fetches: Vec<RepoFetch>,
}

impl Snapshot {
    pub fn repositories(&self) -> Vec<Repository> {
        self.fetches
            .iter()
            .cloned()
            .map(RepoFetch::into_repository)
            .collect()
    }

    pub fn failures(&self) -> usize {
        self.fetches.iter().filter(|f| f.is_failed()).count()
    }
}

pub async fn load_snapshot(common: &CommonArgs, progress: bool) -> anyhow::Result<Snapshot> {
    if let Some(path) = &common.input {
        let mut snapshot = read_snapshot(path)?;
        if snapshot.login.is_none() {
            snapshot.login = common.user.clone();
        }
        return Ok(snapshot);
    }

    let login = common
        .user
        .as_deref()
        .ok_or_else(|| anyhow!("--user is required unless --input is given"))?;
    let client = GitHubClient::new(common.credentials(), common.client_config())
        .context("Failed to build GitHub client")?;
    fetch_snapshot(&client, login, common.year_filter(), progress).await
}

pub async fn fetch_snapshot(
    client: &GitHubClient,
    login: &str,
    year: YearFilter,
    progress: bool,
) -> anyhow::Result<Snapshot> {
    let pb = if progress {
        ProgressBar::new_spinner()
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(format!("Fetching profile and repositories for {login}..."));

    let (profile, repositories) = tokio::try_join!(client.user(login), client.repositories(login))
        .with_context(|| format!("Failed to list repositories for {login}"))?;
    tracing::info!(login, repositories = repositories.len(), "listed repositories");

    pb.set_message(format!("Fetching details for {} repositories...", repositories.len()));
    let fetches = fetch_all_details(client, login, repositories, year).await;

    let failed = fetches.iter().filter(|f| f.is_failed()).count();
    if failed > 0 {
        tracing::warn!(failed, "some repositories could not be fetched; their activity counts as empty");
    }
    pb.finish_and_clear();

    Ok(Snapshot {
        login: Some(login.to_string()),
        profile: Some(profile),
        fetches,
    })
}

/// Reads an `export --json` document, or a bare JSON array of repositories
/// that already carry their activity.
pub fn read_snapshot(path: &Path) -> anyhow::Result<Snapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("Snapshot {} is not valid JSON", path.display()))?;

    if value.is_array() {
        let repositories: Vec<Repository> =
            serde_json::from_value(value).context("Failed to parse repository list")?;
        return Ok(Snapshot {
            login: None,
            profile: None,
            fetches: repositories.into_iter().map(RepoFetch::provided).collect(),
        });
    }

    let export: ExportOutput =
        serde_json::from_value(value).context("Failed to parse exported snapshot")?;
    Ok(Snapshot {
        login: export.login,
        profile: export.profile,
        fetches: export.repositories,
    })
}
