use crate::error::{GitPulseError, Result};
use crate::model::{CommitRecord, Repository, UserProfile, YearFilter};
use crate::util::day_key;
use chrono::NaiveDate;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const MAX_PAGES: u32 = 10;

/// Token used for API calls. Always passed explicitly; never read from
/// process-wide state by the client.
#[derive(Clone, Default)]
pub struct Credentials {
    token: Option<String>,
}

impl Credentials {
    pub fn token(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token: (!token.trim().is_empty()).then_some(token),
        }
    }

    pub fn anonymous() -> Self {
        Self { token: None }
    }

    pub fn bearer(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout: Duration,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
    pub concurrency: usize,
    pub per_page: u32,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(30),
            retry_attempts: 3,
            retry_delay: Duration::from_millis(500),
            concurrency: 8,
            per_page: 100,
            user_agent: format!("gitpulse/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Deserialize)]
struct CommitItem {
    #[serde(default)]
    commit: Option<CommitPayload>,
}

#[derive(Deserialize)]
struct CommitPayload {
    #[serde(default)]
    author: Option<GitActor>,
}

#[derive(Deserialize)]
struct GitActor {
    #[serde(default)]
    date: Option<String>,
}

pub struct GitHubClient {
    http: Client,
    credentials: Credentials,
    config: ClientConfig,
}

impl GitHubClient {
    pub fn new(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        if config.concurrency == 0 {
            return Err(GitPulseError::Config("concurrency must be at least 1".to_string()));
        }
        Url::parse(&config.api_url)?;
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            http,
            credentials,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.config.api_url)?;
        url.path_segments_mut()
            .map_err(|_| GitPulseError::Config(format!("API URL cannot be a base: {}", self.config.api_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url, query: &[(&str, String)]) -> Result<T> {
        let mut delay = self.config.retry_delay;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.get_once(url, query).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt <= self.config.retry_attempts => {
                    tracing::warn!(url = %url, attempt, error = %err, "request failed, retrying");
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2);
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &Url, query: &[(&str, String)]) -> Result<T> {
        let mut request = self
            .http
            .get(url.clone())
            .query(query)
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = self.credentials.bearer() {
            request = request.bearer_auth(token);
        }

        tracing::debug!(url = %url, "GET");
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitPulseError::Api {
                status: status.as_u16(),
                message: api_message(&body),
            });
        }
        Ok(response.json::<T>().await?)
    }

    /// Follows `page` until a short page or the page cap.
    async fn get_paged<T: DeserializeOwned>(&self, url: &Url, query: &[(&str, String)]) -> Result<Vec<T>> {
        let mut items = Vec::new();
        for page in 1..=MAX_PAGES {
            let mut paged = query.to_vec();
            paged.push(("per_page", self.config.per_page.to_string()));
            paged.push(("page", page.to_string()));
            let batch: Vec<T> = self.get_json(url, &paged).await?;
            let short = (batch.len() as u32) < self.config.per_page;
            items.extend(batch);
            if short {
                break;
            }
        }
        Ok(items)
    }

    pub async fn user(&self, login: &str) -> Result<UserProfile> {
        let url = self.endpoint(&["users", login])?;
        self.get_json(&url, &[]).await
    }

    pub async fn repositories(&self, login: &str) -> Result<Vec<Repository>> {
        let url = self.endpoint(&["users", login, "repos"])?;
        self.get_paged(&url, &[("sort", "updated".to_string())]).await
    }

    pub async fn languages(&self, owner: &str, repo: &str) -> Result<BTreeMap<String, u64>> {
        let url = self.endpoint(&["repos", owner, repo, "languages"])?;
        self.get_json(&url, &[]).await
    }

    /// Commits in the filter's window, folded into one record per day.
    /// An empty repository answers 409 and yields no records.
    pub async fn commit_activity(&self, owner: &str, repo: &str, year: YearFilter) -> Result<Vec<CommitRecord>> {
        let url = self.endpoint(&["repos", owner, repo, "commits"])?;
        let mut query = Vec::new();
        if let Some((since, until)) = year.window() {
            query.push(("since", since));
            query.push(("until", until));
        }

        let items: Vec<CommitItem> = match self.get_paged(&url, &query).await {
            Ok(items) => items,
            Err(GitPulseError::Api { status, .. }) if status == StatusCode::CONFLICT.as_u16() => {
                tracing::debug!(owner, repo, "repository is empty");
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        Ok(fold_daily(items.iter().filter_map(|item| {
            item.commit
                .as_ref()
                .and_then(|c| c.author.as_ref())
                .and_then(|a| a.date.as_deref())
        })))
    }

    /// Open and closed pull requests. Counting stops after `MAX_PAGES` pages.
    pub async fn pull_count(&self, owner: &str, repo: &str) -> Result<u64> {
        let url = self.endpoint(&["repos", owner, repo, "pulls"])?;
        let pulls: Vec<serde_json::Value> = self.get_paged(&url, &[("state", "all".to_string())]).await?;
        Ok(pulls.len() as u64)
    }
}

fn fold_daily<'a>(dates: impl Iterator<Item = &'a str>) -> Vec<CommitRecord> {
    let mut per_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for day in dates.filter_map(day_key) {
        *per_day.entry(day).or_insert(0) += 1;
    }
    per_day
        .into_iter()
        .map(|(day, count)| CommitRecord::new(format!("{day}T00:00:00Z"), count))
        .collect()
}

fn api_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) => body.chars().take(200).collect(),
    }
}
