use crate::error::GitPulseError;
use crate::util::{lenient_count, lenient_string, null_as_default, saturating_sum};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const SCHEMA_VERSION: u32 = 1;

/// Commits of one repository on one calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub count: u64,
}

impl CommitRecord {
    pub fn new(date: impl Into<String>, count: u64) -> Self {
        Self {
            date: Some(date.into()),
            count,
        }
    }
}

/// The list endpoint only knows a commit total; the detail fetch replaces it
/// with per-day records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommitActivity {
    Daily(Vec<CommitRecord>),
    Total(u64),
}

impl Default for CommitActivity {
    fn default() -> Self {
        CommitActivity::Daily(Vec::new())
    }
}

impl CommitActivity {
    pub fn records(&self) -> &[CommitRecord] {
        match self {
            CommitActivity::Daily(records) => records,
            CommitActivity::Total(_) => &[],
        }
    }

    pub fn total(&self) -> u64 {
        match self {
            CommitActivity::Daily(records) => saturating_sum(records.iter().map(|r| r.count)),
            CommitActivity::Total(total) => *total,
        }
    }
}

fn lenient_commits<'de, D>(deserializer: D) -> std::result::Result<CommitActivity, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => CommitActivity::Daily(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        serde_json::Value::Number(n) => CommitActivity::Total(n.as_u64().unwrap_or(0)),
        _ => CommitActivity::default(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoOwner {
    #[serde(default)]
    pub login: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    #[serde(default, deserialize_with = "lenient_count")]
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub stargazers_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub forks_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub size: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fork: bool,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub updated_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pushed_at: Option<String>,
    #[serde(default)]
    pub owner: Option<RepoOwner>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages: BTreeMap<String, u64>,
    #[serde(default, deserialize_with = "lenient_commits")]
    pub commits: CommitActivity,
    #[serde(default, deserialize_with = "lenient_count")]
    pub pulls: u64,
}

impl Repository {
    pub fn owner_login(&self) -> Option<&str> {
        self.owner
            .as_ref()
            .map(|o| o.login.as_str())
            .filter(|login| !login.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub blog: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub followers: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub following: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub public_repos: u64,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl UserProfile {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.login)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoDetails {
    pub languages: BTreeMap<String, u64>,
    pub commits: Vec<CommitRecord>,
    pub pulls: u64,
}

/// Outcome of fetching one repository's details. A failed fetch keeps the
/// repository and records the error instead of dropping either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoFetch {
    pub repo: Repository,
    #[serde(default)]
    pub details: Option<RepoDetails>,
    #[serde(default)]
    pub error: Option<String>,
}

impl RepoFetch {
    pub fn fetched(repo: Repository, details: RepoDetails) -> Self {
        Self {
            repo,
            details: Some(details),
            error: None,
        }
    }

    pub fn failed(repo: Repository, error: impl Into<String>) -> Self {
        Self {
            repo,
            details: None,
            error: Some(error.into()),
        }
    }

    /// A repository taken as-is, e.g. from a snapshot that already carries
    /// its activity.
    pub fn provided(repo: Repository) -> Self {
        Self {
            repo,
            details: None,
            error: None,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Flattens into a repository, substituting empty activity when the
    /// detail fetch failed.
    pub fn into_repository(self) -> Repository {
        let mut repo = self.repo;
        match (self.details, self.error) {
            (Some(details), _) => {
                repo.languages = details.languages;
                repo.commits = CommitActivity::Daily(details.commits);
                repo.pulls = details.pulls;
            }
            (None, Some(_)) => {
                repo.languages = BTreeMap::new();
                repo.commits = CommitActivity::default();
                repo.pulls = 0;
            }
            (None, None) => {}
        }
        repo
    }
}

/// A single calendar year or no restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum YearFilter {
    All,
    Year(i32),
}

impl YearFilter {
    pub fn year(&self) -> Option<i32> {
        match self {
            YearFilter::All => None,
            YearFilter::Year(y) => Some(*y),
        }
    }

    pub fn matches(&self, day: NaiveDate) -> bool {
        match self {
            YearFilter::All => true,
            YearFilter::Year(y) => day.year() == *y,
        }
    }

    /// `since`/`until` bounds for the commits endpoint.
    pub fn window(&self) -> Option<(String, String)> {
        self.year().map(|y| {
            (
                format!("{y:04}-01-01T00:00:00Z"),
                format!("{y:04}-12-31T23:59:59Z"),
            )
        })
    }
}

impl fmt::Display for YearFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearFilter::All => f.write_str("all"),
            YearFilter::Year(y) => write!(f, "{y:04}"),
        }
    }
}

impl FromStr for YearFilter {
    type Err = GitPulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(YearFilter::All);
        }
        if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
            let year = s
                .parse()
                .map_err(|_| GitPulseError::InvalidYear(s.to_string()))?;
            return Ok(YearFilter::Year(year));
        }
        Err(GitPulseError::InvalidYear(s.to_string()))
    }
}

impl TryFrom<String> for YearFilter {
    type Error = GitPulseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearFilter> for String {
    fn from(filter: YearFilter) -> Self {
        filter.to_string()
    }
}

/// Day to summed commit count. Ordered by day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContributionMap {
    days: BTreeMap<NaiveDate, u64>,
}

impl ContributionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, day: NaiveDate, count: u64) {
        let total = self.days.entry(day).or_insert(0);
        *total = total.saturating_add(count);
    }

    pub fn get(&self, day: NaiveDate) -> u64 {
        self.days.get(&day).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        saturating_sum(self.days.values().copied())
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, u64)> + '_ {
        self.days.iter().map(|(day, count)| (*day, *count))
    }

    /// Days with at least one contribution, ascending.
    pub fn active_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.iter().filter(|(_, count)| *count > 0).map(|(day, _)| day)
    }
}

impl FromIterator<(NaiveDate, u64)> for ContributionMap {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, u64)>>(iter: I) -> Self {
        let mut map = ContributionMap::new();
        for (day, count) in iter {
            map.add(day, count);
        }
        map
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakStats {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_commits: u64,
}

/// Sunday-first week rows; `None` marks slots outside the rendered range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarGrid {
    pub year: i32,
    pub weeks: Vec<[Option<NaiveDate>; 7]>,
}

impl CalendarGrid {
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.weeks.iter().flat_map(|week| week.iter().flatten().copied())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthLabel {
    pub month: String,
    pub week_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatCell {
    pub date: NaiveDate,
    pub count: u64,
    pub level: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub login: Option<String>,
    pub year: YearFilter,
    pub today: NaiveDate,
    pub stats: StreakStats,
    pub months: Vec<MonthLabel>,
    pub weeks: Vec<[Option<HeatCell>; 7]>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StreaksOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub login: Option<String>,
    pub year: YearFilter,
    pub today: NaiveDate,
    pub stats: StreakStats,
    pub contributions: ContributionMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageShare {
    pub language: String,
    pub bytes: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub repos_count: usize,
    pub languages_count: usize,
    pub total_stars: u64,
    pub total_forks: u64,
    pub total_prs: u64,
    pub total_commits: u64,
    pub total_bytes: u64,
    pub average_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCode {
    pub month: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub login: Option<String>,
    pub year: YearFilter,
    pub overview: Overview,
    pub monthly_contributions: BTreeMap<String, u64>,
    pub monthly_code_activity: Vec<MonthlyCode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguagesOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub login: Option<String>,
    pub languages: Vec<LanguageShare>,
    pub evolution: BTreeMap<i32, BTreeMap<String, u64>>,
}

/// Repository measure used to rank repositories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InsightMetric {
    /// Repository size in KB
    #[default]
    Size,
    Stars,
    Forks,
    /// Sum of language bytes
    Loc,
}

impl InsightMetric {
    pub fn value_of(&self, repo: &Repository) -> u64 {
        match self {
            InsightMetric::Size => repo.size,
            InsightMetric::Stars => repo.stargazers_count,
            InsightMetric::Forks => repo.forks_count,
            InsightMetric::Loc => saturating_sum(repo.languages.values().copied()),
        }
    }
}

impl fmt::Display for InsightMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InsightMetric::Size => "size",
            InsightMetric::Stars => "stars",
            InsightMetric::Forks => "forks",
            InsightMetric::Loc => "loc",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoInsight {
    pub name: String,
    pub size: u64,
    pub stars: u64,
    pub forks: u64,
    pub loc: u64,
    pub value: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsightsOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub login: Option<String>,
    pub metric: InsightMetric,
    pub filter: Option<String>,
    pub ascending: bool,
    pub repositories: Vec<RepoInsight>,
}

/// Snapshot written by `export --json` and accepted back through `--input`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub login: Option<String>,
    pub year: YearFilter,
    #[serde(default)]
    pub profile: Option<UserProfile>,
    pub repositories: Vec<RepoFetch>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn year_filter_parses_year_and_all() {
        assert_eq!("2024".parse::<YearFilter>().unwrap(), YearFilter::Year(2024));
        assert_eq!("ALL".parse::<YearFilter>().unwrap(), YearFilter::All);
        assert!("24".parse::<YearFilter>().is_err());
        assert!("20x4".parse::<YearFilter>().is_err());
        assert!("+202".parse::<YearFilter>().is_err());
        assert_eq!(YearFilter::Year(2023).to_string(), "2023");
    }

    #[test]
    fn year_filter_window_covers_whole_year() {
        let (since, until) = YearFilter::Year(2023).window().unwrap();
        assert_eq!(since, "2023-01-01T00:00:00Z");
        assert_eq!(until, "2023-12-31T23:59:59Z");
        assert_eq!(YearFilter::All.window(), None);
    }

    #[test]
    fn repository_tolerates_malformed_fields() {
        let raw = serde_json::json!({
            "id": 7,
            "name": "demo",
            "created_at": "2023-04-01T00:00:00Z",
            "stargazers_count": -3,
            "languages": null,
            "commits": [
                { "date": "2023-04-02T10:00:00Z", "count": 2 },
                { "date": 12, "count": "x" },
                { "count": 1 },
                "garbage"
            ]
        });
        let repo: Repository = serde_json::from_value(raw).unwrap();
        assert_eq!(repo.stargazers_count, 0);
        assert!(repo.languages.is_empty());
        assert_eq!(
            repo.commits.records(),
            &[
                CommitRecord::new("2023-04-02T10:00:00Z", 2),
                CommitRecord { date: None, count: 0 },
                CommitRecord { date: None, count: 1 },
            ]
        );
    }

    #[test]
    fn repository_accepts_plain_commit_total() {
        let repo: Repository =
            serde_json::from_value(serde_json::json!({ "name": "x", "commits": 42 })).unwrap();
        assert_eq!(repo.commits, CommitActivity::Total(42));
        assert!(repo.commits.records().is_empty());
        assert_eq!(repo.commits.total(), 42);
    }

    #[test]
    fn failed_fetch_flattens_to_empty_activity() {
        let repo = Repository {
            name: "r".into(),
            commits: CommitActivity::Total(9),
            pulls: 4,
            languages: BTreeMap::from([("Rust".to_string(), 10)]),
            ..Default::default()
        };
        let flattened = RepoFetch::failed(repo.clone(), "boom").into_repository();
        assert_eq!(flattened.commits, CommitActivity::default());
        assert_eq!(flattened.pulls, 0);
        assert!(flattened.languages.is_empty());

        let kept = RepoFetch::provided(repo.clone()).into_repository();
        assert_eq!(kept, repo);
    }

    #[test]
    fn contribution_map_serializes_with_day_keys() {
        let map: ContributionMap = [
            (NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 3),
            (NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 1),
        ]
        .into_iter()
        .collect();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"2024-01-01":1,"2024-01-02":3}"#);
    }
}
