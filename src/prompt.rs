use crate::activity::{language_stats, monthly_contributions, top_language};
use crate::cli::CommonArgs;
use crate::contrib::output::output_json;
use crate::error::Result;
use crate::model::{LanguageShare, Repository, UserProfile};
use crate::source::load_snapshot;
use crate::util::{parse_timestamp, saturating_sum};
use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeMap;

pub const MODEL_NAME: &str = "gemini-1.5-flash";

pub const SYSTEM_PROMPT_TEMPLATE: &str = "You are a pro GitHub AI assistant analyzing data for {userName}. \
Your responses should be concise, direct, and optimistic.

Role: Expert GitHub Analyst
Style: Brief, Positive, Solution-focused

Available Data:
- User: {userProfile}
- Repos: {repoStats}
- Activity: {activityMetrics}
- Languages: {languageStats}

Guidelines:
1. Keep responses under 3-4 sentences
2. Focus on user's strengths
3. Provide direct, actionable advice
4. Be encouraging and supportive
5. Highlight positive patterns
6. Use emojis sparingly for emphasis

Remember: Be concise but impactful. Favor practical insights over theoretical analysis.";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusedProfile {
    pub name: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub followers: u64,
    pub following: u64,
    pub public_repos: u64,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoStats {
    pub total_repos: usize,
    pub total_stars: u64,
    pub top_language: String,
    pub recently_active: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentRepo {
    pub name: String,
    pub language: Option<String>,
    pub stars: u64,
    pub last_push: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopRepo {
    pub name: String,
    pub stars: u64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityMetrics {
    pub monthly_contributions: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemContext {
    pub user_name: String,
    pub profile: FocusedProfile,
    pub stats: RepoStats,
    pub activity: ActivityMetrics,
    pub languages: Vec<LanguageShare>,
    pub recent_activity: Vec<RecentRepo>,
    pub top_repositories: Vec<TopRepo>,
}

fn repo_name(repo: &Repository) -> String {
    if repo.name.is_empty() {
        "Unnamed Repository".to_string()
    } else {
        repo.name.clone()
    }
}

impl SystemContext {
    pub fn build(profile: &UserProfile, repositories: &[Repository], now: DateTime<Utc>) -> Self {
        let languages = language_stats(repositories);
        let week_ago = now - Duration::days(7);
        let pushed = |repo: &Repository| repo.pushed_at.as_deref().and_then(parse_timestamp);

        let mut by_push: Vec<&Repository> = repositories.iter().collect();
        by_push.sort_by_key(|repo| Reverse(pushed(*repo)));
        let recent_activity = by_push
            .iter()
            .take(5)
            .map(|repo| RecentRepo {
                name: repo_name(repo),
                language: repo.language.clone(),
                stars: repo.stargazers_count,
                last_push: repo.pushed_at.clone(),
            })
            .collect();

        let mut by_stars: Vec<&Repository> = repositories.iter().collect();
        by_stars.sort_by_key(|repo| Reverse(repo.stargazers_count));
        let top_repositories = by_stars
            .iter()
            .take(3)
            .map(|repo| TopRepo {
                name: repo_name(repo),
                stars: repo.stargazers_count,
                description: repo.description.clone(),
            })
            .collect();

        Self {
            user_name: profile.display_name().to_string(),
            profile: FocusedProfile {
                name: profile.display_name().to_string(),
                bio: profile.bio.clone(),
                location: profile.location.clone(),
                followers: profile.followers,
                following: profile.following,
                public_repos: profile.public_repos,
                created_at: profile.created_at.clone(),
            },
            stats: RepoStats {
                total_repos: repositories.len(),
                total_stars: saturating_sum(repositories.iter().map(|r| r.stargazers_count)),
                top_language: top_language(&languages).to_string(),
                recently_active: repositories
                    .iter()
                    .filter_map(pushed)
                    .any(|at| at > week_ago),
            },
            activity: ActivityMetrics {
                monthly_contributions: monthly_contributions(repositories),
            },
            languages,
            recent_activity,
            top_repositories,
        }
    }
}

pub fn render_system_prompt(context: &SystemContext) -> Result<String> {
    Ok(SYSTEM_PROMPT_TEMPLATE
        .replace("{userName}", &context.user_name)
        .replace("{userProfile}", &serde_json::to_string_pretty(&context.profile)?)
        .replace("{repoStats}", &serde_json::to_string_pretty(&context.stats)?)
        .replace("{activityMetrics}", &serde_json::to_string_pretty(&context.activity)?)
        .replace("{languageStats}", &serde_json::to_string_pretty(&context.languages)?))
}

#[derive(Debug, Clone, Serialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.9,
            top_k: 20,
            top_p: 0.85,
            max_output_tokens: 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SafetySetting {
    pub category: &'static str,
    pub threshold: &'static str,
}

pub fn default_safety_settings() -> Vec<SafetySetting> {
    [
        "HARM_CATEGORY_HARASSMENT",
        "HARM_CATEGORY_HATE_SPEECH",
        "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        "HARM_CATEGORY_DANGEROUS_CONTENT",
    ]
    .into_iter()
    .map(|category| SafetySetting {
        category,
        threshold: "BLOCK_MEDIUM_AND_ABOVE",
    })
    .collect()
}

/// Body of a `generateContent` call carrying the system prompt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub model: &'static str,
    pub system_instruction: Content,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
    pub safety_settings: Vec<SafetySetting>,
}

impl GenerationRequest {
    pub fn new(system_prompt: String) -> Self {
        Self {
            model: MODEL_NAME,
            system_instruction: Content {
                parts: vec![Part { text: system_prompt }],
            },
            contents: Vec::new(),
            generation_config: GenerationConfig::default(),
            safety_settings: default_safety_settings(),
        }
    }
}

pub async fn exec(common: CommonArgs, json: bool) -> anyhow::Result<()> {
    let snapshot = load_snapshot(&common, !json)
        .await
        .context("Failed to load repository activity")?;

    let profile = snapshot.profile.clone().unwrap_or_else(|| UserProfile {
        login: snapshot.login.clone().unwrap_or_default(),
        ..Default::default()
    });
    let context = SystemContext::build(&profile, &snapshot.repositories(), Utc::now());
    let prompt = render_system_prompt(&context).context("Failed to render system prompt")?;

    if json {
        output_json(&GenerationRequest::new(prompt))
    } else {
        println!("{prompt}");
        Ok(())
    }
}
