use crate::github::{ClientConfig, Credentials, DEFAULT_API_URL};
use crate::model::{InsightMetric, YearFilter};
use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "gitpulse")]
#[command(about = "GitHub activity analysis: contribution calendar, streaks, languages, and exports")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Debug)]
pub struct CommonArgs {
    #[arg(long, global = true, help = "GitHub login to analyze")]
    pub user: Option<String>,

    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true, help = "GitHub access token")]
    pub token: Option<String>,

    #[arg(long, global = true, help = "Read a snapshot written by `export --json` instead of calling the API")]
    pub input: Option<PathBuf>,

    #[arg(long, global = true, help = "Year to analyze (YYYY or \"all\"), defaults to the current year")]
    pub year: Option<YearFilter>,

    #[arg(long, global = true, value_parser = parse_today, help = "Override today's date (YYYY-MM-DD)")]
    pub today: Option<NaiveDate>,

    #[arg(long, global = true, env = "GITPULSE_API_URL", default_value = DEFAULT_API_URL, help = "GitHub API base URL")]
    pub api_url: String,

    #[arg(long, global = true, default_value = "30s", value_parser = humantime::parse_duration, help = "Request timeout")]
    pub timeout: Duration,

    #[arg(long, global = true, help = "Maximum repositories fetched concurrently")]
    pub concurrency: Option<usize>,
}

fn parse_today(s: &str) -> std::result::Result<NaiveDate, String> {
    crate::util::parse_day(s).map_err(|e| e.to_string())
}

impl CommonArgs {
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn year_filter(&self) -> YearFilter {
        self.year.unwrap_or_else(|| YearFilter::Year(self.today().year()))
    }

    pub fn credentials(&self) -> Credentials {
        self.token
            .as_deref()
            .map(|token| Credentials::token(token.trim()))
            .unwrap_or_else(Credentials::anonymous)
    }

    pub fn client_config(&self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            api_url: self.api_url.clone(),
            timeout: self.timeout,
            concurrency: self.concurrency.unwrap_or(defaults.concurrency),
            ..defaults
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Contribution heatmap with streak header
    Calendar {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,
    },
    /// Current and longest streaks
    Streaks {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    /// Monthly contributions and code activity
    Activity {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    /// Language totals and evolution
    Languages {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    /// Top repositories ranked by size, stars, forks or code
    Repos {
        #[arg(long, value_enum, default_value_t = InsightMetric::Size, help = "Ranking metric")]
        metric: InsightMetric,

        #[arg(long, help = "Only repositories whose name contains this text")]
        filter: Option<String>,

        #[arg(long, help = "Smallest first")]
        asc: bool,

        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    /// Fetched repository snapshot, including fetch errors
    Export {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,
    },
    /// System prompt for the chat assistant
    Prompt {
        #[arg(long, help = "Output the generation request body as JSON")]
        json: bool,
    },
    /// GitHub OAuth helpers
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Subcommand)]
pub enum AuthCommand {
    /// Print the authorization URL to open in a browser
    Url {
        #[arg(long)]
        client_id: String,

        #[arg(long)]
        redirect_uri: String,
    },
    /// Exchange an authorization code for an access token
    Exchange {
        #[arg(long)]
        client_id: String,

        #[arg(long, env = "GITHUB_CLIENT_SECRET", hide_env_values = true)]
        client_secret: String,

        #[arg(long)]
        code: String,

        #[arg(long)]
        redirect_uri: Option<String>,

        #[arg(long, default_value = crate::auth::TOKEN_URL, help = "OAuth token endpoint")]
        token_url: String,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Calendar { json, ndjson } => crate::contrib::exec(self.common, json, ndjson).await,
            Commands::Streaks { json } => crate::contrib::exec_streaks(self.common, json).await,
            Commands::Activity { json } => crate::activity::exec_activity(self.common, json).await,
            Commands::Languages { json } => crate::activity::exec_languages(self.common, json).await,
            Commands::Repos {
                metric,
                filter,
                asc,
                json,
            } => crate::activity::exec_repos(self.common, metric, filter, asc, json).await,
            Commands::Export { json, ndjson } => crate::export::exec(self.common, json, ndjson).await,
            Commands::Prompt { json } => crate::prompt::exec(self.common, json).await,
            Commands::Auth { command } => match command {
                AuthCommand::Url { client_id, redirect_uri } => {
                    crate::auth::exec_url(&client_id, &redirect_uri)
                }
                AuthCommand::Exchange {
                    client_id,
                    client_secret,
                    code,
                    redirect_uri,
                    token_url,
                } => {
                    let settings = crate::auth::OAuthSettings {
                        client_id,
                        client_secret,
                        redirect_uri,
                        token_url,
                    };
                    crate::auth::exec_exchange(&self.common, settings, &code).await
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "gitpulse", "calendar", "--json", "--user", "octo", "--year", "all", "--today", "2024-06-15",
            "--timeout", "5s",
        ])
        .unwrap();
        assert_eq!(cli.common.user.as_deref(), Some("octo"));
        assert_eq!(cli.common.year_filter(), YearFilter::All);
        assert_eq!(cli.common.today(), NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        assert_eq!(cli.common.client_config().timeout, Duration::from_secs(5));
        assert!(matches!(cli.command, Commands::Calendar { json: true, ndjson: false }));
    }

    #[test]
    fn year_defaults_to_today() {
        let cli = Cli::try_parse_from(["gitpulse", "--today", "2023-02-01", "streaks"]).unwrap();
        assert_eq!(cli.common.year_filter(), YearFilter::Year(2023));
    }

    #[test]
    fn repos_parses_metric_and_direction() {
        let cli = Cli::try_parse_from(["gitpulse", "repos", "--metric", "loc", "--filter", "api", "--asc"]).unwrap();
        match cli.command {
            Commands::Repos {
                metric,
                filter,
                asc,
                json,
            } => {
                assert_eq!(metric, InsightMetric::Loc);
                assert_eq!(filter.as_deref(), Some("api"));
                assert!(asc);
                assert!(!json);
            }
            _ => panic!("expected repos command"),
        }
        assert!(Cli::try_parse_from(["gitpulse", "repos", "--metric", "lines"]).is_err());
    }

    #[test]
    fn rejects_bad_year_and_date() {
        assert!(Cli::try_parse_from(["gitpulse", "--year", "24", "streaks"]).is_err());
        assert!(Cli::try_parse_from(["gitpulse", "--today", "2024-13-01", "streaks"]).is_err());
    }
}
