use crate::cli::CommonArgs;
use crate::error::{GitPulseError, Result};
use anyhow::Context;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

pub const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
pub const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
pub const SCOPES: &str = "read:user repo user:email";

#[derive(Clone)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: Option<String>,
    pub token_url: String,
}

impl fmt::Debug for OAuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("token_url", &self.token_url)
            .finish()
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect_uri: Option<&'a str>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

pub fn authorize_url(client_id: &str, redirect_uri: &str) -> Result<Url> {
    Ok(Url::parse_with_params(
        AUTHORIZE_URL,
        &[
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("scope", SCOPES),
        ],
    )?)
}

/// Trades an authorization code for an access token.
pub async fn exchange_code(http: &reqwest::Client, settings: &OAuthSettings, code: &str) -> Result<String> {
    let code = code.trim();
    if code.is_empty() {
        return Err(GitPulseError::Auth("missing authorization code".to_string()));
    }

    let response = http
        .post(&settings.token_url)
        .header(ACCEPT, "application/json")
        .json(&TokenRequest {
            client_id: &settings.client_id,
            client_secret: &settings.client_secret,
            code,
            redirect_uri: settings.redirect_uri.as_deref(),
        })
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(GitPulseError::Api {
            status: status.as_u16(),
            message: "token exchange failed".to_string(),
        });
    }

    let body: TokenResponse = response.json().await?;
    match body.access_token.filter(|t| !t.is_empty()) {
        Some(token) => Ok(token),
        None => Err(GitPulseError::Auth(
            body.error_description
                .or(body.error)
                .unwrap_or_else(|| "failed to get access token".to_string()),
        )),
    }
}

pub fn exec_url(client_id: &str, redirect_uri: &str) -> anyhow::Result<()> {
    let url = authorize_url(client_id, redirect_uri).context("Failed to build authorization URL")?;
    println!("{url}");
    Ok(())
}

pub async fn exec_exchange(common: &CommonArgs, settings: OAuthSettings, code: &str) -> anyhow::Result<()> {
    let config = common.client_config();
    let http = reqwest::Client::builder()
        .timeout(config.timeout)
        .user_agent(config.user_agent)
        .build()
        .context("Failed to build HTTP client")?;
    tracing::debug!(?settings, "exchanging authorization code");

    let token = exchange_code(&http, &settings, code)
        .await
        .context("Failed to exchange authorization code")?;
    println!("{token}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorize_url_encodes_params() {
        let url = authorize_url("abc123", "http://localhost:8080/callback").unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(url.host_str(), Some("github.com"));
        assert!(pairs.contains(&("client_id".into(), "abc123".into())));
        assert!(pairs.contains(&("redirect_uri".into(), "http://localhost:8080/callback".into())));
        assert!(pairs.contains(&("scope".into(), SCOPES.into())));
        assert!(url.as_str().contains("scope=read%3Auser+repo+user%3Aemail"));
    }

    #[test]
    fn settings_debug_hides_secret() {
        let settings = OAuthSettings {
            client_id: "id".into(),
            client_secret: "shh".into(),
            redirect_uri: None,
            token_url: TOKEN_URL.into(),
        };
        assert!(!format!("{settings:?}").contains("shh"));
    }
}
