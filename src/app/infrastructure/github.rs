use std::sync::OnceLock;

use regex_lite::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::credentials::Credential;
use crate::app::error::{AppError, Result};

const USER_AGENT: &str = concat!("statbadge/", env!("CARGO_PKG_VERSION"));
const PER_PAGE: u32 = 100;
const TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    pub login: String,
    #[serde(default)]
    pub public_repos: u64,
    /// Only present when the token belongs to this user.
    #[serde(default)]
    pub owned_private_repos: Option<u64>,
    #[serde(default)]
    pub followers: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoSummary {
    pub full_name: String,
    #[serde(default)]
    pub stargazers_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventRepo {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub repo: EventRepo,
}

/// One week of the code-frequency series: `[timestamp, additions, deletions]`,
/// with deletions reported as a negative number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WeeklyDelta(pub i64, pub i64, pub i64);

impl WeeklyDelta {
    pub fn additions(&self) -> u64 {
        self.1.unsigned_abs()
    }

    pub fn deletions(&self) -> u64 {
        self.2.unsigned_abs()
    }
}

#[derive(Debug, Deserialize)]
struct OrgSummary {
    login: String,
}

#[derive(Debug, Deserialize)]
struct SearchPage<T> {
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct CommitHit {
    repository: SearchRepo,
}

#[derive(Debug, Deserialize)]
struct SearchRepo {
    full_name: String,
}

/// The remote calls the stats aggregation needs.
pub trait GitHubApi {
    /// Login of the account that owns the credential.
    fn authenticated_login(&self) -> Result<String>;
    fn user(&self, login: &str) -> Result<UserProfile>;
    fn user_repos(&self, login: &str) -> Result<Vec<RepoSummary>>;
    fn user_orgs(&self, login: &str) -> Result<Vec<String>>;
    fn org_repos(&self, org: &str) -> Result<Vec<RepoSummary>>;
    /// Total commits reachable from the default branch.
    fn commit_count(&self, repo: &str) -> Result<u64>;
    /// Weekly additions/deletions. `None` while GitHub is still computing
    /// the series or when the repository is empty.
    fn code_frequency(&self, repo: &str) -> Result<Option<Vec<WeeklyDelta>>>;
    fn user_events(&self, login: &str) -> Result<Vec<UserEvent>>;
    /// Full names of repositories containing commits authored by `login`.
    fn commit_search_repos(&self, login: &str) -> Result<Vec<String>>;
}

fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"<([^>]+)>\s*;\s*rel="([a-z]+)""#).expect("link header pattern is valid")
    })
}

fn page_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[?&]page=(\d+)").expect("page pattern is valid"))
}

/// Find the URL tagged `rel` in a `Link` response header.
pub fn link_target(header: &str, rel: &str) -> Option<String> {
    link_pattern()
        .captures_iter(header)
        .find(|caps| &caps[2] == rel)
        .map(|caps| caps[1].to_string())
}

/// Page number carried by a pagination URL.
pub fn page_number(url: &str) -> Option<u64> {
    page_pattern()
        .captures(url)
        .and_then(|caps| caps[1].parse().ok())
}

/// Blocking GitHub REST client.
pub struct GitHubClient {
    api_base: String,
    credential: Credential,
}

impl GitHubClient {
    pub fn new(api_base: impl Into<String>, credential: Credential) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            credential,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn get(&self, url: &str) -> Result<minreq::Response> {
        log::debug!("GET {}", url);
        let response = minreq::get(url)
            .with_header("User-Agent", USER_AGENT)
            .with_header("Accept", "application/vnd.github+json")
            .with_header("X-GitHub-Api-Version", "2022-11-28")
            .with_header(
                "Authorization",
                format!("Bearer {}", self.credential.secret()),
            )
            .with_timeout(TIMEOUT_SECS)
            .send()?;

        if !(200..300).contains(&response.status_code) {
            return Err(AppError::Http {
                url: url.to_string(),
                status: response.status_code,
            });
        }
        Ok(response)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.get(url)?;
        Ok(serde_json::from_slice(response.as_bytes())?)
    }

    /// Follow `rel="next"` links until the collection is exhausted.
    fn get_paginated<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let separator = if path.contains('?') { '&' } else { '?' };
        let mut next = Some(self.url(&format!("{}{}per_page={}", path, separator, PER_PAGE)));
        let mut items = Vec::new();

        while let Some(url) = next.take() {
            let response = self.get(&url)?;
            let page: Vec<T> = serde_json::from_slice(response.as_bytes())?;
            items.extend(page);
            next = response
                .headers
                .get("link")
                .and_then(|header| link_target(header, "next"));
        }

        Ok(items)
    }
}

impl GitHubApi for GitHubClient {
    fn authenticated_login(&self) -> Result<String> {
        let profile: UserProfile = self.get_json(&self.url("/user"))?;
        Ok(profile.login)
    }

    fn user(&self, login: &str) -> Result<UserProfile> {
        self.get_json(&self.url(&format!("/users/{}", login)))
    }

    fn user_repos(&self, login: &str) -> Result<Vec<RepoSummary>> {
        self.get_paginated(&format!("/users/{}/repos", login))
    }

    fn user_orgs(&self, login: &str) -> Result<Vec<String>> {
        let orgs: Vec<OrgSummary> = self.get_paginated(&format!("/users/{}/orgs", login))?;
        Ok(orgs.into_iter().map(|o| o.login).collect())
    }

    fn org_repos(&self, org: &str) -> Result<Vec<RepoSummary>> {
        self.get_paginated(&format!("/orgs/{}/repos", org))
    }

    fn commit_count(&self, repo: &str) -> Result<u64> {
        // One commit per page: the last page number is the total.
        let response = self.get(&self.url(&format!("/repos/{}/commits?per_page=1", repo)))?;
        let last_page = response
            .headers
            .get("link")
            .and_then(|header| link_target(header, "last"))
            .and_then(|url| page_number(&url));

        match last_page {
            Some(total) => Ok(total),
            None => {
                let page: Vec<serde_json::Value> = serde_json::from_slice(response.as_bytes())?;
                Ok(page.len() as u64)
            }
        }
    }

    fn code_frequency(&self, repo: &str) -> Result<Option<Vec<WeeklyDelta>>> {
        let response = self.get(&self.url(&format!("/repos/{}/stats/code_frequency", repo)))?;
        match response.status_code {
            202 | 204 => Ok(None),
            _ => Ok(Some(serde_json::from_slice(response.as_bytes())?)),
        }
    }

    fn user_events(&self, login: &str) -> Result<Vec<UserEvent>> {
        self.get_paginated(&format!("/users/{}/events", login))
    }

    fn commit_search_repos(&self, login: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut next = Some(self.url(&format!(
            "/search/commits?q=author:{}&per_page={}",
            login, PER_PAGE
        )));

        while let Some(url) = next.take() {
            let response = self.get(&url)?;
            let page: SearchPage<CommitHit> = serde_json::from_slice(response.as_bytes())?;
            names.extend(page.items.into_iter().map(|hit| hit.repository.full_name));
            next = response
                .headers
                .get("link")
                .and_then(|header| link_target(header, "next"));
        }

        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINK: &str = r#"<https://api.github.com/repositories/1/commits?per_page=1&page=2>; rel="next", <https://api.github.com/repositories/1/commits?per_page=1&page=1873>; rel="last""#;

    #[test]
    fn test_link_target_next_and_last() {
        assert_eq!(
            link_target(LINK, "next").as_deref(),
            Some("https://api.github.com/repositories/1/commits?per_page=1&page=2")
        );
        assert_eq!(
            link_target(LINK, "last").as_deref(),
            Some("https://api.github.com/repositories/1/commits?per_page=1&page=1873")
        );
        assert!(link_target(LINK, "prev").is_none());
    }

    #[test]
    fn test_page_number() {
        assert_eq!(page_number("https://x/commits?per_page=1&page=1873"), Some(1873));
        assert_eq!(page_number("https://x/commits?page=4&per_page=1"), Some(4));
        assert_eq!(page_number("https://x/commits?per_page=1"), None);
    }

    #[test]
    fn test_weekly_delta_magnitudes() {
        let weeks: Vec<WeeklyDelta> =
            serde_json::from_str("[[1302998400, 1124, -435], [1303603200, 0, 0]]").unwrap();
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].additions(), 1124);
        assert_eq!(weeks[0].deletions(), 435);
    }

    #[test]
    fn test_user_profile_without_private_repos() {
        let json = r#"{"login": "octocat", "public_repos": 8, "followers": 3}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.owned_private_repos, None);
        assert_eq!(profile.public_repos, 8);
    }

    #[test]
    fn test_user_event_type_field() {
        let json = r#"{"id": "1", "type": "PushEvent", "repo": {"id": 2, "name": "octocat/hello"}}"#;
        let event: UserEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.kind, "PushEvent");
        assert_eq!(event.repo.name, "octocat/hello");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = GitHubClient::new("https://ghe.example.com/api/v3/", Credential::new("t"));
        assert_eq!(client.url("/user"), "https://ghe.example.com/api/v3/user");
    }
}
