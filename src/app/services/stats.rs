//! Stats Provider: produces the one StatsRecord a run works from.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::PathBuf;

use crate::app::domain::{ContributedStrategy, StatsRecord};
use crate::app::error::{AppError, Result};
use crate::app::infrastructure::github::{GitHubApi, RepoSummary};

pub trait StatsProvider {
    fn fetch(&self) -> Result<StatsRecord>;
}

/// Reads a previously captured record from a JSON file.
pub struct FileStatsProvider {
    path: PathBuf,
}

impl FileStatsProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StatsProvider for FileStatsProvider {
    fn fetch(&self) -> Result<StatsRecord> {
        let contents = fs::read_to_string(&self.path)?;
        let record = serde_json::from_str(&contents)?;
        log::info!("Loaded stats from {}", self.path.display());
        Ok(record)
    }
}

/// A repository whose commit or line totals could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRepo {
    pub name: String,
    pub reason: String,
}

/// Per-repository totals, accumulated with skip-and-log on failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoTotals {
    pub commits: u64,
    pub stars: u64,
    pub lines_added: u64,
    pub lines_deleted: u64,
    pub skipped: Vec<SkippedRepo>,
}

impl RepoTotals {
    fn skip(&mut self, name: &str, error: &AppError) {
        log::warn!("Error processing repo {}: {}", name, error);
        self.skipped.push(SkippedRepo {
            name: name.to_string(),
            reason: error.to_string(),
        });
    }

    /// Count one repository. Stars always count; a failed commit lookup
    /// skips the repository's commit and line totals, a failed line lookup
    /// skips only the lines.
    pub fn add_repo<A: GitHubApi + ?Sized>(&mut self, api: &A, repo: &RepoSummary) {
        self.stars += repo.stargazers_count;

        let commits = match api.commit_count(&repo.full_name) {
            Ok(commits) => commits,
            Err(e) => return self.skip(&repo.full_name, &e),
        };
        self.commits += commits;

        match api.code_frequency(&repo.full_name) {
            Ok(Some(weeks)) => {
                for week in weeks {
                    self.lines_added += week.additions();
                    self.lines_deleted += week.deletions();
                }
            }
            Ok(None) => log::info!("No code frequency data yet for {}", repo.full_name),
            Err(e) => self.skip(&repo.full_name, &e),
        }
    }
}

/// Result of one aggregation, with the repositories that were left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateReport {
    pub record: StatsRecord,
    pub skipped: Vec<SkippedRepo>,
}

pub struct GitHubStatsProvider<A: GitHubApi> {
    api: A,
    username: Option<String>,
    strategy: ContributedStrategy,
    include_org_repos: bool,
}

impl<A: GitHubApi> GitHubStatsProvider<A> {
    pub fn new(
        api: A,
        username: Option<String>,
        strategy: ContributedStrategy,
        include_org_repos: bool,
    ) -> Self {
        Self {
            api,
            username,
            strategy,
            include_org_repos,
        }
    }

    fn repositories(&self, login: &str) -> Result<Vec<RepoSummary>> {
        let mut repos = self.api.user_repos(login)?;

        if self.include_org_repos {
            for org in self.api.user_orgs(login)? {
                match self.api.org_repos(&org) {
                    Ok(org_repos) => repos.extend(org_repos),
                    Err(e) => log::warn!("Error fetching repos for organization {}: {}", org, e),
                }
            }
        }

        let mut seen = HashSet::new();
        repos.retain(|repo| seen.insert(repo.full_name.clone()));
        Ok(repos)
    }

    fn contributed(&self, login: &str) -> Result<u64> {
        let names: BTreeSet<String> = match self.strategy {
            ContributedStrategy::PushEvents => self
                .api
                .user_events(login)?
                .into_iter()
                .filter(|event| event.kind == "PushEvent")
                .map(|event| event.repo.name)
                .collect(),
            ContributedStrategy::CommitSearch => {
                self.api.commit_search_repos(login)?.into_iter().collect()
            }
        };
        Ok(names.len() as u64)
    }

    pub fn aggregate(&self) -> Result<AggregateReport> {
        let login = match &self.username {
            Some(login) => login.clone(),
            None => self.api.authenticated_login()?,
        };
        log::info!("Collecting stats for {}", login);

        let profile = self.api.user(&login)?;
        let repos = self.repositories(&login)?;
        log::info!("Found {} repositories", repos.len());

        let mut totals = RepoTotals::default();
        for repo in &repos {
            totals.add_repo(&self.api, repo);
        }

        let record = StatsRecord {
            repository_count: profile.public_repos + profile.owned_private_repos.unwrap_or(0),
            contributed_repository_count: self.contributed(&login)?,
            commit_count: totals.commits,
            star_count: totals.stars,
            follower_count: profile.followers,
            lines_added: totals.lines_added,
            lines_deleted: totals.lines_deleted,
        };

        if !totals.skipped.is_empty() {
            log::warn!(
                "{} repositories were skipped; totals are partial",
                totals.skipped.len()
            );
        }

        Ok(AggregateReport {
            record,
            skipped: totals.skipped,
        })
    }
}

impl<A: GitHubApi> StatsProvider for GitHubStatsProvider<A> {
    fn fetch(&self) -> Result<StatsRecord> {
        self.aggregate().map(|report| report.record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::infrastructure::github::{EventRepo, UserEvent, UserProfile, WeeklyDelta};
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeApi {
        repos: Vec<RepoSummary>,
        orgs: HashMap<String, Option<Vec<RepoSummary>>>,
        commits: HashMap<String, u64>,
        frequency: HashMap<String, Option<Vec<WeeklyDelta>>>,
        events: Vec<UserEvent>,
        search: Vec<String>,
        calls: RefCell<Vec<String>>,
    }

    fn repo(name: &str, stars: u64) -> RepoSummary {
        RepoSummary {
            full_name: name.to_string(),
            stargazers_count: stars,
        }
    }

    fn push(kind: &str, repo: &str) -> UserEvent {
        UserEvent {
            kind: kind.to_string(),
            repo: EventRepo {
                name: repo.to_string(),
            },
        }
    }

    fn unavailable(what: &str) -> AppError {
        AppError::Http {
            url: what.to_string(),
            status: 409,
        }
    }

    impl GitHubApi for FakeApi {
        fn authenticated_login(&self) -> Result<String> {
            self.calls.borrow_mut().push("authenticated_login".to_string());
            Ok("octocat".to_string())
        }

        fn user(&self, login: &str) -> Result<UserProfile> {
            Ok(UserProfile {
                login: login.to_string(),
                public_repos: 10,
                owned_private_repos: Some(4),
                followers: 21,
            })
        }

        fn user_repos(&self, _login: &str) -> Result<Vec<RepoSummary>> {
            Ok(self.repos.clone())
        }

        fn user_orgs(&self, _login: &str) -> Result<Vec<String>> {
            let mut orgs: Vec<String> = self.orgs.keys().cloned().collect();
            orgs.sort();
            Ok(orgs)
        }

        fn org_repos(&self, org: &str) -> Result<Vec<RepoSummary>> {
            self.orgs
                .get(org)
                .cloned()
                .flatten()
                .ok_or_else(|| unavailable(org))
        }

        fn commit_count(&self, repo: &str) -> Result<u64> {
            self.commits.get(repo).copied().ok_or_else(|| unavailable(repo))
        }

        fn code_frequency(&self, repo: &str) -> Result<Option<Vec<WeeklyDelta>>> {
            self.frequency.get(repo).cloned().ok_or_else(|| unavailable(repo))
        }

        fn user_events(&self, _login: &str) -> Result<Vec<UserEvent>> {
            Ok(self.events.clone())
        }

        fn commit_search_repos(&self, _login: &str) -> Result<Vec<String>> {
            Ok(self.search.clone())
        }
    }

    fn fake() -> FakeApi {
        let mut api = FakeApi {
            repos: vec![repo("octocat/a", 5), repo("octocat/b", 2), repo("octocat/empty", 1)],
            events: vec![
                push("PushEvent", "octocat/a"),
                push("PushEvent", "octocat/a"),
                push("WatchEvent", "rust-lang/rust"),
                push("PushEvent", "org/tool"),
            ],
            search: vec!["x/1".into(), "x/2".into(), "x/1".into(), "y/3".into()],
            ..Default::default()
        };
        api.commits.insert("octocat/a".into(), 120);
        api.commits.insert("octocat/b".into(), 30);
        api.frequency.insert(
            "octocat/a".into(),
            Some(vec![WeeklyDelta(0, 100, -40), WeeklyDelta(1, 20, -5)]),
        );
        api.frequency.insert("octocat/b".into(), None);
        api
    }

    #[test]
    fn test_aggregate_counts_and_skips() {
        let provider = GitHubStatsProvider::new(
            fake(),
            Some("octocat".to_string()),
            ContributedStrategy::PushEvents,
            true,
        );
        let report = provider.aggregate().unwrap();

        assert_eq!(report.record.repository_count, 14);
        assert_eq!(report.record.follower_count, 21);
        assert_eq!(report.record.star_count, 8);
        assert_eq!(report.record.commit_count, 150);
        assert_eq!(report.record.lines_added, 120);
        assert_eq!(report.record.lines_deleted, 45);
        assert_eq!(report.record.contributed_repository_count, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].name, "octocat/empty");
    }

    #[test]
    fn test_line_failure_keeps_commits() {
        let mut api = fake();
        api.frequency.remove("octocat/a");
        let mut totals = RepoTotals::default();
        totals.add_repo(&api, &repo("octocat/a", 5));

        assert_eq!(totals.commits, 120);
        assert_eq!(totals.stars, 5);
        assert_eq!(totals.lines_added, 0);
        assert_eq!(totals.skipped.len(), 1);
    }

    #[test]
    fn test_commit_search_strategy() {
        let provider = GitHubStatsProvider::new(
            fake(),
            Some("octocat".to_string()),
            ContributedStrategy::CommitSearch,
            false,
        );
        assert_eq!(provider.fetch().unwrap().contributed_repository_count, 3);
    }

    #[test]
    fn test_org_repos_included_and_deduplicated() {
        let mut api = fake();
        api.orgs.insert(
            "org".into(),
            Some(vec![repo("org/tool", 40), repo("octocat/a", 5)]),
        );
        api.orgs.insert("broken".into(), None);
        api.commits.insert("org/tool".into(), 7);
        api.frequency.insert("org/tool".into(), Some(vec![WeeklyDelta(0, 1, -1)]));

        let provider =
            GitHubStatsProvider::new(api, None, ContributedStrategy::PushEvents, true);
        let report = provider.aggregate().unwrap();

        assert_eq!(report.record.star_count, 48);
        assert_eq!(report.record.commit_count, 157);
        assert_eq!(report.record.lines_added, 121);
    }

    #[test]
    fn test_login_resolved_from_token_when_unset() {
        let provider = GitHubStatsProvider::new(fake(), None, ContributedStrategy::PushEvents, false);
        provider.fetch().unwrap();
        assert_eq!(
            provider.api.calls.borrow().as_slice(),
            ["authenticated_login".to_string()]
        );
    }

    #[test]
    fn test_file_provider() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        let record = StatsRecord {
            commit_count: 99,
            ..Default::default()
        };
        fs::write(&path, serde_json::to_string(&record).unwrap()).unwrap();

        let loaded = FileStatsProvider::new(&path).fetch().unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_file_provider_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileStatsProvider::new(dir.path().join("nope.json")).fetch().unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }
}
