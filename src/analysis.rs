//! Aggregation of upstream data into repository, search and profile reports

use crate::config::InsightConfig;
use crate::error::{InsightError, Result};
use crate::metadata::{Fetched, GitHubClient};
use crate::metrics::{day_of, format_number, language_breakdown, maintenance_status, top_languages};
use crate::summarizer::summarize_repository;
use crate::types::{
    Contributor, HealthIndicators, MaintenanceStatus, ReleaseSummary, RepoId, RepoSearchResult,
    RepositoryReport, UserProfile, UserRepoSummary,
};
use tracing::{debug, info, warn};

/// Analyze a single repository and build its full report.
///
/// Only a missing repository is fatal. Every secondary fetch degrades to an
/// empty or zero value, and a failed AI call yields the fallback analysis.
pub async fn analyze_repo(repo_url: &str, config: &InsightConfig) -> Result<RepositoryReport> {
    if repo_url.trim().is_empty() {
        return Err(InsightError::invalid_input("Please enter a GitHub URL"));
    }

    let id = RepoId::parse(repo_url)?;
    info!("Analyzing repository {}", id);

    let github = GitHubClient::new(&config.network)?;
    let (owner, repo) = (id.owner.as_str(), id.name.as_str());

    let stats = match github.repository(owner, repo).await {
        Fetched::Found(stats) => stats,
        Fetched::NotFound => return Err(InsightError::RepositoryNotFound),
        Fetched::Failed(reason) => {
            warn!("Fetching {} failed: {}", id, reason);
            return Err(InsightError::RepositoryNotFound);
        }
    };

    let (maintenance, last_commit) = match github.commit_activity(owner, repo).await {
        Fetched::Found(activity) => (
            maintenance_status(&activity.last_commit),
            day_of(&activity.last_commit),
        ),
        other => {
            log_gap(&id, "commits", &other);
            (MaintenanceStatus::Unknown, "Unknown".to_string())
        }
    };

    let languages = degrade(&id, "languages", github.languages(owner, repo).await);
    let languages = language_breakdown(&languages);

    let contributors = degrade(&id, "contributors", github.contributors(owner, repo).await)
        .into_iter()
        .map(|c| Contributor {
            login: c.login,
            contributions: c.contributions,
            avatar_url: c.avatar_url,
        })
        .collect();

    let health = check_health(&github, &id).await;

    let releases = degrade(&id, "releases", github.releases(owner, repo).await)
        .into_iter()
        .map(|r| ReleaseSummary {
            tag: r.tag_name,
            name: r.name,
            published_at: r.published_at,
            html_url: r.html_url,
        })
        .collect();

    let open_issues = degrade(&id, "issues", github.open_issue_count(owner, repo).await);

    let ai_analysis = summarize_repository(&github, &config.ai, &id, repo_url).await;

    info!("Finished analysis of {} ({})", id, maintenance);

    Ok(RepositoryReport {
        owner: id.owner.clone(),
        name: id.name.clone(),
        description: stats.description,
        stars: format_number(stats.stargazers_count),
        forks: format_number(stats.forks_count),
        watchers: format_number(stats.watchers_count),
        size: format!("{} KB", stats.size),
        created_at: day_of(&stats.created_at),
        updated_at: day_of(&stats.updated_at),
        homepage: stats.homepage,
        license: stats
            .license
            .and_then(|l| l.name)
            .unwrap_or_else(|| "None".to_string()),
        maintenance,
        last_commit,
        languages,
        contributors,
        health,
        releases,
        open_issues,
        clone_url: stats.clone_url,
        ai_analysis,
    })
}

/// Look for CI workflows and common community files
async fn check_health(github: &GitHubClient, id: &RepoId) -> HealthIndicators {
    let (owner, repo) = (id.owner.as_str(), id.name.as_str());

    HealthIndicators {
        has_ci_cd: degrade(id, "workflows", github.has_workflows(owner, repo).await),
        has_license: github.file_content(owner, repo, "LICENSE").await.is_found(),
        has_contributing: github.file_content(owner, repo, "CONTRIBUTING.md").await.is_found(),
        has_gitignore: github.file_content(owner, repo, ".gitignore").await.is_found(),
    }
}

/// Search repositories by keyword, most starred first
pub async fn search_repos(query: &str, config: &InsightConfig) -> Result<Vec<RepoSearchResult>> {
    let query = query.trim();
    if query.is_empty() {
        return Err(InsightError::invalid_input("Please enter a search term"));
    }

    info!("Searching repositories for {:?}", query);
    let github = GitHubClient::new(&config.network)?;

    let items = match github.search_repositories(query).await {
        Fetched::Found(items) => items,
        other => {
            debug!("Search for {:?} returned no data: {:?}", query, other);
            Vec::new()
        }
    };

    Ok(items
        .into_iter()
        .map(|item| RepoSearchResult {
            name: item.full_name,
            url: item.html_url,
            stars: format_number(item.stargazers_count),
            description: item.description,
            language: item.language,
            updated_at: day_of(&item.updated_at),
            owner_avatar: item.owner.avatar_url,
        })
        .collect())
}

/// Build a profile report for a GitHub user
pub async fn analyze_user(username: &str, config: &InsightConfig) -> Result<UserProfile> {
    let username = username.trim();
    if username.is_empty() {
        return Err(InsightError::invalid_input("Please enter a username"));
    }

    info!("Analyzing user {}", username);
    let github = GitHubClient::new(&config.network)?;

    let user = match github.user(username).await {
        Fetched::Found(user) => user,
        Fetched::NotFound => return Err(InsightError::UserNotFound),
        Fetched::Failed(reason) => {
            warn!("Fetching user {} failed: {}", username, reason);
            return Err(InsightError::UserNotFound);
        }
    };

    let mut repos = match github.user_repositories(username).await {
        Fetched::Found(repos) => repos,
        other => {
            debug!("Repositories of {} unavailable: {:?}", username, other);
            Vec::new()
        }
    };

    let total_stars: u64 = repos.iter().map(|r| r.stargazers_count).sum();
    let top_languages = top_languages(repos.iter().map(|r| r.language.as_deref()), 5);

    repos.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count));
    let popular_repos = repos
        .into_iter()
        .map(|r| UserRepoSummary {
            name: r.name,
            stars: format_number(r.stargazers_count),
            description: r.description,
            language: r.language,
            url: r.html_url,
        })
        .collect();

    Ok(UserProfile {
        name: user.name,
        username: user.login,
        bio: user.bio,
        avatar_url: user.avatar_url,
        public_repos: user.public_repos,
        followers: format_number(user.followers),
        following: format_number(user.following),
        total_stars: format_number(total_stars),
        top_languages,
        popular_repos,
        html_url: user.html_url,
        created_at: day_of(&user.created_at),
    })
}

/// Take fetched data, falling back to the default for missing resources
fn degrade<T: Default>(id: &RepoId, what: &str, fetched: Fetched<T>) -> T {
    match fetched {
        Fetched::Found(value) => value,
        other => {
            log_gap(id, what, &other);
            T::default()
        }
    }
}

fn log_gap<T>(id: &RepoId, what: &str, fetched: &Fetched<T>) {
    match fetched {
        Fetched::NotFound => debug!("No {} for {}", what, id),
        Fetched::Failed(reason) => debug!("Fetching {} for {} failed: {}", what, id, reason),
        Fetched::Found(_) => {}
    }
}
