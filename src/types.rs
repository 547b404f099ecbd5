//! Core data types for repository and profile reports

use crate::error::{InsightError, Result};
use serde::{Deserialize, Serialize};

/// Owner and name of a GitHub repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    /// Parse a repository identifier from a URL or an `owner/name` path.
    ///
    /// The last two path segments are taken as owner and name, so both
    /// `https://github.com/owner/repo` and `owner/repo/` are accepted.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim().trim_matches('/');
        let parts: Vec<&str> = trimmed.split('/').collect();

        if parts.len() < 2 {
            return Err(InsightError::invalid_input("Invalid URL format"));
        }

        let owner = parts[parts.len() - 2];
        let last = parts[parts.len() - 1];
        let name = last.strip_suffix(".git").unwrap_or(last);

        if owner.is_empty() || name.is_empty() {
            return Err(InsightError::invalid_input("Invalid URL format"));
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl std::fmt::Display for RepoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Complete analysis report for a single repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryReport {
    pub owner: String,
    pub name: String,
    pub description: Option<String>,
    /// Formatted star count, e.g. `1.5K`
    pub stars: String,
    pub forks: String,
    pub watchers: String,
    /// Repository size, e.g. `2048 KB`
    pub size: String,
    /// Creation day, `YYYY-MM-DD`
    pub created_at: String,
    /// Last update day, `YYYY-MM-DD`
    pub updated_at: String,
    pub homepage: Option<String>,
    /// License name, or `None` when the repository has no license
    pub license: String,
    pub maintenance: MaintenanceStatus,
    /// Day of the most recent commit, or `Unknown`
    pub last_commit: String,
    pub languages: Vec<LanguageShare>,
    pub contributors: Vec<Contributor>,
    pub health: HealthIndicators,
    pub releases: Vec<ReleaseSummary>,
    pub open_issues: u64,
    pub clone_url: Option<String>,
    pub ai_analysis: AiAnalysis,
}

/// Maintenance classification derived from the last commit date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaintenanceStatus {
    Active,
    #[serde(rename = "Recently Updated")]
    RecentlyUpdated,
    Sporadic,
    Inactive,
    Unknown,
}

impl std::fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::RecentlyUpdated => write!(f, "Recently Updated"),
            Self::Sporadic => write!(f, "Sporadic"),
            Self::Inactive => write!(f, "Inactive"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Share of a repository's code written in one language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageShare {
    pub name: String,
    /// Percentage of total bytes, one decimal place
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    pub login: String,
    pub contributions: u64,
    pub avatar_url: String,
}

/// Presence of common repository hygiene markers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthIndicators {
    pub has_ci_cd: bool,
    pub has_license: bool,
    pub has_contributing: bool,
    pub has_gitignore: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseSummary {
    pub tag: String,
    pub name: Option<String>,
    pub published_at: Option<String>,
    pub html_url: String,
}

/// AI-generated overview of a repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiAnalysis {
    /// Plain-English explanation of the project
    pub summary: String,
    pub tech_stack: Vec<String>,
    /// 1 (trivial) to 10 (very hard); 0 when the analysis failed
    pub setup_difficulty: u8,
    pub setup_reasoning: String,
    /// Easy / Medium / Hard
    pub beginner_friendly: String,
    pub similar_projects: Vec<String>,
    pub key_features: Vec<String>,
}

impl AiAnalysis {
    /// Sentinel record used when the text-generation call fails
    pub fn failed(reason: impl std::fmt::Display) -> Self {
        Self {
            summary: format!("AI Analysis Failed: {}", reason),
            tech_stack: Vec::new(),
            setup_difficulty: 0,
            setup_reasoning: "Could not generate analysis.".to_string(),
            beginner_friendly: "Unknown".to_string(),
            similar_projects: Vec::new(),
            key_features: Vec::new(),
        }
    }

    /// Whether this is the failure sentinel
    pub fn is_failure(&self) -> bool {
        self.setup_difficulty == 0
    }
}

/// One entry of a repository search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoSearchResult {
    /// `owner/name`
    pub name: String,
    pub url: String,
    pub stars: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub updated_at: String,
    pub owner_avatar: String,
}

/// Aggregated view of a GitHub user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: Option<String>,
    pub username: String,
    pub bio: Option<String>,
    pub avatar_url: String,
    pub public_repos: u64,
    pub followers: String,
    pub following: String,
    /// Stars summed over all fetched repositories, formatted
    pub total_stars: String,
    pub top_languages: Vec<LanguageCount>,
    /// Every fetched repository, most starred first
    pub popular_repos: Vec<UserRepoSummary>,
    pub html_url: String,
    pub created_at: String,
}

/// Number of a user's repositories whose primary language is `name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRepoSummary {
    pub name: String,
    pub stars: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub url: String,
}
