//! # repo_insight
//!
//! Analyze GitHub repositories and users by combining the GitHub REST API
//! with a generative-AI overview:
//! - **Repository reports**: popularity, maintenance status, language mix,
//!   top contributors, health indicators, releases and open issues
//! - **AI analysis**: summary, tech stack and setup difficulty generated from
//!   the README and dependency manifests
//! - **Search**: keyword search over repositories ranked by stars
//! - **User profiles**: followers, most used languages and starred repositories
//!
//! ## Quick Start
//!
//! ```no_run
//! use repo_insight::{analyze_repo, InsightConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = InsightConfig::default();
//! let report = analyze_repo("https://github.com/tokio-rs/tokio", &config).await?;
//!
//! println!("{}/{}: {} stars, {}", report.owner, report.name, report.stars, report.maintenance);
//! for lang in &report.languages {
//!     println!("  {} {:.1}%", lang.name, lang.percent);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Missing secondary data (contributors, releases, health files) never fails a
//! report; it shows up as empty lists or `false` flags. A failed AI call is
//! reported inside [`AiAnalysis`] rather than as an error.

mod analysis;
mod config;
mod error;
pub mod metadata;
pub mod metrics;
pub mod summarizer;
mod types;

// Re-export public API
pub use analysis::{analyze_repo, analyze_user, search_repos};
pub use config::{AiConfig, InsightConfig, InsightConfigBuilder, NetworkConfig};
pub use error::{InsightError, Result};
pub use types::{
    AiAnalysis, Contributor, HealthIndicators, LanguageCount, LanguageShare, MaintenanceStatus,
    ReleaseSummary, RepoId, RepoSearchResult, RepositoryReport, UserProfile, UserRepoSummary,
};
