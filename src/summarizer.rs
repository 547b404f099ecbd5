//! AI-generated repository overview

use crate::config::AiConfig;
use crate::error::{InsightError, Result};
use crate::metadata::{GeminiClient, GitHubClient};
use crate::types::{AiAnalysis, RepoId};
use serde::Deserialize;
use tracing::{debug, warn};

/// Dependency manifests embedded in the prompt, in this order, when present
pub const MANIFEST_FILES: [&str; 5] = [
    "package.json",
    "requirements.txt",
    "go.mod",
    "pom.xml",
    "Gemfile",
];

const README_CHARS: usize = 3000;
const MANIFEST_CHARS: usize = 2000;

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    summary: String,
    tech_stack: Vec<String>,
    setup_difficulty: i64,
    setup_reasoning: String,
    beginner_friendly: String,
    similar_projects: Vec<String>,
    key_features: Vec<String>,
}

/// Produce the AI analysis for a repository.
///
/// Never fails: any problem along the way yields [`AiAnalysis::failed`].
pub async fn summarize_repository(
    github: &GitHubClient,
    config: &AiConfig,
    id: &RepoId,
    repo_url: &str,
) -> AiAnalysis {
    match try_summarize(github, config, id, repo_url).await {
        Ok(analysis) => analysis,
        Err(e) => {
            warn!("AI analysis of {} failed: {}", id, e);
            AiAnalysis::failed(e)
        }
    }
}

async fn try_summarize(
    github: &GitHubClient,
    config: &AiConfig,
    id: &RepoId,
    repo_url: &str,
) -> Result<AiAnalysis> {
    let gemini = GeminiClient::new(config)?;

    let readme = github
        .file_content(&id.owner, &id.name, "README.md")
        .await
        .found()
        .unwrap_or_default();

    let mut manifests = Vec::new();
    for file in MANIFEST_FILES {
        if let Some(content) = github.file_content(&id.owner, &id.name, file).await.found() {
            debug!("Found {} in {}", file, id);
            manifests.push((file, content));
        }
    }

    let prompt = build_prompt(repo_url, &readme, &manifests);
    let reply = gemini.generate_json(&prompt).await?;

    parse_analysis(&reply)
}

/// Build the analysis prompt from the README and any manifests found
pub fn build_prompt(repo_url: &str, readme: &str, manifests: &[(&str, String)]) -> String {
    let mut tech_data = String::new();
    for (file, content) in manifests {
        tech_data.push_str(&format!(
            "\n--- FOUND {} ---\n{}\n",
            file,
            truncate_chars(content, MANIFEST_CHARS)
        ));
    }

    format!(
        r#"Analyze this GitHub repository: {repo_url}

README DATA: {readme}

DEPENDENCY/CONFIG FILES:
{tech_data}

Provide the output in valid JSON format with the following keys:
- summary: Plain-English Explanation (string)
- tech_stack: List of frameworks/libraries (list of strings)
- setup_difficulty: Score 1-10 (integer)
- setup_reasoning: Reasoning for the score (string)
- beginner_friendly: Easy/Medium/Hard (string)
- similar_projects: List of 3 real-world equivalents (list of strings)
- key_features: List of 3-5 key features (list of strings)
"#,
        repo_url = repo_url,
        readme = truncate_chars(readme, README_CHARS),
        tech_data = tech_data,
    )
}

/// Parse and validate the model's JSON reply
pub fn parse_analysis(reply: &str) -> Result<AiAnalysis> {
    let raw: RawAnalysis = serde_json::from_str(strip_code_fence(reply))?;

    if !(1..=10).contains(&raw.setup_difficulty) {
        return Err(InsightError::api(
            "Gemini",
            format!("setup_difficulty out of range: {}", raw.setup_difficulty),
        ));
    }

    if raw.key_features.len() < 3 {
        return Err(InsightError::api(
            "Gemini",
            format!("expected at least 3 key_features, got {}", raw.key_features.len()),
        ));
    }

    let mut similar_projects = raw.similar_projects;
    similar_projects.truncate(3);
    let mut key_features = raw.key_features;
    key_features.truncate(5);

    Ok(AiAnalysis {
        summary: raw.summary,
        tech_stack: raw.tech_stack,
        setup_difficulty: raw.setup_difficulty as u8,
        setup_reasoning: raw.setup_reasoning,
        beginner_friendly: raw.beginner_friendly,
        similar_projects,
        key_features,
    })
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
            body.trim_end().trim_end_matches("```").trim()
        }
        None => trimmed,
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
