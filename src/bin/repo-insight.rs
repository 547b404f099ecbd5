//! CLI tool for analyzing GitHub repositories and users

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use repo_insight::{
    analyze_repo, analyze_user, search_repos, InsightConfig, MaintenanceStatus, RepoSearchResult,
    RepositoryReport, UserProfile,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "repo-insight")]
#[command(
    about = "Analyze GitHub repositories and users with activity metrics and an AI overview",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Path to custom configuration file (TOML)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a single repository
    Analyze {
        /// Repository URL or owner/name
        repo_url: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Search repositories by keyword
    Search {
        /// Search terms
        query: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Summarize a user's profile and repositories
    Profile {
        /// GitHub username
        username: String,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Output format
    #[arg(short = 'f', long, default_value = "text")]
    format: ReportFormat,

    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Debug)]
enum ReportFormat {
    Text,
    Json,
    Markdown,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(cfg) => cfg,
            Err(e) => fail(&format!("Failed to load config: {:#}", e)),
        },
        None => InsightConfig::default(),
    };

    let (content, output) = match cli.command {
        Commands::Analyze { repo_url, output } => {
            let spinner = start_spinner("Analyzing repository...");
            let result = analyze_repo(&repo_url, &config).await;
            spinner.finish_and_clear();

            let report = result.unwrap_or_else(|e| fail(&e.to_string()));
            let content = match output.format {
                ReportFormat::Text => render_repo_text(&report),
                ReportFormat::Json => to_json(&report),
                ReportFormat::Markdown => render_repo_markdown(&report),
            };
            (content, output.output)
        }

        Commands::Search { query, output } => {
            let spinner = start_spinner("Searching repositories...");
            let result = search_repos(&query, &config).await;
            spinner.finish_and_clear();

            let results = result.unwrap_or_else(|e| fail(&e.to_string()));
            let content = match output.format {
                ReportFormat::Text => render_search_text(&query, &results),
                ReportFormat::Json => to_json(&results),
                ReportFormat::Markdown => render_search_markdown(&query, &results),
            };
            (content, output.output)
        }

        Commands::Profile { username, output } => {
            let spinner = start_spinner("Fetching profile...");
            let result = analyze_user(&username, &config).await;
            spinner.finish_and_clear();

            let profile = result.unwrap_or_else(|e| fail(&e.to_string()));
            let content = match output.format {
                ReportFormat::Text => render_profile_text(&profile),
                ReportFormat::Json => to_json(&profile),
                ReportFormat::Markdown => render_profile_markdown(&profile),
            };
            (content, output.output)
        }
    };

    if let Err(e) = write_output(&content, output.as_deref()) {
        fail(&format!("Failed to write report: {:#}", e));
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: &Path) -> anyhow::Result<InsightConfig> {
    InsightConfig::from_toml_file(path).with_context(|| format!("reading {}", path.display()))
}

fn fail(message: &str) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), message);
    process::exit(1);
}

fn start_spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}

fn write_output(content: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
            println!("Report written to: {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| fail(&format!("Failed to serialize report: {}", e)))
}

fn yes_no(flag: bool) -> ColoredString {
    if flag {
        "yes".green()
    } else {
        "no".red()
    }
}

fn render_repo_text(report: &RepositoryReport) -> String {
    let mut out = String::new();

    let maintenance = match report.maintenance {
        MaintenanceStatus::Active => report.maintenance.to_string().green(),
        MaintenanceStatus::RecentlyUpdated => report.maintenance.to_string().cyan(),
        MaintenanceStatus::Sporadic => report.maintenance.to_string().yellow(),
        MaintenanceStatus::Inactive => report.maintenance.to_string().red(),
        MaintenanceStatus::Unknown => report.maintenance.to_string().dimmed(),
    };

    out.push_str(&format!(
        "\n{}\n",
        format!("=== {}/{} ===", report.owner, report.name).bold()
    ));
    if let Some(description) = &report.description {
        out.push_str(&format!("{}\n", description));
    }
    out.push('\n');
    out.push_str(&format!(
        "Stars: {}  Forks: {}  Watchers: {}  Size: {}\n",
        report.stars.cyan(),
        report.forks,
        report.watchers,
        report.size
    ));
    out.push_str(&format!(
        "Created: {}  Updated: {}  License: {}\n",
        report.created_at, report.updated_at, report.license
    ));
    out.push_str(&format!(
        "Maintenance: {} (last commit {})\n",
        maintenance, report.last_commit
    ));
    out.push_str(&format!("Open issues: {}\n", report.open_issues));
    if let Some(clone_url) = &report.clone_url {
        out.push_str(&format!("Clone: {}\n", clone_url));
    }

    if !report.languages.is_empty() {
        out.push_str(&format!("\n{}\n", "Languages:".bold()));
        for lang in &report.languages {
            out.push_str(&format!("  {:<20} {:>5.1}%\n", lang.name, lang.percent));
        }
    }

    out.push_str(&format!("\n{}\n", "Health:".bold()));
    out.push_str(&format!("  CI/CD: {}\n", yes_no(report.health.has_ci_cd)));
    out.push_str(&format!("  License file: {}\n", yes_no(report.health.has_license)));
    out.push_str(&format!("  Contributing guide: {}\n", yes_no(report.health.has_contributing)));
    out.push_str(&format!("  .gitignore: {}\n", yes_no(report.health.has_gitignore)));

    if !report.contributors.is_empty() {
        out.push_str(&format!("\n{}\n", "Top contributors:".bold()));
        for c in &report.contributors {
            out.push_str(&format!("  {} ({} contributions)\n", c.login, c.contributions));
        }
    }

    if !report.releases.is_empty() {
        out.push_str(&format!("\n{}\n", "Releases:".bold()));
        for r in &report.releases {
            out.push_str(&format!(
                "  {} {} {}\n",
                r.tag,
                r.name.as_deref().unwrap_or(""),
                r.published_at.as_deref().map(|d| d.get(..10).unwrap_or(d)).unwrap_or("")
            ));
        }
    }

    let ai = &report.ai_analysis;
    out.push_str(&format!("\n{}\n", "AI analysis:".bold()));
    if ai.is_failure() {
        out.push_str(&format!("  {}\n", ai.summary.yellow()));
    } else {
        out.push_str(&format!("  {}\n", ai.summary));
        out.push_str(&format!("  Tech stack: {}\n", ai.tech_stack.join(", ")));
        out.push_str(&format!(
            "  Setup difficulty: {}/10 ({}), {}\n",
            ai.setup_difficulty, ai.beginner_friendly, ai.setup_reasoning
        ));
        for feature in &ai.key_features {
            out.push_str(&format!("  - {}\n", feature));
        }
        if !ai.similar_projects.is_empty() {
            out.push_str(&format!("  Similar: {}\n", ai.similar_projects.join(", ")));
        }
    }

    out
}

fn render_repo_markdown(report: &RepositoryReport) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {}/{}\n\n", report.owner, report.name));
    if let Some(description) = &report.description {
        md.push_str(&format!("{}\n\n", description));
    }

    md.push_str("## Overview\n\n");
    md.push_str(&format!("- Stars: {}\n", report.stars));
    md.push_str(&format!("- Forks: {}\n", report.forks));
    md.push_str(&format!("- Watchers: {}\n", report.watchers));
    md.push_str(&format!("- Size: {}\n", report.size));
    md.push_str(&format!("- Created: {}\n", report.created_at));
    md.push_str(&format!("- Updated: {}\n", report.updated_at));
    md.push_str(&format!("- License: {}\n", report.license));
    md.push_str(&format!(
        "- Maintenance: {} (last commit {})\n",
        report.maintenance, report.last_commit
    ));
    md.push_str(&format!("- Open issues: {}\n", report.open_issues));
    if let Some(homepage) = report.homepage.as_deref().filter(|h| !h.is_empty()) {
        md.push_str(&format!("- Homepage: {}\n", homepage));
    }
    md.push('\n');

    md.push_str("## Languages\n\n");
    md.push_str("| Language | Share |\n");
    md.push_str("|----------|-------|\n");
    for lang in &report.languages {
        md.push_str(&format!("| {} | {:.1}% |\n", lang.name, lang.percent));
    }
    md.push('\n');

    md.push_str("## Health\n\n");
    md.push_str(&format!("- CI/CD: {}\n", report.health.has_ci_cd));
    md.push_str(&format!("- License file: {}\n", report.health.has_license));
    md.push_str(&format!("- Contributing guide: {}\n", report.health.has_contributing));
    md.push_str(&format!("- .gitignore: {}\n\n", report.health.has_gitignore));

    md.push_str("## Contributors\n\n");
    for c in &report.contributors {
        md.push_str(&format!("- {} ({} contributions)\n", c.login, c.contributions));
    }
    md.push('\n');

    md.push_str("## Releases\n\n");
    for r in &report.releases {
        md.push_str(&format!(
            "- [{}]({}) {}\n",
            r.tag,
            r.html_url,
            r.name.as_deref().unwrap_or("")
        ));
    }
    md.push('\n');

    let ai = &report.ai_analysis;
    md.push_str("## AI Analysis\n\n");
    md.push_str(&format!("{}\n\n", ai.summary));
    if !ai.is_failure() {
        md.push_str(&format!("- Tech stack: {}\n", ai.tech_stack.join(", ")));
        md.push_str(&format!(
            "- Setup difficulty: {}/10 ({})\n",
            ai.setup_difficulty, ai.beginner_friendly
        ));
        md.push_str(&format!("- Reasoning: {}\n", ai.setup_reasoning));
        md.push_str(&format!("- Similar projects: {}\n", ai.similar_projects.join(", ")));
        md.push_str("\n### Key features\n\n");
        for feature in &ai.key_features {
            md.push_str(&format!("- {}\n", feature));
        }
    }

    md
}

fn render_search_text(query: &str, results: &[RepoSearchResult]) -> String {
    let mut out = format!("\n{}\n", format!("=== Results for \"{}\" ===", query).bold());

    if results.is_empty() {
        out.push_str("No repositories found.\n");
        return out;
    }

    for r in results {
        out.push_str(&format!(
            "\n{} {} [{}] updated {}\n",
            r.name.bold(),
            format!("★ {}", r.stars).yellow(),
            r.language.as_deref().unwrap_or("-"),
            r.updated_at
        ));
        if let Some(description) = &r.description {
            out.push_str(&format!("  {}\n", description));
        }
        out.push_str(&format!("  {}\n", r.url.dimmed()));
    }

    out
}

fn render_search_markdown(query: &str, results: &[RepoSearchResult]) -> String {
    let mut md = format!("# Search: {}\n\n", query);
    md.push_str("| Repository | Stars | Language | Updated | Description |\n");
    md.push_str("|------------|-------|----------|---------|-------------|\n");

    for r in results {
        md.push_str(&format!(
            "| [{}]({}) | {} | {} | {} | {} |\n",
            r.name,
            r.url,
            r.stars,
            r.language.as_deref().unwrap_or("-"),
            r.updated_at,
            r.description.as_deref().unwrap_or("")
        ));
    }

    md
}

fn render_profile_text(profile: &UserProfile) -> String {
    let mut out = String::new();

    let title = match &profile.name {
        Some(name) => format!("=== {} ({}) ===", name, profile.username),
        None => format!("=== {} ===", profile.username),
    };
    out.push_str(&format!("\n{}\n", title.bold()));
    if let Some(bio) = &profile.bio {
        out.push_str(&format!("{}\n", bio));
    }
    out.push('\n');
    out.push_str(&format!(
        "Public repos: {}  Followers: {}  Following: {}  Total stars: {}\n",
        profile.public_repos,
        profile.followers.cyan(),
        profile.following,
        profile.total_stars.yellow()
    ));
    out.push_str(&format!("Joined: {}  {}\n", profile.created_at, profile.html_url));

    if !profile.top_languages.is_empty() {
        out.push_str(&format!("\n{}\n", "Top languages:".bold()));
        for lang in &profile.top_languages {
            out.push_str(&format!("  {:<20} {} repos\n", lang.name, lang.count));
        }
    }

    if !profile.popular_repos.is_empty() {
        out.push_str(&format!("\n{}\n", "Repositories:".bold()));
        for r in &profile.popular_repos {
            out.push_str(&format!(
                "  {:<30} ★ {:<8} {}\n",
                r.name,
                r.stars,
                r.language.as_deref().unwrap_or("-")
            ));
        }
    }

    out
}

fn render_profile_markdown(profile: &UserProfile) -> String {
    let mut md = format!("# {}\n\n", profile.name.as_deref().unwrap_or(&profile.username));

    if let Some(bio) = &profile.bio {
        md.push_str(&format!("{}\n\n", bio));
    }

    md.push_str(&format!("- Username: [{}]({})\n", profile.username, profile.html_url));
    md.push_str(&format!("- Public repos: {}\n", profile.public_repos));
    md.push_str(&format!("- Followers: {}\n", profile.followers));
    md.push_str(&format!("- Following: {}\n", profile.following));
    md.push_str(&format!("- Total stars: {}\n", profile.total_stars));
    md.push_str(&format!("- Joined: {}\n\n", profile.created_at));

    md.push_str("## Top Languages\n\n");
    for lang in &profile.top_languages {
        md.push_str(&format!("- {} ({} repos)\n", lang.name, lang.count));
    }
    md.push('\n');

    md.push_str("## Repositories\n\n");
    md.push_str("| Name | Stars | Language | Description |\n");
    md.push_str("|------|-------|----------|-------------|\n");
    for r in &profile.popular_repos {
        md.push_str(&format!(
            "| [{}]({}) | {} | {} | {} |\n",
            r.name,
            r.url,
            r.stars,
            r.language.as_deref().unwrap_or("-"),
            r.description.as_deref().unwrap_or("")
        ));
    }

    md
}
