//! Clients for the upstream GitHub and Gemini APIs

pub mod gemini;
pub mod github;

pub use gemini::GeminiClient;
pub use github::{Fetched, GitHubClient};
