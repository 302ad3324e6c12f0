//! Portfolio configuration, loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct PortfolioConfig {
    /// Password accepted by the admin login form.
    pub admin_password: String,
    /// Key for signing session cookies.
    pub session_secret: String,
    /// Optional GitHub token; raises the API rate limit for README fetches.
    pub github_token: Option<String>,
    /// GitHub REST API base URL.
    pub github_api_url: String,
    /// Base URL for raw repository content.
    pub github_raw_url: String,
    /// Branch used when the repository metadata lookup fails.
    pub readme_fallback_branch: String,
    /// Timeout applied to each outbound GitHub request.
    pub http_timeout: Duration,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
    /// Where `/profile_image` redirects when nothing better is stored.
    pub fallback_avatar: String,
    /// Request body limit for the profile upload form.
    pub max_upload_bytes: usize,
    /// Mark the session cookie `Secure` (HTTPS deployments).
    pub secure_cookies: bool,
}

impl PortfolioConfig {
    /// Configuration with defaults for everything but the two secrets.
    pub fn new(admin_password: impl Into<String>, session_secret: impl Into<String>) -> Self {
        Self {
            admin_password: admin_password.into(),
            session_secret: session_secret.into(),
            github_token: None,
            github_api_url: "https://api.github.com".to_string(),
            github_raw_url: "https://raw.githubusercontent.com".to_string(),
            readme_fallback_branch: "main".to_string(),
            http_timeout: Duration::from_secs(10),
            static_dir: PathBuf::from("static"),
            fallback_avatar: "/static/avatar.svg".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
            secure_cookies: false,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let admin_password = required("ADMIN_PASSWORD")?;
        let session_secret = required("SESSION_SECRET")?;
        let mut config = Self::new(admin_password, session_secret);

        config.github_token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());
        if let Ok(url) = std::env::var("GITHUB_API_URL") {
            config.github_api_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(url) = std::env::var("GITHUB_RAW_URL") {
            config.github_raw_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(branch) = std::env::var("README_FALLBACK_BRANCH") {
            config.readme_fallback_branch = branch;
        }
        if let Some(secs) = std::env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Ok(dir) = std::env::var("STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }
        if let Ok(path) = std::env::var("FALLBACK_AVATAR") {
            config.fallback_avatar = path;
        }
        if let Some(bytes) = std::env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.max_upload_bytes = bytes;
        }
        config.secure_cookies = std::env::var("SECURE_COOKIES")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        if config.github_token.is_none() {
            tracing::warn!("GITHUB_TOKEN not set -- README fetches use the anonymous rate limit");
        }
        if config.session_secret.len() < 32 {
            tracing::warn!("SESSION_SECRET is shorter than 32 bytes");
        }

        Ok(config)
    }
}

fn required(name: &str) -> anyhow::Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(anyhow::anyhow!("{name} must be set")),
    }
}
