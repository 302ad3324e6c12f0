//! GitHub integration: README lookup and image link rewriting.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use url::Url;

use crate::config::PortfolioConfig;

static IMAGE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[(.*?)\]\((.*?)\)").unwrap());

/// Owner and name of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ReadmeError {
    #[error("not a GitHub repository URL: {0}")]
    MalformedUrl(String),
    #[error("GitHub request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("README not available (HTTP {0})")]
    NotFound(u16),
}

impl ReadmeError {
    /// Short label for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            ReadmeError::MalformedUrl(_) => "malformed_url",
            ReadmeError::Request(_) => "request_failed",
            ReadmeError::NotFound(_) => "not_found",
        }
    }
}

/// Extract owner and repository from the last two path segments of a
/// `github.com` URL. A missing scheme, trailing slash and `.git` suffix are
/// tolerated.
pub fn parse_repo_url(raw: &str) -> Result<RepoRef, ReadmeError> {
    let malformed = || ReadmeError::MalformedUrl(raw.to_string());

    let trimmed = raw.trim();
    let with_scheme = if trimmed.contains("://") {
        Cow::Borrowed(trimmed)
    } else {
        Cow::Owned(format!("https://{trimmed}"))
    };
    let url = Url::parse(&with_scheme).map_err(|_| malformed())?;

    if !url.host_str().unwrap_or_default().contains("github.com") {
        return Err(malformed());
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    let [.., owner, repo] = segments.as_slice() else {
        return Err(malformed());
    };
    let repo = repo.strip_suffix(".git").unwrap_or(*repo);
    if repo.is_empty() {
        return Err(malformed());
    }

    Ok(RepoRef {
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}

/// Point every relative `![alt](path)` at the raw-content host.
///
/// Absolute `http(s)://` links are left alone and everything outside the
/// image spans is preserved byte for byte.
pub fn rewrite_image_links(markdown: &str, repo: &RepoRef, branch: &str, raw_base: &str) -> String {
    IMAGE_REGEX
        .replace_all(markdown, |caps: &Captures| {
            let alt = &caps[1];
            let link = &caps[2];
            if link.starts_with("http://") || link.starts_with("https://") {
                return caps[0].to_string();
            }
            let path = link.trim_start_matches("./").trim_start_matches('/');
            format!(
                "![{alt}]({raw_base}/{}/{}/{branch}/{path})",
                repo.owner, repo.repo
            )
        })
        .into_owned()
}

#[derive(Debug, Deserialize)]
struct RepoMetadata {
    default_branch: Option<String>,
}

/// Client for the two GitHub calls behind the README import.
#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
    raw_url: String,
    token: Option<String>,
    fallback_branch: String,
}

impl GithubClient {
    pub fn from_config(config: &PortfolioConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("portfolio-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_url: config.github_api_url.clone(),
            raw_url: config.github_raw_url.clone(),
            token: config.github_token.clone(),
            fallback_branch: config.readme_fallback_branch.clone(),
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.http.get(url);
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }

    async fn fetch_metadata(&self, repo: &RepoRef) -> Result<RepoMetadata, reqwest::Error> {
        let url = format!("{}/repos/{}/{}", self.api_url, repo.owner, repo.repo);
        self.get(&url)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// The repository's default branch, or the configured fallback when the
    /// lookup fails or omits it.
    pub async fn default_branch(&self, repo: &RepoRef) -> String {
        match self.fetch_metadata(repo).await {
            Ok(RepoMetadata {
                default_branch: Some(branch),
            }) if !branch.is_empty() => branch,
            Ok(_) => {
                tracing::debug!(owner = %repo.owner, repo = %repo.repo, "No default_branch in metadata");
                self.fallback_branch.clone()
            }
            Err(e) => {
                tracing::warn!(owner = %repo.owner, repo = %repo.repo, "Repository lookup failed: {e}");
                self.fallback_branch.clone()
            }
        }
    }

    /// Fetch a repository README as raw Markdown with image links made absolute.
    pub async fn fetch_readme(&self, repo_url: &str) -> Result<String, ReadmeError> {
        let repo = parse_repo_url(repo_url)?;
        let branch = self.default_branch(&repo).await;

        let url = format!("{}/repos/{}/{}/readme", self.api_url, repo.owner, repo.repo);
        let resp = self
            .get(&url)
            .header(ACCEPT, "application/vnd.github.v3.raw")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ReadmeError::NotFound(resp.status().as_u16()));
        }

        let text = resp.text().await?;
        tracing::info!(
            owner = %repo.owner,
            repo = %repo.repo,
            branch = %branch,
            bytes = text.len(),
            "README fetched"
        );
        Ok(rewrite_image_links(&text, &repo, &branch, &self.raw_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use pretty_assertions::assert_eq;

    const RAW: &str = "https://raw.githubusercontent.com";

    fn repo(owner: &str, name: &str) -> RepoRef {
        RepoRef {
            owner: owner.into(),
            repo: name.into(),
        }
    }

    #[test]
    fn relative_image_becomes_raw_url() {
        assert_eq!(
            rewrite_image_links("![logo](img/a.png)", &repo("u", "r"), "main", RAW),
            "![logo](https://raw.githubusercontent.com/u/r/main/img/a.png)"
        );
    }

    #[test]
    fn absolute_image_is_unchanged() {
        let text = "![logo](https://x.com/a.png) and ![b](http://y.org/b.gif)";
        assert_eq!(rewrite_image_links(text, &repo("u", "r"), "main", RAW), text);
    }

    #[test]
    fn text_without_images_is_unchanged() {
        let text = "# Title\n\nA [link](docs/guide.md) and `![not](closed`\n";
        assert_eq!(rewrite_image_links(text, &repo("u", "r"), "main", RAW), text);
    }

    #[test]
    fn every_image_is_rewritten_and_surroundings_kept() {
        let text = "intro ![one](./a.png) middle\n![two](/docs/b.svg) outro";
        assert_eq!(
            rewrite_image_links(text, &repo("u", "r"), "dev", RAW),
            "intro ![one](https://raw.githubusercontent.com/u/r/dev/a.png) middle\n\
             ![two](https://raw.githubusercontent.com/u/r/dev/docs/b.svg) outro"
        );
    }

    #[test]
    fn repo_url_parsing() {
        assert_eq!(
            parse_repo_url("https://github.com/u/r").unwrap(),
            repo("u", "r")
        );
        assert_eq!(
            parse_repo_url("github.com/someone/project.git/").unwrap(),
            repo("someone", "project")
        );
        assert!(matches!(
            parse_repo_url("https://gitlab.com/u/r"),
            Err(ReadmeError::MalformedUrl(_))
        ));
        assert!(matches!(
            parse_repo_url("https://github.com/only-owner"),
            Err(ReadmeError::MalformedUrl(_))
        ));
        assert!(matches!(parse_repo_url(""), Err(ReadmeError::MalformedUrl(_))));
    }

    async fn spawn_fake_github(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(api_url: String) -> GithubClient {
        let mut config = PortfolioConfig::new("pw", "secret");
        config.github_api_url = api_url;
        GithubClient::from_config(&config).unwrap()
    }

    async fn raw_readme(headers: HeaderMap) -> (StatusCode, &'static str) {
        let raw = headers
            .get(ACCEPT)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("raw"));
        if raw {
            (StatusCode::OK, "# Demo\n![shot](./docs/shot.png)\n")
        } else {
            (StatusCode::NOT_ACCEPTABLE, "")
        }
    }

    #[tokio::test]
    async fn readme_uses_discovered_default_branch() {
        let api = spawn_fake_github(
            Router::new()
                .route(
                    "/repos/{owner}/{repo}",
                    get(|| async { Json(serde_json::json!({ "default_branch": "develop" })) }),
                )
                .route("/repos/{owner}/{repo}/readme", get(raw_readme)),
        )
        .await;

        let content = client(api)
            .fetch_readme("https://github.com/u/r")
            .await
            .unwrap();
        assert_eq!(
            content,
            "# Demo\n![shot](https://raw.githubusercontent.com/u/r/develop/docs/shot.png)\n"
        );
    }

    #[tokio::test]
    async fn failed_metadata_lookup_falls_back_to_main() {
        let api = spawn_fake_github(
            Router::new()
                .route(
                    "/repos/{owner}/{repo}",
                    get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
                )
                .route("/repos/{owner}/{repo}/readme", get(raw_readme)),
        )
        .await;

        let content = client(api)
            .fetch_readme("https://github.com/u/r")
            .await
            .unwrap();
        assert!(content.contains("/u/r/main/docs/shot.png"), "{content}");
    }

    #[tokio::test]
    async fn missing_readme_is_not_found() {
        let api = spawn_fake_github(Router::new().route(
            "/repos/{owner}/{repo}",
            get(|| async { Json(serde_json::json!({ "default_branch": "main" })) }),
        ))
        .await;

        let err = client(api)
            .fetch_readme("https://github.com/u/r")
            .await
            .unwrap_err();
        assert!(matches!(err, ReadmeError::NotFound(404)), "got {err:?}");
        assert_eq!(err.outcome(), "not_found");
    }

    #[tokio::test]
    async fn malformed_url_makes_no_request() {
        let err = client("http://127.0.0.1:9".into())
            .fetch_readme("not a url at all")
            .await
            .unwrap_err();
        assert!(matches!(err, ReadmeError::MalformedUrl(_)), "got {err:?}");
    }
}
