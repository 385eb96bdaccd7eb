//! Starred repository discovery through the GitHub REST API.

use serde::Deserialize;
use tracing::{error, info};

use crate::error::{HarvestError, Result};

/// Public GitHub API.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

const PER_PAGE: u32 = 100;

#[derive(Debug, Deserialize)]
struct StarredRepo {
    html_url: String,
}

/// Authenticated client for the authenticated user's stars.
pub struct GitHubClient {
    http: reqwest::Client,
    token: String,
    api_base: String,
}

impl GitHubClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_api_base(token, GITHUB_API_BASE)
    }

    /// Uses another API root, e.g. a GitHub Enterprise host.
    pub fn with_api_base(token: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: token.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Lists the web URLs of every starred repository.
    ///
    /// Pages are fetched until one comes back empty. A failing page is
    /// logged and ends pagination; what was fetched so far is returned.
    pub async fn starred_repo_urls(&self) -> Vec<String> {
        let mut urls = Vec::new();

        for page in 1u32.. {
            match self.fetch_page(page).await {
                Ok(repos) if repos.is_empty() => break,
                Ok(repos) => {
                    urls.extend(repos.into_iter().map(|r| r.html_url));
                    info!(page, total = urls.len(), "Fetched starred repositories");
                }
                Err(e) => {
                    error!(page, error = %e, "Failed to fetch starred repositories");
                    break;
                }
            }
        }

        urls
    }

    async fn fetch_page(&self, page: u32) -> Result<Vec<StarredRepo>> {
        let url = format!(
            "{}/user/starred?page={}&per_page={}",
            self.api_base, page, PER_PAGE
        );

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", "stardigest")
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HarvestError::GitHub {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn page(n: &str) -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), n.into()),
            Matcher::UrlEncoded("per_page".into(), "100".into()),
        ])
    }

    #[tokio::test]
    async fn test_paginates_until_empty_page() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("GET", "/user/starred")
            .match_query(page("1"))
            .match_header("authorization", "Bearer token")
            .match_header("x-github-api-version", "2022-11-28")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"html_url": "https://github.com/a/one"}, {"html_url": "https://github.com/b/two"}]"#)
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/user/starred")
            .match_query(page("2"))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"html_url": "https://github.com/c/three"}]"#)
            .expect(1)
            .create_async()
            .await;
        let last = server
            .mock("GET", "/user/starred")
            .match_query(page("3"))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .expect(1)
            .create_async()
            .await;

        let urls = GitHubClient::with_api_base("token", server.url())
            .starred_repo_urls()
            .await;

        assert_eq!(
            urls,
            vec![
                "https://github.com/a/one",
                "https://github.com/b/two",
                "https://github.com/c/three"
            ]
        );
        first.assert_async().await;
        second.assert_async().await;
        last.assert_async().await;
    }

    #[tokio::test]
    async fn test_failing_page_returns_partial_result() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/user/starred")
            .match_query(page("1"))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"html_url": "https://github.com/a/one"}]"#)
            .create_async()
            .await;
        let failing = server
            .mock("GET", "/user/starred")
            .match_query(page("2"))
            .with_status(500)
            .with_body(r#"{"message": "boom"}"#)
            .expect(1)
            .create_async()
            .await;

        let urls = GitHubClient::with_api_base("token", server.url())
            .starred_repo_urls()
            .await;

        assert_eq!(urls, vec!["https://github.com/a/one"]);
        failing.assert_async().await;
    }
}
