//! HTTP catalog client
//!
//! Thin reqwest wrapper over the catalog's REST surface. The catalog is
//! authoritative for bookmarks and resume records; this client just moves
//! JSON and maps failures into engine errors.

use crate::catalog::CatalogApi;
use crate::error::{Error, Result};
use async_trait::async_trait;
use relato_common::ContinuePayload;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

const USER_AGENT: &str = "relato/0.1";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// HTTP implementation of the catalog API
pub struct HttpCatalog {
    base_url: String,
    user_id: String,
    http_client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct RecapResponse {
    summary: String,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>, user_id: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        let base_url = base_url.into();
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id: user_id.into(),
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Network(format!(
                "Catalog returned {}: {}",
                status.as_u16(),
                body
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl CatalogApi for HttpCatalog {
    async fn get_continue(
        &self,
        book_id: Uuid,
        voice: &str,
        style: &str,
    ) -> Result<ContinuePayload> {
        let url = self.url(&format!("/api/books/{}/continue", book_id));
        tracing::debug!(book_id = %book_id, voice = %voice, style = %style, "Fetching continue record");

        let response = self
            .http_client
            .get(&url)
            .query(&[("voice", voice), ("style", style)])
            .header("x-user-id", &self.user_id)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let response = self.check(response).await?;
        response
            .json()
            .await
            .map_err(|e| Error::Network(format!("Invalid continue payload: {}", e)))
    }

    async fn save_bookmark(
        &self,
        book_id: Uuid,
        chapter_id: Uuid,
        position_seconds: u64,
        voice: &str,
        style: &str,
    ) -> Result<()> {
        let url = self.url(&format!("/api/books/{}/bookmark", book_id));

        let response = self
            .http_client
            .post(&url)
            .header("x-user-id", &self.user_id)
            .json(&json!({
                "chapterId": chapter_id,
                "positionSeconds": position_seconds,
                "voice": voice,
                "style": style,
            }))
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        self.check(response).await?;
        Ok(())
    }

    async fn recap_chapter(
        &self,
        book_id: Uuid,
        chapter_id: Uuid,
        position_seconds: u64,
        style: &str,
    ) -> Result<String> {
        let url = self.url(&format!("/api/books/{}/recap", book_id));
        tracing::debug!(book_id = %book_id, chapter_id = %chapter_id, "Requesting recap");

        let response = self
            .http_client
            .post(&url)
            .header("x-user-id", &self.user_id)
            .json(&json!({
                "chapterId": chapter_id,
                "positionSeconds": position_seconds,
                "style": style,
            }))
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let response = self.check(response).await?;
        let recap: RecapResponse = response
            .json()
            .await
            .map_err(|e| Error::Network(format!("Invalid recap payload: {}", e)))?;
        Ok(recap.summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let catalog = HttpCatalog::new("http://localhost:8080/", "user-1").expect("client");
        assert_eq!(
            catalog.url("/api/books/x/continue"),
            "http://localhost:8080/api/books/x/continue"
        );
    }

    #[test]
    fn base_url_without_slash_unchanged() {
        let catalog = HttpCatalog::new("http://localhost:8080", "user-1").expect("client");
        assert_eq!(catalog.base_url, "http://localhost:8080");
    }
}
