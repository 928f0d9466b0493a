// src/services/notion.rs

//! Notion database query client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{NotionConfig, RawRecord};
use crate::utils::http::{endpoint, error_body};

use super::{RecordSource, SourcePage};

/// Body of a database query response.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<RawRecord>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

/// Error body returned by the API on failure.
#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Queries one Notion database.
pub struct NotionClient {
    client: Client,
    query_url: Url,
    token: String,
    version: String,
}

impl NotionClient {
    /// Create a client for the configured database.
    pub fn new(config: &NotionConfig, client: Client) -> Result<Self> {
        let query_url = endpoint(
            &config.api_base,
            &format!("v1/databases/{}/query", config.database_id.trim()),
        )?;

        Ok(Self {
            client,
            query_url,
            token: config.token.clone(),
            version: config.version.clone(),
        })
    }

    pub fn query_url(&self) -> &Url {
        &self.query_url
    }
}

#[async_trait]
impl RecordSource for NotionClient {
    async fn fetch(&self) -> Result<SourcePage> {
        let response = self
            .client
            .post(self.query_url.clone())
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.version)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response).await;
            return Err(AppError::fetch_failed(status.as_u16(), describe_error(&body)));
        }

        let page: QueryResponse = response.json().await?;
        if page.has_more {
            log::warn!(
                "Database has more than one page of results; only the first {} are tracked (next cursor {:?})",
                page.results.len(),
                page.next_cursor
            );
        }

        Ok(SourcePage {
            records: page.results,
            has_more: page.has_more,
        })
    }
}

/// Prefer the API's own `code: message` over the raw body.
fn describe_error(body: &str) -> String {
    match serde_json::from_str::<ApiError>(body) {
        Ok(ApiError {
            code: Some(code),
            message: Some(message),
        }) => format!("{code}: {message}"),
        Ok(ApiError {
            message: Some(message),
            ..
        }) => message,
        _ => body.trim().to_string(),
    }
}
