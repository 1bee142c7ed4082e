//! Chat relay to the hosted language model.
//!
//! The relay answers free-text dining questions against the records
//! currently visible on the map, wrapping every restaurant it names in
//! `[[Name]]` tokens so the UI can make them clickable. It is
//! fire-and-forget relative to the projection pipeline: a completed
//! answer updates the chat panel, never the map state.

mod wire;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use tracing::debug;

use platemap_common::{Language, RelaySummary};

use wire::{ChatRequest, ChatResponse, WireMessage};

const RELAY_API_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

/// The relay seam — the web layer talks to this so tests can fake it.
#[async_trait]
pub trait Relay: Send + Sync {
    async fn ask(
        &self,
        context: &[RelaySummary],
        question: &str,
        lang: Language,
    ) -> Result<String>;
}

pub struct RelayClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl RelayClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
            base_url: RELAY_API_URL.to_string(),
            model: model.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(&self.api_key)?);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl Relay for RelayClient {
    async fn ask(
        &self,
        context: &[RelaySummary],
        question: &str,
        lang: Language,
    ) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            system: system_prompt(context, lang),
            messages: vec![WireMessage::user(question)],
        };

        debug!(model = %request.model, records = context.len(), "relay chat request");

        let url = format!("{}/messages", self.base_url);
        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("Relay API error ({}): {}", status, error_text));
        }

        let reply: ChatResponse = response.json().await?;
        Ok(reply.text())
    }
}

fn system_prompt(context: &[RelaySummary], lang: Language) -> String {
    let mut lines = Vec::with_capacity(context.len());
    for record in context {
        let mut parts = vec![format!("{} ({})", record.name, record.category)];
        if let Some(cuisine) = &record.cuisine {
            parts.push(cuisine.clone());
        }
        if let Some(price) = &record.price {
            parts.push(price.clone());
        }
        if let Some(description) = &record.description {
            parts.push(description.clone());
        }
        lines.push(format!("- {}", parts.join("; ")));
    }
    let list = if lines.is_empty() {
        "(no restaurants are visible right now)".to_string()
    } else {
        lines.join("\n")
    };
    let language_line = match lang {
        Language::En => "Answer in English.",
        Language::Ko => "Answer in Korean.",
    };

    format!(
        "You are a dining guide. Recommend only from the restaurants currently \
         visible on the user's map, listed below.\n\n{list}\n\n\
         Wrap every restaurant name you mention in double square brackets, \
         exactly as written above: [[Name]]. If nothing on the list fits the \
         question, say so instead of inventing a place. {language_line}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str) -> RelaySummary {
        RelaySummary {
            name: name.to_string(),
            category: "1 Star".to_string(),
            cuisine: Some("Korean".to_string()),
            price: None,
            description: Some("Quiet counter spot".to_string()),
        }
    }

    #[test]
    fn system_prompt_lists_visible_records() {
        let prompt = system_prompt(&[summary("Mingles"), summary("Onjium")], Language::En);
        assert!(prompt.contains("- Mingles (1 Star); Korean; Quiet counter spot"));
        assert!(prompt.contains("- Onjium"));
        assert!(prompt.contains("[[Name]]"));
        assert!(prompt.contains("Answer in English."));
    }

    #[test]
    fn system_prompt_handles_an_empty_viewport() {
        let prompt = system_prompt(&[], Language::Ko);
        assert!(prompt.contains("no restaurants are visible"));
        assert!(prompt.contains("Answer in Korean."));
    }
}
