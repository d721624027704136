//! Taste profile analysis (Gemini)
//!
//! Sends a compact summary of the entry list to `generateContent` with a JSON
//! response schema and parses the returned JSON text into a [`TasteProfile`].

use cinelog_common::config::GeminiConfig;
use cinelog_common::models::TasteProfile;
use cinelog_common::{Entry, Error, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

/// One line per entry: `<title> (<kind>) - rating n/5` or `- unrated`
pub fn history_summary(entries: &[Entry]) -> String {
    entries
        .iter()
        .map(|e| match e.rating {
            Some(r) => format!("{} ({}) - rating {}/5", e.title, e.kind, r),
            None => format!("{} ({}) - unrated", e.title, e.kind),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn build_prompt(entries: &[Entry]) -> String {
    format!(
        "Analyze the following viewing and playing history and build a taste profile.\n\
         History:\n{}\n\n\
         Answer in strict JSON.",
        history_summary(entries)
    )
}

fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "favoriteGenre": { "type": "STRING" },
            "totalHoursEstimates": {
                "type": "NUMBER",
                "description": "Rough estimate of total hours spent on the listed titles"
            },
            "personalityProfile": {
                "type": "STRING",
                "description": "A light-hearted paragraph describing the user's taste"
            },
            "recommendations": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "3 suggestions not already in the list"
            }
        },
        "required": ["favoriteGenre", "totalHoursEstimates", "personalityProfile", "recommendations"]
    })
}

/// Pull the JSON document out of a `generateContent` response body
pub fn parse_profile_response(body: &str) -> Result<TasteProfile> {
    let response: GenerateResponse = serde_json::from_str(body)?;
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| Error::upstream(200, "empty model response"))?;
    Ok(serde_json::from_str(&text)?)
}

pub struct GeminiAnalyzer {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiAnalyzer {
    /// Fails with a configuration error when no API key is set
    pub fn from_config(http: reqwest::Client, config: &GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("Gemini API key is not configured".to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    pub async fn analyze(&self, entries: &[Entry]) -> Result<TasteProfile> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = json!({
            "contents": [{ "parts": [{ "text": build_prompt(entries) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema()
            }
        });

        debug!(model = %self.model, entries = entries.len(), "Requesting taste profile");
        let response = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::upstream(502, e.to_string()))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(Error::upstream(status.as_u16(), text));
        }

        let profile = parse_profile_response(&text)?;
        info!(favorite_genre = %profile.favorite_genre, "Taste profile ready");
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinelog_common::MediaKind;

    #[test]
    fn test_history_summary_lines() {
        let mut dune = Entry::new("Dune", MediaKind::Movie);
        dune.rating = Some(5);
        let hades = Entry::new("Hades", MediaKind::Game);

        assert_eq!(
            history_summary(&[dune, hades]),
            "Dune (Movie) - rating 5/5\nHades (Game) - unrated"
        );
    }

    #[test]
    fn test_parse_profile_response() {
        let inner = json!({
            "favoriteGenre": "Science Fiction",
            "totalHoursEstimates": 120.5,
            "personalityProfile": "Fond of slow, cerebral sci-fi.",
            "recommendations": ["Solaris", "Contact", "Annihilation"]
        })
        .to_string();
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": inner }] } }]
        })
        .to_string();

        let profile = parse_profile_response(&body).unwrap();
        assert_eq!(profile.favorite_genre, "Science Fiction");
        assert_eq!(profile.recommendations.len(), 3);
    }

    #[test]
    fn test_empty_response_is_upstream_error() {
        let err = parse_profile_response(r#"{"candidates":[]}"#).unwrap_err();
        assert!(matches!(err, Error::Upstream { .. }));
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let result = GeminiAnalyzer::from_config(reqwest::Client::new(), &GeminiConfig::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
