// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Search-relevance classification over the app catalog.
//!
//! The strategy is resolved once per request from configured
//! capability: with a credential the oracle ranks the corpus, without
//! one (or on any oracle failure) a local keyword filter answers.
//! Either way the caller gets at most five results and never an error.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::oracle::{extract_json_array, ChatMessage, ChatOracle, ChatRequest, ContentPart};

const SEARCH_MODEL: &str = "google/gemini-2.0-flash-exp:free";
const MAX_RESULTS: usize = 5;

/// Catalog entry visible to search.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogApp {
    pub id: String,
    pub name: String,
    pub summary: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    #[serde(rename = "appId")]
    pub app_id: String,
    pub relevance: String,
}

enum Strategy {
    Oracle(Arc<dyn ChatOracle>),
    Local,
}

/// Relevance classifier with oracle-backed and local modes.
pub struct SearchService {
    strategy: Strategy,
}

impl SearchService {
    pub fn new(oracle: Option<Arc<dyn ChatOracle>>) -> Self {
        let strategy = match oracle {
            Some(oracle) => Strategy::Oracle(oracle),
            None => {
                debug!("No oracle credential, search runs in local keyword mode");
                Strategy::Local
            }
        };
        Self { strategy }
    }

    /// Rank the corpus against a query. Infallible: oracle failures
    /// fall back to the local filter.
    pub async fn search(&self, query: &str, corpus: &[CatalogApp]) -> Vec<SearchHit> {
        match &self.strategy {
            Strategy::Local => local_search(query, corpus, "Local keyword match"),
            Strategy::Oracle(oracle) => match oracle_search(oracle.as_ref(), query, corpus).await {
                Some(hits) => hits,
                None => local_search(query, corpus, "Fallback keyword match"),
            },
        }
    }
}

async fn oracle_search(
    oracle: &dyn ChatOracle,
    query: &str,
    corpus: &[CatalogApp],
) -> Option<Vec<SearchHit>> {
    let corpus_json = serde_json::to_string(corpus).ok()?;
    let prompt = format!(
        "Given the following list of applications, identify the top 5 that best match \
         the user's intent: \"{query}\".\n\
         Return ONLY a valid JSON array with this exact structure:\n\
         [{{\"appId\": \"string\", \"relevance\": \"one sentence explanation\"}}]\n\n\
         Apps: {corpus_json}\n\n\
         Remember: Return ONLY the JSON array, no other text."
    );

    let request = ChatRequest {
        model: SEARCH_MODEL.to_string(),
        messages: vec![ChatMessage {
            role: "user",
            content: vec![ContentPart::Text { text: prompt }],
        }],
        temperature: 0.3,
        max_tokens: 1000,
    };

    let content = match oracle.complete(request).await {
        Ok(content) => content,
        Err(err) => {
            warn!(error = %err, "Oracle search failed, falling back to local");
            return None;
        }
    };

    let json = extract_json_array(&content)?;
    let mut hits: Vec<SearchHit> = serde_json::from_str(json).ok()?;
    hits.truncate(MAX_RESULTS);
    Some(hits)
}

fn local_search(query: &str, corpus: &[CatalogApp], relevance: &str) -> Vec<SearchHit> {
    let needle = query.to_lowercase();
    corpus
        .iter()
        .filter(|app| {
            app.name.to_lowercase().contains(&needle)
                || app.summary.to_lowercase().contains(&needle)
        })
        .take(MAX_RESULTS)
        .map(|app| SearchHit {
            app_id: app.id.clone(),
            relevance: relevance.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::OracleError;
    use async_trait::async_trait;

    struct ScriptedOracle {
        reply: Option<String>,
    }

    #[async_trait]
    impl ChatOracle for ScriptedOracle {
        async fn complete(&self, _request: ChatRequest) -> Result<String, OracleError> {
            self.reply
                .clone()
                .ok_or_else(|| OracleError::Transport("down".to_string()))
        }
    }

    fn corpus() -> Vec<CatalogApp> {
        vec![
            CatalogApp {
                id: "a1".to_string(),
                name: "Budget Buddy".to_string(),
                summary: "Track spending with friends".to_string(),
                tags: vec!["finance".to_string()],
            },
            CatalogApp {
                id: "a2".to_string(),
                name: "Sketchpad".to_string(),
                summary: "A minimal drawing surface for budget planning".to_string(),
                tags: vec!["design".to_string()],
            },
            CatalogApp {
                id: "a3".to_string(),
                name: "Moodlight".to_string(),
                summary: "Ambient lighting control".to_string(),
                tags: vec!["lifestyle".to_string()],
            },
        ]
    }

    #[tokio::test]
    async fn test_local_mode_without_credential() {
        let service = SearchService::new(None);
        let hits = service.search("budget", &corpus()).await;
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].app_id, "a1");
        assert_eq!(hits[0].relevance, "Local keyword match");
    }

    #[tokio::test]
    async fn test_local_mode_case_insensitive() {
        let service = SearchService::new(None);
        let hits = service.search("MOODLIGHT", &corpus()).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].app_id, "a3");
    }

    #[tokio::test]
    async fn test_local_mode_no_match_is_empty_not_error() {
        let service = SearchService::new(None);
        assert!(service.search("spaceship", &corpus()).await.is_empty());
    }

    #[tokio::test]
    async fn test_oracle_hits_parsed_from_prose() {
        let reply = r#"Top picks: [{"appId":"a3","relevance":"ambient match"}] hope that helps"#;
        let service = SearchService::new(Some(Arc::new(ScriptedOracle {
            reply: Some(reply.to_string()),
        })));
        let hits = service.search("lighting", &corpus()).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].app_id, "a3");
        assert_eq!(hits[0].relevance, "ambient match");
    }

    #[tokio::test]
    async fn test_oracle_results_capped_at_five() {
        let many: Vec<String> = (0..8)
            .map(|i| format!(r#"{{"appId":"x{i}","relevance":"r"}}"#))
            .collect();
        let reply = format!("[{}]", many.join(","));
        let service = SearchService::new(Some(Arc::new(ScriptedOracle { reply: Some(reply) })));
        let hits = service.search("anything", &corpus()).await;
        assert_eq!(hits.len(), 5);
    }

    #[tokio::test]
    async fn test_oracle_failure_falls_back_to_local() {
        let service = SearchService::new(Some(Arc::new(ScriptedOracle { reply: None })));
        let hits = service.search("budget", &corpus()).await;
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].relevance, "Fallback keyword match");
    }

    #[tokio::test]
    async fn test_oracle_garbage_falls_back_to_local() {
        let service = SearchService::new(Some(Arc::new(ScriptedOracle {
            reply: Some("sorry, I can't do that".to_string()),
        })));
        let hits = service.search("sketchpad", &corpus()).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].relevance, "Fallback keyword match");
    }
}
