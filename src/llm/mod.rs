//! Language model fallback
//!
//! When neither the trip database nor the website has an answer, the question
//! goes to a chat-completion model together with a summary of the trip catalog.

pub mod openai;

use crate::config::Config;
use crate::error::Result;
use crate::store::Trip;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for chat-completion backends
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Backend name (e.g., "openai")
    fn name(&self) -> &'static str;

    /// Answer `question` under the given system prompt
    async fn complete(&self, system: &str, question: &str) -> Result<String>;
}

/// Get the configured backend, if the fallback is enabled and has a key
pub fn get_backend(config: &Config) -> Result<Option<Arc<dyn LlmBackend>>> {
    if !config.llm.enabled || config.api_keys.openai.is_empty() {
        return Ok(None);
    }

    let backend = openai::OpenAiBackend::new(
        &config.api_keys.openai,
        &config.llm.model,
        config.llm.timeout_secs,
    )?;
    Ok(Some(Arc::new(backend)))
}

/// System prompt with the trip catalog appended
///
/// Only the short fields are listed; details stay out to keep the prompt small.
pub fn grounded_prompt(base: &str, trips: &[Trip]) -> String {
    if trips.is_empty() {
        return base.to_string();
    }

    let mut prompt = format!(
        "{}\nAnswer using the trips we offer where relevant. Current trips:\n",
        base
    );
    for trip in trips {
        let mut line = format!("- {}", trip.trip_name);
        let fields = [
            ("duration", &trip.duration),
            ("cost", &trip.cost),
            ("date", &trip.trip_date),
            ("contact", &trip.contact),
        ];
        for (label, value) in fields {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                line.push_str(&format!("; {}: {}", label, value));
            }
        }
        prompt.push_str(&line);
        prompt.push('\n');
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grounded_prompt_empty_catalog() {
        assert_eq!(grounded_prompt("Be helpful.", &[]), "Be helpful.");
    }

    #[test]
    fn test_grounded_prompt_lists_trips() {
        let trips = vec![Trip {
            trip_name: "Ashtavinayak Yatra".to_string(),
            cost: Some("4500".to_string()),
            duration: Some("2 days".to_string()),
            details: Some("long description".to_string()),
            trip_date: None,
            contact: Some(String::new()),
        }];

        let prompt = grounded_prompt("Be helpful.", &trips);
        assert!(prompt.starts_with("Be helpful.\n"));
        assert!(prompt.contains("- Ashtavinayak Yatra; duration: 2 days; cost: 4500\n"));
        assert!(!prompt.contains("long description"));
        assert!(!prompt.contains("contact"));
    }

    #[test]
    fn test_backend_disabled_without_key() {
        let config = Config::default();
        assert!(get_backend(&config).unwrap().is_none());

        let mut config = Config::default();
        config.api_keys.openai = "sk-test".to_string();
        config.llm.enabled = false;
        assert!(get_backend(&config).unwrap().is_none());

        config.llm.enabled = true;
        assert_eq!(get_backend(&config).unwrap().unwrap().name(), "openai");
    }
}
