use serde::Deserialize;

use crate::config::SourceConfig;
use crate::db::models::{BodyStep, Length, Tone};
use crate::generate::templates::ScriptDraft;
use crate::sources::{SourceError, SourceResult};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const MODEL: &str = "gpt-4o-mini";

/// Chat-completions client used for AI-assisted script drafting. The model
/// is asked for strict JSON matching the draft shape; anything else is an
/// upstream error and the caller falls back to the template engine.
pub struct OpenAiClient {
    api_key: String,
    base_url: String,
    client: reqwest::blocking::Client,
}

/// A model-written draft plus its token bill.
pub struct GeneratedScript {
    pub draft: ScriptDraft,
    pub total_tokens: Option<i64>,
}

impl OpenAiClient {
    pub fn new(api_key: String, config: Option<&SourceConfig>) -> Self {
        let base_url = config
            .and_then(|c| c.base_url.clone())
            .unwrap_or_else(|| OPENAI_API_BASE.to_string());
        Self {
            api_key,
            base_url,
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn generate_script(
        &self,
        topic: &str,
        audience: &str,
        tone: Tone,
        length: Length,
    ) -> SourceResult<GeneratedScript> {
        let steps = length.step_count();
        let secs = length.seconds_per_step();
        let system = "You write YouTube video scripts. Reply with JSON only, matching \
             {\"opening\": string, \"body\": [{\"t\": number, \"line\": string}], \
             \"ending\": string}. Body timestamps are seconds from the start of the \
             body section.";
        let user = format!(
            "Topic: {topic}\nAudience: {audience}\nTone: {tone}\n\
             Write an opening hook, exactly {steps} body steps spaced {secs} seconds \
             apart starting at 0, and an ending with a call to action.",
            tone = tone.as_str(),
        );

        let body = serde_json::json!({
            "model": MODEL,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.7,
        });

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(SourceError::Upstream(format!(
                "OpenAI API returned {}: {}",
                status, text
            )));
        }

        let completion: ChatCompletion = resp.json()?;
        let content = completion
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .ok_or_else(|| SourceError::Upstream("empty completion".to_string()))?;

        let draft = parse_draft(content)?;
        Ok(GeneratedScript {
            draft,
            total_tokens: completion.usage.and_then(|u| u.total_tokens),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct DraftPayload {
    opening: String,
    body: Vec<BodyStep>,
    ending: String,
}

/// Parse the model's JSON into a draft, recomputing markdown and word count
/// locally so the stored shape is identical to a template-engine draft.
fn parse_draft(content: &str) -> SourceResult<ScriptDraft> {
    let payload: DraftPayload = serde_json::from_str(content)?;
    if payload.body.is_empty() {
        return Err(SourceError::Upstream(
            "completion contained no body steps".to_string(),
        ));
    }
    Ok(ScriptDraft::compose(
        payload.opening,
        payload.body,
        payload.ending,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_draft_composes_markdown_locally() {
        let content = r#"{
            "opening": "Hook line.",
            "body": [
                {"t": 0, "line": "Step one."},
                {"t": 20, "line": "Step two."}
            ],
            "ending": "Subscribe."
        }"#;
        let draft = parse_draft(content).unwrap();
        assert_eq!(draft.body.len(), 2);
        assert!(draft.full_markdown.contains("## Opening"));
        assert!(draft.full_markdown.contains("**[00:20]** Step two."));
        assert_eq!(draft.word_count, 7);
    }

    #[test]
    fn parse_draft_rejects_empty_body() {
        let content = r#"{"opening": "a", "body": [], "ending": "b"}"#;
        assert!(matches!(
            parse_draft(content),
            Err(SourceError::Upstream(_))
        ));
    }

    #[test]
    fn parse_draft_rejects_non_json() {
        assert!(matches!(
            parse_draft("Sure! Here's your script:"),
            Err(SourceError::Decode(_))
        ));
    }
}
