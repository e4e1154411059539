// src/message.rs
use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /ask`. `session_id` is sent as `null` until the server has
/// issued one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub session_id: String,
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: TurnContent,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: TurnContent::Text(content.into()) }
    }

    pub fn assistant(content: impl Into<TurnContent>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnContent {
    Text(String),
    Structured(StructuredReply),
}

impl From<String> for TurnContent {
    fn from(value: String) -> Self {
        TurnContent::Text(value)
    }
}

impl From<&str> for TurnContent {
    fn from(value: &str) -> Self {
        TurnContent::Text(value.to_string())
    }
}

impl From<StructuredReply> for TurnContent {
    fn from(value: StructuredReply) -> Self {
        TurnContent::Structured(value)
    }
}

/// An assistant reply split into the sections the product agent answers with.
/// Every section is optional; rendering keeps the field order below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredReply {
    #[serde(default, alias = "professional_greeting", skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
    #[serde(
        default,
        alias = "direct_answer_addressing_the_query",
        skip_serializing_if = "Option::is_none"
    )]
    pub direct_answer: Option<String>,
    #[serde(
        default,
        alias = "detailed_product_information_from_database",
        deserialize_with = "one_or_many_lines",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub product_information: Vec<String>,
    #[serde(
        default,
        alias = "relevant_additional_context",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_context: Option<String>,
    #[serde(default, alias = "professional_closing", skip_serializing_if = "Option::is_none")]
    pub closing: Option<String>,
}

impl StructuredReply {
    /// Parse the bracketed-header layout the agent is prompted to produce:
    ///
    /// ```text
    /// [Professional greeting]
    /// Hello!
    /// [Detailed product information from database]
    /// Product: Oak table
    /// Image URL: https://example.com/oak.png
    /// ```
    ///
    /// Returns `None` when no known section header is present.
    pub fn from_sectioned_text(text: &str) -> Option<Self> {
        let mut reply = StructuredReply::default();
        let mut current: Option<Section> = None;
        let mut buffers: [Vec<String>; 5] = Default::default();
        let mut seen = false;

        for line in text.lines() {
            let line = line.trim();
            if line.len() >= 2 && line.starts_with('[') && line.ends_with(']') {
                let key = line[1..line.len() - 1].to_lowercase().replace(' ', "_");
                current = Section::from_key(&key);
                seen |= current.is_some();
                continue;
            }
            if let Some(section) = current {
                if !line.is_empty() {
                    buffers[section as usize].push(line.to_string());
                }
            }
        }

        if !seen {
            return None;
        }

        let joined = |lines: &[String]| (!lines.is_empty()).then(|| lines.join(" "));
        reply.greeting = joined(&buffers[Section::Greeting as usize]);
        reply.direct_answer = joined(&buffers[Section::DirectAnswer as usize]);
        reply.product_information = std::mem::take(&mut buffers[Section::ProductInformation as usize]);
        reply.additional_context = joined(&buffers[Section::AdditionalContext as usize]);
        reply.closing = joined(&buffers[Section::Closing as usize]);
        Some(reply)
    }
}

#[derive(Debug, Clone, Copy)]
enum Section {
    Greeting = 0,
    DirectAnswer = 1,
    ProductInformation = 2,
    AdditionalContext = 3,
    Closing = 4,
}

impl Section {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "greeting" | "professional_greeting" => Some(Section::Greeting),
            "direct_answer" | "direct_answer_addressing_the_query" => Some(Section::DirectAnswer),
            "product_information" | "detailed_product_information_from_database" => {
                Some(Section::ProductInformation)
            }
            "additional_context" | "relevant_additional_context" => Some(Section::AdditionalContext),
            "closing" | "professional_closing" => Some(Section::Closing),
            _ => None,
        }
    }
}

fn one_or_many_lines<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(text)) => text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        Some(OneOrMany::Many(lines)) => lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_request_sends_null_session() {
        let req = AskRequest { question: "hello".into(), session_id: None };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "question": "hello", "session_id": null })
        );
    }

    #[test]
    fn response_without_history_is_rejected() {
        assert!(serde_json::from_str::<AskResponse>(r#"{"session_id":"x"}"#).is_err());
    }

    #[test]
    fn content_can_be_text_or_structured() {
        let turns: Vec<ChatTurn> = serde_json::from_value(json!([
            { "role": "user", "content": "hello" },
            { "role": "assistant", "content": {
                "professional_greeting": "Welcome!",
                "product_information": "Oak table\nImage URL: https://img/oak.png"
            }}
        ]))
        .unwrap();

        assert_eq!(turns[0], ChatTurn::user("hello"));
        match &turns[1].content {
            TurnContent::Structured(reply) => {
                assert_eq!(reply.greeting.as_deref(), Some("Welcome!"));
                assert_eq!(
                    reply.product_information,
                    vec!["Oak table".to_string(), "Image URL: https://img/oak.png".to_string()]
                );
                assert!(reply.closing.is_none());
            }
            other => panic!("expected structured content, got {other:?}"),
        }
    }

    #[test]
    fn sectioned_text_is_parsed_into_fields() {
        let text = "[Professional greeting]\nHello there,\nfriend.\n\
                    [Detailed product information from database]\n\
                    Product: Oak chair\nImage URL: https://img/chair.png\n\
                    [Professional closing]\nThanks!";
        let reply = StructuredReply::from_sectioned_text(text).unwrap();
        assert_eq!(reply.greeting.as_deref(), Some("Hello there, friend."));
        assert_eq!(reply.product_information.len(), 2);
        assert_eq!(reply.closing.as_deref(), Some("Thanks!"));
        assert!(reply.direct_answer.is_none());
    }

    #[test]
    fn plain_text_is_not_sectioned() {
        assert!(StructuredReply::from_sectioned_text("just a reply [with brackets]").is_none());
        assert!(StructuredReply::from_sectioned_text("[Unknown header]\nbody").is_none());
    }
}
