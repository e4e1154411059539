// src/services/widget.rs
use tracing::{debug, warn};

use crate::config::RenderPolicy;
use crate::error::WidgetError;
use crate::message::{AskRequest, AskResponse, ChatTurn, Role};
use crate::render::{Renderer, Speaker};
use crate::services::ask_client::AskClient;
use crate::transcript::{EntryId, Transcript};

pub const TYPING_PLACEHOLDER: &str = "...";
pub const NO_RESPONSE_MESSAGE: &str = "Sorry, I couldn't get a response.";

/// A question that has been shown and is waiting for the server.
#[derive(Debug)]
pub struct PendingAsk {
    pub request: AskRequest,
    placeholder: EntryId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The assistant's reply was rendered.
    Answered,
    /// The exchange succeeded but the history did not end with an assistant turn.
    NoAssistantReply,
    /// The exchange failed; one error entry was shown.
    Failed,
}

/// One chat widget: the session handle plus what the user currently sees.
#[derive(Debug)]
pub struct ChatWidget {
    session_id: Option<String>,
    transcript: Transcript,
    renderer: Renderer,
    policy: RenderPolicy,
}

impl ChatWidget {
    pub fn new(renderer: Renderer, policy: RenderPolicy) -> Self {
        Self {
            session_id: None,
            transcript: Transcript::new(),
            renderer,
            policy,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Show the question and a typing placeholder, and build the request.
    /// Blank questions are ignored and return `None`.
    pub fn begin(&mut self, question: &str) -> Option<PendingAsk> {
        if question.trim().is_empty() {
            return None;
        }

        let bubble = self.renderer.render_plain(Speaker::User, question);
        self.transcript.append(Speaker::User, bubble);
        let typing = self.renderer.render_plain(Speaker::Ai, TYPING_PLACEHOLDER);
        let placeholder = self.transcript.append(Speaker::Ai, typing);

        Some(PendingAsk {
            request: AskRequest {
                question: question.to_string(),
                session_id: self.session_id.clone(),
            },
            placeholder,
        })
    }

    /// Apply the result of the round-trip started by [`ChatWidget::begin`].
    pub fn complete(
        &mut self,
        pending: PendingAsk,
        result: Result<AskResponse, WidgetError>,
    ) -> Outcome {
        self.transcript.remove(pending.placeholder);

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "question failed");
                let bubble = self.renderer.render_plain(Speaker::Ai, err.user_message());
                self.transcript.append(Speaker::Ai, bubble);
                return Outcome::Failed;
            }
        };

        self.session_id = Some(response.session_id);
        debug!(session_id = ?self.session_id, policy = ?self.policy, "applying history");

        match self.policy {
            RenderPolicy::Append => match response.history.last() {
                Some(turn) if turn.role == Role::Assistant => {
                    let bubble = self.renderer.render_turn(turn);
                    self.transcript.append(Speaker::Ai, bubble);
                    Outcome::Answered
                }
                _ => self.no_response(),
            },
            RenderPolicy::Replace => {
                let renderer = &self.renderer;
                self.transcript.replace_all(
                    response
                        .history
                        .iter()
                        .map(|turn| (Speaker::from(turn.role), renderer.render_turn(turn))),
                );
                if ends_with_assistant(&response.history) {
                    Outcome::Answered
                } else {
                    self.no_response()
                }
            }
        }
    }

    /// Run a whole submission against `client`. `None` means the question was blank.
    pub async fn submit(&mut self, client: &AskClient, question: &str) -> Option<Outcome> {
        let pending = self.begin(question)?;
        let result = client.ask(&pending.request).await;
        Some(self.complete(pending, result))
    }

    fn no_response(&mut self) -> Outcome {
        let bubble = self.renderer.render_plain(Speaker::Ai, NO_RESPONSE_MESSAGE);
        self.transcript.append(Speaker::Ai, bubble);
        Outcome::NoAssistantReply
    }
}

fn ends_with_assistant(history: &[ChatTurn]) -> bool {
    history.last().is_some_and(|turn| turn.role == Role::Assistant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CONNECTION_ERROR_MESSAGE;

    fn widget(policy: RenderPolicy) -> ChatWidget {
        ChatWidget::new(Renderer::new("https://img/avatar.png", true), policy)
    }

    fn reply(session: &str, history: Vec<ChatTurn>) -> Result<AskResponse, WidgetError> {
        Ok(AskResponse { session_id: session.to_string(), history })
    }

    #[test]
    fn blank_question_is_a_no_op() {
        let mut w = widget(RenderPolicy::Append);
        assert!(w.begin("").is_none());
        assert!(w.begin("   \t\n").is_none());
        assert!(w.transcript().is_empty());
    }

    #[test]
    fn begin_shows_question_and_placeholder() {
        let mut w = widget(RenderPolicy::Append);
        let pending = w.begin("hello").unwrap();
        assert_eq!(pending.request, AskRequest { question: "hello".into(), session_id: None });
        assert_eq!(w.transcript().len(), 2);
        assert!(w.transcript().to_html().contains(">...</div>"));
    }

    #[test]
    fn session_is_stored_and_echoed() {
        let mut w = widget(RenderPolicy::Append);
        let pending = w.begin("hello").unwrap();
        let outcome = w.complete(
            pending,
            reply("abc", vec![ChatTurn::user("hello"), ChatTurn::assistant("hi there")]),
        );
        assert_eq!(outcome, Outcome::Answered);
        assert_eq!(w.session_id(), Some("abc"));

        let html = w.transcript().to_html();
        assert!(html.contains("<div class=\"message user\"><div class=\"message-bubble\">hello</div></div>"));
        assert!(html.contains("hi there"));
        assert!(!html.contains(">...</div>"));

        let next = w.begin("and then?").unwrap();
        assert_eq!(next.request.session_id.as_deref(), Some("abc"));
    }

    #[test]
    fn failure_shows_one_error_and_keeps_session() {
        let mut w = widget(RenderPolicy::Append);
        let pending = w.begin("hello").unwrap();
        w.complete(pending, reply("abc", vec![ChatTurn::assistant("hi")]));

        let pending = w.begin("again").unwrap();
        let outcome = w.complete(
            pending,
            Err(WidgetError::Status { status: 502, body: "bad gateway".into() }),
        );
        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(w.session_id(), Some("abc"));

        let html = w.transcript().to_html();
        assert_eq!(html.matches(CONNECTION_ERROR_MESSAGE).count(), 1);
        assert!(!html.contains(">...</div>"));
        assert_eq!(w.transcript().len(), 4);
    }

    #[test]
    fn append_without_assistant_turn_says_sorry() {
        let mut w = widget(RenderPolicy::Append);
        let pending = w.begin("hello").unwrap();
        let outcome = w.complete(pending, reply("abc", vec![ChatTurn::user("hello")]));
        assert_eq!(outcome, Outcome::NoAssistantReply);
        assert!(w.transcript().to_html().contains(NO_RESPONSE_MESSAGE));
        assert_eq!(w.session_id(), Some("abc"));
    }

    #[test]
    fn replace_without_assistant_turn_says_sorry() {
        let mut w = widget(RenderPolicy::Replace);
        let pending = w.begin("hello").unwrap();
        let outcome = w.complete(pending, reply("abc", vec![]));
        assert_eq!(outcome, Outcome::NoAssistantReply);
        assert_eq!(w.transcript().len(), 1);
        assert!(w.transcript().to_html().contains(NO_RESPONSE_MESSAGE));

        let pending = w.begin("again").unwrap();
        let outcome = w.complete(
            pending,
            reply("abc", vec![ChatTurn::user("hello"), ChatTurn::assistant("hi"), ChatTurn::user("again")]),
        );
        assert_eq!(outcome, Outcome::NoAssistantReply);

        let entries = w.transcript().entries();
        let speakers: Vec<Speaker> = entries.iter().map(|e| e.speaker).collect();
        assert_eq!(speakers, vec![Speaker::User, Speaker::Ai, Speaker::User, Speaker::Ai]);
        assert!(entries[2].html.contains(">again</div>"));
        assert!(entries[3].html.contains(NO_RESPONSE_MESSAGE));
        assert_eq!(w.transcript().to_html().matches(NO_RESPONSE_MESSAGE).count(), 1);
    }

    #[test]
    fn replace_rerenders_full_history() {
        let mut w = widget(RenderPolicy::Replace);
        let pending = w.begin("second").unwrap();
        let outcome = w.complete(
            pending,
            reply(
                "abc",
                vec![
                    ChatTurn::user("first"),
                    ChatTurn::assistant("one"),
                    ChatTurn::user("second"),
                    ChatTurn::assistant("two"),
                ],
            ),
        );
        assert_eq!(outcome, Outcome::Answered);

        let speakers: Vec<Speaker> = w.transcript().entries().iter().map(|e| e.speaker).collect();
        assert_eq!(speakers, vec![Speaker::User, Speaker::Ai, Speaker::User, Speaker::Ai]);
        assert!(w.transcript().to_html().contains("first"));
    }

    #[test]
    fn overlapping_submissions_remove_their_own_placeholder() {
        let mut w = widget(RenderPolicy::Append);
        let first = w.begin("one").unwrap();
        let second = w.begin("two").unwrap();
        assert_eq!(w.transcript().len(), 4);

        w.complete(second, reply("abc", vec![ChatTurn::assistant("answer two")]));
        assert_eq!(w.transcript().to_html().matches(">...</div>").count(), 1);

        w.complete(first, reply("abc", vec![ChatTurn::assistant("answer one")]));
        assert!(!w.transcript().to_html().contains(">...</div>"));
        assert_eq!(w.transcript().len(), 4);
    }
}
