// src/render.rs
//! Turn chat turns into the HTML elements placed in `#chat-body`.
//!
//! Every message is a `div.message.{user|ai}` holding a `div.message-bubble`.
//! Assistant messages carry an avatar in front of the bubble. Images inside a
//! bubble are fitted to the bubble width; the avatar is left alone.

use pulldown_cmark::{Options, Parser, html};

use crate::message::{ChatTurn, Role, StructuredReply, TurnContent};

const IMAGE_URL_TAG: &str = "Image URL:";
const FITTED_IMAGE_STYLE: &str = "max-width: 100%; border-radius: 8px; margin-top: 10px;";

/// Which side of the conversation a transcript entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Ai,
}

impl Speaker {
    fn class(self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Ai => "ai",
        }
    }
}

impl From<Role> for Speaker {
    fn from(role: Role) -> Self {
        match role {
            Role::User => Speaker::User,
            Role::Assistant => Speaker::Ai,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Renderer {
    avatar_url: String,
    markdown: bool,
}

impl Renderer {
    pub fn new(avatar_url: impl Into<String>, markdown: bool) -> Self {
        Self { avatar_url: avatar_url.into(), markdown }
    }

    pub fn render_turn(&self, turn: &ChatTurn) -> String {
        match turn.role {
            Role::User => self.render_plain(Speaker::User, &content_as_text(&turn.content)),
            Role::Assistant => self.render_assistant(&turn.content),
        }
    }

    pub fn render_assistant(&self, content: &TurnContent) -> String {
        let bubble = match content {
            TurnContent::Text(text) => match StructuredReply::from_sectioned_text(text) {
                Some(reply) => structured_html(&reply),
                None if self.markdown => markdown_html(text),
                None => escape_html(text),
            },
            TurnContent::Structured(reply) => structured_html(reply),
        };
        self.message(Speaker::Ai, &bubble)
    }

    /// A bubble whose content is shown verbatim as text.
    pub fn render_plain(&self, speaker: Speaker, text: &str) -> String {
        self.message(speaker, &escape_html(text))
    }

    fn message(&self, speaker: Speaker, bubble_html: &str) -> String {
        let mut out = format!("<div class=\"message {}\">", speaker.class());
        if speaker == Speaker::Ai {
            out.push_str(&format!(
                "<img class=\"avatar\" src=\"{}\" alt=\"Assistant\">",
                escape_html(&self.avatar_url)
            ));
        }
        out.push_str("<div class=\"message-bubble\">");
        out.push_str(&fit_images(bubble_html));
        out.push_str("</div></div>");
        out
    }
}

fn content_as_text(content: &TurnContent) -> String {
    match content {
        TurnContent::Text(text) => text.clone(),
        TurnContent::Structured(reply) => [
            reply.greeting.clone(),
            reply.direct_answer.clone(),
            (!reply.product_information.is_empty()).then(|| reply.product_information.join("\n")),
            reply.additional_context.clone(),
            reply.closing.clone(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("\n"),
    }
}

fn markdown_html(text: &str) -> String {
    let parser = Parser::new_ext(text, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH);
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn structured_html(reply: &StructuredReply) -> String {
    let mut out = String::new();
    let paragraph = |out: &mut String, text: &str| {
        out.push_str("<p>");
        out.push_str(&escape_html(text));
        out.push_str("</p>");
    };

    if let Some(greeting) = &reply.greeting {
        paragraph(&mut out, greeting);
    }
    if let Some(answer) = &reply.direct_answer {
        paragraph(&mut out, answer);
    }
    if !reply.product_information.is_empty() {
        out.push_str("<div class=\"product-info\">");
        for line in &reply.product_information {
            match image_url(line) {
                Some(url) => out.push_str(&format!(
                    "<img src=\"{}\" alt=\"Product Image\">",
                    escape_html(url)
                )),
                None => paragraph(&mut out, line),
            }
        }
        out.push_str("</div>");
    }
    if let Some(context) = &reply.additional_context {
        paragraph(&mut out, context);
    }
    if let Some(closing) = &reply.closing {
        paragraph(&mut out, closing);
    }
    out
}

/// The URL following an `Image URL:` tag anywhere in the line.
fn image_url(line: &str) -> Option<&str> {
    line.split_once(IMAGE_URL_TAG)
        .map(|(_, url)| url.trim())
        .filter(|url| !url.is_empty())
}

/// Give every `<img>` in `html` the fitted style. An existing `style`
/// attribute is replaced.
pub fn fit_images(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = find_img_open(rest) {
        let after_tag = &rest[start + 4..];
        let is_tag = after_tag
            .chars()
            .next()
            .is_some_and(|c| c.is_whitespace() || c == '>' || c == '/');
        let Some(end) = after_tag.find('>').filter(|_| is_tag) else {
            out.push_str(&rest[..start + 4]);
            rest = after_tag;
            continue;
        };

        out.push_str(&rest[..start]);
        let attrs = strip_style_attr(&after_tag[..end]);
        let (attrs, self_closing) = match attrs.trim_end().strip_suffix('/') {
            Some(stripped) => (stripped.trim_end().to_string(), true),
            None => (attrs.trim_end().to_string(), false),
        };
        out.push_str("<img");
        out.push_str(&attrs);
        out.push_str(&format!(" style=\"{FITTED_IMAGE_STYLE}\""));
        out.push_str(if self_closing { " />" } else { ">" });
        rest = &after_tag[end + 1..];
    }

    out.push_str(rest);
    out
}

/// Byte offset of the next `<img`, ignoring ASCII case.
fn find_img_open(html: &str) -> Option<usize> {
    html.as_bytes()
        .windows(4)
        .position(|w| w.eq_ignore_ascii_case(b"<img"))
}

fn strip_style_attr(attrs: &str) -> String {
    let Some(pos) = attrs.find(" style=\"") else {
        return attrs.to_string();
    };
    let value_start = pos + " style=\"".len();
    match attrs[value_start..].find('"') {
        Some(close) => format!("{}{}", &attrs[..pos], &attrs[value_start + close + 1..]),
        None => attrs.to_string(),
    }
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
