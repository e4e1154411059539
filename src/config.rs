// src/config.rs
use std::{net::SocketAddr, path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum, builder::BoolishValueParser};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8001/ask";
pub const DEFAULT_AVATAR_URL: &str = "https://i.imgur.com/7a7yXVB.png";
pub const DEFAULT_TITLE: &str = "AI Assistant";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_PAGE_TTL_SECS: u64 = 30 * 60;

/// How a successful response updates the transcript.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum RenderPolicy {
    /// Append only the newest assistant turn.
    #[default]
    Append,
    /// Re-render the whole transcript from the returned history.
    Replace,
}

/// Widget server settings. Every flag can also be set through its
/// environment variable (a `.env` file is loaded first by the binary).
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct WidgetConfig {
    /// Chat endpoint questions are posted to
    #[arg(long, env = "ASK_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Page title and header text
    #[arg(long, env = "WIDGET_TITLE", default_value = DEFAULT_TITLE)]
    pub title: String,

    /// Avatar shown next to assistant messages
    #[arg(long, env = "AVATAR_URL", default_value = DEFAULT_AVATAR_URL)]
    pub avatar_url: String,

    /// Append the newest reply or re-render the whole history
    #[arg(long, env = "RENDER_POLICY", value_enum, ignore_case = true, default_value_t = RenderPolicy::Append)]
    pub render_policy: RenderPolicy,

    /// Render assistant text as Markdown
    #[arg(
        long,
        env = "RENDER_MARKDOWN",
        default_value = "true",
        value_parser = BoolishValueParser::new(),
        action = clap::ArgAction::Set
    )]
    pub markdown: bool,

    /// Address the widget server listens on
    #[arg(long, env = "BIND_ADDR", default_value = DEFAULT_BIND_ADDR)]
    pub bind_addr: SocketAddr,

    /// Seconds an idle page is kept
    #[arg(long, env = "PAGE_TTL_SECS", default_value_t = DEFAULT_PAGE_TTL_SECS)]
    pub page_ttl_secs: u64,

    /// Directory served for static assets
    #[arg(long, env = "ASSETS_DIR", default_value = "public")]
    pub assets_dir: PathBuf,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            title: DEFAULT_TITLE.to_string(),
            avatar_url: DEFAULT_AVATAR_URL.to_string(),
            render_policy: RenderPolicy::Append,
            markdown: true,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            page_ttl_secs: DEFAULT_PAGE_TTL_SECS,
            assets_dir: PathBuf::from("public"),
        }
    }
}

impl WidgetConfig {
    pub fn load() -> Result<Self, clap::Error> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args)
    }

    pub fn page_ttl(&self) -> Duration {
        Duration::from_secs(self.page_ttl_secs)
    }
}
