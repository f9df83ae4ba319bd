pub mod recorder;
pub mod sink;
pub mod user_agent;

pub use recorder::{ClickRecorder, RecorderStats};
pub use sink::ClickSink;
pub use user_agent::{ParsedUserAgent, parse_user_agent};

use chrono::{DateTime, Utc};

/// A click as captured on the redirect path, before any parsing.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub code: String,
    pub timestamp: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

impl ClickEvent {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            timestamp: Utc::now(),
            ip: None,
            user_agent: None,
            referer: None,
        }
    }

    pub fn with_ip(mut self, ip: Option<String>) -> Self {
        self.ip = ip;
        self
    }

    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn with_referer(mut self, referer: Option<String>) -> Self {
        self.referer = referer;
        self
    }
}

/// Row appended to the click store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickRecord {
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub device: Option<String>,
    pub raw_user_agent: Option<String>,
    pub referer: Option<String>,
}

impl From<ClickEvent> for ClickRecord {
    fn from(event: ClickEvent) -> Self {
        let parsed = parse_user_agent(event.user_agent.as_deref().unwrap_or_default());
        Self {
            code: event.code,
            created_at: event.timestamp,
            ip: event.ip.filter(|ip| !ip.is_empty()),
            browser: Some(parsed.browser),
            os: Some(parsed.os),
            device: Some(parsed.device.as_str().to_string()),
            raw_user_agent: event.user_agent.filter(|ua| !ua.is_empty()),
            referer: event.referer.filter(|r| !r.is_empty()),
        }
    }
}
