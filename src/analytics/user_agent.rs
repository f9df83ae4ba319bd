//! User-agent classification for click rows

use woothee::parser::Parser;

pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Bot,
    Mobile,
    Desktop,
    Unknown,
}

impl DeviceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Bot => "Bot",
            DeviceKind::Mobile => "Mobile",
            DeviceKind::Desktop => "Desktop",
            DeviceKind::Unknown => UNKNOWN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUserAgent {
    pub browser: String,
    pub os: String,
    pub device: DeviceKind,
}

impl ParsedUserAgent {
    fn unknown() -> Self {
        Self {
            browser: UNKNOWN.to_string(),
            os: UNKNOWN.to_string(),
            device: DeviceKind::Unknown,
        }
    }
}

/// Classify a raw `User-Agent` header.
///
/// Empty input is unknown on every axis. Otherwise the device is `Bot` for
/// crawler signatures, then `Mobile` for phone signatures, else `Desktop`.
pub fn parse_user_agent(raw: &str) -> ParsedUserAgent {
    let raw = raw.trim();
    if raw.is_empty() {
        return ParsedUserAgent::unknown();
    }

    let result = Parser::new().parse(raw).unwrap_or_default();

    let device = match result.category {
        "crawler" => DeviceKind::Bot,
        "smartphone" | "mobilephone" => DeviceKind::Mobile,
        _ => DeviceKind::Desktop,
    };

    ParsedUserAgent {
        browser: known_or_unknown(result.name),
        os: known_or_unknown(result.os),
        device,
    }
}

fn known_or_unknown(value: &str) -> String {
    if value.is_empty() || value == "UNKNOWN" {
        UNKNOWN.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_unknown() {
        assert_eq!(parse_user_agent(""), ParsedUserAgent::unknown());
        assert_eq!(parse_user_agent("   ").device, DeviceKind::Unknown);
    }

    #[test]
    fn test_desktop_chrome() {
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
        let parsed = parse_user_agent(ua);
        assert_eq!(parsed.browser, "Chrome");
        assert_eq!(parsed.os, "Windows 10");
        assert_eq!(parsed.device, DeviceKind::Desktop);
    }

    #[test]
    fn test_iphone_is_mobile() {
        let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
        let parsed = parse_user_agent(ua);
        assert_eq!(parsed.browser, "Safari");
        assert_eq!(parsed.os, "iPhone");
        assert_eq!(parsed.device, DeviceKind::Mobile);
    }

    #[test]
    fn test_crawler_is_bot() {
        let ua = "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";
        let parsed = parse_user_agent(ua);
        assert_eq!(parsed.browser, "Googlebot");
        assert_eq!(parsed.device, DeviceKind::Bot);
    }

    #[test]
    fn test_unrecognized_is_desktop_with_unknown_names() {
        let parsed = parse_user_agent("definitely-not-a-browser");
        assert_eq!(parsed.browser, UNKNOWN);
        assert_eq!(parsed.os, UNKNOWN);
        assert_eq!(parsed.device, DeviceKind::Desktop);
    }
}
