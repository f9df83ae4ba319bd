use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A short code and where it points.
///
/// Records are written once and never updated. This is also the value
/// stored in the cache, serialized as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasRecord {
    pub code: String,
    pub target: String,
    #[serde(default)]
    pub custom_alias: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AliasRecord {
    /// Live iff there is no expiry or the expiry is still ahead of `now`.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|exp| exp > now)
    }

    pub fn is_custom(&self) -> bool {
        self.custom_alias.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(expires_at: Option<DateTime<Utc>>) -> AliasRecord {
        AliasRecord {
            code: "abc123".to_string(),
            target: "https://example.com".to_string(),
            custom_alias: None,
            created_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn test_liveness() {
        let now = Utc::now();
        assert!(record(None).is_live_at(now));
        assert!(record(Some(now + Duration::seconds(1))).is_live_at(now));
        assert!(!record(Some(now)).is_live_at(now));
        assert!(!record(Some(now - Duration::days(1))).is_live_at(now));
    }

    #[test]
    fn test_cache_payload_shape() {
        let json = r#"{"code":"x1","target":"https://a.b","created_at":"2024-01-01T00:00:00Z"}"#;
        let parsed: AliasRecord = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.code, "x1");
        assert!(parsed.custom_alias.is_none());
        assert!(parsed.expires_at.is_none());
        assert!(!parsed.is_custom());
    }
}
