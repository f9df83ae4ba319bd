//! Alias creation and resolution
//!
//! Creation writes the alias store first and then populates the cache.
//! Resolution is cache-aside: the cache is consulted first and the alias
//! store only on a miss. The cache is never repopulated from a store read
//! and expired entries found in it are left alone.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::cache::{AliasCache, CacheLookup};
use crate::config::StaticConfig;
use crate::errors::{LinkmeterError, Result};
use crate::storage::{AliasRecord, SeaOrmStorage};
use crate::utils::url_validator::validate_url;
use crate::utils::{generate_random_code, validate_custom_code};

/// Body of a create request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAliasRequest {
    #[serde(alias = "original")]
    pub url: String,
    #[serde(default)]
    pub custom_alias: Option<String>,
    /// RFC 3339 timestamp
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AliasCreated {
    pub code: String,
    pub short_url: String,
    pub target: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAlias {
    pub code: String,
    pub target: String,
}

pub struct AliasService {
    storage: Arc<SeaOrmStorage>,
    cache: Arc<dyn AliasCache>,
    public_base_url: String,
    code_length: usize,
    max_generate_attempts: u32,
}

impl AliasService {
    pub fn new(
        storage: Arc<SeaOrmStorage>,
        cache: Arc<dyn AliasCache>,
        public_base_url: impl Into<String>,
        code_length: usize,
        max_generate_attempts: u32,
    ) -> Self {
        Self {
            storage,
            cache,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            code_length: code_length.max(1),
            max_generate_attempts: max_generate_attempts.max(1),
        }
    }

    pub fn from_config(
        storage: Arc<SeaOrmStorage>,
        cache: Arc<dyn AliasCache>,
        config: &StaticConfig,
    ) -> Self {
        Self::new(
            storage,
            cache,
            config.server.public_base_url.clone(),
            config.links.code_length,
            config.links.max_generate_attempts,
        )
    }

    pub fn short_url(&self, code: &str) -> String {
        format!("{}/v1/s/{}", self.public_base_url, code)
    }

    /// Create a new alias.
    ///
    /// A taken custom alias is a `Conflict`. A taken generated code is
    /// redrawn up to `max_generate_attempts` times.
    pub async fn create(&self, req: CreateAliasRequest) -> Result<AliasCreated> {
        let target = validate_url(&req.url)
            .map_err(|e| LinkmeterError::validation(e.to_string()))?
            .to_string();

        let custom_alias = req.custom_alias.filter(|c| !c.is_empty());
        if let Some(ref custom) = custom_alias {
            validate_custom_code(custom)?;
        }

        let created_at = Utc::now().trunc_subsecs(3);
        if let Some(expires_at) = req.expires_at
            && expires_at <= created_at
        {
            return Err(LinkmeterError::validation(
                "expires_at must be in the future",
            ));
        }

        let record = match custom_alias {
            Some(custom) => {
                let record = AliasRecord {
                    code: custom.clone(),
                    target,
                    custom_alias: Some(custom),
                    created_at,
                    expires_at: req.expires_at,
                };
                self.storage.insert_alias(&record).await?;
                record
            }
            None => {
                self.insert_generated(target, created_at, req.expires_at)
                    .await?
            }
        };

        self.cache.insert(&record).await;

        info!(
            "AliasService: created '{}' -> '{}'{}",
            record.code,
            record.target,
            if record.is_custom() { " (custom)" } else { "" }
        );

        Ok(AliasCreated {
            short_url: self.short_url(&record.code),
            code: record.code,
            target: record.target,
            created_at: record.created_at,
            expires_at: record.expires_at,
        })
    }

    async fn insert_generated(
        &self,
        target: String,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<AliasRecord> {
        let mut record = AliasRecord {
            code: String::new(),
            target,
            custom_alias: None,
            created_at,
            expires_at,
        };

        for attempt in 1..=self.max_generate_attempts {
            record.code = generate_random_code(self.code_length);
            match self.storage.insert_alias(&record).await {
                Ok(()) => return Ok(record),
                Err(LinkmeterError::Conflict(_)) => {
                    debug!(
                        "Generated code '{}' already taken (attempt {}/{})",
                        record.code, attempt, self.max_generate_attempts
                    );
                }
                Err(e) => return Err(e),
            }
        }

        warn!(
            "No free code of length {} after {} attempts",
            self.code_length, self.max_generate_attempts
        );
        Err(LinkmeterError::internal(format!(
            "Could not allocate a unique code after {} attempts",
            self.max_generate_attempts
        )))
    }

    /// Resolve a code to its live target.
    ///
    /// Unknown and expired codes both yield `NotFound`.
    pub async fn resolve(&self, code: &str) -> Result<ResolvedAlias> {
        self.resolve_at(code, Utc::now()).await
    }

    pub async fn resolve_at(&self, code: &str, now: DateTime<Utc>) -> Result<ResolvedAlias> {
        if let CacheLookup::Hit(record) = self.cache.get(code).await {
            if !record.is_live_at(now) {
                debug!("Cached alias '{}' has expired", code);
                return Err(not_found(code));
            }
            trace!("Cache hit for '{}'", code);
            return Ok(ResolvedAlias {
                code: record.code,
                target: record.target,
            });
        }

        trace!("Cache miss for '{}', reading alias store", code);
        match self.storage.get_alias(code).await? {
            Some(record) if record.is_live_at(now) => Ok(ResolvedAlias {
                code: record.code,
                target: record.target,
            }),
            Some(_) => {
                debug!("Stored alias '{}' has expired", code);
                Err(not_found(code))
            }
            None => Err(not_found(code)),
        }
    }
}

fn not_found(code: &str) -> LinkmeterError {
    LinkmeterError::not_found(format!("Short link '{}' not found", code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_accepts_original_field_name() {
        let req: CreateAliasRequest =
            serde_json::from_str(r#"{"original":"https://example.com"}"#).unwrap();
        assert_eq!(req.url, "https://example.com");
        assert!(req.custom_alias.is_none());
        assert!(req.expires_at.is_none());
    }

    #[test]
    fn test_create_request_parses_rfc3339_expiry() {
        let req: CreateAliasRequest = serde_json::from_str(
            r#"{"url":"https://example.com","custom_alias":"promo","expires_at":"2030-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(req.custom_alias.as_deref(), Some("promo"));
        assert_eq!(
            req.expires_at.unwrap().to_rfc3339(),
            "2030-01-01T00:00:00+00:00"
        );
    }

    #[test]
    fn test_alias_created_omits_missing_expiry() {
        let created = AliasCreated {
            code: "abc123".to_string(),
            short_url: "http://sho.rt/v1/s/abc123".to_string(),
            target: "https://example.com".to_string(),
            created_at: Utc::now(),
            expires_at: None,
        };
        let json = serde_json::to_value(&created).unwrap();
        assert!(json.get("expires_at").is_none());
        assert_eq!(json["short_url"], "http://sho.rt/v1/s/abc123");
    }
}
