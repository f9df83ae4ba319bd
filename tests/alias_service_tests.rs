//! AliasService tests
//!
//! Creation and cache-aside resolution against a temporary SQLite store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use linkmeter::cache::{AliasCache, CacheLookup, decode_entry};
use linkmeter::config::DatabaseConfig;
use linkmeter::errors::LinkmeterError;
use linkmeter::services::{AliasService, CreateAliasRequest};
use linkmeter::storage::{AliasRecord, SeaOrmStorage, StorageFactory};
use linkmeter::utils::CODE_ALPHABET;
use tempfile::TempDir;
use tokio::sync::RwLock;

// =============================================================================
// Test Setup
// =============================================================================

/// In-memory cache holding serialized payloads, like a remote cache would
struct MockCache {
    data: RwLock<HashMap<String, String>>,
}

impl MockCache {
    fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    async fn contains(&self, code: &str) -> bool {
        self.data.read().await.contains_key(code)
    }

    async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    async fn put_raw(&self, code: &str, payload: &str) {
        self.data
            .write()
            .await
            .insert(code.to_string(), payload.to_string());
    }
}

#[async_trait]
impl AliasCache for MockCache {
    async fn get(&self, code: &str) -> CacheLookup {
        match self.data.read().await.get(code) {
            Some(payload) => decode_entry(code, payload),
            None => CacheLookup::Miss,
        }
    }

    async fn insert(&self, record: &AliasRecord) {
        let payload = serde_json::to_string(record).unwrap();
        self.put_raw(&record.code, &payload).await;
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

async fn create_temp_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("aliases.db");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        ..Default::default()
    };

    let storage = StorageFactory::create(&config)
        .await
        .expect("Failed to create storage");
    (storage, temp_dir)
}

async fn setup() -> (AliasService, Arc<SeaOrmStorage>, Arc<MockCache>, TempDir) {
    let (storage, temp_dir) = create_temp_storage().await;
    let cache = Arc::new(MockCache::new());
    let service = AliasService::new(
        storage.clone(),
        cache.clone(),
        "https://lm.example/",
        6,
        5,
    );
    (service, storage, cache, temp_dir)
}

fn request(url: &str) -> CreateAliasRequest {
    CreateAliasRequest {
        url: url.to_string(),
        custom_alias: None,
        expires_at: None,
    }
}

fn stored_record(code: &str, expires_in: Option<Duration>) -> AliasRecord {
    let now = Utc::now();
    AliasRecord {
        code: code.to_string(),
        target: format!("https://example.com/{}", code),
        custom_alias: None,
        created_at: now - Duration::days(2),
        expires_at: expires_in.map(|d| now + d),
    }
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_generated_code() {
    let (service, storage, cache, _temp_dir) = setup().await;

    let created = service
        .create(request("https://example.com/some/long/path"))
        .await
        .unwrap();

    assert_eq!(created.code.len(), 6);
    assert!(created.code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    assert_eq!(created.target, "https://example.com/some/long/path");
    assert_eq!(
        created.short_url,
        format!("https://lm.example/v1/s/{}", created.code)
    );
    assert!(created.expires_at.is_none());

    // Written to both the store and the cache
    assert!(storage.alias_exists(&created.code).await.unwrap());
    assert!(cache.contains(&created.code).await);
}

#[tokio::test]
async fn test_create_then_resolve() {
    let (service, _storage, _cache, _temp_dir) = setup().await;

    let created = service
        .create(request("https://example.com/target"))
        .await
        .unwrap();
    let resolved = service.resolve(&created.code).await.unwrap();

    assert_eq!(resolved.code, created.code);
    assert_eq!(resolved.target, "https://example.com/target");
}

#[tokio::test]
async fn test_duplicate_custom_alias_conflicts() {
    let (service, _storage, _cache, _temp_dir) = setup().await;

    let mut first = request("https://example.com/first");
    first.custom_alias = Some("promo2024".to_string());
    service.create(first).await.unwrap();

    let mut second = request("https://example.com/second");
    second.custom_alias = Some("promo2024".to_string());
    let result = service.create(second).await;
    assert!(matches!(result, Err(LinkmeterError::Conflict(_))));

    // The first alias is untouched
    let resolved = service.resolve("promo2024").await.unwrap();
    assert_eq!(resolved.target, "https://example.com/first");
}

#[tokio::test]
async fn test_empty_custom_alias_generates_code() {
    let (service, _storage, _cache, _temp_dir) = setup().await;

    let mut req = request("https://example.com");
    req.custom_alias = Some(String::new());
    let created = service.create(req).await.unwrap();

    assert_eq!(created.code.len(), 6);
}

#[tokio::test]
async fn test_create_rejects_invalid_input() {
    let (service, storage, cache, _temp_dir) = setup().await;

    for bad_url in ["", "not a url", "ftp://example.com/file", "javascript:alert(1)"] {
        let result = service.create(request(bad_url)).await;
        assert!(
            matches!(result, Err(LinkmeterError::Validation(_))),
            "expected validation error for {:?}",
            bad_url
        );
    }

    let too_long = "x".repeat(31);
    for bad_code in ["ab", "has space", "dash-code", too_long.as_str()] {
        let mut req = request("https://example.com");
        req.custom_alias = Some(bad_code.to_string());
        let result = service.create(req).await;
        assert!(
            matches!(result, Err(LinkmeterError::Validation(_))),
            "expected validation error for {:?}",
            bad_code
        );
        assert!(!storage.alias_exists(bad_code).await.unwrap());
    }

    let mut past = request("https://example.com");
    past.expires_at = Some(Utc::now() - Duration::minutes(1));
    assert!(matches!(
        service.create(past).await,
        Err(LinkmeterError::Validation(_))
    ));

    assert_eq!(cache.len().await, 0);
}

#[tokio::test]
async fn test_generated_code_exhaustion_is_internal_error() {
    let (storage, _temp_dir) = create_temp_storage().await;
    let cache = Arc::new(MockCache::new());
    // One-character codes: occupy the whole space so every draw collides
    let service = AliasService::new(storage.clone(), cache, "https://lm.example", 1, 5);

    for &b in CODE_ALPHABET.iter() {
        let code = (b as char).to_string();
        storage
            .insert_alias(&stored_record(&code, None))
            .await
            .unwrap();
    }

    let result = service.create(request("https://example.com")).await;
    assert!(matches!(result, Err(LinkmeterError::Internal(_))));
}

#[tokio::test]
async fn test_insert_alias_conflict_from_store() {
    let (_service, storage, _cache, _temp_dir) = setup().await;

    storage
        .insert_alias(&stored_record("taken", None))
        .await
        .unwrap();
    let result = storage.insert_alias(&stored_record("taken", None)).await;
    assert!(matches!(result, Err(LinkmeterError::Conflict(_))));
}

// =============================================================================
// Resolve
// =============================================================================

#[tokio::test]
async fn test_resolve_unknown_code() {
    let (service, _storage, _cache, _temp_dir) = setup().await;

    let result = service.resolve("nope42").await;
    assert!(matches!(result, Err(LinkmeterError::NotFound(_))));
}

#[tokio::test]
async fn test_store_fallback_does_not_populate_cache() {
    let (service, storage, cache, _temp_dir) = setup().await;

    storage
        .insert_alias(&stored_record("direct", None))
        .await
        .unwrap();

    let resolved = service.resolve("direct").await.unwrap();
    assert_eq!(resolved.target, "https://example.com/direct");
    assert!(!cache.contains("direct").await);

    // A second resolution still goes to the store
    service.resolve("direct").await.unwrap();
    assert_eq!(cache.len().await, 0);
}

#[tokio::test]
async fn test_cache_hit_is_served_without_store() {
    let (service, storage, cache, _temp_dir) = setup().await;

    // Present only in the cache
    cache.insert(&stored_record("cached", None)).await;
    assert!(!storage.alias_exists("cached").await.unwrap());

    let resolved = service.resolve("cached").await.unwrap();
    assert_eq!(resolved.target, "https://example.com/cached");
}

#[tokio::test]
async fn test_undecodable_cache_entry_falls_back_to_store() {
    let (service, storage, cache, _temp_dir) = setup().await;

    storage
        .insert_alias(&stored_record("garbled", None))
        .await
        .unwrap();
    cache.put_raw("garbled", "not json").await;

    let resolved = service.resolve("garbled").await.unwrap();
    assert_eq!(resolved.target, "https://example.com/garbled");

    cache
        .put_raw("clipped", r#"{"code":"clipped","target":"https://a"#)
        .await;
    let result = service.resolve("clipped").await;
    assert!(matches!(result, Err(LinkmeterError::NotFound(_))));
}

#[tokio::test]
async fn test_expired_alias_with_stale_cache_entry() {
    let (service, storage, cache, _temp_dir) = setup().await;

    let record = stored_record("gone", Some(-Duration::hours(1)));
    storage.insert_alias(&record).await.unwrap();
    cache.insert(&record).await;

    let result = service.resolve("gone").await;
    assert!(matches!(result, Err(LinkmeterError::NotFound(_))));

    // Stale entries are left for the cache's own TTL to evict
    assert!(cache.contains("gone").await);
}

#[tokio::test]
async fn test_expired_alias_in_store_only() {
    let (service, storage, _cache, _temp_dir) = setup().await;

    storage
        .insert_alias(&stored_record("old", Some(-Duration::minutes(5))))
        .await
        .unwrap();

    let result = service.resolve("old").await;
    assert!(matches!(result, Err(LinkmeterError::NotFound(_))));
}

#[tokio::test]
async fn test_alias_expires_over_time() {
    let (service, _storage, cache, _temp_dir) = setup().await;

    let mut req = request("https://example.com/soon");
    req.expires_at = Some(Utc::now() + Duration::minutes(10));
    let created = service.create(req).await.unwrap();
    assert!(cache.contains(&created.code).await);

    let now = Utc::now();
    assert!(service.resolve_at(&created.code, now).await.is_ok());

    let later = now + Duration::hours(1);
    let result = service.resolve_at(&created.code, later).await;
    assert!(matches!(result, Err(LinkmeterError::NotFound(_))));
}
