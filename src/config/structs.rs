use serde::{Deserialize, Serialize};

/// Static configuration, loaded once at startup.
///
/// Priority: ENV > TOML file > defaults.
/// ENV prefix `LM`, separator `__`, e.g. `LM__SERVER__PORT=9999`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub links: LinksConfig,
    #[serde(default)]
    pub click_recorder: ClickRecorderConfig,
}

impl StaticConfig {
    pub const DEFAULT_PATH: &'static str = "config.toml";

    /// Load from a TOML file and the environment.
    ///
    /// Falls back to defaults (with a message on stderr) when the sources
    /// cannot be parsed; logging is not initialized yet at this point.
    pub fn load(path: Option<&str>) -> Self {
        use config::{Config, Environment, File};

        let explicit = path.is_some();
        let path = path.unwrap_or(Self::DEFAULT_PATH);

        let builder = Config::builder()
            .add_source(File::with_name(path).required(explicit))
            .add_source(
                Environment::with_prefix("LM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("# Error generating sample config: {}", e))
    }

    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// Base used to build the resolvable short URL in create responses
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    /// Connect/acquire timeout in seconds
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// `redis`, `memory` or `none`
    #[serde(rename = "type")]
    #[serde(default = "default_cache_type")]
    pub cache_type: String,
    /// Entry lifetime in seconds, independent of alias expiry
    #[serde(default = "default_cache_ttl")]
    pub default_ttl: u64,
    #[serde(default = "default_cache_key_prefix")]
    pub key_prefix: String,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Per-command timeout; slower answers count as a miss
    #[serde(default = "default_redis_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_memory_capacity")]
    pub max_capacity: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `text` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    #[serde(default = "default_code_length")]
    pub code_length: usize,
    /// Fresh codes drawn when a generated code collides
    #[serde(default = "default_max_generate_attempts")]
    pub max_generate_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickRecorderConfig {
    /// Clicks waiting to be written; further clicks are dropped
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Concurrent writers, and so the most click-store connections in use
    #[serde(default = "default_recorder_workers")]
    pub workers: usize,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_public_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_database_url() -> String {
    "sqlite://linkmeter.db?mode=rwc".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    8
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_cache_type() -> String {
    "memory".to_string()
}

fn default_cache_ttl() -> u64 {
    3600
}

fn default_cache_key_prefix() -> String {
    "url:".to_string()
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/".to_string()
}

fn default_redis_timeout_ms() -> u64 {
    250
}

fn default_memory_capacity() -> u64 {
    10000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_code_length() -> usize {
    6
}

fn default_max_generate_attempts() -> u32 {
    5
}

fn default_queue_capacity() -> usize {
    10000
}

fn default_recorder_workers() -> usize {
    4
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            public_base_url: default_public_base_url(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_type: default_cache_type(),
            default_ttl: default_cache_ttl(),
            key_prefix: default_cache_key_prefix(),
            redis: RedisConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            timeout_ms: default_redis_timeout_ms(),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_memory_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
            max_generate_attempts: default_max_generate_attempts(),
        }
    }
}

impl Default for ClickRecorderConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            workers: default_recorder_workers(),
        }
    }
}
