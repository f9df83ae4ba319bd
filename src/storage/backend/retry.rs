//! Retry with exponential backoff for transient database failures

use std::future::Future;
use std::time::Duration;

use sea_orm::DbErr;
use tokio::time::sleep;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

/// Pool exhaustion, dropped connections and lock contention are worth
/// another attempt. Everything else fails fast.
pub fn is_retryable_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(runtime_err) | DbErr::Query(runtime_err) => {
            let msg = runtime_err.to_string().to_lowercase();
            msg.contains("deadlock")
                || msg.contains("database is locked")
                || msg.contains("lock wait timeout")
                || msg.contains("serialization failure")
        }
        _ => false,
    }
}

pub async fn with_retry<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    mut operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("'{}' succeeded after {} retries", operation_name, attempt);
                }
                return Ok(value);
            }
            Err(e) if is_retryable_error(&e) && attempt < config.max_retries => {
                attempt += 1;
                let delay = backoff_delay(attempt, config.base_delay_ms, config.max_delay_ms);
                warn!(
                    "'{}' failed (attempt {}/{}): {}; retrying in {} ms",
                    operation_name,
                    attempt,
                    config.max_retries + 1,
                    e,
                    delay
                );
                sleep(Duration::from_millis(delay)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// `base * 2^(attempt-1)` capped at `max`, plus up to 25% jitter.
fn backoff_delay(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    let exp = base_ms.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
    let capped = exp.min(max_ms);
    capped.saturating_add(rand::random_range(0..=capped / 4))
}
