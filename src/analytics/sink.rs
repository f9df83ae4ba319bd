use super::ClickRecord;

/// Destination for recorded clicks.
#[async_trait::async_trait]
pub trait ClickSink: Send + Sync {
    /// Append exactly one click row. Callers do not retry.
    async fn insert_click(&self, click: ClickRecord) -> anyhow::Result<()>;
}
