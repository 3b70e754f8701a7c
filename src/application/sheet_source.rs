// Source trait for published sheet data
use async_trait::async_trait;

#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Fetch the raw CSV document published at `url`
    async fn fetch_csv(&self, url: &str) -> anyhow::Result<String>;
}
