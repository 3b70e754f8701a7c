// HTTP sheet source for published Google Sheets CSV exports
use crate::application::sheet_source::SheetSource;
use crate::infrastructure::csv_decoder::SheetError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpSheetSource {
    client: reqwest::Client,
}

impl HttpSheetSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SheetSource for HttpSheetSource {
    async fn fetch_csv(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header("Accept", "text/csv")
            .send()
            .await
            .map_err(SheetError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SheetError::Status(status).into());
        }

        let text = response.text().await.map_err(SheetError::from)?;
        tracing::debug!("Fetched {} bytes from {}", text.len(), url);
        Ok(text)
    }
}
