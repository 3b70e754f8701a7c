// Sheet loader - Fetch, decode and memoize published sheets
use crate::application::cache::{Clock, TtlCache};
use crate::application::sheet_source::SheetSource;
use crate::domain::table::Table;
use crate::infrastructure::csv_decoder::decode;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct LoadedSheet {
    pub table: Arc<Table>,
    /// User-facing message when the sheet could not be loaded
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct SheetLoader {
    source: Arc<dyn SheetSource>,
    cache: Arc<TtlCache<String, Table>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl SheetLoader {
    pub fn new(source: Arc<dyn SheetSource>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            source,
            cache: Arc::new(TtlCache::new()),
            clock,
            ttl,
        }
    }

    /// Load the sheet at `url`. Failures never propagate: the caller gets an
    /// empty table and a message to show.
    pub async fn load(&self, url: &str) -> LoadedSheet {
        let now = self.clock.now();

        if let Some(table) = self.cache.get_fresh(&url.to_string(), now, self.ttl) {
            tracing::debug!("Sheet cache hit for {}", url);
            return LoadedSheet { table, error: None };
        }

        tracing::debug!("Sheet cache miss for {}", url);
        self.cache.purge_expired(now, self.ttl);

        let result = self
            .cache
            .get_or_fetch(url.to_string(), now, self.ttl, move || async move {
                let text = self.source.fetch_csv(url).await?;
                let table = decode(&text)?;
                anyhow::Ok(table)
            })
            .await;

        match result {
            Ok(table) => {
                tracing::debug!(
                    "Loaded {} rows from {} ({} sheets cached)",
                    table.row_count(),
                    url,
                    self.cache.len()
                );
                LoadedSheet { table, error: None }
            }
            Err(e) => {
                tracing::warn!("Error loading data from {}: {:#}", url, e);
                LoadedSheet {
                    table: Arc::new(Table::empty()),
                    error: Some(format!("Error loading data from URL: {:#}", e)),
                }
            }
        }
    }
}
