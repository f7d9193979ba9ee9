use crate::models::record::RawRow;
use crate::errors::Result;
use async_trait::async_trait;

/// Base trait for index table scrapers
#[async_trait]
pub trait IndexScraper {
    /// Human-readable source name, used in logs
    fn source_name(&self) -> &str;

    /// Fetch the listed rows in page order, header excluded
    async fn fetch_rows(&self) -> Result<Vec<RawRow>>;
}
