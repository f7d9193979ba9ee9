use crate::config::Config;
use crate::errors::{DataHubError, Result};
use crate::models::partition::Partition;
use crate::normalizer;
use crate::scrapers::base::IndexScraper;
use crate::storage::BlobStore;
use crate::trigger::{DownstreamEvent, Trigger};
use crate::util::parquet_utils;
use chrono::NaiveDate;
use log::{error, info, warn};
use std::fmt;
use std::sync::Arc;

/// 单次运行的阶段，任何阶段失败都直接进入 `Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Start,
    Extract,
    Normalize,
    Encode,
    Store,
    Notify,
    Done,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Start => "START",
            PipelineStage::Extract => "EXTRACT",
            PipelineStage::Normalize => "NORMALIZE",
            PipelineStage::Encode => "ENCODE",
            PipelineStage::Store => "STORE",
            PipelineStage::Notify => "NOTIFY",
            PipelineStage::Done => "DONE",
            PipelineStage::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub partition: Partition,
    pub raw_key: String,
    pub location: String,
    pub rows: usize,
    pub bytes: usize,
    pub stage: PipelineStage,
}

/// 抓取 → 规范化 → 编码 → 存储 → 通知
pub struct PipelineService {
    config: Config,
    scraper: Arc<dyn IndexScraper + Send + Sync>,
    store: Arc<dyn BlobStore + Send + Sync>,
    trigger: Trigger,
}

impl PipelineService {
    pub fn new(
        config: Config,
        scraper: Arc<dyn IndexScraper + Send + Sync>,
        store: Arc<dyn BlobStore + Send + Sync>,
        trigger: Trigger,
    ) -> Self {
        Self {
            config,
            scraper,
            store,
            trigger,
        }
    }

    /// Run for today's partition in the exchange timezone.
    pub async fn run(&self) -> Result<RunReport> {
        let partition = Partition::today(self.config.timezone);
        self.run_at(partition.date).await
    }

    /// Run with an explicit execution date.
    pub async fn run_at(&self, run_date: NaiveDate) -> Result<RunReport> {
        let partition = Partition::new(run_date);
        info!("Pipeline {} for partition {}", PipelineStage::Start, partition);

        let mut stage = PipelineStage::Start;
        match self.execute(&partition, &mut stage).await {
            Ok(report) => {
                info!(
                    "Pipeline {}: {} rows, {} bytes at {}",
                    PipelineStage::Done, report.rows, report.bytes, report.location
                );
                Ok(report)
            }
            Err(e) => {
                error!(
                    "Pipeline {} at {} for partition {} ({}): {}",
                    PipelineStage::Failed, stage, partition, e.kind(), e
                );
                Err(e)
            }
        }
    }

    fn enter(stage: &mut PipelineStage, next: PipelineStage) {
        info!("{} -> {}", stage, next);
        *stage = next;
    }

    async fn execute(&self, partition: &Partition, stage: &mut PipelineStage) -> Result<RunReport> {
        Self::enter(stage, PipelineStage::Extract);
        let rows = self.scraper.fetch_rows().await?;
        info!("Extracted {} rows from {}", rows.len(), self.scraper.source_name());

        Self::enter(stage, PipelineStage::Normalize);
        let records = normalizer::normalize(&rows, partition.date)?;

        if records.is_empty() {
            if self.config.fail_on_empty {
                return Err(DataHubError::EmptyTable(format!(
                    "No rows extracted from {} for partition {}",
                    self.scraper.source_name(),
                    partition
                )));
            }
            warn!(
                "No rows extracted for partition {}; storing an empty table (source layout may have changed)",
                partition
            );
        }

        Self::enter(stage, PipelineStage::Encode);
        let blob = parquet_utils::encode(&records)?;
        let bytes = blob.len();

        Self::enter(stage, PipelineStage::Store);
        let raw_key = partition.raw_key();
        let location = self.store.describe(&raw_key);
        self.store.put(&raw_key, blob).await?;
        info!("Raw partition written to {}", location);

        Self::enter(stage, PipelineStage::Notify);
        self.trigger
            .notify_downstream(&DownstreamEvent::run_started(partition))
            .await?;

        Self::enter(stage, PipelineStage::Done);
        Ok(RunReport {
            partition: *partition,
            raw_key,
            location,
            rows: records.len(),
            bytes,
            stage: *stage,
        })
    }
}
