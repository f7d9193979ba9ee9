// 公开导出的模块，供外部使用
pub mod models;
pub mod data_provider;
pub mod errors;
pub mod config;
pub mod normalizer;
pub mod scrapers;
pub mod services;
pub mod storage;
pub mod trigger;
pub mod util;

// 重新导出常用类型，方便使用
pub use config::Config;
pub use models::partition::Partition;
pub use models::record::{RawRow, Record};
pub use data_provider::PartitionProvider;
pub use errors::{Result, DataHubError};
pub use services::pipeline_service::{PipelineService, PipelineStage, RunReport};
