use crate::errors::{DataHubError, Result};
use crate::trigger::TriggerConfig;
use chrono_tz::Tz;
use std::time::Duration;

pub const DEFAULT_SOURCE_URL: &str =
    "https://sistemaswebb3-listados.b3.com.br/indexPage/day/IBOV?language=pt-br";
pub const DEFAULT_STORAGE_BUCKET: &str = "bovespa-data-pipeline";
pub const DEFAULT_DOWNSTREAM_FUNCTION: &str = "trigger-glue-job";
pub const DEFAULT_BULK_JOB: &str = "bovespa-etl-job";

#[derive(Debug, Clone)]
pub struct Config {
    pub storage_bucket: String,
    pub source_url: String,
    pub downstream_function_name: String,
    pub bulk_job_name: String,
    /// 本地存储根目录，bucket 作为其下的子目录
    pub data_dir: String,
    /// 设置后改用 HTTP 对象存储
    pub storage_endpoint: Option<String>,
    pub invoke_endpoint: String,
    pub job_endpoint: String,
    pub request_timeout: Duration,
    /// 交易所所在时区，用于确定当天分区
    pub timezone: Tz,
    pub fail_on_empty: bool,
}

impl Config {
    pub fn new() -> Self {
        Self {
            storage_bucket: DEFAULT_STORAGE_BUCKET.to_string(),
            source_url: DEFAULT_SOURCE_URL.to_string(),
            downstream_function_name: DEFAULT_DOWNSTREAM_FUNCTION.to_string(),
            bulk_job_name: DEFAULT_BULK_JOB.to_string(),
            data_dir: "data".to_string(),
            storage_endpoint: None,
            invoke_endpoint: "http://localhost:9001".to_string(),
            job_endpoint: "http://localhost:9002".to_string(),
            request_timeout: Duration::from_secs(30),
            timezone: chrono_tz::America::Sao_Paulo,
            fail_on_empty: false,
        }
    }

    pub fn with_storage_bucket(mut self, bucket: &str) -> Self {
        self.storage_bucket = bucket.to_string();
        self
    }

    pub fn with_source_url(mut self, url: &str) -> Self {
        self.source_url = url.to_string();
        self
    }

    pub fn with_downstream_function_name(mut self, name: &str) -> Self {
        self.downstream_function_name = name.to_string();
        self
    }

    pub fn with_bulk_job_name(mut self, name: &str) -> Self {
        self.bulk_job_name = name.to_string();
        self
    }

    pub fn with_data_dir(mut self, dir: &str) -> Self {
        self.data_dir = dir.to_string();
        self
    }

    pub fn with_storage_endpoint(mut self, endpoint: Option<&str>) -> Self {
        self.storage_endpoint = endpoint.map(|e| e.trim_end_matches('/').to_string());
        self
    }

    pub fn with_invoke_endpoint(mut self, endpoint: &str) -> Self {
        self.invoke_endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    pub fn with_job_endpoint(mut self, endpoint: &str) -> Self {
        self.job_endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// 按 IANA 名称设置时区，例如 "America/Sao_Paulo"
    pub fn with_timezone(mut self, name: &str) -> Result<Self> {
        self.timezone = name
            .parse::<Tz>()
            .map_err(|e| DataHubError::ConfigError(format!("Invalid timezone {}: {}", name, e)))?;
        Ok(self)
    }

    pub fn with_fail_on_empty(mut self, fail_on_empty: bool) -> Self {
        self.fail_on_empty = fail_on_empty;
        self
    }

    /// Names shared by the notification and the job-control handler.
    pub fn trigger_config(&self) -> TriggerConfig {
        TriggerConfig {
            downstream_function_name: self.downstream_function_name.clone(),
            bulk_job_name: self.bulk_job_name.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
