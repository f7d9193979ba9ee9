//! Downstream hand-off: the fire-and-forget notification sent after a raw
//! partition is stored, and the job-control handler that starts the
//! bulk-transform job.

pub mod http;

use crate::errors::{DataHubError, Result};
use crate::models::partition::Partition;
use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

pub use http::{HttpFunctionInvoker, HttpJobRunner};

pub const JOB_STARTED_MESSAGE: &str = "Bulk transform job started";

/// 下游函数名与批处理作业名，构造时注入
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerConfig {
    pub downstream_function_name: String,
    pub bulk_job_name: String,
}

/// Event sent to the downstream function once a raw partition is stored.
///
/// Delivery is at-least-once; consumers deduplicate on `idempotency_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownstreamEvent {
    pub event: String,
    pub partition: String,
    pub raw_key: String,
    pub refined_prefix: String,
    pub idempotency_key: String,
}

impl DownstreamEvent {
    pub fn run_started(partition: &Partition) -> Self {
        Self {
            event: "run_started".to_string(),
            partition: partition.date_key(),
            raw_key: partition.raw_key(),
            refined_prefix: partition.refined_prefix(),
            idempotency_key: partition.idempotency_key(),
        }
    }
}

/// Asynchronous (event-type) invocation of a named function
#[async_trait]
pub trait FunctionInvoker {
    /// Returns once the invocation request is accepted, not when it completes
    async fn invoke_event(&self, function_name: &str, payload: &[u8]) -> Result<()>;
}

/// Job-control service able to start a named bulk job
#[async_trait]
pub trait JobRunner {
    /// 启动作业并返回运行 ID
    async fn start_job_run(&self, job_name: &str) -> Result<String>;
}

pub struct Trigger {
    config: TriggerConfig,
    invoker: Arc<dyn FunctionInvoker + Send + Sync>,
}

impl Trigger {
    pub fn new(config: TriggerConfig, invoker: Arc<dyn FunctionInvoker + Send + Sync>) -> Self {
        Self { config, invoker }
    }

    /// 通知下游有新分区可处理，不等待其结果
    pub async fn notify_downstream(&self, event: &DownstreamEvent) -> Result<()> {
        let payload = serde_json::to_vec(event)
            .map_err(|e| DataHubError::InvokeError(format!("Serializing event failed: {}", e)))?;

        self.invoker
            .invoke_event(&self.config.downstream_function_name, &payload)
            .await?;

        info!(
            "Downstream function {} notified for partition {}",
            self.config.downstream_function_name, event.partition
        );
        Ok(())
    }
}

/// `{statusCode, body}` acknowledgment returned to the job-control service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl HandlerResponse {
    fn ok(message: &str) -> Result<Self> {
        Ok(Self {
            status_code: 200,
            body: serde_json::to_string(message)?,
        })
    }
}

/// Stateless entry point invoked by the job-control service.
pub struct JobRequestHandler {
    config: TriggerConfig,
    runner: Arc<dyn JobRunner + Send + Sync>,
}

impl JobRequestHandler {
    pub fn new(config: TriggerConfig, runner: Arc<dyn JobRunner + Send + Sync>) -> Self {
        Self { config, runner }
    }

    /// 启动批处理作业；事件与上下文内容不参与处理
    pub async fn handle_job_request(&self, event: &Value, context: &Value) -> Result<HandlerResponse> {
        debug!("Job request event: {} context: {}", event, context);

        let run_id = self.runner.start_job_run(&self.config.bulk_job_name).await?;
        info!("Bulk job {} started, run id {}", self.config.bulk_job_name, run_id);

        HandlerResponse::ok(JOB_STARTED_MESSAGE)
    }
}
