use crate::errors::{DataHubError, Result};
use crate::trigger::{FunctionInvoker, JobRunner};
use async_trait::async_trait;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;

fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(DataHubError::RequestError)
}

async fn ensure_success(what: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(DataHubError::InvokeError(format!(
        "{} returned {}: {}",
        what,
        status,
        body.chars().take(200).collect::<String>()
    )))
}

/// 通过 HTTP 接口异步调用函数（Event 调用类型）
pub struct HttpFunctionInvoker {
    client: Client,
    endpoint: String,
}

impl HttpFunctionInvoker {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn invocation_url(&self, function_name: &str) -> String {
        format!("{}/2015-03-31/functions/{}/invocations", self.endpoint, function_name)
    }
}

#[async_trait]
impl FunctionInvoker for HttpFunctionInvoker {
    async fn invoke_event(&self, function_name: &str, payload: &[u8]) -> Result<()> {
        let url = self.invocation_url(function_name);
        debug!("Invoking {} ({} byte payload)", url, payload.len());

        let response = self
            .client
            .post(&url)
            .header("X-Amz-Invocation-Type", "Event")
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_vec())
            .send()
            .await
            .map_err(|e| DataHubError::InvokeError(format!("Invoking {} failed: {}", function_name, e)))?;

        ensure_success(&format!("Invoking {}", function_name), response).await?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct StartJobRunResponse {
    #[serde(rename = "JobRunId")]
    job_run_id: String,
}

/// Job-control service client speaking the `StartJobRun` JSON protocol.
pub struct HttpJobRunner {
    client: Client,
    endpoint: String,
}

impl HttpJobRunner {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl JobRunner for HttpJobRunner {
    async fn start_job_run(&self, job_name: &str) -> Result<String> {
        let url = format!("{}/", self.endpoint);
        let body = serde_json::json!({ "JobName": job_name });

        let response = self
            .client
            .post(&url)
            .header("X-Amz-Target", "AWSGlue.StartJobRun")
            .header(CONTENT_TYPE, "application/x-amz-json-1.1")
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| DataHubError::InvokeError(format!("Starting job {} failed: {}", job_name, e)))?;

        let response = ensure_success(&format!("Starting job {}", job_name), response).await?;
        let text = response
            .text()
            .await
            .map_err(|e| DataHubError::InvokeError(format!("Reading StartJobRun response failed: {}", e)))?;
        let parsed: StartJobRunResponse = serde_json::from_str(&text)
            .map_err(|e| DataHubError::InvokeError(format!("Unexpected StartJobRun response {}: {}", text, e)))?;

        Ok(parsed.job_run_id)
    }
}
