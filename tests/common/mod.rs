#![allow(dead_code)]

use b3_datahub::errors::{DataHubError, Result};
use b3_datahub::models::record::RawRow;
use b3_datahub::scrapers::base::IndexScraper;
use b3_datahub::trigger::FunctionInvoker;
use async_trait::async_trait;
use std::sync::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// 回环服务器收到的一次请求
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|pos| pos + 4)
}

async fn read_request(stream: &mut TcpStream) -> std::io::Result<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "connection closed"));
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = find_header_end(&buf) {
            break end;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();
    let content_length = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Ok(CapturedRequest { method, path, headers, body })
}

/// Serve one canned `(status, body)` response per incoming connection, in
/// order, and hand back every request received.
pub async fn serve(responses: Vec<(u16, String)>) -> (String, JoinHandle<Vec<CapturedRequest>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let mut captured = Vec::new();
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await.unwrap();
            captured.push(request);

            let response = format!(
                "HTTP/1.1 {} Canned\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        }
        captured
    });

    (base_url, handle)
}

/// A URL nothing is listening on.
pub async fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn index_page(rows: &[(&str, &str, &str)]) -> String {
    let body: String = rows
        .iter()
        .map(|(name, price, change)| {
            format!("<tr><td>{}</td><td>{}</td><td>{}</td></tr>", name, price, change)
        })
        .collect();
    format!(
        "<!DOCTYPE html><html><body><table class=\"table\">\
         <thead><tr><th>Código</th><th>Preço</th><th>Var. (%)</th></tr></thead>\
         <tbody>{}</tbody></table></body></html>",
        body
    )
}

/// Scraper returning canned rows, or failing like a dead network.
pub struct FakeScraper {
    rows: Mutex<Option<Vec<RawRow>>>,
}

impl FakeScraper {
    pub fn with_rows(rows: Vec<RawRow>) -> Self {
        Self { rows: Mutex::new(Some(rows)) }
    }

    pub fn failing() -> Self {
        Self { rows: Mutex::new(None) }
    }

    pub fn set_rows(&self, rows: Vec<RawRow>) {
        *self.rows.lock().unwrap() = Some(rows);
    }
}

#[async_trait]
impl IndexScraper for FakeScraper {
    fn source_name(&self) -> &str {
        "fake"
    }

    async fn fetch_rows(&self) -> Result<Vec<RawRow>> {
        self.rows
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| DataHubError::FetchError("connection reset".to_string()))
    }
}

#[derive(Default)]
pub struct RecordingInvoker {
    pub calls: Mutex<Vec<(String, Vec<u8>)>>,
    pub fail: bool,
}

impl RecordingInvoker {
    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl FunctionInvoker for RecordingInvoker {
    async fn invoke_event(&self, function_name: &str, payload: &[u8]) -> Result<()> {
        if self.fail {
            return Err(DataHubError::InvokeError("function service unavailable".to_string()));
        }
        self.calls.lock().unwrap().push((function_name.to_string(), payload.to_vec()));
        Ok(())
    }
}
