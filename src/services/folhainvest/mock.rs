//! 测试用传输层：按顺序回放预设响应，并记录每个请求
//!
//! 每个请求在记录之后、返回之前让出一次执行权，
//! 并发任务因此可以在两次请求之间交错。
//!
//! ```ignore
//! let transport = MockTransport::new()
//!     .respond_html("http://host/comprar", "<html></html>")
//!     .respond_html("http://host/comprar", "<html>ok</html>");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use super::transport::{DownloadOutcome, FormFields, PortalResponse, Transport};
use crate::error::{PortalError, Result};

/// 请求方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Download,
}

/// 记录下来的请求
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub form: Option<FormFields>,
}

enum Scripted {
    Response(PortalResponse),
    Error(PortalError),
}

/// 回放式传输层
pub struct MockTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 追加一个完整响应
    pub fn respond(self, response: PortalResponse) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Response(response));
        self
    }

    /// 追加一个 200 页面，最终地址为 url
    pub fn respond_html(self, url: &str, body: &str) -> Self {
        self.respond(PortalResponse {
            status: 200,
            url: url.to_string(),
            set_cookies: Vec::new(),
            body: body.to_string(),
        })
    }

    /// 追加一个指定状态码的响应
    pub fn respond_status(self, url: &str, status: u16) -> Self {
        self.respond(PortalResponse {
            status,
            url: url.to_string(),
            set_cookies: Vec::new(),
            body: String::new(),
        })
    }

    /// 追加一个传输层错误
    pub fn fail_with(self, error: PortalError) -> Self {
        self.script.lock().unwrap().push_back(Scripted::Error(error));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next(&self, method: Method, url: &str, form: Option<&FormFields>) -> Result<PortalResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            url: url.to_string(),
            form: form.cloned(),
        });
        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::Error(error)) => Err(error),
            None => Err(PortalError::Transport(format!(
                "no scripted response for {}",
                url
            ))),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str) -> Result<PortalResponse> {
        let result = self.next(Method::Get, url, None);
        tokio::task::yield_now().await;
        result
    }

    async fn post(&self, url: &str, form: &FormFields) -> Result<PortalResponse> {
        let result = self.next(Method::Post, url, Some(form));
        tokio::task::yield_now().await;
        result
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<DownloadOutcome> {
        let result = self.next(Method::Download, url, None);
        tokio::task::yield_now().await;
        let response = result?;
        if !response.is_success() {
            return Ok(DownloadOutcome {
                status: response.status,
                bytes_written: 0,
            });
        }
        tokio::fs::write(dest, response.body.as_bytes()).await?;
        Ok(DownloadOutcome {
            status: response.status,
            bytes_written: response.body.len() as u64,
        })
    }
}
