//! HTTP 传输层
//!
//! 核心逻辑只依赖 `Transport` trait：GET、表单 POST、流式下载。
//! `HttpTransport` 是基于 reqwest 的实现，整个生命周期只持有一个带 cookie 的会话。

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, SET_COOKIE};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use super::common::USER_AGENT;
use crate::error::Result;

/// 表单字段，按插入顺序保存，允许重复键
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormFields {
    pairs: Vec<(String, String)>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个字段（同名字段不会被覆盖）
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// 某个键的全部取值，按顺序
    pub fn values(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values(key).into_iter().next()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = FormFields::new();
        for (k, v) in iter {
            fields.push(k, v);
        }
        fields
    }
}

/// 门户响应
#[derive(Debug, Clone, Default)]
pub struct PortalResponse {
    /// 最终 HTTP 状态码
    pub status: u16,
    /// 跟随重定向后的最终地址
    pub url: String,
    /// 全部 set-cookie 头
    pub set_cookies: Vec<String>,
    /// 解码后的页面文本
    pub body: String,
}

impl PortalResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 下载结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub status: u16,
    pub bytes_written: u64,
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 传输层抽象
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<PortalResponse>;

    async fn post(&self, url: &str, form: &FormFields) -> Result<PortalResponse>;

    /// 下载到文件；仅在 HTTP 成功时创建文件
    async fn download(&self, url: &str, dest: &Path) -> Result<DownloadOutcome>;
}

/// 传输层配置
#[derive(Debug, Clone)]
pub struct TransportOptions {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// 响应头未声明字符集时使用的编码
    pub fallback_encoding: String,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            fallback_encoding: "utf-8".to_string(),
        }
    }
}

/// 基于 reqwest 的传输层
pub struct HttpTransport {
    client: Client,
    fallback_encoding: &'static encoding_rs::Encoding,
}

impl HttpTransport {
    pub fn new(options: &TransportOptions) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(options.timeout)
            .connect_timeout(options.connect_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        let fallback_encoding = encoding_rs::Encoding::for_label(options.fallback_encoding.as_bytes())
            .unwrap_or_else(|| {
                log::warn!("未知编码 {}，使用 UTF-8", options.fallback_encoding);
                encoding_rs::UTF_8
            });

        Ok(Self {
            client,
            fallback_encoding,
        })
    }

    /// 表单 POST；Content-Type 由 `form()` 设置
    fn form_request(&self, url: &str, form: &FormFields) -> reqwest::RequestBuilder {
        self.client.post(url).form(form.pairs())
    }

    async fn into_portal_response(&self, response: reqwest::Response) -> Result<PortalResponse> {
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let headers = response.headers();

        let set_cookies = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(|v| v.to_string())
            .collect();

        let encoding = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(charset_label)
            .and_then(|label| encoding_rs::Encoding::for_label(label.as_bytes()))
            .unwrap_or(self.fallback_encoding);

        let bytes = response.bytes().await?;
        let body = encoding.decode(&bytes).0.to_string();

        Ok(PortalResponse {
            status,
            url,
            set_cookies,
            body,
        })
    }
}

/// 从 Content-Type 中取 charset
fn charset_label(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"').to_string())
        } else {
            None
        }
    })
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<PortalResponse> {
        log::info!("📡 GET {}", url);
        let response = self.client.get(url).send().await?;
        self.into_portal_response(response).await
    }

    async fn post(&self, url: &str, form: &FormFields) -> Result<PortalResponse> {
        log::info!("📡 POST {} ({} 个字段)", url, form.len());
        let response = self.form_request(url, form).send().await?;
        self.into_portal_response(response).await
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<DownloadOutcome> {
        log::info!("📡 下载 {} -> {}", url, dest.display());
        let mut response = self.client.get(url).send().await?;
        let status = response.status().as_u16();

        if !response.status().is_success() {
            return Ok(DownloadOutcome {
                status,
                bytes_written: 0,
            });
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut bytes_written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            bytes_written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(DownloadOutcome {
            status,
            bytes_written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_fields_keep_repeated_keys() {
        let mut form = FormFields::new();
        form.push("orders[]", "10").push("orders[]", "11").push("cancel", "Remover ordens");

        assert_eq!(form.len(), 3);
        assert_eq!(form.values("orders[]"), vec!["10", "11"]);
        assert_eq!(form.get("cancel"), Some("Remover ordens"));
        assert_eq!(form.pairs()[0], ("orders[]".to_string(), "10".to_string()));
    }

    #[test]
    fn test_charset_label() {
        assert_eq!(
            charset_label("text/html; charset=ISO-8859-1"),
            Some("ISO-8859-1".to_string())
        );
        assert_eq!(
            charset_label("text/html;Charset=\"utf-8\""),
            Some("utf-8".to_string())
        );
        assert_eq!(charset_label("text/html"), None);
    }

    #[test]
    fn test_form_request_encodes_repeated_keys() {
        let transport = HttpTransport::new(&TransportOptions::default()).unwrap();
        let mut form = FormFields::new();
        form.push("orders[]", "10").push("orders[]", "11");

        let request = transport
            .form_request("http://portal.test/ordens", &form)
            .build()
            .unwrap();
        assert_eq!(
            request.headers()[CONTENT_TYPE],
            "application/x-www-form-urlencoded"
        );
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(body, b"orders%5B%5D=10&orders%5B%5D=11");
    }

    #[test]
    fn test_http_transport_builds() {
        let options = TransportOptions {
            fallback_encoding: "iso-8859-1".to_string(),
            ..Default::default()
        };
        let transport = HttpTransport::new(&options).unwrap();
        assert_eq!(transport.fallback_encoding.name(), "windows-1252");
    }
}
