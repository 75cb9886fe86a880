//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置，门户账号可由环境变量覆盖

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::services::folhainvest::common::{FOLHAINVEST_HOST, FOLHA_LOGIN_URL};
use crate::services::folhainvest::{CancelSuccessPolicy, TransportOptions};

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
}

/// API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API Key（必填，为空时服务拒绝启动）
    #[serde(default)]
    pub api_key: String,
    /// 门户请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 门户配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// 门户根地址
    #[serde(default = "default_portal_host")]
    pub host: String,
    /// 登录地址
    #[serde(default = "default_login_url")]
    pub login_url: String,
    /// 响应未声明字符集时的编码
    #[serde(default = "default_fallback_encoding")]
    pub fallback_encoding: String,
    /// 撤单成功判定
    #[serde(default)]
    pub cancel_policy: CancelSuccessPolicy,
    /// 持仓导出默认路径
    #[serde(default = "default_export_path")]
    pub export_path: PathBuf,
    /// 启动时登录用的账号（可选）
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// API 配置
    #[serde(default)]
    pub api: ApiConfig,
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
    /// 门户配置
    #[serde(default)]
    pub portal: PortalConfig,
}

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_log_level() -> String { "info".to_string() }
fn default_portal_host() -> String { FOLHAINVEST_HOST.to_string() }
fn default_login_url() -> String { FOLHA_LOGIN_URL.to_string() }
fn default_fallback_encoding() -> String { "iso-8859-1".to_string() }
fn default_export_path() -> PathBuf { PathBuf::from("carteira.xls") }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            host: default_portal_host(),
            login_url: default_login_url(),
            fallback_encoding: default_fallback_encoding(),
            cancel_policy: CancelSuccessPolicy::default(),
            export_path: default_export_path(),
            email: None,
            password: None,
        }
    }
}

impl PortalConfig {
    /// 校验门户地址与登录地址都是合法的 http(s) URL
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, value) in [("host", &self.host), ("login_url", &self.login_url)] {
            let url = Url::parse(value)
                .map_err(|e| anyhow::anyhow!("portal.{} 无效 ({}): {}", name, value, e))?;
            if !matches!(url.scheme(), "http" | "https") {
                anyhow::bail!("portal.{} 必须是 http(s) 地址: {}", name, value);
            }
        }
        Ok(())
    }

    /// 账号和密码都配置时才返回
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) if !email.is_empty() => {
                Some((email.as_str(), password.as_str()))
            }
            _ => None,
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.portal.validate()?;
        Ok(config)
    }

    /// 加载配置，优先从文件，失败则使用默认值；随后应用环境变量
    pub fn load() -> Self {
        let mut config = Self::load_file();
        config.apply_env_overrides(|key| env::var(key).ok());
        config
    }

    fn load_file() -> Self {
        let config_paths = ["config.json", "config/config.json"];

        for path in config_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        log::info!("从 {} 加载配置成功", path);
                        return config;
                    }
                    Err(e) => {
                        log::warn!("加载配置文件 {} 失败: {}", path, e);
                    }
                }
            }
        }

        log::info!("使用默认配置");
        Self::default()
    }

    /// API_KEY / FOLHA_EMAIL / FOLHA_PASSWORD 覆盖文件中的值
    fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_key) = lookup("API_KEY") {
            self.api.api_key = api_key;
        }
        if let Some(email) = lookup("FOLHA_EMAIL") {
            self.portal.email = Some(email);
        }
        if let Some(password) = lookup("FOLHA_PASSWORD") {
            self.portal.password = Some(password);
        }
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 门户传输层参数
    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            timeout: Duration::from_secs(self.api.timeout_secs),
            connect_timeout: Duration::from_secs(self.api.connect_timeout_secs),
            fallback_encoding: self.portal.fallback_encoding.clone(),
        }
    }
}
