//! 错误类型定义
//!
//! 解析与抽取失败属于致命错误，直接向调用方传播；
//! 业务结果（登录失败、委托被拒等）不走这里，而是以 `Status` 返回。

use thiserror::Error;

use crate::models::Page;

/// 门户客户端错误类型
#[derive(Error, Debug)]
pub enum PortalError {
    /// 数值不符合本地化格式（如 "1.234,56"）
    #[error("Format error: cannot parse {input:?} as {expected}")]
    Format {
        expected: &'static str,
        input: String,
    },

    /// 页面缺少预期的表格/行/列
    #[error("Extraction error on {page} page: missing {element}")]
    Extraction { page: Page, element: String },

    /// 底层请求失败（连接、协议等）
    #[error("Transport error: {0}")]
    Transport(String),

    /// 请求超时
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 委托数量不是整数
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    /// CSS 选择器无效
    #[error("Invalid selector: {0}")]
    Selector(String),

    /// 文件读写错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PortalError {
    pub fn format(expected: &'static str, input: &str) -> Self {
        PortalError::Format {
            expected,
            input: input.to_string(),
        }
    }

    pub fn extraction(page: Page, element: impl Into<String>) -> Self {
        PortalError::Extraction {
            page,
            element: element.into(),
        }
    }

    /// 是否为传输层错误（含超时）
    pub fn is_transport(&self) -> bool {
        matches!(self, PortalError::Transport(_) | PortalError::Timeout(_))
    }
}

impl From<reqwest::Error> for PortalError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            PortalError::Timeout(e.to_string())
        } else {
            PortalError::Transport(e.to_string())
        }
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, PortalError>;
