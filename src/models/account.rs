//! 账户数据模型
//!
//! 写操作的结果 `Status` 与账户概况 `Info`

use serde::{Deserialize, Serialize};

/// 写操作结果码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCode {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "FAIL")]
    Fail,
}

/// 失败原因
///
/// 让调用方无需解析描述文本就能区分"被拒绝"与"网络失败"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// 登录响应中没有认证 cookie
    Authentication,
    /// 门户返回了警告横幅
    Rejected,
    /// 委托已提交，但确认请求失败，委托状态未知
    Unconfirmed,
    /// 请求失败（连接等）
    Transport,
    /// 请求超时
    Timeout,
    /// 门户返回了非成功的 HTTP 状态
    Http,
}

/// 任意写操作（登录、下单、撤单、重置、导出）的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub status_code: StatusCode,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

impl Status {
    pub fn ok(description: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::Ok,
            description: description.into(),
            failure: None,
        }
    }

    pub fn fail(failure: FailureKind, description: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::Fail,
            description: description.into(),
            failure: Some(failure),
        }
    }

    /// 由传输层错误构造失败结果，超时单独标记
    pub fn from_transport_error(err: &crate::error::PortalError, context: &str) -> Self {
        let failure = match err {
            crate::error::PortalError::Timeout(_) => FailureKind::Timeout,
            _ => FailureKind::Transport,
        };
        Self::fail(failure, format!("{}: {}", context, err))
    }

    pub fn is_ok(&self) -> bool {
        self.status_code == StatusCode::Ok
    }
}

/// 账户概况快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// 资金
    pub capital: f64,
    /// 每日限额
    pub daily_limit: f64,
    /// 剩余限额
    pub remaining_limit: f64,
    /// 月度排名
    pub monthly_ranking: u32,
    /// 年度排名
    pub annual_ranking: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PortalError;

    #[test]
    fn test_status_serialization() {
        let ok = Status::ok("Ordem enviada com sucesso");
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["status_code"], "OK");
        assert!(json.get("failure").is_none());

        let fail = Status::fail(FailureKind::Rejected, "Saldo insuficiente");
        let json = serde_json::to_value(&fail).unwrap();
        assert_eq!(json["status_code"], "FAIL");
        assert_eq!(json["failure"], "rejected");
    }

    #[test]
    fn test_status_from_transport_error() {
        let status = Status::from_transport_error(&PortalError::Timeout("30s".into()), "envio");
        assert!(!status.is_ok());
        assert_eq!(status.failure, Some(FailureKind::Timeout));

        let status =
            Status::from_transport_error(&PortalError::Transport("refused".into()), "envio");
        assert_eq!(status.failure, Some(FailureKind::Transport));
        assert!(status.description.starts_with("envio: "));
    }
}
