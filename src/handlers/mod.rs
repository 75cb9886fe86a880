pub mod account;
pub mod health;
pub mod market;
pub mod orders;
pub mod portfolio;
pub mod session;

use actix_web::{web, HttpResponse};
use serde::Serialize;
use std::path::PathBuf;

use folhainvest_backend::models::{ApiResponse, FailureKind, Status};
use folhainvest_backend::{FolhaInvestClient, PortalError};

/// 各处理器共享的状态：唯一的门户会话
pub struct AppState {
    pub client: FolhaInvestClient,
    /// 未指定路径时的持仓导出文件
    pub export_path: PathBuf,
}

/// 读操作结果 -> HTTP 响应
pub(crate) fn read_response<T: Serialize>(result: folhainvest_backend::Result<T>) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::Ok().json(ApiResponse::success(data)),
        Err(e) => {
            log::warn!("读取失败: {}", e);
            let body = ApiResponse::<T>::error(e.to_string());
            match e {
                PortalError::Timeout(_) => HttpResponse::GatewayTimeout().json(body),
                PortalError::Transport(_) => HttpResponse::BadGateway().json(body),
                _ => HttpResponse::InternalServerError().json(body),
            }
        }
    }
}

/// 写操作结果 -> HTTP 响应，业务失败同样带回 Status
pub(crate) fn status_response(status: Status) -> HttpResponse {
    let failure = status.failure;
    let body = ApiResponse::from_status(status);
    match failure {
        None => HttpResponse::Ok().json(body),
        Some(FailureKind::Authentication) => HttpResponse::Unauthorized().json(body),
        Some(FailureKind::Rejected) | Some(FailureKind::Unconfirmed) => {
            HttpResponse::UnprocessableEntity().json(body)
        }
        Some(FailureKind::Timeout) => HttpResponse::GatewayTimeout().json(body),
        Some(FailureKind::Transport) | Some(FailureKind::Http) => {
            HttpResponse::BadGateway().json(body)
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::config)
            .configure(session::config)
            .configure(account::config)
            .configure(orders::config)
            .configure(portfolio::config)
            .configure(market::config),
    );
}
