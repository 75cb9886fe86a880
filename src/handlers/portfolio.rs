use actix_web::{web, HttpResponse, Result};

use super::{read_response, status_response, AppState};

pub async fn get_portfolio(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(read_response(state.client.portfolio().await))
}

/// 清空持仓（不可撤销）
pub async fn reset_portfolio(state: web::Data<AppState>) -> Result<HttpResponse> {
    log::warn!("⚠️ 重置持仓");
    Ok(status_response(state.client.reset_portfolio().await))
}

/// 导出持仓，目标文件只取配置中的 export_path
pub async fn export_portfolio(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(status_response(
        state.client.export_portfolio(&state.export_path).await,
    ))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/portfolio")
            .route("", web::get().to(get_portfolio))
            .route("/reset", web::post().to(reset_portfolio))
            .route("/export", web::post().to(export_portfolio)),
    );
}
