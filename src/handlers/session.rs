use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;

use super::{status_response, AppState};

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// 登录门户（整个服务共用这一个会话）
pub async fn login(state: web::Data<AppState>, body: web::Json<LoginBody>) -> Result<HttpResponse> {
    let status = state.client.login(&body.email, &body.password).await;
    Ok(status_response(status))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/session/login", web::post().to(login));
}
