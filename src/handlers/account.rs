use actix_web::{web, HttpResponse, Result};

use super::{read_response, AppState};

pub async fn get_info(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(read_response(state.client.info().await))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/account/info", web::get().to(get_info));
}
