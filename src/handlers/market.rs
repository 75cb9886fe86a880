use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;

use folhainvest_backend::models::QuotationView;

use super::{read_response, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct QuotationQuery {
    #[serde(default)]
    pub view: QuotationView,
}

pub async fn get_quotations(
    state: web::Data<AppState>,
    query: web::Query<QuotationQuery>,
) -> Result<HttpResponse> {
    Ok(read_response(state.client.quotations(query.view).await))
}

pub async fn get_simulator_trades(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(read_response(state.client.simulator_trades().await))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/quotations", web::get().to(get_quotations))
        .route("/simulator/trades", web::get().to(get_simulator_trades));
}
