use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;

use folhainvest_backend::models::{OrderFilter, OrderKind, OrderPrice, OrderQuantity, PricingMode};
use folhainvest_backend::OrderRequest;

use super::{read_response, status_response, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    #[serde(default)]
    pub filter: OrderFilter,
}

/// 下单请求体
///
/// quantity 必须是非负整数，否则反序列化失败，不会发出任何请求
#[derive(Debug, Deserialize)]
pub struct OrderBody {
    pub kind: OrderKind,
    pub symbol: String,
    pub price: OrderPrice,
    pub quantity: OrderQuantity,
    /// dd/mm/yyyy
    pub expiration_date: String,
    /// 仅对非条件委托有效，缺省为限价
    pub pricing: Option<PricingMode>,
}

impl OrderBody {
    fn into_request(self) -> OrderRequest {
        let request = OrderRequest::new(
            self.kind,
            &self.symbol,
            self.price,
            self.quantity,
            &self.expiration_date,
        );
        if self.kind.is_conditional() {
            request
        } else {
            request.with_pricing(self.pricing.unwrap_or(PricingMode::Fixed))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CancelBody {
    pub order_ids: Vec<u64>,
}

pub async fn list_orders(
    state: web::Data<AppState>,
    query: web::Query<OrdersQuery>,
) -> Result<HttpResponse> {
    Ok(read_response(state.client.orders_status(query.filter).await))
}

pub async fn submit_order(
    state: web::Data<AppState>,
    body: web::Json<OrderBody>,
) -> Result<HttpResponse> {
    let request = body.into_inner().into_request();
    Ok(status_response(state.client.submit_order(&request).await))
}

pub async fn cancel_orders(
    state: web::Data<AppState>,
    body: web::Json<CancelBody>,
) -> Result<HttpResponse> {
    Ok(status_response(state.client.cancel_orders(&body.order_ids).await))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::get().to(list_orders))
            .route("", web::post().to(submit_order))
            .route("/cancel", web::post().to(cancel_orders)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_body_defaults_to_fixed() {
        let body: OrderBody = serde_json::from_str(
            r#"{"kind":"sell","symbol":"PETR4","price":"12,45","quantity":100,"expiration_date":"31/12/2100"}"#,
        )
        .unwrap();
        let form = body.into_request().to_form();
        assert_eq!(form.get("pricing"), Some("fixed"));
        assert_eq!(form.get("sell"), Some("1"));
        assert_eq!(form.get("value"), Some("12,45"));
    }

    #[test]
    fn test_order_body_conditional_has_no_pricing() {
        let body: OrderBody = serde_json::from_str(
            r#"{"kind":"buy_start","symbol":"VALE3","price":60.5,"quantity":10,"expiration_date":"31/12/2100","pricing":"market"}"#,
        )
        .unwrap();
        let form = body.into_request().to_form();
        assert_eq!(form.get("pricing"), None);
        assert_eq!(form.get("start_stop"), Some("1"));
    }

    #[test]
    fn test_order_body_rejects_fractional_quantity() {
        let result: serde_json::Result<OrderBody> = serde_json::from_str(
            r#"{"kind":"buy","symbol":"PETR4","price":10,"quantity":1.5,"expiration_date":"31/12/2100"}"#,
        );
        assert!(result.is_err());
    }
}
