//! 委托协议
//!
//! 下单分两步：提交表单，检查结果页是否有警告横幅；没有横幅才发确认请求。
//! 确认请求的响应不再检查，但确认请求本身失败时单独报告，不当作成功。

use serde::{Deserialize, Serialize};

use super::common::{
    find_warning_banner, page_url, CANCEL_ACTION, CANCEL_ORDER_FIELD, CONFIRM_ACTION,
    EXECUTE_ACTION, PAGE_ORDERS, PAGE_RESET,
};
use super::transport::{FormFields, PortalResponse, Transport};
use crate::models::{FailureKind, OrderKind, OrderPrice, OrderQuantity, PricingMode, Status};

pub const ORDER_SENT: &str = "Ordem enviada com sucesso";
pub const REQUEST_SENT: &str = "Requisição enviada com sucesso";
pub const REQUEST_FAILED: &str = "Falha no envio da requisição";

/// 委托种类对应的页面
pub fn order_page(kind: OrderKind) -> &'static str {
    match kind {
        OrderKind::Buy => "comprar",
        OrderKind::BuyStart => "start",
        OrderKind::Sell => "vender",
        OrderKind::SellStop => "stop",
    }
}

/// 一笔待提交的委托
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub kind: OrderKind,
    pub symbol: String,
    pub price: OrderPrice,
    pub quantity: OrderQuantity,
    /// 到期日原文（如 "31/12/2100"），不做校验
    pub expiration_date: String,
    pub pricing: Option<PricingMode>,
}

impl OrderRequest {
    pub fn new(
        kind: OrderKind,
        symbol: impl Into<String>,
        price: impl Into<OrderPrice>,
        quantity: impl Into<OrderQuantity>,
        expiration_date: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            symbol: symbol.into(),
            price: price.into(),
            quantity: quantity.into(),
            expiration_date: expiration_date.into(),
            pricing: None,
        }
    }

    pub fn with_pricing(mut self, pricing: PricingMode) -> Self {
        self.pricing = Some(pricing);
        self
    }

    /// 生成提交表单；条件委托不带定价方式
    pub fn to_form(&self) -> FormFields {
        let mut form = FormFields::new();
        form.push("start_stop", self.kind.start_stop_flag().to_string())
            .push("sell", self.kind.sell_flag().to_string())
            .push("company", self.symbol.as_str())
            .push("value", self.price.to_form_value())
            .push("quantity", self.quantity.get().to_string())
            .push("expiration_date", self.expiration_date.as_str())
            .push(EXECUTE_ACTION.0, EXECUTE_ACTION.1);

        if !self.kind.is_conditional() {
            if let Some(pricing) = self.pricing {
                form.push("pricing", pricing.as_str());
            }
        }
        form
    }
}

/// 提交委托并在无横幅时确认
pub async fn submit_order<T: Transport + ?Sized>(
    transport: &T,
    host: &str,
    request: &OrderRequest,
) -> Status {
    let url = page_url(host, order_page(request.kind));
    log::info!(
        "提交委托 {:?} {} 数量 {} 价格 {}",
        request.kind,
        request.symbol,
        request.quantity.get(),
        request.price.to_form_value()
    );

    let response = match transport.post(&url, &request.to_form()).await {
        Ok(response) => response,
        Err(e) => {
            log::warn!("委托提交失败: {}", e);
            return Status::from_transport_error(&e, "Falha no envio da ordem");
        }
    };

    match find_warning_banner(&response.body) {
        Ok(Some(heading)) => {
            log::warn!("委托被拒绝: {}", heading);
            return Status::fail(FailureKind::Rejected, heading);
        }
        Ok(None) => {}
        Err(e) => {
            return Status::fail(FailureKind::Transport, e.to_string());
        }
    }

    confirm(transport, &response).await
}

/// 确认请求发往提交响应的最终地址
async fn confirm<T: Transport + ?Sized>(transport: &T, submitted: &PortalResponse) -> Status {
    let form: FormFields = [CONFIRM_ACTION].into_iter().collect();
    match transport.post(&submitted.url, &form).await {
        Ok(_) => {
            log::info!("✅ 委托已确认");
            Status::ok(ORDER_SENT)
        }
        Err(e) => {
            log::warn!("委托已提交但确认失败，状态未知: {}", e);
            let failure = match e {
                crate::error::PortalError::Timeout(_) => FailureKind::Timeout,
                _ => FailureKind::Unconfirmed,
            };
            Status::fail(
                failure,
                format!("Ordem enviada, mas a confirmação falhou: {}", e),
            )
        }
    }
}

/// 撤单成功判定
///
/// 门户对无效 id 不返回任何错误，两种判定都无法区分"已撤"与"被忽略"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelSuccessPolicy {
    /// 只看 HTTP 状态
    #[default]
    HttpStatus,
    /// HTTP 状态成功且至少提交了一个 id
    HttpStatusWithIds,
}

impl CancelSuccessPolicy {
    pub fn accepts(&self, response: &PortalResponse, form: &FormFields) -> bool {
        match self {
            CancelSuccessPolicy::HttpStatus => response.is_success(),
            CancelSuccessPolicy::HttpStatusWithIds => {
                response.is_success() && !form.values(CANCEL_ORDER_FIELD).is_empty()
            }
        }
    }
}

/// 撤单表单：每个 id 一个 `orders[]` 字段，最后是撤单动作
pub fn cancel_form(order_ids: &[u64]) -> FormFields {
    let mut form: FormFields = order_ids
        .iter()
        .map(|id| (CANCEL_ORDER_FIELD, id.to_string()))
        .collect();
    form.push(CANCEL_ACTION.0, CANCEL_ACTION.1);
    form
}

/// 撤单；id 为空时照样发送请求
pub async fn cancel_orders<T: Transport + ?Sized>(
    transport: &T,
    host: &str,
    order_ids: &[u64],
    policy: CancelSuccessPolicy,
) -> Status {
    let form = cancel_form(order_ids);
    log::info!("撤单 {:?}", order_ids);

    match transport.post(&page_url(host, PAGE_ORDERS), &form).await {
        Ok(response) if policy.accepts(&response, &form) => Status::ok(REQUEST_SENT),
        Ok(response) => {
            log::warn!("撤单未被接受: HTTP {}", response.status);
            Status::fail(FailureKind::Http, REQUEST_FAILED)
        }
        Err(e) => {
            log::warn!("撤单请求失败: {}", e);
            Status::from_transport_error(&e, REQUEST_FAILED)
        }
    }
}

/// 重置持仓：GET 触发，随后无条件 POST 确认
pub async fn reset_portfolio<T: Transport + ?Sized>(transport: &T, host: &str) -> Status {
    log::info!("重置持仓");
    let armed = match transport.get(&page_url(host, PAGE_RESET)).await {
        Ok(response) => response,
        Err(e) => return Status::from_transport_error(&e, REQUEST_FAILED),
    };

    let form: FormFields = [CONFIRM_ACTION].into_iter().collect();
    match transport.post(&armed.url, &form).await {
        Ok(response) if response.is_success() => Status::ok(REQUEST_SENT),
        Ok(response) => {
            log::warn!("重置未被接受: HTTP {}", response.status);
            Status::fail(FailureKind::Http, REQUEST_FAILED)
        }
        Err(e) => Status::from_transport_error(&e, REQUEST_FAILED),
    }
}
