//! 委托数据模型

use serde::{Deserialize, Serialize};

use crate::error::PortalError;

/// 委托种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    /// 买入
    Buy,
    /// 条件买入（start）
    BuyStart,
    /// 卖出
    Sell,
    /// 条件卖出（stop）
    SellStop,
}

impl OrderKind {
    /// 是否为条件委托（start/stop）
    pub fn is_conditional(&self) -> bool {
        matches!(self, OrderKind::BuyStart | OrderKind::SellStop)
    }

    /// 是否为卖方
    pub fn is_sell(&self) -> bool {
        matches!(self, OrderKind::Sell | OrderKind::SellStop)
    }

    /// 表单字段 start_stop：0 立即委托，1 条件委托
    pub fn start_stop_flag(&self) -> u8 {
        self.is_conditional() as u8
    }

    /// 表单字段 sell：0 买方，1 卖方
    pub fn sell_flag(&self) -> u8 {
        self.is_sell() as u8
    }
}

/// 定价方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingMode {
    /// 限价
    Fixed,
    /// 市价
    Market,
}

impl PricingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingMode::Fixed => "fixed",
            PricingMode::Market => "market",
        }
    }
}

/// 委托价格：已格式化的文本或数值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderPrice {
    Value(f64),
    Text(String),
}

impl OrderPrice {
    /// 转换为门户使用的小数逗号格式（如 12.45 -> "12,45"）
    pub fn to_form_value(&self) -> String {
        match self {
            OrderPrice::Value(v) => format!("{}", v).replace('.', ","),
            // 已带逗号的文本视为本地化格式，原样发送
            OrderPrice::Text(t) if t.contains(',') => t.trim().to_string(),
            OrderPrice::Text(t) => t.trim().replace('.', ","),
        }
    }
}

impl From<f64> for OrderPrice {
    fn from(v: f64) -> Self {
        OrderPrice::Value(v)
    }
}

impl From<&str> for OrderPrice {
    fn from(t: &str) -> Self {
        OrderPrice::Text(t.to_string())
    }
}

impl From<String> for OrderPrice {
    fn from(t: String) -> Self {
        OrderPrice::Text(t)
    }
}

/// 委托数量，构造时保证为非负整数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "f64")]
pub struct OrderQuantity(u64);

impl OrderQuantity {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for OrderQuantity {
    fn from(v: u64) -> Self {
        OrderQuantity(v)
    }
}

impl From<u32> for OrderQuantity {
    fn from(v: u32) -> Self {
        OrderQuantity(v as u64)
    }
}

impl TryFrom<i64> for OrderQuantity {
    type Error = PortalError;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        u64::try_from(v)
            .map(OrderQuantity)
            .map_err(|_| PortalError::InvalidQuantity(v.to_string()))
    }
}

impl TryFrom<f64> for OrderQuantity {
    type Error = PortalError;

    fn try_from(v: f64) -> Result<Self, Self::Error> {
        if !v.is_finite() || v.fract() != 0.0 || v < 0.0 || v > u64::MAX as f64 {
            return Err(PortalError::InvalidQuantity(v.to_string()));
        }
        Ok(OrderQuantity(v as u64))
    }
}

/// 委托簿筛选条件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderFilter {
    #[default]
    All,
    Cancelled,
    Executed,
    Pendent,
}

impl OrderFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderFilter::All => "all",
            OrderFilter::Cancelled => "cancelled",
            OrderFilter::Executed => "executed",
            OrderFilter::Pendent => "pendent",
        }
    }
}

/// 委托簿中的一行
///
/// 市价委托的 `value` 固定为 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatus {
    pub id: u64,
    #[serde(rename = "type")]
    pub order_type: String,
    pub symbol: String,
    pub quantity: u64,
    pub value: f64,
    /// 到期日，保留页面原文
    pub expiration_date: String,
    pub status: String,
}
