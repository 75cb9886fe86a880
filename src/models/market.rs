//! 行情与模拟成交数据模型

use serde::{Deserialize, Serialize};

/// 行情表中的一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    /// 最新成交价
    pub last_trade: f64,
    /// 成交时间，保留页面原文
    pub trade_time: String,
    /// 涨跌幅（百分比）
    pub variation: f64,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: i64,
}

/// 行情视图
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotationView {
    /// 全部公司
    #[default]
    All,
    /// 仅持仓中的公司
    Portfolio,
}

impl QuotationView {
    /// 查询参数 view_option 的取值
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotationView::All => "",
            QuotationView::Portfolio => "portfolio",
        }
    }
}

/// 模拟器中某公司的成交笔数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorTrade {
    pub symbol: String,
    pub executed: i64,
    pub pending: i64,
    pub total: i64,
}
