//! 持仓数据模型

use serde::{Deserialize, Serialize};

/// 单只持仓
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub symbol: String,
    pub name: String,
    pub quantity: u64,
    /// 平均成本
    pub avg_value: f64,
    /// 现价
    pub current_value: f64,
    /// 市值
    pub total_value: f64,
    /// 盈亏（可为负）
    pub profit: f64,
    /// 涨跌幅（百分比，可为负）
    pub variation: f64,
}

/// 持仓汇总行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub total_capital: f64,
    pub total_stocks: f64,
    pub total: f64,
}

/// 收益率（年度、月度各一份）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profitability {
    pub initial_position: f64,
    pub current_position: f64,
    /// 百分比
    pub current_performance: f64,
}

/// 持仓页面的完整抽取结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub stocks: Vec<Stock>,
    pub overview: Overview,
    pub annual_profit: Profitability,
    pub monthly_profit: Profitability,
}
