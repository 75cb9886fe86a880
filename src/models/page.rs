//! 门户页面标识

use serde::{Deserialize, Serialize};
use std::fmt;

/// 被抽取的页面
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    /// 委托簿（ordens）
    Orders,
    /// 持仓（carteira）
    Portfolio,
    /// 行情（cotacoes）
    Quotations,
    /// 模拟成交记录（negociacoes）
    SimulatorTrades,
    /// 用户信息面板（#userInfo）
    UserInfo,
}

impl Page {
    pub fn name(&self) -> &'static str {
        match self {
            Page::Orders => "orders",
            Page::Portfolio => "portfolio",
            Page::Quotations => "quotations",
            Page::SimulatorTrades => "simulator trades",
            Page::UserInfo => "user info",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_names() {
        let pages = [
            (Page::Orders, "orders"),
            (Page::Portfolio, "portfolio"),
            (Page::Quotations, "quotations"),
            (Page::SimulatorTrades, "simulator trades"),
            (Page::UserInfo, "user info"),
        ];
        for (page, name) in pages {
            assert_eq!(page.to_string(), name);
        }
    }
}
