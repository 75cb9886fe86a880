//! 页面抽取
//!
//! 每个页面的表格位置、表头/表尾行数、列号都写成下面的形状常量，
//! 抽取代码只按形状取值。任何缺失的表格、行、列都直接报错，不返回半成品。

use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html};

use super::common::{is_market_price, selector};
use super::normalizer::{parse_currency, parse_decimal, parse_integer, parse_percentage, parse_rank};
use crate::error::{PortalError, Result};
use crate::models::{
    Info, OrderStatus, Overview, Page, Portfolio, Profitability, Quote, SimulatorTrade, Stock,
};

/// 表格形状
#[derive(Debug, Clone, Copy)]
pub struct TableShape {
    /// 表格角色，用于错误信息
    pub role: &'static str,
    pub selector: &'static str,
    /// 第几个匹配的表格（从 0 开始）
    pub position: usize,
    /// 顶部跳过的行数
    pub header_rows: usize,
    /// 底部跳过的行数（合计行）
    pub footer_rows: usize,
    /// 带此 class 的表格是装饰用的，既不参与定位，其内部的行和单元格也不计入
    pub discard_class: Option<&'static str>,
}

const FI_TABLE: &str = "table.fiTable";

pub const ORDER_BOOK_TABLE: TableShape = TableShape {
    role: "order book",
    selector: FI_TABLE,
    position: 0,
    header_rows: 1,
    footer_rows: 0,
    discard_class: None,
};

pub const QUOTATIONS_TABLE: TableShape = TableShape {
    role: "quotations",
    selector: FI_TABLE,
    position: 0,
    header_rows: 1,
    footer_rows: 0,
    discard_class: None,
};

/// 持仓页按位置排列的四个表格
pub const PORTFOLIO_STOCKS_TABLE: TableShape = TableShape {
    role: "stocks",
    selector: FI_TABLE,
    position: 0,
    header_rows: 1,
    footer_rows: 1,
    discard_class: None,
};

pub const PORTFOLIO_OVERVIEW_TABLE: TableShape = TableShape {
    role: "overview",
    selector: FI_TABLE,
    position: 1,
    header_rows: 1,
    footer_rows: 0,
    discard_class: None,
};

pub const PORTFOLIO_ANNUAL_TABLE: TableShape = TableShape {
    role: "annual profitability",
    selector: FI_TABLE,
    position: 2,
    header_rows: 1,
    footer_rows: 0,
    discard_class: None,
};

pub const PORTFOLIO_MONTHLY_TABLE: TableShape = TableShape {
    role: "monthly profitability",
    selector: FI_TABLE,
    position: 3,
    header_rows: 1,
    footer_rows: 0,
    discard_class: None,
};

pub const SIMULATOR_LOG_TABLE: TableShape = TableShape {
    role: "simulator log",
    selector: "table.logTable",
    position: 0,
    header_rows: 1,
    footer_rows: 1,
    discard_class: Some("marker"),
};

/// 委托簿列号
mod order_col {
    pub const ID: usize = 0;
    pub const TYPE: usize = 1;
    pub const SYMBOL: usize = 2;
    pub const QUANTITY: usize = 3;
    pub const VALUE: usize = 4;
    pub const EXPIRATION: usize = 5;
    pub const STATUS: usize = 6;
}

/// 持仓明细列号（2、3 列不使用）
mod stock_col {
    pub const SYMBOL: usize = 0;
    pub const NAME: usize = 1;
    pub const QUANTITY: usize = 4;
    pub const AVG_VALUE: usize = 5;
    pub const CURRENT_VALUE: usize = 6;
    pub const TOTAL_VALUE: usize = 7;
    pub const PROFIT: usize = 8;
    pub const VARIATION: usize = 9;
}

/// 持仓汇总列号
mod overview_col {
    pub const TOTAL_CAPITAL: usize = 0;
    pub const TOTAL_STOCKS: usize = 1;
    pub const TOTAL: usize = 2;
}

/// 收益率表：按行取值，值在第 1 列
mod profit_row {
    pub const INITIAL_POSITION: usize = 0;
    pub const CURRENT_POSITION: usize = 1;
    pub const CURRENT_PERFORMANCE: usize = 2;
    pub const VALUE_COL: usize = 1;
}

/// 行情列号
mod quote_col {
    pub const SYMBOL: usize = 1;
    pub const NAME: usize = 3;
    pub const LAST_TRADE: usize = 5;
    pub const TRADE_TIME: usize = 6;
    pub const VARIATION: usize = 7;
    pub const OPEN: usize = 8;
    pub const CLOSE: usize = 9;
    pub const HIGH: usize = 10;
    pub const LOW: usize = 11;
    pub const VOLUME: usize = 12;
}

/// 模拟成交列号
mod trade_col {
    pub const SYMBOL: usize = 0;
    pub const EXECUTED: usize = 1;
    pub const PENDING: usize = 2;
    pub const TOTAL: usize = 3;
}

/// 用户信息面板：按顺序的五个段落
mod user_info {
    pub const PANEL: &str = "#userInfo";
    pub const PARAGRAPH: &str = "p";
    pub const LABEL_TAG: &str = "b";
    pub const MONTHLY_RANK: usize = 0;
    pub const ANNUAL_RANK: usize = 1;
    pub const CAPITAL: usize = 2;
    pub const DAILY_LIMIT: usize = 3;
    pub const REMAINING_LIMIT: usize = 4;
}

/// 取出尖括号标签之间的全部文本，如 `<a href="..">PETR4</a>` -> "PETR4"
pub fn extract_symbol(fragment: &str) -> Result<String> {
    let re = Regex::new(r">(.*?)<").map_err(|e| PortalError::Selector(e.to_string()))?;
    let text: String = re
        .captures_iter(fragment)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str())
        .collect();
    Ok(text.trim().to_string())
}

/// 表格中的一行
struct Row<'a> {
    page: Page,
    role: &'static str,
    /// 在表格中的行号（含表头）
    index: usize,
    cells: Vec<ElementRef<'a>>,
}

impl<'a> Row<'a> {
    fn cell(&self, col: usize) -> Result<ElementRef<'a>> {
        self.cells.get(col).copied().ok_or_else(|| {
            PortalError::extraction(
                self.page,
                format!("{} table row {} column {}", self.role, self.index, col),
            )
        })
    }

    fn text(&self, col: usize) -> Result<String> {
        Ok(element_text(self.cell(col)?))
    }

    /// 单元格内第一个匹配子元素
    fn child(&self, col: usize, css: &str) -> Result<ElementRef<'a>> {
        let sel = selector(css)?;
        self.cell(col)?.select(&sel).next().ok_or_else(|| {
            PortalError::extraction(
                self.page,
                format!("<{}> in {} table row {} column {}", css, self.role, self.index, col),
            )
        })
    }

    fn bold(&self, col: usize) -> Result<String> {
        Ok(element_text(self.child(col, "b")?))
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn has_class(element: &ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// 元素是否位于 table 内部的某个装饰表格中
fn inside_discarded(element: &ElementRef<'_>, table: &ElementRef<'_>, class: Option<&str>) -> bool {
    let class = match class {
        Some(class) => class,
        None => return false,
    };
    for node in element.ancestors() {
        if node.id() == table.id() {
            return false;
        }
        if let Some(ancestor) = ElementRef::wrap(node) {
            if ancestor.value().name() == "table" && has_class(&ancestor, class) {
                return true;
            }
        }
    }
    false
}

fn locate_table<'a>(document: &'a Html, page: Page, shape: &TableShape) -> Result<ElementRef<'a>> {
    let table_selector = selector(shape.selector)?;
    document
        .select(&table_selector)
        .filter(|table| match shape.discard_class {
            Some(class) => !has_class(table, class),
            None => true,
        })
        .nth(shape.position)
        .ok_or_else(|| {
            PortalError::extraction(
                page,
                format!("{} table ({} #{})", shape.role, shape.selector, shape.position),
            )
        })
}

/// 按形状取出数据行（已去掉表头和表尾）
fn table_rows<'a>(document: &'a Html, page: Page, shape: &TableShape) -> Result<Vec<Row<'a>>> {
    let table = locate_table(document, page, shape)?;
    let tr_selector = selector("tr")?;
    let td_selector = selector("td")?;

    let rows: Vec<ElementRef<'a>> = table
        .select(&tr_selector)
        .filter(|tr| !inside_discarded(tr, &table, shape.discard_class))
        .collect();

    if rows.len() < shape.header_rows {
        return Err(PortalError::extraction(
            page,
            format!("{} table header row", shape.role),
        ));
    }

    let end = rows.len().saturating_sub(shape.footer_rows).max(shape.header_rows);
    Ok(rows[shape.header_rows..end]
        .iter()
        .enumerate()
        .map(|(i, tr)| Row {
            page,
            role: shape.role,
            index: shape.header_rows + i,
            cells: tr
                .select(&td_selector)
                .filter(|td| !inside_discarded(td, &table, shape.discard_class))
                .collect(),
        })
        .collect())
}

/// 取数据区的第 n 行
fn nth_row<'a, 'r>(rows: &'r [Row<'a>], page: Page, shape: &TableShape, n: usize) -> Result<&'r Row<'a>> {
    rows.get(n).ok_or_else(|| {
        PortalError::extraction(
            page,
            format!("{} table row {}", shape.role, shape.header_rows + n),
        )
    })
}

/// 用户信息面板（委托页侧栏）
pub fn extract_info(body: &str) -> Result<Info> {
    let page = Page::UserInfo;
    let document = Html::parse_document(body);
    let panel_selector = selector(user_info::PANEL)?;
    let paragraph_selector = selector(user_info::PARAGRAPH)?;

    let panel = document
        .select(&panel_selector)
        .next()
        .ok_or_else(|| PortalError::extraction(page, user_info::PANEL))?;
    let paragraphs: Vec<ElementRef<'_>> = panel.select(&paragraph_selector).collect();

    let field = |index: usize| -> Result<String> {
        paragraphs
            .get(index)
            .map(|p| text_without_label(*p))
            .ok_or_else(|| PortalError::extraction(page, format!("{} paragraph {}", user_info::PANEL, index)))
    };

    Ok(Info {
        monthly_ranking: parse_rank(&field(user_info::MONTHLY_RANK)?)?,
        annual_ranking: parse_rank(&field(user_info::ANNUAL_RANK)?)?,
        capital: parse_currency(&field(user_info::CAPITAL)?)?,
        daily_limit: parse_currency(&field(user_info::DAILY_LIMIT)?)?,
        remaining_limit: parse_currency(&field(user_info::REMAINING_LIMIT)?)?,
    })
}

/// 段落文本，去掉加粗的标签部分
fn text_without_label(paragraph: ElementRef<'_>) -> String {
    let text: String = paragraph
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => Some((&**text).to_owned()),
            Node::Element(element) if element.name() != user_info::LABEL_TAG => {
                ElementRef::wrap(child).map(|e| e.text().collect::<String>())
            }
            _ => None,
        })
        .collect();
    text.trim().to_string()
}

/// 非负整数（委托编号、股数）
fn parse_count(text: &str, expected: &'static str) -> Result<u64> {
    u64::try_from(parse_integer(text)?).map_err(|_| PortalError::format(expected, text))
}

/// 委托簿
pub fn extract_orders(body: &str) -> Result<Vec<OrderStatus>> {
    let page = Page::Orders;
    let document = Html::parse_document(body);
    let rows = table_rows(&document, page, &ORDER_BOOK_TABLE)?;

    let mut orders = Vec::with_capacity(rows.len());
    for row in &rows {
        let id_input = row.child(order_col::ID, "input")?;
        let id_text = id_input.value().attr("value").ok_or_else(|| {
            PortalError::extraction(page, format!("order id in row {}", row.index))
        })?;
        let id = parse_count(id_text, "order id")?;

        // 市价委托的价格列没有数值
        let value_text = row.text(order_col::VALUE)?;
        let value = if is_market_price(&value_text) {
            0.0
        } else {
            parse_decimal(&value_text)?
        };

        orders.push(OrderStatus {
            id,
            order_type: row.bold(order_col::TYPE)?,
            symbol: row.bold(order_col::SYMBOL)?,
            quantity: parse_count(&row.text(order_col::QUANTITY)?, "quantity")?,
            value,
            expiration_date: row.text(order_col::EXPIRATION)?,
            status: row.bold(order_col::STATUS)?,
        });
    }

    log::info!("📊 解析到 {} 条委托", orders.len());
    Ok(orders)
}

/// 持仓页：明细、汇总、年度收益、月度收益
pub fn extract_portfolio(body: &str) -> Result<Portfolio> {
    let page = Page::Portfolio;
    let document = Html::parse_document(body);

    let mut stocks = Vec::new();
    for row in table_rows(&document, page, &PORTFOLIO_STOCKS_TABLE)? {
        stocks.push(Stock {
            symbol: extract_symbol(&row.cell(stock_col::SYMBOL)?.html())?,
            name: row.text(stock_col::NAME)?,
            quantity: parse_count(&row.text(stock_col::QUANTITY)?, "quantity")?,
            avg_value: parse_decimal(&row.text(stock_col::AVG_VALUE)?)?,
            current_value: parse_decimal(&row.text(stock_col::CURRENT_VALUE)?)?,
            total_value: parse_decimal(&row.text(stock_col::TOTAL_VALUE)?)?,
            profit: parse_decimal(&row.text(stock_col::PROFIT)?)?,
            variation: parse_percentage(&row.text(stock_col::VARIATION)?)?,
        });
    }

    let overview_rows = table_rows(&document, page, &PORTFOLIO_OVERVIEW_TABLE)?;
    let row = nth_row(&overview_rows, page, &PORTFOLIO_OVERVIEW_TABLE, 0)?;
    let overview = Overview {
        total_capital: parse_decimal(&row.text(overview_col::TOTAL_CAPITAL)?)?,
        total_stocks: parse_decimal(&row.text(overview_col::TOTAL_STOCKS)?)?,
        total: parse_decimal(&row.text(overview_col::TOTAL)?)?,
    };

    let annual_profit = extract_profitability(&document, page, &PORTFOLIO_ANNUAL_TABLE)?;
    let monthly_profit = extract_profitability(&document, page, &PORTFOLIO_MONTHLY_TABLE)?;

    log::info!("📊 解析到 {} 只持仓", stocks.len());
    Ok(Portfolio {
        stocks,
        overview,
        annual_profit,
        monthly_profit,
    })
}

fn extract_profitability(document: &Html, page: Page, shape: &TableShape) -> Result<Profitability> {
    let rows = table_rows(document, page, shape)?;
    let value = |n: usize| -> Result<String> {
        nth_row(&rows, page, shape, n)?.text(profit_row::VALUE_COL)
    };

    Ok(Profitability {
        initial_position: parse_decimal(&value(profit_row::INITIAL_POSITION)?)?,
        current_position: parse_decimal(&value(profit_row::CURRENT_POSITION)?)?,
        current_performance: parse_percentage(&value(profit_row::CURRENT_PERFORMANCE)?)?,
    })
}

/// 行情表
pub fn extract_quotations(body: &str) -> Result<Vec<Quote>> {
    let page = Page::Quotations;
    let document = Html::parse_document(body);
    let rows = table_rows(&document, page, &QUOTATIONS_TABLE)?;

    let mut quotes = Vec::with_capacity(rows.len());
    for row in &rows {
        quotes.push(Quote {
            symbol: row.bold(quote_col::SYMBOL)?,
            name: row.text(quote_col::NAME)?,
            last_trade: parse_decimal(&row.text(quote_col::LAST_TRADE)?)?,
            trade_time: row.text(quote_col::TRADE_TIME)?,
            variation: parse_percentage(&row.text(quote_col::VARIATION)?)?,
            open: parse_decimal(&row.text(quote_col::OPEN)?)?,
            close: parse_decimal(&row.text(quote_col::CLOSE)?)?,
            high: parse_decimal(&row.text(quote_col::HIGH)?)?,
            low: parse_decimal(&row.text(quote_col::LOW)?)?,
            volume: parse_integer(&row.text(quote_col::VOLUME)?)?,
        });
    }

    log::info!("📊 解析到 {} 条行情", quotes.len());
    Ok(quotes)
}

/// 模拟成交记录
pub fn extract_simulator_trades(body: &str) -> Result<Vec<SimulatorTrade>> {
    let page = Page::SimulatorTrades;
    let document = Html::parse_document(body);
    let rows = table_rows(&document, page, &SIMULATOR_LOG_TABLE)?;

    let mut trades = Vec::with_capacity(rows.len());
    for row in &rows {
        trades.push(SimulatorTrade {
            symbol: extract_symbol(&row.child(trade_col::SYMBOL, "a")?.html())?,
            executed: parse_integer(&row.text(trade_col::EXECUTED)?)?,
            pending: parse_integer(&row.text(trade_col::PENDING)?)?,
            total: parse_integer(&row.text(trade_col::TOTAL)?)?,
        });
    }

    log::info!("📊 解析到 {} 条模拟成交记录", trades.len());
    Ok(trades)
}
