//! 公共常量和门户约定
//!
//! 门户没有状态码或 JSON 协议，成功与否只能从页面标记推断。
//! 每个推断规则都收敛为这里的一个具名判定函数，页面改版时只改一处。

use scraper::{Html, Selector};

use crate::error::{PortalError, Result};

// ==================== 门户地址 ====================

/// FolhaInvest 主机
pub const FOLHAINVEST_HOST: &str = "http://folhainvest.folha.uol.com.br";
/// 登录地址（登录成功后跳转到持仓页）
pub const FOLHA_LOGIN_URL: &str =
    "http://login.folha.com.br/login?done=http://folhainvest.folha.uol.com.br/carteira&service=folhainvest";

/// 委托簿 / 撤单 / 用户信息面板
pub const PAGE_ORDERS: &str = "ordens";
/// 持仓
pub const PAGE_PORTFOLIO: &str = "carteira";
/// 持仓导出
pub const PAGE_PORTFOLIO_EXPORT: &str = "carteira?tsv=yes";
/// 重置持仓
pub const PAGE_RESET: &str = "limpar";
/// 行情
pub const PAGE_QUOTATIONS: &str = "cotacoes";
/// 模拟成交记录
pub const PAGE_SIMULATOR_TRADES: &str = "negociacoes";

pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// ==================== 表单字段 ====================

/// 下单动作
pub const EXECUTE_ACTION: (&str, &str) = ("execute", "Executar");
/// 确认动作（下单、重置共用）
pub const CONFIRM_ACTION: (&str, &str) = ("confirm", "Confirmar");
/// 撤单动作
pub const CANCEL_ACTION: (&str, &str) = ("cancel", "Remover ordens");
/// 撤单 id 字段（可重复）
pub const CANCEL_ORDER_FIELD: &str = "orders[]";
/// 登录动作
pub const LOGIN_ACTION: (&str, &str) = ("auth", "Autenticar");

// ==================== 页面标记 ====================

/// 认证 cookie 名
pub const AUTH_COOKIE_NAME: &str = "FOLHA_KEY";
/// 警告横幅
pub const WARNING_BANNER_SELECTOR: &str = ".message.warning";
/// 横幅标题
pub const WARNING_HEADING_SELECTOR: &str = "h2";
/// 市价委托在价格列中的文字
pub const MARKET_PRICE_MARKER: &str = "mercado";

/// 解析 CSS 选择器
pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| PortalError::Selector(format!("{}: {:?}", css, e)))
}

/// 拼接页面完整地址
pub fn page_url(host: &str, page: &str) -> String {
    format!("{}/{}", host.trim_end_matches('/'), page)
}

/// 登录是否成功：某个 set-cookie 的 cookie 名恰好是认证 cookie
pub fn has_auth_cookie(set_cookies: &[String]) -> bool {
    set_cookies.iter().any(|header| {
        header
            .split(';')
            .next()
            .and_then(|pair| pair.split_once('='))
            .map(|(name, _)| name.trim() == AUTH_COOKIE_NAME)
            .unwrap_or(false)
    })
}

/// 下单结果页是否出现警告横幅，出现时返回横幅标题
///
/// 横幅没有 h2 时退回横幅全文
pub fn find_warning_banner(body: &str) -> Result<Option<String>> {
    let document = Html::parse_document(body);
    let banner_selector = selector(WARNING_BANNER_SELECTOR)?;
    let heading_selector = selector(WARNING_HEADING_SELECTOR)?;

    let banner = match document.select(&banner_selector).next() {
        Some(banner) => banner,
        None => return Ok(None),
    };

    let text = match banner.select(&heading_selector).next() {
        Some(heading) => heading.text().collect::<String>(),
        None => banner.text().collect::<String>(),
    };
    Ok(Some(text.trim().to_string()))
}

/// 委托价格列是否为市价
pub fn is_market_price(cell: &str) -> bool {
    cell.contains(MARKET_PRICE_MARKER)
}
