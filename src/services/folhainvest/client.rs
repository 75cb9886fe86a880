//! FolhaInvest 会话客户端
//!
//! 持有唯一的带 cookie 会话。读操作可以并发；写操作（登录、下单、撤单、重置）
//! 在整个多步流程中持有同一把锁，避免两笔提交/确认交错。

use std::path::Path;
use tokio::sync::Mutex;

use super::common::{
    has_auth_cookie, page_url, FOLHAINVEST_HOST, FOLHA_LOGIN_URL, LOGIN_ACTION, PAGE_ORDERS,
    PAGE_PORTFOLIO, PAGE_PORTFOLIO_EXPORT, PAGE_QUOTATIONS, PAGE_SIMULATOR_TRADES,
};
use super::extractor;
use super::orders::{self, CancelSuccessPolicy, OrderRequest};
use super::transport::{FormFields, HttpTransport, Transport, TransportOptions};
use crate::config::PortalConfig;
use crate::error::Result;
use crate::models::{
    FailureKind, Info, OrderFilter, OrderKind, OrderPrice, OrderQuantity, OrderStatus, Portfolio,
    PricingMode, QuotationView, Quote, SimulatorTrade, Status,
};

/// 客户端设置
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub host: String,
    pub login_url: String,
    pub cancel_policy: CancelSuccessPolicy,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            host: FOLHAINVEST_HOST.to_string(),
            login_url: FOLHA_LOGIN_URL.to_string(),
            cancel_policy: CancelSuccessPolicy::default(),
        }
    }
}

impl From<&PortalConfig> for ClientSettings {
    fn from(config: &PortalConfig) -> Self {
        Self {
            host: config.host.clone(),
            login_url: config.login_url.clone(),
            cancel_policy: config.cancel_policy,
        }
    }
}

/// FolhaInvest 客户端
///
/// ## 功能
/// - 登录：以认证 cookie 是否出现判断
/// - 读取：账户概况、委托簿、持仓、行情、模拟成交
/// - 写入：买入/卖出/条件委托、撤单、重置持仓、导出持仓
pub struct FolhaInvestClient<T: Transport = HttpTransport> {
    transport: T,
    settings: ClientSettings,
    /// 写操作互斥
    write_lock: Mutex<()>,
}

impl FolhaInvestClient<HttpTransport> {
    /// 按门户配置创建客户端（新建 HTTP 会话）
    pub fn from_config(config: &PortalConfig, options: &TransportOptions) -> Result<Self> {
        let transport = HttpTransport::new(options)?;
        Ok(Self::with_transport(transport, ClientSettings::from(config)))
    }
}

impl<T: Transport> FolhaInvestClient<T> {
    pub fn with_transport(transport: T, settings: ClientSettings) -> Self {
        Self {
            transport,
            settings,
            write_lock: Mutex::new(()),
        }
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    fn url(&self, page: &str) -> String {
        page_url(&self.settings.host, page)
    }

    // ==================== 会话 ====================

    /// 登录；不区分"密码错误"与"服务异常"，只看认证 cookie
    pub async fn login(&self, email: &str, password: &str) -> Status {
        let _guard = self.write_lock.lock().await;
        log::info!("登录 {}", email);

        let form: FormFields = [
            ("email", email),
            ("password", password),
            LOGIN_ACTION,
        ]
        .into_iter()
        .collect();

        match self.transport.post(&self.settings.login_url, &form).await {
            Ok(response) if has_auth_cookie(&response.set_cookies) => {
                log::info!("✅ 登录成功");
                Status::ok("Login efetuado com sucesso")
            }
            Ok(_) => {
                log::warn!("登录失败：响应中没有认证 cookie");
                Status::fail(
                    FailureKind::Authentication,
                    "Não foi possível efetuar o login",
                )
            }
            Err(e) => {
                log::warn!("登录请求失败: {}", e);
                Status::from_transport_error(&e, "Não foi possível efetuar o login")
            }
        }
    }

    // ==================== 读取 ====================

    /// 账户概况（委托页侧栏）
    pub async fn info(&self) -> Result<Info> {
        let response = self.transport.get(&self.url(PAGE_ORDERS)).await?;
        extractor::extract_info(&response.body)
    }

    /// 委托簿
    ///
    /// 市价委托的 value 为 0
    pub async fn orders_status(&self, filter: OrderFilter) -> Result<Vec<OrderStatus>> {
        let url = self.url(&format!("{}?f={}", PAGE_ORDERS, filter.as_str()));
        let response = self.transport.post(&url, &FormFields::new()).await?;
        extractor::extract_orders(&response.body)
    }

    pub async fn portfolio(&self) -> Result<Portfolio> {
        let response = self.transport.get(&self.url(PAGE_PORTFOLIO)).await?;
        extractor::extract_portfolio(&response.body)
    }

    pub async fn quotations(&self, view: QuotationView) -> Result<Vec<Quote>> {
        let url = self.url(&format!("{}?view_option={}", PAGE_QUOTATIONS, view.as_str()));
        let response = self.transport.get(&url).await?;
        extractor::extract_quotations(&response.body)
    }

    pub async fn simulator_trades(&self) -> Result<Vec<SimulatorTrade>> {
        let response = self.transport.get(&self.url(PAGE_SIMULATOR_TRADES)).await?;
        extractor::extract_simulator_trades(&response.body)
    }

    // ==================== 写入 ====================

    pub async fn submit_order(&self, request: &OrderRequest) -> Status {
        let _guard = self.write_lock.lock().await;
        orders::submit_order(&self.transport, &self.settings.host, request).await
    }

    /// 买入，pricing 缺省为限价
    pub async fn buy(
        &self,
        symbol: &str,
        price: impl Into<OrderPrice>,
        quantity: impl Into<OrderQuantity>,
        expiration_date: &str,
        pricing: Option<PricingMode>,
    ) -> Status {
        let request = OrderRequest::new(OrderKind::Buy, symbol, price, quantity, expiration_date)
            .with_pricing(pricing.unwrap_or(PricingMode::Fixed));
        self.submit_order(&request).await
    }

    /// 条件买入（start）
    pub async fn buy_start(
        &self,
        symbol: &str,
        price: impl Into<OrderPrice>,
        quantity: impl Into<OrderQuantity>,
        expiration_date: &str,
    ) -> Status {
        let request =
            OrderRequest::new(OrderKind::BuyStart, symbol, price, quantity, expiration_date);
        self.submit_order(&request).await
    }

    /// 卖出，pricing 缺省为限价
    pub async fn sell(
        &self,
        symbol: &str,
        price: impl Into<OrderPrice>,
        quantity: impl Into<OrderQuantity>,
        expiration_date: &str,
        pricing: Option<PricingMode>,
    ) -> Status {
        let request = OrderRequest::new(OrderKind::Sell, symbol, price, quantity, expiration_date)
            .with_pricing(pricing.unwrap_or(PricingMode::Fixed));
        self.submit_order(&request).await
    }

    /// 条件卖出（stop）
    pub async fn sell_stop(
        &self,
        symbol: &str,
        price: impl Into<OrderPrice>,
        quantity: impl Into<OrderQuantity>,
        expiration_date: &str,
    ) -> Status {
        let request =
            OrderRequest::new(OrderKind::SellStop, symbol, price, quantity, expiration_date);
        self.submit_order(&request).await
    }

    pub async fn cancel_orders(&self, order_ids: &[u64]) -> Status {
        let _guard = self.write_lock.lock().await;
        orders::cancel_orders(
            &self.transport,
            &self.settings.host,
            order_ids,
            self.settings.cancel_policy,
        )
        .await
    }

    pub async fn reset_portfolio(&self) -> Status {
        let _guard = self.write_lock.lock().await;
        orders::reset_portfolio(&self.transport, &self.settings.host).await
    }

    /// 导出持仓到文件，结果直接反映 HTTP 状态与写入结果
    pub async fn export_portfolio(&self, dest: &Path) -> Status {
        match self
            .transport
            .download(&self.url(PAGE_PORTFOLIO_EXPORT), dest)
            .await
        {
            Ok(outcome) if outcome.is_success() => {
                log::info!("📥 持仓已导出 {} ({} 字节)", dest.display(), outcome.bytes_written);
                Status::ok("Arquivo obtido com sucesso")
            }
            Ok(outcome) => {
                log::warn!("导出失败: HTTP {}", outcome.status);
                Status::fail(FailureKind::Http, "Não foi possível obter arquivo")
            }
            Err(e) if e.is_transport() => {
                Status::from_transport_error(&e, "Não foi possível obter arquivo")
            }
            Err(e) => {
                log::warn!("导出写入失败: {}", e);
                Status::fail(
                    FailureKind::Transport,
                    format!("Não foi possível obter arquivo: {}", e),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::extractor::fixtures::*;
    use super::super::mock::{Method, MockTransport, RecordedRequest};
    use super::super::transport::PortalResponse;
    use super::*;
    use crate::error::PortalError;

    fn client(transport: MockTransport) -> FolhaInvestClient<MockTransport> {
        FolhaInvestClient::with_transport(
            transport,
            ClientSettings {
                host: "http://portal.test".to_string(),
                login_url: "http://login.test/login".to_string(),
                cancel_policy: CancelSuccessPolicy::HttpStatus,
            },
        )
    }

    fn login_response(set_cookies: &[&str]) -> PortalResponse {
        PortalResponse {
            status: 200,
            url: "http://portal.test/carteira".to_string(),
            set_cookies: set_cookies.iter().map(|s| s.to_string()).collect(),
            body: String::new(),
        }
    }

    #[tokio::test]
    async fn test_login_ok() {
        let client = client(
            MockTransport::new().respond(login_response(&["FOLHA_KEY=abc123; Path=/"])),
        );
        let status = client.login("user@example.com", "secret").await;
        assert!(status.is_ok());

        let requests = client.transport.requests();
        assert_eq!(requests[0].url, "http://login.test/login");
        let form = requests[0].form.as_ref().unwrap();
        assert_eq!(form.get("email"), Some("user@example.com"));
        assert_eq!(form.get("password"), Some("secret"));
        assert_eq!(form.get("auth"), Some("Autenticar"));
    }

    #[tokio::test]
    async fn test_login_similar_cookie_fails() {
        let client = client(
            MockTransport::new().respond(login_response(&["FOLHA_KEY_TMP=1", "sid=FOLHA_KEY"])),
        );
        let status = client.login("user@example.com", "wrong").await;
        assert!(!status.is_ok());
        assert_eq!(status.failure, Some(FailureKind::Authentication));
    }

    #[tokio::test]
    async fn test_login_transport_error() {
        let client = client(MockTransport::new().fail_with(PortalError::Timeout("30s".into())));
        let status = client.login("user@example.com", "secret").await;
        assert_eq!(status.failure, Some(FailureKind::Timeout));
    }

    #[tokio::test]
    async fn test_info() {
        let client = client(MockTransport::new().respond_html("http://portal.test/ordens", USER_INFO_PAGE));
        let info = client.info().await.unwrap();
        assert_eq!(info.monthly_ranking, 37);
        assert_eq!(client.transport.requests()[0].method, Method::Get);
    }

    #[tokio::test]
    async fn test_orders_status_filter() {
        let client = client(MockTransport::new().respond_html("http://portal.test/ordens", ORDERS_PAGE));
        let orders = client.orders_status(OrderFilter::Pendent).await.unwrap();
        assert_eq!(orders.len(), 2);

        let request = &client.transport.requests()[0];
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url, "http://portal.test/ordens?f=pendent");
        assert!(request.form.as_ref().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_portfolio_and_quotations() {
        let client = client(
            MockTransport::new()
                .respond_html("http://portal.test/carteira", PORTFOLIO_PAGE)
                .respond_html("http://portal.test/cotacoes", QUOTATIONS_PAGE)
                .respond_html("http://portal.test/negociacoes", SIMULATOR_PAGE),
        );
        assert_eq!(client.portfolio().await.unwrap().stocks.len(), 2);
        assert_eq!(client.quotations(QuotationView::Portfolio).await.unwrap().len(), 1);
        assert_eq!(client.simulator_trades().await.unwrap().len(), 2);

        let requests = client.transport.requests();
        assert_eq!(requests[1].url, "http://portal.test/cotacoes?view_option=portfolio");
        assert_eq!(requests[2].url, "http://portal.test/negociacoes");
    }

    #[tokio::test]
    async fn test_read_transport_error_propagates() {
        let client = client(MockTransport::new().fail_with(PortalError::Transport("refused".into())));
        let err = client.portfolio().await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_buy_defaults_to_fixed_pricing() {
        let client = client(
            MockTransport::new()
                .respond_html("http://portal.test/comprar", "")
                .respond_html("http://portal.test/comprar", ""),
        );
        let status = client.buy("PETR4", "12,45", 100u64, "31/12/2100", None).await;
        assert!(status.is_ok());

        let form = client.transport.requests()[0].form.clone().unwrap();
        assert_eq!(form.get("pricing"), Some("fixed"));
        assert_eq!(form.get("company"), Some("PETR4"));
    }

    fn two_order_script() -> MockTransport {
        MockTransport::new()
            .respond_html("http://portal.test/comprar", "")
            .respond_html("http://portal.test/comprar", "")
            .respond_html("http://portal.test/vender", "")
            .respond_html("http://portal.test/vender", "")
    }

    /// 请求序列是否为 (提交, 确认) 成对出现
    fn is_paired(requests: &[RecordedRequest]) -> bool {
        requests.chunks(2).all(|pair| {
            pair.len() == 2
                && pair[0].form.as_ref().and_then(|f| f.get("execute")).is_some()
                && pair[1].form.as_ref().and_then(|f| f.get("confirm")) == Some("Confirmar")
        })
    }

    #[tokio::test]
    async fn test_concurrent_orders_do_not_interleave() {
        // 每笔委托 = 提交 + 确认，两笔并发时请求顺序必须成对
        let client = client(two_order_script());

        let (a, b) = tokio::join!(
            client.buy("PETR4", 10.0, 1u64, "31/12/2100", None),
            client.sell("VALE3", 20.0, 1u64, "31/12/2100", None),
        );
        assert!(a.is_ok());
        assert!(b.is_ok());

        let requests = client.transport.requests();
        assert_eq!(requests.len(), 4);
        assert!(is_paired(&requests));
    }

    #[tokio::test]
    async fn test_submits_interleave_without_write_lock() {
        // 绕过客户端直接并发调用协议函数：同一会话上的提交与确认会交错
        let transport = two_order_script();
        let buy = OrderRequest::new(OrderKind::Buy, "PETR4", 10.0, 1u64, "31/12/2100");
        let sell = OrderRequest::new(OrderKind::Sell, "VALE3", 20.0, 1u64, "31/12/2100");

        tokio::join!(
            orders::submit_order(&transport, "http://portal.test", &buy),
            orders::submit_order(&transport, "http://portal.test", &sell),
        );

        let requests = transport.requests();
        assert_eq!(requests.len(), 4);
        assert!(!is_paired(&requests));
    }

    #[tokio::test]
    async fn test_export_portfolio() {
        let dest = std::env::temp_dir().join(format!("carteira-{}.xls", std::process::id()));
        let ok_client = client(
            MockTransport::new().respond_html("http://portal.test/carteira?tsv=yes", "PETR4\t1000\n"),
        );
        let status = ok_client.export_portfolio(&dest).await;
        assert!(status.is_ok());
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "PETR4\t1000\n");
        let _ = std::fs::remove_file(&dest);

        let denied_client =
            client(MockTransport::new().respond_status("http://portal.test/carteira?tsv=yes", 403));
        let status = denied_client.export_portfolio(&dest).await;
        assert_eq!(status.failure, Some(FailureKind::Http));
        assert!(!dest.exists());
    }
}
