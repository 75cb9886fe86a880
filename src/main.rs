//! FolhaInvest 后端服务
//!
//! 把模拟交易门户包装成 RESTful JSON 接口
//! 数据来源：FolhaInvest 页面抓取

mod handlers;   // HTTP 请求处理器
mod middleware; // 中间件

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use folhainvest_backend::config::AppConfig;
use folhainvest_backend::FolhaInvestClient;

use crate::handlers::AppState;
use crate::middleware::ApiKeyMiddleware;

/// 应用程序入口
///
/// 加载配置、建立门户会话（可选地立即登录），然后启动 HTTP 服务器
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load();

    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.as_str()));

    log::info!("启动 FolhaInvest 后端服务");

    if config.api.api_key.is_empty() {
        anyhow::bail!("未设置 API_KEY（环境变量或 api.api_key），拒绝启动");
    }

    config.portal.validate()?;
    let client = FolhaInvestClient::from_config(&config.portal, &config.transport_options())?;

    if let Some((email, password)) = config.portal.credentials() {
        let status = client.login(email, password).await;
        if status.is_ok() {
            log::info!("✅ 已登录门户: {}", email);
        } else {
            log::warn!("启动登录失败: {}", status.description);
        }
    }

    let state = web::Data::new(AppState {
        client,
        export_path: config.portal.export_path.clone(),
    });
    let api_key = config.api.api_key.clone();
    let bind_addr = config.bind_addr();

    log::info!("监听 {}", bind_addr);

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())  // 请求日志
            .wrap(ApiKeyMiddleware::new(api_key.clone()))  // API Key 认证
            .app_data(state.clone())
            .configure(handlers::config)  // 配置路由
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(bind_addr)?.run().await?;
    Ok(())
}
