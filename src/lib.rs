//! FolhaInvest 模拟交易客户端
//!
//! 通过抓取 HTML 页面读取账户、持仓、委托和行情，
//! 并以提交-确认两阶段协议下单。

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use error::{PortalError, Result};
pub use services::folhainvest::{
    CancelSuccessPolicy, ClientSettings, FolhaInvestClient, HttpTransport, OrderRequest,
    Transport, TransportOptions,
};
