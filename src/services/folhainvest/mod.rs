//! FolhaInvest 模拟交易门户客户端
//!
//! - `normalizer`：巴西本地化数值解析
//! - `extractor`：页面表格抽取
//! - `orders`：提交-确认两阶段委托、撤单、重置
//! - `client`：唯一会话上的读写操作

pub mod client;
pub mod common;
pub mod extractor;
pub mod normalizer;
pub mod orders;
pub mod transport;

#[cfg(test)]
mod mock;

pub use client::{ClientSettings, FolhaInvestClient};
pub use orders::{CancelSuccessPolicy, OrderRequest};
pub use transport::{HttpTransport, Transport, TransportOptions};
