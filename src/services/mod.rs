//! 业务逻辑服务模块
//!
//! 封装门户访问和页面解析逻辑

pub mod folhainvest; // FolhaInvest 门户客户端
