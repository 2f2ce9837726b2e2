//! 服务器配置
//!
//! # 环境变量
//!
//! 所有配置项都可以通过环境变量覆盖：
//!
//! | 环境变量 | 默认值 | 说明 |
//! |----------|--------|------|
//! | HTTP_PORT | 3000 | HTTP 服务端口 |
//! | DB_PATH | shop.redb | 嵌入式数据库文件 |
//! | FRONTEND_URL | http://localhost:5173 | 前端地址（支付结果跳转） |
//! | NOTIFY_WEBHOOK_URL | (未设置) | 签收通知 webhook |
//! | REFUND_ENDPOINT | (未设置) | 退款服务商接口 |
//! | VNPAY_TMN_CODE | DEMOSHOP | 网关商户码 |
//! | VNPAY_HASH_SECRET | (开发密钥) | 网关 HMAC 密钥 |
//! | VNPAY_URL | (沙箱地址) | 网关支付页 |
//! | VNPAY_RETURN_URL | http://localhost:3000/vnpay-return | 回调地址 |
//!
//! 网关密钥只在启动时读取一次，随后作为 [`VnpayConfig`] 注入网关客户端。

use crate::gateway::VnpayConfig;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 数据库文件路径
    pub db_path: String,
    /// 前端地址（支付成功/失败跳转目标）
    pub frontend_url: String,
    /// 签收通知 webhook（未设置则只记录日志）
    pub notify_webhook_url: Option<String>,
    /// 退款服务商接口（未设置则本地确认退款）
    pub refund_endpoint: Option<String>,
    /// 支付网关配置
    pub vnpay: VnpayConfig,
}

impl Config {
    /// 从环境变量加载配置，未设置的项使用默认值
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| "shop.redb".into()),
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            notify_webhook_url: std::env::var("NOTIFY_WEBHOOK_URL").ok(),
            refund_endpoint: std::env::var("REFUND_ENDPOINT").ok(),
            vnpay: VnpayConfig {
                tmn_code: std::env::var("VNPAY_TMN_CODE").unwrap_or_else(|_| "DEMOSHOP".into()),
                hash_secret: std::env::var("VNPAY_HASH_SECRET")
                    .unwrap_or_else(|_| "dev-only-secret".into()),
                base_url: std::env::var("VNPAY_URL").unwrap_or_else(|_| {
                    "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html".into()
                }),
                return_url: std::env::var("VNPAY_RETURN_URL")
                    .unwrap_or_else(|_| "http://localhost:3000/vnpay-return".into()),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
