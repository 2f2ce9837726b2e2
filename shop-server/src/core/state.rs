//! 服务器状态 - 持有所有服务的共享引用
//!
//! ServerState 使用 Arc/Clone 语义在 axum handler 间共享：
//!
//! | 字段 | 说明 |
//! |------|------|
//! | config | 配置项（不可变） |
//! | store | 嵌入式 redb 存储 |
//! | orders | 订单生命周期管理器 |
//! | payments | 支付对账服务 |
//! | gateway | 支付网关客户端 |

use std::sync::Arc;

use crate::core::Config;
use crate::db::Store;
use crate::gateway::VnpayGateway;
use crate::notify::{NoopNotifier, Notifier, WebhookNotifier};
use crate::orders::OrderManager;
use crate::payments::{HttpRefundProvider, PaymentService};

#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub store: Store,
    pub orders: OrderManager,
    pub payments: PaymentService,
    pub gateway: Arc<VnpayGateway>,
}

impl ServerState {
    /// Initialize all services from configuration
    pub fn initialize(config: &Config) -> anyhow::Result<Self> {
        let store = Store::open(&config.db_path)?;
        Ok(Self::with_store(config.clone(), store))
    }

    /// Build the state around an existing store (tests use an in-memory one)
    pub fn with_store(config: Config, store: Store) -> Self {
        let notifier: Arc<dyn Notifier> = match &config.notify_webhook_url {
            Some(url) => Arc::new(WebhookNotifier::new(url.clone())),
            None => Arc::new(NoopNotifier),
        };
        let provider = Arc::new(HttpRefundProvider::new(config.refund_endpoint.clone()));
        let orders = OrderManager::new(store.clone(), notifier);
        let payments = PaymentService::new(store.clone(), provider);
        let gateway = Arc::new(VnpayGateway::new(config.vnpay.clone()));

        Self {
            config,
            store,
            orders,
            payments,
            gateway,
        }
    }
}
