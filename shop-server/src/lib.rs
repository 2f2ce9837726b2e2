//! Shop Server - 订单生命周期与支付对账服务
//!
//! # 架构概述
//!
//! 本模块是服务主入口，提供以下核心功能：
//!
//! - **订单生命周期** (`orders`): 下单预留库存、状态机流转、退货流程
//! - **支付对账** (`payments`): 支付记录与订单状态的一致性维护
//! - **支付网关** (`gateway`): HMAC-SHA512 签名的跳转式网关协议
//! - **数据库** (`db`): 嵌入式 redb 存储，单写事务保证原子性
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! shop-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── api/           # HTTP 路由和处理器
//! ├── orders/        # 订单生命周期（动作 + 管理器）
//! ├── payments/      # 支付对账与退款服务商
//! ├── gateway/       # 网关签名协议
//! ├── notify/        # 签收通知
//! ├── db/            # 数据库层
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod gateway;
pub mod notify;
pub mod orders;
pub mod payments;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{Config, Server, ServerState};
pub use crate::db::Store;
pub use crate::gateway::{VnpayConfig, VnpayGateway};
pub use crate::orders::OrderManager;
pub use crate::payments::PaymentService;
pub use crate::utils::{AppError, AppResult};
