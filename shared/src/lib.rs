//! Shared domain types for the shop backend
//!
//! 服务端与客户端共用的领域类型，全部通过 serde 序列化。
//!
//! # 模块结构
//!
//! - [`order`] - 订单聚合：状态机枚举、订单、订单项、状态历史
//! - [`payment`] - 支付记录与支付状态
//! - [`product`] - 商品（库存/销量计数器）
//! - [`cart`] - 购物车行项目

pub mod cart;
pub mod order;
pub mod payment;
pub mod product;

// Re-export 公共类型
pub use cart::CartLine;
pub use order::{
    Order, OrderItem, OrderPaymentStatus, OrderStatus, PaymentMethod, ReturnStatus, StatusChange,
};
pub use payment::{Payment, PaymentStatus};
pub use product::Product;
