//! 工具模块
//!
//! - [`error`] - 统一错误类型与 API 响应结构
//! - [`time`] - 时间戳与网关时间格式

pub mod error;
pub mod time;

pub use error::{ok, ok_with_message, AppError, AppResponse};

/// Handler result alias
pub type AppResult<T> = Result<T, AppError>;
