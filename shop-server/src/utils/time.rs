//! 时间工具函数
//!
//! Repository 层只接收 `i64` Unix millis；网关协议使用紧凑的
//! `YYYYMMDDHHmmss` 文本格式。

use chrono::{DateTime, Utc};

/// Current time as Unix millis
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Format a timestamp in the gateway's `YYYYMMDDHHmmss` form
pub fn gateway_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_gateway_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 42).unwrap();
        assert_eq!(gateway_timestamp(at), "20240307090542");
    }
}
