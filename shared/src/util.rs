//! 通用工具函数

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// 获取当前 UTC 时间的 RFC 3339 字符串
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// 当天零点 (UTC) 的毫秒时间戳，用于 "今日" 统计查询
pub fn today_start_millis() -> i64 {
    let now = chrono::Utc::now();
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc()
        .timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_today_start_before_now() {
        let start = today_start_millis();
        let now = now_millis();
        assert!(start <= now);
        // 距离零点不超过 24 小时
        assert!(now - start < 24 * 60 * 60 * 1000);
    }
}
