//! 时间工具函数 — 业务时区转换
//!
//! 所有日期→时间戳转换统一在 service/handler 层完成，
//! repository 层只接收 `i64` Unix millis。

use chrono::{NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 解析时段字符串 (HH:MM)
pub fn parse_time_slot(slot: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(slot, "%H:%M")
        .map_err(|_| AppError::validation(format!("Invalid time slot format: {}", slot)))
}

/// 日期 + 时段 → Unix millis (业务时区)
///
/// DST gap fallback: 如果本地时间不存在 (夏令时跳跃)，fallback 到 UTC。
pub fn slot_start_millis(date: &str, time_slot: &str, tz: Tz) -> AppResult<i64> {
    let naive = parse_date(date)?.and_time(parse_time_slot(time_slot)?);
    Ok(naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis()))
}

/// 当前时间的 Unix millis
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
