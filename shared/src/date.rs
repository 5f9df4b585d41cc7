//! 日期字符串工具
//!
//! 后端所有日期均为 `YYYY-MM-DD` 字符串；本模块提供严格解析与
//! 展示格式化，纯函数实现，不依赖 js_sys，宿主环境可直接测试。

/// 严格解析 `YYYY-MM-DD`，含月份天数与闰年校验
pub fn parse_ymd(s: &str) -> Option<(i32, u32, u32)> {
    let mut parts = s.split('-');
    let year = parts.next()?;
    let month = parts.next()?;
    let day = parts.next()?;
    if parts.next().is_some() || year.len() != 4 || month.len() != 2 || day.len() != 2 {
        return None;
    }

    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    if month == 0 || month > 12 || day == 0 || day > days_in_month(year, month) {
        return None;
    }
    Some((year, month, day))
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// 展示格式：`2025-05-01` → `2025年5月1日`；无法解析时原样返回
pub fn format_display(s: &str) -> String {
    match parse_ymd(s) {
        Some((year, month, day)) => format!("{year}年{month}月{day}日"),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_dates() {
        assert_eq!(parse_ymd("2025-05-01"), Some((2025, 5, 1)));
        assert_eq!(parse_ymd("2024-02-29"), Some((2024, 2, 29)));
    }

    #[test]
    fn rejects_invalid_dates() {
        assert_eq!(parse_ymd("2025-02-29"), None); // 非闰年
        assert_eq!(parse_ymd("2025-13-01"), None);
        assert_eq!(parse_ymd("2025-00-10"), None);
        assert_eq!(parse_ymd("2025-5-1"), None); // 必须补零
        assert_eq!(parse_ymd("05-01"), None);
    }

    #[test]
    fn formats_for_display() {
        assert_eq!(format_display("2025-05-01"), "2025年5月1日");
        assert_eq!(format_display("不是日期"), "不是日期");
    }
}
