//! 后端结构化错误体解析
//!
//! 后端以 JSON 对象返回校验错误：字段名映射到一条消息或消息数组，
//! 另有 `detail` / `non_field_errors` 两个通用槽位，以及可选的机器
//! 可读 `code`。本模块只负责"从错误体里挑出最该展示的那一句话"，
//! 兜底文案由调用方提供。

use serde_json::Value;

/// 通用槽位，字段消息都不存在时才轮到它们
const GENERIC_KEYS: [&str; 2] = ["non_field_errors", "detail"];

/// 从结构化错误体中取第一条可展示的消息。
///
/// 取词顺序：`priority` 中的字段（按给定次序）→ 其余任意字段 →
/// `non_field_errors` → `detail`。多行消息只取第一行。
pub fn first_error_message(body: &Value, priority: &[&str]) -> Option<String> {
    let object = match body {
        Value::Object(map) => map,
        // 偶发的纯文本错误体
        Value::String(s) => return first_line(s),
        _ => return None,
    };

    for key in priority {
        if let Some(message) = object.get(*key).and_then(message_of) {
            return Some(message);
        }
    }

    for (key, value) in object {
        if GENERIC_KEYS.contains(&key.as_str()) || key == "code" {
            continue;
        }
        if let Some(message) = message_of(value) {
            return Some(message);
        }
    }

    for key in GENERIC_KEYS {
        if let Some(message) = object.get(key).and_then(message_of) {
            return Some(message);
        }
    }

    None
}

/// 错误体中的机器可读 code（如 `account_pending`）
pub fn error_code(body: &Value) -> Option<&str> {
    body.get("code")?.as_str()
}

fn message_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => first_line(s),
        Value::Array(items) => items.iter().find_map(message_of),
        _ => None,
    }
}

fn first_line(s: &str) -> Option<String> {
    let line = s.lines().next()?.trim();
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn priority_fields_win_over_other_fields() {
        let body = json!({
            "location": ["地点不可为空"],
            "date": ["日期格式不正确"],
            "name": ["名称已存在"],
        });
        let msg = first_error_message(&body, &["name", "date", "location"]);
        assert_eq!(msg.as_deref(), Some("名称已存在"));
    }

    #[test]
    fn falls_through_priority_order() {
        let body = json!({ "location": "地点不可为空", "date": "日期格式不正确" });
        let msg = first_error_message(&body, &["name", "date", "location"]);
        assert_eq!(msg.as_deref(), Some("日期格式不正确"));
    }

    #[test]
    fn non_priority_field_beats_generic_slots() {
        let body = json!({
            "detail": "请求无效",
            "page_size": ["每页数量过大"],
        });
        let msg = first_error_message(&body, &["name"]);
        assert_eq!(msg.as_deref(), Some("每页数量过大"));
    }

    #[test]
    fn generic_slots_as_last_resort() {
        let body = json!({ "detail": "未找到该资源" });
        assert_eq!(
            first_error_message(&body, &["name"]).as_deref(),
            Some("未找到该资源")
        );
    }

    #[test]
    fn only_first_line_is_surfaced() {
        let body = json!({ "name": "名称过长\n详细信息：上限 200 字符" });
        assert_eq!(
            first_error_message(&body, &["name"]).as_deref(),
            Some("名称过长")
        );
    }

    #[test]
    fn empty_or_unstructured_body_yields_none() {
        assert_eq!(first_error_message(&json!({}), &["name"]), None);
        assert_eq!(first_error_message(&json!(42), &["name"]), None);
    }

    #[test]
    fn code_is_exposed_but_never_shown_as_message() {
        let body = json!({ "code": "account_pending", "detail": "账号待审批" });
        assert_eq!(error_code(&body), Some("account_pending"));
        assert_eq!(
            first_error_message(&body, &[]).as_deref(),
            Some("账号待审批")
        );
    }
}
