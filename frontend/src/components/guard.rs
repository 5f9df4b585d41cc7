//! 权限门组件
//!
//! 包裹需要特定权限才可见的界面片段（按钮、表单入口等）。
//! 判定用 [`crate::permissions::permissions_satisfied`]，权限名
//! 集合来自 concert store 的会话缓存。

use crate::permissions::{MatchMode, permissions_satisfied};
use crate::stores::concert::use_concerts;
use leptos::prelude::*;

#[component]
pub fn RequirePermissions(
    /// 所需权限名
    #[prop(into)]
    required: Vec<String>,
    /// 组合方式，默认满足任一即可
    #[prop(optional)]
    mode: MatchMode,
    children: ChildrenFn,
) -> impl IntoView {
    let concerts = use_concerts();
    let required = StoredValue::new(required);

    let satisfied = move || {
        concerts.state.with(|s| {
            required.with_value(|required| {
                permissions_satisfied(s.granted_permissions(), required, mode)
            })
        })
    };

    view! { <Show when=satisfied>{children()}</Show> }
}

/// 把 `&str` 常量列表转成所需权限参数
pub fn perms(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
