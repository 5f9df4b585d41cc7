//! 权限判定模块
//!
//! 纯函数的策略判定，供各路由/组件复用，独立于路由系统可测。
//! 权限名集合按会话从后端获取并缓存（见 concert store），登出清空。

/// 多个所需权限之间的组合方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// 满足任意一个即可
    #[default]
    Any,
    /// 必须全部满足
    All,
}

/// 判定当前用户的权限集合是否满足要求。
/// 空的所需集合恒为满足。
pub fn permissions_satisfied(granted: &[String], required: &[String], mode: MatchMode) -> bool {
    if required.is_empty() {
        return true;
    }
    let has = |name: &String| granted.iter().any(|g| g == name);
    match mode {
        MatchMode::Any => required.iter().any(has),
        MatchMode::All => required.iter().all(has),
    }
}

/// 常用权限名
pub mod names {
    pub const CONCERT_ADD: &str = "concerts.add";
    pub const CONCERT_CHANGE: &str = "concerts.change";
    pub const CONCERT_DELETE: &str = "concerts.delete";
    pub const ATTENDANCE_MANAGE: &str = "attendance.manage";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn granted() -> Vec<String> {
        vec!["concerts.add".to_string(), "attendance.manage".to_string()]
    }

    fn required(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_requirement_is_always_satisfied() {
        assert!(permissions_satisfied(&[], &[], MatchMode::Any));
        assert!(permissions_satisfied(&granted(), &[], MatchMode::All));
    }

    #[test]
    fn any_mode_needs_one_match() {
        let need = required(&["concerts.delete", "attendance.manage"]);
        assert!(permissions_satisfied(&granted(), &need, MatchMode::Any));

        let need = required(&["concerts.delete", "concerts.change"]);
        assert!(!permissions_satisfied(&granted(), &need, MatchMode::Any));
    }

    #[test]
    fn all_mode_needs_every_match() {
        let need = required(&["concerts.add", "attendance.manage"]);
        assert!(permissions_satisfied(&granted(), &need, MatchMode::All));

        let need = required(&["concerts.add", "concerts.delete"]);
        assert!(!permissions_satisfied(&granted(), &need, MatchMode::All));
    }

    #[test]
    fn empty_grant_fails_any_nonempty_requirement() {
        let need = required(&["concerts.add"]);
        assert!(!permissions_satisfied(&[], &need, MatchMode::Any));
        assert!(!permissions_satisfied(&[], &need, MatchMode::All));
    }
}
