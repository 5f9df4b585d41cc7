//! 路由定义模块 - 领域模型
//!
//! 纯业务逻辑层，不依赖 DOM 或 web_sys：定义全部路由、
//! 各路由的守卫属性，以及纯函数形式的导航裁决 [`resolve`]。

use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 登录页 (默认路由)
    #[default]
    Login,
    /// 注册页（注册后仍需管理员审批）
    Register,
    /// 首页面板 (需要认证)
    Dashboard,
    /// 音乐会列表 (需要认证)
    Concerts,
    /// 音乐会详情 (需要认证)
    ConcertDetail(u64),
    /// 团员名册 (需要认证)
    Musicians,
    /// 乐季考勤 (需要认证)
    Attendance,
    /// 个人资料 (需要认证)
    Profile,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" | "/login" => Self::Login,
            "/register" => Self::Register,
            "/dashboard" => Self::Dashboard,
            "/concerts" => Self::Concerts,
            "/musicians" => Self::Musicians,
            "/attendance" => Self::Attendance,
            "/profile" => Self::Profile,
            _ => match trimmed
                .strip_prefix("/concerts/")
                .and_then(|id| id.parse::<u64>().ok())
            {
                Some(id) => Self::ConcertDetail(id),
                None => Self::NotFound,
            },
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Login => "/".to_string(),
            Self::Register => "/register".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::Concerts => "/concerts".to_string(),
            Self::ConcertDetail(id) => format!("/concerts/{id}"),
            Self::Musicians => "/musicians".to_string(),
            Self::Attendance => "/attendance".to_string(),
            Self::Profile => "/profile".to_string(),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// 该路由是否需要认证
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Self::Login | Self::Register | Self::NotFound)
    }

    /// 已认证用户是否应离开此路由（登录/注册页）
    pub fn redirects_when_authenticated(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

// =========================================================
// 导航裁决 (Navigation Decision)
// =========================================================

/// 守卫对一次导航请求的裁决
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavDecision {
    /// 放行目标路由
    Allow,
    /// 重定向到另一路由
    Redirect(AppRoute),
}

/// 核心守卫逻辑：给定目标路由与认证状态，给出裁决。
///
/// - 未认证访问受保护路由 → 重定向到登录页
/// - 已认证访问登录/注册页 → 重定向到首页面板
pub fn resolve(target: &AppRoute, is_authenticated: bool) -> NavDecision {
    if target.requires_auth() && !is_authenticated {
        return NavDecision::Redirect(AppRoute::Login);
    }
    if target.redirects_when_authenticated() && is_authenticated {
        return NavDecision::Redirect(AppRoute::Dashboard);
    }
    NavDecision::Allow
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_paths() {
        assert_eq!(AppRoute::from_path("/"), AppRoute::Login);
        assert_eq!(AppRoute::from_path("/concerts"), AppRoute::Concerts);
        assert_eq!(AppRoute::from_path("/concerts/17"), AppRoute::ConcertDetail(17));
        assert_eq!(AppRoute::from_path("/concerts/xyz"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/no-such-page"), AppRoute::NotFound);
    }

    #[test]
    fn paths_round_trip() {
        for route in [
            AppRoute::Register,
            AppRoute::Dashboard,
            AppRoute::Concerts,
            AppRoute::ConcertDetail(5),
            AppRoute::Musicians,
            AppRoute::Attendance,
            AppRoute::Profile,
        ] {
            assert_eq!(AppRoute::from_path(&route.to_path()), route);
        }
    }

    #[test]
    fn guard_blocks_anonymous_access() {
        assert_eq!(
            resolve(&AppRoute::Concerts, false),
            NavDecision::Redirect(AppRoute::Login)
        );
        assert_eq!(
            resolve(&AppRoute::ConcertDetail(3), false),
            NavDecision::Redirect(AppRoute::Login)
        );
        assert_eq!(resolve(&AppRoute::Register, false), NavDecision::Allow);
    }

    #[test]
    fn guard_redirects_authenticated_away_from_login() {
        assert_eq!(
            resolve(&AppRoute::Login, true),
            NavDecision::Redirect(AppRoute::Dashboard)
        );
        assert_eq!(resolve(&AppRoute::Concerts, true), NavDecision::Allow);
    }
}
