//! Tutti 共享类型库
//!
//! 前端各层共用的领域模型与 REST 协议描述：
//! - 领域模型：用户、音乐会、乐季/考勤、首页聚合
//! - `protocol`: 端点描述 trait 与全部请求定义
//! - `error`: 后端结构化错误体的解析
//! - `date`: 纯 `YYYY-MM-DD` 日期字符串工具

use serde::{Deserialize, Serialize};

pub mod attendance;
pub mod concert;
pub mod date;
pub mod error;
pub mod home;
pub mod protocol;

pub use attendance::{
    AttendanceRecord, EventType, MarkAttendanceRequest, OrchestraEvent, Presence, Season,
};
pub use concert::{
    CONCERT_ERROR_FIELDS, Concert, ConcertFilter, ConcertInput, ConcertStatus, Participant,
};
pub use home::{ActivityEntry, HomeStats, UpcomingEvent};

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const BEARER_PREFIX: &str = "Bearer ";

/// 后端在登录错误体中显式标记"账号待审批"的 code 值
pub const CODE_ACCOUNT_PENDING: &str = "account_pending";

// =========================================================
// 用户与乐手档案 (User & Musician Profile)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicianProfile {
    pub instrument: String,
    pub birthday: Option<String>,
    pub photo: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: String,
    pub musician_profile: MusicianProfile,
}

impl UserProfile {
    /// 显示名：优先姓名，否则用户名
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

// =========================================================
// 认证请求/响应 (Auth)
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 登录成功返回的凭据对
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// 刷新只换发新的 access 凭据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub instrument: String,
}

/// 注册只创建账号，不发放凭据（需管理员审批后才能登录）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub id: u64,
    pub username: String,
}

// =========================================================
// 个人资料维护 (Profile Maintenance)
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MusicianProfileInput {
    pub instrument: String,
    pub birthday: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub musician_profile: MusicianProfileInput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

// =========================================================
// 分页响应 (Pagination)
// =========================================================

/// 后端列表端点的统一分页包装：`{count, next?, previous?, results}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(first: &str, last: &str, username: &str) -> UserProfile {
        UserProfile {
            id: 1,
            username: username.to_string(),
            email: "a@b.c".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            date_joined: "2024-01-01".to_string(),
            musician_profile: MusicianProfile {
                instrument: "小提琴".to_string(),
                birthday: None,
                photo: None,
                active: true,
            },
        }
    }

    #[test]
    fn display_name_prefers_full_name() {
        assert_eq!(profile("安娜", "李", "anna").display_name(), "安娜 李");
    }

    #[test]
    fn display_name_falls_back_to_username() {
        assert_eq!(profile("", "", "anna").display_name(), "anna");
    }

    #[test]
    fn page_flags_follow_links() {
        let page = Page::<u32> {
            count: 3,
            next: Some("/concerts?page=2".to_string()),
            previous: None,
            results: vec![1, 2],
        };
        assert!(page.has_next());
        assert!(!page.has_previous());
    }
}
