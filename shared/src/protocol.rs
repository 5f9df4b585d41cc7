//! REST 协议描述
//!
//! 每个后端操作对应一个请求类型，并通过 [`ApiEndpoint`] 声明
//! 响应类型、HTTP 方法与路径。路径含 id 与查询串，因此是
//! `fn path(&self)` 而非常量。请求体仅在写方法（POST/PUT/PATCH）
//! 上序列化。

use crate::attendance::{
    AttendanceRecord, EventInput, MarkAttendanceRequest, OrchestraEvent, Season, SeasonInput,
};
use crate::concert::{
    Concert, ConcertFilter, ConcertInput, ConcertPermissions, Participant, RegistrationKind,
    RegistrationSummary,
};
use crate::home::{ActivityEntry, HomeStats, UpcomingEvent};
use crate::{
    ChangePasswordRequest, LoginRequest, Page, RefreshRequest, RefreshResponse, RegisterRequest,
    RegisterResponse, TokenPair, UpdateProfileRequest, UserProfile,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// 该方法是否携带 JSON 请求体
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiEndpoint: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// 匿名端点：不附加 Bearer 凭据，401 时也不触发刷新重试
    const ANONYMOUS: bool = false;
    /// The URL path, including any query string.
    fn path(&self) -> String;
}

/// 拼接查询参数，值做百分号编码
fn push_query(buf: &mut String, key: &str, value: &str) {
    buf.push(if buf.contains('?') { '&' } else { '?' });
    buf.push_str(key);
    buf.push('=');
    buf.push_str(&urlencoding::encode(value));
}

// =========================================================
// 认证端点 (Auth)
// =========================================================

impl ApiEndpoint for LoginRequest {
    type Response = TokenPair;
    const METHOD: HttpMethod = HttpMethod::Post;
    const ANONYMOUS: bool = true;
    fn path(&self) -> String {
        "/auth/login".to_string()
    }
}

impl ApiEndpoint for RefreshRequest {
    type Response = RefreshResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    const ANONYMOUS: bool = true;
    fn path(&self) -> String {
        "/auth/refresh".to_string()
    }
}

impl ApiEndpoint for RegisterRequest {
    type Response = RegisterResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    const ANONYMOUS: bool = true;
    fn path(&self) -> String {
        "/auth/register".to_string()
    }
}

// =========================================================
// 用户端点 (Users)
// =========================================================

#[derive(Debug, Clone, Serialize)]
pub struct GetProfileRequest;

impl ApiEndpoint for GetProfileRequest {
    type Response = UserProfile;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/users/profile".to_string()
    }
}

impl ApiEndpoint for UpdateProfileRequest {
    type Response = UserProfile;
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        "/users/profile".to_string()
    }
}

impl ApiEndpoint for ChangePasswordRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/users/change-password".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListMusiciansRequest;

impl ApiEndpoint for ListMusiciansRequest {
    type Response = Vec<UserProfile>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/users/musicians".to_string()
    }
}

// =========================================================
// 音乐会端点 (Concerts)
// =========================================================

impl ApiEndpoint for ConcertFilter {
    type Response = Page<Concert>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        let mut path = "/concerts".to_string();
        if let Some(status) = &self.status {
            push_query(&mut path, "status", status.as_str());
        }
        if let Some(date_from) = &self.date_from {
            push_query(&mut path, "date_from", date_from);
        }
        if let Some(date_to) = &self.date_to {
            push_query(&mut path, "date_to", date_to);
        }
        if let Some(search) = &self.search {
            push_query(&mut path, "search", search);
        }
        push_query(&mut path, "page", &self.page.to_string());
        push_query(&mut path, "page_size", &self.page_size.to_string());
        path
    }
}

impl ApiEndpoint for ConcertInput {
    type Response = Concert;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/concerts".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GetConcertRequest {
    pub id: u64,
}

impl ApiEndpoint for GetConcertRequest {
    type Response = Concert;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/concerts/{}", self.id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateConcertRequest {
    #[serde(skip)]
    pub id: u64,
    #[serde(flatten)]
    pub input: ConcertInput,
}

impl ApiEndpoint for UpdateConcertRequest {
    type Response = Concert;
    const METHOD: HttpMethod = HttpMethod::Patch;
    fn path(&self) -> String {
        format!("/concerts/{}", self.id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteConcertRequest {
    pub id: u64,
}

impl ApiEndpoint for DeleteConcertRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;
    fn path(&self) -> String {
        format!("/concerts/{}", self.id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationRequest {
    #[serde(skip)]
    pub id: u64,
    pub action: RegistrationKind,
}

impl ApiEndpoint for RegistrationRequest {
    type Response = RegistrationSummary;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        format!("/concerts/{}/register", self.id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListParticipantsRequest {
    pub id: u64,
}

impl ApiEndpoint for ListParticipantsRequest {
    type Response = Vec<Participant>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/concerts/{}/participants", self.id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GetConcertPermissionsRequest;

impl ApiEndpoint for GetConcertPermissionsRequest {
    type Response = ConcertPermissions;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/concerts/permissions".to_string()
    }
}

// =========================================================
// 首页聚合端点 (Home)
// =========================================================

#[derive(Debug, Clone, Serialize)]
pub struct GetHomeStatsRequest;

impl ApiEndpoint for GetHomeStatsRequest {
    type Response = HomeStats;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/home/stats".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GetUpcomingEventsRequest;

impl ApiEndpoint for GetUpcomingEventsRequest {
    type Response = Vec<UpcomingEvent>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/home/upcoming-events".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GetRecentActivityRequest;

impl ApiEndpoint for GetRecentActivityRequest {
    type Response = Vec<ActivityEntry>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/home/recent-activity".to_string()
    }
}

// =========================================================
// 乐季与考勤端点 (Attendance)
// =========================================================

#[derive(Debug, Clone, Serialize)]
pub struct ListSeasonsRequest;

impl ApiEndpoint for ListSeasonsRequest {
    type Response = Vec<Season>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/attendance/seasons".to_string()
    }
}

impl ApiEndpoint for SeasonInput {
    type Response = Season;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/attendance/seasons".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListEventsRequest {
    pub season: u64,
}

impl ApiEndpoint for ListEventsRequest {
    type Response = Vec<OrchestraEvent>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        let mut path = "/attendance/events".to_string();
        push_query(&mut path, "season", &self.season.to_string());
        path
    }
}

impl ApiEndpoint for EventInput {
    type Response = OrchestraEvent;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/attendance/events".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListAttendanceRequest {
    pub event: u64,
}

impl ApiEndpoint for ListAttendanceRequest {
    type Response = Vec<AttendanceRecord>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        let mut path = "/attendance/records".to_string();
        push_query(&mut path, "event", &self.event.to_string());
        path
    }
}

impl ApiEndpoint for MarkAttendanceRequest {
    type Response = AttendanceRecord;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/attendance/mark".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concert::ConcertStatus;

    #[test]
    fn filter_path_carries_all_set_parameters() {
        let filter = ConcertFilter {
            search: Some("spring gala".to_string()),
            status: Some(ConcertStatus::Completed),
            date_from: Some("2025-01-01".to_string()),
            date_to: None,
            page: 2,
            page_size: 10,
        };
        assert_eq!(
            filter.path(),
            "/concerts?status=completed&date_from=2025-01-01&search=spring%20gala&page=2&page_size=10"
        );
    }

    #[test]
    fn default_filter_only_paginates() {
        assert_eq!(ConcertFilter::default().path(), "/concerts?page=1&page_size=20");
    }

    #[test]
    fn id_endpoints_embed_the_id() {
        assert_eq!(GetConcertRequest { id: 42 }.path(), "/concerts/42");
        assert_eq!(
            RegistrationRequest { id: 42, action: RegistrationKind::Register }.path(),
            "/concerts/42/register"
        );
        assert_eq!(ListEventsRequest { season: 3 }.path(), "/attendance/events?season=3");
    }

    #[test]
    fn registration_body_omits_the_path_id() {
        let body = serde_json::to_value(RegistrationRequest {
            id: 42,
            action: RegistrationKind::Unregister,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "action": "unregister" }));
    }

    #[test]
    fn auth_endpoints_are_anonymous() {
        assert!(LoginRequest::ANONYMOUS);
        assert!(RefreshRequest::ANONYMOUS);
        assert!(RegisterRequest::ANONYMOUS);
        assert!(!GetProfileRequest::ANONYMOUS);
    }
}
