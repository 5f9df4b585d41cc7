//! 音乐会领域模型

use serde::{Deserialize, Serialize};

// =========================================================
// 音乐会状态 (Concert Status)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConcertStatus {
    #[default]
    Planned,
    Confirmed,
    Completed,
    Cancelled,
}

impl ConcertStatus {
    /// 查询参数中使用的后端标识
    pub fn as_str(&self) -> &'static str {
        match self {
            ConcertStatus::Planned => "planned",
            ConcertStatus::Confirmed => "confirmed",
            ConcertStatus::Completed => "completed",
            ConcertStatus::Cancelled => "cancelled",
        }
    }

    /// 界面展示用的中文标签
    pub fn label(&self) -> &'static str {
        match self {
            ConcertStatus::Planned => "筹备中",
            ConcertStatus::Confirmed => "已确认",
            ConcertStatus::Completed => "已结束",
            ConcertStatus::Cancelled => "已取消",
        }
    }

    pub const ALL: [ConcertStatus; 4] = [
        ConcertStatus::Planned,
        ConcertStatus::Confirmed,
        ConcertStatus::Completed,
        ConcertStatus::Cancelled,
    ];
}

// =========================================================
// 音乐会记录 (Concert)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concert {
    pub id: u64,
    pub name: String,
    /// 演出日期，`YYYY-MM-DD`
    pub date: String,
    pub location: Option<String>,
    pub description: Option<String>,
    /// 曲目单，自由文本
    pub setlist: Option<String>,
    pub status: ConcertStatus,
    /// 报名摘要：人数 + 当前用户是否已报名
    pub participants_count: u32,
    pub is_registered: bool,
    /// 由后端按当前用户权限计算
    #[serde(default)]
    pub can_edit: bool,
    #[serde(default)]
    pub can_delete: bool,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

/// 创建/编辑音乐会的表单载荷
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConcertInput {
    pub name: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setlist: Option<String>,
    pub status: ConcertStatus,
}

// =========================================================
// 列表过滤 (List Filter)
// =========================================================

/// 列表端点的查询条件；`page` 从 1 开始
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcertFilter {
    pub search: Option<String>,
    pub status: Option<ConcertStatus>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for ConcertFilter {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            date_from: None,
            date_to: None,
            page: 1,
            page_size: 20,
        }
    }
}

impl ConcertFilter {
    /// 复制出下一页的查询条件（用于追加加载）
    pub fn next_page(&self) -> Self {
        let mut next = self.clone();
        next.page += 1;
        next
    }
}

// =========================================================
// 报名 (Registration)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationKind {
    Register,
    Unregister,
}

/// 报名端点返回的最新摘要；成功后以服务器值为准，覆盖本地乐观更新
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationSummary {
    pub is_registered: bool,
    pub participants_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: u64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub instrument: String,
}

/// `GET /concerts/permissions` 返回的权限名集合，按会话缓存
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcertPermissions {
    pub permissions: Vec<String>,
}

/// 表单校验错误的取词优先级（名称先于日期先于地点）
pub const CONCERT_ERROR_FIELDS: &[&str] = &["name", "date", "location", "description", "setlist"];
