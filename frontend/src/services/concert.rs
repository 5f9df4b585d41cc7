//! 音乐会资源服务
//!
//! 无状态：每个函数把一个领域操作映射为一次 HTTP 调用并整形响应。
//! 不做输入校验（表单层负责），也不吞错误。

use crate::api::{ApiClient, ApiError};
use tutti_shared::concert::{ConcertPermissions, RegistrationKind, RegistrationSummary};
use tutti_shared::protocol::{
    DeleteConcertRequest, GetConcertPermissionsRequest, GetConcertRequest,
    ListParticipantsRequest, RegistrationRequest, UpdateConcertRequest,
};
use tutti_shared::{Concert, ConcertFilter, ConcertInput, Page, Participant};

/// 整形后的音乐会列表页；服务不做跨页聚合，是否追加由调用方决定
#[derive(Debug, Clone)]
pub struct ConcertPage {
    pub items: Vec<Concert>,
    pub total_count: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl From<Page<Concert>> for ConcertPage {
    fn from(page: Page<Concert>) -> Self {
        Self {
            total_count: page.count,
            has_next: page.has_next(),
            has_previous: page.has_previous(),
            items: page.results,
        }
    }
}

pub async fn list(api: &ApiClient, filter: &ConcertFilter) -> Result<ConcertPage, ApiError> {
    api.dispatch(filter).await.map(ConcertPage::from)
}

pub async fn get(api: &ApiClient, id: u64) -> Result<Concert, ApiError> {
    api.dispatch(&GetConcertRequest { id }).await
}

pub async fn create(api: &ApiClient, input: ConcertInput) -> Result<Concert, ApiError> {
    api.dispatch(&input).await
}

pub async fn update(api: &ApiClient, id: u64, input: ConcertInput) -> Result<Concert, ApiError> {
    api.dispatch(&UpdateConcertRequest { id, input }).await
}

pub async fn delete(api: &ApiClient, id: u64) -> Result<(), ApiError> {
    api.dispatch(&DeleteConcertRequest { id }).await
}

/// 报名或退出报名；返回服务器计算的最新摘要
pub async fn set_registration(
    api: &ApiClient,
    id: u64,
    action: RegistrationKind,
) -> Result<RegistrationSummary, ApiError> {
    api.dispatch(&RegistrationRequest { id, action }).await
}

pub async fn participants(api: &ApiClient, id: u64) -> Result<Vec<Participant>, ApiError> {
    api.dispatch(&ListParticipantsRequest { id }).await
}

/// 当前用户的音乐会权限名集合，按会话缓存于 store
pub async fn permissions(api: &ApiClient) -> Result<Vec<String>, ApiError> {
    let response: ConcertPermissions = api.dispatch(&GetConcertPermissionsRequest).await?;
    Ok(response.permissions)
}
