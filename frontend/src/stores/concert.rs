//! 音乐会状态 store
//!
//! 列表 + 详情 + 报名共用一份状态：报名摘要的变更要同时反映在
//! 两处。纯转移函数定义在 [`ConcertState`] 上，异步动作挂在
//! Copy 的 [`ConcertStore`] 上下文上。
//!
//! 报名是唯一做乐观更新的操作：本地先行翻转，失败回滚到快照，
//! 成功以服务器返回的摘要为准。其余写操作（增删改）都等响应落地。

use crate::api::{ApiClient, ApiError};
use crate::auth::SessionEvents;
use crate::services::concert as service;
use crate::services::concert::ConcertPage;
use leptos::prelude::*;
use std::collections::HashMap;
use tutti_shared::concert::{RegistrationKind, RegistrationSummary};
use tutti_shared::{CONCERT_ERROR_FIELDS, Concert, ConcertFilter, ConcertInput, Participant};

// =========================================================
// 纯状态 (Concert State)
// =========================================================

/// 乐观更新前的报名摘要快照，失败时回滚
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RegistrationSnapshot {
    is_registered: bool,
    participants_count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ConcertState {
    // --- 列表 ---
    pub items: Vec<Concert>,
    pub total_count: u64,
    pub has_next: bool,
    pub filter: ConcertFilter,
    // --- 详情 ---
    /// 正在查看的音乐会 id；晚到的详情响应与此不符则丢弃
    pub current_id: Option<u64>,
    pub current: Option<Concert>,
    pub participants: Vec<Participant>,
    // --- 权限 ---
    /// `None` 表示尚未拉取；登出后清空
    pub permissions: Option<Vec<String>>,
    // --- 进行中标记 ---
    pub loading: bool,
    pub saving: bool,
    /// 报名请求进行中的音乐会及其回滚快照
    registering: HashMap<u64, RegistrationSnapshot>,
    pub error: Option<String>,
}

impl ConcertState {
    pub fn registration_pending(&self, id: u64) -> bool {
        self.registering.contains_key(&id)
    }

    fn summary_of(&self, id: u64) -> Option<RegistrationSnapshot> {
        self.items
            .iter()
            .find(|c| c.id == id)
            .or(self.current.as_ref().filter(|c| c.id == id))
            .map(|c| RegistrationSnapshot {
                is_registered: c.is_registered,
                participants_count: c.participants_count,
            })
    }

    /// 把一份报名摘要写进列表项与详情（若 id 匹配）
    fn write_summary(&mut self, id: u64, is_registered: bool, participants_count: u32) {
        if let Some(item) = self.items.iter_mut().find(|c| c.id == id) {
            item.is_registered = is_registered;
            item.participants_count = participants_count;
        }
        if let Some(current) = self.current.as_mut().filter(|c| c.id == id) {
            current.is_registered = is_registered;
            current.participants_count = participants_count;
        }
    }

    // --- 列表转移 ---

    pub fn begin_load(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// 应用一页结果。`append` 为真时追加（滚动加载），按 id 去重，
    /// 防止翻页间隙有新建记录导致的重复。
    pub fn apply_page(&mut self, page: ConcertPage, filter: ConcertFilter, append: bool) {
        if append {
            for concert in page.items {
                if !self.items.iter().any(|c| c.id == concert.id) {
                    self.items.push(concert);
                }
            }
        } else {
            self.items = page.items;
        }
        self.total_count = page.total_count;
        self.has_next = page.has_next;
        self.filter = filter;
        self.loading = false;
    }

    pub fn fail(&mut self, message: String) {
        self.loading = false;
        self.saving = false;
        self.error = Some(message);
    }

    // --- 写操作转移 ---

    pub fn begin_save(&mut self) {
        self.saving = true;
        self.error = None;
    }

    /// 新建的音乐会立即可见：插到列表头部
    pub fn apply_created(&mut self, concert: Concert) {
        self.items.insert(0, concert);
        self.total_count += 1;
        self.saving = false;
    }

    pub fn apply_updated(&mut self, concert: Concert) {
        if let Some(item) = self.items.iter_mut().find(|c| c.id == concert.id) {
            *item = concert.clone();
        }
        if self.current_id == Some(concert.id) {
            self.current = Some(concert);
        }
        self.saving = false;
    }

    pub fn apply_deleted(&mut self, id: u64) {
        self.items.retain(|c| c.id != id);
        self.total_count = self.total_count.saturating_sub(1);
        if self.current_id == Some(id) {
            self.current_id = None;
            self.current = None;
            self.participants.clear();
        }
        self.saving = false;
    }

    // --- 详情转移 ---

    pub fn open_detail(&mut self, id: u64) {
        self.current_id = Some(id);
        // 列表里已有的记录先展示，详情响应到达后整体替换
        self.current = self.items.iter().find(|c| c.id == id).cloned();
        self.participants.clear();
        self.error = None;
    }

    /// 详情响应落地；用户已切走时丢弃
    pub fn apply_detail(&mut self, concert: Concert) {
        if self.current_id == Some(concert.id) {
            self.current = Some(concert);
        }
    }

    pub fn apply_participants(&mut self, id: u64, participants: Vec<Participant>) {
        if self.current_id == Some(id) {
            self.participants = participants;
        }
    }

    // --- 报名转移 ---

    /// 报名/退出的乐观开始。已有进行中的请求时返回 `None`（去抖），
    /// 否则记录回滚快照、本地先行翻转，并返回应发送的动作。
    pub fn begin_registration(&mut self, id: u64) -> Option<RegistrationKind> {
        if self.registering.contains_key(&id) {
            return None;
        }
        let snapshot = self.summary_of(id)?;
        let action = if snapshot.is_registered {
            RegistrationKind::Unregister
        } else {
            RegistrationKind::Register
        };
        let count = match action {
            RegistrationKind::Register => snapshot.participants_count + 1,
            RegistrationKind::Unregister => snapshot.participants_count.saturating_sub(1),
        };
        self.registering.insert(id, snapshot);
        self.write_summary(id, !snapshot.is_registered, count);
        self.error = None;
        Some(action)
    }

    /// 服务器确认：以返回的摘要为准（可能与乐观值不同）
    pub fn apply_registration_success(&mut self, id: u64, summary: RegistrationSummary) {
        self.registering.remove(&id);
        self.write_summary(id, summary.is_registered, summary.participants_count);
    }

    /// 失败回滚到快照
    pub fn apply_registration_failure(&mut self, id: u64, message: String) {
        if let Some(snapshot) = self.registering.remove(&id) {
            self.write_summary(id, snapshot.is_registered, snapshot.participants_count);
        }
        self.error = Some(message);
    }

    // --- 权限与会话 ---

    pub fn apply_permissions(&mut self, names: Vec<String>) {
        self.permissions = Some(names);
    }

    pub fn granted_permissions(&self) -> &[String] {
        self.permissions.as_deref().unwrap_or(&[])
    }

    /// 会话结束：全部数据与身份绑定，整体重置
    pub fn clear_session_data(&mut self) {
        *self = ConcertState::default();
    }
}

// =========================================================
// Store 上下文 (Concert Store)
// =========================================================

#[derive(Clone, Copy)]
pub struct ConcertStore {
    pub state: ReadSignal<ConcertState>,
    set_state: WriteSignal<ConcertState>,
    api: StoredValue<ApiClient, LocalStorage>,
}

impl ConcertStore {
    pub fn provide(api: ApiClient, events: &SessionEvents) -> Self {
        let (state, set_state) = signal(ConcertState::default());
        events.subscribe(move || set_state.update(|s| s.clear_session_data()));

        let store = Self {
            state,
            set_state,
            api: StoredValue::new_local(api),
        };
        provide_context(store);
        store
    }

    fn form_message(error: &ApiError) -> String {
        error.user_message(CONCERT_ERROR_FIELDS, "操作失败，请稍后再试")
    }

    /// 按给定条件重新加载第一页
    pub async fn load(self, filter: ConcertFilter) {
        let api = self.api.get_value();
        self.set_state.update(|s| s.begin_load());
        match service::list(&api, &filter).await {
            Ok(page) => self
                .set_state
                .update(|s| s.apply_page(page, filter, false)),
            Err(error) => self
                .set_state
                .update(|s| s.fail(error.user_message(&[], "加载音乐会列表失败"))),
        }
    }

    /// 追加下一页
    pub async fn load_more(self) {
        let snapshot = self.state.get_untracked();
        if snapshot.loading || !snapshot.has_next {
            return;
        }
        let filter = snapshot.filter.next_page();
        let api = self.api.get_value();
        self.set_state.update(|s| s.begin_load());
        match service::list(&api, &filter).await {
            Ok(page) => self.set_state.update(|s| s.apply_page(page, filter, true)),
            Err(error) => self
                .set_state
                .update(|s| s.fail(error.user_message(&[], "加载更多失败"))),
        }
    }

    pub async fn create(self, input: ConcertInput) -> bool {
        let api = self.api.get_value();
        self.set_state.update(|s| s.begin_save());
        match service::create(&api, input).await {
            Ok(concert) => {
                self.set_state.update(|s| s.apply_created(concert));
                true
            }
            Err(error) => {
                self.set_state.update(|s| s.fail(Self::form_message(&error)));
                false
            }
        }
    }

    pub async fn update(self, id: u64, input: ConcertInput) -> bool {
        let api = self.api.get_value();
        self.set_state.update(|s| s.begin_save());
        match service::update(&api, id, input).await {
            Ok(concert) => {
                self.set_state.update(|s| s.apply_updated(concert));
                true
            }
            Err(error) => {
                self.set_state.update(|s| s.fail(Self::form_message(&error)));
                false
            }
        }
    }

    pub async fn delete(self, id: u64) -> bool {
        let api = self.api.get_value();
        self.set_state.update(|s| s.begin_save());
        match service::delete(&api, id).await {
            Ok(()) => {
                self.set_state.update(|s| s.apply_deleted(id));
                true
            }
            Err(error) => {
                self.set_state
                    .update(|s| s.fail(error.user_message(&[], "删除失败")));
                false
            }
        }
    }

    /// 报名/退出切换；同一音乐会并发点击只发出第一次请求
    pub async fn toggle_registration(self, id: u64) {
        let mut action = None;
        self.set_state
            .update(|s| action = s.begin_registration(id));
        let Some(action) = action else {
            return;
        };

        let api = self.api.get_value();
        match service::set_registration(&api, id, action).await {
            Ok(summary) => self
                .set_state
                .update(|s| s.apply_registration_success(id, summary)),
            Err(error) => {
                let message = error.user_message(&[], "报名操作失败");
                self.set_state
                    .update(|s| s.apply_registration_failure(id, message));
            }
        }
    }

    /// 打开详情页：先展示列表缓存，再拉取完整记录与参与者
    pub async fn open_detail(self, id: u64) {
        self.set_state.update(|s| s.open_detail(id));
        let api = self.api.get_value();

        match service::get(&api, id).await {
            Ok(concert) => self.set_state.update(|s| s.apply_detail(concert)),
            Err(error) => self
                .set_state
                .update(|s| s.fail(error.user_message(&[], "加载音乐会详情失败"))),
        }

        match service::participants(&api, id).await {
            Ok(participants) => self
                .set_state
                .update(|s| s.apply_participants(id, participants)),
            Err(_) => {
                // 参与者列表缺失不致命，详情仍可用
            }
        }
    }

    /// 拉取权限名集合；已缓存则跳过
    pub async fn ensure_permissions(self) {
        if self.state.get_untracked().permissions.is_some() {
            return;
        }
        let api = self.api.get_value();
        if let Ok(names) = service::permissions(&api).await {
            self.set_state.update(|s| s.apply_permissions(names));
        }
    }
}

pub fn use_concerts() -> ConcertStore {
    use_context::<ConcertStore>().expect("ConcertStore should be provided")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutti_shared::ConcertStatus;

    fn concert(id: u64, name: &str, registered: bool, count: u32) -> Concert {
        Concert {
            id,
            name: name.to_string(),
            date: "2025-05-17".to_string(),
            location: None,
            description: None,
            setlist: None,
            status: ConcertStatus::Planned,
            participants_count: count,
            is_registered: registered,
            can_edit: false,
            can_delete: false,
            created_by: "anna".to_string(),
            created_at: "2025-01-01T10:00:00Z".to_string(),
            updated_at: "2025-01-01T10:00:00Z".to_string(),
        }
    }

    fn page(items: Vec<Concert>, total: u64, has_next: bool) -> ConcertPage {
        ConcertPage {
            items,
            total_count: total,
            has_next,
            has_previous: false,
        }
    }

    fn loaded_state() -> ConcertState {
        let mut state = ConcertState::default();
        state.apply_page(
            page(vec![concert(1, "春季音乐会", false, 8), concert(2, "夏夜露天场", true, 5)], 2, false),
            ConcertFilter::default(),
            false,
        );
        state
    }

    #[test]
    fn created_concert_appears_first_and_counts() {
        let mut state = loaded_state();
        state.apply_created(concert(3, "Spring Gala", false, 0));

        assert_eq!(state.items[0].name, "Spring Gala");
        assert_eq!(state.items.len(), 3);
        assert_eq!(state.total_count, 3);
    }

    #[test]
    fn delete_removes_item_and_decrements_count() {
        let mut state = loaded_state();
        state.apply_deleted(1);
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.total_count, 1);

        // 重复删除不会把计数减成负
        let mut empty = ConcertState::default();
        empty.apply_deleted(99);
        assert_eq!(empty.total_count, 0);
    }

    #[test]
    fn append_page_deduplicates_by_id() {
        let mut state = loaded_state();
        // 第二页带回一条与第一页重叠的记录
        state.apply_page(
            page(vec![concert(2, "夏夜露天场", true, 5), concert(3, "秋日室内乐", false, 0)], 3, false),
            ConcertFilter::default().next_page(),
            true,
        );

        let ids: Vec<u64> = state.items.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(state.filter.page, 2);
    }

    #[test]
    fn registration_is_optimistic_and_rolls_back_on_failure() {
        let mut state = loaded_state();

        let action = state.begin_registration(1);
        assert_eq!(action, Some(RegistrationKind::Register));
        assert!(state.items[0].is_registered);
        assert_eq!(state.items[0].participants_count, 9);

        state.apply_registration_failure(1, "网络错误".to_string());
        assert!(!state.items[0].is_registered);
        assert_eq!(state.items[0].participants_count, 8);
        assert_eq!(state.error.as_deref(), Some("网络错误"));
        assert!(!state.registration_pending(1));
    }

    #[test]
    fn concurrent_registration_clicks_send_one_request() {
        let mut state = loaded_state();

        assert!(state.begin_registration(1).is_some());
        // 请求未归来前的第二次点击被吞掉
        assert!(state.begin_registration(1).is_none());
        assert!(state.registration_pending(1));

        state.apply_registration_success(
            1,
            RegistrationSummary {
                is_registered: true,
                participants_count: 9,
            },
        );
        assert!(!state.registration_pending(1));
        // 确认后允许再次切换
        assert_eq!(state.begin_registration(1), Some(RegistrationKind::Unregister));
    }

    #[test]
    fn server_summary_overrides_optimistic_count() {
        let mut state = loaded_state();
        state.begin_registration(1);

        // 其他人同时报名，服务器人数比乐观值高
        state.apply_registration_success(
            1,
            RegistrationSummary {
                is_registered: true,
                participants_count: 11,
            },
        );
        assert_eq!(state.items[0].participants_count, 11);
    }

    #[test]
    fn registration_updates_detail_view_too() {
        let mut state = loaded_state();
        state.open_detail(1);
        assert_eq!(state.current.as_ref().map(|c| c.id), Some(1));

        state.begin_registration(1);
        assert!(state.current.as_ref().unwrap().is_registered);
        assert_eq!(state.current.as_ref().unwrap().participants_count, 9);
    }

    #[test]
    fn stale_detail_response_is_dropped() {
        let mut state = loaded_state();
        state.open_detail(1);
        // 用户已切到另一场，1 号的慢响应此刻才到
        state.open_detail(2);
        state.apply_detail(concert(1, "春季音乐会", false, 8));

        assert_eq!(state.current_id, Some(2));
        assert_eq!(state.current.as_ref().map(|c| c.id), Some(2));
    }

    #[test]
    fn update_refreshes_both_list_and_detail() {
        let mut state = loaded_state();
        state.open_detail(1);

        let mut edited = concert(1, "春季音乐会（改期）", false, 8);
        edited.date = "2025-06-01".to_string();
        state.apply_updated(edited);

        assert_eq!(state.items[0].name, "春季音乐会（改期）");
        assert_eq!(state.current.as_ref().unwrap().date, "2025-06-01");
    }

    #[test]
    fn session_end_clears_everything_including_permissions() {
        let mut state = loaded_state();
        state.apply_permissions(vec!["concerts.add".to_string()]);
        state.open_detail(1);

        state.clear_session_data();
        assert!(state.items.is_empty());
        assert!(state.permissions.is_none());
        assert!(state.current.is_none());
        assert_eq!(state.total_count, 0);
    }
}
