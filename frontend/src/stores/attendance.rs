//! 乐季与考勤状态 store
//!
//! 三级联动：乐季 -> 活动 -> 考勤记录。下级数据总是从属于当前
//! 选中的上级，切换上级立即清空下级，晚到的响应按所属 id 丢弃。
//! 考勤标记不做乐观更新（权限/合法性由后端最终裁决），只做
//! (活动, 用户) 粒度的去抖。

use crate::api::ApiClient;
use crate::auth::SessionEvents;
use crate::services::attendance as service;
use leptos::prelude::*;
use std::collections::HashSet;
use tutti_shared::attendance::{
    AttendanceRecord, EventInput, OrchestraEvent, Presence, Season, SeasonInput,
};

#[derive(Debug, Clone, Default)]
pub struct AttendanceState {
    pub seasons: Vec<Season>,
    pub selected_season: Option<u64>,
    pub events: Vec<OrchestraEvent>,
    pub selected_event: Option<u64>,
    pub records: Vec<AttendanceRecord>,
    /// 进行中的标记请求，键为 (活动, 用户)
    marking: HashSet<(u64, u64)>,
    pub loading: bool,
    pub saving: bool,
    pub error: Option<String>,
}

impl AttendanceState {
    pub fn selected_event_record(&self) -> Option<&OrchestraEvent> {
        let id = self.selected_event?;
        self.events.iter().find(|e| e.id == id)
    }

    /// 某用户在当前活动上的出勤值
    pub fn value_for(&self, event: u64, user: u64) -> Option<Presence> {
        self.records
            .iter()
            .find(|r| r.event == event && r.user == user)
            .map(|r| r.value)
    }

    pub fn mark_pending(&self, event: u64, user: u64) -> bool {
        self.marking.contains(&(event, user))
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn fail(&mut self, message: String) {
        self.loading = false;
        self.saving = false;
        self.error = Some(message);
    }

    /// 乐季列表落地；默认选中当前乐季，没有则选第一个
    pub fn apply_seasons(&mut self, seasons: Vec<Season>) {
        let preferred = seasons
            .iter()
            .find(|s| s.is_current)
            .or(seasons.first())
            .map(|s| s.id);
        self.seasons = seasons;
        self.loading = false;
        if self.selected_season.is_none()
            || !self.seasons.iter().any(|s| Some(s.id) == self.selected_season)
        {
            self.select_season(preferred);
        }
    }

    pub fn select_season(&mut self, season: Option<u64>) {
        self.selected_season = season;
        self.events.clear();
        self.selected_event = None;
        self.records.clear();
    }

    /// 活动列表落地；用户已切换乐季时丢弃
    pub fn apply_events(&mut self, season: u64, events: Vec<OrchestraEvent>) {
        if self.selected_season == Some(season) {
            self.events = events;
            self.loading = false;
        }
    }

    pub fn select_event(&mut self, event: Option<u64>) {
        self.selected_event = event;
        self.records.clear();
    }

    pub fn apply_records(&mut self, event: u64, records: Vec<AttendanceRecord>) {
        if self.selected_event == Some(event) {
            self.records = records;
            self.loading = false;
        }
    }

    pub fn apply_season_created(&mut self, season: Season) {
        if season.is_current {
            for existing in &mut self.seasons {
                existing.is_current = false;
            }
        }
        self.seasons.push(season);
        self.saving = false;
    }

    pub fn apply_event_created(&mut self, event: OrchestraEvent) {
        if self.selected_season == Some(event.season) {
            self.events.push(event);
        }
        self.saving = false;
    }

    /// 标记开始。值对活动类型不合法、或同一 (活动, 用户) 已有
    /// 请求在途时返回 `false`，调用方不应发出请求。
    pub fn begin_mark(&mut self, event: u64, user: u64, value: Presence) -> bool {
        let Some(target) = self.events.iter().find(|e| e.id == event) else {
            return false;
        };
        if !value.allowed_for(target.event_type) {
            self.error = Some(format!(
                "{}不适用于{}",
                value.label(),
                target.event_type.label()
            ));
            return false;
        }
        if !self.marking.insert((event, user)) {
            return false;
        }
        self.error = None;
        true
    }

    /// 标记确认：按 (活动, 用户) 覆盖或新增记录
    pub fn apply_mark_success(&mut self, record: AttendanceRecord) {
        self.marking.remove(&(record.event, record.user));
        if let Some(existing) = self
            .records
            .iter_mut()
            .find(|r| r.event == record.event && r.user == record.user)
        {
            *existing = record;
        } else if self.selected_event == Some(record.event) {
            self.records.push(record);
        }
    }

    pub fn apply_mark_failure(&mut self, event: u64, user: u64, message: String) {
        self.marking.remove(&(event, user));
        self.error = Some(message);
    }

    pub fn clear_session_data(&mut self) {
        *self = AttendanceState::default();
    }
}

#[derive(Clone, Copy)]
pub struct AttendanceStore {
    pub state: ReadSignal<AttendanceState>,
    set_state: WriteSignal<AttendanceState>,
    api: StoredValue<ApiClient, LocalStorage>,
}

impl AttendanceStore {
    pub fn provide(api: ApiClient, events: &SessionEvents) -> Self {
        let (state, set_state) = signal(AttendanceState::default());
        events.subscribe(move || set_state.update(|s| s.clear_session_data()));

        let store = Self {
            state,
            set_state,
            api: StoredValue::new_local(api),
        };
        provide_context(store);
        store
    }

    /// 进入考勤页：拉乐季，随后自动加载选中乐季的活动
    pub async fn load_seasons(self) {
        let api = self.api.get_value();
        self.set_state.update(|s| s.begin_load());
        match service::list_seasons(&api).await {
            Ok(seasons) => {
                self.set_state.update(|s| s.apply_seasons(seasons));
                if let Some(season) = self.state.get_untracked().selected_season {
                    self.load_events(season).await;
                }
            }
            Err(error) => self
                .set_state
                .update(|s| s.fail(error.user_message(&[], "加载乐季失败"))),
        }
    }

    pub async fn select_season(self, season: u64) {
        self.set_state.update(|s| s.select_season(Some(season)));
        self.load_events(season).await;
    }

    async fn load_events(self, season: u64) {
        let api = self.api.get_value();
        self.set_state.update(|s| s.begin_load());
        match service::list_events(&api, season).await {
            Ok(events) => self.set_state.update(|s| s.apply_events(season, events)),
            Err(error) => self
                .set_state
                .update(|s| s.fail(error.user_message(&[], "加载活动列表失败"))),
        }
    }

    pub async fn select_event(self, event: u64) {
        self.set_state.update(|s| s.select_event(Some(event)));
        let api = self.api.get_value();
        self.set_state.update(|s| s.begin_load());
        match service::list_attendance(&api, event).await {
            Ok(records) => self.set_state.update(|s| s.apply_records(event, records)),
            Err(error) => self
                .set_state
                .update(|s| s.fail(error.user_message(&[], "加载考勤记录失败"))),
        }
    }

    pub async fn create_season(self, input: SeasonInput) -> bool {
        let api = self.api.get_value();
        self.set_state.update(|s| s.saving = true);
        match service::create_season(&api, input).await {
            Ok(season) => {
                self.set_state.update(|s| s.apply_season_created(season));
                true
            }
            Err(error) => {
                self.set_state
                    .update(|s| s.fail(error.user_message(&["name"], "创建乐季失败")));
                false
            }
        }
    }

    pub async fn create_event(self, input: EventInput) -> bool {
        let api = self.api.get_value();
        self.set_state.update(|s| s.saving = true);
        match service::create_event(&api, input).await {
            Ok(event) => {
                self.set_state.update(|s| s.apply_event_created(event));
                true
            }
            Err(error) => {
                self.set_state
                    .update(|s| s.fail(error.user_message(&["name", "date"], "创建活动失败")));
                false
            }
        }
    }

    /// 为某乐手标记出勤；非法值或在途请求直接忽略
    pub async fn mark(self, event: u64, user: u64, value: Presence) {
        let mut proceed = false;
        self.set_state
            .update(|s| proceed = s.begin_mark(event, user, value));
        if !proceed {
            return;
        }

        let api = self.api.get_value();
        match service::mark_attendance(&api, event, user, value).await {
            Ok(record) => self.set_state.update(|s| s.apply_mark_success(record)),
            Err(error) => {
                let message = error.user_message(&["value"], "标记出勤失败");
                self.set_state
                    .update(|s| s.apply_mark_failure(event, user, message));
            }
        }
    }
}

pub fn use_attendance() -> AttendanceStore {
    use_context::<AttendanceStore>().expect("AttendanceStore should be provided")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutti_shared::attendance::EventType;

    fn season(id: u64, current: bool) -> Season {
        Season {
            id,
            name: format!("乐季 {id}"),
            is_current: current,
        }
    }

    fn event(id: u64, season: u64, event_type: EventType) -> OrchestraEvent {
        OrchestraEvent {
            id,
            season,
            name: "周四排练".to_string(),
            date: "2025-05-08".to_string(),
            event_type,
        }
    }

    fn record(event: u64, user: u64, value: Presence) -> AttendanceRecord {
        AttendanceRecord {
            id: event * 100 + user,
            event,
            user,
            value,
        }
    }

    #[test]
    fn current_season_is_preselected() {
        let mut state = AttendanceState::default();
        state.apply_seasons(vec![season(1, false), season(2, true), season(3, false)]);
        assert_eq!(state.selected_season, Some(2));

        // 没有当前乐季时退而选第一个
        let mut state = AttendanceState::default();
        state.apply_seasons(vec![season(5, false), season(6, false)]);
        assert_eq!(state.selected_season, Some(5));
    }

    #[test]
    fn switching_season_clears_dependent_data() {
        let mut state = AttendanceState::default();
        state.apply_seasons(vec![season(1, true), season(2, false)]);
        state.apply_events(1, vec![event(10, 1, EventType::Rehearsal)]);
        state.select_event(Some(10));
        state.apply_records(10, vec![record(10, 7, Presence::Present)]);

        state.select_season(Some(2));
        assert!(state.events.is_empty());
        assert!(state.selected_event.is_none());
        assert!(state.records.is_empty());
    }

    #[test]
    fn stale_event_list_is_dropped() {
        let mut state = AttendanceState::default();
        state.apply_seasons(vec![season(1, true), season(2, false)]);
        state.select_season(Some(2));
        // 乐季 1 的慢响应此刻才到
        state.apply_events(1, vec![event(10, 1, EventType::Rehearsal)]);
        assert!(state.events.is_empty());
    }

    #[test]
    fn half_presence_rejected_outside_rehearsal() {
        let mut state = AttendanceState::default();
        state.apply_seasons(vec![season(1, true)]);
        state.apply_events(
            1,
            vec![event(10, 1, EventType::Concert), event(11, 1, EventType::Rehearsal)],
        );

        assert!(!state.begin_mark(10, 7, Presence::Half));
        assert!(state.error.is_some());

        assert!(state.begin_mark(11, 7, Presence::Half));
    }

    #[test]
    fn duplicate_mark_requests_are_debounced() {
        let mut state = AttendanceState::default();
        state.apply_seasons(vec![season(1, true)]);
        state.apply_events(1, vec![event(10, 1, EventType::Rehearsal)]);

        assert!(state.begin_mark(10, 7, Presence::Present));
        assert!(!state.begin_mark(10, 7, Presence::Absent));
        // 不同乐手不受影响
        assert!(state.begin_mark(10, 8, Presence::Present));

        state.apply_mark_success(record(10, 7, Presence::Present));
        assert!(!state.mark_pending(10, 7));
    }

    #[test]
    fn mark_success_upserts_by_event_and_user() {
        let mut state = AttendanceState::default();
        state.apply_seasons(vec![season(1, true)]);
        state.apply_events(1, vec![event(10, 1, EventType::Rehearsal)]);
        state.select_event(Some(10));
        state.apply_records(10, vec![record(10, 7, Presence::Absent)]);

        state.begin_mark(10, 7, Presence::Half);
        state.apply_mark_success(record(10, 7, Presence::Half));
        assert_eq!(state.value_for(10, 7), Some(Presence::Half));
        assert_eq!(state.records.len(), 1);

        state.begin_mark(10, 8, Presence::Present);
        state.apply_mark_success(record(10, 8, Presence::Present));
        assert_eq!(state.records.len(), 2);
    }

    #[test]
    fn new_current_season_demotes_the_previous_one() {
        let mut state = AttendanceState::default();
        state.apply_seasons(vec![season(1, true)]);
        state.apply_season_created(Season {
            id: 2,
            name: "2025-2026".to_string(),
            is_current: true,
        });
        assert!(!state.seasons[0].is_current);
        assert!(state.seasons[1].is_current);
    }
}
