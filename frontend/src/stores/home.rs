//! 首页聚合状态 store
//!
//! 三个只读端点并行无依赖，这里按到达顺序分别落地；
//! 任何一块失败不影响其余两块的展示。

use crate::api::ApiClient;
use crate::auth::SessionEvents;
use crate::services::home as service;
use leptos::prelude::*;
use tutti_shared::home::{ActivityEntry, HomeStats, UpcomingEvent};

#[derive(Debug, Clone, Default)]
pub struct HomeState {
    pub stats: Option<HomeStats>,
    pub upcoming: Vec<UpcomingEvent>,
    pub activity: Vec<ActivityEntry>,
    pub loading: bool,
    pub error: Option<String>,
}

impl HomeState {
    pub fn begin_load(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn apply_stats(&mut self, stats: HomeStats) {
        self.stats = Some(stats);
        self.loading = false;
    }

    pub fn apply_upcoming(&mut self, events: Vec<UpcomingEvent>) {
        self.upcoming = events;
    }

    pub fn apply_activity(&mut self, entries: Vec<ActivityEntry>) {
        self.activity = entries;
    }

    pub fn fail(&mut self, message: String) {
        self.loading = false;
        self.error = Some(message);
    }

    pub fn clear_session_data(&mut self) {
        *self = HomeState::default();
    }
}

#[derive(Clone, Copy)]
pub struct HomeStore {
    pub state: ReadSignal<HomeState>,
    set_state: WriteSignal<HomeState>,
    api: StoredValue<ApiClient, LocalStorage>,
}

impl HomeStore {
    pub fn provide(api: ApiClient, events: &SessionEvents) -> Self {
        let (state, set_state) = signal(HomeState::default());
        events.subscribe(move || set_state.update(|s| s.clear_session_data()));

        let store = Self {
            state,
            set_state,
            api: StoredValue::new_local(api),
        };
        provide_context(store);
        store
    }

    /// 依次拉取三个聚合块；统计失败时给出整页错误，
    /// 列表块失败只留空。
    pub async fn load(self) {
        let api = self.api.get_value();
        self.set_state.update(|s| s.begin_load());

        match service::stats(&api).await {
            Ok(stats) => self.set_state.update(|s| s.apply_stats(stats)),
            Err(error) => {
                self.set_state
                    .update(|s| s.fail(error.user_message(&[], "加载首页数据失败")));
            }
        }

        if let Ok(events) = service::upcoming_events(&api).await {
            self.set_state.update(|s| s.apply_upcoming(events));
        }
        if let Ok(entries) = service::recent_activity(&api).await {
            self.set_state.update(|s| s.apply_activity(entries));
        }
    }
}

pub fn use_home() -> HomeStore {
    use_context::<HomeStore>().expect("HomeStore should be provided")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_failures_keep_successful_blocks() {
        let mut state = HomeState::default();
        state.begin_load();
        state.apply_stats(HomeStats {
            active_members: 42,
            upcoming_concerts: 2,
            rehearsals_this_month: 4,
            average_attendance: 0.9,
        });
        // 后续块失败不清空已落地的统计
        assert!(state.stats.is_some());
        assert!(!state.loading);
        assert!(state.upcoming.is_empty());
    }
}
