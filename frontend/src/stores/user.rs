//! 用户状态 store：个人资料编辑与乐手名录
//!
//! 资料本体以认证会话里的快照为准（见 [`crate::auth::AuthStore`]），
//! 这里只管编辑/改密/上传的进行中状态与结果提示，以及乐手名录缓存。

use crate::api::ApiClient;
use crate::auth::{AuthStore, SessionEvents};
use crate::services::user as service;
use leptos::prelude::*;
use tutti_shared::{ChangePasswordRequest, UpdateProfileRequest, UserProfile};

#[derive(Debug, Clone, Default)]
pub struct UserState {
    pub musicians: Vec<UserProfile>,
    pub loading: bool,
    pub saving: bool,
    pub error: Option<String>,
    /// 最近一次写操作的成功提示，进入下一次操作前清除
    pub notice: Option<String>,
}

impl UserState {
    pub fn begin_load(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn apply_musicians(&mut self, musicians: Vec<UserProfile>) {
        self.musicians = musicians;
        self.loading = false;
    }

    pub fn begin_save(&mut self) {
        self.saving = true;
        self.error = None;
        self.notice = None;
    }

    pub fn apply_saved(&mut self, notice: &str) {
        self.saving = false;
        self.notice = Some(notice.to_string());
    }

    pub fn fail(&mut self, message: String) {
        self.loading = false;
        self.saving = false;
        self.error = Some(message);
    }

    pub fn clear_session_data(&mut self) {
        *self = UserState::default();
    }

    /// 名录按乐器分组的只读投影；组按乐器名排序，组内保持后端顺序
    pub fn musicians_by_instrument(&self) -> Vec<(String, Vec<UserProfile>)> {
        let mut groups: Vec<(String, Vec<UserProfile>)> = Vec::new();
        for musician in &self.musicians {
            let instrument = musician.musician_profile.instrument.clone();
            match groups.iter_mut().find(|(name, _)| *name == instrument) {
                Some((_, members)) => members.push(musician.clone()),
                None => groups.push((instrument, vec![musician.clone()])),
            }
        }
        groups.sort_by(|(a, _), (b, _)| a.cmp(b));
        groups
    }
}

#[derive(Clone, Copy)]
pub struct UserStore {
    pub state: ReadSignal<UserState>,
    set_state: WriteSignal<UserState>,
    api: StoredValue<ApiClient, LocalStorage>,
    auth: AuthStore,
}

impl UserStore {
    pub fn provide(api: ApiClient, auth: AuthStore, events: &SessionEvents) -> Self {
        let (state, set_state) = signal(UserState::default());
        events.subscribe(move || set_state.update(|s| s.clear_session_data()));

        let store = Self {
            state,
            set_state,
            api: StoredValue::new_local(api),
            auth,
        };
        provide_context(store);
        store
    }

    pub async fn load_musicians(self) {
        let api = self.api.get_value();
        self.set_state.update(|s| s.begin_load());
        match service::list_musicians(&api).await {
            Ok(musicians) => self.set_state.update(|s| s.apply_musicians(musicians)),
            Err(error) => self
                .set_state
                .update(|s| s.fail(error.user_message(&[], "加载乐手名录失败"))),
        }
    }

    pub async fn update_profile(self, request: UpdateProfileRequest) -> bool {
        let api = self.api.get_value();
        self.set_state.update(|s| s.begin_save());
        match service::update_profile(&api, request).await {
            Ok(profile) => {
                self.auth.apply_profile(profile);
                self.set_state.update(|s| s.apply_saved("资料已保存"));
                true
            }
            Err(error) => {
                let message = error.user_message(
                    &["email", "first_name", "last_name", "instrument", "birthday"],
                    "保存资料失败",
                );
                self.set_state.update(|s| s.fail(message));
                false
            }
        }
    }

    pub async fn change_password(self, old_password: String, new_password: String) -> bool {
        let api = self.api.get_value();
        self.set_state.update(|s| s.begin_save());
        let request = ChangePasswordRequest {
            old_password,
            new_password,
        };
        match service::change_password(&api, request).await {
            Ok(()) => {
                self.set_state.update(|s| s.apply_saved("密码已修改"));
                true
            }
            Err(error) => {
                let message =
                    error.user_message(&["old_password", "new_password"], "修改密码失败");
                self.set_state.update(|s| s.fail(message));
                false
            }
        }
    }

    pub async fn upload_photo(self, file: web_sys::File) -> bool {
        let api = self.api.get_value();
        self.set_state.update(|s| s.begin_save());
        match service::upload_photo(&api, file).await {
            Ok(profile) => {
                self.auth.apply_profile(profile);
                self.set_state.update(|s| s.apply_saved("头像已更新"));
                true
            }
            Err(error) => {
                self.set_state
                    .update(|s| s.fail(error.user_message(&["photo"], "上传头像失败")));
                false
            }
        }
    }
}

pub fn use_users() -> UserStore {
    use_context::<UserStore>().expect("UserStore should be provided")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_cycle_tracks_notice_and_error_exclusively() {
        let mut state = UserState::default();
        state.begin_save();
        assert!(state.saving);

        state.apply_saved("资料已保存");
        assert!(!state.saving);
        assert_eq!(state.notice.as_deref(), Some("资料已保存"));
        assert!(state.error.is_none());

        state.begin_save();
        assert!(state.notice.is_none());
        state.fail("邮箱格式不正确".to_string());
        assert_eq!(state.error.as_deref(), Some("邮箱格式不正确"));
        assert!(state.notice.is_none());
    }

    #[test]
    fn roster_groups_by_instrument_sorted() {
        let member = |id: u64, username: &str, instrument: &str| UserProfile {
            id,
            username: username.to_string(),
            email: format!("{username}@example.test"),
            first_name: String::new(),
            last_name: String::new(),
            date_joined: "2024-01-01".to_string(),
            musician_profile: tutti_shared::MusicianProfile {
                instrument: instrument.to_string(),
                birthday: None,
                photo: None,
                active: true,
            },
        };

        let mut state = UserState::default();
        state.apply_musicians(vec![
            member(1, "anna", "小提琴"),
            member(2, "boris", "大提琴"),
            member(3, "chen", "小提琴"),
        ]);

        let groups = state.musicians_by_instrument();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "大提琴");
        assert_eq!(groups[1].0, "小提琴");
        // 组内保持后端顺序
        let ids: Vec<u64> = groups[1].1.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn session_end_drops_cached_directory() {
        let mut state = UserState::default();
        state.apply_musicians(vec![]);
        state.fail("x".to_string());
        state.clear_session_data();
        assert!(state.error.is_none());
        assert!(state.musicians.is_empty());
    }
}
