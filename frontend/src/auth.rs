//! 认证模块
//!
//! 会话状态机：`Unknown -> {Authenticated, Unauthenticated}`。
//! 纯转移函数定义在 [`AuthState`] 上，异步动作定义在 [`AuthStore`]
//! 上下文上。登出通过 [`SessionEvents`] 显式广播，各领域 store
//! 自行订阅并清空按会话缓存的数据，避免跨 store 的隐式耦合。

use crate::api::{ApiClient, ApiError};
use crate::services::user as user_service;
use leptos::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use tutti_shared::{CODE_ACCOUNT_PENDING, LoginRequest, RegisterRequest, UserProfile};

// =========================================================
// 会话结束事件 (Session Ended Event)
// =========================================================

/// 会话结束事件总线。
///
/// 认证层在登出（主动或刷新失败被迫）时广播；订阅方负责清空
/// 自己缓存的、与登录身份绑定的数据，防止跨会话泄漏。
#[derive(Clone, Default)]
pub struct SessionEvents {
    listeners: Rc<RefCell<Vec<Rc<dyn Fn()>>>>,
}

impl SessionEvents {
    pub fn subscribe(&self, listener: impl Fn() + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// 同步通知所有订阅方会话已结束
    pub fn session_ended(&self) {
        // 先复制再调用，允许监听器内再次借用总线
        let listeners: Vec<_> = self.listeners.borrow().clone();
        for listener in listeners {
            listener();
        }
    }
}

// =========================================================
// 认证状态 (Auth State)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthStatus {
    /// 尚未完成应用加载时的一次性认证检查
    #[default]
    Unknown,
    Authenticated,
    Unauthenticated,
}

/// 登录/注册失败的可区分类别
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// 账号已创建但尚未通过管理员审批
    PendingApproval,
    /// 用户名或密码错误
    InvalidCredentials,
    Other(String),
}

impl AuthError {
    pub fn user_message(&self) -> String {
        match self {
            AuthError::PendingApproval => "账号正在等待管理员审批，请稍后再试".to_string(),
            AuthError::InvalidCredentials => "用户名或密码错误".to_string(),
            AuthError::Other(message) => message.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub status: AuthStatus,
    pub user: Option<UserProfile>,
    /// 登录/注册请求进行中
    pub submitting: bool,
    pub error: Option<AuthError>,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.status == AuthStatus::Authenticated
    }

    // --- 纯转移函数：list/detail/error 一并更新，不留中间态 ---

    pub fn begin_submit(&mut self) {
        self.submitting = true;
        self.error = None;
    }

    pub fn apply_check_success(&mut self, user: UserProfile) {
        self.status = AuthStatus::Authenticated;
        self.user = Some(user);
        self.error = None;
    }

    pub fn apply_check_failure(&mut self) {
        self.status = AuthStatus::Unauthenticated;
        self.user = None;
    }

    pub fn apply_login_success(&mut self, user: UserProfile) {
        self.status = AuthStatus::Authenticated;
        self.user = Some(user);
        self.submitting = false;
        self.error = None;
    }

    pub fn apply_login_failure(&mut self, error: AuthError) {
        self.status = AuthStatus::Unauthenticated;
        self.user = None;
        self.submitting = false;
        self.error = Some(error);
    }

    pub fn apply_register_success(&mut self) {
        // 注册不授予会话：账号等待审批
        self.status = AuthStatus::Unauthenticated;
        self.submitting = false;
        self.error = None;
    }

    pub fn apply_register_failure(&mut self, error: AuthError) {
        self.submitting = false;
        self.error = Some(error);
    }

    pub fn apply_logged_out(&mut self) {
        *self = AuthState {
            status: AuthStatus::Unauthenticated,
            ..AuthState::default()
        };
    }
}

/// 将登录请求的 API 错误归类为可区分的认证失败。
/// 后端用 `code: account_pending` 显式标记待审批账号。
fn classify_login_error(error: &ApiError) -> AuthError {
    if error.code() == Some(CODE_ACCOUNT_PENDING) {
        return AuthError::PendingApproval;
    }
    match error.status() {
        Some(400) | Some(401) => AuthError::InvalidCredentials,
        _ => AuthError::Other(error.user_message(&[], "登录失败，请稍后再试")),
    }
}

// =========================================================
// 认证上下文 (Auth Store)
// =========================================================

#[derive(Clone, Copy)]
pub struct AuthStore {
    pub state: ReadSignal<AuthState>,
    set_state: WriteSignal<AuthState>,
    api: StoredValue<ApiClient, LocalStorage>,
    events: StoredValue<SessionEvents, LocalStorage>,
}

impl AuthStore {
    /// 创建并提供到 Context；同时向 API 客户端注册刷新失败时的
    /// 强制登出处理
    pub fn provide(api: ApiClient, events: SessionEvents) -> Self {
        let (state, set_state) = signal(AuthState::default());

        {
            let events = events.clone();
            api.set_session_expired_handler(move || {
                set_state.update(|s| s.apply_logged_out());
                events.session_ended();
            });
        }

        let store = Self {
            state,
            set_state,
            api: StoredValue::new_local(api),
            events: StoredValue::new_local(events),
        };
        provide_context(store);
        store
    }

    /// 认证状态信号（用于注入路由守卫）
    pub fn is_authenticated_signal(&self) -> Signal<bool> {
        let state = self.state;
        Signal::derive(move || state.get().is_authenticated())
    }

    /// 应用加载时的一次性认证检查：用持久化凭据拉取当前用户
    pub async fn check_auth(self) {
        let api = self.api.get_value();
        if !api.has_tokens() {
            self.set_state.update(|s| s.apply_check_failure());
            return;
        }
        match user_service::profile(&api).await {
            Ok(user) => self.set_state.update(|s| s.apply_check_success(user)),
            Err(_) => {
                api.clear_tokens();
                self.set_state.update(|s| s.apply_check_failure());
            }
        }
    }

    /// 登录：换发凭据对 -> 持久化 -> 拉取用户。
    /// 返回是否成功；失败类别写入状态供视图展示。
    pub async fn login(self, username: String, password: String) -> bool {
        let api = self.api.get_value();
        self.set_state.update(|s| s.begin_submit());

        let request = LoginRequest { username, password };
        let tokens = match api.dispatch(&request).await {
            Ok(tokens) => tokens,
            Err(error) => {
                let classified = classify_login_error(&error);
                self.set_state.update(|s| s.apply_login_failure(classified));
                return false;
            }
        };
        api.store_tokens(tokens);

        match user_service::profile(&api).await {
            Ok(user) => {
                self.set_state.update(|s| s.apply_login_success(user));
                true
            }
            Err(error) => {
                api.clear_tokens();
                let message = error.user_message(&[], "获取用户信息失败");
                self.set_state
                    .update(|s| s.apply_login_failure(AuthError::Other(message)));
                false
            }
        }
    }

    /// 注册新账号；成功也不进入已认证状态（需管理员审批）
    pub async fn register(self, request: RegisterRequest) -> bool {
        let api = self.api.get_value();
        self.set_state.update(|s| s.begin_submit());

        match api.dispatch(&request).await {
            Ok(_) => {
                self.set_state.update(|s| s.apply_register_success());
                true
            }
            Err(error) => {
                let message = error.user_message(
                    &["username", "email", "password", "instrument"],
                    "注册失败，请稍后再试",
                );
                self.set_state
                    .update(|s| s.apply_register_failure(AuthError::Other(message)));
                false
            }
        }
    }

    /// 资料编辑成功后同步会话中的用户快照（导航栏等处引用）
    pub fn apply_profile(self, user: UserProfile) {
        self.set_state.update(|s| {
            if s.is_authenticated() {
                s.user = Some(user);
            }
        });
    }

    /// 登出：清除凭据并广播会话结束，各 store 清空身份绑定缓存
    pub fn logout(self) {
        self.api.get_value().clear_tokens();
        self.set_state.update(|s| s.apply_logged_out());
        self.events.get_value().session_ended();
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthStore {
    use_context::<AuthStore>().expect("AuthStore should be provided")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    #[test]
    fn initial_status_is_unknown() {
        assert_eq!(AuthState::default().status, AuthStatus::Unknown);
    }

    #[test]
    fn check_transitions_cover_both_outcomes() {
        let user: UserProfile = serde_json::from_value(json!({
            "id": 1, "username": "anna", "email": "a@b.c",
            "first_name": "", "last_name": "", "date_joined": "2024-01-01",
            "musician_profile": {"instrument": "小提琴", "birthday": null, "photo": null, "active": true}
        }))
        .unwrap();

        let mut state = AuthState::default();
        state.apply_check_success(user.clone());
        assert!(state.is_authenticated());
        assert_eq!(state.user.as_ref().map(|u| u.id), Some(1));

        let mut state = AuthState::default();
        state.apply_check_failure();
        assert_eq!(state.status, AuthStatus::Unauthenticated);
        assert!(state.user.is_none());
    }

    #[test]
    fn login_failure_resets_session_but_keeps_error() {
        let mut state = AuthState::default();
        state.begin_submit();
        assert!(state.submitting);

        state.apply_login_failure(AuthError::InvalidCredentials);
        assert_eq!(state.status, AuthStatus::Unauthenticated);
        assert!(!state.submitting);
        assert_eq!(state.error, Some(AuthError::InvalidCredentials));
    }

    #[test]
    fn register_success_does_not_authenticate() {
        let mut state = AuthState::default();
        state.begin_submit();
        state.apply_register_success();
        assert_eq!(state.status, AuthStatus::Unauthenticated);
        assert!(state.error.is_none());
    }

    #[test]
    fn logout_clears_everything() {
        let mut state = AuthState::default();
        state.apply_login_failure(AuthError::InvalidCredentials);
        state.apply_logged_out();
        assert_eq!(state.status, AuthStatus::Unauthenticated);
        assert!(state.error.is_none());
        assert!(state.user.is_none());
    }

    #[test]
    fn pending_approval_is_distinguished_from_bad_credentials() {
        let pending = ApiError::Api {
            status: 401,
            body: json!({"code": "account_pending", "detail": "账号待审批"}),
        };
        assert_eq!(classify_login_error(&pending), AuthError::PendingApproval);

        let invalid = ApiError::Api {
            status: 401,
            body: json!({"detail": "无效的用户名或密码"}),
        };
        assert_eq!(classify_login_error(&invalid), AuthError::InvalidCredentials);

        let outage = ApiError::Network("connection refused".to_string());
        assert!(matches!(classify_login_error(&outage), AuthError::Other(_)));
    }

    #[test]
    fn session_ended_reaches_every_listener() {
        let events = SessionEvents::default();
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));

        let counter = first.clone();
        events.subscribe(move || counter.set(counter.get() + 1));
        let counter = second.clone();
        events.subscribe(move || counter.set(counter.get() + 1));

        events.session_ended();
        events.session_ended();
        assert_eq!(first.get(), 2);
        assert_eq!(second.get(), 2);
    }
}
