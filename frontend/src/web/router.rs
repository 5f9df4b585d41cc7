//! 路由服务模块 - 核心引擎
//!
//! 封装 History API：所有对 window.history 的操作集中在此。
//! 守卫裁决由 `route::resolve` 纯函数给出，认证状态以信号注入，
//! 与认证系统解耦。

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::route::{AppRoute, NavDecision, resolve};

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

fn push_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

fn replace_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 路由器服务
#[derive(Clone, Copy)]
pub struct RouterService {
    current_route: ReadSignal<AppRoute>,
    set_route: WriteSignal<AppRoute>,
    /// 认证状态（注入信号，实现解耦）
    is_authenticated: Signal<bool>,
}

impl RouterService {
    fn new(is_authenticated: Signal<bool>) -> Self {
        let initial_route = AppRoute::from_path(&current_path());
        let (current_route, set_route) = signal(initial_route);
        Self {
            current_route,
            set_route,
            is_authenticated,
        }
    }

    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// 导航入口：请求 -> 裁决 -> 写入 History -> 更新状态
    pub fn navigate(&self, target: AppRoute) {
        self.apply(target, true);
    }

    fn apply(&self, target: AppRoute, use_push: bool) {
        let is_auth = self.is_authenticated.get_untracked();
        let destination = match resolve(&target, is_auth) {
            NavDecision::Allow => target,
            NavDecision::Redirect(to) => {
                web_sys::console::log_1(
                    &format!("[Router] {} 被守卫拦截，重定向到 {}", target, to).into(),
                );
                to
            }
        };

        let path = destination.to_path();
        if use_push {
            push_history_state(&path);
        } else {
            replace_history_state(&path);
        }
        self.set_route.set(destination);
    }

    /// 浏览器后退/前进按钮：popstate 时同样执行守卫
    fn init_popstate_listener(&self) {
        let service = *self;
        let closure = Closure::<dyn Fn()>::new(move || {
            let target = AppRoute::from_path(&current_path());
            service.apply(target, false);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 认证状态变化时重新裁决当前路由：
    /// 登出时被踢回登录页，登录后自动离开登录页。
    fn setup_auth_redirect(&self) {
        let service = *self;
        Effect::new(move |_| {
            let is_auth = service.is_authenticated.get();
            let route = service.current_route.get_untracked();
            if let NavDecision::Redirect(to) = resolve(&route, is_auth) {
                web_sys::console::log_1(
                    &format!("[Router] 认证状态变化，重定向到 {}", to).into(),
                );
                push_history_state(&to.to_path());
                service.set_route.set(to);
            }
        });
    }
}

fn provide_router(is_authenticated: Signal<bool>) -> RouterService {
    let router = RouterService::new(is_authenticated);
    router.init_popstate_listener();
    router.setup_auth_redirect();
    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// =========================================================
// UI 组件
// =========================================================

/// 路由器根组件，应在 App 根部使用
#[component]
pub fn Router(
    /// 认证状态信号
    is_authenticated: Signal<bool>,
    /// 子组件
    children: Children,
) -> impl IntoView {
    provide_router(is_authenticated);
    children()
}

/// 路由出口组件：根据当前路由渲染对应视图
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();
    move || matcher(router.current_route().get())
}
