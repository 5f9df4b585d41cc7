//! Tutti 乐团管理前端
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route` / `web::router`: 路由定义与路由服务（含认证守卫）
//! - `api`: 统一请求分发（Bearer 附加 + 401 刷新重放）
//! - `auth`: 认证状态管理与会话结束广播
//! - `services`: 无状态的资源端点封装
//! - `stores`: 各领域的响应式状态
//! - `components`: UI 组件层

mod api;
mod auth;
mod permissions;

mod services {
    pub mod attendance;
    pub mod concert;
    pub mod home;
    pub mod user;
}

mod stores {
    pub mod attendance;
    pub mod concert;
    pub mod home;
    pub mod user;
}

mod components {
    pub mod attendance;
    pub mod concert_detail;
    pub mod concerts;
    pub mod dashboard;
    pub mod guard;
    mod icons;
    pub mod login;
    pub mod musicians;
    pub mod profile;
    pub mod register;
    mod shell;
}

// 原生 Web API 封装模块
// 此模块提供对浏览器原生 API 的轻量级封装，替代 gloo-* 系列 crate，
// 以减小 WASM 二进制体积。
pub(crate) mod web {
    pub mod http;
    pub mod route;
    pub mod router;
    pub mod storage;
}

use crate::api::{ApiClient, BrowserTokenStore, FetchTransport};
use crate::auth::{AuthStore, SessionEvents};
use crate::components::attendance::AttendancePage;
use crate::components::concert_detail::ConcertDetailPage;
use crate::components::concerts::ConcertsPage;
use crate::components::dashboard::DashboardPage;
use crate::components::login::LoginPage;
use crate::components::musicians::MusiciansPage;
use crate::components::profile::ProfilePage;
use crate::components::register::RegisterPage;
use crate::stores::attendance::AttendanceStore;
use crate::stores::concert::ConcertStore;
use crate::stores::home::HomeStore;
use crate::stores::user::UserStore;

use leptos::prelude::*;
use leptos::task::spawn_local;
use std::rc::Rc;

use web::route::AppRoute;
use web::router::{Router, RouterOutlet};

/// 同源反向代理下的后端前缀
const API_BASE_URL: &str = "/api";

/// 路由匹配函数
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Register => view! { <RegisterPage /> }.into_any(),
        AppRoute::Dashboard => view! { <DashboardPage /> }.into_any(),
        AppRoute::Concerts => view! { <ConcertsPage /> }.into_any(),
        AppRoute::ConcertDetail(id) => view! { <ConcertDetailPage id=id /> }.into_any(),
        AppRoute::Musicians => view! { <MusiciansPage /> }.into_any(),
        AppRoute::Attendance => view! { <AttendancePage /> }.into_any(),
        AppRoute::Profile => view! { <ProfilePage /> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"页面未找到"</p>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 组装 API 客户端与会话结束总线
    let events = SessionEvents::default();
    let api = ApiClient::new(
        API_BASE_URL,
        Rc::new(FetchTransport),
        Rc::new(BrowserTokenStore),
    );

    // 2. 创建并提供各上下文；领域 store 订阅会话结束事件
    let auth = AuthStore::provide(api.clone(), events.clone());
    ConcertStore::provide(api.clone(), &events);
    UserStore::provide(api.clone(), auth, &events);
    HomeStore::provide(api.clone(), &events);
    AttendanceStore::provide(api, &events);

    // 3. 应用加载时的一次性认证检查
    spawn_local(async move { auth.check_auth().await });

    // 4. 认证状态信号注入路由守卫
    let is_authenticated = auth.is_authenticated_signal();
    let checked = move || auth.state.get().status != crate::auth::AuthStatus::Unknown;

    view! {
        // 认证检查完成前不渲染路由，避免登录页一闪而过
        <Show
            when=checked
            fallback=|| view! {
                <div class="flex items-center justify-center min-h-screen bg-base-200">
                    <span class="loading loading-spinner loading-lg text-primary"></span>
                </div>
            }
        >
            <Router is_authenticated=is_authenticated>
                <RouterOutlet matcher=route_matcher />
            </Router>
        </Show>
    }
}
