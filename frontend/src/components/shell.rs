//! 已登录页面的外壳：顶部导航栏 + 内容区

use crate::auth::use_auth;
use crate::components::icons::{LogOut, Music};
use crate::web::route::AppRoute;
use crate::web::router::use_router;
use leptos::prelude::*;

fn nav_link(
    label: &'static str,
    target: AppRoute,
    current: ReadSignal<AppRoute>,
) -> impl IntoView {
    let router = use_router();
    let is_active = move || current.get() == target;
    view! {
        <li>
            <a
                class=move || if is_active() { "active" } else { "" }
                on:click=move |_| router.navigate(target)
            >
                {label}
            </a>
        </li>
    }
}

#[component]
pub fn AppShell(children: Children) -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let current = router.current_route();

    let display_name = move || {
        auth.state
            .get()
            .user
            .map(|u| u.display_name())
            .unwrap_or_default()
    };

    view! {
        <div class="min-h-screen bg-base-200">
            <div class="navbar bg-base-100 shadow-md px-4">
                <div class="flex-1 gap-2">
                    <Music attr:class="h-6 w-6 text-primary" />
                    <a class="btn btn-ghost text-xl" on:click=move |_| router.navigate(AppRoute::Dashboard)>
                        "Tutti 乐团管理"
                    </a>
                    <ul class="menu menu-horizontal px-1 hidden md:flex">
                        {nav_link("首页", AppRoute::Dashboard, current)}
                        {nav_link("音乐会", AppRoute::Concerts, current)}
                        {nav_link("乐手", AppRoute::Musicians, current)}
                        {nav_link("考勤", AppRoute::Attendance, current)}
                    </ul>
                </div>
                <div class="flex-none gap-2">
                    <button class="btn btn-ghost" on:click=move |_| router.navigate(AppRoute::Profile)>
                        {display_name}
                    </button>
                    <button class="btn btn-outline btn-error btn-sm gap-2" on:click=move |_| auth.logout()>
                        <LogOut attr:class="h-4 w-4" /> "退出"
                    </button>
                </div>
            </div>
            <div class="max-w-7xl mx-auto p-4 md:p-8">{children()}</div>
        </div>
    }
}
