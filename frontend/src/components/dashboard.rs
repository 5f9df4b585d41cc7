use crate::components::icons::{Calendar, CheckCircle, Music, Users};
use crate::components::shell::AppShell;
use crate::stores::home::use_home;
use leptos::prelude::*;
use leptos::task::spawn_local;
use tutti_shared::date::format_display;
use tutti_shared::home::UpcomingEvent;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let home = use_home();

    // 进入页面时拉取聚合数据
    Effect::new(move |_| {
        spawn_local(async move { home.load().await });
    });

    let stats = move || home.state.get().stats;
    let percent =
        move || stats().map(|s| format!("{:.0}%", s.average_attendance * 100.0)).unwrap_or_default();

    view! {
        <AppShell>
            <div class="space-y-8">
                <Show when=move || home.state.get().error.is_some()>
                    <div role="alert" class="alert alert-error">
                        <span>{move || home.state.get().error.unwrap_or_default()}</span>
                    </div>
                </Show>

                <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                    <div class="stat">
                        <div class="stat-figure text-primary">
                            <Users attr:class="w-8 h-8" />
                        </div>
                        <div class="stat-title">"在团乐手"</div>
                        <div class="stat-value text-primary">
                            {move || stats().map(|s| s.active_members).unwrap_or_default()}
                        </div>
                    </div>
                    <div class="stat">
                        <div class="stat-figure text-secondary">
                            <Music attr:class="w-8 h-8" />
                        </div>
                        <div class="stat-title">"待举行音乐会"</div>
                        <div class="stat-value text-secondary">
                            {move || stats().map(|s| s.upcoming_concerts).unwrap_or_default()}
                        </div>
                    </div>
                    <div class="stat">
                        <div class="stat-figure text-accent">
                            <Calendar attr:class="w-8 h-8" />
                        </div>
                        <div class="stat-title">"本月排练"</div>
                        <div class="stat-value text-accent">
                            {move || stats().map(|s| s.rehearsals_this_month).unwrap_or_default()}
                        </div>
                    </div>
                    <div class="stat">
                        <div class="stat-figure text-success">
                            <CheckCircle attr:class="w-8 h-8" />
                        </div>
                        <div class="stat-title">"本季出勤率"</div>
                        <div class="stat-value text-success">{percent}</div>
                    </div>
                </div>

                <div class="grid grid-cols-1 lg:grid-cols-2 gap-8">
                    <div class="card bg-base-100 shadow-xl">
                        <div class="card-body">
                            <h2 class="card-title">"近期活动"</h2>
                            <Show
                                when=move || !home.state.get().upcoming.is_empty()
                                fallback=|| view! { <p class="text-base-content/60">"暂无安排"</p> }
                            >
                                <ul class="space-y-2">
                                    <For
                                        each=move || home.state.get().upcoming
                                        key=|event| event.id
                                        children=|event: UpcomingEvent| {
                                            view! {
                                                <li class="flex items-center justify-between p-2 rounded-lg hover:bg-base-200">
                                                    <div>
                                                        <span class="font-medium">{event.name.clone()}</span>
                                                        <span class="badge badge-ghost badge-sm ml-2">
                                                            {event.event_type.label()}
                                                        </span>
                                                    </div>
                                                    <span class="text-sm text-base-content/60">
                                                        {format_display(&event.date)}
                                                    </span>
                                                </li>
                                            }
                                        }
                                    />
                                </ul>
                            </Show>
                        </div>
                    </div>

                    <div class="card bg-base-100 shadow-xl">
                        <div class="card-body">
                            <h2 class="card-title">"最近动态"</h2>
                            <Show
                                when=move || !home.state.get().activity.is_empty()
                                fallback=|| view! { <p class="text-base-content/60">"暂无动态"</p> }
                            >
                                <ul class="timeline timeline-vertical timeline-compact">
                                    <For
                                        each=move || home.state.get().activity
                                        key=|entry| entry.id
                                        children=|entry| {
                                            view! {
                                                <li>
                                                    <div class="timeline-middle">
                                                        <div class="w-2 h-2 rounded-full bg-primary"></div>
                                                    </div>
                                                    <div class="timeline-end timeline-box">{entry.message}</div>
                                                </li>
                                            }
                                        }
                                    />
                                </ul>
                            </Show>
                        </div>
                    </div>
                </div>
            </div>
        </AppShell>
    }
}
