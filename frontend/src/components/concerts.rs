use crate::components::guard::{RequirePermissions, perms};
use crate::components::icons::Plus;
use crate::components::shell::AppShell;
use crate::permissions::names::CONCERT_ADD;
use crate::stores::concert::use_concerts;
use crate::web::route::AppRoute;
use crate::web::router::use_router;
use leptos::prelude::*;
use leptos::task::spawn_local;
use tutti_shared::concert::ConcertStatus;
use tutti_shared::date::format_display;
use tutti_shared::{Concert, ConcertFilter, ConcertInput};

fn status_from_value(value: &str) -> Option<ConcertStatus> {
    ConcertStatus::ALL.into_iter().find(|s| s.as_str() == value)
}

pub fn status_badge_class(status: ConcertStatus) -> &'static str {
    match status {
        ConcertStatus::Planned => "badge badge-info",
        ConcertStatus::Confirmed => "badge badge-success",
        ConcertStatus::Completed => "badge badge-ghost",
        ConcertStatus::Cancelled => "badge badge-error",
    }
}

// =========================================================
// 创建/编辑表单对话框
// =========================================================

#[component]
pub fn ConcertFormDialog(
    title: &'static str,
    button_label: &'static str,
    #[prop(default = "btn btn-primary gap-2")] button_class: &'static str,
    /// 编辑时的初始值；新建时省略
    #[prop(optional, into)]
    initial: Option<Concert>,
    #[prop(into)] on_submit: Callback<ConcertInput>,
) -> impl IntoView {
    let (open, set_open) = signal(false);
    let dialog_ref = NodeRef::<leptos::html::Dialog>::new();

    let initial = StoredValue::new(initial);
    let seed = move || {
        initial.with_value(|c| match c {
            Some(c) => ConcertInput {
                name: c.name.clone(),
                date: c.date.clone(),
                location: c.location.clone(),
                description: c.description.clone(),
                setlist: c.setlist.clone(),
                status: c.status,
            },
            None => ConcertInput::default(),
        })
    };

    let (name, set_name) = signal(seed().name);
    let (date, set_date) = signal(seed().date);
    let (location, set_location) = signal(seed().location.unwrap_or_default());
    let (description, set_description) = signal(seed().description.unwrap_or_default());
    let (setlist, set_setlist) = signal(seed().setlist.unwrap_or_default());
    let (status, set_status) = signal(seed().status);

    let reset_form = move || {
        let s = seed();
        set_name.set(s.name);
        set_date.set(s.date);
        set_location.set(s.location.unwrap_or_default());
        set_description.set(s.description.unwrap_or_default());
        set_setlist.set(s.setlist.unwrap_or_default());
        set_status.set(s.status);
    };

    Effect::new(move |_| {
        if let Some(dialog) = dialog_ref.get() {
            if open.get() {
                if !dialog.open() {
                    let _ = dialog.show_modal();
                }
            } else if dialog.open() {
                dialog.close();
            }
        }
    });

    let none_if_empty = |value: String| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    };

    let handle_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let input = ConcertInput {
            name: name.get(),
            date: date.get(),
            location: none_if_empty(location.get()),
            description: none_if_empty(description.get()),
            setlist: none_if_empty(setlist.get()),
            status: status.get(),
        };
        on_submit.run(input);
        set_open.set(false);
        reset_form();
    };

    view! {
        <button class=button_class on:click=move |_| set_open.set(true)>
            {button_label}
        </button>

        <dialog class="modal" node_ref=dialog_ref on:close=move |_| set_open.set(false)>
            <div class="modal-box">
                <h3 class="font-bold text-lg">{title}</h3>

                <form on:submit=handle_submit class="space-y-4 mt-4">
                    <div class="form-control">
                        <label class="label"><span class="label-text">"名称"</span></label>
                        <input type="text" required
                            placeholder="春季音乐会"
                            on:input=move |ev| set_name.set(event_target_value(&ev))
                            prop:value=name
                            class="input input-bordered w-full"
                        />
                    </div>

                    <div class="grid grid-cols-2 gap-4">
                        <div class="form-control">
                            <label class="label"><span class="label-text">"日期"</span></label>
                            <input type="date" required
                                on:input=move |ev| set_date.set(event_target_value(&ev))
                                prop:value=date
                                class="input input-bordered w-full"
                            />
                        </div>
                        <div class="form-control">
                            <label class="label"><span class="label-text">"状态"</span></label>
                            <select
                                class="select select-bordered w-full"
                                on:change=move |ev| {
                                    if let Some(s) = status_from_value(&event_target_value(&ev)) {
                                        set_status.set(s);
                                    }
                                }
                            >
                                {ConcertStatus::ALL
                                    .into_iter()
                                    .map(|s| view! {
                                        <option value=s.as_str() selected=move || status.get() == s>
                                            {s.label()}
                                        </option>
                                    })
                                    .collect_view()}
                            </select>
                        </div>
                    </div>

                    <div class="form-control">
                        <label class="label"><span class="label-text">"地点"</span></label>
                        <input type="text"
                            on:input=move |ev| set_location.set(event_target_value(&ev))
                            prop:value=location
                            class="input input-bordered w-full"
                        />
                    </div>

                    <div class="form-control">
                        <label class="label"><span class="label-text">"简介"</span></label>
                        <textarea
                            on:input=move |ev| set_description.set(event_target_value(&ev))
                            prop:value=description
                            class="textarea textarea-bordered w-full"
                        ></textarea>
                    </div>

                    <div class="form-control">
                        <label class="label"><span class="label-text">"曲目单"</span></label>
                        <textarea
                            placeholder="每行一首"
                            on:input=move |ev| set_setlist.set(event_target_value(&ev))
                            prop:value=setlist
                            class="textarea textarea-bordered w-full"
                        ></textarea>
                    </div>

                    <div class="modal-action">
                        <button type="button" class="btn btn-ghost" on:click=move |_| set_open.set(false)>
                            "取消"
                        </button>
                        <button type="submit" class="btn btn-primary">"保存"</button>
                    </div>
                </form>
            </div>
            <form method="dialog" class="modal-backdrop">
                <button>"close"</button>
            </form>
        </dialog>
    }
}

// =========================================================
// 报名按钮（列表与详情共用）
// =========================================================

#[component]
pub fn RegistrationButton(concert_id: u64) -> impl IntoView {
    let concerts = use_concerts();

    let registered = move || {
        concerts.state.with(|s| {
            s.items
                .iter()
                .find(|c| c.id == concert_id)
                .or(s.current.as_ref().filter(|c| c.id == concert_id))
                .map(|c| c.is_registered)
                .unwrap_or(false)
        })
    };
    let pending = move || concerts.state.with(|s| s.registration_pending(concert_id));

    view! {
        <button
            class=move || if registered() { "btn btn-outline btn-sm" } else { "btn btn-primary btn-sm" }
            disabled=pending
            on:click=move |_| {
                spawn_local(async move { concerts.toggle_registration(concert_id).await });
            }
        >
            {move || if registered() { "取消报名" } else { "报名参加" }}
        </button>
    }
}

// =========================================================
// 列表页
// =========================================================

#[component]
pub fn ConcertsPage() -> impl IntoView {
    let concerts = use_concerts();
    let router = use_router();

    let (search, set_search) = signal(String::new());
    let (status_filter, set_status_filter) = signal(Option::<ConcertStatus>::None);
    let (date_from, set_date_from) = signal(String::new());
    let (date_to, set_date_to) = signal(String::new());

    let build_filter = move || {
        let none_if_empty = |value: String| {
            if value.trim().is_empty() { None } else { Some(value) }
        };
        ConcertFilter {
            search: none_if_empty(search.get_untracked()),
            status: status_filter.get_untracked(),
            date_from: none_if_empty(date_from.get_untracked()),
            date_to: none_if_empty(date_to.get_untracked()),
            ..Default::default()
        }
    };

    let apply_filter = move || {
        let filter = build_filter();
        spawn_local(async move { concerts.load(filter).await });
    };

    // 进入页面：加载第一页并预取权限
    Effect::new(move |_| {
        spawn_local(async move {
            concerts.ensure_permissions().await;
            concerts.load(ConcertFilter::default()).await;
        });
    });

    let handle_create = move |input: ConcertInput| {
        spawn_local(async move {
            concerts.create(input).await;
        });
    };

    let loading = move || concerts.state.with(|s| s.loading);

    view! {
        <AppShell>
            <div class="space-y-6">
                <div class="flex items-center justify-between">
                    <h1 class="text-2xl font-bold">
                        "音乐会"
                        <span class="badge badge-neutral ml-2">
                            {move || concerts.state.with(|s| s.total_count)}
                        </span>
                    </h1>
                    <RequirePermissions required=perms(&[CONCERT_ADD])>
                        <ConcertFormDialog
                            title="新建音乐会"
                            button_label="新建"
                            on_submit=handle_create
                        />
                    </RequirePermissions>
                </div>

                <Show when=move || concerts.state.with(|s| s.error.is_some())>
                    <div role="alert" class="alert alert-error">
                        <span>{move || concerts.state.with(|s| s.error.clone()).unwrap_or_default()}</span>
                    </div>
                </Show>

                // 过滤条
                <div class="card bg-base-100 shadow">
                    <div class="card-body py-4 flex-row flex-wrap items-end gap-4">
                        <div class="form-control">
                            <label class="label py-1"><span class="label-text">"搜索"</span></label>
                            <input type="text" placeholder="名称或地点"
                                class="input input-bordered input-sm"
                                on:input=move |ev| set_search.set(event_target_value(&ev))
                                prop:value=search
                            />
                        </div>
                        <div class="form-control">
                            <label class="label py-1"><span class="label-text">"状态"</span></label>
                            <select class="select select-bordered select-sm"
                                on:change=move |ev| set_status_filter.set(status_from_value(&event_target_value(&ev)))
                            >
                                <option value="">"全部"</option>
                                {ConcertStatus::ALL
                                    .into_iter()
                                    .map(|s| view! { <option value=s.as_str()>{s.label()}</option> })
                                    .collect_view()}
                            </select>
                        </div>
                        <div class="form-control">
                            <label class="label py-1"><span class="label-text">"从"</span></label>
                            <input type="date" class="input input-bordered input-sm"
                                on:input=move |ev| set_date_from.set(event_target_value(&ev))
                                prop:value=date_from
                            />
                        </div>
                        <div class="form-control">
                            <label class="label py-1"><span class="label-text">"到"</span></label>
                            <input type="date" class="input input-bordered input-sm"
                                on:input=move |ev| set_date_to.set(event_target_value(&ev))
                                prop:value=date_to
                            />
                        </div>
                        <button class="btn btn-sm btn-primary" on:click=move |_| apply_filter()>
                            "筛选"
                        </button>
                    </div>
                </div>

                // 列表
                <Show
                    when=move || !loading() || !concerts.state.with(|s| s.items.is_empty())
                    fallback=|| view! {
                        <div class="flex justify-center p-12">
                            <span class="loading loading-spinner loading-lg text-primary"></span>
                        </div>
                    }
                >
                    <div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-4">
                        <For
                            each=move || concerts.state.with(|s| s.items.clone())
                            key=|concert| (concert.id, concert.is_registered, concert.participants_count)
                            children=move |concert: Concert| {
                                let id = concert.id;
                                view! {
                                    <div class="card bg-base-100 shadow-xl">
                                        <div class="card-body">
                                            <div class="flex items-start justify-between">
                                                <h2
                                                    class="card-title cursor-pointer hover:text-primary"
                                                    on:click=move |_| router.navigate(AppRoute::ConcertDetail(id))
                                                >
                                                    {concert.name.clone()}
                                                </h2>
                                                <span class=status_badge_class(concert.status)>
                                                    {concert.status.label()}
                                                </span>
                                            </div>
                                            <p class="text-sm text-base-content/70">
                                                {format_display(&concert.date)}
                                                {concert.location.as_ref().map(|l| format!(" · {l}")).unwrap_or_default()}
                                            </p>
                                            <div class="card-actions justify-between items-center mt-2">
                                                <span class="text-sm">
                                                    {concert.participants_count} " 人已报名"
                                                </span>
                                                <RegistrationButton concert_id=id />
                                            </div>
                                        </div>
                                    </div>
                                }
                            }
                        />
                    </div>

                    <Show when=move || concerts.state.with(|s| !loading() && s.items.is_empty())>
                        <div class="text-center p-12 text-base-content/60">
                            <Plus attr:class="h-8 w-8 mx-auto mb-2" />
                            "没有符合条件的音乐会"
                        </div>
                    </Show>
                </Show>

                // 翻页
                <Show when=move || concerts.state.with(|s| s.has_next)>
                    <div class="flex justify-center">
                        <button class="btn btn-outline" disabled=loading
                            on:click=move |_| {
                                spawn_local(async move { concerts.load_more().await });
                            }
                        >
                            {move || if loading() {
                                view! { <span class="loading loading-spinner"></span> "加载中..." }.into_any()
                            } else {
                                "加载更多".into_any()
                            }}
                        </button>
                    </div>
                </Show>
            </div>
        </AppShell>
    }
}
