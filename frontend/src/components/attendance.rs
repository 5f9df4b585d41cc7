use crate::components::guard::{RequirePermissions, perms};
use crate::components::shell::AppShell;
use crate::permissions::names::ATTENDANCE_MANAGE;
use crate::stores::attendance::use_attendance;
use crate::stores::user::use_users;
use leptos::prelude::*;
use leptos::task::spawn_local;
use tutti_shared::attendance::{EventInput, EventType, OrchestraEvent, Presence, SeasonInput};
use tutti_shared::date::format_display;
use tutti_shared::UserProfile;

fn event_type_from_value(value: &str) -> EventType {
    match value {
        "concert" => EventType::Concert,
        "soundcheck" => EventType::Soundcheck,
        _ => EventType::Rehearsal,
    }
}

// =========================================================
// 新建乐季 / 新建活动对话框
// =========================================================

#[component]
fn NewSeasonDialog() -> impl IntoView {
    let attendance = use_attendance();
    let (open, set_open) = signal(false);
    let dialog_ref = NodeRef::<leptos::html::Dialog>::new();

    let (name, set_name) = signal(String::new());
    let (is_current, set_is_current) = signal(true);

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

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let input = SeasonInput {
            name: name.get_untracked(),
            is_current: is_current.get_untracked(),
        };
        spawn_local(async move {
            attendance.create_season(input).await;
        });
        set_open.set(false);
        set_name.set(String::new());
    };

    view! {
        <button class="btn btn-sm btn-outline" on:click=move |_| set_open.set(true)>
            "新建乐季"
        </button>
        <dialog class="modal" node_ref=dialog_ref on:close=move |_| set_open.set(false)>
            <div class="modal-box">
                <h3 class="font-bold text-lg">"新建乐季"</h3>
                <form on:submit=on_submit class="space-y-4 mt-4">
                    <div class="form-control">
                        <label class="label"><span class="label-text">"名称"</span></label>
                        <input type="text" required placeholder="2025-2026"
                            on:input=move |ev| set_name.set(event_target_value(&ev))
                            prop:value=name
                            class="input input-bordered w-full"
                        />
                    </div>
                    <div class="form-control">
                        <label class="label cursor-pointer">
                            <span class="label-text">"设为当前乐季"</span>
                            <input type="checkbox" class="toggle toggle-primary"
                                prop:checked=is_current
                                on:change=move |ev| set_is_current.set(event_target_checked(&ev))
                            />
                        </label>
                    </div>
                    <div class="modal-action">
                        <button type="button" class="btn btn-ghost" on:click=move |_| set_open.set(false)>"取消"</button>
                        <button type="submit" class="btn btn-primary">"创建"</button>
                    </div>
                </form>
            </div>
            <form method="dialog" class="modal-backdrop"><button>"close"</button></form>
        </dialog>
    }
}

#[component]
fn NewEventDialog(season: u64) -> impl IntoView {
    let attendance = use_attendance();
    let (open, set_open) = signal(false);
    let dialog_ref = NodeRef::<leptos::html::Dialog>::new();

    let (name, set_name) = signal(String::new());
    let (date, set_date) = signal(String::new());
    let (event_type, set_event_type) = signal(EventType::Rehearsal);

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

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let input = EventInput {
            season,
            name: name.get_untracked(),
            date: date.get_untracked(),
            event_type: event_type.get_untracked(),
        };
        spawn_local(async move {
            attendance.create_event(input).await;
        });
        set_open.set(false);
        set_name.set(String::new());
        set_date.set(String::new());
    };

    view! {
        <button class="btn btn-sm btn-outline" on:click=move |_| set_open.set(true)>
            "新建活动"
        </button>
        <dialog class="modal" node_ref=dialog_ref on:close=move |_| set_open.set(false)>
            <div class="modal-box">
                <h3 class="font-bold text-lg">"新建活动"</h3>
                <form on:submit=on_submit class="space-y-4 mt-4">
                    <div class="form-control">
                        <label class="label"><span class="label-text">"名称"</span></label>
                        <input type="text" required placeholder="周四排练"
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
                            <label class="label"><span class="label-text">"类型"</span></label>
                            <select class="select select-bordered w-full"
                                on:change=move |ev| set_event_type.set(event_type_from_value(&event_target_value(&ev)))
                            >
                                <option value="rehearsal">{EventType::Rehearsal.label()}</option>
                                <option value="concert">{EventType::Concert.label()}</option>
                                <option value="soundcheck">{EventType::Soundcheck.label()}</option>
                            </select>
                        </div>
                    </div>
                    <div class="modal-action">
                        <button type="button" class="btn btn-ghost" on:click=move |_| set_open.set(false)>"取消"</button>
                        <button type="submit" class="btn btn-primary">"创建"</button>
                    </div>
                </form>
            </div>
            <form method="dialog" class="modal-backdrop"><button>"close"</button></form>
        </dialog>
    }
}

// =========================================================
// 考勤标记行
// =========================================================

#[component]
fn AttendanceRow(musician: UserProfile, event: OrchestraEvent) -> impl IntoView {
    let attendance = use_attendance();
    let user_id = musician.id;
    let event_id = event.id;
    let event_type = event.event_type;

    let value = move || attendance.state.with(|s| s.value_for(event_id, user_id));
    let pending = move || attendance.state.with(|s| s.mark_pending(event_id, user_id));

    let mark_buttons = move || {
        Presence::options_for(event_type)
            .iter()
            .map(|&option| {
                let active = move || value() == Some(option);
                view! {
                    <button
                        class=move || if active() { "btn btn-xs btn-primary" } else { "btn btn-xs btn-ghost" }
                        disabled=pending
                        on:click=move |_| {
                            spawn_local(async move {
                                attendance.mark(event_id, user_id, option).await;
                            });
                        }
                    >
                        {option.label()}
                    </button>
                }
            })
            .collect_view()
    };

    view! {
        <tr>
            <td>
                {musician.display_name()}
                <span class="text-sm text-base-content/60 ml-2">
                    {musician.musician_profile.instrument.clone()}
                </span>
            </td>
            <td class="text-center">
                {move || value().map(|v| v.label()).unwrap_or("未记录")}
            </td>
            <td class="text-right">
                <RequirePermissions required=perms(&[ATTENDANCE_MANAGE])>
                    <div class="join">{mark_buttons()}</div>
                </RequirePermissions>
            </td>
        </tr>
    }
}

// =========================================================
// 考勤页
// =========================================================

#[component]
pub fn AttendancePage() -> impl IntoView {
    let attendance = use_attendance();
    let users = use_users();

    Effect::new(move |_| {
        spawn_local(async move {
            attendance.load_seasons().await;
            users.load_musicians().await;
        });
    });

    let selected_season = move || attendance.state.with(|s| s.selected_season);
    let selected_event = move || attendance.state.with(|s| s.selected_event_record().cloned());

    view! {
        <AppShell>
            <div class="space-y-6">
                <div class="flex items-center justify-between flex-wrap gap-2">
                    <h1 class="text-2xl font-bold">"考勤"</h1>
                    <RequirePermissions required=perms(&[ATTENDANCE_MANAGE])>
                        <div class="flex gap-2">
                            <NewSeasonDialog />
                            {move || selected_season().map(|season| view! { <NewEventDialog season=season /> })}
                        </div>
                    </RequirePermissions>
                </div>

                <Show when=move || attendance.state.with(|s| s.error.is_some())>
                    <div role="alert" class="alert alert-error">
                        <span>{move || attendance.state.with(|s| s.error.clone()).unwrap_or_default()}</span>
                    </div>
                </Show>

                // 乐季选择
                <div class="flex items-center gap-4">
                    <span class="font-medium">"乐季"</span>
                    <select class="select select-bordered select-sm"
                        on:change=move |ev| {
                            if let Ok(id) = event_target_value(&ev).parse::<u64>() {
                                spawn_local(async move { attendance.select_season(id).await });
                            }
                        }
                    >
                        <For
                            each=move || attendance.state.with(|s| s.seasons.clone())
                            key=|season| season.id
                            children=move |season| {
                                let id = season.id;
                                view! {
                                    <option value=id.to_string() selected=move || selected_season() == Some(id)>
                                        {season.name.clone()}
                                        {if season.is_current { "（当前）" } else { "" }}
                                    </option>
                                }
                            }
                        />
                    </select>
                </div>

                <div class="grid grid-cols-1 lg:grid-cols-3 gap-6">
                    // 活动列表
                    <div class="card bg-base-100 shadow-xl h-fit">
                        <div class="card-body">
                            <h2 class="card-title">"活动"</h2>
                            <Show
                                when=move || attendance.state.with(|s| !s.events.is_empty())
                                fallback=|| view! { <p class="text-base-content/60">"本乐季暂无活动"</p> }
                            >
                                <ul class="menu w-full p-0">
                                    <For
                                        each=move || attendance.state.with(|s| s.events.clone())
                                        key=|event| event.id
                                        children=move |event: OrchestraEvent| {
                                            let id = event.id;
                                            let is_selected = move || {
                                                attendance.state.with(|s| s.selected_event == Some(id))
                                            };
                                            view! {
                                                <li>
                                                    <a
                                                        class=move || if is_selected() { "active" } else { "" }
                                                        on:click=move |_| {
                                                            spawn_local(async move {
                                                                attendance.select_event(id).await
                                                            });
                                                        }
                                                    >
                                                        <div class="flex flex-col items-start">
                                                            <span>
                                                                {event.name.clone()}
                                                                <span class="badge badge-ghost badge-sm ml-2">
                                                                    {event.event_type.label()}
                                                                </span>
                                                            </span>
                                                            <span class="text-xs text-base-content/60">
                                                                {format_display(&event.date)}
                                                            </span>
                                                        </div>
                                                    </a>
                                                </li>
                                            }
                                        }
                                    />
                                </ul>
                            </Show>
                        </div>
                    </div>

                    // 考勤表
                    <div class="lg:col-span-2 card bg-base-100 shadow-xl">
                        <div class="card-body">
                            {move || match selected_event() {
                                None => view! {
                                    <p class="text-base-content/60">"选择一个活动查看考勤"</p>
                                }
                                .into_any(),
                                Some(event) => {
                                    let title = event.name.clone();
                                    view! {
                                        <h2 class="card-title">{title}</h2>
                                        <div class="overflow-x-auto">
                                            <table class="table">
                                                <thead>
                                                    <tr>
                                                        <th>"乐手"</th>
                                                        <th class="text-center">"出勤"</th>
                                                        <th></th>
                                                    </tr>
                                                </thead>
                                                <tbody>
                                                    <For
                                                        each=move || users.state.with(|s| s.musicians.clone())
                                                        key=|m| m.id
                                                        children={
                                                            let event = event.clone();
                                                            move |musician| view! {
                                                                <AttendanceRow musician=musician event=event.clone() />
                                                            }
                                                        }
                                                    />
                                                </tbody>
                                            </table>
                                        </div>
                                    }
                                    .into_any()
                                }
                            }}
                        </div>
                    </div>
                </div>
            </div>
        </AppShell>
    }
}
