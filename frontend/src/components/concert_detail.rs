use crate::components::concerts::{ConcertFormDialog, RegistrationButton, status_badge_class};
use crate::components::shell::AppShell;
use crate::stores::concert::use_concerts;
use crate::web::route::AppRoute;
use crate::web::router::use_router;
use leptos::prelude::*;
use leptos::task::spawn_local;
use tutti_shared::date::format_display;
use tutti_shared::{Concert, ConcertInput, Participant};

#[component]
pub fn ConcertDetailPage(id: u64) -> impl IntoView {
    let concerts = use_concerts();
    let router = use_router();

    Effect::new(move |_| {
        spawn_local(async move { concerts.open_detail(id).await });
    });

    let current = move || concerts.state.with(|s| s.current.clone());

    let handle_update = move |input: ConcertInput| {
        spawn_local(async move {
            concerts.update(id, input).await;
        });
    };

    let handle_delete = move |_| {
        let confirmed = web_sys::window()
            .map(|w| {
                w.confirm_with_message("确定删除这场音乐会？报名记录将一并移除。")
                    .unwrap_or(false)
            })
            .unwrap_or(false);
        if !confirmed {
            return;
        }
        spawn_local(async move {
            if concerts.delete(id).await {
                router.navigate(AppRoute::Concerts);
            }
        });
    };

    // 整个详情随 current 重渲染，权限开关直接按快照取值即可
    let detail_view = move |concert: Concert| {
        let edit_dialog = concert.can_edit.then(|| {
            view! {
                <ConcertFormDialog
                    title="编辑音乐会"
                    button_label="编辑"
                    button_class="btn btn-outline btn-sm"
                    initial=concert.clone()
                    on_submit=handle_update
                />
            }
        });
        let delete_button = concert.can_delete.then(|| {
            view! {
                <button class="btn btn-outline btn-error btn-sm" on:click=handle_delete>
                    "删除"
                </button>
            }
        });
        let description = concert.description.clone().map(|text| {
            view! { <p class="mt-2 whitespace-pre-wrap">{text}</p> }
        });
        let setlist = concert.setlist.clone().map(|text| {
            view! {
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h2 class="card-title">"曲目单"</h2>
                        <p class="whitespace-pre-wrap font-mono text-sm">{text}</p>
                    </div>
                </div>
            }
        });

        view! {
            <div class="space-y-6">
                <div class="flex items-center justify-between flex-wrap gap-2">
                    <div class="flex items-center gap-3">
                        <button class="btn btn-ghost btn-sm" on:click=move |_| router.navigate(AppRoute::Concerts)>
                            "← 返回"
                        </button>
                        <h1 class="text-2xl font-bold">{concert.name.clone()}</h1>
                        <span class=status_badge_class(concert.status)>{concert.status.label()}</span>
                    </div>
                    <div class="flex gap-2">
                        <RegistrationButton concert_id=concert.id />
                        {edit_dialog}
                        {delete_button}
                    </div>
                </div>

                <div class="grid grid-cols-1 lg:grid-cols-3 gap-6">
                    <div class="lg:col-span-2 space-y-6">
                        <div class="card bg-base-100 shadow-xl">
                            <div class="card-body">
                                <p class="text-base-content/70">
                                    {format_display(&concert.date)}
                                    {concert.location.as_ref().map(|l| format!(" · {l}")).unwrap_or_default()}
                                </p>
                                {description}
                            </div>
                        </div>
                        {setlist}
                    </div>

                    <div class="card bg-base-100 shadow-xl h-fit">
                        <div class="card-body">
                            <h2 class="card-title">
                                "参与者"
                                <span class="badge badge-neutral">{concert.participants_count}</span>
                            </h2>
                            <Show
                                when=move || concerts.state.with(|s| !s.participants.is_empty())
                                fallback=|| view! { <p class="text-base-content/60">"还没有人报名"</p> }
                            >
                                <ul class="space-y-1">
                                    <For
                                        each=move || concerts.state.with(|s| s.participants.clone())
                                        key=|p| p.id
                                        children=|p: Participant| {
                                            let name = if p.first_name.is_empty() && p.last_name.is_empty() {
                                                p.username.clone()
                                            } else {
                                                format!("{} {}", p.first_name, p.last_name)
                                            };
                                            view! {
                                                <li class="flex justify-between p-2 rounded hover:bg-base-200">
                                                    <span>{name}</span>
                                                    <span class="text-sm text-base-content/60">{p.instrument}</span>
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
        }
    };

    view! {
        <AppShell>
            <Show when=move || concerts.state.with(|s| s.error.is_some())>
                <div role="alert" class="alert alert-error mb-4">
                    <span>{move || concerts.state.with(|s| s.error.clone()).unwrap_or_default()}</span>
                </div>
            </Show>

            {move || match current() {
                Some(concert) => detail_view(concert).into_any(),
                None => view! {
                    <div class="flex justify-center p-12">
                        <span class="loading loading-spinner loading-lg text-primary"></span>
                    </div>
                }
                .into_any(),
            }}
        </AppShell>
    }
}
