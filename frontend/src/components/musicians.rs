use crate::components::icons::Users;
use crate::components::shell::AppShell;
use crate::stores::user::use_users;
use leptos::prelude::*;
use leptos::task::spawn_local;
use tutti_shared::UserProfile;

#[component]
fn MusicianCard(musician: UserProfile) -> impl IntoView {
    let name = musician.display_name();
    let initial = name.chars().next().unwrap_or('?').to_string();
    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body flex-row items-center gap-4 py-4">
                <div class="avatar avatar-placeholder">
                    {match musician.musician_profile.photo.clone() {
                        Some(url) => view! {
                            <div class="w-14 rounded-full">
                                <img src=url alt="头像" />
                            </div>
                        }.into_any(),
                        None => view! {
                            <div class="bg-neutral text-neutral-content w-14 rounded-full">
                                <span class="text-xl">{initial}</span>
                            </div>
                        }.into_any(),
                    }}
                </div>
                <h2 class="font-bold">{name}</h2>
            </div>
        </div>
    }
}

#[component]
pub fn MusiciansPage() -> impl IntoView {
    let users = use_users();

    Effect::new(move |_| {
        spawn_local(async move { users.load_musicians().await });
    });

    let loading = move || users.state.with(|s| s.loading);

    view! {
        <AppShell>
            <div class="space-y-6">
                <h1 class="text-2xl font-bold">
                    "乐手名录"
                    <span class="badge badge-neutral ml-2">
                        {move || users.state.with(|s| s.musicians.len())}
                    </span>
                </h1>

                <Show when=move || users.state.with(|s| s.error.is_some())>
                    <div role="alert" class="alert alert-error">
                        <span>{move || users.state.with(|s| s.error.clone()).unwrap_or_default()}</span>
                    </div>
                </Show>

                <Show
                    when=move || !loading()
                    fallback=|| view! {
                        <div class="flex justify-center p-12">
                            <span class="loading loading-spinner loading-lg text-primary"></span>
                        </div>
                    }
                >
                    <Show
                        when=move || users.state.with(|s| !s.musicians.is_empty())
                        fallback=|| view! {
                            <div class="text-center p-12 text-base-content/60">
                                <Users attr:class="h-8 w-8 mx-auto mb-2" />
                                "名录为空"
                            </div>
                        }
                    >
                        // 按乐器分组展示
                        <For
                            each=move || users.state.with(|s| s.musicians_by_instrument())
                            key=|(instrument, members)| (instrument.clone(), members.len())
                            children=|(instrument, members): (String, Vec<UserProfile>)| {
                                view! {
                                    <section class="space-y-3">
                                        <h2 class="text-lg font-semibold border-b border-base-300 pb-1">
                                            {instrument}
                                            <span class="badge badge-ghost badge-sm ml-2">{members.len()}</span>
                                        </h2>
                                        <div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-4">
                                            {members
                                                .into_iter()
                                                .map(|musician| view! { <MusicianCard musician=musician /> })
                                                .collect_view()}
                                        </div>
                                    </section>
                                }
                            }
                        />
                    </Show>
                </Show>
            </div>
        </AppShell>
    }
}
