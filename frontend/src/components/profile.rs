use crate::auth::use_auth;
use crate::components::shell::AppShell;
use crate::stores::user::use_users;
use leptos::prelude::*;
use leptos::task::spawn_local;
use tutti_shared::{MusicianProfileInput, UpdateProfileRequest, UserProfile};
use wasm_bindgen::JsCast;

#[component]
fn ProfileForm(user: UserProfile) -> impl IntoView {
    let users = use_users();

    let (email, set_email) = signal(user.email.clone());
    let (first_name, set_first_name) = signal(user.first_name.clone());
    let (last_name, set_last_name) = signal(user.last_name.clone());
    let (instrument, set_instrument) = signal(user.musician_profile.instrument.clone());
    let (birthday, set_birthday) = signal(user.musician_profile.birthday.clone().unwrap_or_default());

    let saving = move || users.state.with(|s| s.saving);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let birthday = birthday.get_untracked();
        let request = UpdateProfileRequest {
            email: email.get_untracked(),
            first_name: first_name.get_untracked(),
            last_name: last_name.get_untracked(),
            musician_profile: MusicianProfileInput {
                instrument: instrument.get_untracked(),
                birthday: if birthday.trim().is_empty() { None } else { Some(birthday) },
            },
        };
        spawn_local(async move {
            users.update_profile(request).await;
        });
    };

    view! {
        <form class="space-y-4" on:submit=on_submit>
            <div class="form-control">
                <label class="label"><span class="label-text">"邮箱"</span></label>
                <input type="email" required class="input input-bordered w-full"
                    on:input=move |ev| set_email.set(event_target_value(&ev))
                    prop:value=email
                />
            </div>
            <div class="grid grid-cols-2 gap-4">
                <div class="form-control">
                    <label class="label"><span class="label-text">"名"</span></label>
                    <input type="text" class="input input-bordered w-full"
                        on:input=move |ev| set_first_name.set(event_target_value(&ev))
                        prop:value=first_name
                    />
                </div>
                <div class="form-control">
                    <label class="label"><span class="label-text">"姓"</span></label>
                    <input type="text" class="input input-bordered w-full"
                        on:input=move |ev| set_last_name.set(event_target_value(&ev))
                        prop:value=last_name
                    />
                </div>
            </div>
            <div class="grid grid-cols-2 gap-4">
                <div class="form-control">
                    <label class="label"><span class="label-text">"乐器"</span></label>
                    <input type="text" required class="input input-bordered w-full"
                        on:input=move |ev| set_instrument.set(event_target_value(&ev))
                        prop:value=instrument
                    />
                </div>
                <div class="form-control">
                    <label class="label"><span class="label-text">"生日"</span></label>
                    <input type="date" class="input input-bordered w-full"
                        on:input=move |ev| set_birthday.set(event_target_value(&ev))
                        prop:value=birthday
                    />
                </div>
            </div>
            <button type="submit" class="btn btn-primary" disabled=saving>
                {move || if saving() {
                    view! { <span class="loading loading-spinner"></span> "保存中..." }.into_any()
                } else {
                    "保存资料".into_any()
                }}
            </button>
        </form>
    }
}

#[component]
fn PasswordForm() -> impl IntoView {
    let users = use_users();

    let (old_password, set_old_password) = signal(String::new());
    let (new_password, set_new_password) = signal(String::new());
    let (confirm, set_confirm) = signal(String::new());
    let (mismatch, set_mismatch) = signal(false);

    let saving = move || users.state.with(|s| s.saving);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if new_password.get_untracked() != confirm.get_untracked() {
            set_mismatch.set(true);
            return;
        }
        set_mismatch.set(false);
        spawn_local(async move {
            if users
                .change_password(old_password.get_untracked(), new_password.get_untracked())
                .await
            {
                set_old_password.set(String::new());
                set_new_password.set(String::new());
                set_confirm.set(String::new());
            }
        });
    };

    view! {
        <form class="space-y-4" on:submit=on_submit>
            <Show when=move || mismatch.get()>
                <div role="alert" class="alert alert-warning text-sm py-2">
                    <span>"两次输入的新密码不一致"</span>
                </div>
            </Show>
            <div class="form-control">
                <label class="label"><span class="label-text">"当前密码"</span></label>
                <input type="password" required class="input input-bordered w-full"
                    on:input=move |ev| set_old_password.set(event_target_value(&ev))
                    prop:value=old_password
                />
            </div>
            <div class="form-control">
                <label class="label"><span class="label-text">"新密码"</span></label>
                <input type="password" required class="input input-bordered w-full"
                    on:input=move |ev| set_new_password.set(event_target_value(&ev))
                    prop:value=new_password
                />
            </div>
            <div class="form-control">
                <label class="label"><span class="label-text">"确认新密码"</span></label>
                <input type="password" required class="input input-bordered w-full"
                    on:input=move |ev| set_confirm.set(event_target_value(&ev))
                    prop:value=confirm
                />
            </div>
            <button type="submit" class="btn btn-primary" disabled=saving>"修改密码"</button>
        </form>
    }
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    let auth = use_auth();
    let users = use_users();

    let on_file_change = move |ev: leptos::web_sys::Event| {
        let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        else {
            return;
        };
        if let Some(file) = input.files().and_then(|files| files.get(0)) {
            spawn_local(async move {
                users.upload_photo(file).await;
            });
        }
    };

    let photo = move || {
        auth.state
            .get()
            .user
            .and_then(|u| u.musician_profile.photo)
    };

    view! {
        <AppShell>
            <div class="max-w-3xl mx-auto space-y-6">
                <h1 class="text-2xl font-bold">"我的资料"</h1>

                <Show when=move || users.state.with(|s| s.notice.is_some())>
                    <div role="alert" class="alert alert-success">
                        <span>{move || users.state.with(|s| s.notice.clone()).unwrap_or_default()}</span>
                    </div>
                </Show>
                <Show when=move || users.state.with(|s| s.error.is_some())>
                    <div role="alert" class="alert alert-error">
                        <span>{move || users.state.with(|s| s.error.clone()).unwrap_or_default()}</span>
                    </div>
                </Show>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h2 class="card-title">"头像"</h2>
                        <div class="flex items-center gap-4">
                            <div class="avatar avatar-placeholder">
                                {move || match photo() {
                                    Some(url) => view! {
                                        <div class="w-20 rounded-full"><img src=url alt="头像" /></div>
                                    }.into_any(),
                                    None => view! {
                                        <div class="bg-neutral text-neutral-content w-20 rounded-full">
                                            <span class="text-2xl">"♪"</span>
                                        </div>
                                    }.into_any(),
                                }}
                            </div>
                            <input type="file" accept="image/*"
                                class="file-input file-input-bordered"
                                on:change=on_file_change
                            />
                        </div>
                    </div>
                </div>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h2 class="card-title">"基本资料"</h2>
                        {move || auth.state.get().user.map(|user| view! { <ProfileForm user=user /> })}
                    </div>
                </div>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h2 class="card-title">"修改密码"</h2>
                        <PasswordForm />
                    </div>
                </div>
            </div>
        </AppShell>
    }
}
