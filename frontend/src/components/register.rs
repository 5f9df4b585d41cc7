use crate::auth::use_auth;
use crate::web::route::AppRoute;
use crate::web::router::use_router;
use leptos::prelude::*;
use leptos::task::spawn_local;
use tutti_shared::RegisterRequest;

#[component]
pub fn RegisterPage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();

    let (username, set_username) = signal(String::new());
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (first_name, set_first_name) = signal(String::new());
    let (last_name, set_last_name) = signal(String::new());
    let (instrument, set_instrument) = signal(String::new());
    // 提交成功后切换为提示视图
    let (submitted, set_submitted) = signal(false);

    let submitting = move || auth.state.get().submitting;
    let error_msg = move || auth.state.get().error.map(|e| e.user_message());

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let request = RegisterRequest {
            username: username.get_untracked(),
            email: email.get_untracked(),
            password: password.get_untracked(),
            first_name: first_name.get_untracked(),
            last_name: last_name.get_untracked(),
            instrument: instrument.get_untracked(),
        };
        if request.username.is_empty() || request.password.is_empty() || request.email.is_empty() {
            return;
        }
        spawn_local(async move {
            if auth.register(request).await {
                set_submitted.set(true);
            }
        });
    };

    let text_field = move |id: &'static str,
                           label: &'static str,
                           kind: &'static str,
                           value: ReadSignal<String>,
                           setter: WriteSignal<String>,
                           required: bool| {
        view! {
            <div class="form-control">
                <label class="label" for=id>
                    <span class="label-text">{label}</span>
                </label>
                <input
                    id=id
                    type=kind
                    on:input=move |ev| setter.set(event_target_value(&ev))
                    prop:value=value
                    class="input input-bordered"
                    required=required
                />
            </div>
        }
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <h1 class="text-3xl font-bold mb-2">"加入乐团"</h1>

                <Show
                    when=move || !submitted.get()
                    fallback=move || view! {
                        <div class="card w-full shadow-2xl bg-base-100">
                            <div class="card-body items-center text-center">
                                <h2 class="card-title">"注册成功"</h2>
                                <p>"账号已创建，等待管理员审批后即可登录。"</p>
                                <button class="btn btn-primary mt-4" on:click=move |_| router.navigate(AppRoute::Login)>
                                    "返回登录"
                                </button>
                            </div>
                        </div>
                    }
                >
                    <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                        <form class="card-body" on:submit=on_submit>
                            <Show when=move || error_msg().is_some()>
                                <div role="alert" class="alert alert-error text-sm py-2">
                                    <span>{move || error_msg().unwrap_or_default()}</span>
                                </div>
                            </Show>

                            {text_field("reg-username", "用户名", "text", username, set_username, true)}
                            {text_field("reg-email", "邮箱", "email", email, set_email, true)}
                            {text_field("reg-password", "密码", "password", password, set_password, true)}
                            {text_field("reg-first-name", "名", "text", first_name, set_first_name, false)}
                            {text_field("reg-last-name", "姓", "text", last_name, set_last_name, false)}
                            {text_field("reg-instrument", "乐器", "text", instrument, set_instrument, true)}

                            <div class="form-control mt-6">
                                <button class="btn btn-primary" disabled=submitting>
                                    {move || if submitting() {
                                        view! { <span class="loading loading-spinner"></span> "提交中..." }.into_any()
                                    } else {
                                        "注册".into_any()
                                    }}
                                </button>
                            </div>
                            <div class="text-center text-sm mt-2">
                                "已有账号？"
                                <a class="link link-primary" on:click=move |_| router.navigate(AppRoute::Login)>
                                    "登录"
                                </a>
                            </div>
                        </form>
                    </div>
                </Show>
            </div>
        </div>
    }
}
