//! API 客户端
//!
//! 统一的请求分发层：附加 Bearer 凭据、规范化错误、并在 access
//! 凭据过期（401）时执行恰好一次"刷新并重放"。传输与凭据持久化
//! 都放在 trait 之后，测试用脚本化的内存实现替换。

use crate::web::http::HttpRequestBuilder;
use crate::web::storage::BrowserStorage;
use async_trait::async_trait;
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tutti_shared::protocol::ApiEndpoint;
use tutti_shared::{BEARER_PREFIX, HEADER_AUTHORIZATION, RefreshRequest, RefreshResponse, TokenPair, UserProfile};

/// 凭据在 LocalStorage 中的固定键
pub const ACCESS_TOKEN_KEY: &str = "tutti_access_token";
pub const REFRESH_TOKEN_KEY: &str = "tutti_refresh_token";

// =========================================================
// 错误类型
// =========================================================

#[derive(Debug, Clone)]
pub enum ApiError {
    /// 网络层失败，没有收到任何响应
    Network(String),
    /// 响应体解析失败
    Decode(String),
    /// 刷新失败（或无刷新凭据）后的最终 401：会话已结束
    SessionExpired,
    /// 其他非 2xx 响应，原样携带后端的结构化错误体
    Api { status: u16, body: Value },
}

impl ApiError {
    /// 依错误策略取用户可见文案：结构化字段消息优先，否则兜底文案
    pub fn user_message(&self, priority: &[&str], fallback: &str) -> String {
        match self {
            ApiError::Api { body, .. } => tutti_shared::error::first_error_message(body, priority)
                .unwrap_or_else(|| fallback.to_string()),
            ApiError::SessionExpired => "登录已过期，请重新登录".to_string(),
            ApiError::Network(_) | ApiError::Decode(_) => fallback.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 错误体中的机器可读 code（如账号待审批）
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Api { body, .. } => tutti_shared::error::error_code(body),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "网络错误: {}", msg),
            ApiError::Decode(msg) => write!(f, "响应解析失败: {}", msg),
            ApiError::SessionExpired => write!(f, "会话已过期"),
            ApiError::Api { status, .. } => write!(f, "请求失败: HTTP {}", status),
        }
    }
}

// =========================================================
// 传输与凭据存储接口
// =========================================================

/// 即将发出的请求（已附好头与体，可重复构建以支持重放）
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub method: &'static str,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 传输适配器：唯一与网络打交道的 seam
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, String>;
}

/// 凭据持久化适配器
pub trait TokenStore {
    fn load(&self) -> Option<TokenPair>;
    fn save(&self, tokens: &TokenPair);
    fn clear(&self);
}

// =========================================================
// 生产环境实现 (Browser)
// =========================================================

/// 基于 `web::http` 的浏览器 fetch 传输
pub struct FetchTransport;

#[async_trait(?Send)]
impl Transport for FetchTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, String> {
        let mut builder = HttpRequestBuilder::new(request.method, &request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        let response = builder.send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        let body = response.text().await.map_err(|e| e.to_string())?;
        Ok(RawResponse { status, body })
    }
}

/// LocalStorage 凭据存储（固定键）
pub struct BrowserTokenStore;

impl TokenStore for BrowserTokenStore {
    fn load(&self) -> Option<TokenPair> {
        Some(TokenPair {
            access: BrowserStorage::get(ACCESS_TOKEN_KEY)?,
            refresh: BrowserStorage::get(REFRESH_TOKEN_KEY)?,
        })
    }

    fn save(&self, tokens: &TokenPair) {
        BrowserStorage::set(ACCESS_TOKEN_KEY, &tokens.access);
        BrowserStorage::set(REFRESH_TOKEN_KEY, &tokens.refresh);
    }

    fn clear(&self) {
        BrowserStorage::delete(ACCESS_TOKEN_KEY);
        BrowserStorage::delete(REFRESH_TOKEN_KEY);
    }
}

// =========================================================
// API 客户端
// =========================================================

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Rc<dyn Transport>,
    token_store: Rc<dyn TokenStore>,
    tokens: Rc<RefCell<Option<TokenPair>>>,
    /// 刷新彻底失败时的回调（由认证层注册，负责清理会话状态）
    on_session_expired: Rc<RefCell<Option<Rc<dyn Fn()>>>>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        transport: Rc<dyn Transport>,
        token_store: Rc<dyn TokenStore>,
    ) -> Self {
        let tokens = token_store.load();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            token_store,
            tokens: Rc::new(RefCell::new(tokens)),
            on_session_expired: Rc::new(RefCell::new(None)),
        }
    }

    pub fn set_session_expired_handler(&self, handler: impl Fn() + 'static) {
        *self.on_session_expired.borrow_mut() = Some(Rc::new(handler));
    }

    /// 是否持有（可能已过期的）凭据
    pub fn has_tokens(&self) -> bool {
        self.tokens.borrow().is_some()
    }

    /// 登录成功后写入并持久化凭据对
    pub fn store_tokens(&self, tokens: TokenPair) {
        self.token_store.save(&tokens);
        *self.tokens.borrow_mut() = Some(tokens);
    }

    /// 清除内存与持久化中的全部凭据
    pub fn clear_tokens(&self) {
        self.token_store.clear();
        *self.tokens.borrow_mut() = None;
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn build_request<R: ApiEndpoint>(&self, request: &R) -> Result<OutgoingRequest, ApiError> {
        let mut headers = Vec::new();
        if !R::ANONYMOUS {
            if let Some(tokens) = self.tokens.borrow().as_ref() {
                headers.push((
                    HEADER_AUTHORIZATION.to_string(),
                    format!("{}{}", BEARER_PREFIX, tokens.access),
                ));
            }
        }

        let body = if R::METHOD.has_body() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
            Some(serde_json::to_string(request).map_err(|e| ApiError::Decode(e.to_string()))?)
        } else {
            None
        };

        Ok(OutgoingRequest {
            method: R::METHOD.as_str(),
            url: self.url(&request.path()),
            headers,
            body,
        })
    }

    async fn send_raw(&self, request: OutgoingRequest) -> Result<RawResponse, ApiError> {
        self.transport.send(request).await.map_err(ApiError::Network)
    }

    fn parse<R: ApiEndpoint>(response: RawResponse) -> Result<R::Response, ApiError> {
        if !response.ok() {
            let body = serde_json::from_str(&response.body).unwrap_or(Value::Null);
            return Err(ApiError::Api {
                status: response.status,
                body,
            });
        }
        // 204 等空响应按 null 解析（Response = () 的端点）
        let text = response.body.trim();
        let text = if text.is_empty() { "null" } else { text };
        serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// 分发一个端点请求。
    ///
    /// 认证端点收到 401 时执行恰好一次刷新并重放；重放的结果（而非
    /// 最初的 401）就是调用方看到的结果。刷新本身失败则会话结束。
    pub async fn dispatch<R: ApiEndpoint>(&self, request: &R) -> Result<R::Response, ApiError> {
        let response = self.send_raw(self.build_request(request)?).await?;
        if response.status == 401 && !R::ANONYMOUS {
            self.refresh_access().await?;
            // 重放原请求，仅此一次；重建请求以携带新 access 凭据
            let retried = self.send_raw(self.build_request(request)?).await?;
            if retried.status == 401 {
                return self.session_expired();
            }
            return Self::parse::<R>(retried);
        }
        Self::parse::<R>(response)
    }

    /// 用 refresh 凭据换发新的 access 凭据；失败即强制登出
    async fn refresh_access(&self) -> Result<(), ApiError> {
        let refresh = self.tokens.borrow().as_ref().map(|t| t.refresh.clone());
        let Some(refresh) = refresh else {
            return self.session_expired();
        };

        let request = RefreshRequest { refresh };
        let outgoing = self.build_request(&request)?;
        let response = self.send_raw(outgoing).await?;
        if !response.ok() {
            return self.session_expired();
        }

        let refreshed: RefreshResponse = Self::parse::<RefreshRequest>(response)?;
        let updated = self.tokens.borrow().as_ref().map(|t| TokenPair {
            access: refreshed.access.clone(),
            refresh: t.refresh.clone(),
        });
        if let Some(tokens) = updated {
            self.store_tokens(tokens);
        }
        Ok(())
    }

    fn session_expired<T>(&self) -> Result<T, ApiError> {
        self.clear_tokens();
        let handler = self.on_session_expired.borrow().clone();
        if let Some(handler) = handler {
            handler();
        }
        Err(ApiError::SessionExpired)
    }

    /// 多部分表单上传头像（浏览器专用路径，不走 JSON 传输层）。
    /// 与 JSON 分发相同的 401 语义：恰好一次刷新并重放。
    pub async fn upload_photo(&self, file: web_sys::File) -> Result<UserProfile, ApiError> {
        let response = self.upload_once(&file).await?;
        if response.status == 401 {
            self.refresh_access().await?;
            let retried = self.upload_once(&file).await?;
            if retried.status == 401 {
                return self.session_expired();
            }
            return Self::parse_profile(retried);
        }
        Self::parse_profile(response)
    }

    async fn upload_once(&self, file: &web_sys::File) -> Result<RawResponse, ApiError> {
        use wasm_bindgen::{JsCast, JsValue};
        use wasm_bindgen_futures::JsFuture;

        let form = web_sys::FormData::new()
            .map_err(|e| ApiError::Network(format!("{:?}", e)))?;
        form.append_with_blob("photo", file)
            .map_err(|e| ApiError::Network(format!("{:?}", e)))?;

        let headers = web_sys::Headers::new().map_err(|e| ApiError::Network(format!("{:?}", e)))?;
        if let Some(tokens) = self.tokens.borrow().as_ref() {
            let _ = headers.set(
                HEADER_AUTHORIZATION,
                &format!("{}{}", BEARER_PREFIX, tokens.access),
            );
        }

        let opts = web_sys::RequestInit::new();
        opts.set_method("POST");
        opts.set_headers(&headers.into());
        opts.set_body(&JsValue::from(form));

        let request =
            web_sys::Request::new_with_str_and_init(&self.url("/users/upload-photo"), &opts)
                .map_err(|e| ApiError::Network(format!("{:?}", e)))?;
        let window = web_sys::window()
            .ok_or_else(|| ApiError::Network("无法获取 window 对象".to_string()))?;
        let value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| ApiError::Network(format!("{:?}", e)))?;
        let response: web_sys::Response = value
            .dyn_into()
            .map_err(|e| ApiError::Decode(format!("{:?}", e)))?;

        let status = response.status();
        let text_promise = response
            .text()
            .map_err(|e| ApiError::Decode(format!("{:?}", e)))?;
        let text = JsFuture::from(text_promise)
            .await
            .map_err(|e| ApiError::Decode(format!("{:?}", e)))?;
        Ok(RawResponse {
            status,
            body: text.as_string().unwrap_or_default(),
        })
    }

    fn parse_profile(response: RawResponse) -> Result<UserProfile, ApiError> {
        if !response.ok() {
            let body = serde_json::from_str(&response.body).unwrap_or(Value::Null);
            return Err(ApiError::Api {
                status: response.status,
                body,
            });
        }
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

// =========================================================
// 测试基建：脚本化传输与内存凭据存储
// =========================================================

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;

    /// 共享测试上下文：操作日志 + 预设响应队列
    #[derive(Default)]
    pub struct TestContext {
        pub log: RefCell<Vec<String>>,
        pub responses: RefCell<VecDeque<Result<RawResponse, String>>>,
        pub requests: RefCell<Vec<OutgoingRequest>>,
    }

    impl TestContext {
        pub fn push_response(&self, status: u16, body: &str) {
            self.responses.borrow_mut().push_back(Ok(RawResponse {
                status,
                body: body.to_string(),
            }));
        }

        pub fn push_network_failure(&self, message: &str) {
            self.responses
                .borrow_mut()
                .push_back(Err(message.to_string()));
        }
    }

    pub struct MockTransport {
        pub ctx: Rc<TestContext>,
    }

    #[async_trait(?Send)]
    impl Transport for MockTransport {
        async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, String> {
            self.ctx
                .log
                .borrow_mut()
                .push(format!("{} {}", request.method, request.url));
            self.ctx.requests.borrow_mut().push(request);
            self.ctx
                .responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err("no scripted response".to_string()))
        }
    }

    pub struct MemoryTokenStore {
        pub tokens: RefCell<Option<TokenPair>>,
    }

    impl MemoryTokenStore {
        pub fn with(tokens: Option<TokenPair>) -> Rc<Self> {
            Rc::new(Self {
                tokens: RefCell::new(tokens),
            })
        }
    }

    impl TokenStore for MemoryTokenStore {
        fn load(&self) -> Option<TokenPair> {
            self.tokens.borrow().clone()
        }

        fn save(&self, tokens: &TokenPair) {
            *self.tokens.borrow_mut() = Some(tokens.clone());
        }

        fn clear(&self) {
            *self.tokens.borrow_mut() = None;
        }
    }

    pub fn token_pair() -> TokenPair {
        TokenPair {
            access: "access-0".to_string(),
            refresh: "refresh-0".to_string(),
        }
    }

    /// 组装一个接在脚本化传输上的客户端
    pub fn scripted_client(
        tokens: Option<TokenPair>,
    ) -> (ApiClient, Rc<TestContext>, Rc<MemoryTokenStore>) {
        let ctx = Rc::new(TestContext::default());
        let store = MemoryTokenStore::with(tokens);
        let client = ApiClient::new(
            "https://api.example.test",
            Rc::new(MockTransport { ctx: ctx.clone() }),
            store.clone(),
        );
        (client, ctx, store)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use std::cell::Cell;
    use tutti_shared::LoginRequest;
    use tutti_shared::protocol::{DeleteConcertRequest, GetProfileRequest};

    const PROFILE_BODY: &str = r#"{
        "id": 1, "username": "anna", "email": "anna@example.test",
        "first_name": "安娜", "last_name": "李", "date_joined": "2024-01-01",
        "musician_profile": {"instrument": "小提琴", "birthday": null, "photo": null, "active": true}
    }"#;

    #[tokio::test]
    async fn attaches_bearer_header_to_authenticated_requests() {
        let (client, ctx, _) = scripted_client(Some(token_pair()));
        ctx.push_response(200, PROFILE_BODY);

        client.dispatch(&GetProfileRequest).await.unwrap();

        let requests = ctx.requests.borrow();
        let auth = requests[0]
            .headers
            .iter()
            .find(|(k, _)| k == HEADER_AUTHORIZATION)
            .cloned();
        assert_eq!(auth, Some((HEADER_AUTHORIZATION.to_string(), "Bearer access-0".to_string())));
    }

    #[tokio::test]
    async fn refresh_then_retry_exactly_once_and_surface_retry_result() {
        let (client, ctx, store) = scripted_client(Some(token_pair()));
        ctx.push_response(401, r#"{"detail": "token expired"}"#);
        ctx.push_response(200, r#"{"access": "access-1"}"#);
        ctx.push_response(200, PROFILE_BODY);

        let profile = client.dispatch(&GetProfileRequest).await.unwrap();

        assert_eq!(profile.username, "anna");
        assert_eq!(
            *ctx.log.borrow(),
            vec![
                "GET https://api.example.test/users/profile".to_string(),
                "POST https://api.example.test/auth/refresh".to_string(),
                "GET https://api.example.test/users/profile".to_string(),
            ]
        );
        // 新 access 凭据已持久化，refresh 凭据保留
        let saved = store.tokens.borrow().clone().unwrap();
        assert_eq!(saved.access, "access-1");
        assert_eq!(saved.refresh, "refresh-0");
        // 重放携带的是新凭据
        let requests = ctx.requests.borrow();
        assert!(requests[2]
            .headers
            .iter()
            .any(|(_, v)| v == "Bearer access-1"));
    }

    #[tokio::test]
    async fn failed_refresh_ends_session_and_clears_tokens() {
        let (client, ctx, store) = scripted_client(Some(token_pair()));
        ctx.push_response(401, "{}");
        ctx.push_response(401, r#"{"detail": "refresh invalid"}"#);

        let expired = Rc::new(Cell::new(false));
        let flag = expired.clone();
        client.set_session_expired_handler(move || flag.set(true));

        let result = client.dispatch(&GetProfileRequest).await;

        assert!(matches!(result, Err(ApiError::SessionExpired)));
        assert!(expired.get());
        assert!(store.tokens.borrow().is_none());
        // 没有第三次请求：刷新失败后不再重放
        assert_eq!(ctx.log.borrow().len(), 2);
    }

    #[tokio::test]
    async fn anonymous_endpoints_never_trigger_refresh() {
        let (client, ctx, _) = scripted_client(Some(token_pair()));
        ctx.push_response(401, r#"{"detail": "无效的用户名或密码"}"#);

        let request = LoginRequest {
            username: "anna".to_string(),
            password: "nope".to_string(),
        };
        let result = client.dispatch(&request).await;

        assert!(matches!(result, Err(ApiError::Api { status: 401, .. })));
        assert_eq!(ctx.log.borrow().len(), 1);
        // 登录请求不携带旧凭据
        assert!(ctx.requests.borrow()[0]
            .headers
            .iter()
            .all(|(k, _)| k != HEADER_AUTHORIZATION));
    }

    #[tokio::test]
    async fn error_body_is_surfaced_unchanged() {
        let (client, ctx, _) = scripted_client(Some(token_pair()));
        ctx.push_response(400, r#"{"name": ["名称已存在"]}"#);

        let result = client
            .dispatch(&tutti_shared::ConcertInput {
                name: "春季音乐会".to_string(),
                date: "2025-05-01".to_string(),
                ..Default::default()
            })
            .await;

        match result {
            Err(ApiError::Api { status, body }) => {
                assert_eq!(status, 400);
                assert_eq!(body["name"][0], "名称已存在");
            }
            other => panic!("预期结构化错误，得到 {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn empty_body_parses_as_unit_response() {
        let (client, ctx, _) = scripted_client(Some(token_pair()));
        ctx.push_response(204, "");

        client
            .dispatch(&DeleteConcertRequest { id: 9 })
            .await
            .unwrap();
        assert_eq!(
            ctx.log.borrow()[0],
            "DELETE https://api.example.test/concerts/9"
        );
    }

    #[tokio::test]
    async fn network_failure_maps_to_network_error() {
        let (client, ctx, _) = scripted_client(None);
        ctx.push_network_failure("connection refused");

        let result = client.dispatch(&GetProfileRequest).await;
        assert!(matches!(result, Err(ApiError::Network(_))));
    }
}
