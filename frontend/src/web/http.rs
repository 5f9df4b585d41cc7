//! HTTP 请求封装模块
//!
//! 基于 `web_sys::fetch` 的精简客户端，供传输层使用。
//! 只做请求构建、发送与响应读取，不理解任何业务语义。

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

/// HTTP 层错误
#[derive(Debug)]
pub enum HttpError {
    /// 请求构建失败
    Build(String),
    /// 网络请求失败（未收到响应）
    Network(String),
    /// 响应体读取失败
    Read(String),
}

impl core::fmt::Display for HttpError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HttpError::Build(msg) => write!(f, "请求构建失败: {}", msg),
            HttpError::Network(msg) => write!(f, "网络错误: {}", msg),
            HttpError::Read(msg) => write!(f, "响应读取失败: {}", msg),
        }
    }
}

/// HTTP 响应封装
pub struct HttpResponse {
    inner: Response,
}

impl HttpResponse {
    pub fn status(&self) -> u16 {
        self.inner.status()
    }

    /// 读取响应体文本
    pub async fn text(self) -> Result<String, HttpError> {
        let promise = self
            .inner
            .text()
            .map_err(|e| HttpError::Read(format!("{:?}", e)))?;

        let text = JsFuture::from(promise)
            .await
            .map_err(|e| HttpError::Read(format!("{:?}", e)))?;

        text.as_string()
            .ok_or_else(|| HttpError::Read("响应体不是字符串".to_string()))
    }
}

/// HTTP 请求构建器
pub struct HttpRequestBuilder {
    method: &'static str,
    url: String,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl HttpRequestBuilder {
    pub fn new(method: &'static str, url: &str) -> Self {
        Self {
            method,
            url: url.to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    /// 发送请求
    pub async fn send(self) -> Result<HttpResponse, HttpError> {
        let headers =
            Headers::new().map_err(|e| HttpError::Build(format!("创建 Headers 失败: {:?}", e)))?;
        for (key, value) in &self.headers {
            headers
                .set(key, value)
                .map_err(|e| HttpError::Build(format!("设置 Header 失败: {:?}", e)))?;
        }

        let opts = RequestInit::new();
        opts.set_method(self.method);
        opts.set_headers(&headers.into());
        if let Some(body) = &self.body {
            opts.set_body(&JsValue::from_str(body));
        }

        let request = Request::new_with_str_and_init(&self.url, &opts)
            .map_err(|e| HttpError::Build(format!("{:?}", e)))?;

        let window =
            web_sys::window().ok_or_else(|| HttpError::Network("无法获取 window 对象".to_string()))?;

        let value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| HttpError::Network(format!("{:?}", e)))?;

        let response: Response = value
            .dyn_into()
            .map_err(|e| HttpError::Read(format!("Response 类型转换失败: {:?}", e)))?;

        Ok(HttpResponse { inner: response })
    }
}
