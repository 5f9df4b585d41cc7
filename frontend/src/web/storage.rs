//! LocalStorage 封装模块
//!
//! 对浏览器 LocalStorage 的轻量封装；凭据是客户端唯一的持久化状态，
//! 全部经由此处读写。命名为 `BrowserStorage` 以避免与
//! `leptos::prelude::LocalStorage`（StoredValue 的存储策略类型）混淆。

pub struct BrowserStorage;

impl BrowserStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    /// 读取字符串值；键不存在或存储不可用时返回 `None`
    pub fn get(key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    /// 写入值，返回是否成功
    pub fn set(key: &str, value: &str) -> bool {
        Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    /// 删除键值对，返回是否成功
    pub fn delete(key: &str) -> bool {
        Self::storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }
}
