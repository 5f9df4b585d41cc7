//! 用户与乐手资源服务

use crate::api::{ApiClient, ApiError};
use tutti_shared::protocol::{GetProfileRequest, ListMusiciansRequest};
use tutti_shared::{ChangePasswordRequest, UpdateProfileRequest, UserProfile};

pub async fn profile(api: &ApiClient) -> Result<UserProfile, ApiError> {
    api.dispatch(&GetProfileRequest).await
}

/// 整体替换个人资料（PUT 语义：未填字段视为清空）
pub async fn update_profile(
    api: &ApiClient,
    request: UpdateProfileRequest,
) -> Result<UserProfile, ApiError> {
    api.dispatch(&request).await
}

pub async fn change_password(
    api: &ApiClient,
    request: ChangePasswordRequest,
) -> Result<(), ApiError> {
    api.dispatch(&request).await
}

/// 上传头像（multipart，绕过 JSON 请求通道）
pub async fn upload_photo(api: &ApiClient, file: web_sys::File) -> Result<UserProfile, ApiError> {
    api.upload_photo(file).await
}

/// 乐手名录：后端已按在团状态过滤与排序
pub async fn list_musicians(api: &ApiClient) -> Result<Vec<UserProfile>, ApiError> {
    api.dispatch(&ListMusiciansRequest).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{scripted_client, token_pair};

    #[tokio::test]
    async fn profile_fetches_current_user() {
        let (client, ctx, _) = scripted_client(Some(token_pair()));
        ctx.push_response(
            200,
            r#"{
                "id": 1, "username": "anna", "email": "anna@example.test",
                "first_name": "", "last_name": "", "date_joined": "2024-01-01",
                "musician_profile": {"instrument": "小提琴", "birthday": null, "photo": null, "active": true}
            }"#,
        );

        let user = profile(&client).await.unwrap();
        assert_eq!(user.username, "anna");
        assert_eq!(
            ctx.log.borrow().as_slice(),
            ["GET https://api.example.test/users/profile"]
        );
    }

    #[tokio::test]
    async fn change_password_sends_both_fields() {
        let (client, ctx, _) = scripted_client(Some(token_pair()));
        ctx.push_response(204, "");

        change_password(
            &client,
            ChangePasswordRequest {
                old_password: "old-secret".to_string(),
                new_password: "new-secret".to_string(),
            },
        )
        .await
        .unwrap();

        let request = &ctx.requests.borrow()[0];
        assert_eq!(
            request.url,
            "https://api.example.test/users/change-password"
        );
        assert_eq!(
            request.body.as_deref(),
            Some(r#"{"old_password":"old-secret","new_password":"new-secret"}"#)
        );
    }
}
